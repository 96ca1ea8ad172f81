use std::time::Duration;

use super::part::SourceVideo;

/// Cumulative end offsets of the source videos played back to back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    ends: Vec<Duration>,
}

impl Timeline {
    pub fn from_videos(videos: &[SourceVideo]) -> Self {
        Self::from_durations(videos.iter().map(|video| video.duration))
    }

    pub fn from_durations(durations: impl IntoIterator<Item = Duration>) -> Self {
        let ends = durations
            .into_iter()
            .scan(Duration::ZERO, |total, duration| {
                *total += duration;
                Some(*total)
            })
            .collect();
        Self { ends }
    }

    /// Element `i` is the end of video `i` (0-based) on the combined timeline.
    pub fn ends(&self) -> &[Duration] {
        &self.ends
    }

    pub fn video_count(&self) -> usize {
        self.ends.len()
    }

    pub fn total(&self) -> Duration {
        self.ends.last().copied().unwrap_or_default()
    }

    /// End of video number `video` (1-based), if it exists.
    pub fn end_of_video(&self, video: usize) -> Option<Duration> {
        video.checked_sub(1).and_then(|idx| self.ends.get(idx).copied())
    }
}
