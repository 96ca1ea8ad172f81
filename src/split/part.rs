use std::time::Duration;

use serde::Serialize;

use super::timecode::format_timecode;

/// One probed input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideo {
    pub identifier: String,
    pub duration: Duration,
}

impl SourceVideo {
    pub fn new(identifier: impl Into<String>, duration: Duration) -> Self {
        Self {
            identifier: identifier.into(),
            duration,
        }
    }
}

/// Where a declared start or end sits on the combined timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Offset from the beginning of the first video.
    Absolute(Duration),
    /// Offset from the end of video number `video` (1-based).
    AfterVideo { video: usize, offset: Duration },
}

impl Boundary {
    /// Build a boundary from the project file's `(value, index)` pair.
    ///
    /// An index of 0 or 1 means the value is already absolute; index `n >= 2`
    /// counts from the end of video `n - 1`.
    pub fn from_index(offset: Duration, index: Option<u32>) -> Self {
        match index {
            None | Some(0) | Some(1) => Boundary::Absolute(offset),
            Some(n) => Boundary::AfterVideo {
                video: n as usize - 1,
                offset,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredPart {
    pub name: String,
    pub start: Option<Boundary>,
    pub end: Option<Boundary>,
}

impl DeclaredPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
        }
    }

    pub fn starting(mut self, boundary: Boundary) -> Self {
        self.start = Some(boundary);
        self
    }

    pub fn ending(mut self, boundary: Boundary) -> Self {
        self.end = Some(boundary);
        self
    }
}

/// A named `[start, end)` span on the combined timeline.
///
/// Used both for resolved parts and for the output segments handed to the
/// encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub start: Duration,
    pub end: Duration,
}

impl Segment {
    pub fn new(name: impl Into<String>, start: Duration, end: Duration) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn length(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    pub fn row(&self) -> SegmentRow {
        SegmentRow {
            name: self.name.clone(),
            start: format_timecode(self.start),
            end: format_timecode(self.end),
            length: format_timecode(self.length()),
            start_seconds: self.start.as_secs_f64(),
            end_seconds: self.end.as_secs_f64(),
        }
    }
}

/// Display/JSON projection of a segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRow {
    pub name: String,
    pub start: String,
    pub end: String,
    pub length: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_and_one_are_absolute() {
        let offset = Duration::from_secs(300);
        assert_eq!(Boundary::from_index(offset, None), Boundary::Absolute(offset));
        assert_eq!(Boundary::from_index(offset, Some(0)), Boundary::Absolute(offset));
        assert_eq!(Boundary::from_index(offset, Some(1)), Boundary::Absolute(offset));
    }

    #[test]
    fn index_two_counts_from_first_video() {
        let offset = Duration::from_secs(300);
        assert_eq!(
            Boundary::from_index(offset, Some(2)),
            Boundary::AfterVideo { video: 1, offset }
        );
    }
}
