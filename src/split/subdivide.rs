use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::part::Segment;

/// Each sub-segment after the first starts this far before the previous cut so
/// keyframe-aligned stream copies do not leave a gap.
pub const LEAD_IN: Duration = Duration::from_secs(5);

/// What to do when the greedy rule leaves exactly one sub-segment for an
/// interval that is still longer than the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailPolicy {
    /// The lone `_part1` segment runs to the end of the interval.
    #[default]
    ReachEnd,
    /// The lone `_part1` segment stops after one maximum length, dropping the
    /// rest of the interval. Matches the historical behaviour.
    Truncate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplitLimits {
    pub max_part_length: Option<Duration>,
    /// Fraction of the interval the final remainder may occupy before it gets
    /// a segment of its own. Must be finite and non-negative.
    pub greedy: Option<f64>,
    pub tail: TailPolicy,
}

impl SplitLimits {
    /// Intervals shorter than this are never split. `None` when there is no
    /// maximum or the greedy factor pushes the threshold past `Duration::MAX`.
    pub fn threshold(&self) -> Option<Duration> {
        let max = self.max_part_length?;
        let factor = 1.0 + self.greedy.unwrap_or(0.0);
        Duration::try_from_secs_f64(max.as_secs_f64() * factor).ok()
    }

    /// Number of sub-segments an interval of `length` is cut into.
    pub fn segment_count(&self, length: Duration) -> usize {
        let (Some(max), Some(threshold)) = (self.max_part_length, self.threshold()) else {
            return 1;
        };
        if max.is_zero() || length < threshold {
            return 1;
        }

        let whole = length.as_nanos() / max.as_nanos();
        let remainder = Duration::from_nanos((length.as_nanos() % max.as_nanos()) as u64);
        let tolerated = self.greedy.map(|greedy| {
            Duration::try_from_secs_f64(length.as_secs_f64() * greedy).unwrap_or(Duration::MAX)
        });

        let mut count = whole as usize;
        if tolerated.is_none_or(|tolerated| remainder > tolerated) {
            count += 1;
        }
        count
    }
}

/// Cut a resolved interval into overlapping pieces no longer than the maximum.
///
/// Short intervals come back unchanged under their own name; split ones are
/// named `{name}_part{n}` starting at 1.
pub fn subdivide(interval: Segment, limits: &SplitLimits) -> Vec<Segment> {
    let Some(max) = limits.max_part_length else {
        return vec![interval];
    };
    let length = interval.length();
    if limits.threshold().is_none_or(|threshold| length < threshold) || max.is_zero() {
        return vec![interval];
    }

    let count = limits.segment_count(length);
    let mut segments = Vec::with_capacity(count);
    let mut cut = interval.start + max;

    for index in 0..count {
        let name = format!("{}_part{}", interval.name, index + 1);
        if index == 0 {
            let end = if count == 1 && limits.tail == TailPolicy::ReachEnd {
                interval.end
            } else {
                cut
            };
            segments.push(Segment::new(name, interval.start, end));
        } else if index == count - 1 {
            segments.push(Segment::new(name, cut.saturating_sub(LEAD_IN), interval.end));
        } else {
            segments.push(Segment::new(name, cut.saturating_sub(LEAD_IN), cut + max));
            cut += max;
        }
    }

    segments
}
