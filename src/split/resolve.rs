use std::time::Duration;

use super::error::PlanError;
use super::part::{Boundary, DeclaredPart, Segment};
use super::timeline::Timeline;

/// Position of a part within the declared list, needed for the defaults.
#[derive(Debug, Clone, Copy)]
pub struct PartContext {
    pub previous_end: Option<Duration>,
    pub is_last: bool,
}

/// Resolve one declared part to an absolute, non-empty interval.
///
/// A missing start chains onto `previous_end` (or zero for the first part);
/// a missing end is only allowed on the last part and means "end of the
/// timeline".
pub fn resolve_part(
    part: &DeclaredPart,
    timeline: &Timeline,
    context: PartContext,
) -> Result<Segment, PlanError> {
    let start = match part.start {
        None => context.previous_end.unwrap_or(Duration::ZERO),
        Some(boundary) => locate(part, timeline, boundary)?,
    };

    let end = match part.end {
        None if context.is_last => timeline.total(),
        None => {
            return Err(PlanError::MissingEnd {
                part: part.name.clone(),
            });
        }
        Some(boundary) => locate(part, timeline, boundary)?,
    };

    if end <= start {
        return Err(PlanError::NonPositiveLength {
            part: part.name.clone(),
            seconds: end.as_secs_f64() - start.as_secs_f64(),
        });
    }

    Ok(Segment::new(part.name.clone(), start, end))
}

fn locate(part: &DeclaredPart, timeline: &Timeline, boundary: Boundary) -> Result<Duration, PlanError> {
    match boundary {
        Boundary::Absolute(offset) => Ok(offset),
        Boundary::AfterVideo { video, offset } => timeline
            .end_of_video(video)
            .map(|base| base + offset)
            .ok_or_else(|| PlanError::VideoOutOfRange {
                part: part.name.clone(),
                video,
                videos: timeline.video_count(),
            }),
    }
}
