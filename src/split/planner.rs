use super::error::PlanError;
use super::part::{DeclaredPart, Segment, SourceVideo};
use super::resolve::{PartContext, resolve_part};
use super::subdivide::{SplitLimits, subdivide};
use super::timeline::Timeline;

/// Turn declared parts into the ordered list of segments to extract.
///
/// Stops at the first part that fails to resolve; nothing is returned for the
/// parts before it.
pub fn plan_segments(
    parts: &[DeclaredPart],
    videos: &[SourceVideo],
    limits: &SplitLimits,
) -> Result<Vec<Segment>, PlanError> {
    let timeline = Timeline::from_videos(videos);
    let last = parts.len().saturating_sub(1);

    let (segments, _) = parts.iter().enumerate().try_fold(
        (Vec::new(), None),
        |(mut segments, previous_end), (idx, part)| {
            let context = PartContext {
                previous_end,
                is_last: idx == last,
            };
            let interval = resolve_part(part, &timeline, context)?;
            let end = interval.end;
            segments.extend(subdivide(interval, limits));
            Ok::<_, PlanError>((segments, Some(end)))
        },
    )?;

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::split::part::Boundary;
    use crate::split::subdivide::TailPolicy;

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    fn videos(durations: &[Duration]) -> Vec<SourceVideo> {
        durations
            .iter()
            .enumerate()
            .map(|(idx, duration)| SourceVideo::new(format!("{idx}.mp4"), *duration))
            .collect()
    }

    #[test]
    fn single_open_part_spans_both_videos() {
        let videos = videos(&[mins(21) + Duration::from_secs(30), mins(15)]);
        let timeline = Timeline::from_videos(&videos);
        assert_eq!(
            timeline.ends(),
            [mins(21) + Duration::from_secs(30), mins(36) + Duration::from_secs(30)]
        );

        let segments =
            plan_segments(&[DeclaredPart::new("full")], &videos, &SplitLimits::default()).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(
                "full",
                Duration::ZERO,
                mins(36) + Duration::from_secs(30)
            )]
        );
    }

    #[test]
    fn parts_without_start_chain_onto_previous_end() {
        let parts = vec![
            DeclaredPart::new("a").ending(Boundary::Absolute(mins(3))),
            DeclaredPart::new("b").ending(Boundary::from_index(mins(2), Some(2))),
            DeclaredPart::new("c"),
        ];
        let segments =
            plan_segments(&parts, &videos(&[mins(10), mins(15)]), &SplitLimits::default())
                .unwrap();

        assert_eq!(segments[0].start, Duration::ZERO);
        for pair in segments.windows(2) {
            assert_eq!(pair[1].start, pair[0].end);
        }
        assert_eq!(segments[2].end, mins(25));
    }

    #[test]
    fn relative_start_is_offset_from_previous_video() {
        let parts = vec![
            DeclaredPart::new("p")
                .starting(Boundary::from_index(mins(5), Some(2)))
                .ending(Boundary::from_index(mins(9), Some(2))),
        ];
        let segments =
            plan_segments(&parts, &videos(&[mins(10), mins(15)]), &SplitLimits::default())
                .unwrap();
        assert_eq!(segments, vec![Segment::new("p", mins(15), mins(19))]);
    }

    #[test]
    fn chaining_uses_unsplit_end_of_previous_part() {
        let limits = SplitLimits {
            max_part_length: Some(mins(10)),
            greedy: Some(0.1),
            tail: TailPolicy::ReachEnd,
        };
        let parts = vec![
            DeclaredPart::new("long").ending(Boundary::Absolute(mins(25))),
            DeclaredPart::new("rest"),
        ];
        let segments = plan_segments(&parts, &videos(&[mins(30)]), &limits).unwrap();

        let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["long_part1", "long_part2", "long_part3", "rest"]);
        assert_eq!(segments[3], Segment::new("rest", mins(25), mins(30)));
    }

    #[test]
    fn first_failure_aborts_whole_plan() {
        let parts = vec![
            DeclaredPart::new("ok").ending(Boundary::Absolute(mins(3))),
            DeclaredPart::new("bad").ending(Boundary::Absolute(mins(2))),
            DeclaredPart::new("never"),
        ];
        let err = plan_segments(&parts, &videos(&[mins(10)]), &SplitLimits::default())
            .unwrap_err();
        assert!(matches!(err, PlanError::NonPositiveLength { ref part, .. } if part == "bad"));
    }

    #[test]
    fn no_parts_plan_nothing() {
        let segments = plan_segments(&[], &videos(&[mins(10)]), &SplitLimits::default()).unwrap();
        assert!(segments.is_empty());
    }
}
