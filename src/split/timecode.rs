use std::time::Duration;

use anyhow::{Context, Result, bail};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TIMECODE: Regex =
        Regex::new(r"^(?:(?P<hour>\d+):)?(?P<minute>\d+):(?P<second>\d+)(?:\.(?P<frac>\d{1,9}))?$")
            .expect("timecode regex is valid");
}

/// Parse `[H:]M:S[.fraction]` into a duration.
///
/// Minutes and seconds are not range checked, so `90:00` is an hour and a half.
pub fn parse_timecode(value: &str) -> Result<Duration> {
    let trimmed = value.trim();
    let Some(caps) = TIMECODE.captures(trimmed) else {
        bail!("Invalid time '{value}', expected [H:]M:S[.ms]");
    };

    let hours = caps
        .name("hour")
        .map(|m| m.as_str().parse::<u64>())
        .transpose()
        .with_context(|| format!("Invalid hours in '{value}'"))?
        .unwrap_or(0);
    let minutes = caps["minute"]
        .parse::<u64>()
        .with_context(|| format!("Invalid minutes in '{value}'"))?;
    let seconds = caps["second"]
        .parse::<u64>()
        .with_context(|| format!("Invalid seconds in '{value}'"))?;

    let nanos = match caps.name("frac") {
        Some(frac) => {
            let digits = frac.as_str();
            let padded = format!("{digits:0<9}");
            padded
                .parse::<u32>()
                .with_context(|| format!("Invalid fractional seconds in '{value}'"))?
        }
        None => 0,
    };

    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .with_context(|| format!("Time '{value}' is out of range"))?;

    Ok(Duration::new(total, nanos))
}

/// Render as `H:MM:SS.mmm`, which ffmpeg accepts for `-ss`/`-to`.
pub fn format_timecode(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Render as `H:MM:SS.ffffff` for `-ss`/`-to`. Probed durations carry
/// microseconds, so an open end must not be cut short by rounding.
pub fn format_ffmpeg_time(duration: Duration) -> String {
    let total_micros = duration.as_micros();
    let hours = total_micros / 3_600_000_000;
    let minutes = (total_micros / 60_000_000) % 60;
    let seconds = (total_micros / 1_000_000) % 60;
    let micros = total_micros % 1_000_000;
    format!("{hours}:{minutes:02}:{seconds:02}.{micros:06}")
}

/// Serde adapter for `Option<Duration>` fields written as timecode strings.
pub mod serde_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_timecode(value)
                .map(Some)
                .map_err(|err| serde::de::Error::custom(format!("{err:#}"))),
        }
    }

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_str(&super::format_timecode(*duration)),
            None => serializer.serialize_none(),
        }
    }
}
