//! ffmpeg time duration syntax
//!
//! Accepted forms (https://ffmpeg.org/ffmpeg-utils.html#time-duration-syntax):
//! - `[-][HH:]MM:SS[.m...]`
//! - `[-]S+[.m...][s|ms|us]`

use crate::errors::{GifError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn clock_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<sign>-)?(?:(?P<hours>\d+):)?(?P<minutes>\d+):(?P<seconds>\d+)(?P<frac>\.\d+)?$")
            .expect("valid clock duration regex")
    })
}

fn seconds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<value>-?\d+(?:\.\d+)?)(?P<unit>s|ms|us)?$")
            .expect("valid seconds duration regex")
    })
}

/// Convert an ffmpeg duration into a plain `[-]S+[.m...]` count of seconds.
///
/// `01:02:03.5` becomes `3723.5`; plain second counts come back unchanged.
pub fn duration_to_seconds(duration: &str) -> Result<String> {
    let duration = duration.trim();

    if let Some(caps) = clock_regex().captures(duration) {
        let number = |name: &str| -> Result<u64> {
            caps.name(name)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map(|v| v.unwrap_or(0))
                .map_err(|e| GifError::invalid_option("duration", e.to_string()))
        };
        let overflow = || {
            GifError::invalid_option("duration", format!("'{}' is out of range", duration))
        };
        let (hours, minutes, secs) = (number("hours")?, number("minutes")?, number("seconds")?);
        let seconds = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60)?.checked_add(h))
            .and_then(|hm| hm.checked_add(secs))
            .ok_or_else(overflow)?;
        let sign = caps.name("sign").map_or("", |m| m.as_str());
        let frac = caps.name("frac").map_or("", |m| m.as_str());
        return Ok(format!("{}{}{}", sign, seconds, frac));
    }

    if let Some(caps) = seconds_regex().captures(duration) {
        let value = &caps["value"];
        return match caps.name("unit").map(|m| m.as_str()) {
            None | Some("s") => Ok(value.to_string()),
            Some(_) => Ok(format_seconds(parse_duration(duration)?)),
        };
    }

    Err(GifError::invalid_option(
        "duration",
        format!("'{}' is not a valid ffmpeg time duration", duration),
    ))
}

/// Parse an ffmpeg duration into seconds.
pub fn parse_duration(duration: &str) -> Result<f64> {
    let duration = duration.trim();
    let invalid = || {
        GifError::invalid_option(
            "duration",
            format!("'{}' is not a valid ffmpeg time duration", duration),
        )
    };

    if clock_regex().is_match(duration) {
        return duration_to_seconds(duration)?
            .parse::<f64>()
            .map_err(|_| invalid());
    }

    let caps = seconds_regex().captures(duration).ok_or_else(invalid)?;
    let value: f64 = caps["value"].parse().map_err(|_| invalid())?;
    let scale = match caps.name("unit").map(|m| m.as_str()) {
        Some("ms") => 1e-3,
        Some("us") => 1e-6,
        _ => 1.0,
    };
    Ok(value * scale)
}

pub fn is_valid_duration(duration: &str) -> bool {
    parse_duration(duration).is_ok()
}

fn format_seconds(seconds: f64) -> String {
    let s = format!("{:.6}", seconds);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_clock_matches_arithmetic(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
            let text = format!("{:02}:{:02}:{:02}", h, m, s);
            let expected = h * 3600 + m * 60 + s;
            prop_assert_eq!(duration_to_seconds(&text).unwrap(), expected.to_string());
        }

        #[test]
        fn prop_plain_integer_roundtrips(n in 0u32..1_000_000) {
            let text = n.to_string();
            prop_assert_eq!(duration_to_seconds(&text).unwrap(), text);
        }
    }
}
