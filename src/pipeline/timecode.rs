//! Lenient `HH:MM:SS` timecode validation.
//!
//! Minute and second fields must be 0-59; the hour field is only bounded by
//! its two digits, so `99:00:00` is a valid start bound. Anything that does
//! not validate is treated as absent by the orchestrator, never as an error.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})$").expect("valid regex"))
}

impl Timecode {
    /// Parse a timecode, returning `None` for anything invalid.
    pub fn parse(input: &str) -> Option<Self> {
        let captures = pattern().captures(input.trim())?;

        let hours: u8 = captures[1].parse().ok()?;
        let minutes: u8 = captures[2].parse().ok()?;
        let seconds: u8 = captures[3].parse().ok()?;

        if minutes > 59 || seconds > 59 {
            return None;
        }

        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}
