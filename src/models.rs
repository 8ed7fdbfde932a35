use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{HighlightError, Result};

/// One archived broadcast segment with a start and end timestamp.
///
/// `messages` starts empty and is populated exactly once by the pipeline
/// before any frequency analysis runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vod {
    pub id: u64,
    pub url: String,
    pub time_started: NaiveDateTime,
    pub time_finished: NaiveDateTime,
    pub messages: Vec<ChatMessage>,
}

impl Vod {
    pub fn new(id: u64, url: String, time_started: NaiveDateTime, duration_seconds: i64) -> Self {
        Self {
            id,
            url,
            time_started,
            time_finished: time_started + Duration::seconds(duration_seconds),
            messages: Vec::new(),
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.time_finished - self.time_started).num_seconds().abs()
    }

    /// Whether the segment's `[start.date(), finish.date()]` range contains
    /// `date`, inclusive on both ends.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.time_started.date() <= date && date <= self.time_finished.date()
    }
}

impl fmt::Display for Vod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VOD {}, {}, length: {}s, from: {} until: {}",
            self.id,
            self.url,
            self.duration_seconds(),
            self.time_started.format("(%b %d) %H:%M"),
            self.time_finished.format("(%b %d) %H:%M"),
        )
    }
}

/// A single parsed chat-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub text: String,
}

// The archive's line format: "[YYYY-MM-DD HH:MM:SS TZ] author: body".
// The bracket's date digits are matched but ignored; the calendar date of
// the message comes from the day whose log is being loaded.
fn line_pattern() -> &'static Regex {
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    LINE_RE.get_or_init(|| {
        Regex::new(
            r"^\[\d+-\d+-\d+ (?P<hrs>\d+):(?P<mins>\d+):(?P<secs>\d+) (?P<tz>[A-Za-z]+)\] (?P<author>[^:]+): (?P<msg>.*)$",
        )
        .expect("chat line pattern is valid")
    })
}

impl ChatMessage {
    /// Parse one log line emitted on the given calendar `date`.
    ///
    /// Lines that do not match the archive format, or that carry an
    /// out-of-range clock time, fail with `MalformedChatLine`.
    pub fn parse(line: &str, date: NaiveDate) -> Result<Self> {
        let malformed = || HighlightError::MalformedChatLine {
            line: line.to_string(),
        };

        let caps = line_pattern().captures(line).ok_or_else(malformed)?;
        let hours: u32 = caps["hrs"].parse().map_err(|_| malformed())?;
        let minutes: u32 = caps["mins"].parse().map_err(|_| malformed())?;
        let seconds: u32 = caps["secs"].parse().map_err(|_| malformed())?;
        let time = NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or_else(malformed)?;

        Ok(Self {
            timestamp: date.and_time(time),
            author: caps["author"].to_string(),
            text: caps["msg"].to_string(),
        })
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.timestamp.format("(%b %d) %H:%M"),
            self.text
        )
    }
}

/// Maximal run of VODs whose inter-segment gaps stay under the configured
/// threshold, representing one continuous viewing occasion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSession {
    pub vods: Vec<Vod>,
}

impl StreamSession {
    pub fn new(vods: Vec<Vod>) -> Self {
        Self { vods }
    }

    pub fn vod_by_id(&self, id: u64) -> Result<&Vod> {
        self.vods
            .iter()
            .find(|v| v.id == id)
            .ok_or(HighlightError::VodNotFound { id })
    }

}

impl fmt::Display for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(20))?;
        for (i, vod) in self.vods.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, " - {}", vod)?;
        }
        Ok(())
    }
}

/// A ranked candidate clip start time within one VOD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightMarker {
    pub vod_id: u64,
    pub offset_seconds: u64,
    pub url: String,
}
