use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::models::ChatMessage;
use crate::sources::LogSource;

/// Memoizes per-calendar-day chat logs and slices them into arbitrary
/// timestamp ranges.
///
/// Each distinct date is fetched from the underlying [`LogSource`] at most
/// once per process; entries are never evicted. A failed line parse aborts
/// the whole day's load and leaves no partial entry behind, so a later call
/// retries the fetch. Not safe for concurrent callers sharing one instance;
/// access is single-threaded, single-writer by design.
pub struct ChatLogCache<S> {
    streamer: String,
    source: S,
    days: HashMap<NaiveDate, Vec<ChatMessage>>,
}

impl<S: LogSource> ChatLogCache<S> {
    pub fn new(streamer: impl Into<String>, source: S) -> Self {
        Self {
            streamer: streamer.into(),
            source,
            days: HashMap::new(),
        }
    }

    /// The full ordered message sequence for one calendar day, fetching and
    /// parsing it on first access.
    pub async fn daily_log(&mut self, date: NaiveDate) -> Result<&[ChatMessage]> {
        if !self.days.contains_key(&date) {
            let raw = self.source.fetch_daily_log(&self.streamer, date).await?;
            let messages = parse_daily_log(&raw, date)?;
            debug!("cached {} messages for {}", messages.len(), date);
            self.days.insert(date, messages);
        }
        Ok(self
            .days
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// All messages with `begin <= timestamp <= end`, concatenated in
    /// chronological order across however many calendar days the range
    /// touches. An inverted range yields an empty sequence.
    pub async fn messages_in_range(
        &mut self,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::new();
        if begin > end {
            return Ok(messages);
        }

        let last_day = end.date();
        let mut day = begin.date();
        loop {
            let lower = if day == begin.date() {
                begin
            } else {
                day.and_time(NaiveTime::MIN)
            };
            let upper = if day == last_day {
                end
            } else {
                day.and_time(end_of_day())
            };
            self.collect_day_slice(day, lower, upper, &mut messages)
                .await?;

            if day == last_day {
                break;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(messages)
    }

    // Relies on the archive emitting messages in non-decreasing timestamp
    // order: scanning a day stops at the first message past the upper bound.
    async fn collect_day_slice(
        &mut self,
        day: NaiveDate,
        lower: NaiveDateTime,
        upper: NaiveDateTime,
        out: &mut Vec<ChatMessage>,
    ) -> Result<()> {
        for message in self.daily_log(day).await? {
            if message.timestamp >= lower {
                if message.timestamp <= upper {
                    out.push(message.clone());
                } else {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Inclusive upper bound of a whole-day window.
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
}

/// Parse a raw daily log into messages. The trailing blank line left by the
/// final newline is discarded; any other malformed line fails the whole day.
fn parse_daily_log(raw: &str, date: NaiveDate) -> Result<Vec<ChatMessage>> {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| ChatMessage::parse(line, date))
        .collect()
}
