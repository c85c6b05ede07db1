/*
 *  service.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Music service snapshot types and client abstraction
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// What the account is playing right now, as last reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    /// Stable identity; falls back to the URI, then the title.
    pub id: String,
    pub title: String,
    /// Artist names already joined with ", ".
    pub artists: String,
    pub art_url: Option<String>,
    /// Playback position reported with the snapshot.
    pub progress_ms: u64,
    pub is_playing: bool,
}

impl TrackSnapshot {
    pub fn progress(&self) -> Duration {
        Duration::from_millis(self.progress_ms)
    }
}

/// One entry of the listening history summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub id: String,
    pub title: String,
    pub artists: String,
    pub art_url: Option<String>,
}

/// Window the service aggregates top tracks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Roughly the last four weeks
    #[default]
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_term" | "short" => Ok(TimeRange::ShortTerm),
            "medium_term" | "medium" => Ok(TimeRange::MediumTerm),
            "long_term" | "long" => Ok(TimeRange::LongTerm),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service asked us to back off.
    #[error("rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON deserialization error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authorization failed: {0}")]
    Auth(String),
}

/// The two questions the poller asks of a music service.
#[allow(async_fn_in_trait)]
pub trait MusicService {
    /// Current playback, or None when nothing is loaded.
    async fn current_playback(&mut self) -> Result<Option<TrackSnapshot>, ServiceError>;

    /// Up to `limit` most played tracks over `window`.
    async fn top_tracks(
        &mut self,
        limit: u32,
        window: TimeRange,
    ) -> Result<Vec<TrackSummary>, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_round_trip() {
        for r in [TimeRange::ShortTerm, TimeRange::MediumTerm, TimeRange::LongTerm] {
            assert_eq!(r.as_str().parse::<TimeRange>(), Ok(r));
        }
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_rate_limit_message() {
        let e = ServiceError::RateLimited { retry_after: Duration::from_secs(30) };
        assert_eq!(e.to_string(), "rate limited, retry after 30s");
    }
}
