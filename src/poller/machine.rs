/*
 *  poller/machine.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playback and idle decisions with track debouncing
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

use std::time::{Duration, Instant};

use crate::constants::{
    DEBOUNCE_MS, ERROR_BACKOFF_SECS, IDLE_REFRESH_SECS, IDLE_SECS, POLL_ACTIVE_SECS,
    POLL_IDLE_SECS, TOP_CACHE_TTL_SECS,
};
use crate::service::TrackSnapshot;

/// Every interval the poller works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// No playback for this long switches to the idle screen.
    pub idle_threshold: Duration,
    pub poll_active: Duration,
    pub poll_idle: Duration,
    pub debounce: Duration,
    pub top_cache_ttl: Duration,
    /// Minimum age of the idle screen before it is redrawn.
    pub idle_refresh: Duration,
    /// Floor on the sleep after a failed tick.
    pub error_backoff: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_secs(IDLE_SECS),
            poll_active: Duration::from_secs(POLL_ACTIVE_SECS),
            poll_idle: Duration::from_secs(POLL_IDLE_SECS),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            top_cache_ttl: Duration::from_secs(TOP_CACHE_TTL_SECS),
            idle_refresh: Duration::from_secs(IDLE_REFRESH_SECS),
            error_backoff: Duration::from_secs(ERROR_BACKOFF_SECS),
        }
    }
}

/// What is on the panel, as far as the poller knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub last_rendered_track: Option<String>,
    /// Last time playback was observed.
    pub last_active: Instant,
    pub idle_shown: bool,
    pub last_idle_render: Option<Instant>,
}

/// A track seen playing but not drawn yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceCandidate {
    pub track_id: String,
    first_seen: Instant,
    /// Playback position reported when the candidate was first seen.
    progress_at_first_seen: Duration,
}

impl DebounceCandidate {
    fn new(track: &TrackSnapshot, now: Instant) -> Self {
        Self {
            track_id: track.id.clone(),
            first_seen: now,
            progress_at_first_seen: track.progress(),
        }
    }

    /// Time spent in the track, counting what was played before we saw it.
    pub fn listened(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.first_seen) + self.progress_at_first_seen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the panel alone.
    Hold,
    RenderNowPlaying,
    RenderIdle,
}

/// Result of one observation: what to draw and how long to sleep after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub sleep: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing drawn since start.
    Blank,
    ActiveDebouncing,
    ActiveShown,
    IdleShown,
}

#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    timing: Timing,
    state: DisplayState,
    candidate: Option<DebounceCandidate>,
}

impl PlaybackMachine {
    pub fn new(timing: Timing, started: Instant) -> Self {
        Self {
            timing,
            state: DisplayState {
                last_rendered_track: None,
                last_active: started,
                idle_shown: false,
                last_idle_render: None,
            },
            candidate: None,
        }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn candidate(&self) -> Option<&DebounceCandidate> {
        self.candidate.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.state.idle_shown {
            return Phase::IdleShown;
        }
        let rendered = self.state.last_rendered_track.as_deref();
        match (&self.candidate, rendered) {
            (Some(c), r) if r != Some(c.track_id.as_str()) => Phase::ActiveDebouncing,
            (_, Some(_)) => Phase::ActiveShown,
            _ => Phase::Blank,
        }
    }

    /// Fold one playback sample into the machine and decide the tick.
    ///
    /// Only observation bookkeeping happens here (activity time and the
    /// debounce candidate). What is on the panel changes through
    /// [`Self::rendered_now_playing`] and [`Self::rendered_idle`], which
    /// the caller invokes after the sink accepted a frame.
    pub fn observe(&mut self, snapshot: Option<&TrackSnapshot>, now: Instant) -> Decision {
        match snapshot.filter(|s| s.is_playing) {
            Some(track) => self.observe_playing(track, now),
            None => self.observe_stopped(now),
        }
    }

    fn observe_playing(&mut self, track: &TrackSnapshot, now: Instant) -> Decision {
        self.state.last_active = now;

        let candidate = match self.candidate.take() {
            Some(c) if c.track_id == track.id => c,
            _ => DebounceCandidate::new(track, now),
        };
        let settled = candidate.listened(now) >= self.timing.debounce;
        self.candidate = Some(candidate);

        let stale = self.state.idle_shown
            || self.state.last_rendered_track.as_deref() != Some(track.id.as_str());

        Decision {
            action: if settled && stale { Action::RenderNowPlaying } else { Action::Hold },
            sleep: self.timing.poll_active,
        }
    }

    fn observe_stopped(&mut self, now: Instant) -> Decision {
        let idle_for = now.saturating_duration_since(self.state.last_active);
        if idle_for < self.timing.idle_threshold {
            return Decision { action: Action::Hold, sleep: self.timing.poll_active };
        }

        let refresh_due = match self.state.last_idle_render {
            Some(at) => now.saturating_duration_since(at) >= self.timing.idle_refresh,
            None => true,
        };
        let action = if !self.state.idle_shown || refresh_due {
            Action::RenderIdle
        } else {
            Action::Hold
        };
        Decision { action, sleep: self.timing.poll_idle }
    }

    /// Commit a now playing frame that reached the panel.
    pub fn rendered_now_playing(&mut self, track_id: &str) {
        self.state.last_rendered_track = Some(track_id.to_string());
        self.state.idle_shown = false;
    }

    /// Commit an idle frame that reached the panel.
    pub fn rendered_idle(&mut self, now: Instant) {
        self.state.idle_shown = true;
        self.state.last_idle_render = Some(now);
    }

    /// Sleep after the service asked us to back off.
    pub fn rate_limited(&self, retry_after: Duration) -> Duration {
        self.timing.poll_active.max(retry_after)
    }

    /// Sleep after any other failure.
    pub fn failed(&self, nominal: Duration) -> Duration {
        nominal.max(self.timing.error_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn playing(id: &str, progress_ms: u64) -> TrackSnapshot {
        TrackSnapshot {
            id: id.to_string(),
            title: format!("Title {}", id),
            artists: "Artist".to_string(),
            art_url: Some("https://img/x".to_string()),
            progress_ms,
            is_playing: true,
        }
    }

    #[test]
    fn test_initial_state() {
        let t0 = Instant::now();
        let m = PlaybackMachine::new(Timing::default(), t0);
        assert_eq!(m.phase(), Phase::Blank);
        assert_eq!(m.state().last_active, t0);
        assert!(m.state().last_rendered_track.is_none());
    }

    #[test]
    fn test_debounce_renders_after_threshold() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let track = playing("a", 0);

        for s in 0..3 {
            let d = m.observe(Some(&track), t0 + secs(s));
            assert_eq!(d.action, Action::Hold, "tick {}", s);
            assert_eq!(d.sleep, secs(5));
        }
        assert_eq!(m.phase(), Phase::ActiveDebouncing);
        let d = m.observe(Some(&track), t0 + secs(3));
        assert_eq!(d.action, Action::RenderNowPlaying);
    }

    #[test]
    fn test_progress_counts_towards_debounce() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let d = m.observe(Some(&playing("a", 45_000)), t0);
        assert_eq!(d.action, Action::RenderNowPlaying);
    }

    #[test]
    fn test_skipping_through_tracks_never_renders() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            let at = t0 + Duration::from_millis(300 * i as u64);
            assert_eq!(m.observe(Some(&playing(id, 0)), at).action, Action::Hold);
        }
        assert_eq!(m.candidate().map(|c| c.track_id.as_str()), Some("c"));
    }

    #[test]
    fn test_rendered_track_is_not_redrawn() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let track = playing("a", 10_000);
        assert_eq!(m.observe(Some(&track), t0).action, Action::RenderNowPlaying);
        m.rendered_now_playing("a");
        assert_eq!(m.phase(), Phase::ActiveShown);
        assert_eq!(m.observe(Some(&track), t0 + secs(5)).action, Action::Hold);
    }

    #[test]
    fn test_uncommitted_render_is_retried() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let track = playing("a", 10_000);
        assert_eq!(m.observe(Some(&track), t0).action, Action::RenderNowPlaying);
        // no commit: the sink failed
        assert_eq!(m.observe(Some(&track), t0 + secs(60)).action, Action::RenderNowPlaying);
    }

    #[test]
    fn test_paused_track_counts_as_stopped() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let mut track = playing("a", 10_000);
        track.is_playing = false;
        let d = m.observe(Some(&track), t0 + secs(10));
        assert_eq!(d, Decision { action: Action::Hold, sleep: secs(5) });
        assert_eq!(m.state().last_active, t0);
    }

    #[test]
    fn test_idle_after_threshold_then_refresh_window() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);

        assert_eq!(m.observe(None, t0 + secs(299)).action, Action::Hold);
        let d = m.observe(None, t0 + secs(300));
        assert_eq!(d, Decision { action: Action::RenderIdle, sleep: secs(60) });
        m.rendered_idle(t0 + secs(300));
        assert_eq!(m.phase(), Phase::IdleShown);

        assert_eq!(m.observe(None, t0 + secs(360)).action, Action::Hold);
        assert_eq!(m.observe(None, t0 + secs(2099)).action, Action::Hold);
        assert_eq!(m.observe(None, t0 + secs(2100)).action, Action::RenderIdle);
    }

    #[test]
    fn test_resume_after_idle_redraws_same_track() {
        let t0 = Instant::now();
        let mut m = PlaybackMachine::new(Timing::default(), t0);
        let track = playing("a", 10_000);
        m.observe(Some(&track), t0);
        m.rendered_now_playing("a");

        let idle_at = t0 + secs(400);
        assert_eq!(m.observe(None, idle_at).action, Action::RenderIdle);
        m.rendered_idle(idle_at);

        let d = m.observe(Some(&track), idle_at + secs(5));
        assert_eq!(d.action, Action::RenderNowPlaying);
        m.rendered_now_playing("a");
        assert!(!m.state().idle_shown);
    }

    #[test]
    fn test_backoff_sleeps() {
        let m = PlaybackMachine::new(Timing::default(), Instant::now());
        assert_eq!(m.rate_limited(secs(30)), secs(30));
        assert_eq!(m.rate_limited(secs(1)), secs(5));
        assert_eq!(m.failed(secs(5)), secs(60));
        assert_eq!(m.failed(secs(90)), secs(90));
    }
}
