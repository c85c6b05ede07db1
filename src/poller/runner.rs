/*
 *  poller/runner.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tick driver: poll, decide, render, sleep
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

use std::future::Future;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::artwork::ArtworkSource;
use crate::display::components::StatusLine;
use crate::display::{DisplayError, DisplayManager, DisplaySink};
use crate::poller::machine::{Action, PlaybackMachine, Timing};
use crate::poller::top_cache::TopTracksCache;
use crate::service::{MusicService, ServiceError, TimeRange, TrackSnapshot};

/// Why a tick produced no frame.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("music service: {0}")]
    Service(#[from] ServiceError),
    #[error("display: {0}")]
    Display(#[from] DisplayError),
}

/// Which screen reached the panel during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    NowPlaying,
    /// Top tracks, with the number of list entries that fit
    Idle { entries: usize },
}

/// Result of one tick: what was shown and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub sleep: Duration,
    pub rendered: Option<Screen>,
}

impl TickOutcome {
    fn idle(sleep: Duration) -> Self {
        Self { sleep, rendered: None }
    }
}

/// Owns every collaborator and all mutable poller state.
///
/// Ticks run strictly one after another; the state machine is only
/// told about a frame once the sink accepted it.
pub struct Poller<S, D, A> {
    service: S,
    display: DisplayManager<D, A>,
    machine: PlaybackMachine,
    top: TopTracksCache,
}

impl<S, D, A> Poller<S, D, A>
where
    S: MusicService,
    D: DisplaySink,
    A: ArtworkSource,
{
    pub fn new(
        service: S,
        display: DisplayManager<D, A>,
        timing: Timing,
        top_limit: u32,
        window: TimeRange,
        started: Instant,
    ) -> Self {
        Self {
            service,
            display,
            top: TopTracksCache::new(timing.top_cache_ttl, top_limit, window),
            machine: PlaybackMachine::new(timing, started),
        }
    }

    pub fn machine(&self) -> &PlaybackMachine {
        &self.machine
    }

    pub fn display(&self) -> &DisplayManager<D, A> {
        &self.display
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Interval used when a tick fails before a decision was made.
    fn nominal_sleep(&self) -> Duration {
        let t = self.machine.timing();
        if self.machine.state().idle_shown { t.poll_idle } else { t.poll_active }
    }

    /// One poll of the service at `now`; `status` is the clock/date text
    /// for any frame composed during the tick. Never fails: errors are
    /// logged and folded into the returned sleep.
    pub async fn tick(&mut self, now: Instant, status: &StatusLine) -> TickOutcome {
        let snapshot = match self.service.current_playback().await {
            Ok(s) => s,
            Err(e) => return self.recover(e.into(), self.nominal_sleep()),
        };

        let decision = self.machine.observe(snapshot.as_ref(), now);
        debug!("tick: {:?} -> {:?}", self.machine.phase(), decision);

        let result = match (decision.action, snapshot.as_ref()) {
            (Action::RenderNowPlaying, Some(track)) => {
                self.render_now_playing(track, status).await.map(Some)
            }
            (Action::RenderIdle, _) => self.render_idle(now, status).await.map(Some),
            _ => Ok(None),
        };

        match result {
            Ok(rendered) => TickOutcome { sleep: decision.sleep, rendered },
            Err(e) => self.recover(e, decision.sleep),
        }
    }

    async fn render_now_playing(
        &mut self,
        track: &TrackSnapshot,
        status: &StatusLine,
    ) -> Result<Screen, TickError> {
        self.display.show_now_playing(track, status).await?;
        self.machine.rendered_now_playing(&track.id);
        info!(
            "Now playing: {} - {} | {} {}",
            track.title, track.artists, status.clock, status.date
        );
        Ok(Screen::NowPlaying)
    }

    async fn render_idle(&mut self, now: Instant, status: &StatusLine) -> Result<Screen, TickError> {
        let items = self.top.get_or_refresh(&mut self.service, now).await?;
        let entries = self.display.show_top_tracks(&items, status).await?;
        self.machine.rendered_idle(now);
        info!(
            "Idle mode: top tracks ({} of {}) | {} {}",
            entries,
            items.len(),
            status.clock,
            status.date
        );
        Ok(Screen::Idle { entries })
    }

    fn recover(&self, err: TickError, nominal: Duration) -> TickOutcome {
        match err {
            TickError::Service(ServiceError::RateLimited { retry_after }) => {
                let sleep = self.machine.rate_limited(retry_after).max(nominal);
                warn!("rate limited, backing off for {}s", sleep.as_secs());
                TickOutcome::idle(sleep)
            }
            e => {
                let sleep = self.machine.failed(nominal);
                error!("tick failed: {} (retry in {}s)", e, sleep.as_secs());
                TickOutcome::idle(sleep)
            }
        }
    }

    /// Tick forever, sleeping as each tick asks, until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let outcome = self.tick(Instant::now(), &StatusLine::now()).await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("poller stopping");
                    break;
                }
                _ = tokio::time::sleep(outcome.sleep) => {}
            }
        }
    }
}
