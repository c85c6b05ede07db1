/*
 *  main.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Entry point: configuration, logging, signals and the poll loop
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

use std::time::Instant;

use anyhow::Context;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};

use nowink::artwork::HttpArtwork;
use nowink::config;
use nowink::display::{DisplayManager, SinkFactory, Theme};
use nowink::poller::Poller;
use nowink::spotify::SpotifyClient;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    let panel = cfg.panel_spec();
    let orientation = cfg.orientation();
    let constraints = cfg.layout_constraints();

    info!("NowInk - now playing, on paper");
    info!("build {}", BUILD_DATE);
    info!(
        "panel {}x{} {:?}{} | album art {}px",
        panel.width,
        panel.height,
        orientation.rotation,
        if orientation.flip_180 { " (flipped)" } else { "" },
        constraints.nominal_art_side
    );

    let sink = SinkFactory::create_from_config(&cfg.output(), panel)
        .context("creating frame sink")?;
    let artwork = HttpArtwork::new().context("creating artwork client")?;
    let display = DisplayManager::new(sink, artwork, orientation, constraints, Theme::default())
        .context("creating display manager")?;
    let service = SpotifyClient::new(cfg.spotify_settings()?).context("creating spotify client")?;

    let mut poller = Poller::new(
        service,
        display,
        cfg.timing(),
        cfg.top_limit(),
        cfg.top_time_range(),
        Instant::now(),
    );

    let shutdown = async {
        if let Err(e) = signal_handler().await {
            error!("signal handler failed: {}", e);
            // Without signals, run until killed.
            std::future::pending::<()>().await;
        }
    };
    poller.run(shutdown).await;

    info!("NowInk stopped");
    Ok(())
}
