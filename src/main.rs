/*
 *  main.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, trace, warn};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use tft_coverart::assets::Assets;
use tft_coverart::config::{self, Cli, Settings};
use tft_coverart::constants::{NOT_ACTIVE_MESSAGE, TICK_INTERVAL};
use tft_coverart::cover::CoverResolver;
use tft_coverart::display::DisplayDriverFactory;
use tft_coverart::engine::{Engine, TickOutcome};
use tft_coverart::metadata;
use tft_coverart::mpd::MpdClient;
use tft_coverart::service;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> anyhow::Result<()> {
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

/// Probe the player service, then poll and render at the fixed tick.
/// Only returns on a hard error; normal exit is by signal.
async fn render_loop(engine: &mut Engine, settings: &Settings) -> anyhow::Result<()> {
    if settings.probe_service {
        let active = service::wait_until_active(
            &settings.mpd_service,
            settings.probe_attempts,
            Duration::from_secs(1),
        )
        .await;
        if !active {
            error!("{} is not active, giving up", settings.mpd_service);
            engine.show_message(NOT_ACTIVE_MESSAGE)?;
            // hold the message until we are told to stop
            std::future::pending::<()>().await;
        }
    }

    let mut client = MpdClient::new(&settings.mpd_host, settings.mpd_port);
    info!("polling mpd at {} every {:?}", client.address(), TICK_INTERVAL);

    loop {
        // blocking, bounded by the client's I/O timeout
        match client.status() {
            Ok(status) => {
                let snapshot = metadata::read_snapshot(&settings.metadata_file);
                match engine.tick(snapshot, &status) {
                    Ok(TickOutcome::Rendered(summary)) => trace!("frame {:?}", summary),
                    Ok(_) => {}
                    Err(e) => warn!("frame not pushed: {e}"),
                }
            }
            // previous frame stays on screen
            Err(e) => trace!("no player status this tick: {e}"),
        }
        tokio::time::sleep(TICK_INTERVAL).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    // Initialize the logger with the appropriate level based on debug flag
    let level = if cli.debug { "debug".to_string() } else { cfg.log_level.clone().unwrap_or_else(|| "info".to_string()) };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let settings = Settings::from_config(&cfg);
    let images = settings.assets_dir.join("images");
    let assets = Arc::new(
        Assets::load(&images, settings.ppbutton)
            .with_context(|| format!("loading assets from {}", images.display()))?,
    );
    let resolver = CoverResolver::new(
        settings.music_root.clone(),
        settings.web_root.clone(),
        Arc::clone(&assets),
    );
    let driver = DisplayDriverFactory::create(&settings).context("creating panel driver")?;

    let mut engine = Engine::new(&settings, assets, Box::new(resolver), driver);
    engine.start().context("initializing panel")?;

    // Main application loop
    tokio::select! {
        // Handle Unix signals for graceful shutdown
        res = signal_handler() => {
            if let Err(e) = res {
                error!("signal handler failed: {e}");
            }
        }
        res = render_loop(&mut engine, &settings) => {
            if let Err(e) = res {
                error!("render loop stopped: {e:#}");
            }
        }
    }

    if let Err(e) = engine.shutdown() {
        error!("display shutdown failed: {e}");
    }
    info!("bye");
    Ok(())
}
