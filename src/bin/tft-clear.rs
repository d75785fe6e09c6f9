/*
 *  bin/tft-clear.rs
 *
 *  tft-coverart - clear the panel and switch the backlight off
 *
 *  (c) 2020-26 Stuart Hunter
 *
 *  Run from the service's ExecStop so the panel does not keep the last frame.
 *
 *  Usage:
 *    tft-clear
 *    tft-clear -c /home/pi/tft-coverart/config.yml
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use tft_coverart::config::{self, Cli, Settings};
use tft_coverart::display::DisplayDriverFactory;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug { "debug" } else { "info" }))
        .format_timestamp_secs()
        .init();

    let cfg = config::load(&cli).context("loading configuration")?;
    let settings = Settings::from_config(&cfg);

    let mut driver = DisplayDriverFactory::create(&settings).context("creating panel driver")?;
    driver.init().context("initializing panel")?;
    driver.clear().context("clearing panel")?;
    driver.set_backlight(false).context("backlight off")?;

    info!("panel cleared");
    Ok(())
}
