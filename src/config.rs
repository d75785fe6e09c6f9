use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::deutils::deserialize_opt_bool_from_anything;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration as it appears in config.yml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub paths: Option<PathsConfig>,
    pub mpd: Option<MpdConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    /// board variant, 3 wires a reset pin
    pub mode: Option<u8>,
    /// 0 none, 1 volume, 2 play/pause, 3 cover only
    pub overlay: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_opt_bool_from_anything")]
    pub timebar: Option<bool>,
    /// seconds idle before the backlight goes off, 0 disables
    pub blank: Option<u32>,
    /// drop shadow offset in pixels, 0 disables
    pub shadow: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_bool_from_anything")]
    pub ppbutton: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_bool_from_anything")]
    pub pauseblank: Option<bool>,
    pub scrollspeed: Option<f32>,
    pub rotation: Option<u16>,
    pub spi_speed_hz: Option<u32>,
    pub bus: Option<SpiBusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    pub metadata_file: Option<PathBuf>,
    pub music_root: Option<PathBuf>,
    pub web_root: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MpdConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub service: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_bool_from_anything")]
    pub probe_service: Option<bool>,
    pub probe_attempts: Option<u32>,
}

/// SPI wiring; defaults match the Pirate Audio boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiBusConfig {
    pub port: Option<u8>,
    pub chip_select: Option<u8>,
    pub dc_pin: Option<u8>,
    pub backlight_pin: Option<u8>,
    pub rst_pin: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    St7789,
    Headless,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "tft-coverart", version, about = "Now playing cover art on a 240x240 TFT")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long)]
    pub overlay: Option<u8>,
    #[arg(long)]
    pub rotation: Option<u16>,
    #[arg(long)]
    pub mpd_host: Option<String>,
    #[arg(long)]
    pub mpd_port: Option<u16>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metadata_file: Option<PathBuf>,
    /// skip the systemd probe for the player service
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_probe: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML (explicit path or search), layer CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = load_file(cli.config.as_deref())?;
    apply_cli_overrides(&mut cfg, cli);
    validate(&cfg)?;
    Ok(cfg)
}

/// YAML only, no CLI layer. An explicit path must exist; the search may find nothing.
pub fn load_file(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();
    if let Some(p) = path {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        merge(&mut cfg, read_yaml(p)?);
    } else if let Some(p) = find_config_file() {
        log::info!("using config {}", p.display());
        merge(&mut cfg, read_yaml(&p)?);
    }
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // project local first, this is where the service runs from
    for candidate in &["config.yml", "config.yaml", "config/tft-coverart.yml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    if let Some(home) = home_dir() {
        let p = home.join(".config/tft-coverart/config.yml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/tft-coverart.yml");
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is a valid "all defaults" config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    if src.paths.is_some() { dst.paths = src.paths; }
    if src.mpd.is_some() { dst.mpd = src.mpd; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()       { dst.driver = src.driver; }
    if src.mode.is_some()         { dst.mode = src.mode; }
    if src.overlay.is_some()      { dst.overlay = src.overlay; }
    if src.timebar.is_some()      { dst.timebar = src.timebar; }
    if src.blank.is_some()        { dst.blank = src.blank; }
    if src.shadow.is_some()       { dst.shadow = src.shadow; }
    if src.ppbutton.is_some()     { dst.ppbutton = src.ppbutton; }
    if src.pauseblank.is_some()   { dst.pauseblank = src.pauseblank; }
    if src.scrollspeed.is_some()  { dst.scrollspeed = src.scrollspeed; }
    if src.rotation.is_some()     { dst.rotation = src.rotation; }
    if src.spi_speed_hz.is_some() { dst.spi_speed_hz = src.spi_speed_hz; }
    if src.bus.is_some()          { dst.bus = src.bus; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    let any_display = cli.driver.is_some() || cli.overlay.is_some() || cli.rotation.is_some();
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.driver.is_some()   { display.driver = cli.driver; }
        if cli.overlay.is_some()  { display.overlay = cli.overlay; }
        if cli.rotation.is_some() { display.rotation = cli.rotation; }
    }

    if cli.mpd_host.is_some() || cli.mpd_port.is_some() || cli.no_probe {
        let mpd = cfg.mpd.get_or_insert_with(MpdConfig::default);
        if cli.mpd_host.is_some() { mpd.host = cli.mpd_host.clone(); }
        if cli.mpd_port.is_some() { mpd.port = cli.mpd_port; }
        if cli.no_probe           { mpd.probe_service = Some(false); }
    }

    if cli.metadata_file.is_some() {
        let paths = cfg.paths.get_or_insert_with(PathsConfig::default);
        paths.metadata_file = cli.metadata_file.clone();
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if let Some(overlay) = display.overlay {
            if overlay > 3 {
                return Err(ConfigError::Validation(format!("display overlay must be 0..=3, got {overlay}")));
            }
        }
        if let Some(rot) = display.rotation {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotation must be 0|90|180|270".into()))
            }
        }
        if let Some(speed) = display.scrollspeed {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::Validation("display scrollspeed must be > 0".into()));
            }
        }
        if let Some(hz) = display.spi_speed_hz {
            if hz == 0 {
                return Err(ConfigError::Validation("display spi_speed_hz must be > 0".into()));
            }
        }
    }
    Ok(())
}

/// What the overlay draws on top of the cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    None,
    Volume,
    PlayPause,
    CoverOnly,
}

impl OverlayMode {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => OverlayMode::None,
            1 => OverlayMode::Volume,
            2 => OverlayMode::PlayPause,
            _ => OverlayMode::CoverOnly,
        }
    }

    /// Everything but the plain cover mode sits on a blurred background.
    pub fn blurs_background(&self) -> bool { *self != OverlayMode::CoverOnly }
    pub fn shows_icon(&self) -> bool { matches!(self, OverlayMode::Volume | OverlayMode::PlayPause) }
    pub fn shows_volume_bar(&self) -> bool { self.shows_icon() }
    pub fn shows_text(&self) -> bool { *self != OverlayMode::CoverOnly }
}

/// Resolved SPI wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiWiring {
    pub port: u8,
    pub chip_select: u8,
    pub dc_pin: u8,
    pub backlight_pin: u8,
    pub rst_pin: Option<u8>,
    pub speed_hz: u32,
}

/// Fully resolved settings, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct Settings {
    pub driver: DriverKind,
    pub overlay: OverlayMode,
    pub timebar: bool,
    pub blank_secs: u32,
    pub shadow: u32,
    pub ppbutton: bool,
    pub pauseblank: bool,
    pub scrollspeed: f32,
    pub rotation: u16,
    pub wiring: SpiWiring,
    pub metadata_file: PathBuf,
    pub music_root: PathBuf,
    pub web_root: PathBuf,
    pub assets_dir: PathBuf,
    pub snapshot: Option<PathBuf>,
    pub mpd_host: String,
    pub mpd_port: u16,
    pub mpd_service: String,
    pub probe_service: bool,
    pub probe_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        let display = cfg.display.clone().unwrap_or_default();
        let paths = cfg.paths.clone().unwrap_or_default();
        let mpd = cfg.mpd.clone().unwrap_or_default();

        let mode = display.mode.unwrap_or(0);
        let bus = display.bus.clone();
        let wiring = SpiWiring {
            port: bus.as_ref().and_then(|b| b.port).unwrap_or(0),
            chip_select: bus.as_ref().and_then(|b| b.chip_select).unwrap_or(1),
            dc_pin: bus.as_ref().and_then(|b| b.dc_pin).unwrap_or(9),
            backlight_pin: bus.as_ref().and_then(|b| b.backlight_pin).unwrap_or(13),
            rst_pin: bus.as_ref().and_then(|b| b.rst_pin).or(if mode == 3 { Some(22) } else { None }),
            speed_hz: display.spi_speed_hz.unwrap_or(100_000_000),
        };

        let assets_dir = paths.assets_dir.unwrap_or_else(|| PathBuf::from("."));
        let mpd_host = mpd.host
            .or_else(|| std::env::var("MPD_HOST").ok())
            .unwrap_or_else(|| "localhost".to_string());
        let mpd_port = mpd.port
            .or_else(|| std::env::var("MPD_PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(6600);

        Settings {
            driver: display.driver.unwrap_or(DriverKind::St7789),
            overlay: OverlayMode::from_code(display.overlay.unwrap_or(2)),
            timebar: display.timebar.unwrap_or(true),
            blank_secs: display.blank.unwrap_or(0),
            shadow: display.shadow.unwrap_or(0),
            ppbutton: display.ppbutton.unwrap_or(false),
            pauseblank: display.pauseblank.unwrap_or(false),
            scrollspeed: display.scrollspeed.unwrap_or(2.0),
            rotation: display.rotation.unwrap_or(0),
            wiring,
            metadata_file: paths.metadata_file
                .unwrap_or_else(|| PathBuf::from("/var/local/www/currentsong.txt")),
            music_root: paths.music_root.unwrap_or_else(|| PathBuf::from("/var/lib/mpd/music")),
            web_root: paths.web_root.unwrap_or_else(|| PathBuf::from("/var/local/www")),
            snapshot: paths.snapshot.or_else(|| Some(assets_dir.join("dump.jpg"))),
            assets_dir,
            mpd_host,
            mpd_port,
            mpd_service: mpd.service.unwrap_or_else(|| "mpd".to_string()),
            probe_service: mpd.probe_service.unwrap_or(true),
            probe_attempts: mpd.probe_attempts.unwrap_or(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
display:
  overlay: 1
  timebar: 0
  blank: 30
  shadow: 2
  ppbutton: 1
  pauseblank: true
  scrollspeed: 3
  rotation: 90
  spi_speed_hz: 80000000
  mode: 3
"#;

    #[test]
    fn test_yaml_flags_and_defaults() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        validate(&cfg).unwrap();
        let s = Settings::from_config(&cfg);
        assert_eq!(s.overlay, OverlayMode::Volume);
        assert!(!s.timebar);
        assert_eq!(s.blank_secs, 30);
        assert_eq!(s.shadow, 2);
        assert!(s.ppbutton);
        assert!(s.pauseblank);
        assert_eq!(s.scrollspeed, 3.0);
        assert_eq!(s.rotation, 90);
        assert_eq!(s.wiring.speed_hz, 80_000_000);
        assert_eq!(s.wiring.rst_pin, Some(22));
        assert_eq!(s.wiring.dc_pin, 9);
        assert_eq!(s.music_root, PathBuf::from("/var/lib/mpd/music"));
    }

    #[test]
    fn test_empty_config_is_defaults() {
        let s = Settings::from_config(&parse_yaml("").unwrap());
        assert_eq!(s.overlay, OverlayMode::PlayPause);
        assert!(s.timebar);
        assert_eq!(s.blank_secs, 0);
        assert_eq!(s.scrollspeed, 2.0);
        assert_eq!(s.wiring.rst_pin, None);
        assert_eq!(s.driver, DriverKind::St7789);
    }

    #[test]
    fn test_validation() {
        let bad_overlay = parse_yaml("display:\n  overlay: 7\n").unwrap();
        assert!(validate(&bad_overlay).is_err());
        let bad_rot = parse_yaml("display:\n  rotation: 45\n").unwrap();
        assert!(validate(&bad_rot).is_err());
        let bad_speed = parse_yaml("display:\n  scrollspeed: 0\n").unwrap();
        assert!(validate(&bad_speed).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let cli = Cli::parse_from(["tft-coverart", "--overlay", "3", "--driver", "headless", "--no-probe"]);
        apply_cli_overrides(&mut cfg, &cli);
        let s = Settings::from_config(&cfg);
        assert_eq!(s.overlay, OverlayMode::CoverOnly);
        assert_eq!(s.driver, DriverKind::Headless);
        assert!(!s.probe_service);
        // untouched yaml values survive
        assert_eq!(s.shadow, 2);
    }

    #[test]
    fn test_overlay_mode_flags() {
        assert!(OverlayMode::None.blurs_background());
        assert!(!OverlayMode::None.shows_icon());
        assert!(OverlayMode::Volume.shows_volume_bar());
        assert!(OverlayMode::PlayPause.shows_icon());
        assert!(!OverlayMode::CoverOnly.blurs_background());
        assert!(!OverlayMode::CoverOnly.shows_text());
    }
}
