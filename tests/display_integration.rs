/*
 *  tests/display_integration.rs
 *
 *  End to end tests: snapshot and status in, frame and backlight out,
 *  on the headless driver
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

use tft_coverart::assets::{Assets, Icon, IconSet};
use tft_coverart::config::{DriverKind, OverlayMode, Settings};
use tft_coverart::constants::*;
use tft_coverart::cover::{CoverResolver, CoverSource};
use tft_coverart::display::drivers::headless::{HeadlessDriver, HeadlessState};
use tft_coverart::display::Scheme;
use tft_coverart::engine::{Engine, TickOutcome};
use tft_coverart::metadata::{PlaybackSnapshot, Source};
use tft_coverart::mpd::{PlayState, PlayerStatus};

const BLUETOOTH_BG: [u8; 3] = [10, 40, 160];

fn assets() -> Arc<Assets> {
    let clear = RgbaImage::from_pixel(DISPLAY_WIDTH, DISPLAY_HEIGHT, Rgba([0, 0, 0, 0]));
    let set = IconSet { play: clear.clone(), pause: clear.clone(), volume: clear };
    let mut backgrounds = HashMap::new();
    for (source, rgb) in [
        (Source::Bluetooth, BLUETOOTH_BG),
        (Source::Airplay, [1, 1, 1]),
        (Source::Input, [2, 2, 2]),
        (Source::Spotify, [3, 3, 3]),
        (Source::Squeeze, [4, 4, 4]),
    ] {
        backgrounds.insert(source, DynamicImage::ImageRgb8(RgbImage::from_pixel(DISPLAY_WIDTH, DISPLAY_HEIGHT, Rgb(rgb))));
    }
    let default_cover = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([120, 120, 120])));
    Arc::new(Assets::new(set.clone(), set, backgrounds, default_cover, false))
}

/// Mid grey cover every time, counting calls
struct CountingSource(Arc<AtomicU32>);

impl CoverSource for CountingSource {
    fn resolve(&self, _snapshot: &PlaybackSnapshot) -> DynamicImage {
        self.0.fetch_add(1, Ordering::SeqCst);
        DynamicImage::ImageRgb8(RgbImage::from_pixel(500, 500, Rgb([120, 120, 120])))
    }
}

struct Rig {
    engine: Engine,
    panel: Arc<Mutex<HeadlessState>>,
    resolves: Arc<AtomicU32>,
    _dir: tempfile::TempDir,
}

fn rig(tweak: impl FnOnce(&mut Settings)) -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings {
        driver: DriverKind::Headless,
        snapshot: Some(dir.path().join("dump.jpg")),
        ..Settings::default()
    };
    tweak(&mut settings);

    let driver = HeadlessDriver::new();
    let panel = driver.state();
    let resolves = Arc::new(AtomicU32::new(0));
    let mut engine = Engine::new(
        &settings,
        assets(),
        Box::new(CountingSource(Arc::clone(&resolves))),
        Box::new(driver),
    );
    engine.start().unwrap();
    Rig { engine, panel, resolves, _dir: dir }
}

fn status(state: PlayState, volume: u8, elapsed: f64, duration: f64) -> PlayerStatus {
    PlayerStatus {
        state: Some(state),
        volume: Some(volume),
        elapsed: Some(elapsed),
        duration: Some(duration),
    }
}

fn parse(record: &str) -> PlaybackSnapshot {
    PlaybackSnapshot::parse(record).unwrap()
}

#[test]
fn test_library_track_frame() {
    let mut rig = rig(|_| {});
    let snap = parse("file=song.mp3\nartist=A\nalbum=B\ntitle=C");
    assert_eq!(snap.source, Source::Library);

    let outcome = rig.engine.tick(Ok(snap), &status(PlayState::Play, 50, 30.0, 120.0)).unwrap();
    let TickOutcome::Rendered(summary) = outcome else {
        panic!("expected a frame, got {outcome:?}");
    };
    assert_eq!(summary.icon, Some(Icon::Play));
    assert_eq!(summary.volume_fill, Some(VOLUME_BAR_WIDTH / 2));
    assert_eq!(summary.progress_fill, Some(PROGRESS_BAR_WIDTH / 4));
    assert!(!summary.scrolling);
    assert_eq!(summary.scheme, Scheme::Neutral);

    let panel = rig.panel.lock().unwrap();
    assert_eq!(panel.init_count, 1);
    assert_eq!(panel.frame_count, 1);
    assert_eq!(panel.backlight, Some(true));
    assert_eq!(panel.last_frame.as_ref().unwrap().dimensions(), (DISPLAY_WIDTH, DISPLAY_HEIGHT));
    assert!(rig._dir.path().join("dump.jpg").exists());
}

#[test]
fn test_identical_tick_skips_all_work() {
    let mut rig = rig(|_| {});
    let st = status(PlayState::Play, 50, 30.0, 120.0);
    let record = "file=song.mp3\nartist=A\nalbum=B\ntitle=C";

    assert!(matches!(rig.engine.tick(Ok(parse(record)), &st).unwrap(), TickOutcome::Rendered(_)));
    assert_eq!(rig.engine.tick(Ok(parse(record)), &st).unwrap(), TickOutcome::Unchanged);
    assert_eq!(rig.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(rig.engine.cover_resolutions(), 1);
    assert_eq!(rig.panel.lock().unwrap().frame_count, 1);

    // elapsed moves, frame redrawn, cover reused
    let st = status(PlayState::Play, 50, 31.0, 120.0);
    assert!(matches!(rig.engine.tick(Ok(parse(record)), &st).unwrap(), TickOutcome::Rendered(_)));
    assert_eq!(rig.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(rig.panel.lock().unwrap().frame_count, 2);
}

#[test]
fn test_only_first_frame_is_dumped() {
    let mut rig = rig(|_| {});
    let dump = rig._dir.path().join("dump.jpg");
    rig.engine.tick(Ok(parse("file=a.mp3\ntitle=a")), &status(PlayState::Play, 10, 1.0, 9.0)).unwrap();
    let first = std::fs::metadata(&dump).unwrap().modified().unwrap();
    std::fs::remove_file(&dump).unwrap();
    rig.engine.tick(Ok(parse("file=b.mp3\ntitle=b")), &status(PlayState::Play, 10, 1.0, 9.0)).unwrap();
    assert!(!dump.exists(), "dump written again after {first:?}");
    assert_eq!(rig.engine.frames(), 2);
}

#[test]
fn test_scrolling_forces_redraw() {
    let mut rig = rig(|_| {});
    let st = status(PlayState::Play, 50, 30.0, 120.0);
    let record = format!("file=song.mp3\ntitle={}", "Long title ".repeat(6));
    for _ in 0..5 {
        let outcome = rig.engine.tick(Ok(parse(&record)), &st).unwrap();
        let TickOutcome::Rendered(summary) = outcome else {
            panic!("scrolling text must redraw every tick");
        };
        assert!(summary.scrolling);
    }
    assert_eq!(rig.resolves.load(Ordering::SeqCst), 1);
}

#[test]
fn test_track_change_resets_scroll() {
    let mut rig = rig(|_| {});
    let st = status(PlayState::Play, 50, 30.0, 120.0);
    let long = "Long title ".repeat(6);
    for _ in 0..10 {
        rig.engine.tick(Ok(parse(&format!("file=one.mp3\ntitle={long}"))), &st).unwrap();
    }
    let moved = rig.engine.compositor().scrollers().state(tft_coverart::display::components::TextField::Title).offset();
    assert!(moved < SCROLL_START_OFFSET);

    rig.engine.tick(Ok(parse(&format!("file=two.mp3\ntitle={long}"))), &st).unwrap();
    let fresh = rig.engine.compositor().scrollers().state(tft_coverart::display::components::TextField::Title).offset();
    // reset to the start, then one step
    assert_eq!(fresh, SCROLL_START_OFFSET - 2.0 * SCROLL_STEP_FACTOR);
}

#[test]
fn test_radio_title_split() {
    let mut rig = rig(|_| {});
    let snap = parse("file=http://stream\ntitle=StationName - SongTitle");
    assert_eq!(snap.source, Source::Radio);
    assert_eq!(snap.artist.as_deref(), Some("StationName"));
    assert_eq!(snap.title.as_deref(), Some("SongTitle"));

    let outcome = rig.engine.tick(Ok(snap), &status(PlayState::Play, 80, 12.0, 0.0)).unwrap();
    let TickOutcome::Rendered(summary) = outcome else { panic!("expected a frame") };
    // live streams report no usable duration
    assert_eq!(summary.progress_fill, None);
    assert_eq!(summary.volume_fill, Some(VOLUME_BAR_WIDTH * 4 / 5));
}

#[test]
fn test_bluetooth_uses_fixed_background() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        driver: DriverKind::Headless,
        overlay: OverlayMode::CoverOnly,
        snapshot: None,
        music_root: dir.path().into(),
        web_root: dir.path().into(),
        ..Settings::default()
    };
    let assets = assets();
    let resolver = CoverResolver::new(dir.path().into(), dir.path().into(), Arc::clone(&assets));
    let driver = HeadlessDriver::new();
    let panel = driver.state();
    let mut engine = Engine::new(&settings, assets, Box::new(resolver), Box::new(driver));
    engine.start().unwrap();

    let snap = parse("file=Bluetooth Active\ncoverurl=imagesw%2Fsome-logo.jpg");
    assert_eq!(snap.source, Source::Bluetooth);
    let outcome = engine.tick(Ok(snap), &status(PlayState::Play, 50, 0.0, 0.0)).unwrap();
    let TickOutcome::Rendered(summary) = outcome else { panic!("expected a frame") };
    assert!(summary.multiline);
    assert_eq!(summary.icon, None);

    let panel = panel.lock().unwrap();
    let frame = panel.last_frame.as_ref().unwrap();
    assert_eq!(frame.get_pixel(0, 0).0, BLUETOOTH_BG);
    assert_eq!(frame.get_pixel(DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 1).0, BLUETOOTH_BG);
}

#[test]
fn test_backlight_blanks_and_wakes() {
    let mut rig = rig(|s| s.blank_secs = 1);
    let record = "file=song.mp3\ntitle=C";
    let stopped = status(PlayState::Stop, 50, 0.0, 120.0);

    // counts on unchanged ticks too
    for _ in 0..TICKS_PER_SECOND {
        rig.engine.tick(Ok(parse(record)), &stopped).unwrap();
    }
    assert!(rig.engine.backlight().is_lit());
    rig.engine.tick(Ok(parse(record)), &stopped).unwrap();
    assert!(!rig.engine.backlight().is_lit());
    assert_eq!(rig.panel.lock().unwrap().backlight, Some(false));

    rig.engine.tick(Ok(parse(record)), &status(PlayState::Play, 50, 1.0, 120.0)).unwrap();
    assert_eq!(rig.engine.backlight().counter(), 0);
    let panel = rig.panel.lock().unwrap();
    // on at start, off once, on again
    assert_eq!(panel.backlight_log, vec![true, false, true]);
}

#[test]
fn test_pause_blank_needs_both_flags() {
    let mut rig = rig(|s| s.blank_secs = 1);
    let paused = status(PlayState::Pause, 50, 10.0, 120.0);
    for _ in 0..100 {
        rig.engine.tick(Ok(parse("file=a.mp3\ntitle=a")), &paused).unwrap();
    }
    assert!(rig.engine.backlight().is_lit());

    let mut rig = rig_with_pauseblank();
    for _ in 0..100 {
        rig.engine.tick(Ok(parse("file=a.mp3\ntitle=a")), &paused).unwrap();
    }
    assert!(!rig.engine.backlight().is_lit());
}

fn rig_with_pauseblank() -> Rig {
    rig(|s| {
        s.blank_secs = 1;
        s.pauseblank = true;
    })
}

#[test]
fn test_malformed_record_skips_tick() {
    let mut rig = rig(|_| {});
    let bad = PlaybackSnapshot::parse("file=a.mp3\nthis line has no separator");
    assert!(bad.is_err());
    let outcome = rig.engine.tick(bad, &status(PlayState::Play, 50, 1.0, 2.0)).unwrap();
    assert_eq!(outcome, TickOutcome::Skipped);
    assert_eq!(rig.panel.lock().unwrap().frame_count, 0);

    // next good tick renders normally
    let outcome = rig.engine.tick(Ok(parse("file=a.mp3\ntitle=x")), &status(PlayState::Play, 50, 1.0, 2.0)).unwrap();
    assert!(matches!(outcome, TickOutcome::Rendered(_)));
}

#[test]
fn test_failed_transfer_is_reported() {
    let mut rig = rig(|_| {});
    rig.panel.lock().unwrap().simulate_display_failure = true;
    let res = rig.engine.tick(Ok(parse("file=a.mp3\ntitle=x")), &status(PlayState::Play, 50, 1.0, 2.0));
    assert!(res.is_err());
}

#[test]
fn test_failed_transfer_is_retried_on_identical_ticks() {
    let mut rig = rig(|_| {});
    let record = "file=a.mp3\ntitle=x";
    let st = status(PlayState::Stop, 50, 0.0, 120.0);

    rig.panel.lock().unwrap().simulate_display_failure = true;
    assert!(rig.engine.tick(Ok(parse(record)), &st).is_err());
    rig.panel.lock().unwrap().simulate_display_failure = false;

    // same record and status, but the frame never reached the panel
    let outcome = rig.engine.tick(Ok(parse(record)), &st).unwrap();
    assert!(matches!(outcome, TickOutcome::Rendered(_)), "got {outcome:?}");
    assert_eq!(rig.panel.lock().unwrap().frame_count, 1);
    // cover was kept from the failed tick
    assert_eq!(rig.resolves.load(Ordering::SeqCst), 1);

    assert_eq!(rig.engine.tick(Ok(parse(record)), &st).unwrap(), TickOutcome::Unchanged);
    assert_eq!(rig.panel.lock().unwrap().frame_count, 1);
}

#[test]
fn test_failed_backlight_switch_is_retried() {
    let mut rig = rig(|s| s.blank_secs = 1);
    let record = "file=song.mp3\ntitle=C";
    let stopped = status(PlayState::Stop, 50, 0.0, 120.0);

    for _ in 0..TICKS_PER_SECOND {
        rig.engine.tick(Ok(parse(record)), &stopped).unwrap();
    }
    rig.panel.lock().unwrap().simulate_backlight_failure = true;
    assert!(rig.engine.tick(Ok(parse(record)), &stopped).is_err());
    assert_eq!(rig.panel.lock().unwrap().backlight, Some(true));

    rig.panel.lock().unwrap().simulate_backlight_failure = false;
    rig.engine.tick(Ok(parse(record)), &stopped).unwrap();
    let panel = rig.panel.lock().unwrap();
    assert_eq!(panel.backlight, Some(false));
    assert_eq!(panel.backlight_log, vec![true, false]);
}

#[test]
fn test_message_and_shutdown() {
    let mut rig = rig(|_| {});
    rig.engine.show_message(NOT_ACTIVE_MESSAGE).unwrap();
    rig.engine.shutdown().unwrap();

    let panel = rig.panel.lock().unwrap();
    assert_eq!(panel.frame_count, 1);
    assert_eq!(panel.reset_count, 1);
    assert_eq!(panel.backlight, Some(false));
    let frame = panel.last_frame.as_ref().unwrap();
    assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0]);
    assert!(frame.pixels().any(|p| p.0 == [255, 255, 255]));
}
