//! This module contains global constants used across the display and other modules.

use std::time::Duration;

/// The total width of the TFT canvas in pixels.
pub const DISPLAY_WIDTH: u32 = 240;
/// The total height of the TFT canvas in pixels.
pub const DISPLAY_HEIGHT: u32 = 240;

/// Fixed render loop interval (~20 fps). Scroll speed assumes this stays constant.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Ticks per second at the fixed interval, used to turn blank seconds into ticks.
pub const TICKS_PER_SECOND: u32 = 20;

// Text field placement (top of the glyph cell)
pub const ARTIST_TOP: i32 = 7;
pub const ALBUM_TOP: i32 = 35;
pub const TITLE_TOP: i32 = 105;

/// Offset a track change resets every scroller to.
pub const SCROLL_START_OFFSET: f32 = 20.0;
/// Gap between the two copies of a marquee.
pub const SCROLL_GAP: f32 = 60.0;
/// Marquee advance per frame is `scrollspeed * SCROLL_STEP_FACTOR`.
pub const SCROLL_STEP_FACTOR: f32 = 0.5;

// Volume bar (line under the title)
pub const VOLUME_BAR_X: i32 = 5;
pub const VOLUME_BAR_Y: i32 = 184;
pub const VOLUME_BAR_WIDTH: u32 = DISPLAY_WIDTH - 38;
pub const VOLUME_BAR_HEIGHT: u32 = 9;

// Track progress bar (bottom line)
pub const PROGRESS_BAR_X: i32 = 5;
pub const PROGRESS_BAR_Y: i32 = 222;
pub const PROGRESS_BAR_WIDTH: u32 = DISPLAY_WIDTH - 9;
pub const PROGRESS_BAR_HEIGHT: u32 = 13;

/// Alpha of the translucent bar track drawn under every fill.
pub const BAR_TRACK_ALPHA: u8 = 145;

/// Line spacing for the centered multi-line device text.
pub const MULTILINE_SPACING: u32 = 6;

/// Gaussian sigma for the blurred background.
pub const BACKGROUND_BLUR_SIGMA: f32 = 2.0;

/// Mean luma above which the bright scheme applies.
pub const LUMA_BRIGHT_THRESHOLD: f32 = 175.0;
/// Mean luma below which the dark scheme applies.
pub const LUMA_DARK_THRESHOLD: f32 = 80.0;

/// Cover filenames probed next to a library track, first hit wins.
pub const FOLDER_COVERS: [&str; 20] = [
    "Cover.jpg", "cover.jpg", "Cover.jpeg", "cover.jpeg", "Cover.png", "cover.png",
    "Cover.tif", "cover.tif", "Cover.tiff", "cover.tiff",
    "Folder.jpg", "folder.jpg", "Folder.jpeg", "folder.jpeg", "Folder.png", "folder.png",
    "Folder.tif", "folder.tif", "Folder.tiff", "folder.tiff",
];

/// moOde placeholder for stations without a logo, relative to the web root.
pub const RADIO_PLACEHOLDER_LOGO: &str = "images/default-cover-v6.svg";

/// Shown when the player daemon never came up.
pub const NOT_ACTIVE_MESSAGE: &str = "MPD not Active!\nEnsure MPD is running\nThen restart service";
