//! Module for rasterising SVG station logos and placeholders.
//!
//! This module uses `usvg` for SVG parsing and `resvg` for rendering.
//! The output is a straight-alpha RGBA image scaled to the requested size,
//! ready to be treated like any decoded bitmap cover.

use resvg::{
    render,
    usvg::{
        Tree as ResvgTree,
        Options as ResvgUsvgOptions,
        Transform,
    }
}; // Use resvg's re-exports for usvg types

use image::{Rgba, RgbaImage};
use tiny_skia::Pixmap;
use log::debug;
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Custom error type for SVG rendering operations.
#[derive(Debug)]
pub enum SvgImageError {
    /// Error reading the SVG file.
    Io(std::io::Error),
    /// Error parsing the SVG data.
    SvgParseError(String),
    /// Error creating a pixmap for rendering.
    PixmapCreationError(String),
}

impl fmt::Display for SvgImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgImageError::Io(err) => write!(f, "SVG read error: {}", err),
            SvgImageError::SvgParseError(msg) => write!(f, "SVG parse error: {}", msg),
            SvgImageError::PixmapCreationError(msg) => write!(f, "Pixmap creation error: {}", msg),
        }
    }
}

impl Error for SvgImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SvgImageError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SvgImageError {
    fn from(err: std::io::Error) -> Self {
        SvgImageError::Io(err)
    }
}

/// Renders SVG data to an RGBA bitmap.
#[derive(Debug)]
pub struct SvgImageRenderer {
    tree: ResvgTree,
    target_width: u32,
    target_height: u32,
}

impl SvgImageRenderer {
    /// Creates a new `SvgImageRenderer` from SVG string data and target dimensions.
    ///
    /// The SVG will be scaled to fit `target_width` and `target_height`.
    pub fn new(svg_data: &str, target_width: u32, target_height: u32) -> Result<Self, SvgImageError> {
        let usvg_options = ResvgUsvgOptions::default();
        let tree = ResvgTree::from_str(svg_data, &usvg_options)
            .map_err(|e| SvgImageError::SvgParseError(format!("Failed to parse SVG: {:?}", e)))?;
        Ok(SvgImageRenderer {
            tree,
            target_width,
            target_height,
        })
    }

    pub fn from_path(path: &Path, target_width: u32, target_height: u32) -> Result<Self, SvgImageError> {
        let svg_data = std::fs::read_to_string(path)?;
        Self::new(&svg_data, target_width, target_height)
    }

    /// Render into a straight-alpha RGBA image of the target size.
    pub fn render_rgba(&self) -> Result<RgbaImage, SvgImageError> {
        let mut pixmap = Pixmap::new(self.target_width, self.target_height)
            .ok_or_else(|| SvgImageError::PixmapCreationError("Failed to create pixmap".to_string()))?;

        // For simple scaling from (0,0), a direct scale transform is sufficient.
        let svg_size = self.tree.size();
        let scale_x = self.target_width as f32 / svg_size.width();
        let scale_y = self.target_height as f32 / svg_size.height();
        let transform = Transform::from_scale(scale_x, scale_y);

        render(&self.tree, transform, &mut pixmap.as_mut());

        let mut out = RgbaImage::new(self.target_width, self.target_height);
        // tiny-skia stores premultiplied color
        for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }

        debug!("SVG rendered to {}x{}", self.target_width, self.target_height);
        Ok(out)
    }
}
