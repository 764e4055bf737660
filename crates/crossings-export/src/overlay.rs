//! Raster overlay: the source image with detection markers drawn on top.
//!
//! Junctions get a filled square, flagged intersections get a second
//! square in a contrasting color drawn over the first. Squares near the
//! border are clipped to the image by `imageproc`.

use crossings_pipeline::{Analysis, CellState, Point};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Marker appearance for [`render_overlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Half-width of each square marker; a marker spans
    /// `2 * marker_size + 1` pixels.
    pub marker_size: u32,
    /// Fill for every junction.
    pub junction_color: Rgb<u8>,
    /// Fill for junctions flagged as intersections.
    pub intersection_color: Rgb<u8>,
    /// When set, ink pixels absorbed by the de-duplicator are tinted.
    pub suppressed_color: Option<Rgb<u8>>,
}

impl OverlayStyle {
    /// Default marker half-width.
    pub const DEFAULT_MARKER_SIZE: u32 = 5;
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            marker_size: Self::DEFAULT_MARKER_SIZE,
            junction_color: Rgb([255, 0, 0]),
            intersection_color: Rgb([0, 0, 255]),
            suppressed_color: None,
        }
    }
}

/// Draw `analysis` over a copy of `original`.
///
/// `original` should be the image the analysis was computed from; mask
/// cells outside it are ignored.
#[must_use]
pub fn render_overlay(
    original: &DynamicImage,
    analysis: &Analysis,
    style: &OverlayStyle,
) -> RgbImage {
    let mut canvas = original.to_rgb8();

    if let Some(color) = style.suppressed_color {
        for (p, state) in analysis.mask.cells() {
            if state != CellState::Suppressed {
                continue;
            }
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y))
                && x < canvas.width()
                && y < canvas.height()
            {
                canvas.put_pixel(x, y, color);
            }
        }
    }

    for &p in &analysis.junctions {
        draw_marker(&mut canvas, p, style.marker_size, style.junction_color);
    }
    for p in analysis.intersections() {
        draw_marker(&mut canvas, p, style.marker_size, style.intersection_color);
    }

    canvas
}

fn draw_marker(canvas: &mut RgbImage, center: Point, half: u32, color: Rgb<u8>) {
    let half_i = i32::try_from(half).unwrap_or(i32::MAX / 2);
    let side = half.saturating_mul(2).saturating_add(1);
    let rect = Rect::at(center.x.saturating_sub(half_i), center.y.saturating_sub(half_i))
        .of_size(side, side);
    draw_filled_rect_mut(canvas, rect, color);
}
