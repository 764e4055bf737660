//! crossings-export: Pure overlay and SVG serializers (sans-IO)
//!
//! Turns detection results into something a person can look at: a raster
//! copy of the input with markers, or an SVG of junctions and inferred
//! edges. Nothing here touches the filesystem.

pub mod overlay;
pub mod svg;

pub use overlay::{OverlayStyle, render_overlay};
pub use svg::{SvgMetadata, to_svg};
