//! SVG export serializer.
//!
//! Renders a [`Report`] as an SVG in pixel coordinates using the [`svg`]
//! crate for document construction and XML escaping: one `<line>` per
//! inferred edge, one `<circle>` per junction. Junctions flagged as
//! intersections are filled red, the rest black.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::Text;
use svg::node::element::{Circle, Description, Group, Line, Title};

use crossings_pipeline::Report;

/// Junction marker radius in pixels.
const JUNCTION_RADIUS: f64 = 3.0;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Serialize a report into an SVG document string.
///
/// The `viewBox` matches the source image so the SVG can be laid over it.
/// Edges are grouped under `<g id="edges">` and junctions under
/// `<g id="junctions">`; each group is omitted when empty.
///
/// # Examples
///
/// ```
/// use crossings_export::{SvgMetadata, to_svg};
/// use crossings_pipeline::{Dimensions, Point, Report};
///
/// let report = Report {
///     dimensions: Dimensions { width: 100, height: 50 },
///     junctions: vec![Point::new(10, 20), Point::new(90, 20)],
///     edges: vec![[0, 1]],
///     intersections: vec![],
///     intersection_count: 0,
/// };
/// let svg = to_svg(&report, &SvgMetadata::default());
/// assert!(svg.contains(r#"viewBox="0 0 100 50""#));
/// assert!(svg.contains("<line"));
/// ```
#[must_use]
pub fn to_svg(report: &Report, metadata: &SvgMetadata<'_>) -> String {
    let w = report.dimensions.width;
    let h = report.dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    // Edges whose indices fall outside the junction list are skipped.
    let segments: Vec<_> = report
        .edges
        .iter()
        .filter_map(|&[i, j]| Some((*report.junctions.get(i)?, *report.junctions.get(j)?)))
        .collect();
    if !segments.is_empty() {
        let mut edges = Group::new()
            .set("id", "edges")
            .set("stroke", "gray")
            .set("stroke-width", 1);
        for (a, b) in segments {
            edges = edges.add(
                Line::new()
                    .set("x1", a.x)
                    .set("y1", a.y)
                    .set("x2", b.x)
                    .set("y2", b.y),
            );
        }
        doc = doc.add(edges);
    }

    if !report.junctions.is_empty() {
        let mut junctions = Group::new().set("id", "junctions");
        for p in &report.junctions {
            let fill = if report.intersections.contains(p) {
                "red"
            } else {
                "black"
            };
            junctions = junctions.add(
                Circle::new()
                    .set("cx", p.x)
                    .set("cy", p.y)
                    .set("r", JUNCTION_RADIUS)
                    .set("fill", fill),
            );
        }
        doc = doc.add(junctions);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
