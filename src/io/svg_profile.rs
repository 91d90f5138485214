//! SVG rendering of a reconstructed cave profile.

use svg::node::element::{Circle, Polygon, Polyline, Rectangle};
use svg::Document;

use crate::core::types::Point2;
use crate::survey::profile::CaveProfile;

/// Colorblind-friendly color palette (Okabe-Ito).
mod colors {
    /// Passage outline fill - sky blue
    pub const PASSAGE_FILL: &str = "#56B4E9";
    /// Wall outline - blue
    pub const WALL_STROKE: &str = "#0072B2";
    /// Centerline - orange
    pub const CENTERLINE: &str = "#E69F00";
    /// Survey start marker - green
    pub const START_MARKER: &str = "#009E73";
    /// Survey end marker - vermillion
    pub const END_MARKER: &str = "#D55E00";
}

const MARGIN: f32 = 50.0;
const PASSAGE_OPACITY: f32 = 0.35;

/// Render the profile to an SVG document: filled passage polygon, wall
/// outline, centerline and start/end markers.
pub fn render_profile_svg(profile: &CaveProfile) -> Document {
    let polygon = profile.wall_polygon();
    let (min, max) = bounds(polygon.iter().chain(profile.centerline.iter()));

    let width = (max.x - min.x + 2.0 * MARGIN) as i32;
    let height = (max.y - min.y + 2.0 * MARGIN) as i32;
    let to_canvas = |p: &Point2| (p.x - min.x + MARGIN, p.y - min.y + MARGIN);

    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width, height));

    doc = doc.add(
        Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", width)
            .set("height", height)
            .set("fill", "white"),
    );

    doc = doc.add(
        Polygon::new()
            .set("points", points_attr(&polygon, to_canvas))
            .set("fill", colors::PASSAGE_FILL)
            .set("fill-opacity", PASSAGE_OPACITY)
            .set("stroke", colors::WALL_STROKE)
            .set("stroke-width", 2.0)
            .set("stroke-linejoin", "round"),
    );

    doc = doc.add(
        Polyline::new()
            .set("points", points_attr(&profile.centerline, to_canvas))
            .set("fill", "none")
            .set("stroke", colors::CENTERLINE)
            .set("stroke-width", 1.5)
            .set("stroke-dasharray", "6 4")
            .set("stroke-linecap", "round"),
    );

    if let (Some(first), Some(last)) = (profile.centerline.first(), profile.centerline.last()) {
        let (x, y) = to_canvas(first);
        doc = doc.add(
            Circle::new()
                .set("cx", x)
                .set("cy", y)
                .set("r", 5)
                .set("fill", colors::START_MARKER),
        );
        let (x, y) = to_canvas(last);
        doc = doc.add(
            Circle::new()
                .set("cx", x)
                .set("cy", y)
                .set("r", 5)
                .set("fill", colors::END_MARKER),
        );
    }

    doc
}

fn points_attr(points: &[Point2], to_canvas: impl Fn(&Point2) -> (f32, f32)) -> String {
    points
        .iter()
        .map(|p| {
            let (x, y) = to_canvas(p);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bounds<'a>(points: impl Iterator<Item = &'a Point2>) -> (Point2, Point2) {
    let mut min = Point2::new(f32::MAX, f32::MAX);
    let mut max = Point2::new(f32::MIN, f32::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    if min.x > max.x {
        (Point2::default(), Point2::default())
    } else {
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RecordType, SurveyStation};
    use crate::survey::profile::{reconstruct, ProfileConfig};

    fn manual(distance: f32, heading: f32) -> SurveyStation {
        SurveyStation {
            record_number: 0,
            distance,
            heading,
            depth: 0.0,
            left: 1.0,
            right: 1.0,
            up: 0.5,
            down: 0.5,
            record_type: RecordType::Manual,
        }
    }

    #[test]
    fn test_render_contains_all_layers() {
        let stations = vec![manual(0.0, 90.0), manual(10.0, 90.0), manual(20.0, 45.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        let doc = render_profile_svg(&profile);
        let text = doc.to_string();
        assert!(text.contains("<polygon"));
        assert!(text.contains("<polyline"));
        assert_eq!(text.matches("<circle").count(), 2);
        assert!(text.contains(colors::PASSAGE_FILL));
        assert!(text.contains(colors::START_MARKER));
    }

    #[test]
    fn test_canvas_fits_geometry() {
        let stations = vec![manual(0.0, 90.0), manual(30.0, 90.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        let doc = render_profile_svg(&profile);
        let text = doc.to_string();
        // 600 units of centerline plus walls plus margins
        assert!(text.contains("width=\"700\""));
    }
}
