//! ASCII PLY export and import for AR session point clouds.
//!
//! One file holds both the tracked path (yellow vertices, carrying depth
//! and heading) and the captured wall features (cyan vertices with
//! sentinel extras). Waypoint notes travel as `comment annotation` header
//! lines keyed by vertex index, so any standard PLY viewer still opens
//! the file while this crate round-trips the notes.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::core::types::{PathWaypoint, Point3};
use crate::error::{Result, SurveyError};

/// One parsed vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: Point3,
    /// RGB normalized to [0, 1].
    pub color: [f32; 3],
    /// Depth below start, -1.0 for feature points.
    pub depth: f32,
    /// Compass heading in degrees, -1 when absent.
    pub heading: f32,
    /// Annotation id, -1 when none.
    pub comment_id: i32,
    /// Position of this vertex among accepted rows.
    pub vertex_index: usize,
}

impl CloudPoint {
    /// Path waypoints are written yellow; everything else is wall data.
    pub fn is_centerline(&self) -> bool {
        self.color[0] > 0.8 && self.color[1] > 0.8 && self.color[2] < 0.3
    }
}

/// A parsed PLY file: vertices plus annotation texts by vertex index.
#[derive(Debug, Clone, Default)]
pub struct PlyCloud {
    pub points: Vec<CloudPoint>,
    pub annotations: BTreeMap<usize, String>,
}

/// Write path and features as one ASCII PLY.
///
/// `comments` maps waypoint indices to note text; waypoints are written
/// first so waypoint index equals vertex index.
pub fn write_ply<W: Write>(
    writer: &mut W,
    waypoints: &[PathWaypoint],
    comments: &BTreeMap<usize, String>,
    features: &[Point3],
) -> Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", waypoints.len() + features.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "property uchar red")?;
    writeln!(writer, "property uchar green")?;
    writeln!(writer, "property uchar blue")?;
    writeln!(writer, "property float depth")?;
    writeln!(writer, "property float heading")?;
    writeln!(writer, "property int comment_id")?;

    // Dense annotation ids in waypoint order
    let mut comment_id_by_index = BTreeMap::new();
    for (cid, (&index, text)) in comments.iter().enumerate() {
        comment_id_by_index.insert(index, cid as i32);
        writeln!(
            writer,
            "comment annotation id={cid} vertex_index={index} text={}",
            sanitize_comment(text)
        )?;
    }
    writeln!(writer, "end_header")?;

    for (i, waypoint) in waypoints.iter().enumerate() {
        let cid = comment_id_by_index.get(&i).copied().unwrap_or(-1);
        writeln!(
            writer,
            "{:.4} {:.4} {:.4} 255 255 0 {:.2} {:.0} {cid}",
            waypoint.position.x,
            waypoint.position.y,
            waypoint.position.z,
            waypoint.depth_from_start,
            waypoint.heading
        )?;
    }
    for feature in features {
        writeln!(
            writer,
            "{:.4} {:.4} {:.4} 0 255 255 -1.0 -1 -1",
            feature.x, feature.y, feature.z
        )?;
    }
    Ok(())
}

/// Reduce note text to a single printable-ASCII header line.
pub fn sanitize_comment(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            '"' => '\'',
            c => c,
        })
        .filter(|c| c.is_ascii() && (' '..='~').contains(c))
        .collect()
}

/// Parse an ASCII PLY written by [`write_ply`] or a compatible tool.
///
/// The body is read tolerantly: rows with fewer than six fields or
/// non-numeric coordinates are skipped, and the depth/heading/comment
/// extras are optional. Vertex indices count accepted rows only.
pub fn parse_ply<R: BufRead>(reader: R) -> Result<PlyCloud> {
    let mut lines = reader.lines();

    let mut vertex_count: Option<usize> = None;
    let mut annotations = BTreeMap::new();
    let mut saw_header_end = false;

    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim();
        if line == "end_header" {
            saw_header_end = true;
            break;
        }
        if let Some(rest) = line.strip_prefix("element vertex") {
            vertex_count = rest.trim().parse().ok();
        }
        if line.starts_with("comment annotation") {
            if let Some((index, text)) = parse_annotation(line) {
                annotations.insert(index, text);
            }
        }
    }
    if !saw_header_end {
        return Err(SurveyError::Parse("missing end_header".into()));
    }

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let line = line?;
        if let Some(limit) = vertex_count {
            if points.len() >= limit {
                break;
            }
        }
        match parse_vertex(&line, points.len()) {
            Some(point) => points.push(point),
            None => {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
            }
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} malformed vertex rows");
    }
    debug!(
        "parsed {} vertices, {} annotations",
        points.len(),
        annotations.len()
    );

    Ok(PlyCloud {
        points,
        annotations,
    })
}

fn parse_annotation(line: &str) -> Option<(usize, String)> {
    let mut vertex_index = None;
    for (pos, token) in line.split_whitespace().enumerate() {
        if let Some(value) = token.strip_prefix("vertex_index=") {
            vertex_index = value.parse().ok();
        }
        if let Some(first) = token.strip_prefix("text=") {
            // Text runs to end of line and may contain spaces
            let tail: Vec<&str> = line.split_whitespace().skip(pos + 1).collect();
            let mut text = first.to_string();
            if !tail.is_empty() {
                text.push(' ');
                text.push_str(&tail.join(" "));
            }
            if text.is_empty() {
                return None;
            }
            return Some((vertex_index?, text));
        }
    }
    None
}

fn parse_vertex(line: &str, vertex_index: usize) -> Option<CloudPoint> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return None;
    }
    let x: f32 = parts[0].parse().ok()?;
    let y: f32 = parts[1].parse().ok()?;
    let z: f32 = parts[2].parse().ok()?;
    let r: f32 = parts[3].parse().ok()?;
    let g: f32 = parts[4].parse().ok()?;
    let b: f32 = parts[5].parse().ok()?;

    let mut depth = -1.0;
    let mut heading = -1.0;
    let mut comment_id = -1;
    if parts.len() >= 8 {
        depth = parts[6].parse().unwrap_or(-1.0);
        heading = parts[7].parse().unwrap_or(-1.0);
    }
    if parts.len() >= 9 {
        comment_id = parts[8].parse().unwrap_or(-1);
    }

    Some(CloudPoint {
        position: Point3::new(x, y, z),
        color: [r / 255.0, g / 255.0, b / 255.0],
        depth,
        heading,
        comment_id,
        vertex_index,
    })
}

/// Split a parsed cloud into centerline and wall positions.
pub fn split_cloud(points: &[CloudPoint]) -> (Vec<Point3>, Vec<Point3>) {
    let mut centerline = Vec::new();
    let mut walls = Vec::new();
    for point in points {
        if point.is_centerline() {
            centerline.push(point.position);
        } else {
            walls.push(point.position);
        }
    }
    (centerline, walls)
}
