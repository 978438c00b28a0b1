//! General-purpose drawing and measuring tools.

use crate::curvature::endplate_angle;
use crate::draw::{with_sink, Color, DrawList};
use crate::error::{require_points, Result};
use crate::geom::{angle_abc, angle_with_horizontal, angle_with_vertical, distance, midpoint, Point};
use crate::polygon::polygon_area;
use itertools::Itertools;

pub fn line_length(points: &[Point], draw: Option<&mut DrawList>) -> Result<f64> {
    require_points(points, 2)?;
    let (a, b) = (points[0], points[1]);
    let length = distance(a, b);
    with_sink(draw, |d| {
        d.line(a, b, Color::BLACK, 2.0);
        d.label(midpoint(a, b), format!("{length:.1} px"), Color::BLACK);
    });
    Ok(length)
}

/// Inclination of `p1–p2` against both axes, as `(horizontal, vertical)`.
pub fn angle_2pt(points: &[Point], draw: Option<&mut DrawList>) -> Result<(f64, f64)> {
    require_points(points, 2)?;
    let (p1, p2) = (points[0], points[1]);
    let horizontal = angle_with_horizontal(p1, p2);
    let vertical = angle_with_vertical(p1, p2);
    with_sink(draw, |d| {
        d.line(p1, p2, Color::BLACK, 2.0);
        d.dashed_line(p1, Point::new(p2.x, p1.y), [5.0, 5.0], Color::GRAY);
        d.dashed_line(p1, Point::new(p1.x, p2.y), [5.0, 5.0], Color::GRAY);
        d.label(midpoint(p1, p2), format!("H: {horizontal:.1}°, V: {vertical:.1}°"), Color::BLUE);
    });
    Ok((horizontal, vertical))
}

pub fn angle_3pt(points: &[Point], draw: Option<&mut DrawList>) -> Result<f64> {
    require_points(points, 3)?;
    let (a, b, c) = (points[0], points[1], points[2]);
    let angle = angle_abc(a, b, c);
    with_sink(draw, |d| {
        d.line(a, b, Color::PURPLE, 2.0);
        d.line(b, c, Color::PURPLE, 2.0);
        d.angle_arc(a, b, c, Color::PURPLE, 30.0, Some(format!("Angle: {angle:.1}°")));
    });
    Ok(angle)
}

/// Cobb-style angle between lines `p0–p1` and `p2–p3`.
pub fn angle_4pt(points: &[Point], draw: Option<&mut DrawList>) -> Result<f64> {
    require_points(points, 4)?;
    Ok(endplate_angle(points[0], points[1], points[2], points[3], draw))
}

/// Segment count and summed length of a click-ordered polyline.
pub fn multi_line(points: &[Point], draw: Option<&mut DrawList>) -> Result<(usize, f64)> {
    require_points(points, 2)?;
    let total: f64 = points.iter().tuple_windows().map(|(&a, &b)| distance(a, b)).sum();
    with_sink(draw, |d| {
        for (&a, &b) in points.iter().tuple_windows() {
            d.line(a, b, Color::BLACK, 2.0);
        }
    });
    Ok((points.len() - 1, total))
}

/// Centre click then an edge click; returns the radius.
pub fn circle(points: &[Point], draw: Option<&mut DrawList>) -> Result<(Point, f64)> {
    require_points(points, 2)?;
    let (center, edge) = (points[0], points[1]);
    let radius = distance(center, edge);
    with_sink(draw, |d| d.ellipse(center, radius, radius, Color::GREEN));
    Ok((center, radius))
}

/// Two opposite bounding-box corners; returns centre and both semi-axes.
pub fn ellipse(points: &[Point], draw: Option<&mut DrawList>) -> Result<(Point, f64, f64)> {
    require_points(points, 2)?;
    let (p1, p2) = (points[0], points[1]);
    let rx = (p2.x - p1.x).abs() / 2.0;
    let ry = (p2.y - p1.y).abs() / 2.0;
    let center = midpoint(p1, p2);
    with_sink(draw, |d| d.ellipse(center, rx, ry, Color::GREEN));
    Ok((center, rx, ry))
}

pub fn polygon(vertices: &[Point], draw: Option<&mut DrawList>) -> Result<f64> {
    let area = polygon_area(vertices)?;
    with_sink(draw, |d| d.polygon(vertices, true, Color::BLUE, None));
    Ok(area)
}

/// Freehand stroke; returns the number of strokes between samples.
pub fn pencil(points: &[Point], draw: Option<&mut DrawList>) -> Result<usize> {
    require_points(points, 2)?;
    with_sink(draw, |d| d.polyline(points, Color::GRAY, 1.0));
    Ok(points.len() - 1)
}
