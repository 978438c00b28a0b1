//! Global sagittal alignment: plumb-line offsets and pelvic/spinal angles.

use crate::classify::SagittalBalance;
use crate::config::SpineConfig;
use crate::draw::{with_sink, Color, DrawList};
use crate::geom::{angle_abc, angle_with_vertical, midpoint, Point};
use serde::{Deserialize, Serialize};

/// Horizontal plumb-line offset.
///
/// Positive when the upper landmark sits at a larger x than the lower one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SagittalOffset {
    pub offset_mm: f64,
    pub balance: Option<SagittalBalance>,
}

impl SagittalOffset {
    pub fn magnitude(&self) -> f64 {
        self.offset_mm.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SagittalAngle {
    pub degrees: f64,
    pub balance: Option<SagittalBalance>,
}

/// Sagittal vertical axis: C7 plumb line against the S1 posterosuperior corner.
pub fn sva(c7_centroid: Point, s1_posterosuperior: Point, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> SagittalOffset {
    let offset_mm = cfg.mm(c7_centroid.x - s1_posterosuperior.x);
    plumb_overlay(draw, c7_centroid, s1_posterosuperior, format!("SVA: {:.1}mm", offset_mm.abs()));
    SagittalOffset {
        offset_mm,
        balance: cfg.thresholds.sva.classify(offset_mm),
    }
}

/// Cervical SVA: C2 plumb line against the C7 centroid.
pub fn cervical_sva(c2_centroid: Point, c7_centroid: Point, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> SagittalOffset {
    let offset_mm = cfg.mm(c2_centroid.x - c7_centroid.x);
    plumb_overlay(draw, c2_centroid, c7_centroid, format!("cSVA: {:.1}mm", offset_mm.abs()));
    SagittalOffset {
        offset_mm,
        balance: cfg.thresholds.csva.classify(offset_mm),
    }
}

/// T1 pelvic angle: T1 centroid, femoral centre (vertex), S1 midpoint.
pub fn t1_pelvic_angle(
    t1_centroid: Point,
    femoral_head1: Point,
    femoral_head2: Point,
    s1_left: Point,
    s1_right: Point,
    cfg: &SpineConfig,
    draw: Option<&mut DrawList>,
) -> SagittalAngle {
    let femoral_center = midpoint(femoral_head1, femoral_head2);
    let s1_mid = midpoint(s1_left, s1_right);
    let degrees = angle_abc(t1_centroid, femoral_center, s1_mid);

    with_sink(draw, |d| {
        d.line(t1_centroid, femoral_center, Color::BLUE, 2.0);
        d.line(femoral_center, s1_mid, Color::BLUE, 2.0);
        d.line(femoral_head1, femoral_head2, Color::BLACK, 2.0);
        d.line(s1_left, s1_right, Color::BLACK, 2.0);
        d.angle_arc(t1_centroid, femoral_center, s1_mid, Color::RED, 30.0, Some(format!("TPA: {degrees:.1}°")));
    });
    SagittalAngle {
        degrees,
        balance: cfg.thresholds.tpa.classify(degrees),
    }
}

/// Spino-pelvic angle: C7 centroid, S1 midpoint (vertex), femoral centre.
pub fn spino_pelvic_angle(
    c7_centroid: Point,
    s1_left: Point,
    s1_right: Point,
    femoral_head1: Point,
    femoral_head2: Point,
    draw: Option<&mut DrawList>,
) -> f64 {
    let s1_mid = midpoint(s1_left, s1_right);
    let femoral_center = midpoint(femoral_head1, femoral_head2);
    let degrees = angle_abc(c7_centroid, s1_mid, femoral_center);

    with_sink(draw, |d| {
        d.line(c7_centroid, s1_mid, Color::BLUE, 2.0);
        d.line(s1_mid, femoral_center, Color::BLUE, 2.0);
        d.line(s1_left, s1_right, Color::BLACK, 2.0);
        d.line(femoral_head1, femoral_head2, Color::BLACK, 2.0);
        d.angle_arc(c7_centroid, s1_mid, femoral_center, Color::RED, 30.0, Some(format!("SPA: {degrees:.1}°")));
    });
    degrees
}

/// Spino-sacral angle: C7 centroid, S1 midpoint (vertex), S1 left corner.
pub fn spino_sacral_angle(c7_centroid: Point, s1_left: Point, s1_right: Point, draw: Option<&mut DrawList>) -> f64 {
    let s1_mid = midpoint(s1_left, s1_right);
    let degrees = angle_abc(c7_centroid, s1_mid, s1_left);

    with_sink(draw, |d| {
        d.line(c7_centroid, s1_mid, Color::BLUE, 2.0);
        d.extended_line(s1_mid, s1_left, Color::BLUE, 2.0);
        d.line(s1_left, s1_right, Color::BLACK, 2.0);
        d.angle_arc(c7_centroid, s1_mid, s1_left, Color::RED, 30.0, Some(format!("SSA: {degrees:.1}°")));
    });
    degrees
}

/// Inclination of a landmark-to-femoral-centre line against the vertical.
///
/// Shared by T1SPi, T9SPi and ODHA, which differ only in the upper landmark.
pub fn hip_axis_inclination(
    landmark: Point,
    femoral_head1: Point,
    femoral_head2: Point,
    label: &str,
    draw: Option<&mut DrawList>,
) -> f64 {
    let femoral_center = midpoint(femoral_head1, femoral_head2);
    let degrees = angle_with_vertical(landmark, femoral_center);

    with_sink(draw, |d| {
        d.line(landmark, femoral_center, Color::BLUE, 2.0);
        d.vertical_line(femoral_center.x, Color::ORANGE, 2.0);
        d.line(femoral_head1, femoral_head2, Color::BLACK, 2.0);
        let up = Point::new(femoral_center.x, femoral_center.y - 50.0);
        d.angle_arc(landmark, femoral_center, up, Color::RED, 30.0, Some(format!("{label}: {degrees:.1}°")));
    });
    degrees
}

pub fn t1_spi(t1_centroid: Point, femoral_head1: Point, femoral_head2: Point, draw: Option<&mut DrawList>) -> f64 {
    hip_axis_inclination(t1_centroid, femoral_head1, femoral_head2, "T1SPi", draw)
}

pub fn t9_spi(t9_centroid: Point, femoral_head1: Point, femoral_head2: Point, draw: Option<&mut DrawList>) -> f64 {
    hip_axis_inclination(t9_centroid, femoral_head1, femoral_head2, "T9SPi", draw)
}

pub fn odha(odontoid_tip: Point, femoral_head1: Point, femoral_head2: Point, draw: Option<&mut DrawList>) -> f64 {
    hip_axis_inclination(odontoid_tip, femoral_head1, femoral_head2, "OD-HA", draw)
}

/// Chin-brow vertical angle.
pub fn cbva(chin: Point, brow: Point, draw: Option<&mut DrawList>) -> f64 {
    let degrees = angle_with_vertical(chin, brow);
    with_sink(draw, |d| {
        d.line(chin, brow, Color::BLUE, 2.0);
        d.vertical_line(chin.x, Color::ORANGE, 2.0);
        let up = Point::new(chin.x, chin.y - 50.0);
        d.angle_arc(brow, chin, up, Color::RED, 30.0, Some(format!("CBVA: {degrees:.1}°")));
    });
    degrees
}

fn plumb_overlay(draw: Option<&mut DrawList>, upper: Point, lower: Point, text: String) {
    with_sink(draw, |d| {
        d.vertical_line(upper.x, Color::BLUE, 2.0);
        d.marker(lower, 3.0, Color::RED);
        let foot = Point::new(upper.x, lower.y);
        d.line(lower, foot, Color::GREEN, 2.0);
        let mut at = midpoint(lower, foot);
        at.y -= 20.0;
        d.label(at, text, Color::BLACK);
    });
}
