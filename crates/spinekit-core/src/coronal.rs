//! Coronal-plane parameters: plumb lines, trunk shift, RVAD, AVT, pelvic obliquity.

use crate::classify::TrunkShiftSeverity;
use crate::config::SpineConfig;
use crate::draw::{with_sink, Color, DrawList};
use crate::geom::{angle_with_horizontal, line_intersection, midpoint, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrunkShift {
    pub shift_mm: f64,
    pub severity: Option<TrunkShiftSeverity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rvad {
    pub left_angle: f64,
    pub right_angle: f64,
    /// `|left_angle - right_angle|`.
    pub difference: f64,
}

/// C7 plumb line; returns its x.
pub fn c7_plumb_line(c7_centroid: Point, draw: Option<&mut DrawList>) -> f64 {
    with_sink(draw, |d| d.vertical_line(c7_centroid.x, Color::BLUE, 2.0));
    c7_centroid.x
}

/// Central sacral vertical line through the S1 midpoint; returns its x.
pub fn csvl(s1_left: Point, s1_right: Point, draw: Option<&mut DrawList>) -> f64 {
    let s1_mid = midpoint(s1_left, s1_right);
    with_sink(draw, |d| {
        d.line(s1_left, s1_right, Color::BLUE, 2.0);
        d.vertical_line(s1_mid.x, Color::GREEN, 2.0);
    });
    s1_mid.x
}

/// Horizontal distance from the C7 plumb line to the CSVL.
pub fn trunk_shift(
    c7_centroid: Point,
    s1_left: Point,
    s1_right: Point,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> TrunkShift {
    let s1_mid = midpoint(s1_left, s1_right);
    let shift_mm = cfg.mm((c7_centroid.x - s1_mid.x).abs());

    c7_plumb_line(c7_centroid, draw.as_deref_mut());
    csvl(s1_left, s1_right, draw.as_deref_mut());
    with_sink(draw, |d| {
        d.line(c7_centroid, Point::new(s1_mid.x, c7_centroid.y), Color::RED, 2.0);
        d.line(s1_left, s1_right, Color::BLACK, 2.0);
        let at = Point::new(c7_centroid.x, c7_centroid.y - 20.0);
        d.label(at, format!("TrunkShift: {shift_mm:.1}mm"), Color::BLACK);
    });

    TrunkShift {
        shift_mm,
        severity: cfg.thresholds.trunk_shift.classify(shift_mm),
    }
}

/// Rib-vertebral angle difference.
///
/// Each rib line is measured against the normal of the apical endplate and folded to
/// [0, 90]; the result is the difference of the two folded angles.
pub fn rvad(
    left_rib: (Point, Point),
    right_rib: (Point, Point),
    apical_endplate: (Point, Point),
    draw: Option<&mut DrawList>,
) -> Rvad {
    let left = angle_with_horizontal(left_rib.0, left_rib.1);
    let right = angle_with_horizontal(right_rib.0, right_rib.1);
    let normal = angle_with_horizontal(apical_endplate.0, apical_endplate.1) + 90.0;

    let fold = |angle: f64| {
        let diff = (angle - normal).abs();
        diff.min(180.0 - diff)
    };
    let left_angle = fold(left);
    let right_angle = fold(right);
    let difference = (left_angle - right_angle).abs();

    with_sink(draw, |d| {
        d.extended_line(left_rib.0, left_rib.1, Color::BLUE, 2.0);
        d.extended_line(right_rib.0, right_rib.1, Color::RED, 2.0);
        d.line(apical_endplate.0, apical_endplate.1, Color::GREEN, 2.0);

        let apex_mid = midpoint(apical_endplate.0, apical_endplate.1);
        d.perpendicular(apical_endplate.0, apical_endplate.1, apex_mid, Color::PURPLE);

        let unit = (apical_endplate.1 - apical_endplate.0).perpendicular().normalized();
        let n1 = apex_mid - unit * 50.0;
        let n2 = apex_mid + unit * 50.0;
        if let Ok(at) = line_intersection(left_rib.0, left_rib.1, n1, n2) {
            d.angle_arc(left_rib.0, at, n1, Color::ORANGE, 30.0, Some(format!("{left_angle:.1}°")));
        }
        if let Ok(at) = line_intersection(right_rib.0, right_rib.1, n1, n2) {
            d.angle_arc(right_rib.0, at, n2, Color::CYAN, 30.0, Some(format!("{right_angle:.1}°")));
        }
    });

    Rvad {
        left_angle,
        right_angle,
        difference,
    }
}

/// Apical vertebral translation: apical centroid against the CSVL, in mm.
pub fn avt(apical_centroid: Point, s1_left: Point, s1_right: Point, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> f64 {
    let s1_mid = midpoint(s1_left, s1_right);
    let offset = cfg.mm((apical_centroid.x - s1_mid.x).abs());

    with_sink(draw, |d| {
        d.vertical_line(s1_mid.x, Color::BLUE, 2.0);
        let foot = Point::new(s1_mid.x, apical_centroid.y);
        d.line(apical_centroid, foot, Color::GREEN, 2.0);
        let mut at = midpoint(apical_centroid, foot);
        at.y -= 20.0;
        d.label(at, format!("AVT: {offset:.1}mm"), Color::BLACK);
    });
    offset
}

/// Tilt of the line through both posterior superior iliac spines.
pub fn pelvic_obliquity(psis_left: Point, psis_right: Point, draw: Option<&mut DrawList>) -> f64 {
    let degrees = angle_with_horizontal(psis_left, psis_right);
    with_sink(draw, |d| {
        d.line(psis_left, psis_right, Color::BLUE, 2.0);
        d.horizontal_line(psis_left.y, Color::ORANGE, 2.0);
        let level = Point::new(psis_left.x + 50.0, psis_left.y);
        d.angle_arc(psis_right, psis_left, level, Color::RED, 30.0, Some(format!("PO: {degrees:.1}°")));
    });
    degrees
}
