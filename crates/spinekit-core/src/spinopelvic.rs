//! Pelvic incidence, pelvic tilt and sacral slope.
//!
//! All three take the femoral head centres and the S1 endplate corners in click order:
//! femoral head 1, femoral head 2, S1 endplate left, S1 endplate right.

use crate::classify::SagittalBalance;
use crate::config::SpineConfig;
use crate::draw::{with_sink, Color, DrawList};
use crate::geom::{angle_abc, angle_with_horizontal, angle_with_vertical, midpoint, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinopelvicParams {
    pub pi: f64,
    pub pt: f64,
    pub ss: f64,
    /// `pi - (pt + ss)`.
    pub difference: f64,
    pub valid: bool,
    pub pt_balance: Option<SagittalBalance>,
}

/// Angle at the S1 midpoint between the femoral-centre ray and the endplate normal.
pub fn pelvic_incidence(
    femoral_head1: Point,
    femoral_head2: Point,
    s1_left: Point,
    s1_right: Point,
    draw: Option<&mut DrawList>,
) -> f64 {
    let femoral_center = midpoint(femoral_head1, femoral_head2);
    let s1_mid = midpoint(s1_left, s1_right);
    let normal_tip = s1_mid + (s1_right - s1_left).perpendicular();
    let pi = angle_abc(femoral_center, s1_mid, normal_tip);

    with_sink(draw, |d| {
        landmarks(d, femoral_head1, femoral_head2, s1_left, s1_right);
        d.perpendicular(s1_left, s1_right, s1_mid, Color::BLUE);
        d.angle_arc(femoral_center, s1_mid, normal_tip, Color::RED, 30.0, Some(format!("PI: {pi:.1}°")));
    });
    pi
}

/// Angle between the vertical and the femoral-centre to S1-midpoint line.
pub fn pelvic_tilt(
    femoral_head1: Point,
    femoral_head2: Point,
    s1_left: Point,
    s1_right: Point,
    draw: Option<&mut DrawList>,
) -> f64 {
    let femoral_center = midpoint(femoral_head1, femoral_head2);
    let s1_mid = midpoint(s1_left, s1_right);
    let pt = angle_with_vertical(femoral_center, s1_mid);

    with_sink(draw, |d| {
        landmarks(d, femoral_head1, femoral_head2, s1_left, s1_right);
        d.vertical_line(femoral_center.x, Color::RED, 2.0);
        let up = Point::new(femoral_center.x, femoral_center.y - 50.0);
        d.angle_arc(up, femoral_center, s1_mid, Color::RED, 30.0, Some(format!("PT: {pt:.1}°")));
    });
    pt
}

/// Angle between the S1 endplate and the horizontal.
pub fn sacral_slope(s1_left: Point, s1_right: Point, draw: Option<&mut DrawList>) -> f64 {
    let ss = angle_with_horizontal(s1_right, s1_left);

    with_sink(draw, |d| {
        let s1_mid = midpoint(s1_left, s1_right);
        d.line(s1_left, s1_right, Color::BLUE, 2.0);
        d.marker(s1_mid, 3.0, Color::RED);
        d.horizontal_line(s1_mid.y, Color::ORANGE, 2.0);
        let direction = if s1_right.x > s1_left.x { 1.0 } else { -1.0 };
        let level = Point::new(s1_mid.x + direction * 100.0, s1_mid.y);
        d.angle_arc(s1_right, s1_mid, level, Color::RED, 30.0, Some(format!("SS: {ss:.1}°")));
    });
    ss
}

/// PI, PT and SS together, with the `PI = PT + SS` consistency check.
pub fn spinopelvic_params(
    femoral_head1: Point,
    femoral_head2: Point,
    s1_left: Point,
    s1_right: Point,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> SpinopelvicParams {
    let pi = pelvic_incidence(femoral_head1, femoral_head2, s1_left, s1_right, draw.as_deref_mut());
    let pt = pelvic_tilt(femoral_head1, femoral_head2, s1_left, s1_right, draw.as_deref_mut());
    let ss = sacral_slope(s1_left, s1_right, draw);
    let difference = pi - (pt + ss);
    let valid = difference.abs() < cfg.spinopelvic_tolerance_deg;
    if !valid {
        tracing::warn!(pi, pt, ss, difference, "PI does not match PT + SS");
    }

    SpinopelvicParams {
        pi,
        pt,
        ss,
        difference,
        valid,
        pt_balance: cfg.thresholds.pelvic_tilt.classify(pt),
    }
}

fn landmarks(d: &mut DrawList, fh1: Point, fh2: Point, s1_left: Point, s1_right: Point) {
    let femoral_center = midpoint(fh1, fh2);
    let s1_mid = midpoint(s1_left, s1_right);
    d.line(fh1, fh2, Color::BLUE, 2.0);
    d.marker(femoral_center, 3.0, Color::RED);
    d.line(s1_left, s1_right, Color::BLUE, 2.0);
    d.marker(s1_mid, 3.0, Color::RED);
    d.line(femoral_center, s1_mid, Color::GREEN, 2.0);
}
