//! Cobb-family angles between two endplate lines.

use crate::classify::CurveSeverity;
use crate::config::SpineConfig;
use crate::draw::{with_sink, Color, DrawList};
use crate::geom::{cobb_angle, line_intersection, midpoint, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpinalRegion {
    Cervical,
    UpperThoracic,
    Thoracic,
    MidThoracic,
    LowerThoracic,
    Thoracolumbar,
    UpperLumbar,
    Lumbar,
    LowerLumbar,
    Lumbosacral,
    Global,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveShape {
    Lordosis,
    Kyphosis,
    Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurveType {
    pub key: &'static str,
    pub label: &'static str,
    pub abbreviation: &'static str,
    pub region: SpinalRegion,
    pub shape: CurveShape,
}

const fn curve(
    key: &'static str,
    label: &'static str,
    abbreviation: &'static str,
    region: SpinalRegion,
    shape: CurveShape,
) -> CurveType {
    CurveType {
        key,
        label,
        abbreviation,
        region,
        shape,
    }
}

use CurveShape::{Angle, Kyphosis, Lordosis};
use SpinalRegion::*;

pub static CURVE_TYPES: &[CurveType] = &[
    curve("CL_C2_C7", "Cervical Lordosis (C2-C7)", "CL", Cervical, Lordosis),
    curve("CL_C1_C7", "Cervical Lordosis (C1-C7)", "CL", Cervical, Lordosis),
    curve("TK_T1_T12", "Thoracic Kyphosis (T1-T12)", "TK", Thoracic, Kyphosis),
    curve("TK_T2_T12", "Thoracic Kyphosis (T2-T12)", "TK", Thoracic, Kyphosis),
    curve("UTK_T1_T5", "Upper Thoracic Kyphosis (T1-T5)", "UTK", UpperThoracic, Kyphosis),
    curve("MTK_T5_T8", "Mid Thoracic Kyphosis (T5-T8)", "MTK", MidThoracic, Kyphosis),
    curve("LTK_T8_T12", "Lower Thoracic Kyphosis (T8-T12)", "LTK", LowerThoracic, Kyphosis),
    curve("TLK_T10_L2", "Thoracolumbar Kyphosis (T10-L2)", "TLK", Thoracolumbar, Kyphosis),
    curve("LL_L1_S1", "Lumbar Lordosis (L1-S1)", "LL", Lumbar, Lordosis),
    curve("LL_L1_L5", "Lumbar Lordosis (L1-L5)", "LL", Lumbar, Lordosis),
    curve("ULL_L1_L4", "Upper Lumbar Lordosis (L1-L4)", "ULL", UpperLumbar, Lordosis),
    curve("LLL_L4_S1", "Lower Lumbar Lordosis (L4-S1)", "LLL", LowerLumbar, Lordosis),
    curve("LSA_L5_S1", "Lumbosacral Angle (L5-S1)", "LSA", Lumbosacral, Angle),
    curve("GL_C2_S1", "Global Lordosis (C2-S1)", "GL", Global, Lordosis),
    curve("GK_T1_S1", "Global Kyphosis (T1-S1)", "GK", Global, Kyphosis),
    curve("CUSTOM", "Custom Segmental Angle", "CSA", Custom, Angle),
];

/// Looks up a curve by key, falling back to the custom segmental angle.
pub fn curve_type(key: &str) -> &'static CurveType {
    CURVE_TYPES
        .iter()
        .find(|c| c.key.eq_ignore_ascii_case(key))
        .unwrap_or(&CURVE_TYPES[CURVE_TYPES.len() - 1])
}

pub fn curves_in_region(region: SpinalRegion) -> impl Iterator<Item = &'static CurveType> {
    CURVE_TYPES.iter().filter(move |c| c.region == region)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureMeasurement {
    pub curve_key: String,
    pub label: String,
    pub abbreviation: String,
    pub region: SpinalRegion,
    pub shape: CurveShape,
    pub angle: f64,
    /// Where the two endplate lines cross; `None` when they are parallel.
    pub apex: Option<Point>,
    pub severity: Option<CurveSeverity>,
}

/// Acute angle between endplate `a1–a2` and endplate `b1–b2`, with Cobb guides.
pub fn endplate_angle(a1: Point, a2: Point, b1: Point, b2: Point, draw: Option<&mut DrawList>) -> f64 {
    let angle = cobb_angle((a1, a2), (b1, b2));
    with_sink(draw, |d| {
        d.line(a1, a2, Color::ORANGE, 2.0);
        d.line(b1, b2, Color::ORANGE, 2.0);
        d.cobb_guides((a1, a2), (b1, b2), Color::ORANGE);
        let at = midpoint(midpoint(a1, a2), midpoint(b1, b2));
        d.label(at, format!("Cobb: {angle:.1}°"), Color::RED);
    });
    angle
}

pub fn spinal_curvature(
    points: [Point; 4],
    curve: &CurveType,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> CurvatureMeasurement {
    let [a1, a2, b1, b2] = points;
    let angle = endplate_angle(a1, a2, b1, b2, draw.as_deref_mut());
    let apex = line_intersection(a1, a2, b1, b2).ok();
    let severity = cfg.thresholds.curvature(curve.region).classify(angle);

    with_sink(draw, |d| {
        let mid_a = midpoint(a1, a2);
        let mid_b = midpoint(b1, b2);
        let at = Point::new((mid_a.x + mid_b.x) / 2.0 + 30.0, (mid_a.y + mid_b.y) / 2.0 - 15.0);
        d.label(at, format!("{}: {angle:.1}°", curve.abbreviation), Color::BLACK);
    });

    tracing::debug!(curve = curve.key, angle, "spinal curvature");
    CurvatureMeasurement {
        curve_key: curve.key.to_string(),
        label: curve.label.to_string(),
        abbreviation: curve.abbreviation.to_string(),
        region: curve.region,
        shape: curve.shape,
        angle,
        apex,
        severity,
    }
}
