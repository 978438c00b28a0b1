//! Stenosis, spondylolisthesis and scoliosis measurements.

use crate::classify::{Classification, CurveSeverity, MeyerdingGrade, StenosisSeverity, TrunkShiftSeverity};
use crate::config::SpineConfig;
use crate::coronal::{trunk_shift, TrunkShift};
use crate::curvature::endplate_angle;
use crate::draw::{with_sink, Color, DrawList};
use crate::error::{require_points, Result, SpineError};
use crate::geom::{distance, midpoint, vector, Point};
use crate::polygon::{polygon_area, polygon_centroid, vertex_mean};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StenosisType {
    #[default]
    Central,
    LateralRecess,
    Foraminal,
    LigamentumFlavum,
}

impl StenosisType {
    pub const ALL: [StenosisType; 4] = [
        StenosisType::Central,
        StenosisType::LateralRecess,
        StenosisType::Foraminal,
        StenosisType::LigamentumFlavum,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StenosisType::Central => "Central Canal Stenosis",
            StenosisType::LateralRecess => "Lateral Recess Stenosis",
            StenosisType::Foraminal => "Foraminal Stenosis",
            StenosisType::LigamentumFlavum => "Ligamentum Flavum Thickening",
        }
    }

    pub fn color(self) -> Color {
        match self {
            StenosisType::Central => Color::RED,
            StenosisType::LateralRecess => Color::ORANGE,
            StenosisType::Foraminal => Color::PURPLE,
            StenosisType::LigamentumFlavum => Color::YELLOW,
        }
    }
}

impl FromStr for StenosisType {
    type Err = SpineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "central" => Ok(StenosisType::Central),
            "lateral" | "lateral_recess" => Ok(StenosisType::LateralRecess),
            "foraminal" => Ok(StenosisType::Foraminal),
            "ligamentum" | "ligamentum_flavum" => Ok(StenosisType::LigamentumFlavum),
            _ => Err(SpineError::UnknownTool(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StenosisMeasurement {
    pub stenosis_type: StenosisType,
    pub vertices: Vec<Point>,
    pub area_mm2: f64,
    pub centroid: Point,
    pub severity: Option<StenosisSeverity>,
}

/// Area and severity of a closed stenosis outline.
pub fn stenosis(
    vertices: &[Point],
    stenosis_type: StenosisType,
    cfg: &SpineConfig,
    draw: Option<&mut DrawList>,
) -> Result<StenosisMeasurement> {
    let area_mm2 = cfg.mm2(polygon_area(vertices)?);
    let centroid = match polygon_centroid(vertices) {
        Ok(c) => c,
        Err(_) => {
            tracing::warn!("zero-area stenosis outline, using vertex mean");
            vertex_mean(vertices)
        }
    };
    let severity = cfg.thresholds.stenosis.classify(area_mm2);

    with_sink(draw, |d| {
        let color = stenosis_type.color();
        d.polygon(vertices, true, color, Some(Color::rgba(color.r, color.g, color.b, 64)));
        d.label(Point::new(centroid.x, centroid.y - 30.0), stenosis_type.label(), color);
        d.label(centroid, format!("Area: {area_mm2:.1}mm²"), Color::BLACK);
        if let Some(s) = severity {
            d.label(Point::new(centroid.x, centroid.y + 20.0), format!("Severity: {s:?}"), color);
        }
    });

    Ok(StenosisMeasurement {
        stenosis_type,
        vertices: vertices.to_vec(),
        area_mm2,
        centroid,
        severity,
    })
}

/// Endplate corners of the slipped (upper) and reference (lower) vertebrae.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipLandmarks {
    pub upper_posterior: Point,
    pub upper_anterior: Point,
    pub lower_posterior: Point,
    pub lower_anterior: Point,
}

impl SlipLandmarks {
    /// Click order: upper posterior, upper anterior, lower posterior, lower anterior.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        require_points(points, 4)?;
        Ok(Self {
            upper_posterior: points[0],
            upper_anterior: points[1],
            lower_posterior: points[2],
            lower_anterior: points[3],
        })
    }

    pub fn ap_diameter(&self) -> f64 {
        distance(self.lower_posterior, self.lower_anterior)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipPercentage {
    pub slip_mm: f64,
    pub ap_diameter_mm: f64,
    pub percentage: f64,
    pub grade: Option<MeyerdingGrade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spondylolisthesis {
    pub slip_mm: f64,
    pub slip_angle: f64,
    pub ap_diameter_mm: f64,
    pub percentage: f64,
    pub grade: Option<MeyerdingGrade>,
}

/// Offset of the upper posterior corner from the lower one, measured along the lower endplate.
fn slip_along_endplate(l: &SlipLandmarks) -> f64 {
    let offset = vector(l.lower_posterior, l.upper_posterior);
    let direction = vector(l.lower_posterior, l.lower_anterior).normalized();
    offset.dot(direction).abs()
}

fn endplates(d: &mut DrawList, l: &SlipLandmarks) {
    d.line(l.upper_posterior, l.upper_anterior, Color::BLUE, 3.0);
    d.line(l.lower_posterior, l.lower_anterior, Color::BLUE, 3.0);
}

pub fn slip_distance(l: &SlipLandmarks, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> f64 {
    let slip_mm = cfg.mm(slip_along_endplate(l));
    with_sink(draw, |d| {
        endplates(d, l);
        let direction = vector(l.lower_posterior, l.lower_anterior).normalized();
        let along = vector(l.lower_posterior, l.upper_posterior).dot(direction);
        let foot = l.lower_posterior + direction * along;
        d.line(l.lower_posterior, foot, Color::RED, 2.0);
        d.dashed_line(l.upper_posterior, foot, [5.0, 5.0], Color::RED);
        let mut at = midpoint(l.lower_posterior, foot);
        at.y -= 15.0;
        d.label(at, format!("Slip Distance: {slip_mm:.1}mm"), Color::RED);
    });
    slip_mm
}

/// Cobb angle between the two endplates.
pub fn slip_angle(l: &SlipLandmarks, mut draw: Option<&mut DrawList>) -> f64 {
    let angle = endplate_angle(
        l.upper_posterior,
        l.upper_anterior,
        l.lower_posterior,
        l.lower_anterior,
        draw.as_deref_mut(),
    );
    with_sink(draw, |d| {
        let mut at = midpoint(
            midpoint(l.upper_posterior, l.upper_anterior),
            midpoint(l.lower_posterior, l.lower_anterior),
        );
        at.x += 30.0;
        d.label(at, format!("Slip Angle: {angle:.1}°"), Color::PURPLE);
    });
    angle
}

pub fn slip_percentage(l: &SlipLandmarks, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> Result<SlipPercentage> {
    let ap = l.ap_diameter();
    if ap < f64::EPSILON {
        return Err(SpineError::DegenerateGeometry("lower vertebra has zero AP diameter"));
    }
    let slip = slip_along_endplate(l);
    let percentage = slip / ap * 100.0;
    let grade = cfg.thresholds.meyerding.classify(percentage);

    with_sink(draw, |d| {
        endplates(d, l);
        d.line(l.lower_posterior, l.lower_anterior, Color::GREEN, 2.0);
        let mut ap_at = midpoint(l.lower_posterior, l.lower_anterior);
        ap_at.y += 20.0;
        d.label(ap_at, format!("AP: {:.1}mm", cfg.mm(ap)), Color::GREEN);
        let mut at = l.upper_posterior;
        at.y -= 15.0;
        let grade_text = grade.map(MeyerdingGrade::label).unwrap_or("ungraded");
        d.label(at, format!("{percentage:.1}% - {grade_text}"), Color::RED);
    });

    Ok(SlipPercentage {
        slip_mm: cfg.mm(slip),
        ap_diameter_mm: cfg.mm(ap),
        percentage,
        grade,
    })
}

pub fn spondylolisthesis(l: &SlipLandmarks, cfg: &SpineConfig, mut draw: Option<&mut DrawList>) -> Result<Spondylolisthesis> {
    let slip_mm = slip_distance(l, cfg, draw.as_deref_mut());
    let slip_angle = slip_angle(l, draw.as_deref_mut());
    let pct = slip_percentage(l, cfg, draw)?;
    tracing::debug!(slip_mm, slip_angle, percentage = pct.percentage, "spondylolisthesis");
    Ok(Spondylolisthesis {
        slip_mm,
        slip_angle,
        ap_diameter_mm: pct.ap_diameter_mm,
        percentage: pct.percentage,
        grade: pct.grade,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoliosisCurveType {
    #[default]
    Thoracic,
    Lumbar,
    Thoracolumbar,
    DoubleMajor,
}

impl ScoliosisCurveType {
    pub fn label(self) -> &'static str {
        match self {
            ScoliosisCurveType::Thoracic => "Thoracic Curve",
            ScoliosisCurveType::Lumbar => "Lumbar Curve",
            ScoliosisCurveType::Thoracolumbar => "Thoracolumbar Curve",
            ScoliosisCurveType::DoubleMajor => "Double Major Curve",
        }
    }

    fn color(self) -> Color {
        match self {
            ScoliosisCurveType::Thoracic => Color::BLUE,
            ScoliosisCurveType::Lumbar => Color::GREEN,
            ScoliosisCurveType::Thoracolumbar => Color::ORANGE,
            ScoliosisCurveType::DoubleMajor => Color::PURPLE,
        }
    }
}

impl FromStr for ScoliosisCurveType {
    type Err = SpineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thoracic" => Ok(ScoliosisCurveType::Thoracic),
            "lumbar" => Ok(ScoliosisCurveType::Lumbar),
            "thoracolumbar" => Ok(ScoliosisCurveType::Thoracolumbar),
            "double_major" => Ok(ScoliosisCurveType::DoubleMajor),
            _ => Err(SpineError::UnknownTool(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoliosisCobb {
    pub curve_type: ScoliosisCurveType,
    pub angle: f64,
    pub severity: Option<CurveSeverity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoliosis {
    pub cobb: ScoliosisCobb,
    pub trunk_shift_mm: f64,
    pub trunk_shift_severity: Option<TrunkShiftSeverity>,
}

pub fn scoliosis_cobb(
    upper: (Point, Point),
    lower: (Point, Point),
    curve_type: ScoliosisCurveType,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> ScoliosisCobb {
    let angle = endplate_angle(upper.0, upper.1, lower.0, lower.1, draw.as_deref_mut());
    let severity = cfg.thresholds.scoliosis_cobb.classify(angle);

    with_sink(draw, |d| {
        let color = curve_type.color();
        let mut at = midpoint(midpoint(upper.0, upper.1), midpoint(lower.0, lower.1));
        at.x += 40.0;
        d.label(at, format!("{}: {angle:.1}°", curve_type.label()), color);
        if let Some(s) = severity {
            at.y += 20.0;
            d.label(at, format!("Severity: {}", Classification::Curve(s)), color);
        }
    });

    ScoliosisCobb {
        curve_type,
        angle,
        severity,
    }
}

pub fn scoliosis_trunk_shift(
    c7_centroid: Point,
    s1_left: Point,
    s1_right: Point,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> TrunkShift {
    let shift = trunk_shift(c7_centroid, s1_left, s1_right, cfg, draw.as_deref_mut());
    with_sink(draw, |d| {
        let mut at = c7_centroid;
        at.y -= 40.0;
        d.label(at, format!("Scoliosis Trunk Shift: {:.1}mm", shift.shift_mm), Color::RED);
        if let Some(s) = shift.severity {
            at.y += 20.0;
            d.label(at, format!("Severity: {s:?}"), Color::RED);
        }
    });
    shift
}

/// Angle between the anterior and posterior vertebral lines at the apex.
pub fn apical_tilt(anterior: (Point, Point), posterior: (Point, Point), mut draw: Option<&mut DrawList>) -> f64 {
    let angle = endplate_angle(anterior.0, anterior.1, posterior.0, posterior.1, draw.as_deref_mut());
    with_sink(draw, |d| {
        let mid_a = midpoint(anterior.0, anterior.1);
        let mid_p = midpoint(posterior.0, posterior.1);
        d.dashed_line(mid_a, mid_p, [5.0, 5.0], Color::GRAY);
        let mut at = midpoint(mid_a, mid_p);
        at.x += 30.0;
        d.label(at, format!("APT: {angle:.1}°"), Color::PURPLE);
    });
    angle
}

/// Cobb angle plus trunk shift from seven clicks: two endplates, C7 centroid, S1 corners.
pub fn scoliosis(
    points: &[Point],
    curve_type: ScoliosisCurveType,
    cfg: &SpineConfig,
    mut draw: Option<&mut DrawList>,
) -> Result<Scoliosis> {
    require_points(points, 7)?;
    let cobb = scoliosis_cobb(
        (points[0], points[1]),
        (points[2], points[3]),
        curve_type,
        cfg,
        draw.as_deref_mut(),
    );
    let shift = scoliosis_trunk_shift(points[4], points[5], points[6], cfg, draw);
    Ok(Scoliosis {
        cobb,
        trunk_shift_mm: shift.shift_mm,
        trunk_shift_severity: shift.severity,
    })
}
