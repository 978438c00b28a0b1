use crate::abnormality::{
    ScoliosisCobb, Scoliosis, SlipPercentage, Spondylolisthesis, StenosisMeasurement,
};
use crate::classify::{Classification, SagittalBalance};
use crate::coronal::{Rvad, TrunkShift};
use crate::curvature::CurvatureMeasurement;
use crate::geom::Point;
use crate::implants::RodMeasurement;
use crate::sagittal::{SagittalAngle, SagittalOffset};
use crate::spinopelvic::SpinopelvicParams;
use crate::vbm::Vbm;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Degrees,
    Millimeters,
    SquareMillimeters,
    Percent,
    Pixels,
    SquarePixels,
    Count,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Degrees => "°",
            Unit::Millimeters => "mm",
            Unit::SquareMillimeters => "mm²",
            Unit::Percent => "%",
            Unit::Pixels => "px",
            Unit::SquarePixels => "px²",
            Unit::Count => "",
        }
    }
}

/// Result of one completed tool activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measurement {
    Line { length: f64 },
    Angle2Pt { horizontal: f64, vertical: f64 },
    Angle3Pt { angle: f64 },
    Angle4Pt { angle: f64 },
    MultiLine { segments: usize, total_length: f64 },
    Circle { center: Point, radius: f64 },
    Ellipse { center: Point, rx: f64, ry: f64 },
    Polygon { vertices: Vec<Point>, area: f64 },
    Pencil { strokes: usize },

    PelvicIncidence { angle: f64 },
    PelvicTilt { angle: f64, balance: Option<SagittalBalance> },
    SacralSlope { angle: f64 },
    Spinopelvic(SpinopelvicParams),
    SpinalCurvature(CurvatureMeasurement),

    Sva(SagittalOffset),
    CervicalSva(SagittalOffset),
    T1PelvicAngle(SagittalAngle),
    SpinoPelvicAngle { angle: f64 },
    SpinoSacralAngle { angle: f64 },
    T1Spi { angle: f64 },
    T9Spi { angle: f64 },
    Odha { angle: f64 },
    Cbva { angle: f64 },

    Csvl { x: f64 },
    C7PlumbLine { x: f64 },
    TrunkShift(TrunkShift),
    Rvad(Rvad),
    Avt { offset_mm: f64 },
    PelvicObliquity { angle: f64 },

    VertebralBody(Vbm),
    Stenosis(StenosisMeasurement),
    SlipDistance { slip_mm: f64 },
    SlipAngle { angle: f64 },
    SlipPercentage(SlipPercentage),
    Spondylolisthesis(Spondylolisthesis),
    ScoliosisCobb(ScoliosisCobb),
    ScoliosisTrunkShift(TrunkShift),
    Apt { angle: f64 },
    Scoliosis(Scoliosis),
    WedgeAngle { angle: f64 },
    Rod(RodMeasurement),
}

impl Measurement {
    pub fn label(&self) -> &'static str {
        match self {
            Measurement::Line { .. } => "Line",
            Measurement::Angle2Pt { .. } => "Angle (2 pt)",
            Measurement::Angle3Pt { .. } => "Angle (3 pt)",
            Measurement::Angle4Pt { .. } => "Cobb",
            Measurement::MultiLine { .. } => "Multi-Line",
            Measurement::Circle { .. } => "Circle",
            Measurement::Ellipse { .. } => "Ellipse",
            Measurement::Polygon { .. } => "Polygon",
            Measurement::Pencil { .. } => "Pencil",
            Measurement::PelvicIncidence { .. } => "PI",
            Measurement::PelvicTilt { .. } => "PT",
            Measurement::SacralSlope { .. } => "SS",
            Measurement::Spinopelvic(_) => "Spinopelvic",
            Measurement::SpinalCurvature(_) => "Curvature",
            Measurement::Sva(_) => "SVA",
            Measurement::CervicalSva(_) => "cSVA",
            Measurement::T1PelvicAngle(_) => "TPA",
            Measurement::SpinoPelvicAngle { .. } => "SPA",
            Measurement::SpinoSacralAngle { .. } => "SSA",
            Measurement::T1Spi { .. } => "T1SPi",
            Measurement::T9Spi { .. } => "T9SPi",
            Measurement::Odha { .. } => "OD-HA",
            Measurement::Cbva { .. } => "CBVA",
            Measurement::Csvl { .. } => "CSVL",
            Measurement::C7PlumbLine { .. } => "C7PL",
            Measurement::TrunkShift(_) => "Trunk Shift",
            Measurement::Rvad(_) => "RVAD",
            Measurement::Avt { .. } => "AVT",
            Measurement::PelvicObliquity { .. } => "PO",
            Measurement::VertebralBody(_) => "VBM",
            Measurement::Stenosis(_) => "Stenosis",
            Measurement::SlipDistance { .. } => "Slip Distance",
            Measurement::SlipAngle { .. } => "Slip Angle",
            Measurement::SlipPercentage(_) => "Slip %",
            Measurement::Spondylolisthesis(_) => "Spondylolisthesis",
            Measurement::ScoliosisCobb(_) => "Scoliosis Cobb",
            Measurement::ScoliosisTrunkShift(_) => "Scoliosis Trunk Shift",
            Measurement::Apt { .. } => "APT",
            Measurement::Scoliosis(_) => "Scoliosis",
            Measurement::WedgeAngle { .. } => "Wedge Angle",
            Measurement::Rod(_) => "Rod",
        }
    }

    /// The headline number shown to the user.
    pub fn value(&self) -> f64 {
        match self {
            Measurement::Line { length } => *length,
            Measurement::Angle2Pt { horizontal, .. } => *horizontal,
            Measurement::MultiLine { total_length, .. } => *total_length,
            Measurement::Circle { radius, .. } => *radius,
            Measurement::Ellipse { rx, .. } => *rx,
            Measurement::Polygon { area, .. } => *area,
            Measurement::Pencil { strokes } => *strokes as f64,
            Measurement::Angle3Pt { angle }
            | Measurement::Angle4Pt { angle }
            | Measurement::PelvicIncidence { angle }
            | Measurement::PelvicTilt { angle, .. }
            | Measurement::SacralSlope { angle }
            | Measurement::SpinoPelvicAngle { angle }
            | Measurement::SpinoSacralAngle { angle }
            | Measurement::T1Spi { angle }
            | Measurement::T9Spi { angle }
            | Measurement::Odha { angle }
            | Measurement::Cbva { angle }
            | Measurement::PelvicObliquity { angle }
            | Measurement::SlipAngle { angle }
            | Measurement::Apt { angle }
            | Measurement::WedgeAngle { angle } => *angle,
            Measurement::Spinopelvic(p) => p.pi,
            Measurement::SpinalCurvature(c) => c.angle,
            Measurement::Sva(o) | Measurement::CervicalSva(o) => o.offset_mm,
            Measurement::T1PelvicAngle(a) => a.degrees,
            Measurement::Csvl { x } | Measurement::C7PlumbLine { x } => *x,
            Measurement::TrunkShift(t) | Measurement::ScoliosisTrunkShift(t) => t.shift_mm,
            Measurement::Rvad(r) => r.difference,
            Measurement::Avt { offset_mm } => *offset_mm,
            Measurement::VertebralBody(v) => v.wedge_angle,
            Measurement::Stenosis(s) => s.area_mm2,
            Measurement::SlipDistance { slip_mm } => *slip_mm,
            Measurement::SlipPercentage(s) => s.percentage,
            Measurement::Spondylolisthesis(s) => s.percentage,
            Measurement::ScoliosisCobb(c) => c.angle,
            Measurement::Scoliosis(s) => s.cobb.angle,
            Measurement::Rod(r) => r.total_length,
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Measurement::Line { .. }
            | Measurement::MultiLine { .. }
            | Measurement::Circle { .. }
            | Measurement::Ellipse { .. }
            | Measurement::Csvl { .. }
            | Measurement::C7PlumbLine { .. }
            | Measurement::Rod(_) => Unit::Pixels,
            Measurement::Polygon { .. } => Unit::SquarePixels,
            Measurement::Pencil { .. } => Unit::Count,
            Measurement::Sva(_)
            | Measurement::CervicalSva(_)
            | Measurement::TrunkShift(_)
            | Measurement::ScoliosisTrunkShift(_)
            | Measurement::Avt { .. }
            | Measurement::SlipDistance { .. } => Unit::Millimeters,
            Measurement::Stenosis(_) => Unit::SquareMillimeters,
            Measurement::SlipPercentage(_) | Measurement::Spondylolisthesis(_) => Unit::Percent,
            _ => Unit::Degrees,
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Measurement::PelvicTilt { balance, .. } => balance.map(Classification::Sagittal),
            Measurement::Spinopelvic(p) => p.pt_balance.map(Classification::Sagittal),
            Measurement::SpinalCurvature(c) => c.severity.map(Classification::Curve),
            Measurement::Sva(o) | Measurement::CervicalSva(o) => o.balance.map(Classification::Sagittal),
            Measurement::T1PelvicAngle(a) => a.balance.map(Classification::Sagittal),
            Measurement::TrunkShift(t) | Measurement::ScoliosisTrunkShift(t) => {
                t.severity.map(Classification::TrunkShift)
            }
            Measurement::Stenosis(s) => s.severity.map(Classification::Stenosis),
            Measurement::SlipPercentage(s) => s.grade.map(Classification::Meyerding),
            Measurement::Spondylolisthesis(s) => s.grade.map(Classification::Meyerding),
            Measurement::ScoliosisCobb(c) => c.severity.map(Classification::Curve),
            Measurement::Scoliosis(s) => s.cobb.severity.map(Classification::Curve),
            _ => None,
        }
    }

    /// One-line status text for the host's message bar.
    pub fn summary(&self) -> String {
        let mut text = match self {
            Measurement::Angle2Pt { horizontal, vertical } => {
                format!("Angle: H {horizontal:.1}°, V {vertical:.1}°")
            }
            Measurement::MultiLine { segments, total_length } => {
                format!("Multi-Line: {segments} segments, {total_length:.1} px")
            }
            Measurement::Ellipse { rx, ry, .. } => format!("Ellipse: rx {rx:.1} px, ry {ry:.1} px"),
            Measurement::Spinopelvic(p) => format!(
                "PI: {:.1}°, PT: {:.1}°, SS: {:.1}° (PI-(PT+SS) = {:.1}°)",
                p.pi, p.pt, p.ss, p.difference
            ),
            Measurement::SpinalCurvature(c) => format!("{}: {:.1}°", c.label, c.angle),
            Measurement::Rvad(r) => format!(
                "RVAD: {:.1}° (left {:.1}°, right {:.1}°)",
                r.difference, r.left_angle, r.right_angle
            ),
            Measurement::VertebralBody(v) => format!(
                "VBM: AH {:.1}mm, PH {:.1}mm, Wedge Angle {:.1}°, Area {:.1}mm²",
                v.anterior_height_mm, v.posterior_height_mm, v.wedge_angle, v.area_mm2
            ),
            Measurement::Spondylolisthesis(s) => format!(
                "Slip {:.1}mm, angle {:.1}°, {:.1}% of {:.1}mm",
                s.slip_mm, s.slip_angle, s.percentage, s.ap_diameter_mm
            ),
            Measurement::Scoliosis(s) => format!(
                "{}: {:.1}°, trunk shift {:.1}mm",
                s.cobb.curve_type.label(),
                s.cobb.angle,
                s.trunk_shift_mm
            ),
            Measurement::Rod(r) => format!(
                "Rod: {} segments, {:.1} px",
                r.segments, r.total_length
            ),
            other => format!("{}: {:.1}{}", other.label(), other.value(), other.unit().suffix()),
        };
        if let Some(class) = self.classification() {
            text.push_str(&format!(" [{class}]"));
        }
        text
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
