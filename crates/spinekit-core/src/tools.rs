//! Tool catalog and dispatch from a completed click sequence to its formula.

use crate::abnormality::{self, ScoliosisCurveType, SlipLandmarks, StenosisType};
use crate::config::SpineConfig;
use crate::coronal;
use crate::curvature::{curve_type, spinal_curvature};
use crate::draw::{with_sink, Color, DrawList};
use crate::error::{require_points, Result, SpineError};
use crate::generic;
use crate::geom::{wedge_angle, Point};
use crate::implants;
use crate::measurement::Measurement;
use crate::sagittal;
use crate::spinopelvic;
use crate::vbm::{vbm, VbmOutline};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Generic,
    Spinopelvic,
    Curvature,
    Sagittal,
    Coronal,
    Vbm,
    Stenosis,
    Spondylolisthesis,
    Scoliosis,
    Surgery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    /// `None` for terminator-driven tools that take any number of clicks.
    pub required_points: Option<usize>,
    pub description: &'static str,
    pub category: ToolCategory,
}

const fn tool(
    key: &'static str,
    label: &'static str,
    required_points: Option<usize>,
    description: &'static str,
    category: ToolCategory,
) -> ToolDescriptor {
    ToolDescriptor {
        key,
        label,
        required_points,
        description,
        category,
    }
}

use ToolCategory as C;

pub static TOOLS: &[ToolDescriptor] = &[
    tool("line", "Line", Some(2), "Two endpoints", C::Generic),
    tool("angle2", "Angle (2 pt)", Some(2), "Line against horizontal and vertical", C::Generic),
    tool("angle3", "Angle (3 pt)", Some(3), "Arm, vertex, arm", C::Generic),
    tool("angle4", "Angle (4 pt)", Some(4), "Two lines (2 + 2)", C::Generic),
    tool("multi", "Multi-Line", None, "Any number of connected points", C::Generic),
    tool("circle", "Circle", Some(2), "Centre + edge", C::Generic),
    tool("ellipse", "Ellipse", Some(2), "Opposite bounding corners", C::Generic),
    tool("polygon", "Polygon", None, "Vertices; click the first one to close", C::Generic),
    tool("pencil", "Pencil", None, "Freehand samples", C::Generic),
    tool("pi", "Pelvic Incidence (PI)", Some(4), "Femoral heads (2) + S1 endplate (2)", C::Spinopelvic),
    tool("pt", "Pelvic Tilt (PT)", Some(4), "Femoral heads (2) + S1 endplate (2)", C::Spinopelvic),
    tool("ss", "Sacral Slope (SS)", Some(2), "S1 endplate (2)", C::Spinopelvic),
    tool("spinopelvic", "All Spinopelvic", Some(4), "PI + PT + SS combined", C::Spinopelvic),
    tool("curvature", "Spinal Curvature", Some(4), "Upper endplate (2) + lower endplate (2)", C::Curvature),
    tool("sva", "Sagittal Vertical Axis (SVA)", Some(2), "C7 centroid + S1 posterosuperior", C::Sagittal),
    tool("csva", "Cervical SVA (cSVA)", Some(2), "C2 centroid + C7 centroid", C::Sagittal),
    tool("tpa", "T1 Pelvic Angle (TPA)", Some(5), "T1 centroid + femoral heads (2) + S1 endplate (2)", C::Sagittal),
    tool("spa", "Spino-Pelvic Angle (SPA)", Some(5), "C7 centroid + S1 endplate (2) + femoral heads (2)", C::Sagittal),
    tool("ssa", "Spino-Sacral Angle (SSA)", Some(3), "C7 centroid + S1 endplate (2)", C::Sagittal),
    tool("t1spi", "T1 Spinopelvic Inclination", Some(3), "T1 centroid + femoral heads (2)", C::Sagittal),
    tool("t9spi", "T9 Spinopelvic Inclination", Some(3), "T9 centroid + femoral heads (2)", C::Sagittal),
    tool("odha", "Odontoid - Hip Axis Angle (ODHA)", Some(3), "Odontoid tip + femoral heads (2)", C::Sagittal),
    tool("cbva", "Chin Brow Vertical Angle (CBVA)", Some(2), "Chin + brow", C::Sagittal),
    tool("csvl", "Coronal SVL (CSVL)", Some(2), "S1 endplate (2)", C::Coronal),
    tool("c7pl", "C7 Plumb Line", Some(1), "C7 centroid", C::Coronal),
    tool("trunkshift", "Trunk Shift", Some(3), "C7 centroid + S1 endplate (2)", C::Coronal),
    tool("rvad", "Rib Vertebral Angle Difference (RVAD)", Some(6), "Left rib (2) + right rib (2) + apical endplate (2)", C::Coronal),
    tool("avt", "Apical Vertebral Translation (AVT)", Some(3), "Apical centroid + S1 endplate (2)", C::Coronal),
    tool("po", "Pelvic Obliquity", Some(2), "Posterior superior iliac spines (2)", C::Coronal),
    tool("vbm", "Vertebral Body Metrics", Some(4), "Upper anterior, upper posterior, lower anterior, lower posterior", C::Vbm),
    tool("stenosis", "Stenosis Area", None, "Canal outline; click the first vertex to close", C::Stenosis),
    tool("slip_distance", "Slip Distance", Some(4), "Upper endplate (posterior, anterior) + lower endplate (posterior, anterior)", C::Spondylolisthesis),
    tool("slip_angle", "Slip Angle", Some(4), "Upper endplate (2) + lower endplate (2)", C::Spondylolisthesis),
    tool("slip_percentage", "Slip Percentage", Some(4), "Upper endplate (2) + lower endplate (2)", C::Spondylolisthesis),
    tool("spondylolisthesis", "Complete Spondylolisthesis", Some(4), "Upper endplate (2) + lower endplate (2)", C::Spondylolisthesis),
    tool("scoliosis_cobb", "Scoliosis Cobb Angle", Some(4), "Upper end vertebra (2) + lower end vertebra (2)", C::Scoliosis),
    tool("scoliosis_trunk_shift", "Scoliosis Trunk Shift", Some(3), "C7 centroid + S1 endplate (2)", C::Scoliosis),
    tool("apt", "Apical Tilt (APT)", Some(4), "Anterior vertebral line (2) + posterior vertebral line (2)", C::Scoliosis),
    tool("scoliosis", "Complete Scoliosis", Some(7), "End vertebrae (4) + C7 centroid + S1 endplate (2)", C::Scoliosis),
    tool("wedge_angle", "Wedge Angle", Some(3), "Arm A, hinge B, arm C", C::Surgery),
    tool("rod", "Rod", None, "Points along the rod path", C::Surgery),
];

/// Looks up a tool by key.
pub fn find_tool(key: &str) -> Result<&'static ToolDescriptor> {
    TOOLS
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| SpineError::UnknownTool(key.to_string()))
}

pub fn tools_in(category: ToolCategory) -> impl Iterator<Item = &'static ToolDescriptor> {
    TOOLS.iter().filter(move |t| t.category == category)
}

/// Per-activation choices that do not come from clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Curve catalog key for the curvature tool.
    pub curve: String,
    pub stenosis_type: StenosisType,
    pub scoliosis_curve: ScoliosisCurveType,
    pub rod_curvature: Option<f64>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            curve: "CUSTOM".to_string(),
            stenosis_type: StenosisType::default(),
            scoliosis_curve: ScoliosisCurveType::default(),
            rod_curvature: None,
        }
    }
}

/// Runs the formula behind `key` on a click sequence.
///
/// Points beyond the tool's fixed count are ignored; fewer yield `InsufficientPoints`.
pub fn evaluate(
    key: &str,
    points: &[Point],
    options: &ToolOptions,
    cfg: &SpineConfig,
    draw: Option<&mut DrawList>,
) -> Result<Measurement> {
    let descriptor = find_tool(key)?;
    if let Some(required) = descriptor.required_points {
        require_points(points, required)?;
    }
    let p = points;

    let measurement = match descriptor.key {
        "line" => Measurement::Line {
            length: generic::line_length(p, draw)?,
        },
        "angle2" => {
            let (horizontal, vertical) = generic::angle_2pt(p, draw)?;
            Measurement::Angle2Pt { horizontal, vertical }
        }
        "angle3" => Measurement::Angle3Pt {
            angle: generic::angle_3pt(p, draw)?,
        },
        "angle4" => Measurement::Angle4Pt {
            angle: generic::angle_4pt(p, draw)?,
        },
        "multi" => {
            let (segments, total_length) = generic::multi_line(p, draw)?;
            Measurement::MultiLine { segments, total_length }
        }
        "circle" => {
            let (center, radius) = generic::circle(p, draw)?;
            Measurement::Circle { center, radius }
        }
        "ellipse" => {
            let (center, rx, ry) = generic::ellipse(p, draw)?;
            Measurement::Ellipse { center, rx, ry }
        }
        "polygon" => Measurement::Polygon {
            area: generic::polygon(p, draw)?,
            vertices: p.to_vec(),
        },
        "pencil" => Measurement::Pencil {
            strokes: generic::pencil(p, draw)?,
        },

        "pi" => Measurement::PelvicIncidence {
            angle: spinopelvic::pelvic_incidence(p[0], p[1], p[2], p[3], draw),
        },
        "pt" => {
            let angle = spinopelvic::pelvic_tilt(p[0], p[1], p[2], p[3], draw);
            Measurement::PelvicTilt {
                angle,
                balance: cfg.thresholds.pelvic_tilt.classify(angle),
            }
        }
        "ss" => Measurement::SacralSlope {
            angle: spinopelvic::sacral_slope(p[0], p[1], draw),
        },
        "spinopelvic" => {
            Measurement::Spinopelvic(spinopelvic::spinopelvic_params(p[0], p[1], p[2], p[3], cfg, draw))
        }
        "curvature" => {
            let curve = curve_type(&options.curve);
            Measurement::SpinalCurvature(spinal_curvature([p[0], p[1], p[2], p[3]], curve, cfg, draw))
        }

        "sva" => Measurement::Sva(sagittal::sva(p[0], p[1], cfg, draw)),
        "csva" => Measurement::CervicalSva(sagittal::cervical_sva(p[0], p[1], cfg, draw)),
        "tpa" => Measurement::T1PelvicAngle(sagittal::t1_pelvic_angle(p[0], p[1], p[2], p[3], p[4], cfg, draw)),
        "spa" => Measurement::SpinoPelvicAngle {
            angle: sagittal::spino_pelvic_angle(p[0], p[1], p[2], p[3], p[4], draw),
        },
        "ssa" => Measurement::SpinoSacralAngle {
            angle: sagittal::spino_sacral_angle(p[0], p[1], p[2], draw),
        },
        "t1spi" => Measurement::T1Spi {
            angle: sagittal::t1_spi(p[0], p[1], p[2], draw),
        },
        "t9spi" => Measurement::T9Spi {
            angle: sagittal::t9_spi(p[0], p[1], p[2], draw),
        },
        "odha" => Measurement::Odha {
            angle: sagittal::odha(p[0], p[1], p[2], draw),
        },
        "cbva" => Measurement::Cbva {
            angle: sagittal::cbva(p[0], p[1], draw),
        },

        "csvl" => Measurement::Csvl {
            x: coronal::csvl(p[0], p[1], draw),
        },
        "c7pl" => Measurement::C7PlumbLine {
            x: coronal::c7_plumb_line(p[0], draw),
        },
        "trunkshift" => Measurement::TrunkShift(coronal::trunk_shift(p[0], p[1], p[2], cfg, draw)),
        "rvad" => Measurement::Rvad(coronal::rvad((p[0], p[1]), (p[2], p[3]), (p[4], p[5]), draw)),
        "avt" => Measurement::Avt {
            offset_mm: coronal::avt(p[0], p[1], p[2], cfg, draw),
        },
        "po" => Measurement::PelvicObliquity {
            angle: coronal::pelvic_obliquity(p[0], p[1], draw),
        },

        "vbm" => Measurement::VertebralBody(vbm(&VbmOutline::from_points(p)?, cfg, draw)),
        "stenosis" => Measurement::Stenosis(abnormality::stenosis(p, options.stenosis_type, cfg, draw)?),
        "slip_distance" => Measurement::SlipDistance {
            slip_mm: abnormality::slip_distance(&SlipLandmarks::from_points(p)?, cfg, draw),
        },
        "slip_angle" => Measurement::SlipAngle {
            angle: abnormality::slip_angle(&SlipLandmarks::from_points(p)?, draw),
        },
        "slip_percentage" => {
            Measurement::SlipPercentage(abnormality::slip_percentage(&SlipLandmarks::from_points(p)?, cfg, draw)?)
        }
        "spondylolisthesis" => {
            Measurement::Spondylolisthesis(abnormality::spondylolisthesis(&SlipLandmarks::from_points(p)?, cfg, draw)?)
        }
        "scoliosis_cobb" => Measurement::ScoliosisCobb(abnormality::scoliosis_cobb(
            (p[0], p[1]),
            (p[2], p[3]),
            options.scoliosis_curve,
            cfg,
            draw,
        )),
        "scoliosis_trunk_shift" => {
            Measurement::ScoliosisTrunkShift(abnormality::scoliosis_trunk_shift(p[0], p[1], p[2], cfg, draw))
        }
        "apt" => Measurement::Apt {
            angle: abnormality::apical_tilt((p[0], p[1]), (p[2], p[3]), draw),
        },
        "scoliosis" => Measurement::Scoliosis(abnormality::scoliosis(p, options.scoliosis_curve, cfg, draw)?),

        "wedge_angle" => {
            let angle = wedge_angle(p[0], p[1], p[2]);
            with_sink(draw, |d| {
                d.line(p[0], p[1], Color::GREEN, 2.0);
                d.line(p[1], p[2], Color::GREEN, 2.0);
                d.angle_arc(p[0], p[1], p[2], Color::RED, 30.0, Some(format!("{angle:.1}°")));
            });
            Measurement::WedgeAngle { angle }
        }
        "rod" => {
            let k = options.rod_curvature.unwrap_or(cfg.implants.rod_curvature);
            Measurement::Rod(implants::rod(p, k, draw)?)
        }
        other => return Err(SpineError::UnknownTool(other.to_string())),
    };

    tracing::debug!(tool = key, value = measurement.value(), "measurement");
    Ok(measurement)
}
