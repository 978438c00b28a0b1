//! Osteotomy, cage and listhesis simulations over a source raster.
//!
//! Points are named A, B, C, ... in click order. The source raster is never modified;
//! each run composes a fresh buffer.

use crate::affine::Affine;
use crate::raster::RasterBuffer;
use crate::split::{composite_affine, composite_column_shift, overlay, split_at_line, split_band, split_by_side};
use serde::{Deserialize, Serialize};
use spinekit_core::config::SimulationConfig;
use spinekit_core::draw::{Color, DrawList};
use spinekit_core::error::{require_points, Result, SpineError};
use spinekit_core::geom::{inclination, wedge_angle, y_at_x, Point};
use spinekit_core::session::{Progress, ToolSession, ToolShape};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    Wedge,
    Resection,
    OpenOsteotomy,
    Cage,
    Listhesis,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 5] = [
        SimulationMode::Wedge,
        SimulationMode::Resection,
        SimulationMode::OpenOsteotomy,
        SimulationMode::Cage,
        SimulationMode::Listhesis,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SimulationMode::Wedge => "wedge",
            SimulationMode::Resection => "resect",
            SimulationMode::OpenOsteotomy => "open",
            SimulationMode::Cage => "cage",
            SimulationMode::Listhesis => "listhesis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SimulationMode::Wedge => "Wedge Osteotomy",
            SimulationMode::Resection => "Resection Osteotomy",
            SimulationMode::OpenOsteotomy => "Open Osteotomy",
            SimulationMode::Cage => "Cage Simulation",
            SimulationMode::Listhesis => "Listhesis Correction",
        }
    }

    pub fn point_count(self) -> usize {
        match self {
            SimulationMode::Wedge => 3,
            SimulationMode::Listhesis => 4,
            SimulationMode::Resection | SimulationMode::OpenOsteotomy | SimulationMode::Cage => 6,
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SimulationMode {
    type Err = SpineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SimulationMode::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| SpineError::UnknownTool(s.to_string()))
    }
}

impl ToolShape for SimulationMode {
    fn key(&self) -> &str {
        SimulationMode::key(*self)
    }

    fn required_points(&self) -> Option<usize> {
        Some(self.point_count())
    }
}

#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub mode: SimulationMode,
    pub raster: RasterBuffer,
    /// Opaque pixels that mapped outside the canvas and were discarded.
    pub dropped_pixels: usize,
    pub guides: DrawList,
    /// Opening angle, for the wedge osteotomy only.
    pub wedge_angle: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub mode: SimulationMode,
    pub width: u32,
    pub height: u32,
    pub opaque_pixels: usize,
    pub dropped_pixels: usize,
    pub wedge_angle: Option<f64>,
}

impl SimulationOutput {
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            mode: self.mode,
            width: self.raster.width(),
            height: self.raster.height(),
            opaque_pixels: self.raster.opaque_count(),
            dropped_pixels: self.dropped_pixels,
            wedge_angle: self.wedge_angle,
        }
    }
}

fn guides_for(src: &RasterBuffer) -> DrawList {
    DrawList::new(f64::from(src.width()), f64::from(src.height()))
}

/// Closing wedge: the region on the non-"above" side of `C→B` swings about hinge B
/// from ray B→C onto ray B→A and is drawn over the rest.
pub fn wedge_osteotomy(src: &RasterBuffer, points: &[Point]) -> Result<SimulationOutput> {
    require_points(points, 3)?;
    let (a, b, c) = (points[0], points[1], points[2]);

    let (mut out, moving) = split_by_side(src, c, b);
    let rotation = (inclination(b, a) - inclination(b, c)).to_radians();
    let dropped = composite_affine(&mut out, &moving, &Affine::rotation_about(b, rotation));

    let angle = wedge_angle(a, b, c);
    let mut guides = guides_for(src);
    guides.extended_line(a, b, Color::RED, 2.0);
    guides.label(Point::new(b.x + 10.0, b.y + 20.0), format!("{angle:.1}°"), Color::YELLOW);

    tracing::debug!(angle, dropped, "wedge osteotomy");
    Ok(SimulationOutput {
        mode: SimulationMode::Wedge,
        raster: out,
        dropped_pixels: dropped,
        guides,
        wedge_angle: Some(angle),
    })
}

/// Removes the band between EF and AB and closes the gap onto CD column by column.
pub fn resection(src: &RasterBuffer, points: &[Point]) -> Result<SimulationOutput> {
    require_points(points, 6)?;
    let (a, b, c, d, e, f) = (points[0], points[1], points[2], points[3], points[4], points[5]);

    let (upper, lower) = split_band(src, (e, f), (a, b));
    let mut out = src.blank_like();
    let mut dropped = composite_column_shift(&mut out, &upper, |x| (y_at_x(c, d, x) - y_at_x(e, f, x)).round() as i64);
    dropped += composite_column_shift(&mut out, &lower, |x| (y_at_x(c, d, x) - y_at_x(a, b, x)).round() as i64);

    let mut guides = guides_for(src);
    guides.extended_line(c, d, Color::RED, 2.0);

    Ok(SimulationOutput {
        mode: SimulationMode::Resection,
        raster: out,
        dropped_pixels: dropped,
        guides,
        wedge_angle: None,
    })
}

/// Splits at CD, then carries the upper part onto EF and the lower part onto AB.
pub fn open_osteotomy(src: &RasterBuffer, points: &[Point]) -> Result<SimulationOutput> {
    require_points(points, 6)?;
    let (a, b, c, d, e, f) = (points[0], points[1], points[2], points[3], points[4], points[5]);

    let (upper, lower) = split_at_line(src, c, d);
    let mut out = src.blank_like();
    let mut dropped = composite_affine(&mut out, &lower, &Affine::align((c, d), (a, b), 0.0));
    dropped += composite_affine(&mut out, &upper, &Affine::align((c, d), (e, f), 0.0));

    let mut guides = guides_for(src);
    guides.extended_line(a, b, Color::RED, 2.0);
    guides.extended_line(e, f, Color::RED, 2.0);

    Ok(SimulationOutput {
        mode: SimulationMode::OpenOsteotomy,
        raster: out,
        dropped_pixels: dropped,
        guides,
        wedge_angle: None,
    })
}

/// Interbody cage: the lower part stays, the upper part is lifted from CD onto EF.
///
/// AB marks the fixed lower endplate and only appears in the guides.
pub fn cage_simulation(src: &RasterBuffer, points: &[Point]) -> Result<SimulationOutput> {
    require_points(points, 6)?;
    let (a, b, c, d, e, f) = (points[0], points[1], points[2], points[3], points[4], points[5]);

    let (upper, lower) = split_at_line(src, c, d);
    let mut out = src.blank_like();
    overlay(&mut out, &lower);
    let dropped = composite_affine(&mut out, &upper, &Affine::align((c, d), (e, f), 0.0));

    let mut guides = guides_for(src);
    guides.dashed_line(a, b, [5.0, 5.0], Color::GREEN);
    guides.extended_line(c, d, Color::RED, 2.0);
    guides.extended_line(e, f, Color::RED, 2.0);

    Ok(SimulationOutput {
        mode: SimulationMode::Cage,
        raster: out,
        dropped_pixels: dropped,
        guides,
        wedge_angle: None,
    })
}

/// Reduces a slip: the part above AB is carried onto CD and lifted by `gap` pixels.
pub fn listhesis_correction(src: &RasterBuffer, points: &[Point], gap: f64) -> Result<SimulationOutput> {
    require_points(points, 4)?;
    let (a, b, c, d) = (points[0], points[1], points[2], points[3]);

    let (upper, lower) = split_at_line(src, a, b);
    let mut out = src.blank_like();
    overlay(&mut out, &lower);
    let dropped = composite_affine(&mut out, &upper, &Affine::align((a, b), (c, d), gap));

    let mut guides = guides_for(src);
    guides.extended_line(a, b, Color::RED, 2.0);
    guides.extended_line(c, d, Color::GREEN, 2.0);

    Ok(SimulationOutput {
        mode: SimulationMode::Listhesis,
        raster: out,
        dropped_pixels: dropped,
        guides,
        wedge_angle: None,
    })
}

pub fn simulate(
    mode: SimulationMode,
    src: &RasterBuffer,
    points: &[Point],
    cfg: &SimulationConfig,
) -> Result<SimulationOutput> {
    match mode {
        SimulationMode::Wedge => wedge_osteotomy(src, points),
        SimulationMode::Resection => resection(src, points),
        SimulationMode::OpenOsteotomy => open_osteotomy(src, points),
        SimulationMode::Cage => cage_simulation(src, points),
        SimulationMode::Listhesis => listhesis_correction(src, points, cfg.listhesis_gap),
    }
}

/// Collects clicks for one simulation mode and runs it against the loaded raster.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    tool: ToolSession<SimulationMode>,
    source: Option<RasterBuffer>,
    cfg: SimulationConfig,
}

impl SimulationSession {
    pub fn new(mode: SimulationMode, cfg: SimulationConfig) -> Self {
        Self {
            tool: ToolSession::new(mode),
            source: None,
            cfg,
        }
    }

    pub fn mode(&self) -> SimulationMode {
        *self.tool.shape()
    }

    pub fn set_mode(&mut self, mode: SimulationMode) {
        self.tool = ToolSession::new(mode);
    }

    pub fn set_source(&mut self, raster: RasterBuffer) {
        self.source = Some(raster);
        self.tool.reset();
    }

    pub fn source(&self) -> Option<&RasterBuffer> {
        self.source.as_ref()
    }

    pub fn progress(&self) -> Progress {
        self.tool.progress()
    }

    pub fn reset(&mut self) {
        self.tool.reset();
    }

    /// Records a click and runs the simulation once enough points exist.
    ///
    /// Without a source raster the click sequence is dropped and `MissingInput` returned.
    pub fn click(&mut self, pt: Point) -> Result<Option<SimulationOutput>> {
        if self.tool.push(pt) != Progress::Ready {
            return Ok(None);
        }
        let points = self.tool.take();
        let Some(source) = self.source.as_ref() else {
            tracing::warn!(mode = %self.mode(), "no source raster loaded");
            return Err(SpineError::MissingInput("source raster"));
        };
        simulate(self.mode(), source, &points, &self.cfg).map(Some)
    }
}
