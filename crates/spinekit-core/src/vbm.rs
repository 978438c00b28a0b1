//! Vertebral body metrics and the editable body outline.

use crate::config::SpineConfig;
use crate::curvature::endplate_angle;
use crate::draw::{with_sink, Color, DrawList};
use crate::error::{require_points, Result};
use crate::geom::{distance, midpoint, Point};
use crate::polygon::polygon_area;
use serde::{Deserialize, Serialize};

/// Handle pick radius in canvas units.
pub const HANDLE_TOLERANCE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vbm {
    pub anterior_height_mm: f64,
    pub posterior_height_mm: f64,
    pub wedge_angle: f64,
    pub area_mm2: f64,
}

/// Four vertebral body corners; clicked as upper anterior, upper posterior,
/// lower anterior, lower posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VbmOutline {
    pub upper_anterior: Point,
    pub upper_posterior: Point,
    pub lower_anterior: Point,
    pub lower_posterior: Point,
}

impl VbmOutline {
    pub fn from_points(points: &[Point]) -> Result<Self> {
        require_points(points, 4)?;
        Ok(Self {
            upper_anterior: points[0],
            upper_posterior: points[1],
            lower_anterior: points[2],
            lower_posterior: points[3],
        })
    }

    /// Corners in drawing order around the body.
    pub fn ring(&self) -> [Point; 4] {
        [
            self.upper_anterior,
            self.upper_posterior,
            self.lower_posterior,
            self.lower_anterior,
        ]
    }

    /// Index into [`VbmOutline::ring`] of the handle under `pt`, if any.
    pub fn hit_handle(&self, pt: Point, tolerance: f64) -> Option<usize> {
        self.ring().iter().position(|&corner| distance(corner, pt) < tolerance)
    }

    /// Moves one ring corner; out-of-range indices are ignored.
    pub fn move_handle(&mut self, index: usize, to: Point) {
        match index {
            0 => self.upper_anterior = to,
            1 => self.upper_posterior = to,
            2 => self.lower_posterior = to,
            3 => self.lower_anterior = to,
            _ => {}
        }
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.ring()).unwrap_or(0.0)
    }

    pub fn measure(&self, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> Vbm {
        vbm(self, cfg, draw)
    }
}

pub fn vbm(outline: &VbmOutline, cfg: &SpineConfig, mut draw: Option<&mut DrawList>) -> Vbm {
    let o = outline;
    let anterior = distance(o.upper_anterior, o.lower_anterior);
    let posterior = distance(o.upper_posterior, o.lower_posterior);
    let wedge_angle = endplate_angle(
        o.upper_anterior,
        o.upper_posterior,
        o.lower_anterior,
        o.lower_posterior,
        draw.as_deref_mut(),
    );
    let result = Vbm {
        anterior_height_mm: cfg.mm(anterior),
        posterior_height_mm: cfg.mm(posterior),
        wedge_angle,
        area_mm2: cfg.mm2(o.area()),
    };

    with_sink(draw, |d| {
        d.line(o.upper_anterior, o.lower_anterior, Color::BLUE, 2.0);
        d.line(o.upper_posterior, o.lower_posterior, Color::BLUE, 2.0);
        d.label(
            midpoint(o.upper_anterior, o.lower_anterior),
            format!("AH: {:.1}mm", result.anterior_height_mm),
            Color::BLACK,
        );
        d.label(
            midpoint(o.upper_posterior, o.lower_posterior),
            format!("PH: {:.1}mm", result.posterior_height_mm),
            Color::BLACK,
        );
        d.label(
            midpoint(o.upper_anterior, o.upper_posterior),
            format!("Wedge Angle: {wedge_angle:.1}°"),
            Color::BLACK,
        );
        let ring = o.ring();
        d.polygon(&ring, true, Color::ORANGE, Some(Color::rgba(255, 165, 0, 26)));
        for corner in ring {
            d.marker(corner, 6.0, Color::WHITE);
        }
    });
    tracing::debug!(?result, "vertebral body metrics");
    result
}

/// Drag state for one outline: press picks a handle, move recomputes, release finishes.
#[derive(Debug, Clone)]
pub struct VbmEditor {
    outline: VbmOutline,
    tolerance: f64,
    dragging: Option<usize>,
}

impl VbmEditor {
    pub fn new(outline: VbmOutline) -> Self {
        Self {
            outline,
            tolerance: HANDLE_TOLERANCE,
            dragging: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn outline(&self) -> &VbmOutline {
        &self.outline
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Returns true when the press grabbed a handle.
    pub fn pointer_down(&mut self, pt: Point) -> bool {
        self.dragging = self.outline.hit_handle(pt, self.tolerance);
        self.dragging.is_some()
    }

    /// Live recompute while a handle is held; `None` when nothing is being dragged.
    pub fn pointer_move(&mut self, pt: Point, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> Option<Vbm> {
        let index = self.dragging?;
        self.outline.move_handle(index, pt);
        Some(self.outline.measure(cfg, draw))
    }

    pub fn pointer_up(&mut self, cfg: &SpineConfig, draw: Option<&mut DrawList>) -> Option<Vbm> {
        self.dragging.take()?;
        Some(self.outline.measure(cfg, draw))
    }
}
