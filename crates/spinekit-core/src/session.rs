//! Click accumulation for the active tool.

use crate::config::SpineConfig;
use crate::draw::DrawList;
use crate::error::{Result, SpineError};
use crate::geom::Point;
use crate::measurement::Measurement;
use crate::polygon::{PolygonAction, PolygonSession};
use crate::tools::{evaluate, find_tool, ToolDescriptor, ToolOptions};
use crate::vbm::{VbmEditor, VbmOutline};
use serde::Serialize;

/// Anything that can be driven by a click count.
pub trait ToolShape {
    fn key(&self) -> &str;

    /// `None` for open-ended tools.
    fn required_points(&self) -> Option<usize>;
}

impl ToolShape for &'static ToolDescriptor {
    fn key(&self) -> &str {
        self.key
    }

    fn required_points(&self) -> Option<usize> {
        self.required_points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Progress {
    Collecting { have: usize, need: Option<usize> },
    Ready,
}

/// Ordered points for one tool activation.
#[derive(Debug, Clone)]
pub struct ToolSession<T> {
    shape: T,
    points: Vec<Point>,
}

impl<T: ToolShape> ToolSession<T> {
    pub fn new(shape: T) -> Self {
        Self {
            shape,
            points: Vec::new(),
        }
    }

    pub fn shape(&self) -> &T {
        &self.shape
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Records a click. A fixed-count tool that is already full starts over first.
    pub fn push(&mut self, pt: Point) -> Progress {
        if self.is_ready() {
            self.points.clear();
        }
        self.points.push(pt);
        self.progress()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.shape.required_points(), Some(n) if self.points.len() >= n)
    }

    pub fn progress(&self) -> Progress {
        if self.is_ready() {
            Progress::Ready
        } else {
            Progress::Collecting {
                have: self.points.len(),
                need: self.shape.required_points(),
            }
        }
    }

    /// Hands over the collected points and empties the session.
    pub fn take(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.points)
    }
}

/// A finished measurement plus its overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureOutcome {
    pub measurement: Measurement,
    pub draw: DrawList,
}

/// Drives one measurement tool at a time from pointer clicks.
#[derive(Debug, Clone)]
pub struct MeasureSession {
    tool: ToolSession<&'static ToolDescriptor>,
    polygon: PolygonSession,
    options: ToolOptions,
    cfg: SpineConfig,
    canvas: (f64, f64),
    vbm: Option<VbmEditor>,
}

impl MeasureSession {
    pub fn new(key: &str, cfg: SpineConfig, canvas_width: f64, canvas_height: f64) -> Result<Self> {
        let descriptor = find_tool(key)?;
        Ok(Self {
            tool: ToolSession::new(descriptor),
            polygon: PolygonSession::new(cfg.polygon_close_threshold),
            options: ToolOptions::default(),
            cfg,
            canvas: (canvas_width, canvas_height),
            vbm: None,
        })
    }

    pub fn with_options(mut self, options: ToolOptions) -> Self {
        self.options = options;
        self
    }

    pub fn descriptor(&self) -> &'static ToolDescriptor {
        *self.tool.shape()
    }

    pub fn options_mut(&mut self) -> &mut ToolOptions {
        &mut self.options
    }

    pub fn config(&self) -> &SpineConfig {
        &self.cfg
    }

    pub fn progress(&self) -> Progress {
        if self.uses_polygon() {
            return Progress::Collecting {
                have: self.polygon.vertices().len(),
                need: None,
            };
        }
        self.tool.progress()
    }

    /// Switches tool and drops everything collected so far.
    pub fn set_tool(&mut self, key: &str) -> Result<()> {
        let descriptor = find_tool(key)?;
        self.tool = ToolSession::new(descriptor);
        self.reset();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.tool.reset();
        self.polygon.reset();
        self.vbm = None;
    }

    /// Outline editor left behind by the last VBM measurement.
    pub fn vbm_editor(&mut self) -> Option<&mut VbmEditor> {
        self.vbm.as_mut()
    }

    pub fn click(&mut self, pt: Point) -> Result<Option<MeasureOutcome>> {
        if self.uses_polygon() {
            let step = self.polygon.add_point(pt);
            return self.polygon_step(step.action, &step.points);
        }

        let progress = self.tool.push(pt);
        match (self.tool.shape().required_points(), progress) {
            (None, _) => {
                let points = self.tool.points().to_vec();
                self.run(&points)
            }
            (Some(_), Progress::Ready) => {
                let points = self.tool.take();
                let outcome = self.run(&points)?;
                if self.tool.shape().key == "vbm" {
                    self.vbm = Some(VbmEditor::new(VbmOutline::from_points(&points)?));
                }
                Ok(outcome)
            }
            (Some(_), Progress::Collecting { .. }) => Ok(None),
        }
    }

    /// Host-detected double click; only polygon tools distinguish it from a click.
    pub fn double_click(&mut self, pt: Point) -> Result<Option<MeasureOutcome>> {
        if !self.uses_polygon() {
            return self.click(pt);
        }
        let step = self.polygon.add_double_click(pt);
        self.polygon_step(step.action, &step.points)
    }

    /// Completes an open-ended tool with whatever has been collected.
    pub fn finish(&mut self) -> Result<Option<MeasureOutcome>> {
        if self.tool.shape().required_points().is_some() || self.uses_polygon() {
            return Ok(None);
        }
        let points = self.tool.take();
        self.run(&points)
    }

    fn uses_polygon(&self) -> bool {
        matches!(self.tool.shape().key, "polygon" | "stenosis")
    }

    fn polygon_step(&self, action: PolygonAction, points: &[Point]) -> Result<Option<MeasureOutcome>> {
        if action != PolygonAction::Complete {
            return Ok(None);
        }
        self.run(points)
    }

    /// Evaluates the tool; too few points is a quiet no-op.
    fn run(&self, points: &[Point]) -> Result<Option<MeasureOutcome>> {
        let mut draw = DrawList::new(self.canvas.0, self.canvas.1);
        match evaluate(self.tool.shape().key, points, &self.options, &self.cfg, Some(&mut draw)) {
            Ok(measurement) => Ok(Some(MeasureOutcome { measurement, draw })),
            Err(SpineError::InsufficientPoints { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
