//! Drawable primitives handed back to the host surface.
//!
//! Formulas push overlay geometry into a [`DrawList`]; the host decides how to render it.
//! Full-height and full-width reference lines need the canvas extents, so the list
//! carries them.

use crate::geom::{midpoint, vector, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        a: Point,
        b: Point,
        color: Color,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    Marker {
        at: Point,
        radius: f64,
        color: Color,
    },
    Label {
        at: Point,
        text: String,
        color: Color,
        size: f64,
    },
    /// Arc around `center`; angles in radians, canvas orientation.
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
        color: Color,
    },
    /// Axis-aligned ellipse; a circle when `rx == ry`.
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        color: Color,
        width: f64,
    },
    Polygon {
        vertices: Vec<Point>,
        closed: bool,
        stroke: Color,
        fill: Option<Color>,
        width: f64,
    },
    CubicCurve {
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
        color: Color,
        width: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub width: f64,
    pub height: f64,
    pub items: Vec<Primitive>,
}

impl DrawList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.items.push(primitive);
    }

    pub fn line(&mut self, a: Point, b: Point, color: Color, width: f64) {
        self.push(Primitive::Line {
            a,
            b,
            color,
            width,
            dash: None,
        });
    }

    pub fn dashed_line(&mut self, a: Point, b: Point, dash: [f64; 2], color: Color) {
        self.push(Primitive::Line {
            a,
            b,
            color,
            width: 1.0,
            dash: Some(dash),
        });
    }

    pub fn marker(&mut self, at: Point, radius: f64, color: Color) {
        self.push(Primitive::Marker { at, radius, color });
    }

    pub fn label(&mut self, at: Point, text: impl Into<String>, color: Color) {
        self.push(Primitive::Label {
            at,
            text: text.into(),
            color,
            size: 14.0,
        });
    }

    pub fn vertical_line(&mut self, x: f64, color: Color, width: f64) {
        self.line(Point::new(x, 0.0), Point::new(x, self.height), color, width);
    }

    pub fn horizontal_line(&mut self, y: f64, color: Color, width: f64) {
        self.line(Point::new(0.0, y), Point::new(self.width, y), color, width);
    }

    /// Line through `center` perpendicular to `a–b`, long enough to cross the canvas.
    pub fn perpendicular(&mut self, a: Point, b: Point, center: Point, color: Color) {
        let perp = vector(a, b).perpendicular().normalized();
        let scale = self.height * 2.0;
        self.line(center + perp * scale, center - perp * scale, color, 1.5);
    }

    /// `a–b` stretched past both endpoints by the canvas diagonal.
    pub fn extended_line(&mut self, a: Point, b: Point, color: Color, width: f64) {
        let dir = vector(a, b).normalized();
        let reach = self.width.hypot(self.height);
        self.line(a - dir * reach, b + dir * reach, color, width);
    }

    /// Arc at vertex `b` sweeping the smaller side from ray `b→a` to ray `b→c`, with an optional label.
    pub fn angle_arc(&mut self, a: Point, b: Point, c: Point, color: Color, radius: f64, text: Option<String>) {
        let v1 = vector(b, a).normalized();
        let v2 = vector(b, c).normalized();
        let start = v1.y.atan2(v1.x);
        let end = v2.y.atan2(v2.x);
        let tau = std::f64::consts::TAU;
        let delta = ((end - start) + tau) % tau;
        let anticlockwise = delta > std::f64::consts::PI;

        self.push(Primitive::Arc {
            center: b,
            radius,
            start,
            end,
            anticlockwise,
            color,
        });

        if let Some(text) = text {
            let mid = (start + end) / 2.0;
            let at = Point::new(b.x + (radius + 15.0) * mid.cos(), b.y + (radius + 15.0) * mid.sin());
            self.push(Primitive::Label {
                at,
                text,
                color,
                size: 13.0,
            });
        }
    }

    /// Both endplate perpendiculars used for Cobb-style angles.
    pub fn cobb_guides(&mut self, line1: (Point, Point), line2: (Point, Point), color: Color) {
        self.perpendicular(line1.0, line1.1, midpoint(line1.0, line1.1), color);
        self.perpendicular(line2.0, line2.1, midpoint(line2.0, line2.1), color);
    }

    pub fn ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Color) {
        self.push(Primitive::Ellipse {
            center,
            rx,
            ry,
            color,
            width: 2.0,
        });
    }

    /// Open polyline through `points`.
    pub fn polyline(&mut self, points: &[Point], color: Color, width: f64) {
        self.push(Primitive::Polygon {
            vertices: points.to_vec(),
            closed: false,
            stroke: color,
            fill: None,
            width,
        });
    }

    pub fn polygon(&mut self, vertices: &[Point], closed: bool, stroke: Color, fill: Option<Color>) {
        self.push(Primitive::Polygon {
            vertices: vertices.to_vec(),
            closed,
            stroke,
            fill,
            width: 2.0,
        });
    }
}

/// Pushes into `draw` when a sink was supplied.
pub(crate) fn with_sink(draw: Option<&mut DrawList>, f: impl FnOnce(&mut DrawList)) {
    if let Some(list) = draw {
        f(list);
    }
}
