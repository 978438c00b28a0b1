use crate::error::{require_points, Result, SpineError};
use crate::geom::{distance, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonAction {
    Start,
    Continue,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStep {
    pub action: PolygonAction,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonState {
    Idle,
    Collecting,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
    pub closed: bool,
}

impl Polygon {
    pub fn area(&self) -> Result<f64> {
        polygon_area(&self.vertices)
    }

    pub fn centroid(&self) -> Result<Point> {
        polygon_centroid(&self.vertices)
    }
}

/// Click accumulator for one polygon at a time.
///
/// Owned by the tool session that uses it; call [`PolygonSession::reset`] when the
/// host switches tools.
#[derive(Debug, Clone)]
pub struct PolygonSession {
    close_threshold: f64,
    state: PolygonState,
    vertices: Vec<Point>,
}

impl PolygonSession {
    pub fn new(close_threshold: f64) -> Self {
        Self {
            close_threshold,
            state: PolygonState::Idle,
            vertices: Vec::new(),
        }
    }

    pub fn state(&self) -> PolygonState {
        self.state
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn reset(&mut self) {
        self.state = PolygonState::Idle;
        self.vertices.clear();
    }

    /// Single click. Closes when the click lands near vertex 0 and three vertices exist;
    /// the closing click is not stored.
    pub fn add_point(&mut self, pt: Point) -> PolygonStep {
        self.step(pt, false)
    }

    /// Host-detected double click: stores the point, then closes if that makes three vertices.
    pub fn add_double_click(&mut self, pt: Point) -> PolygonStep {
        self.step(pt, true)
    }

    /// The closed polygon, once the state machine has reached `Closed`.
    pub fn polygon(&self) -> Option<Polygon> {
        (self.state == PolygonState::Closed).then(|| Polygon {
            vertices: self.vertices.clone(),
            closed: true,
        })
    }

    fn step(&mut self, pt: Point, double_click: bool) -> PolygonStep {
        if self.state == PolygonState::Closed {
            self.reset();
        }

        if self.state == PolygonState::Idle {
            self.state = PolygonState::Collecting;
            self.vertices.push(pt);
            return self.emit(PolygonAction::Start);
        }

        let near_start = self.vertices.len() >= 3
            && distance(pt, self.vertices[0]) < self.close_threshold;
        if near_start {
            return self.close();
        }

        self.vertices.push(pt);
        if double_click && self.vertices.len() >= 3 {
            return self.close();
        }
        self.emit(PolygonAction::Continue)
    }

    fn close(&mut self) -> PolygonStep {
        self.state = PolygonState::Closed;
        tracing::debug!(vertices = self.vertices.len(), "polygon closed");
        self.emit(PolygonAction::Complete)
    }

    fn emit(&self, action: PolygonAction) -> PolygonStep {
        PolygonStep {
            action,
            points: self.vertices.clone(),
        }
    }
}

fn shoelace_terms(vertices: &[Point]) -> impl Iterator<Item = (Point, Point, f64)> + '_ {
    vertices.iter().enumerate().map(move |(i, &a)| {
        let b = vertices[(i + 1) % vertices.len()];
        (a, b, a.x * b.y - b.x * a.y)
    })
}

/// Shoelace area, always non-negative.
pub fn polygon_area(vertices: &[Point]) -> Result<f64> {
    require_points(vertices, 3)?;
    let twice: f64 = shoelace_terms(vertices).map(|(_, _, cross)| cross).sum();
    Ok(twice.abs() / 2.0)
}

/// Area-weighted centroid from the shoelace sums.
pub fn polygon_centroid(vertices: &[Point]) -> Result<Point> {
    require_points(vertices, 3)?;
    let mut signed_twice = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (a, b, cross) in shoelace_terms(vertices) {
        signed_twice += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    if signed_twice.abs() < f64::EPSILON {
        return Err(SpineError::DegenerateGeometry("polygon has zero area"));
    }
    let six_a = 3.0 * signed_twice;
    Ok(Point::new(cx / six_a, cy / six_a))
}

/// Arithmetic mean of the vertices; used for label placement.
pub fn vertex_mean(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::default();
    }
    let n = vertices.len() as f64;
    let sum = vertices.iter().fold(Point::default(), |acc, &p| acc + p);
    Point::new(sum.x / n, sum.y / n)
}
