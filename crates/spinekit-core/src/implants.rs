//! Screws, cages and rods placed over the image during surgical planning.
//!
//! Implants live in an [`ImplantSet`] for the length of an editing session and survive
//! tool switches; nothing here is persisted.

use crate::config::ImplantConfig;
use crate::draw::{Color, DrawList, Primitive};
use crate::error::{require_points, Result};
use crate::geom::{distance, BBox2, Point};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

const CAGE_CORNER_RADIUS: f64 = 3.0;
const CAGE_HANDLE_SIZE: f64 = 6.0;
const SELECTED: Color = Color::rgb(0xff, 0x6b, 0x6b);
const CAGE_STROKE: Color = Color::rgb(0x4a, 0x90, 0xe2);
const CAGE_MESH: Color = Color::rgb(0x2c, 0x52, 0x82);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screw {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    /// Radians.
    pub angle: f64,
    pub selected: bool,
}

impl Screw {
    pub fn new(at: Point, length: f64) -> Self {
        Self {
            x: at.x,
            y: at.y,
            length,
            angle: 0.0,
            selected: false,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Shaft endpoints; the head sits on the first one.
    pub fn endpoints(&self) -> (Point, Point) {
        let half = Point::new(self.angle.cos(), self.angle.sin()) * (self.length / 2.0);
        (self.center() - half, self.center() + half)
    }

    pub fn hit(&self, pt: Point, radius: f64) -> bool {
        distance(pt, self.center()) < radius
    }

    pub fn rotate(&mut self, delta: f64) {
        self.angle += delta;
    }

    pub fn draw(&self, d: &mut DrawList) {
        let (head, tip) = self.endpoints();
        let color = if self.selected { Color::RED } else { Color::BLUE };
        d.line(head, tip, color, 4.0);
        d.marker(head, 5.0, Color::BLACK);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cage {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians.
    pub angle: f64,
    pub selected: bool,
}

impl Cage {
    pub fn new(at: Point, width: f64, height: f64) -> Self {
        Self {
            x: at.x,
            y: at.y,
            width,
            height,
            angle: 0.0,
            selected: false,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Unrotated footprint; hit testing ignores `angle`.
    pub fn bounds(&self) -> BBox2 {
        BBox2::centered(self.center(), self.width, self.height)
    }

    fn to_canvas(&self, local: Point) -> Point {
        let (sin, cos) = self.angle.sin_cos();
        Point::new(
            self.x + local.x * cos - local.y * sin,
            self.y + local.x * sin + local.y * cos,
        )
    }

    fn outline(&self) -> Vec<Point> {
        let hw = self.width / 2.0 - CAGE_CORNER_RADIUS;
        let hh = self.height / 2.0 - CAGE_CORNER_RADIUS;
        let corners = [
            (Point::new(hw, hh), 0.0),
            (Point::new(-hw, hh), FRAC_PI_2),
            (Point::new(-hw, -hh), 2.0 * FRAC_PI_2),
            (Point::new(hw, -hh), 3.0 * FRAC_PI_2),
        ];
        corners
            .iter()
            .flat_map(|&(c, start)| {
                (0..=3).map(move |i| {
                    let t = start + FRAC_PI_2 * f64::from(i) / 3.0;
                    c + Point::new(t.cos(), t.sin()) * CAGE_CORNER_RADIUS
                })
            })
            .map(|p| self.to_canvas(p))
            .collect()
    }

    pub fn draw(&self, d: &mut DrawList) {
        let (stroke, fill, mesh) = if self.selected {
            (SELECTED, Color::rgba(0xff, 0x6b, 0x6b, 77), SELECTED)
        } else {
            (CAGE_STROKE, Color::rgba(0x4a, 0x90, 0xe2, 77), CAGE_MESH)
        };
        d.polygon(&self.outline(), true, stroke, Some(fill));

        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let mut x = -hw + 5.0;
        while x < hw {
            let a = self.to_canvas(Point::new(x, -hh + 2.0));
            let b = self.to_canvas(Point::new(x, hh - 2.0));
            d.line(a, b, mesh, 1.0);
            x += 8.0;
        }
        let mut y = -hh + 3.0;
        while y < hh {
            let a = self.to_canvas(Point::new(-hw + 2.0, y));
            let b = self.to_canvas(Point::new(hw - 2.0, y));
            d.line(a, b, mesh, 1.0);
            y += 4.0;
        }

        if self.selected {
            for corner in self.bounds().corners() {
                let square = BBox2::centered(corner, CAGE_HANDLE_SIZE, CAGE_HANDLE_SIZE).corners();
                d.polygon(&square, true, SELECTED, Some(SELECTED));
            }
        }
    }
}

/// Keys the implant editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
    Char(char),
}

impl Key {
    /// Parses a DOM-style key name such as `"ArrowLeft"` or `"r"`.
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "Delete" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            _ => name.chars().exactly_one().ok().map(Key::Char),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Screw(usize),
    Cage { index: usize, offset: Point },
}

#[derive(Debug, Clone, Default)]
pub struct ImplantSet {
    cfg: ImplantConfig,
    screws: Vec<Screw>,
    cages: Vec<Cage>,
    drag: Option<Drag>,
}

impl ImplantSet {
    pub fn new(cfg: ImplantConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    pub fn screws(&self) -> &[Screw] {
        &self.screws
    }

    pub fn cages(&self) -> &[Cage] {
        &self.cages
    }

    pub fn is_empty(&self) -> bool {
        self.screws.is_empty() && self.cages.is_empty()
    }

    pub fn add_screw(&mut self, at: Point) -> usize {
        self.screws.push(Screw::new(at, self.cfg.screw_default_length));
        self.screws.len() - 1
    }

    pub fn add_cage(&mut self, at: Point) -> usize {
        self.cages
            .push(Cage::new(at, self.cfg.cage_default_width, self.cfg.cage_default_height));
        self.cages.len() - 1
    }

    pub fn clear(&mut self) {
        self.screws.clear();
        self.cages.clear();
        self.drag = None;
    }

    /// Selects and starts dragging the implant under `pt`.
    ///
    /// Screws are tested before cages; among cages the most recently added wins.
    /// Returns true when something was picked.
    pub fn pointer_down(&mut self, pt: Point) -> bool {
        self.deselect_all();
        self.drag = None;

        let radius = self.cfg.screw_hit_radius;
        if let Some(index) = self.screws.iter().rposition(|s| s.hit(pt, radius)) {
            self.screws[index].selected = true;
            self.drag = Some(Drag::Screw(index));
            return true;
        }
        if let Some(index) = self.cages.iter().rposition(|c| c.bounds().contains(pt)) {
            let cage = &mut self.cages[index];
            cage.selected = true;
            self.drag = Some(Drag::Cage {
                index,
                offset: pt - cage.center(),
            });
            return true;
        }
        false
    }

    /// Returns true when an implant moved.
    pub fn pointer_move(&mut self, pt: Point) -> bool {
        match self.drag {
            Some(Drag::Screw(index)) => {
                let screw = &mut self.screws[index];
                screw.x = pt.x;
                screw.y = pt.y;
                true
            }
            Some(Drag::Cage { index, offset }) => {
                let cage = &mut self.cages[index];
                cage.x = pt.x - offset.x;
                cage.y = pt.y - offset.y;
                true
            }
            None => false,
        }
    }

    /// Ends the drag; the implant stays selected for keyboard edits.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Applies a key to the selected implant. Returns true when anything changed.
    pub fn key(&mut self, key: Key) -> bool {
        let mut changed = false;
        let step = self.cfg.screw_rotate_step;
        for screw in self.screws.iter_mut().filter(|s| s.selected) {
            match key {
                Key::ArrowLeft => screw.rotate(-step),
                Key::ArrowRight => screw.rotate(step),
                _ => continue,
            }
            changed = true;
        }

        let Some(index) = self.cages.iter().position(|c| c.selected) else {
            return changed;
        };
        if matches!(key, Key::Delete | Key::Backspace) {
            self.cages.remove(index);
            self.drag = None;
            tracing::debug!(index, "cage removed");
            return true;
        }

        let cfg = &self.cfg;
        let cage = &mut self.cages[index];
        match key {
            Key::Char('r' | 'R') => cage.angle += cfg.cage_rotate_step,
            Key::Char('+' | '=') => {
                cage.width = (cage.width + cfg.cage_width_step).min(cfg.cage_max_width);
                cage.height = (cage.height + cfg.cage_height_step).min(cfg.cage_max_height);
            }
            Key::Char('-' | '_') => {
                cage.width = (cage.width - cfg.cage_width_step).max(cfg.cage_min_width);
                cage.height = (cage.height - cfg.cage_height_step).max(cfg.cage_min_height);
            }
            _ => return changed,
        }
        true
    }

    pub fn draw(&self, d: &mut DrawList) {
        for cage in &self.cages {
            cage.draw(d);
        }
        for screw in &self.screws {
            screw.draw(d);
        }
    }

    fn deselect_all(&mut self) {
        self.screws.iter_mut().for_each(|s| s.selected = false);
        self.cages.iter_mut().for_each(|c| c.selected = false);
    }
}

/// One cubic Bézier piece of a rod.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub from: Point,
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodMeasurement {
    pub segments: usize,
    /// Sum of straight distances between clicked points, not the curve arc length.
    pub total_length: f64,
    pub curvature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodPath {
    pub points: Vec<Point>,
    pub curvature: f64,
}

impl RodPath {
    pub fn new(curvature: f64) -> Self {
        Self {
            points: Vec::new(),
            curvature,
        }
    }

    pub fn push(&mut self, pt: Point) {
        self.points.push(pt);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn length(&self) -> f64 {
        self.points.iter().tuple_windows().map(|(&a, &b)| distance(a, b)).sum()
    }

    /// Catmull-Rom style pieces through every point; the ends reuse their own point
    /// as the missing neighbour. Two points give one straight piece.
    pub fn curve(&self) -> Vec<CubicSegment> {
        let pts = &self.points;
        let k = self.curvature;
        if pts.len() == 2 {
            return vec![CubicSegment {
                from: pts[0],
                c1: pts[0],
                c2: pts[1],
                to: pts[1],
            }];
        }
        (0..pts.len().saturating_sub(1))
            .map(|i| {
                let p0 = pts[i.saturating_sub(1)];
                let p1 = pts[i];
                let p2 = pts[i + 1];
                let p3 = pts[(i + 2).min(pts.len() - 1)];
                CubicSegment {
                    from: p1,
                    c1: p1 + (p2 - p0) * k,
                    c2: p2 - (p3 - p1) * k,
                    to: p2,
                }
            })
            .collect()
    }

    pub fn measure(&self, draw: Option<&mut DrawList>) -> Result<RodMeasurement> {
        require_points(&self.points, 2)?;
        if let Some(d) = draw {
            for seg in self.curve() {
                d.push(Primitive::CubicCurve {
                    from: seg.from,
                    c1: seg.c1,
                    c2: seg.c2,
                    to: seg.to,
                    color: Color::BLACK,
                    width: 5.0,
                });
            }
        }
        Ok(RodMeasurement {
            segments: self.points.len() - 1,
            total_length: self.length(),
            curvature: self.curvature,
        })
    }
}

pub fn rod(points: &[Point], curvature: f64, draw: Option<&mut DrawList>) -> Result<RodMeasurement> {
    RodPath {
        points: points.to_vec(),
        curvature,
    }
    .measure(draw)
}
