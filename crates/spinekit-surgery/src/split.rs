//! Region extraction and compositing.

use crate::affine::Affine;
use crate::raster::RasterBuffer;
use spinekit_core::geom::{is_above_line, y_at_x, Point};

/// Copies the pixels of `src` for which `keep(x, y)` holds into a new buffer.
pub fn extract(src: &RasterBuffer, mut keep: impl FnMut(f64, f64) -> bool) -> RasterBuffer {
    let mut out = src.blank_like();
    for (x, y) in src.coords() {
        let (xi, yi) = (i64::from(x), i64::from(y));
        if keep(f64::from(x), f64::from(y)) {
            if let Some(px) = src.get(xi, yi) {
                out.put(xi, yi, px);
            }
        }
    }
    out
}

/// Splits at the line `a–b`: rows strictly above it per column, then the rest.
pub fn split_at_line(src: &RasterBuffer, a: Point, b: Point) -> (RasterBuffer, RasterBuffer) {
    let upper = extract(src, |x, y| y < y_at_x(a, b, x));
    let lower = extract(src, |x, y| y >= y_at_x(a, b, x));
    tracing::debug!(
        upper = upper.opaque_count(),
        lower = lower.opaque_count(),
        "split at line"
    );
    (upper, lower)
}

/// Keeps what lies above `top` and what lies below `bottom`; the band between is removed.
pub fn split_band(src: &RasterBuffer, top: (Point, Point), bottom: (Point, Point)) -> (RasterBuffer, RasterBuffer) {
    let upper = extract(src, |x, y| y < y_at_x(top.0, top.1, x));
    let lower = extract(src, |x, y| y > y_at_x(bottom.0, bottom.1, x));
    tracing::debug!(
        upper = upper.opaque_count(),
        lower = lower.opaque_count(),
        "split band"
    );
    (upper, lower)
}

/// Splits by side of the directed line `a→b`: `(above, rest)`.
pub fn split_by_side(src: &RasterBuffer, a: Point, b: Point) -> (RasterBuffer, RasterBuffer) {
    let above = extract(src, |x, y| is_above_line(Point::new(x, y), a, b));
    let rest = extract(src, |x, y| !is_above_line(Point::new(x, y), a, b));
    (above, rest)
}

/// Writes every opaque pixel of `src` onto `dst` unchanged.
pub fn overlay(dst: &mut RasterBuffer, src: &RasterBuffer) {
    for (x, y) in src.coords() {
        let (x, y) = (i64::from(x), i64::from(y));
        if let Some(px) = src.opaque(x, y) {
            dst.put(x, y, px);
        }
    }
}

/// Draws `src` through `map` onto `dst`, later writes winning.
///
/// Each destination pixel samples its inverse-mapped source pixel (nearest neighbour),
/// so rotated regions come out without holes. Returns how many opaque source pixels
/// landed outside `dst`.
pub fn composite_affine(dst: &mut RasterBuffer, src: &RasterBuffer, map: &Affine) -> usize {
    let mut written = 0usize;
    for (x, y) in dst.coords() {
        let s = map.apply_inverse(Point::new(f64::from(x), f64::from(y)));
        if let Some(px) = src.opaque(s.x.round() as i64, s.y.round() as i64) {
            dst.put(i64::from(x), i64::from(y), px);
            written += 1;
        }
    }

    let dropped = src
        .coords()
        .filter(|&(x, y)| src.opaque(i64::from(x), i64::from(y)).is_some())
        .filter(|&(x, y)| {
            let d = map.apply(Point::new(f64::from(x), f64::from(y)));
            !dst.in_bounds(d.x.round() as i64, d.y.round() as i64)
        })
        .count();

    tracing::debug!(written, dropped, rotation = map.rotation(), "affine composite");
    dropped
}

/// Moves each column of `src` vertically by `shift(x)` rows onto `dst`.
///
/// Returns how many opaque pixels fell off the top or bottom.
pub fn composite_column_shift(dst: &mut RasterBuffer, src: &RasterBuffer, shift: impl Fn(f64) -> i64) -> usize {
    let mut dropped = 0usize;
    for x in 0..src.width() {
        let dy = shift(f64::from(x));
        let xi = i64::from(x);
        for y in 0..src.height() {
            let Some(px) = src.opaque(xi, i64::from(y)) else {
                continue;
            };
            if !dst.put(xi, i64::from(y) + dy, px) {
                dropped += 1;
            }
        }
    }
    tracing::debug!(dropped, "column shift composite");
    dropped
}
