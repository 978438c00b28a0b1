use spinekit_core::error::{Result, SpineError};

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Row-major RGBA pixels; alpha 0 means "no pixel".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(SpineError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Empty buffer with the same extents.
    pub fn blank_like(&self) -> Self {
        Self::new(self.width, self.height)
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some()
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Rgba> {
        let i = self.index(x, y)?;
        let mut px = TRANSPARENT;
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Writes one pixel; returns false when `(x, y)` is outside the buffer.
    pub fn put(&mut self, x: i64, y: i64, px: Rgba) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i..i + 4].copy_from_slice(&px);
                true
            }
            None => false,
        }
    }

    /// Opaque pixel at `(x, y)`, if any.
    pub fn opaque(&self, x: i64, y: i64) -> Option<Rgba> {
        self.get(x, y).filter(|px| px[3] > 0)
    }

    pub fn opaque_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    /// Every coordinate, row by row.
    pub fn coords(&self) -> impl Iterator<Item = (u32, u32)> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| (x, y)))
    }
}
