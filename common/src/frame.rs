/// Bytes per RGBA sample.
pub const CHANNELS: usize = 4;

/// A rectangular grid of RGBA samples, row-major, one byte per channel.
///
/// Invariant: `data.len() == width * height * 4`. Filters never mutate a
/// source buffer; they allocate a fresh one of identical dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// A buffer where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes, checking the length invariant.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                got: data.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte offset of pixel (x, y), or `None` outside the grid.
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Read pixel (x, y). Out-of-bounds reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Write pixel (x, y). Out-of-bounds writes are ignored and return `false`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + CHANNELS].copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    /// Iterate over pixels as 4-byte slices.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Build a new buffer by mapping each pixel's RGB through `f`.
    /// Alpha is copied from `self` unchanged.
    pub fn map_rgb<F>(&self, mut f: F) -> PixelBuffer
    where
        F: FnMut(u8, u8, u8) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(CHANNELS) {
            let [r, g, b] = f(px[0], px[1], px[2]);
            data.extend_from_slice(&[r, g, b, px[3]]);
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// A captured still frame: the immutable base buffer plus capture metadata.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub buffer: PixelBuffer,
    pub captured_at_ms: i64,
    /// Monotonic capture counter; later captures supersede earlier ones.
    pub seq: u64,
}

impl CapturedFrame {
    pub fn new(buffer: PixelBuffer, captured_at_ms: i64, seq: u64) -> Self {
        Self {
            buffer,
            captured_at_ms,
            seq,
        }
    }

    /// Human-readable capture label, e.g. "20260218T093000000Z_000007".
    pub fn label(&self) -> String {
        let dt = chrono::DateTime::from_timestamp_millis(self.captured_at_ms)
            .unwrap_or_else(chrono::Utc::now);
        format!(
            "{ts}_{seq:06}",
            ts = dt.format("%Y%m%dT%H%M%S%3fZ"),
            seq = self.seq
        )
    }
}

/// Axis-aligned rectangle in base-buffer pixel coordinates, as reported by a
/// region detector. Coordinates may be fractional, negative or exceed the
/// buffer; they are floored and clipped on use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Floor each coordinate, then clip to a `width` x `height` buffer.
    /// Returns `None` when nothing of the region lies inside the buffer or
    /// any coordinate is NaN or infinite.
    pub fn clip(&self, width: u32, height: u32) -> Option<Bounds> {
        if !self.is_finite() {
            return None;
        }
        let x = self.x.floor();
        let y = self.y.floor();
        let x_end = x + self.width.floor();
        let y_end = y + self.height.floor();

        let x0 = x.max(0.0);
        let y0 = y.max(0.0);
        let x1 = x_end.min(width as f64);
        let y1 = y_end.min(height as f64);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some(Bounds {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// Half-open integer pixel rectangle `[x0, x1) x [y0, y1)`, guaranteed
/// non-empty and inside the buffer it was clipped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 as i64 && x < self.x1 as i64 && y >= self.y0 as i64 && y < self.y1 as i64
    }
}

/// A region with the detector's confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub region: Region,
    pub confidence: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("pixel data length {got} does not match {width}x{height} RGBA (expected {expected})")]
    LengthMismatch {
        width: u32,
        height: u32,
        got: usize,
        expected: usize,
    },
    #[error("frame has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}
