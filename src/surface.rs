//! Raster surfaces edited by brushes.
//!
//! A [`Surface`] is a rectangular, row-major buffer of single-channel
//! pixels: 32-bit float for height fields, 8-bit unsigned normalized for
//! texture masks. Storage is tagged by format so the two can never
//! disagree, and every accessor is bounds-checked — out-of-range reads and
//! writes are rejected, never wrapped.

use crate::bound::Bound2D;
use crate::error::EditError;

/// Pixel format of a surface, one channel per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32-bit float, used by height fields.
    Float32,
    /// 8-bit unsigned normalized (0-255), used by texture masks.
    UNorm8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Float32 => 4,
            PixelFormat::UNorm8 => 1,
        }
    }
}

/// Typed pixel storage. The variant is the format.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelBuf {
    F32(Vec<f32>),
    U8(Vec<u8>),
}

impl PixelBuf {
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelBuf::F32(_) => PixelFormat::Float32,
            PixelBuf::U8(_) => PixelFormat::UNorm8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelBuf::F32(data) => data.len(),
            PixelBuf::U8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.format().bytes_per_pixel()
    }
}

/// A single-channel raster surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: PixelBuf,
}

impl Surface {
    /// Zero-filled Float32 height surface.
    pub fn new_height(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: PixelBuf::F32(vec![0.0; width as usize * height as usize]),
        }
    }

    /// Zero-filled UNorm8 mask surface.
    pub fn new_mask(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: PixelBuf::U8(vec![0; width as usize * height as usize]),
        }
    }

    /// Wrap an existing height buffer. Fails unless the buffer holds
    /// exactly `width * height` samples.
    pub fn from_f32(width: u32, height: u32, data: Vec<f32>) -> Result<Self, EditError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(EditError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: PixelBuf::F32(data),
        })
    }

    /// Wrap an existing mask buffer. Fails unless the buffer holds
    /// exactly `width * height` samples.
    pub fn from_u8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EditError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(EditError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: PixelBuf::U8(data),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.data.format()
    }

    /// Full-surface bound `[0, width) x [0, height)`.
    pub fn bounds(&self) -> Bound2D {
        Bound2D::new(0, 0, self.width as i32, self.height as i32)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read a height sample. `None` out of bounds or on a mask surface.
    pub fn get_f32(&self, x: i32, y: i32) -> Option<f32> {
        let index = self.index(x, y)?;
        match &self.data {
            PixelBuf::F32(data) => Some(data[index]),
            PixelBuf::U8(_) => None,
        }
    }

    /// Write a height sample. Out-of-bounds or wrong-format writes do
    /// nothing and return false.
    pub fn set_f32(&mut self, x: i32, y: i32, value: f32) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        match &mut self.data {
            PixelBuf::F32(data) => {
                data[index] = value;
                true
            }
            PixelBuf::U8(_) => false,
        }
    }

    /// Read a mask sample. `None` out of bounds or on a height surface.
    pub fn get_u8(&self, x: i32, y: i32) -> Option<u8> {
        let index = self.index(x, y)?;
        match &self.data {
            PixelBuf::U8(data) => Some(data[index]),
            PixelBuf::F32(_) => None,
        }
    }

    /// Write a mask sample. Out-of-bounds or wrong-format writes do
    /// nothing and return false.
    pub fn set_u8(&mut self, x: i32, y: i32, value: u8) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        match &mut self.data {
            PixelBuf::U8(data) => {
                data[index] = value;
                true
            }
            PixelBuf::F32(_) => false,
        }
    }

    /// Float32 view of the whole buffer, row-major. `None` for masks.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            PixelBuf::F32(data) => Some(data),
            PixelBuf::U8(_) => None,
        }
    }

    pub fn as_f32_mut(&mut self) -> Option<&mut [f32]> {
        match &mut self.data {
            PixelBuf::F32(data) => Some(data),
            PixelBuf::U8(_) => None,
        }
    }

    /// UNorm8 view of the whole buffer, row-major. `None` for heights.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            PixelBuf::U8(data) => Some(data),
            PixelBuf::F32(_) => None,
        }
    }

    pub fn as_u8_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.data {
            PixelBuf::U8(data) => Some(data),
            PixelBuf::F32(_) => None,
        }
    }

    /// Copy the pixels inside `bound` (clipped to the surface) into a new
    /// buffer of the same format, row-major within the bound.
    pub fn copy_region(&self, bound: Bound2D) -> PixelBuf {
        let bound = bound.clip_to(self.width, self.height);
        let row_len = bound.width() as usize;
        let width = self.width as usize;
        match &self.data {
            PixelBuf::F32(data) => {
                let mut out = Vec::with_capacity(bound.area());
                for y in bound.y1..bound.y2 {
                    let start = y as usize * width + bound.x1 as usize;
                    out.extend_from_slice(&data[start..start + row_len]);
                }
                PixelBuf::F32(out)
            }
            PixelBuf::U8(data) => {
                let mut out = Vec::with_capacity(bound.area());
                for y in bound.y1..bound.y2 {
                    let start = y as usize * width + bound.x1 as usize;
                    out.extend_from_slice(&data[start..start + row_len]);
                }
                PixelBuf::U8(out)
            }
        }
    }

    /// Swap the pixels inside `bound` with `buf`, row by row. The swap is
    /// its own inverse, which is what makes region snapshots toggleable.
    ///
    /// Rejected (returns false, touches nothing) when the bound does not
    /// lie fully inside the surface, the formats differ, or the buffer
    /// length does not match the bound area.
    pub fn swap_region(&mut self, bound: Bound2D, buf: &mut PixelBuf) -> bool {
        if !bound.is_valid() || bound.intersect(self.bounds()) != bound {
            return false;
        }
        if buf.len() != bound.area() {
            return false;
        }
        let row_len = bound.width() as usize;
        let width = self.width as usize;
        match (&mut self.data, buf) {
            (PixelBuf::F32(data), PixelBuf::F32(snap)) => {
                for (row, y) in (bound.y1..bound.y2).enumerate() {
                    let start = y as usize * width + bound.x1 as usize;
                    data[start..start + row_len]
                        .swap_with_slice(&mut snap[row * row_len..(row + 1) * row_len]);
                }
                true
            }
            (PixelBuf::U8(data), PixelBuf::U8(snap)) => {
                for (row, y) in (bound.y1..bound.y2).enumerate() {
                    let start = y as usize * width + bound.x1 as usize;
                    data[start..start + row_len]
                        .swap_with_slice(&mut snap[row * row_len..(row + 1) * row_len]);
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surfaces_zeroed() {
        let h = Surface::new_height(4, 3);
        assert_eq!(h.pixel_format(), PixelFormat::Float32);
        assert_eq!(h.get_f32(3, 2), Some(0.0));

        let m = Surface::new_mask(4, 3);
        assert_eq!(m.pixel_format(), PixelFormat::UNorm8);
        assert_eq!(m.get_u8(0, 0), Some(0));
    }

    #[test]
    fn test_from_buffer_validates_length() {
        assert!(Surface::from_f32(4, 4, vec![0.0; 16]).is_ok());
        let err = Surface::from_f32(4, 4, vec![0.0; 15]).unwrap_err();
        assert_eq!(
            err,
            EditError::BufferSizeMismatch {
                width: 4,
                height: 4,
                expected: 16,
                actual: 15,
            }
        );
        assert!(Surface::from_u8(2, 2, vec![0; 5]).is_err());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut s = Surface::new_height(4, 4);
        assert_eq!(s.get_f32(4, 0), None);
        assert_eq!(s.get_f32(-1, 0), None);
        assert_eq!(s.get_f32(0, 4), None);
        assert!(!s.set_f32(0, -1, 1.0));
        // No silent wrap: neighbors unaffected
        assert_eq!(s.get_f32(3, 3), Some(0.0));
    }

    #[test]
    fn test_format_mismatch_rejected() {
        let mut s = Surface::new_mask(4, 4);
        assert_eq!(s.get_f32(0, 0), None);
        assert!(!s.set_f32(0, 0, 1.0));
        assert!(s.as_f32().is_none());
        assert!(s.as_u8().is_some());
    }

    #[test]
    fn test_row_major_addressing() {
        let mut s = Surface::new_height(3, 2);
        s.set_f32(2, 1, 7.0);
        let data = s.as_f32().unwrap();
        assert_eq!(data[5], 7.0);
    }

    #[test]
    fn test_copy_region() {
        let mut s = Surface::new_mask(4, 4);
        s.set_u8(1, 1, 10);
        s.set_u8(2, 1, 20);
        s.set_u8(1, 2, 30);
        let region = s.copy_region(Bound2D::new(1, 1, 3, 3));
        assert_eq!(region, PixelBuf::U8(vec![10, 20, 30, 0]));
    }

    #[test]
    fn test_swap_region_is_own_inverse() {
        let mut s = Surface::new_height(4, 4);
        s.set_f32(1, 1, 1.5);
        s.set_f32(2, 2, -2.5);
        let bound = Bound2D::new(1, 1, 3, 3);
        let original = s.clone();
        let mut snap = s.copy_region(bound);

        // Mutate the live region, then toggle twice
        s.set_f32(1, 1, 9.0);
        s.set_f32(2, 2, 9.0);
        let after_edit = s.clone();

        assert!(s.swap_region(bound, &mut snap));
        assert_eq!(s.get_f32(1, 1), Some(1.5));
        assert_eq!(s.get_f32(2, 2), Some(-2.5));
        assert_eq!(s, original);

        assert!(s.swap_region(bound, &mut snap));
        assert_eq!(s, after_edit);
    }

    #[test]
    fn test_swap_region_rejects_mismatches() {
        let mut s = Surface::new_height(4, 4);
        let bound = Bound2D::new(0, 0, 2, 2);

        let mut wrong_format = PixelBuf::U8(vec![0; 4]);
        assert!(!s.swap_region(bound, &mut wrong_format));

        let mut wrong_len = PixelBuf::F32(vec![0.0; 3]);
        assert!(!s.swap_region(bound, &mut wrong_len));

        let mut ok = PixelBuf::F32(vec![0.0; 4]);
        assert!(!s.swap_region(Bound2D::new(3, 3, 5, 5), &mut ok));
        assert!(!s.swap_region(Bound2D::new(2, 2, 2, 2), &mut ok));
        assert!(s.swap_region(bound, &mut ok));
    }
}
