use thiserror::Error;

use crate::surface::PixelFormat;

/// Errors surfaced by the brush engine.
///
/// Everything else in the engine (empty clipped bounds, toggling a freed
/// undo record, degenerate falloff ranges) is defined as a no-op or a
/// clamped limiting behavior rather than an error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    /// A surface was constructed from a buffer whose length does not match
    /// `width * height` elements.
    #[error("buffer holds {actual} elements, a {width}x{height} surface needs {expected}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A brush was applied to a surface of the wrong pixel format.
    /// Callers are expected to check `Brush::can_apply_to` first.
    #[error("brush expects a {expected:?} surface, got {actual:?}")]
    FormatMismatch {
        expected: PixelFormat,
        actual: PixelFormat,
    },
}
