//! Brush-editing engine for terrain surfaces.
//!
//! Paints, sculpts, and blends raster surfaces (height fields and
//! per-texture masks) through parameterized brushes, recording every edit
//! as a reversible region operation under a bounded undo-memory budget.
//!
//! The typical flow: a drag gesture hands pixel samples to a
//! [`stroke::StrokeSession`], the active [`brush::Brush`] mutates the
//! [`surface::Surface`] inside a clipped footprint, and each edit's
//! before-image lands in the [`ledger::OperationLedger`] as a
//! [`region_op::RegionOp`] that the surrounding transaction log can toggle.

pub mod bound;
pub mod brush;
pub mod error;
pub mod kernel;
pub mod ledger;
pub mod noise_field;
pub mod provider;
pub mod region_op;
pub mod stroke;
pub mod surface;

pub use bound::Bound2D;
pub use brush::{
    Brush, BrushKind, FlattenParams, NoiseParams, PaintMode, PaintParams, SculptDirection,
    SculptParams,
};
pub use error::EditError;
pub use kernel::BrushKernel;
pub use ledger::{OpHandle, OperationLedger};
pub use noise_field::NoiseField;
pub use provider::SurfaceProvider;
pub use region_op::RegionOp;
pub use stroke::{StrokePhase, StrokeSession};
pub use surface::{PixelBuf, PixelFormat, Surface};
