//! Brush variants for painting and sculpting surfaces.
//!
//! Five behaviors over a shared falloff kernel:
//! - Paint/Erase: raise or cut mask coverage, optionally gated by the
//!   height and slope of a companion height field
//! - Smooth: blend each height sample toward its 3x3 weighted average
//! - Flatten: pull heights toward a fixed target
//! - Raise/Lower: additive sculpting
//! - Noise deposit: add coherent noise scaled by the kernel
//!
//! The variants form a closed set, so they are a tagged enum dispatched
//! through a single `apply` rather than a trait hierarchy.

use crate::bound::Bound2D;
use crate::error::EditError;
use crate::kernel::BrushKernel;
use crate::noise_field::NoiseField;
use crate::region_op::RegionOp;
use crate::surface::{PixelFormat, Surface};

/// Smallest admissible noise amplitude and gradient spacing.
const MIN_SCALE: f32 = 1e-4;

/// Whether a paint stroke adds or removes mask coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PaintMode {
    #[default]
    Paint,
    Erase,
}

/// Whether a sculpt stroke raises or lowers terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SculptDirection {
    #[default]
    Raise,
    Lower,
}

/// Parameters for the mask paint/erase brush.
#[derive(Clone, Copy, Debug)]
pub struct PaintParams {
    pub mode: PaintMode,
    /// Target coverage in [0, 1]; painting never pushes a pixel past
    /// `strength * 255`, and never lowers a pixel already above it.
    pub strength: f32,
    /// Height gate: mask pixels whose companion height lies outside
    /// `[min_height, max_height]` are left unmodified (paint mode only).
    pub min_height: f32,
    pub max_height: f32,
    /// Slope gate in degrees, measured from the companion height field.
    pub min_slope_deg: f32,
    pub max_slope_deg: f32,
    /// World units per height-map pixel; feeds the slope gradient.
    pub cell_size: f32,
}

impl Default for PaintParams {
    fn default() -> Self {
        Self {
            mode: PaintMode::Paint,
            strength: 1.0,
            min_height: f32::NEG_INFINITY,
            max_height: f32::INFINITY,
            min_slope_deg: 0.0,
            max_slope_deg: 90.0,
            cell_size: 1.0,
        }
    }
}

/// Parameters for the flatten brush.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlattenParams {
    pub target_height: f32,
}

/// Parameters for the raise/lower brush.
#[derive(Clone, Copy, Debug)]
pub struct SculptParams {
    pub direction: SculptDirection,
    pub height_delta: f32,
}

impl Default for SculptParams {
    fn default() -> Self {
        Self {
            direction: SculptDirection::Raise,
            height_delta: 1.0,
        }
    }
}

/// Parameters for the noise-deposit brush.
#[derive(Clone, Copy, Debug)]
pub struct NoiseParams {
    pub seed: u32,
    pub octaves: usize,
    pub persistence: f32,
    pub num_features: u32,
    /// Amplitude of the deposited noise, clamped above a minimal epsilon.
    pub feature_scale: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            persistence: 0.5,
            num_features: 8,
            feature_scale: 1.0,
        }
    }
}

/// The closed set of brush behaviors.
#[derive(Clone, Debug)]
pub enum BrushKind {
    Paint(PaintParams),
    Smooth,
    Flatten(FlattenParams),
    RaiseLower(SculptParams),
    NoiseDeposit(NoiseParams),
}

/// A parameterized brush: radius, falloff, and one behavior.
///
/// The kernel (and, for the noise brush, the kernel-sized noise lattice)
/// is derived state, rebuilt by every setter so it can never go stale.
#[derive(Clone, Debug)]
pub struct Brush {
    radius: i32,
    falloff: f32,
    kernel: BrushKernel,
    kind: BrushKind,
    /// Kernel-sized noise samples; empty for every kind but NoiseDeposit.
    lattice: Vec<f32>,
}

impl Brush {
    /// Radius is clamped to >= 1, falloff to [0, 1].
    pub fn new(kind: BrushKind, radius: i32, falloff: f32) -> Self {
        let mut brush = Self {
            radius: radius.max(1),
            falloff: falloff.clamp(0.0, 1.0),
            kernel: BrushKernel::compute(radius, falloff),
            kind,
            lattice: Vec::new(),
        };
        brush.rebuild_derived();
        brush
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    pub fn kind(&self) -> &BrushKind {
        &self.kind
    }

    pub fn kernel(&self) -> &BrushKernel {
        &self.kernel
    }

    pub fn set_radius(&mut self, radius: i32) {
        self.radius = radius.max(1);
        self.rebuild_derived();
    }

    pub fn set_falloff(&mut self, falloff: f32) {
        self.falloff = falloff.clamp(0.0, 1.0);
        self.rebuild_derived();
    }

    pub fn set_kind(&mut self, kind: BrushKind) {
        self.kind = kind;
        self.rebuild_derived();
    }

    fn rebuild_derived(&mut self) {
        self.kernel = BrushKernel::compute(self.radius, self.falloff);
        self.lattice = match &self.kind {
            BrushKind::NoiseDeposit(p) => {
                NoiseField::new(p.seed, p.octaves, p.persistence, p.num_features)
                    .fill_lattice(self.kernel.size())
            }
            _ => Vec::new(),
        };
    }

    /// Pixel format this brush's algorithm operates on.
    pub fn expected_format(&self) -> PixelFormat {
        match self.kind {
            BrushKind::Paint(_) => PixelFormat::UNorm8,
            _ => PixelFormat::Float32,
        }
    }

    /// Type/format compatibility check; call before `apply`.
    pub fn can_apply_to(&self, target: &Surface) -> bool {
        target.pixel_format() == self.expected_format()
    }

    /// Apply the brush at pixel `(px, py)` of `target`.
    ///
    /// `heightfield` is the explicit companion height surface consulted by
    /// the paint brush's height/slope gates; other kinds ignore it.
    ///
    /// Returns the undo record for the clipped footprint, `Ok(None)` when
    /// the footprint misses the surface entirely or no pixel changed, and
    /// `Err` when the surface format violates the brush contract.
    pub fn apply(
        &self,
        target: &mut Surface,
        heightfield: Option<&Surface>,
        px: i32,
        py: i32,
    ) -> Result<Option<RegionOp>, EditError> {
        if !self.can_apply_to(target) {
            return Err(EditError::FormatMismatch {
                expected: self.expected_format(),
                actual: target.pixel_format(),
            });
        }
        if let (BrushKind::Paint(_), Some(height)) = (&self.kind, heightfield) {
            if height.pixel_format() != PixelFormat::Float32 {
                return Err(EditError::FormatMismatch {
                    expected: PixelFormat::Float32,
                    actual: height.pixel_format(),
                });
            }
        }

        let bound = Bound2D::around(px, py, self.radius).clip_to(target.width(), target.height());
        if !bound.is_valid() {
            return Ok(None);
        }

        // Capture the before-image first; the surface then holds the after.
        let op = RegionOp::capture(target, bound);
        let changed = match &self.kind {
            BrushKind::Paint(params) => {
                self.apply_paint(target, heightfield, params, bound, px, py)
            }
            BrushKind::Smooth => self.apply_smooth(target, bound, px, py),
            BrushKind::Flatten(params) => self.apply_flatten(target, params, bound, px, py),
            BrushKind::RaiseLower(params) => self.apply_sculpt(target, params, bound, px, py),
            BrushKind::NoiseDeposit(params) => self.apply_noise(target, params, bound, px, py),
        };

        if changed {
            log::trace!(
                "brush applied at ({px},{py}), bound ({},{})-({},{})",
                bound.x1,
                bound.y1,
                bound.x2,
                bound.y2
            );
            Ok(Some(op))
        } else {
            Ok(None)
        }
    }

    fn apply_paint(
        &self,
        target: &mut Surface,
        heightfield: Option<&Surface>,
        params: &PaintParams,
        bound: Bound2D,
        px: i32,
        py: i32,
    ) -> bool {
        let gate = heightfield.and_then(|h| SlopeHeightGate::new(h, target, params.cell_size));
        let width = target.width() as usize;
        let Some(data) = target.as_u8_mut() else {
            return false;
        };

        let pixel_strength = params.strength.clamp(0.0, 1.0) * 255.0;
        let mut changed = false;
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let weight = self.kernel.weight_at_offset(x - px, y - py);
                if weight <= 0.0 {
                    continue;
                }
                let index = y as usize * width + x as usize;
                let existing = data[index] as f32;
                let value = match params.mode {
                    PaintMode::Paint => {
                        if let Some(gate) = &gate {
                            if !gate.allows(x, y, params) {
                                continue;
                            }
                        }
                        // A pixel at or above the target strength is never
                        // lowered by paint; erase is the only way down.
                        if existing >= pixel_strength {
                            continue;
                        }
                        (existing + weight * 255.0).min(pixel_strength)
                    }
                    PaintMode::Erase => (existing - weight * 255.0).max(0.0),
                };
                let value = value.round().clamp(0.0, 255.0) as u8;
                if value != data[index] {
                    data[index] = value;
                    changed = true;
                }
            }
        }
        changed
    }

    fn apply_smooth(&self, target: &mut Surface, bound: Bound2D, px: i32, py: i32) -> bool {
        const TAPS: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
        let width = target.width() as usize;
        let max_x = target.width() as i32 - 1;
        let max_y = target.height() as i32 - 1;
        let Some(data) = target.as_f32_mut() else {
            return false;
        };

        // Smoothing is a simultaneous update: buffer the whole smoothed
        // plane before writing, so no pixel reads an already-modified
        // neighbor.
        let mut plane = Vec::with_capacity(bound.area());
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let mut sum = 0.0;
                for (j, row) in TAPS.iter().enumerate() {
                    for (i, tap) in row.iter().enumerate() {
                        let sx = (x + i as i32 - 1).clamp(0, max_x);
                        let sy = (y + j as i32 - 1).clamp(0, max_y);
                        sum += data[sy as usize * width + sx as usize] * tap;
                    }
                }
                plane.push(sum / 16.0);
            }
        }

        let mut changed = false;
        let mut cursor = 0;
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let smoothed = plane[cursor];
                cursor += 1;
                let weight = self.kernel.weight_at_offset(x - px, y - py);
                if weight <= 0.0 {
                    continue;
                }
                let index = y as usize * width + x as usize;
                let existing = data[index];
                let value = existing + (smoothed - existing) * weight;
                if value != existing {
                    data[index] = value;
                    changed = true;
                }
            }
        }
        changed
    }

    fn apply_flatten(
        &self,
        target: &mut Surface,
        params: &FlattenParams,
        bound: Bound2D,
        px: i32,
        py: i32,
    ) -> bool {
        let width = target.width() as usize;
        let Some(data) = target.as_f32_mut() else {
            return false;
        };

        let mut changed = false;
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let weight = self.kernel.weight_at_offset(x - px, y - py);
                if weight <= 0.0 {
                    continue;
                }
                let index = y as usize * width + x as usize;
                let existing = data[index];
                let value = existing + (params.target_height - existing) * weight;
                if value != existing {
                    data[index] = value;
                    changed = true;
                }
            }
        }
        changed
    }

    fn apply_sculpt(
        &self,
        target: &mut Surface,
        params: &SculptParams,
        bound: Bound2D,
        px: i32,
        py: i32,
    ) -> bool {
        let delta = match params.direction {
            SculptDirection::Raise => params.height_delta,
            SculptDirection::Lower => -params.height_delta,
        };
        let width = target.width() as usize;
        let Some(data) = target.as_f32_mut() else {
            return false;
        };

        let mut changed = false;
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let weight = self.kernel.weight_at_offset(x - px, y - py);
                if weight <= 0.0 {
                    continue;
                }
                let index = y as usize * width + x as usize;
                let existing = data[index];
                let value = existing + weight * delta;
                if value != existing {
                    data[index] = value;
                    changed = true;
                }
            }
        }
        changed
    }

    fn apply_noise(
        &self,
        target: &mut Surface,
        params: &NoiseParams,
        bound: Bound2D,
        px: i32,
        py: i32,
    ) -> bool {
        let scale = params.feature_scale.max(MIN_SCALE);
        let size = self.kernel.size();
        let width = target.width() as usize;
        let Some(data) = target.as_f32_mut() else {
            return false;
        };

        let mut changed = false;
        for y in bound.y1..bound.y2 {
            for x in bound.x1..bound.x2 {
                let weight = self.kernel.weight_at_offset(x - px, y - py);
                if weight <= 0.0 {
                    continue;
                }
                let kx = (x - px + self.radius) as usize;
                let ky = (y - py + self.radius) as usize;
                let index = y as usize * width + x as usize;
                let existing = data[index];
                let value = existing + weight * self.lattice[ky * size + kx] * scale;
                if value != existing {
                    data[index] = value;
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Height/slope gate over a companion height field, with the mask-to-height
/// resolution mapping baked in.
struct SlopeHeightGate<'a> {
    data: &'a [f32],
    width: i32,
    height: i32,
    ratio_x: f32,
    ratio_y: f32,
    inv_spacing: f32,
}

impl<'a> SlopeHeightGate<'a> {
    fn new(heightfield: &'a Surface, mask: &Surface, cell_size: f32) -> Option<Self> {
        let data = heightfield.as_f32()?;
        Some(Self {
            data,
            width: heightfield.width() as i32,
            height: heightfield.height() as i32,
            ratio_x: heightfield.width() as f32 / mask.width().max(1) as f32,
            ratio_y: heightfield.height() as f32 / mask.height().max(1) as f32,
            inv_spacing: 1.0 / (2.0 * cell_size.max(MIN_SCALE)),
        })
    }

    fn height_at(&self, hx: i32, hy: i32) -> f32 {
        let x = hx.clamp(0, self.width - 1) as usize;
        let y = hy.clamp(0, self.height - 1) as usize;
        self.data[y * self.width as usize + x]
    }

    /// True when the mask pixel `(x, y)` may be painted.
    fn allows(&self, x: i32, y: i32, params: &PaintParams) -> bool {
        let hx = (x as f32 * self.ratio_x).round() as i32;
        let hy = (y as f32 * self.ratio_y).round() as i32;

        let height = self.height_at(hx, hy);
        if height < params.min_height || height > params.max_height {
            return false;
        }

        let dx = (self.height_at(hx + 1, hy) - self.height_at(hx - 1, hy)) * self.inv_spacing;
        let dy = (self.height_at(hx, hy + 1) - self.height_at(hx, hy - 1)) * self.inv_spacing;
        let slope_deg = (dx * dx + dy * dy).sqrt().atan().to_degrees();
        slope_deg >= params.min_slope_deg && slope_deg <= params.max_slope_deg
    }
}
