//! Radial falloff weight tables shared by every brush variant.

/// Precomputed square falloff table of side `2 * radius + 1`.
///
/// Weights blend a brush's effect from full strength at the center to zero
/// at the edge: 1.0 inside the inner radius `rad1 = radius * (1 - falloff)`,
/// 0.0 at or beyond `radius`, and a linear ramp in between. A zero ramp
/// range (falloff 0) degenerates to a hard-edged disk instead of dividing
/// by zero.
#[derive(Clone, Debug)]
pub struct BrushKernel {
    radius: i32,
    size: usize,
    weights: Vec<f32>,
}

impl BrushKernel {
    /// Build the weight table for the given radius and falloff.
    /// Radius is clamped to >= 1, falloff to [0, 1].
    pub fn compute(radius: i32, falloff: f32) -> Self {
        let radius = radius.max(1);
        let falloff = falloff.clamp(0.0, 1.0);
        let size = (2 * radius + 1) as usize;

        let rad2 = radius as f32;
        let rad1 = rad2 * (1.0 - falloff);
        let range = rad2 - rad1;
        let center = radius as f32;

        let mut weights = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dist = (dx * dx + dy * dy).sqrt();

                let weight = if dist < rad1 {
                    1.0
                } else if dist >= rad2 {
                    0.0
                } else if range > 0.0 {
                    ((rad2 - dist) / range).clamp(0.0, 1.0)
                } else {
                    // range == 0: hard-edged disk, dist < rad2 here
                    1.0
                };
                weights.push(weight);
            }
        }

        Self {
            radius,
            size,
            weights,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Side length of the square table, `2 * radius + 1`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight at table coordinates, zero outside the table.
    pub fn weight(&self, kx: i32, ky: i32) -> f32 {
        if kx < 0 || ky < 0 || kx >= self.size as i32 || ky >= self.size as i32 {
            return 0.0;
        }
        self.weights[ky as usize * self.size + kx as usize]
    }

    /// Weight at an offset from the kernel center, zero outside the table.
    pub fn weight_at_offset(&self, dx: i32, dy: i32) -> f32 {
        self.weight(dx + self.radius, dy + self.radius)
    }
}
