//! Deterministic coherent noise for the noise-deposit brush.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Smallest admissible feature count; keeps the input domain scale finite.
const MIN_FEATURES: f64 = 1e-4;

/// Multi-octave coherent noise, deterministic in its construction
/// parameters: identical `(seed, octaves, persistence, num_features)`
/// always reproduce identical samples. Octave `i` contributes detail at
/// double the previous frequency with `persistence^i` amplitude.
pub struct NoiseField {
    fbm: Fbm<Perlin>,
}

impl NoiseField {
    pub fn new(seed: u32, octaves: usize, persistence: f32, num_features: u32) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(octaves.max(1))
            .set_frequency((num_features as f64).max(MIN_FEATURES))
            .set_lacunarity(2.0)
            .set_persistence(persistence as f64);

        Self { fbm }
    }

    /// Sample the field at `(u, v)`; feature count scales how many noise
    /// features span one unit of the input domain.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        self.fbm.get([u as f64, v as f64]) as f32
    }

    /// Sample a `size x size` grid over `[0,1]^2`, row-major. Used by the
    /// noise brush to regenerate its kernel-sized lattice.
    pub fn fill_lattice(&self, size: usize) -> Vec<f32> {
        let step = if size > 1 {
            1.0 / (size - 1) as f32
        } else {
            0.0
        };
        let mut lattice = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                lattice.push(self.sample(x as f32 * step, y as f32 * step));
            }
        }
        lattice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_parameters_identical_samples() {
        let a = NoiseField::new(1337, 4, 0.5, 8);
        let b = NoiseField::new(1337, 4, 0.5, 8);
        for y in 0..16 {
            for x in 0..16 {
                let u = x as f32 * 0.137;
                let v = y as f32 * 0.291;
                assert_eq!(a.sample(u, v), b.sample(u, v), "diverged at ({u},{v})");
            }
        }
    }

    #[test]
    fn test_seed_changes_output() {
        let a = NoiseField::new(1, 4, 0.5, 8);
        let b = NoiseField::new(2, 4, 0.5, 8);
        let differs = (0..64).any(|i| {
            let u = (i % 8) as f32 * 0.137;
            let v = (i / 8) as f32 * 0.291;
            a.sample(u, v) != b.sample(u, v)
        });
        assert!(differs, "different seeds produced identical fields");
    }

    #[test]
    fn test_octaves_add_detail() {
        // More octaves must change the field (higher-frequency layers)
        let base = NoiseField::new(7, 1, 0.5, 8);
        let detailed = NoiseField::new(7, 5, 0.5, 8);
        let differs = (0..64).any(|i| {
            let u = (i % 8) as f32 * 0.137;
            let v = (i / 8) as f32 * 0.291;
            base.sample(u, v) != detailed.sample(u, v)
        });
        assert!(differs);
    }

    #[test]
    fn test_samples_finite() {
        // Degenerate parameters must not produce NaN/Inf
        for field in [
            NoiseField::new(0, 0, 0.0, 0),
            NoiseField::new(42, 8, 1.0, 1),
            NoiseField::new(9, 3, 0.5, 1000),
        ] {
            for i in 0..25 {
                let u = (i % 5) as f32 / 5.0;
                let v = (i / 5) as f32 / 5.0;
                assert!(field.sample(u, v).is_finite());
            }
        }
    }

    #[test]
    fn test_lattice_matches_direct_samples() {
        let field = NoiseField::new(11, 3, 0.6, 4);
        let size = 5;
        let lattice = field.fill_lattice(size);
        assert_eq!(lattice.len(), size * size);
        let step = 1.0 / (size - 1) as f32;
        for y in 0..size {
            for x in 0..size {
                assert_eq!(
                    lattice[y * size + x],
                    field.sample(x as f32 * step, y as f32 * step)
                );
            }
        }
    }

    #[test]
    fn test_single_cell_lattice() {
        let field = NoiseField::new(3, 2, 0.5, 4);
        let lattice = field.fill_lattice(1);
        assert_eq!(lattice.len(), 1);
        assert_eq!(lattice[0], field.sample(0.0, 0.0));
    }
}
