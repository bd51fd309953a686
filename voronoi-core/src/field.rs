use crate::palette::{BACKGROUND, Rgba};
use crate::seed::SeedSet;
use crate::types::SeedId;
use glam::Vec2;
use rayon::prelude::*;

/// A dense RGBA buffer mapping each of its pixels to a point of the domain.
///
/// The buffer may be smaller than the domain: pixel `(x, y)` samples the
/// domain point `(x * domain.x / width, y * domain.y / height)`, so a 1:1
/// buffer samples integer domain coordinates directly. Rows are stored
/// top-down, matching the domain's y-down orientation.
#[derive(Clone, Debug)]
pub struct ColorField {
    width: usize,
    height: usize,
    domain: Vec2,
    pixels: Vec<Rgba>,
}

impl ColorField {
    pub fn new(width: usize, height: usize, domain: Vec2) -> Self {
        Self {
            width,
            height,
            domain,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn domain(&self) -> Vec2 {
        self.domain
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        self.pixels[y * self.width + x] = color;
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Domain point sampled by pixel `(x, y)`.
    #[inline]
    pub fn sample_point(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            x as f32 * self.domain.x / self.width as f32,
            y as f32 * self.domain.y / self.height as f32,
        )
    }

    /// Replaces the whole buffer with `other`'s contents.
    ///
    /// ### Panics
    /// Panics if the two buffers have different dimensions.
    pub fn copy_from(&mut self, other: &ColorField) {
        assert_eq!(self.width, other.width);
        assert_eq!(self.height, other.height);
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// Tightly packed RGBA bytes, row-major from the top row, for texture
    /// upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        bytes
    }
}

/// Returns the index of the seed nearest to `p`, or `None` for an empty
/// set.
///
/// Ties break toward the lower index: the scan keeps the first seed
/// achieving the minimum squared distance (strict `<` comparison).
pub fn nearest_seed(p: Vec2, seeds: &SeedSet) -> Option<SeedId> {
    let mut best = None;
    let mut best_d2 = f32::MAX;
    for (id, seed) in seeds.iter().enumerate() {
        let d2 = (seed.position - p).length_squared();
        if d2 < best_d2 {
            best_d2 = d2;
            best = Some(id);
        }
    }
    best
}

/// A strategy for computing the per-pixel nearest-seed color field.
///
/// Implementations must agree on region assignment — for every pixel the
/// winner is the lowest seed index minimizing squared distance — and never
/// mutate seed state.
pub trait FieldEvaluator {
    fn evaluate(&self, seeds: &SeedSet, field: &mut ColorField);

    /// Short human-readable strategy name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Reference strategy: a scalar scan over `(y, x, seed)`.
///
/// This is the test oracle the other strategies are checked against.
pub struct ScalarEvaluator;

impl FieldEvaluator for ScalarEvaluator {
    fn evaluate(&self, seeds: &SeedSet, field: &mut ColorField) {
        for y in 0..field.height() {
            for x in 0..field.width() {
                let p = field.sample_point(x, y);
                let mut best_d2 = f32::MAX;
                let mut color = BACKGROUND;
                for seed in seeds.iter() {
                    let d2 = (seed.position - p).length_squared();
                    if d2 < best_d2 {
                        best_d2 = d2;
                        color = seed.color;
                    }
                }
                field.set_pixel(x, y, color);
            }
        }
    }

    fn name(&self) -> &'static str {
        "scalar"
    }
}

/// Row-parallel strategy: the same nearest-seed rule with one rayon task
/// per output row.
///
/// Workers only read seed state and write disjoint row slices; the
/// parallel iterator joins before returning, so the field is complete when
/// `evaluate` yields control back to the tick loop.
pub struct ParallelEvaluator;

impl FieldEvaluator for ParallelEvaluator {
    fn evaluate(&self, seeds: &SeedSet, field: &mut ColorField) {
        let width = field.width();
        let sx = field.domain().x / width as f32;
        let sy = field.domain().y / field.height() as f32;
        let seeds = seeds.as_slice();

        field
            .pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f32 * sy;
                for (x, out) in row.iter_mut().enumerate() {
                    let p = Vec2::new(x as f32 * sx, py);
                    let mut best_d2 = f32::MAX;
                    let mut color = BACKGROUND;
                    for seed in seeds {
                        let d2 = (seed.position - p).length_squared();
                        if d2 < best_d2 {
                            best_d2 = d2;
                            color = seed.color;
                        }
                    }
                    *out = color;
                }
            });
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn nearest_seed_breaks_ties_toward_the_lower_index() {
        // Both seeds are exactly 2 units from the probe point.
        let seeds = SeedSet::from_positions(
            vec![Vec2::new(2.0, 4.0), Vec2::new(6.0, 4.0)],
            10,
        );

        assert_eq!(nearest_seed(Vec2::new(4.0, 4.0), &seeds), Some(0));
    }

    #[test]
    fn nearest_seed_returns_none_for_an_empty_set() {
        let seeds = SeedSet::from_positions(Vec::new(), 10);
        assert_eq!(nearest_seed(Vec2::new(1.0, 1.0), &seeds), None);
    }

    #[test]
    fn sample_point_is_identity_at_full_resolution() {
        let field = ColorField::new(800, 600, Vec2::new(800.0, 600.0));
        assert_eq!(field.sample_point(0, 0), Vec2::ZERO);
        assert_eq!(field.sample_point(799, 599), Vec2::new(799.0, 599.0));
    }

    #[test]
    fn sample_point_scales_reduced_buffers_back_to_the_domain() {
        let field = ColorField::new(400, 300, Vec2::new(800.0, 600.0));
        assert_eq!(field.sample_point(200, 150), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn scalar_field_matches_the_two_seed_reference_scenario() {
        // 800x600 domain, seed A at (100, 100), seed B at (700, 500),
        // zero velocity. Corner ownership and the exact midpoint tie are
        // fixed by the contract.
        let seeds = SeedSet::from_positions(
            vec![Vec2::new(100.0, 100.0), Vec2::new(700.0, 500.0)],
            10,
        );
        let mut field = ColorField::new(800, 600, Vec2::new(800.0, 600.0));

        ScalarEvaluator.evaluate(&seeds, &mut field);

        let a = PALETTE[0];
        let b = PALETTE[1];
        assert_eq!(field.pixel(0, 0), a);
        assert_eq!(field.pixel(799, 599), b);
        // (400, 300) is equidistant from both; the lower index wins.
        assert_eq!(field.pixel(400, 300), a);
    }

    #[test]
    fn parallel_field_matches_the_two_seed_reference_scenario() {
        let seeds = SeedSet::from_positions(
            vec![Vec2::new(100.0, 100.0), Vec2::new(700.0, 500.0)],
            10,
        );
        let mut field = ColorField::new(800, 600, Vec2::new(800.0, 600.0));

        ParallelEvaluator.evaluate(&seeds, &mut field);

        assert_eq!(field.pixel(0, 0), PALETTE[0]);
        assert_eq!(field.pixel(799, 599), PALETTE[1]);
        assert_eq!(field.pixel(400, 300), PALETTE[0]);
    }

    #[test]
    fn scalar_and_parallel_strategies_agree_on_every_pixel() {
        let mut rng = StdRng::seed_from_u64(0xBEEF);
        let domain = Vec2::new(160.0, 120.0);
        let positions = (0..7)
            .map(|_| {
                Vec2::new(
                    rng.random_range(0.0..domain.x),
                    rng.random_range(0.0..domain.y),
                )
            })
            .collect();
        let seeds = SeedSet::from_positions(positions, 10);

        let mut scalar = ColorField::new(160, 120, domain);
        let mut parallel = ColorField::new(160, 120, domain);
        ScalarEvaluator.evaluate(&seeds, &mut scalar);
        ParallelEvaluator.evaluate(&seeds, &mut parallel);

        assert_eq!(scalar.pixels(), parallel.pixels());
    }

    #[test]
    fn evaluation_leaves_seed_state_untouched() {
        let positions = vec![Vec2::new(10.0, 10.0), Vec2::new(50.0, 40.0)];
        let seeds = SeedSet::from_positions(positions.clone(), 10);
        let mut field = ColorField::new(64, 48, Vec2::new(64.0, 48.0));

        ScalarEvaluator.evaluate(&seeds, &mut field);
        ParallelEvaluator.evaluate(&seeds, &mut field);

        let after: Vec<Vec2> = seeds.iter().map(|s| s.position).collect();
        assert_eq!(after, positions);
    }

    #[test]
    fn to_rgba8_packs_pixels_in_row_major_order() {
        let mut field = ColorField::new(2, 1, Vec2::new(2.0, 1.0));
        field.set_pixel(0, 0, Rgba::opaque(1, 2, 3));
        field.set_pixel(1, 0, Rgba::new(4, 5, 6, 7));

        assert_eq!(field.to_rgba8(), vec![1, 2, 3, 255, 4, 5, 6, 7]);
    }
}
