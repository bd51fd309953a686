use crate::config::Config;
use crate::palette::{PALETTE, Rgba};
use crate::types::SeedId;
use glam::Vec2;
use rand::Rng;

/// A moving point defining one region of the partition.
#[derive(Clone, Copy, Debug)]
pub struct Seed {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Rgba,
}

/// A bounded, append/truncate-only collection of seeds.
///
/// Slots are dense and index-addressed: spawning appends at the current
/// length, removal truncates the highest slot, and the palette color of a
/// slot is fixed when the slot is filled.
#[derive(Debug)]
pub struct SeedSet {
    seeds: Vec<Seed>,
    max: usize,
}

impl SeedSet {
    pub fn new(max: usize) -> Self {
        Self {
            seeds: Vec::with_capacity(max),
            max,
        }
    }

    /// Creates a set with `cfg.start_seeds` randomly placed seeds.
    pub fn with_start_count(cfg: &Config, rng: &mut impl Rng) -> Self {
        let mut set = Self::new(cfg.max_seeds);
        for _ in 0..cfg.start_seeds {
            set.spawn(cfg, rng);
        }
        set
    }

    /// Builds a set from explicit positions with zero velocity, assigning
    /// palette colors by slot index.
    pub fn from_positions(positions: Vec<Vec2>, max: usize) -> Self {
        let seeds = positions
            .into_iter()
            .enumerate()
            .map(|(id, position)| Seed {
                position,
                velocity: Vec2::ZERO,
                color: PALETTE[id % PALETTE.len()],
            })
            .collect();

        Self { seeds, max }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn get(&self, id: SeedId) -> Option<&Seed> {
        self.seeds.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seed> {
        self.seeds.iter()
    }

    pub fn as_slice(&self) -> &[Seed] {
        &self.seeds
    }

    /// Appends a seed at a uniformly random position inside the domain,
    /// with each velocity axis drawn uniformly from the symmetric spawn
    /// range, and the palette color of its slot.
    ///
    /// Returns `None` when the set is already at capacity.
    pub fn spawn(&mut self, cfg: &Config, rng: &mut impl Rng) -> Option<SeedId> {
        if self.seeds.len() >= self.max {
            return None;
        }

        let id = self.seeds.len();
        let half = cfg.velocity_range * 0.5;
        self.seeds.push(Seed {
            position: Vec2::new(
                rng.random_range(0.0..cfg.domain.x),
                rng.random_range(0.0..cfg.domain.y),
            ),
            velocity: Vec2::new(
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
            ),
            color: PALETTE[id % PALETTE.len()],
        });
        Some(id)
    }

    /// Truncates the highest slot.
    ///
    /// Returns `false` when only one seed is left; the set never drops
    /// below one seed.
    pub fn remove_last(&mut self) -> bool {
        if self.seeds.len() <= 1 {
            return false;
        }
        self.seeds.pop();
        true
    }

    /// Advances every seed by one tick and reflects it off the domain
    /// boundaries, using the visual radius as the bounce offset so the
    /// drawn marker never clips the edge.
    ///
    /// The two checks per axis are mutually exclusive: a displacement
    /// large enough to cross both boundaries of one axis in a single tick
    /// is not separately handled.
    pub fn advance(&mut self, cfg: &Config) {
        let r = cfg.seed_radius;
        for seed in &mut self.seeds {
            seed.position += seed.velocity;

            if seed.position.x - r < 0.0 {
                seed.position.x = r;
                seed.velocity.x = -seed.velocity.x;
            } else if seed.position.x + r >= cfg.domain.x {
                seed.position.x = cfg.domain.x - r;
                seed.velocity.x = -seed.velocity.x;
            }

            if seed.position.y - r < 0.0 {
                seed.position.y = r;
                seed.velocity.y = -seed.velocity.y;
            } else if seed.position.y + r >= cfg.domain.y {
                seed.position.y = cfg.domain.y - r;
                seed.velocity.y = -seed.velocity.y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_config() -> Config {
        Config {
            domain: Vec2::new(800.0, 600.0),
            ..Config::default()
        }
    }

    #[test]
    fn spawn_fills_slots_with_palette_colors_in_order() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(1);
        let mut set = SeedSet::new(cfg.max_seeds);

        for i in 0..cfg.max_seeds {
            let id = set.spawn(&cfg, &mut rng);
            assert_eq!(id, Some(i));
            assert_eq!(set.get(i).map(|s| s.color), Some(PALETTE[i % PALETTE.len()]));
        }
    }

    #[test]
    fn spawn_is_a_no_op_at_capacity() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(2);
        let mut set = SeedSet::new(cfg.max_seeds);

        for _ in 0..cfg.max_seeds {
            set.spawn(&cfg, &mut rng);
        }
        assert_eq!(set.len(), cfg.max_seeds);

        assert_eq!(set.spawn(&cfg, &mut rng), None);
        assert_eq!(set.len(), cfg.max_seeds);
    }

    #[test]
    fn spawn_places_seeds_inside_the_domain_with_bounded_velocity() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(3);
        let mut set = SeedSet::new(cfg.max_seeds);

        for _ in 0..cfg.max_seeds {
            set.spawn(&cfg, &mut rng);
        }

        let half = cfg.velocity_range * 0.5;
        for seed in set.iter() {
            assert!(seed.position.x >= 0.0 && seed.position.x < cfg.domain.x);
            assert!(seed.position.y >= 0.0 && seed.position.y < cfg.domain.y);
            assert!(seed.velocity.x >= -half && seed.velocity.x <= half);
            assert!(seed.velocity.y >= -half && seed.velocity.y <= half);
        }
    }

    #[test]
    fn remove_last_never_drops_below_one_seed() {
        let mut set = SeedSet::from_positions(vec![Vec2::new(1.0, 1.0)], 10);

        assert!(!set.remove_last());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn alternating_spawn_and_remove_walks_the_count_invariants() {
        // From 2 seeds: eight spawns saturate at 10, nine removes floor at 1.
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(4);
        let mut set = SeedSet::new(cfg.max_seeds);
        set.spawn(&cfg, &mut rng);
        set.spawn(&cfg, &mut rng);
        assert_eq!(set.len(), 2);

        for _ in 0..8 {
            set.spawn(&cfg, &mut rng);
        }
        assert_eq!(set.len(), 10);

        for _ in 0..9 {
            set.remove_last();
        }
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn advance_moves_seeds_by_their_velocity() {
        let cfg = test_config();
        let mut set = SeedSet::new(cfg.max_seeds);
        set.seeds.push(Seed {
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::new(1.5, -2.0),
            color: PALETTE[0],
        });

        set.advance(&cfg);

        let seed = set.get(0).unwrap();
        assert_eq!(seed.position, Vec2::new(101.5, 98.0));
        assert_eq!(seed.velocity, Vec2::new(1.5, -2.0));
    }

    #[test]
    fn advance_reflects_at_the_left_boundary() {
        // A seed sitting exactly at x = radius and moving left is clamped
        // back to x = radius with its x velocity sign-flipped.
        let cfg = test_config();
        let mut set = SeedSet::new(cfg.max_seeds);
        set.seeds.push(Seed {
            position: Vec2::new(cfg.seed_radius, 300.0),
            velocity: Vec2::new(-0.5, 0.0),
            color: PALETTE[0],
        });

        set.advance(&cfg);

        let seed = set.get(0).unwrap();
        assert_eq!(seed.position.x, cfg.seed_radius);
        assert_eq!(seed.velocity.x, 0.5);
    }

    #[test]
    fn repeated_advance_stays_inside_the_reflective_band() {
        let cfg = test_config();
        let mut set = SeedSet::new(cfg.max_seeds);
        set.seeds.push(Seed {
            position: Vec2::new(cfg.seed_radius, cfg.seed_radius),
            velocity: Vec2::new(-0.5, 0.7),
            color: PALETTE[0],
        });

        for _ in 0..5000 {
            set.advance(&cfg);
            let p = set.get(0).unwrap().position;
            assert!(p.x >= cfg.seed_radius && p.x <= cfg.domain.x - cfg.seed_radius);
            assert!(p.y >= cfg.seed_radius && p.y <= cfg.domain.y - cfg.seed_radius);
        }
    }

    #[test]
    fn advance_reflects_at_the_far_boundaries() {
        let cfg = test_config();
        let mut set = SeedSet::new(cfg.max_seeds);
        set.seeds.push(Seed {
            position: Vec2::new(cfg.domain.x - cfg.seed_radius, cfg.domain.y - cfg.seed_radius),
            velocity: Vec2::new(2.0, 3.0),
            color: PALETTE[0],
        });

        set.advance(&cfg);

        let seed = set.get(0).unwrap();
        assert_eq!(seed.position.x, cfg.domain.x - cfg.seed_radius);
        assert_eq!(seed.position.y, cfg.domain.y - cfg.seed_radius);
        assert_eq!(seed.velocity, Vec2::new(-2.0, -3.0));
    }
}
