use crate::palette::{self, Rgba};
use glam::Vec2;

/// Default domain (and presentation surface) extent, in pixels.
pub const DOMAIN_WIDTH: f32 = 1920.0;
pub const DOMAIN_HEIGHT: f32 = 1080.0;

pub const SEEDS_N_START: usize = 2;
pub const SEEDS_N_MAX: usize = 10;

/// Visual marker radius; also the bounce offset at domain boundaries.
pub const SEED_RADIUS: f32 = 4.0;

/// Total width of the symmetric per-axis spawn velocity range.
pub const SEED_VELOCITY_RANGE: f32 = 1.0;

pub const EDGE_THICKNESS_MIN: f32 = 1.0;
pub const EDGE_THICKNESS_MAX: f32 = 5.0;
pub const EDGE_THICKNESS_STEP: f32 = 1.0;

/// Which field evaluation strategy the viewer runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Reference single-threaded scan.
    Scalar,
    /// Row-parallel CPU scan.
    Parallel,
    /// Fragment-shader evaluation on the GPU.
    Gpu,
    /// [`Strategy::Gpu`] when a GL context is available, otherwise
    /// [`Strategy::Parallel`].
    Auto,
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub domain: Vec2,
    pub start_seeds: usize,
    pub max_seeds: usize,
    pub seed_radius: f32,
    pub velocity_range: f32,
    pub edge_color: Rgba,
    /// Divisor applied to the domain when sizing CPU field buffers.
    pub cpu_field_scale: u32,
    /// Whether spawn/remove commands are honored while paused.
    pub edits_while_paused: bool,
    pub strategy: Strategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: Vec2::new(DOMAIN_WIDTH, DOMAIN_HEIGHT),
            start_seeds: SEEDS_N_START,
            max_seeds: SEEDS_N_MAX,
            seed_radius: SEED_RADIUS,
            velocity_range: SEED_VELOCITY_RANGE,
            edge_color: palette::EDGE_COLOR,
            cpu_field_scale: 2,
            edits_while_paused: true,
            strategy: Strategy::Auto,
        }
    }
}

/// Per-frame render parameters.
///
/// Mutated only by the input phase at the start of a tick; every downstream
/// stage of that tick reads them unchanged.
#[derive(Clone, Copy, Debug)]
pub struct RenderParams {
    pub paused: bool,
    pub hide_seeds: bool,
    pub hide_edges: bool,
    /// Clamped to `[EDGE_THICKNESS_MIN, EDGE_THICKNESS_MAX]`.
    pub edge_thickness: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            paused: false,
            hide_seeds: false,
            hide_edges: false,
            edge_thickness: EDGE_THICKNESS_MIN,
        }
    }
}
