//! High-level per-tick phases of the Voronoi rendering pipeline.
//!
//! One tick runs:
//! 1. [`input_phase`] — apply queued commands to the simulation state.
//! 2. [`simulate_phase`] — advance seed positions, unless paused.
//! 3. [`field_phase`] — recompute the nearest-seed color field.
//! 4. [`edge_phase`] — derive the boundary overlay, unless hidden.
//! 5. [`composite_phase`] — assemble the displayable frame.
//!
//! The presentation layer presents the composited frame and loops. The
//! seed set and render parameters are the only state carried across the
//! presented-frame boundary; every buffer is fully repopulated each tick.

use crate::{
    command::{self, Command},
    compositor,
    config::Config,
    edge,
    field::{ColorField, FieldEvaluator},
    state::SimulationState,
};
use glam::Vec2;
use rand::Rng;

/// Applies all queued input commands, in order, to the simulation state.
///
/// This is the single writer for `SeedSet` and `RenderParams` within a
/// tick; every later phase reads them unchanged.
///
/// ### Parameters
/// - `state` - Simulation state to mutate.
/// - `cfg` - Configuration (bounds, pause-edit policy).
/// - `commands` - Commands decoded from this tick's input events.
/// - `rng` - Random number generator used by spawn commands.
pub fn input_phase(
    state: &mut SimulationState,
    cfg: &Config,
    commands: &[Command],
    rng: &mut impl Rng,
) {
    for &cmd in commands {
        command::apply(state, cfg, cmd, rng);
    }
}

/// Advances every seed by one tick and reflects them off the domain
/// boundaries via [`crate::seed::SeedSet::advance`].
///
/// A no-op while paused: positions and velocities stay frozen.
pub fn simulate_phase(state: &mut SimulationState, cfg: &Config) {
    if state.params.paused {
        return;
    }
    state.seeds.advance(cfg);
}

/// Recomputes the color field from the current seed state using the
/// configured evaluation strategy.
///
/// The field is always derived fresh; no result from a previous tick is
/// reused.
pub fn field_phase(evaluator: &dyn FieldEvaluator, state: &SimulationState, field: &mut ColorField) {
    evaluator.evaluate(&state.seeds, field);
}

/// Derives the region-boundary overlay from the freshly computed field.
///
/// Skipped entirely when `hide_edges` is set; in that case the compositor
/// uses the raw field output as its base layer.
///
/// ### Returns
/// `true` when the overlay was rendered, `false` when the stage was
/// skipped.
pub fn edge_phase(
    state: &SimulationState,
    cfg: &Config,
    field: &ColorField,
    overlay: &mut ColorField,
) -> bool {
    if state.params.hide_edges {
        return false;
    }
    edge::render_overlay(field, state.params.edge_thickness, cfg.edge_color, overlay);
    true
}

/// Assembles the final frame from the chosen base layer and the seed
/// markers via [`compositor::composite`].
pub fn composite_phase(
    state: &SimulationState,
    cfg: &Config,
    base: &ColorField,
    frame: &mut ColorField,
) {
    compositor::composite(base, &state.seeds, cfg, &state.params, frame);
}

/// The CPU pipeline's reusable buffers: field, edge overlay, and the
/// composited frame. Allocations persist across ticks; contents do not.
pub struct TickBuffers {
    pub field: ColorField,
    pub overlay: ColorField,
    pub frame: ColorField,
}

impl TickBuffers {
    pub fn new(width: usize, height: usize, domain: Vec2) -> Self {
        Self {
            field: ColorField::new(width, height, domain),
            overlay: ColorField::new(width, height, domain),
            frame: ColorField::new(width, height, domain),
        }
    }
}

/// Runs one full tick of the CPU pipeline: input, simulation, field,
/// optional edge overlay, and compositing. After this call
/// `buffers.frame` holds the displayable frame.
///
/// ### Parameters
/// - `state` - Simulation state carried across ticks.
/// - `cfg` - Configuration shared by all phases.
/// - `evaluator` - Field evaluation strategy chosen at startup.
/// - `commands` - This tick's decoded input commands.
/// - `rng` - Random number generator for spawn commands.
/// - `buffers` - Reused pipeline buffers, fully repopulated here.
pub fn run_tick(
    state: &mut SimulationState,
    cfg: &Config,
    evaluator: &dyn FieldEvaluator,
    commands: &[Command],
    rng: &mut impl Rng,
    buffers: &mut TickBuffers,
) {
    input_phase(state, cfg, commands, rng);
    simulate_phase(state, cfg);
    field_phase(evaluator, state, &mut buffers.field);

    let base = if edge_phase(state, cfg, &buffers.field, &mut buffers.overlay) {
        &buffers.overlay
    } else {
        &buffers.field
    };
    composite_phase(state, cfg, base, &mut buffers.frame);
}
