use crate::config::{Config, EDGE_THICKNESS_MAX, EDGE_THICKNESS_MIN, EDGE_THICKNESS_STEP};
use crate::state::SimulationState;
use rand::Rng;
use tracing::debug;

/// A discrete input command, decoded from a key-released event by the
/// presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    SpawnSeed,
    RemoveSeed,
    ToggleEdges,
    ToggleMarkers,
    IncreaseThickness,
    DecreaseThickness,
}

/// Applies a single command to the simulation state.
///
/// Together with [`crate::phases::simulate_phase`] this is the only
/// mutation point for the seed set and render parameters. All bound
/// violations are silent no-ops: spawning at capacity, removing the last
/// seed, and stepping thickness past its clamp leave the state unchanged.
///
/// When `cfg.edits_while_paused` is `false`, spawn and remove are ignored
/// while the simulation is paused; toggles and thickness changes are
/// always honored.
pub fn apply(state: &mut SimulationState, cfg: &Config, cmd: Command, rng: &mut impl Rng) {
    debug!(?cmd, "applying command");
    match cmd {
        Command::TogglePause => {
            state.params.paused = !state.params.paused;
        }
        Command::SpawnSeed => {
            if state.params.paused && !cfg.edits_while_paused {
                return;
            }
            state.seeds.spawn(cfg, rng);
        }
        Command::RemoveSeed => {
            if state.params.paused && !cfg.edits_while_paused {
                return;
            }
            state.seeds.remove_last();
        }
        Command::ToggleEdges => {
            state.params.hide_edges = !state.params.hide_edges;
        }
        Command::ToggleMarkers => {
            state.params.hide_seeds = !state.params.hide_seeds;
        }
        Command::IncreaseThickness => {
            state.params.edge_thickness =
                (state.params.edge_thickness + EDGE_THICKNESS_STEP).min(EDGE_THICKNESS_MAX);
        }
        Command::DecreaseThickness => {
            state.params.edge_thickness =
                (state.params.edge_thickness - EDGE_THICKNESS_STEP).max(EDGE_THICKNESS_MIN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(cfg: &Config) -> (SimulationState, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let state = SimulationState::new(cfg, &mut rng);
        (state, rng)
    }

    fn test_config() -> Config {
        Config {
            domain: Vec2::new(800.0, 600.0),
            ..Config::default()
        }
    }

    #[test]
    fn toggle_pause_flips_the_flag() {
        let cfg = test_config();
        let (mut state, mut rng) = setup(&cfg);

        assert!(!state.params.paused);
        apply(&mut state, &cfg, Command::TogglePause, &mut rng);
        assert!(state.params.paused);
        apply(&mut state, &cfg, Command::TogglePause, &mut rng);
        assert!(!state.params.paused);
    }

    #[test]
    fn spawn_and_remove_walk_the_count_bounds() {
        let cfg = test_config();
        let (mut state, mut rng) = setup(&cfg);
        assert_eq!(state.seeds.len(), 2);

        for _ in 0..8 {
            apply(&mut state, &cfg, Command::SpawnSeed, &mut rng);
        }
        assert_eq!(state.seeds.len(), 10);

        // Spawning at capacity is a silent no-op.
        apply(&mut state, &cfg, Command::SpawnSeed, &mut rng);
        assert_eq!(state.seeds.len(), 10);

        for _ in 0..9 {
            apply(&mut state, &cfg, Command::RemoveSeed, &mut rng);
        }
        assert_eq!(state.seeds.len(), 1);

        // Removing the last seed is a silent no-op.
        apply(&mut state, &cfg, Command::RemoveSeed, &mut rng);
        assert_eq!(state.seeds.len(), 1);
    }

    #[test]
    fn thickness_steps_by_one_and_saturates_at_both_bounds() {
        let cfg = test_config();
        let (mut state, mut rng) = setup(&cfg);
        assert_eq!(state.params.edge_thickness, 1.0);

        for expected in [2.0, 3.0, 4.0, 5.0, 5.0, 5.0] {
            apply(&mut state, &cfg, Command::IncreaseThickness, &mut rng);
            assert_eq!(state.params.edge_thickness, expected);
        }

        for expected in [4.0, 3.0, 2.0, 1.0, 1.0, 1.0] {
            apply(&mut state, &cfg, Command::DecreaseThickness, &mut rng);
            assert_eq!(state.params.edge_thickness, expected);
        }
    }

    #[test]
    fn visibility_toggles_flip_independently() {
        let cfg = test_config();
        let (mut state, mut rng) = setup(&cfg);

        apply(&mut state, &cfg, Command::ToggleEdges, &mut rng);
        assert!(state.params.hide_edges);
        assert!(!state.params.hide_seeds);

        apply(&mut state, &cfg, Command::ToggleMarkers, &mut rng);
        assert!(state.params.hide_edges);
        assert!(state.params.hide_seeds);
    }

    #[test]
    fn paused_edits_are_honored_by_default() {
        let cfg = test_config();
        let (mut state, mut rng) = setup(&cfg);
        apply(&mut state, &cfg, Command::TogglePause, &mut rng);

        apply(&mut state, &cfg, Command::SpawnSeed, &mut rng);
        assert_eq!(state.seeds.len(), 3);

        apply(&mut state, &cfg, Command::RemoveSeed, &mut rng);
        assert_eq!(state.seeds.len(), 2);
    }

    #[test]
    fn paused_edits_are_ignored_when_the_policy_gates_them() {
        let cfg = Config {
            edits_while_paused: false,
            ..test_config()
        };
        let (mut state, mut rng) = setup(&cfg);
        apply(&mut state, &cfg, Command::TogglePause, &mut rng);

        apply(&mut state, &cfg, Command::SpawnSeed, &mut rng);
        apply(&mut state, &cfg, Command::RemoveSeed, &mut rng);
        assert_eq!(state.seeds.len(), 2);

        // Toggles and thickness remain live while paused.
        apply(&mut state, &cfg, Command::ToggleEdges, &mut rng);
        assert!(state.params.hide_edges);
        apply(&mut state, &cfg, Command::IncreaseThickness, &mut rng);
        assert_eq!(state.params.edge_thickness, 2.0);
    }
}
