use hoffman_core::{ClockConfig, Label, RngState, SimulationClock, SimulationParameters, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn assert_exclusive(world: &World) {
    let mut seen = HashSet::new();
    for idx in 0..world.agent_count() {
        let (row, col) = world.agents().position(idx);
        assert!(seen.insert((row, col)), "two agents on ({}, {})", row, col);
        assert!(world.grid().occupancy(row, col).is_agent());
    }
    assert_eq!(seen.len(), world.grid().occupied().count());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn property_occupancy_exclusive_every_tick(
        dim in 1usize..8,
        density in 0.0f64..=1.0,
        seed in any::<u64>(),
        ticks in 1u64..15,
    ) {
        let params = SimulationParameters::with_grid(dim, density);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), seed).unwrap();

        for _ in 0..ticks {
            sim.tick().unwrap();
            assert_exclusive(sim.world());
            prop_assert!(sim.world().check_consistency().is_ok());
        }
    }

    #[test]
    fn property_agent_count_conserved(
        dim in 1usize..12,
        density in 0.0f64..=1.0,
        seed in any::<u64>(),
        ticks in 0u64..30,
    ) {
        let params = SimulationParameters::with_grid(dim, density);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), seed).unwrap();
        let before = sim.world().agent_count();
        let population = sim.population();

        sim.run(ticks).unwrap();

        prop_assert_eq!(sim.world().agent_count(), before);
        prop_assert_eq!(sim.population(), population);
    }

    #[test]
    fn property_history_one_sample_per_tick(
        seed in any::<u64>(),
        ticks in 0u64..40,
    ) {
        let params = SimulationParameters::with_grid(6, 0.3);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), seed).unwrap();

        sim.run(ticks).unwrap();

        prop_assert_eq!(sim.history().len() as u64, ticks);
        for (i, sample) in sim.history().samples().iter().enumerate() {
            prop_assert_eq!(sample.tick, i as u64 + 1);
            prop_assert_eq!(sample.population(), sim.population());
        }
    }

    #[test]
    fn property_snapshot_round_trip(
        dim in 1usize..10,
        density in 0.0f64..=1.0,
        seed in any::<u64>(),
        ticks in 0u64..20,
    ) {
        let params = SimulationParameters::with_grid(dim, density);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), seed).unwrap();
        sim.run(ticks).unwrap();

        let json = hoffman_core::encode(&sim.snapshot()).unwrap();
        let restored = hoffman_core::decode(&json).unwrap().restore(0).unwrap();

        prop_assert_eq!(&restored.world, sim.world());
        prop_assert_eq!(&restored.history, sim.history());
        prop_assert_eq!(&restored.params, sim.params());
        prop_assert_eq!(restored.tick, sim.tick_count());
        prop_assert_eq!(RngState::capture(&restored.rng), RngState::capture(sim.rng()));
    }

    #[test]
    fn property_stasis_follows_agent(
        seed in any::<u64>(),
        ticks in 1u64..20,
    ) {
        let mut world = World::empty(7);
        let stasis = [0.125, 0.25, 0.5, 0.75];
        for ((row, col), value) in [(0, 0), (3, 3), (6, 2), (2, 5)].into_iter().zip(stasis) {
            world.spawn(row, col, Label::Human, value).unwrap();
        }

        let params = SimulationParameters::with_grid(7, 0.0);
        let mut sim = SimulationClock::with_world(params, ClockConfig::default(), world, ChaCha8Rng::seed_from_u64(seed)).unwrap();
        sim.run(ticks).unwrap();

        let grid = sim.world().grid();
        let mut values: Vec<f64> = (0..sim.world().agent_count())
            .map(|idx| {
                let (row, col) = sim.world().agents().position(idx);
                grid.stasis(row, col)
            })
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(values, stasis.to_vec());

        let nonzero = grid.stasis_field().iter().filter(|&&s| s != 0.0).count();
        prop_assert_eq!(nonzero, 4);
    }
}
