use beep_core::{Gene, Genome};
use beep_sim::{standard_pool, SimConfig, Simulation};

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        grid_size: 12,
        population: 20,
        genes_per_genome: 4,
        internal_nodes: 3,
        steps_per_generation: 8,
        seed: Some(seed),
        ..SimConfig::default()
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let run = |seed| {
        let mut sim = Simulation::new(small_config(seed)).unwrap();
        sim.run(4).unwrap()
    };

    let a = run(2024);
    let b = run(2024);
    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
    assert_eq!(
        a.iter().map(|s| s.generation).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[test]
fn population_size_is_stable_across_generations() {
    let mut sim = Simulation::new(small_config(7)).unwrap();
    for _ in 0..3 {
        let stats = sim.run_generation().unwrap();
        assert_eq!(stats.population, 20);
        assert!(stats.survivors <= stats.population);
        assert!((0.0..1.0).contains(&stats.mean_x));
    }
    assert_eq!(sim.generation(), 3);
    assert_eq!(sim.agents().len(), 20);
    // Offspring come from the mutator, which never produces malformed wiring
    assert!(sim.agents().iter().all(|a| a.graph().is_some()));
}

#[test]
fn strong_x_signal_walks_to_the_east_edge() {
    let (_, ids) = standard_pool(3);
    let genome = Genome::new(vec![Gene::new(ids.x_position, ids.move_east, 100.0)]);

    let mut sim = Simulation::from_genomes(
        SimConfig {
            grid_size: 6,
            seed: Some(3),
            ..SimConfig::default()
        },
        vec![genome],
    )
    .unwrap();

    let start = sim.world().position(0).unwrap();
    sim.run_steps(10).unwrap();
    let end = sim.world().position(0).unwrap();

    // At x = 0 the sensor reads 0.0, which sits inside the dead band
    let expected_x = if start.x == 0 { 0 } else { 5 };
    assert_eq!(end.x, expected_x);
    assert_eq!(end.y, start.y);
}

#[test]
fn budget_failures_mark_agents_non_viable() {
    let (_, ids) = standard_pool(2);
    let (n1, n2) = (ids.internal[0], ids.internal[1]);
    // n1 waits on n2, which is never activated, so n1 can never reach move_east
    let stuck = Genome::new(vec![
        Gene::new(ids.x_position, n1, 1.0),
        Gene::new(n2, n1, 1.0),
        Gene::new(n1, ids.move_east, 1.0),
    ]);
    let healthy = Genome::new(vec![Gene::new(ids.x_position, ids.move_east, 0.1)]);

    let mut config = small_config(11);
    config.internal_nodes = 2;
    config.engine.max_steps_per_tick = 32;

    let mut sim = Simulation::from_genomes(config, vec![stuck, healthy]).unwrap();
    sim.run_steps(3).unwrap();

    assert!(!sim.agents()[0].is_viable());
    assert!(sim.agents()[1].is_viable());
}

#[test]
fn malformed_genome_is_not_viable() {
    let (_, ids) = standard_pool(3);
    let backwards = Genome::new(vec![Gene::new(ids.move_east, ids.internal[0], 1.0)]);

    let mut config = small_config(5);
    config.steps_per_generation = 2;
    let mut sim = Simulation::from_genomes(config, vec![backwards]).unwrap();

    assert!(sim.agents()[0].graph().is_none());
    let stats = sim.run_generation().unwrap();
    assert_eq!(stats.non_viable, 1);
    assert_eq!(stats.survivors, 0);
    assert_eq!(stats.traversal_steps, 0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = SimConfig {
        grid_size: 2,
        population: 5,
        ..SimConfig::default()
    };
    assert!(Simulation::new(config).is_err());
}
