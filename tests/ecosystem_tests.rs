#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use botlife::error::ConfigError;
use botlife::simulation::brain::NeuralNetwork;
use botlife::simulation::ecosystem::Ecosystem;
use botlife::simulation::evolution::{POOL_SIZE, candidate_pool, draw_replacements};
use botlife::simulation::params::{Params, WallPolicy};
use botlife::simulation::shared::SharedEcosystem;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_params() -> Params {
    Params {
        population_size: 12,
        ticks_per_generation: 40,
        ball_resets_per_generation: 4,
        hidden_layer_size: 6,
        ..Params::default()
    }
}

fn run_ticks(ecosystem: &mut Ecosystem, ticks: usize, breed: bool) {
    for _ in 0..ticks {
        ecosystem.tick(breed);
    }
}

#[test]
fn test_ecosystem_creation() {
    let params = create_test_params();
    let ecosystem = Ecosystem::with_seed(params.clone(), 1).unwrap();

    assert_eq!(ecosystem.bots().len(), params.population_size);
    assert_eq!(
        ecosystem.balls().len(),
        params.beneficial_balls + params.harmful_balls
    );
    assert_eq!(ecosystem.generation(), 0);
    assert_eq!(ecosystem.tick_number(), 0);
    assert!(ecosystem.best_ever().is_none());
    assert_eq!(ecosystem.best_ever_score(), f64::NEG_INFINITY);

    for bot in ecosystem.bots() {
        assert_eq!(bot.brain.layer_sizes(), vec![22, 6, 4]);
        assert_eq!(bot.fitness, 0.0);
    }
}

#[test]
fn test_invalid_params_rejected() {
    let params = Params {
        death_fraction: 1.5,
        ..create_test_params()
    };
    assert!(matches!(
        Ecosystem::with_seed(params, 1),
        Err(ConfigError::Invalid(_))
    ));

    let params = Params {
        population_size: 0,
        ..create_test_params()
    };
    assert!(Ecosystem::with_seed(params, 1).is_err());
}

#[test]
fn test_same_seed_same_run() {
    let params = create_test_params();
    let mut a = Ecosystem::with_seed(params.clone(), 42).unwrap();
    let mut b = Ecosystem::with_seed(params, 42).unwrap();

    run_ticks(&mut a, 100, true);
    run_ticks(&mut b, 100, true);

    assert_eq!(a.generation(), b.generation());
    assert_eq!(a.tick_number(), b.tick_number());
    assert_eq!(a.balls(), b.balls());
    for (x, y) in a.bots().iter().zip(b.bots()) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.pos, y.pos);
        assert_eq!(x.fitness, y.fitness);
        assert_eq!(x.brain, y.brain);
    }
}

#[test]
fn test_tick_without_breeding_rolls_over() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 3).unwrap();
    let ids: Vec<u64> = ecosystem.bots().iter().map(|b| b.id).collect();

    run_ticks(&mut ecosystem, 39, false);
    assert_eq!(ecosystem.tick_number(), 39);
    assert_eq!(ecosystem.generation(), 0);

    ecosystem.tick(false);
    assert_eq!(ecosystem.tick_number(), 0);
    assert_eq!(ecosystem.generation(), 1);

    // no breeding: the same bots carry on
    let after: Vec<u64> = ecosystem.bots().iter().map(|b| b.id).collect();
    assert_eq!(ids, after);
    assert!(ecosystem.last_report().is_none());
}

#[test]
fn test_generation_boundary_breeds() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params.clone(), 4).unwrap();

    run_ticks(&mut ecosystem, 40, true);

    assert_eq!(ecosystem.generation(), 1);
    assert_eq!(ecosystem.tick_number(), 0);
    assert_eq!(ecosystem.bots().len(), params.population_size);
    assert!(ecosystem.best_ever().is_some());
    assert_eq!(ecosystem.history().len(), 1);
    assert_eq!(ecosystem.last_report().map(|r| r.generation), Some(1));
}

#[test]
fn test_next_generation_keeps_survivors_in_rank_order() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params.clone(), 5).unwrap();
    run_ticks(&mut ecosystem, 20, false);

    let mut ranked: Vec<_> = ecosystem.bots().to_vec();
    ranked.sort_by(|a, b| a.rank_cmp(b));
    let best_fitness = ranked[0].fitness;
    let survivors = params.population_size - params.replacement_count();
    let expected: Vec<NeuralNetwork> = ranked[..survivors]
        .iter()
        .map(|b| b.brain.clone())
        .collect();

    let report = ecosystem.create_next_generation();
    assert_eq!(report.best_fitness, best_fitness);

    let brains: Vec<NeuralNetwork> = ecosystem.bots()[..survivors]
        .iter()
        .map(|b| b.brain.clone())
        .collect();
    assert_eq!(brains, expected);

    for bot in ecosystem.bots() {
        assert_eq!(bot.fitness, 0.0);
    }
}

#[test]
fn test_best_ever_is_monotone() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 6).unwrap();

    let mut previous = f64::NEG_INFINITY;
    for _ in 0..6 {
        run_ticks(&mut ecosystem, 40, true);
        let score = ecosystem.best_ever_score();
        assert!(score >= previous);
        previous = score;
    }

    let history = ecosystem.history();
    assert_eq!(history.len(), 6);
    assert!(history.avg_best_fitness(6) >= history.avg_average_fitness(6));
    assert_eq!(history.latest().map(|r| r.generation), Some(6));
}

#[test]
fn test_bot_ids_unique_and_increasing() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 7).unwrap();

    let mut max_seen: u64 = 0;
    for _ in 0..3 {
        let ids: Vec<u64> = ecosystem.bots().iter().map(|b| b.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        max_seen = max_seen.max(*ids.last().unwrap());

        ecosystem.create_next_generation();
        let first = ecosystem.bots()[0].id;
        assert!(first > max_seen);
    }
}

#[test]
fn test_candidate_pool_contents() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let champion = NeuralNetwork::with_random_weights(&[22, 6, 4], &mut rng).unwrap();
    let parents: Vec<NeuralNetwork> = (0..5)
        .map(|_| NeuralNetwork::with_random_weights(&[22, 6, 4], &mut rng).unwrap())
        .collect();
    let refs = [&parents[0], &parents[1], &parents[2], &parents[3], &parents[4]];

    let pool = candidate_pool(&champion, refs, 0.05, &mut rng);
    assert_eq!(pool.len(), POOL_SIZE);
    assert_eq!(POOL_SIZE, 33);
    assert_eq!(pool[0], champion);
    for (i, parent) in parents.iter().enumerate() {
        assert_eq!(&pool[1 + i], parent);
    }
    assert!(pool.iter().all(|b| b.same_topology(&champion)));
}

#[test]
fn test_replacements_cycle_through_pool() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let pool: Vec<NeuralNetwork> = (0..3)
        .map(|_| NeuralNetwork::with_random_weights(&[22, 2, 4], &mut rng).unwrap())
        .collect();

    let drawn = draw_replacements(&pool, 7);
    assert_eq!(drawn.len(), 7);
    assert_eq!(drawn[3], pool[0]);
    assert_eq!(drawn[6], pool[0]);
}

#[test]
fn test_large_death_fraction() {
    let params = Params {
        population_size: 50,
        death_fraction: 1.0,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::with_seed(params, 10).unwrap();
    ecosystem.create_next_generation();
    assert_eq!(ecosystem.bots().len(), 50);
}

#[test]
fn test_tiny_population() {
    let params = Params {
        population_size: 2,
        death_fraction: 0.5,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::with_seed(params, 11).unwrap();
    run_ticks(&mut ecosystem, 85, true);
    assert_eq!(ecosystem.generation(), 2);
    assert_eq!(ecosystem.bots().len(), 2);
}

#[test]
fn test_ball_reset_cadence() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 12).unwrap();

    run_ticks(&mut ecosystem, 9, false);
    let before = ecosystem.balls().to_vec();
    // tick 10 is a scheduled reset
    ecosystem.tick(false);
    let after = ecosystem.balls();
    assert_eq!(before.len(), after.len());
    assert!(before.iter().zip(after).any(|(a, b)| a.pos != b.pos));
}

#[test]
fn test_balls_stay_near_arena() {
    for walls in [WallPolicy::Solid, WallPolicy::Wrap] {
        let params = Params {
            wall_policy: walls,
            ball_resets_per_generation: 0,
            ticks_per_generation: 10_000,
            ..create_test_params()
        };
        let mut ecosystem = Ecosystem::with_seed(params, 13).unwrap();
        run_ticks(&mut ecosystem, 1000, false);
        for ball in ecosystem.balls() {
            assert!(ball.pos.x() > -0.01 && ball.pos.x() < 1.01);
            assert!(ball.pos.y() > -0.01 && ball.pos.y() < 1.01);
        }
        for bot in ecosystem.bots() {
            assert!((0.0..=1.0).contains(&bot.pos.x()));
            assert!((0.0..=1.0).contains(&bot.pos.y()));
        }
    }
}

#[test]
fn test_started_lock() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params.clone(), 14).unwrap();

    // before start, population changes apply immediately
    let bigger = Params {
        population_size: 20,
        ..params.clone()
    };
    ecosystem.update_params(bigger.clone()).unwrap();
    assert_eq!(ecosystem.bots().len(), 20);

    ecosystem.start();
    assert!(ecosystem.is_started());

    let err = ecosystem
        .update_params(Params {
            population_size: 30,
            ..bigger.clone()
        })
        .unwrap_err();
    assert_eq!(err, ConfigError::Locked("population_size"));

    let err = ecosystem
        .update_params(Params {
            hidden_layer_size: 9,
            ..bigger.clone()
        })
        .unwrap_err();
    assert_eq!(err, ConfigError::Locked("hidden_layer_size"));

    // other fields still change, and the lock cannot be cleared
    let tuned = Params {
        mutation_rate: 0.2,
        beneficial_balls: 5,
        started: false,
        ..bigger
    };
    ecosystem.update_params(tuned).unwrap();
    assert_eq!(ecosystem.params().mutation_rate, 0.2);
    assert!(ecosystem.is_started());

    ecosystem.reset_balls();
    assert_eq!(ecosystem.balls().len(), 5 + 3);
}

#[test]
fn test_start_only_resets_once() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 15).unwrap();
    ecosystem.start();
    let ids: Vec<u64> = ecosystem.bots().iter().map(|b| b.id).collect();
    ecosystem.start();
    let again: Vec<u64> = ecosystem.bots().iter().map(|b| b.id).collect();
    assert_eq!(ids, again);
}

#[test]
fn test_snapshot_is_independent() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params, 16).unwrap();
    run_ticks(&mut ecosystem, 10, false);

    let mut preview = ecosystem.snapshot(4);
    assert_eq!(preview.bots().len(), 4);
    for (copy, original) in preview.bots().iter().zip(ecosystem.bots()) {
        assert_eq!(copy.brain, original.brain);
        assert_eq!(copy.fitness, 0.0);
    }

    let live_bots: Vec<_> = ecosystem.bots().iter().map(|b| (b.id, b.pos)).collect();
    let live_balls = ecosystem.balls().to_vec();

    run_ticks(&mut preview, 25, false);

    let still: Vec<_> = ecosystem.bots().iter().map(|b| (b.id, b.pos)).collect();
    assert_eq!(live_bots, still);
    assert_eq!(live_balls, ecosystem.balls());
    assert_eq!(ecosystem.tick_number(), 10);
}

#[test]
fn test_shared_handle() {
    let params = create_test_params();
    let shared = SharedEcosystem::new(Ecosystem::with_seed(params, 17).unwrap());

    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            for _ in 0..50 {
                shared.tick(true);
            }
        })
    };

    let preview = shared.snapshot(3);
    assert_eq!(preview.bots().len(), 3);

    writer.join().unwrap();
    assert_eq!(shared.with(Ecosystem::generation), 1);
    assert_eq!(shared.with(|e| e.tick_number()), 10);
}

#[test]
fn test_report_normalization() {
    let params = create_test_params();
    let mut ecosystem = Ecosystem::with_seed(params.clone(), 18).unwrap();
    run_ticks(&mut ecosystem, 40, true);

    let report = *ecosystem.last_report().unwrap();
    let expected = 100.0 * report.best_fitness / (40.0 * params.beneficial_reward);
    assert!((report.normalized_best(&params) - expected).abs() < 1e-9);
    assert!(report.best_fitness >= report.average_fitness);
}
