use clap::Parser;
use maze_duel_server::constants::TICK_MS;
use maze_duel_server::engine::GameEngine;
use maze_duel_server::rng::Rng;
use maze_duel_server::types::{Direction, DirectionIntent, StartNames};
use serde_json::json;

/// Headless match runner. Drives both players with seeded random turn
/// decisions and prints one JSON summary line, so repeated runs with the
/// same seed are byte-identical.
#[derive(Debug, Parser)]
#[command(name = "simulate")]
struct Cli {
    /// Maximum number of ticks before the run is cut off.
    #[arg(long, default_value_t = 4000)]
    ticks: u64,

    /// Seed for both the engine and the synthetic player inputs.
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Display name for player 1.
    #[arg(long, default_value = "Sim One")]
    p1: String,

    /// Display name for player 2.
    #[arg(long, default_value = "Sim Two")]
    p2: String,

    /// Chance per tick that a player picks a new direction.
    #[arg(long, default_value_t = 0.2)]
    turn_chance: f32,
}

fn main() {
    let cli = Cli::parse();

    let mut engine = GameEngine::new(
        StartNames {
            player1: Some(cli.p1.clone()),
            player2: Some(cli.p2.clone()),
        },
        cli.seed,
    );
    // Input decisions come from their own stream so they never perturb the
    // ghost rolls inside the engine.
    let mut input_rng = Rng::new(cli.seed.wrapping_add(0x9e37_79b9));

    println!("[sim] starting: {} vs {} (seed {})", cli.p1, cli.p2, cli.seed);

    let mut ticks_run = 0u64;
    for _ in 0..cli.ticks {
        for player_index in 1..=2 {
            if input_rng.chance(cli.turn_chance) {
                let dir = random_direction(&mut input_rng);
                engine.set_intent(player_index, DirectionIntent::from_direction(dir));
            }
        }
        engine.step(TICK_MS);
        ticks_run += 1;
        if engine.is_ended() {
            break;
        }
    }

    let snapshot = engine.build_snapshot();
    let scores: Vec<_> = engine
        .final_scores()
        .into_iter()
        .map(|(name, score)| json!({ "name": name, "score": score }))
        .collect();
    let summary = json!({
        "ticks": ticks_run,
        "durationMs": ticks_run * TICK_MS,
        "ended": snapshot.ended,
        "winner": snapshot.winner,
        "scores": scores,
        "dotsLeft": snapshot.dots.len(),
        "pelletsLeft": snapshot.pellets.len(),
    });
    println!("{summary}");
}

fn random_direction(rng: &mut Rng) -> Direction {
    match rng.pick_index(4) {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}
