use crate::constants::{
    DOT_SCORE, GHOST_SCORE, INVULNERABLE_DURATION_MS, PELLET_SCORE, POWER_DURATION_MS,
    VULNERABLE_COLOR,
};
use crate::maze;

use super::GameEngine;

/// Expires timed effects. Runs at the top of every tick, before movement:
/// power mode ends 10s after activation restoring every vulnerable ghost's
/// baseline color, and per-player invulnerability clears after 3s. Both are
/// judged on wall-clock deltas, not tick counts.
pub(super) fn advance_timers(engine: &mut GameEngine, now_ms: u64) {
    if engine.power_until_ms != 0 && now_ms >= engine.power_until_ms {
        engine.power_until_ms = 0;
        for ghost in &mut engine.ghosts {
            ghost.view.vulnerable = false;
            if let Some(color) = ghost.baseline_color.take() {
                ghost.view.color = color;
            }
        }
    }

    for player in &mut engine.players {
        if player.view.invulnerable_until_ms != 0 && now_ms >= player.view.invulnerable_until_ms {
            player.view.invulnerable_until_ms = 0;
            player.view.invulnerable = false;
        }
    }
}

/// Collectible pickup followed by ghost contact, in that order, once per tick
/// after all movement has been committed.
pub(super) fn resolve(engine: &mut GameEngine, now_ms: u64) {
    let positions = [
        (engine.players[0].view.x, engine.players[0].view.y),
        (engine.players[1].view.x, engine.players[1].view.y),
    ];

    // Both players standing on the same dot each score; the dot is removed
    // once, so the set shrinks by at most two per tick.
    let mut eaten_dots = Vec::new();
    for (idx, pos) in positions.iter().enumerate() {
        if engine.dots.contains(pos) {
            engine.players[idx].view.score += DOT_SCORE;
            eaten_dots.push(*pos);
        }
    }
    for pos in eaten_dots {
        engine.dots.remove(&pos);
    }

    let mut pellet_taken = false;
    let mut eaten_pellets = Vec::new();
    for (idx, pos) in positions.iter().enumerate() {
        if engine.pellets.contains(pos) {
            engine.players[idx].view.score += PELLET_SCORE;
            pellet_taken = true;
            eaten_pellets.push(*pos);
        }
    }
    for pos in eaten_pellets {
        engine.pellets.remove(&pos);
    }

    if pellet_taken {
        engine.power_until_ms = now_ms + POWER_DURATION_MS;
        for ghost in &mut engine.ghosts {
            if ghost.baseline_color.is_none() {
                ghost.baseline_color = Some(ghost.view.color.clone());
                ghost.view.color = VULNERABLE_COLOR.to_string();
            }
            ghost.view.vulnerable = true;
        }
    }

    let power_active = engine.power_active(now_ms);
    for ghost_idx in 0..engine.ghosts.len() {
        for player_idx in 0..engine.players.len() {
            let overlap = engine.ghosts[ghost_idx].view.x == engine.players[player_idx].view.x
                && engine.ghosts[ghost_idx].view.y == engine.players[player_idx].view.y;
            if !overlap {
                continue;
            }

            if power_active {
                engine.players[player_idx].view.score += GHOST_SCORE;
                let ghost = &mut engine.ghosts[ghost_idx];
                let home = maze::ghost_home(ghost.view.role);
                ghost.view.x = home.x;
                ghost.view.y = home.y;
                ghost.view.vulnerable = false;
                if let Some(color) = ghost.baseline_color.take() {
                    ghost.view.color = color;
                }
            } else if now_ms >= engine.players[player_idx].view.invulnerable_until_ms {
                let player = &mut engine.players[player_idx];
                player.view.lives -= 1;
                player.view.invulnerable = true;
                player.view.invulnerable_until_ms = now_ms + INVULNERABLE_DURATION_MS;
                player.view.x = player.spawn.x;
                player.view.y = player.spawn.y;
                player.view.dir = player.spawn_dir;
            }
        }
    }
}
