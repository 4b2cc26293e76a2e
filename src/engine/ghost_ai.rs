use crate::constants::RANDOM_GHOST_CHASE_CHANCE;
use crate::rng::Rng;
use crate::types::{GhostView, Vec2};

use super::utils::manhattan;
use super::PlayerInternal;

/// Picks a ghost's pursuit target for this tick, before its step.
///
/// Under power mode every ghost flees: the target is the ghost's own position
/// mirrored away from the nearer player. Otherwise the fixed role decides:
/// role 0 shadows player 1, role 1 shadows player 2, role 2 hunts whichever
/// player leads on score (ties go to player 1), and role 3 chases the nearer
/// player with a 30% per-tick chance, wandering randomly the rest of the time.
pub(super) fn select_target(
    ghost: &GhostView,
    players: &[PlayerInternal; 2],
    power_active: bool,
    rng: &mut Rng,
) -> Option<Vec2> {
    if power_active {
        let prey = &players[nearer_player(ghost, players)].view;
        return Some(Vec2 {
            x: 2 * ghost.x - prey.x,
            y: 2 * ghost.y - prey.y,
        });
    }

    match ghost.role {
        0 => Some(position_of(&players[0])),
        1 => Some(position_of(&players[1])),
        2 => {
            if players[0].view.score >= players[1].view.score {
                Some(position_of(&players[0]))
            } else {
                Some(position_of(&players[1]))
            }
        }
        _ => {
            if rng.chance(RANDOM_GHOST_CHASE_CHANCE) {
                Some(position_of(&players[nearer_player(ghost, players)]))
            } else {
                None
            }
        }
    }
}

fn position_of(player: &PlayerInternal) -> Vec2 {
    Vec2 {
        x: player.view.x,
        y: player.view.y,
    }
}

/// Index of the player nearer by Manhattan distance, player 1 on a tie.
fn nearer_player(ghost: &GhostView, players: &[PlayerInternal; 2]) -> usize {
    let d1 = manhattan(ghost.x, ghost.y, players[0].view.x, players[0].view.y);
    let d2 = manhattan(ghost.x, ghost.y, players[1].view.x, players[1].view.y);
    if d2 < d1 {
        1
    } else {
        0
    }
}
