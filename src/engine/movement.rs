use crate::constants::GRID_HEIGHT;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, Vec2};

use super::utils::{offset, random_direction};
use super::{GhostInternal, PlayerInternal};

/// One step along the player's facing direction. Horizontal wraparound is
/// applied first; the move commits only onto a non-Wall cell inside the
/// vertical bounds. A blocked player stays put and keeps its facing, so it
/// keeps pressing into the obstruction until redirected.
pub(super) fn step_player(maze: &Maze, player: &mut PlayerInternal) {
    let (nx, ny) = offset(player.view.x, player.view.y, player.view.dir);
    let nx = Maze::wrap_x(nx);
    if ny < 0 || ny >= GRID_HEIGHT {
        return;
    }
    if !maze.is_passable(nx, ny) {
        return;
    }
    player.view.x = nx;
    player.view.y = ny;
}

/// One step toward an optional target. With a target the ghost moves along
/// the axis of strictly greater delta magnitude, horizontal on ties; without
/// one it picks a uniformly random direction. The facing is updated to the
/// attempted move even when the step is rejected at the vertical bound.
/// Ghosts are not blocked by Wall cells.
pub(super) fn step_ghost(ghost: &mut GhostInternal, target: Option<Vec2>, rng: &mut Rng) {
    let dir = match target {
        Some(target) => {
            let dx = target.x - ghost.view.x;
            let dy = target.y - ghost.view.y;
            if dy.abs() > dx.abs() {
                if dy > 0 {
                    Direction::Down
                } else {
                    Direction::Up
                }
            } else if dx < 0 {
                Direction::Left
            } else {
                Direction::Right
            }
        }
        None => random_direction(rng),
    };

    ghost.view.dir = dir;
    let (nx, ny) = offset(ghost.view.x, ghost.view.y, dir);
    let nx = Maze::wrap_x(nx);
    if ny < 0 || ny >= GRID_HEIGHT {
        return;
    }
    ghost.view.x = nx;
    ghost.view.y = ny;
}
