use std::collections::BTreeSet;

use crate::constants::{GRID_HEIGHT, GRID_WIDTH};
use crate::types::{Direction, Vec2};

/// Fixed 28x31 layout. `#` wall, `.` corridor with a dot, `o` corridor with a
/// power pellet, space bare corridor, `-` ghost-area interior. Row 14 is the
/// wraparound tunnel.
const LAYOUT: [&str; GRID_HEIGHT as usize] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #------# ##.######",
    "      .   #------#   .      ",
    "######.## #------# ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Corridor,
    GhostArea,
}

#[derive(Clone, Debug)]
pub struct Maze {
    cells: Vec<Vec<CellKind>>,
}

impl Default for Maze {
    fn default() -> Self {
        Self::new()
    }
}

impl Maze {
    pub fn new() -> Self {
        let cells = LAYOUT
            .iter()
            .map(|row| {
                row.bytes()
                    .map(|tile| match tile {
                        b'#' => CellKind::Wall,
                        b'-' => CellKind::GhostArea,
                        _ => CellKind::Corridor,
                    })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    /// Out-of-bounds coordinates classify as Wall.
    pub fn classify(&self, x: i32, y: i32) -> CellKind {
        if x < 0 || y < 0 || x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return CellKind::Wall;
        }
        self.cells[y as usize][x as usize]
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.classify(x, y) != CellKind::Wall
    }

    /// Horizontal wraparound only; the vertical axis is clamped by callers.
    pub fn wrap_x(x: i32) -> i32 {
        if x < 0 {
            GRID_WIDTH - 1
        } else if x >= GRID_WIDTH {
            0
        } else {
            x
        }
    }

    pub fn initial_dots() -> BTreeSet<(i32, i32)> {
        cells_marked(b'.')
    }

    pub fn initial_pellets() -> BTreeSet<(i32, i32)> {
        cells_marked(b'o')
    }
}

fn cells_marked(marker: u8) -> BTreeSet<(i32, i32)> {
    let mut cells = BTreeSet::new();
    for (y, row) in LAYOUT.iter().enumerate() {
        for (x, tile) in row.bytes().enumerate() {
            if tile == marker {
                cells.insert((x as i32, y as i32));
            }
        }
    }
    cells
}

pub fn player_spawn(player_index: usize) -> (Vec2, Direction) {
    if player_index == 1 {
        (Vec2 { x: 13, y: 23 }, Direction::Left)
    } else {
        (Vec2 { x: 14, y: 23 }, Direction::Right)
    }
}

/// Fixed home cell inside the ghost area, by role.
pub fn ghost_home(role: usize) -> Vec2 {
    Vec2 {
        x: 13 + (role as i32) % 2,
        y: 14 + (role as i32) / 2,
    }
}
