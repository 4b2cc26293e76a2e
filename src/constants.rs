pub const TICK_MS: u64 = 150;

pub const GRID_WIDTH: i32 = 28;
pub const GRID_HEIGHT: i32 = 31;

pub const STARTING_LIVES: i32 = 5;
pub const DOT_SCORE: i32 = 10;
pub const PELLET_SCORE: i32 = 50;
pub const GHOST_SCORE: i32 = 200;

pub const POWER_DURATION_MS: u64 = 10_000;
pub const INVULNERABLE_DURATION_MS: u64 = 3_000;

pub const GHOST_COLORS: [&str; 4] = ["red", "pink", "cyan", "orange"];
pub const VULNERABLE_COLOR: &str = "blue";

pub const RANDOM_GHOST_CHASE_CHANCE: f32 = 0.3;

pub fn default_player_name(player_index: usize) -> String {
    format!("Player {player_index}")
}
