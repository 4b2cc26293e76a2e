use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::constants::{default_player_name, GHOST_COLORS, STARTING_LIVES};
use crate::maze::{ghost_home, player_spawn, Maze};
use crate::rng::Rng;
use crate::types::{
    Direction, DirectionIntent, GhostView, PlayerView, Snapshot, StartNames, Vec2,
};

mod collisions;
mod ghost_ai;
mod movement;
mod utils;

use self::utils::now_ms;

#[derive(Clone, Debug)]
struct PlayerInternal {
    view: PlayerView,
    spawn: Vec2,
    spawn_dir: Direction,
}

#[derive(Clone, Debug)]
struct GhostInternal {
    view: GhostView,
    baseline_color: Option<String>,
}

/// The whole match: two players, four ghosts in fixed role order, the
/// remaining collectibles and the session-wide timers. One engine value is
/// one session; a restart replaces the engine rather than mutating it back
/// into shape.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub started_at_ms: u64,
    maze: Maze,
    rng: Rng,
    players: [PlayerInternal; 2],
    ghosts: Vec<GhostInternal>,
    dots: BTreeSet<(i32, i32)>,
    pellets: BTreeSet<(i32, i32)>,
    power_until_ms: u64,
    elapsed_ms: u64,
    tick_counter: u64,
    ended: bool,
    winner: Option<String>,
}

impl GameEngine {
    pub fn new(names: StartNames, seed: u32) -> Self {
        let players = [
            make_player(1, names.player1),
            make_player(2, names.player2),
        ];
        let ghosts = (0..4)
            .map(|role| {
                let home = ghost_home(role);
                GhostInternal {
                    view: GhostView {
                        role,
                        x: home.x,
                        y: home.y,
                        dir: Direction::Left,
                        color: GHOST_COLORS[role].to_string(),
                        vulnerable: false,
                    },
                    baseline_color: None,
                }
            })
            .collect();

        Self {
            started_at_ms: now_ms(),
            maze: Maze::new(),
            rng: Rng::new(seed),
            players,
            ghosts,
            dots: Maze::initial_dots(),
            pellets: Maze::initial_pellets(),
            power_until_ms: 0,
            elapsed_ms: 0,
            tick_counter: 0,
            ended: false,
            winner: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Overwrites the pending facing direction of player 1 or 2. The write
    /// takes effect on the next tick; the last write before a tick wins. An
    /// intent with no flag set, or an index outside {1, 2}, changes nothing.
    pub fn set_intent(&mut self, player_index: usize, intent: DirectionIntent) -> bool {
        if !(1..=2).contains(&player_index) {
            return false;
        }
        if let Some(dir) = intent.resolve() {
            self.players[player_index - 1].view.dir = dir;
        }
        true
    }

    /// One full tick: timers, both player steps, every ghost's target pick
    /// and step, collision resolution, terminal evaluation. Entirely
    /// synchronous; a terminal session is never advanced.
    pub fn step(&mut self, dt_ms: u64) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.started_at_ms.saturating_add(self.elapsed_ms);

        collisions::advance_timers(self, now_ms);

        movement::step_player(&self.maze, &mut self.players[0]);
        movement::step_player(&self.maze, &mut self.players[1]);

        let power_active = self.power_active(now_ms);
        for idx in 0..self.ghosts.len() {
            let target = ghost_ai::select_target(
                &self.ghosts[idx].view,
                &self.players,
                power_active,
                &mut self.rng,
            );
            movement::step_ghost(&mut self.ghosts[idx], target, &mut self.rng);
        }

        collisions::resolve(self, now_ms);
        self.check_terminal();
    }

    fn power_active(&self, now_ms: u64) -> bool {
        self.power_until_ms != 0 && now_ms < self.power_until_ms
    }

    /// Terminal-state evaluation, in fixed order so that a later rule
    /// overrides an earlier one within the same tick: cleared maze first,
    /// then both players dead, then exactly one player dead (the survivor
    /// wins regardless of score).
    fn check_terminal(&mut self) {
        if self.dots.is_empty() && self.pellets.is_empty() {
            self.ended = true;
            self.winner = self.score_winner();
        }

        let dead = [
            self.players[0].view.lives <= 0,
            self.players[1].view.lives <= 0,
        ];
        if dead[0] && dead[1] {
            self.ended = true;
            self.winner = self.score_winner();
        } else if dead[0] != dead[1] {
            self.ended = true;
            let survivor = if dead[0] { 1 } else { 0 };
            self.winner = Some(self.players[survivor].view.name.clone());
        }
    }

    fn score_winner(&self) -> Option<String> {
        match self.players[0].view.score.cmp(&self.players[1].view.score) {
            Ordering::Greater => Some(self.players[0].view.name.clone()),
            Ordering::Less => Some(self.players[1].view.name.clone()),
            Ordering::Equal => None,
        }
    }

    pub fn build_snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.started_at_ms.saturating_add(self.elapsed_ms),
            power_active: self.power_active(self.started_at_ms.saturating_add(self.elapsed_ms)),
            power_until_ms: self.power_until_ms,
            players: self.players.iter().map(|p| p.view.clone()).collect(),
            ghosts: self.ghosts.iter().map(|g| g.view.clone()).collect(),
            dots: self.dots.iter().copied().collect(),
            pellets: self.pellets.iter().copied().collect(),
            ended: self.ended,
            winner: self.winner.clone(),
        }
    }

    /// Display name and score per player, for persistence at the terminal
    /// transition.
    pub fn final_scores(&self) -> Vec<(String, i32)> {
        self.players
            .iter()
            .map(|p| (p.view.name.clone(), p.view.score))
            .collect()
    }
}

fn make_player(player_index: usize, name: Option<String>) -> PlayerInternal {
    let (spawn, spawn_dir) = player_spawn(player_index);
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_player_name(player_index));
    PlayerInternal {
        view: PlayerView {
            name,
            x: spawn.x,
            y: spawn.y,
            dir: spawn_dir,
            score: 0,
            lives: STARTING_LIVES,
            invulnerable: false,
            invulnerable_until_ms: 0,
        },
        spawn,
        spawn_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        GRID_HEIGHT, GRID_WIDTH, INVULNERABLE_DURATION_MS, POWER_DURATION_MS, TICK_MS,
        VULNERABLE_COLOR,
    };
    use crate::maze::CellKind;

    fn make_engine(seed: u32) -> GameEngine {
        GameEngine::new(
            StartNames {
                player1: Some("Alice".to_string()),
                player2: Some("Bob".to_string()),
            },
            seed,
        )
    }

    fn intent(dir: Direction) -> DirectionIntent {
        DirectionIntent::from_direction(dir)
    }

    #[test]
    fn fresh_session_is_never_terminal() {
        let mut engine = make_engine(1);
        engine.check_terminal();
        assert!(!engine.is_ended());
        assert!(!engine.dots.is_empty());
        assert_eq!(engine.players[0].view.lives, STARTING_LIVES);
        assert_eq!(engine.players[1].view.lives, STARTING_LIVES);
    }

    #[test]
    fn empty_or_missing_names_fall_back_to_positional_defaults() {
        let engine = GameEngine::new(
            StartNames {
                player1: Some("   ".to_string()),
                player2: None,
            },
            1,
        );
        assert_eq!(engine.players[0].view.name, "Player 1");
        assert_eq!(engine.players[1].view.name, "Player 2");
    }

    #[test]
    fn ghosts_start_at_their_role_homes_in_fixed_order() {
        let engine = make_engine(3);
        assert_eq!(engine.ghosts.len(), 4);
        for (idx, ghost) in engine.ghosts.iter().enumerate() {
            assert_eq!(ghost.view.role, idx);
            let home = ghost_home(idx);
            assert_eq!((ghost.view.x, ghost.view.y), (home.x, home.y));
            assert!(ghost.baseline_color.is_none());
        }
    }

    #[test]
    fn set_intent_overwrites_pending_direction_and_rejects_bad_index() {
        let mut engine = make_engine(5);
        assert!(engine.set_intent(1, intent(Direction::Up)));
        assert!(engine.set_intent(1, intent(Direction::Down)));
        assert_eq!(engine.players[0].view.dir, Direction::Down);

        assert!(!engine.set_intent(0, intent(Direction::Up)));
        assert!(!engine.set_intent(3, intent(Direction::Up)));

        // An empty intent is accepted but changes nothing.
        assert!(engine.set_intent(1, DirectionIntent::default()));
        assert_eq!(engine.players[0].view.dir, Direction::Down);
    }

    #[test]
    fn blocked_player_stays_put_and_keeps_facing() {
        let mut engine = make_engine(7);
        assert_eq!(engine.maze.classify(0, 1), CellKind::Wall);
        engine.players[0].view.x = 1;
        engine.players[0].view.y = 1;
        engine.players[0].view.dir = Direction::Left;

        movement::step_player(&engine.maze, &mut engine.players[0]);
        assert_eq!(
            (engine.players[0].view.x, engine.players[0].view.y),
            (1, 1)
        );
        assert_eq!(engine.players[0].view.dir, Direction::Left);
    }

    #[test]
    fn player_wraps_through_the_tunnel_row() {
        let mut engine = make_engine(7);
        engine.players[0].view.x = 0;
        engine.players[0].view.y = 14;
        engine.players[0].view.dir = Direction::Left;

        movement::step_player(&engine.maze, &mut engine.players[0]);
        assert_eq!(
            (engine.players[0].view.x, engine.players[0].view.y),
            (GRID_WIDTH - 1, 14)
        );
    }

    #[test]
    fn ghosts_walk_through_walls() {
        let mut engine = make_engine(9);
        let ghost = &mut engine.ghosts[0];
        ghost.view.x = 13;
        ghost.view.y = 17;
        assert_eq!(engine.maze.classify(13, 16), CellKind::Wall);

        let target = Some(Vec2 { x: 13, y: 10 });
        movement::step_ghost(&mut engine.ghosts[0], target, &mut engine.rng);
        assert_eq!(
            (engine.ghosts[0].view.x, engine.ghosts[0].view.y),
            (13, 16)
        );
        assert_eq!(engine.ghosts[0].view.dir, Direction::Up);
    }

    #[test]
    fn ghost_axis_choice_prefers_horizontal_on_ties() {
        let mut engine = make_engine(11);
        engine.ghosts[0].view.x = 10;
        engine.ghosts[0].view.y = 10;

        // |dx| == |dy|: horizontal wins.
        movement::step_ghost(
            &mut engine.ghosts[0],
            Some(Vec2 { x: 13, y: 13 }),
            &mut engine.rng,
        );
        assert_eq!(
            (engine.ghosts[0].view.x, engine.ghosts[0].view.y),
            (11, 10)
        );
        assert_eq!(engine.ghosts[0].view.dir, Direction::Right);

        // |dy| > |dx|: vertical wins.
        movement::step_ghost(
            &mut engine.ghosts[0],
            Some(Vec2 { x: 12, y: 20 }),
            &mut engine.rng,
        );
        assert_eq!(
            (engine.ghosts[0].view.x, engine.ghosts[0].view.y),
            (11, 11)
        );
        assert_eq!(engine.ghosts[0].view.dir, Direction::Down);
    }

    #[test]
    fn ghost_facing_updates_even_when_the_step_is_rejected() {
        let mut engine = make_engine(13);
        engine.ghosts[0].view.x = 5;
        engine.ghosts[0].view.y = 0;
        engine.ghosts[0].view.dir = Direction::Left;

        movement::step_ghost(
            &mut engine.ghosts[0],
            Some(Vec2 { x: 5, y: -6 }),
            &mut engine.rng,
        );
        assert_eq!((engine.ghosts[0].view.x, engine.ghosts[0].view.y), (5, 0));
        assert_eq!(engine.ghosts[0].view.dir, Direction::Up);
    }

    #[test]
    fn role_targets_follow_the_spec_table() {
        let mut engine = make_engine(17);
        engine.players[0].view.x = 2;
        engine.players[0].view.y = 5;
        engine.players[1].view.x = 20;
        engine.players[1].view.y = 8;

        let target0 =
            ghost_ai::select_target(&engine.ghosts[0].view, &engine.players, false, &mut engine.rng)
                .expect("role 0 always has a target");
        assert_eq!((target0.x, target0.y), (2, 5));

        let target1 =
            ghost_ai::select_target(&engine.ghosts[1].view, &engine.players, false, &mut engine.rng)
                .expect("role 1 always has a target");
        assert_eq!((target1.x, target1.y), (20, 8));
    }

    #[test]
    fn score_leader_ghost_breaks_ties_toward_player_one() {
        let mut engine = make_engine(19);
        engine.players[0].view.x = 2;
        engine.players[0].view.y = 5;
        engine.players[1].view.x = 20;
        engine.players[1].view.y = 8;

        engine.players[0].view.score = 50;
        engine.players[1].view.score = 50;
        let tied =
            ghost_ai::select_target(&engine.ghosts[2].view, &engine.players, false, &mut engine.rng)
                .expect("role 2 always has a target");
        assert_eq!((tied.x, tied.y), (2, 5));

        engine.players[1].view.score = 60;
        let leader =
            ghost_ai::select_target(&engine.ghosts[2].view, &engine.players, false, &mut engine.rng)
                .expect("role 2 always has a target");
        assert_eq!((leader.x, leader.y), (20, 8));
    }

    #[test]
    fn random_ghost_chases_roughly_a_third_of_ticks() {
        let mut engine = make_engine(23);
        let mut chased = 0;
        for _ in 0..1_000 {
            if ghost_ai::select_target(
                &engine.ghosts[3].view,
                &engine.players,
                false,
                &mut engine.rng,
            )
            .is_some()
            {
                chased += 1;
            }
        }
        assert!((200..=400).contains(&chased), "chased {chased} of 1000");
    }

    #[test]
    fn fleeing_target_mirrors_away_from_the_nearer_player() {
        let mut engine = make_engine(29);
        engine.ghosts[0].view.x = 10;
        engine.ghosts[0].view.y = 10;
        engine.players[0].view.x = 8;
        engine.players[0].view.y = 10;
        engine.players[1].view.x = 20;
        engine.players[1].view.y = 20;

        let target =
            ghost_ai::select_target(&engine.ghosts[0].view, &engine.players, true, &mut engine.rng)
                .expect("fleeing ghosts always have a target");
        assert_eq!((target.x, target.y), (12, 10));
    }

    #[test]
    fn both_players_score_the_same_dot_which_is_removed_once() {
        let mut engine = make_engine(31);
        let cell = (1, 1);
        engine.dots = BTreeSet::from([cell]);
        engine.pellets.clear();
        engine.players[0].view.x = cell.0;
        engine.players[0].view.y = cell.1;
        engine.players[1].view.x = cell.0;
        engine.players[1].view.y = cell.1;

        let now = engine.started_at_ms;
        collisions::resolve(&mut engine, now);
        assert_eq!(engine.players[0].view.score, 10);
        assert_eq!(engine.players[1].view.score, 10);
        assert!(engine.dots.is_empty());
    }

    #[test]
    fn dot_set_never_grows_and_shrinks_by_at_most_two_per_tick() {
        let mut engine = make_engine(37);
        let mut previous = engine.dots.len();
        for tick in 0..400 {
            if tick % 7 == 0 {
                engine.set_intent(1, intent(Direction::Up));
                engine.set_intent(2, intent(Direction::Left));
            } else if tick % 11 == 0 {
                engine.set_intent(1, intent(Direction::Right));
                engine.set_intent(2, intent(Direction::Down));
            }
            engine.step(TICK_MS);
            let current = engine.dots.len();
            assert!(current <= previous);
            assert!(previous - current <= 2);
            previous = current;
            if engine.is_ended() {
                break;
            }
        }
    }

    #[test]
    fn all_positions_stay_in_bounds_over_many_ticks() {
        let mut engine = make_engine(41);
        for tick in 0..500 {
            if tick % 5 == 0 {
                engine.set_intent(1, intent(Direction::Left));
                engine.set_intent(2, intent(Direction::Up));
            }
            engine.step(TICK_MS);
            let snapshot = engine.build_snapshot();
            for player in &snapshot.players {
                assert!((0..GRID_WIDTH).contains(&player.x));
                assert!((0..GRID_HEIGHT).contains(&player.y));
            }
            for ghost in &snapshot.ghosts {
                assert!((0..GRID_WIDTH).contains(&ghost.x));
                assert!((0..GRID_HEIGHT).contains(&ghost.y));
            }
            if engine.is_ended() {
                break;
            }
        }
    }

    #[test]
    fn pellet_pickup_activates_power_mode_and_marks_ghosts_vulnerable() {
        let mut engine = make_engine(43);
        let cell = (1, 3);
        engine.pellets = BTreeSet::from([cell]);
        engine.players[0].view.x = cell.0;
        engine.players[0].view.y = cell.1;

        let now = engine.started_at_ms + 1_000;
        collisions::resolve(&mut engine, now);

        assert_eq!(engine.players[0].view.score, 50);
        assert_eq!(engine.power_until_ms, now + POWER_DURATION_MS);
        for (idx, ghost) in engine.ghosts.iter().enumerate() {
            assert!(ghost.view.vulnerable);
            assert_eq!(ghost.view.color, VULNERABLE_COLOR);
            assert_eq!(ghost.baseline_color.as_deref(), Some(GHOST_COLORS[idx]));
        }
    }

    #[test]
    fn power_mode_expires_by_wall_clock_and_restores_colors() {
        let mut engine = make_engine(47);
        let activation = engine.started_at_ms + 1_000;
        engine.power_until_ms = activation + POWER_DURATION_MS;
        for ghost in &mut engine.ghosts {
            ghost.baseline_color = Some(ghost.view.color.clone());
            ghost.view.color = VULNERABLE_COLOR.to_string();
            ghost.view.vulnerable = true;
        }

        collisions::advance_timers(&mut engine, activation + POWER_DURATION_MS - 1);
        assert_ne!(engine.power_until_ms, 0);
        assert!(engine.ghosts[0].view.vulnerable);

        collisions::advance_timers(&mut engine, activation + POWER_DURATION_MS);
        assert_eq!(engine.power_until_ms, 0);
        for (idx, ghost) in engine.ghosts.iter().enumerate() {
            assert!(!ghost.view.vulnerable);
            assert_eq!(ghost.view.color, GHOST_COLORS[idx]);
            assert!(ghost.baseline_color.is_none());
        }
    }

    #[test]
    fn eating_a_vulnerable_ghost_scores_and_sends_it_home() {
        let mut engine = make_engine(53);
        let now = engine.started_at_ms + 1_000;
        // Keep the cell free of collectibles so only the ghost scores.
        engine.dots.clear();
        engine.pellets.clear();
        engine.power_until_ms = now + POWER_DURATION_MS;
        let ghost = &mut engine.ghosts[2];
        ghost.baseline_color = Some(ghost.view.color.clone());
        ghost.view.color = VULNERABLE_COLOR.to_string();
        ghost.view.vulnerable = true;
        ghost.view.x = 5;
        ghost.view.y = 5;
        engine.players[1].view.x = 5;
        engine.players[1].view.y = 5;

        collisions::resolve(&mut engine, now);

        assert_eq!(engine.players[1].view.score, 200);
        let home = ghost_home(2);
        assert_eq!(
            (engine.ghosts[2].view.x, engine.ghosts[2].view.y),
            (home.x, home.y)
        );
        assert_eq!(engine.ghosts[2].view.color, GHOST_COLORS[2]);
        assert!(engine.ghosts[2].baseline_color.is_none());
        assert_eq!(engine.players[1].view.lives, STARTING_LIVES);
    }

    #[test]
    fn ghost_hit_costs_one_life_and_a_second_hit_that_tick_is_inert() {
        let mut engine = make_engine(59);
        let now = engine.started_at_ms + 1_000;
        engine.players[0].view.lives = 1;
        engine.players[0].view.x = 8;
        engine.players[0].view.y = 5;
        engine.ghosts[0].view.x = 8;
        engine.ghosts[0].view.y = 5;
        engine.ghosts[1].view.x = 8;
        engine.ghosts[1].view.y = 5;

        collisions::resolve(&mut engine, now);

        let player = &engine.players[0];
        assert_eq!(player.view.lives, 0);
        assert!(player.view.invulnerable);
        assert_eq!(
            player.view.invulnerable_until_ms,
            now + INVULNERABLE_DURATION_MS
        );
        assert_eq!((player.view.x, player.view.y), (player.spawn.x, player.spawn.y));
        assert_eq!(player.view.dir, player.spawn_dir);
    }

    #[test]
    fn invulnerable_player_ignores_ghost_contact() {
        let mut engine = make_engine(61);
        let now = engine.started_at_ms + 1_000;
        engine.players[0].view.invulnerable = true;
        engine.players[0].view.invulnerable_until_ms = now + 2_000;
        engine.players[0].view.x = 8;
        engine.players[0].view.y = 5;
        engine.ghosts[0].view.x = 8;
        engine.ghosts[0].view.y = 5;

        collisions::resolve(&mut engine, now);
        assert_eq!(engine.players[0].view.lives, STARTING_LIVES);
        assert_eq!((engine.players[0].view.x, engine.players[0].view.y), (8, 5));
    }

    #[test]
    fn invulnerability_clears_after_three_seconds() {
        let mut engine = make_engine(67);
        let activation = engine.started_at_ms + 500;
        engine.players[0].view.invulnerable = true;
        engine.players[0].view.invulnerable_until_ms = activation + INVULNERABLE_DURATION_MS;

        collisions::advance_timers(&mut engine, activation + INVULNERABLE_DURATION_MS - 1);
        assert!(engine.players[0].view.invulnerable);

        collisions::advance_timers(&mut engine, activation + INVULNERABLE_DURATION_MS);
        assert!(!engine.players[0].view.invulnerable);
        assert_eq!(engine.players[0].view.invulnerable_until_ms, 0);
    }

    #[test]
    fn clearing_the_maze_ends_the_match_with_the_higher_score_winning() {
        let mut engine = make_engine(71);
        let dot_cell = (1, 1);
        let pellet_cell = (1, 3);
        engine.dots = BTreeSet::from([dot_cell]);
        engine.pellets = BTreeSet::from([pellet_cell]);
        engine.players[0].view.x = dot_cell.0;
        engine.players[0].view.y = dot_cell.1;
        engine.players[0].view.score = 90;
        engine.players[1].view.x = pellet_cell.0;
        engine.players[1].view.y = pellet_cell.1;
        engine.players[1].view.score = 30;

        let now = engine.started_at_ms + 1_000;
        collisions::resolve(&mut engine, now);
        engine.check_terminal();

        assert_eq!(engine.players[0].view.score, 100);
        assert_eq!(engine.players[1].view.score, 80);
        assert!(engine.is_ended());
        assert_eq!(engine.winner(), Some("Alice"));
    }

    #[test]
    fn cleared_maze_with_tied_scores_has_no_winner() {
        let mut engine = make_engine(73);
        engine.dots.clear();
        engine.pellets.clear();
        engine.players[0].view.score = 120;
        engine.players[1].view.score = 120;

        engine.check_terminal();
        assert!(engine.is_ended());
        assert_eq!(engine.winner(), None);
    }

    #[test]
    fn lone_survivor_wins_regardless_of_score() {
        let mut engine = make_engine(79);
        engine.players[0].view.lives = 0;
        engine.players[0].view.score = 9_000;
        engine.players[1].view.lives = 3;
        engine.players[1].view.score = 10;

        engine.check_terminal();
        assert!(engine.is_ended());
        assert_eq!(engine.winner(), Some("Bob"));
    }

    #[test]
    fn both_dead_falls_back_to_score_comparison() {
        let mut engine = make_engine(83);
        engine.players[0].view.lives = 0;
        engine.players[0].view.score = 300;
        engine.players[1].view.lives = 0;
        engine.players[1].view.score = 200;

        engine.check_terminal();
        assert!(engine.is_ended());
        assert_eq!(engine.winner(), Some("Alice"));
    }

    #[test]
    fn terminal_session_is_never_advanced() {
        let mut engine = make_engine(89);
        engine.ended = true;
        let before = engine.build_snapshot();
        engine.step(TICK_MS);
        let after = engine.build_snapshot();
        assert_eq!(before.tick, after.tick);
        assert_eq!(before.dots.len(), after.dots.len());
    }

    #[test]
    fn same_seed_and_inputs_produce_identical_progressions() {
        let mut a = make_engine(424_242);
        let mut b = make_engine(424_242);
        b.started_at_ms = a.started_at_ms;

        for tick in 0..300 {
            if tick % 9 == 0 {
                a.set_intent(1, intent(Direction::Up));
                b.set_intent(1, intent(Direction::Up));
            }
            if tick % 13 == 0 {
                a.set_intent(2, intent(Direction::Right));
                b.set_intent(2, intent(Direction::Right));
            }
            a.step(TICK_MS);
            b.step(TICK_MS);

            let sa = a.build_snapshot();
            let sb = b.build_snapshot();
            for (pa, pb) in sa.players.iter().zip(sb.players.iter()) {
                assert_eq!((pa.x, pa.y), (pb.x, pb.y));
                assert_eq!(pa.score, pb.score);
                assert_eq!(pa.lives, pb.lives);
            }
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!((ga.x, ga.y), (gb.x, gb.y));
                assert_eq!(ga.vulnerable, gb.vulnerable);
            }
            assert_eq!(sa.dots.len(), sb.dots.len());
            if a.is_ended() || b.is_ended() {
                assert_eq!(a.is_ended(), b.is_ended());
                break;
            }
        }
    }

    #[test]
    fn final_scores_report_both_display_names() {
        let mut engine = make_engine(97);
        engine.players[0].view.score = 150;
        engine.players[1].view.score = 60;
        let scores = engine.final_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], ("Alice".to_string(), 150));
        assert_eq!(scores[1], ("Bob".to_string(), 60));
    }
}
