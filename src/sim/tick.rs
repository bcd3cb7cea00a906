//! Frame step
//!
//! Advances the game state by exactly one frame. The phase derived from
//! `pause_timer` picks which systems run; every phase counts the frame.

use super::action::Action;
use super::collision::{body_hits, enemy_missile_hits, missile_hits};
use super::enemy::{self, FleetContext};
use super::ledger;
use super::motion::{integrate_player, slide_to_start, visible_window};
use super::projectile::{step_enemy_missiles, step_player_missiles};
use super::state::{Enemy, EnemyKind, GamePhase, GameState, Life, PAUSE_PLAYING, RngSite, Truck};
use crate::consts::*;
use crate::settings::Settings;

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, action: Action, settings: &Settings) {
    match state.phase() {
        GamePhase::Playing => play_frame(state, action, settings),
        GamePhase::DeathPause { frames_left } => pause_frame(state, frames_left),
        GamePhase::NoMovePause => no_move_frame(state, action),
        GamePhase::Respawn => respawn(state, settings),
    }
    state.step_counter += 1;
}

/// Normal play
fn play_frame(state: &mut GameState, action: Action, settings: &Settings) {
    state.player_collision = false;

    integrate_player(&mut state.player, action);
    let player_x = state.player.x;

    let ctx = FleetContext::new(
        &state.trucks,
        player_x,
        state.enemy_speed,
        state.difficulty.speed_factor(),
    );
    enemy::move_enemies(&mut state.jets, EnemyKind::Jet, &state.trucks, &ctx, &state.rng);
    enemy::move_enemies(&mut state.choppers, EnemyKind::Chopper, &state.trucks, &ctx, &state.rng);

    step_enemy_missiles(
        &mut state.enemy_missiles,
        &state.jets,
        &state.choppers,
        player_x,
        &state.rng,
    );
    step_player_missiles(
        &mut state.player_missiles,
        &mut state.player_missile_cooldown,
        &state.player,
        action.fire(),
        true,
    );

    tick_deaths(state);

    let window = visible_window(&state.player);
    let mut jet_kills =
        missile_hits(&mut state.player_missiles, &mut state.jets, EnemyKind::Jet, window);
    let mut chopper_kills = missile_hits(
        &mut state.player_missiles,
        &mut state.choppers,
        EnemyKind::Chopper,
        window,
    );

    let mut hit = false;
    if settings.player_collision {
        let (jet_hit, jets) = body_hits(&state.player, &mut state.jets, EnemyKind::Jet.size());
        let (chopper_hit, choppers) =
            body_hits(&state.player, &mut state.choppers, EnemyKind::Chopper.size());
        let (truck_hit, _) = body_hits(&state.player, &mut state.trucks, Truck::size());
        let missile_hit = enemy_missile_hits(&state.player, &mut state.enemy_missiles);

        jet_kills += jets;
        chopper_kills += choppers;
        hit = jet_hit || chopper_hit || truck_hit || missile_hit;
    }

    enemy::move_convoy(&mut state.trucks, player_x);

    ledger::award_kills(state, EnemyKind::Jet, jet_kills);
    ledger::award_kills(state, EnemyKind::Chopper, chopper_kills);
    ledger::grant_bonus_life(state);

    state.player_collision = hit;
    if hit {
        ledger::player_hit(state);
    } else if state.all_enemies_dead() {
        state.pause_timer = DEATH_PAUSE_FRAMES;
        log::info!(
            "Wave {} cleared, {} trucks survive",
            state.wave + 1,
            state.alive_trucks()
        );
    }

    state.rng.advance();
}

/// Frozen countdown after a death or wave clear
fn pause_frame(state: &mut GameState, frames_left: u32) {
    tick_deaths(state);
    step_player_missiles(
        &mut state.player_missiles,
        &mut state.player_missile_cooldown,
        &state.player,
        false,
        false,
    );

    // Surviving trucks are cashed in one by one; a finished game scores nothing
    if state.all_enemies_dead() && !state.is_game_over() {
        let elapsed = DEATH_PAUSE_FRAMES - frames_left;
        if elapsed % TRUCK_SWEEP_INTERVAL == 0
            && enemy::sweep_next_truck(&mut state.trucks, state.player.x)
        {
            ledger::award(state, TRUCK_BONUS_SCORE);
        }
    }
    ledger::grant_bonus_life(state);

    // Game over holds the pause forever
    state.pause_timer = if state.is_game_over() {
        (frames_left - 1).max(1)
    } else {
        frames_left - 1
    };
}

/// Chopper slides to its start position; the first real input starts play
fn no_move_frame(state: &mut GameState, action: Action) {
    if slide_to_start(&mut state.player) && action != Action::Noop {
        state.pause_timer = PAUSE_PLAYING;
        log::debug!("Round started at frame {}", state.step_counter);
    }
}

/// Rebuild the world for the next round
fn respawn(state: &mut GameState, settings: &Settings) {
    let was_wave_clear = state.all_enemies_dead();
    let layout = Settings {
        difficulty: state.difficulty,
        ..settings.clone()
    };
    let template = GameState::new(state.rng.derive_seed(RngSite::RespawnLayout), &layout);
    *state = merge_on_respawn(state, template, was_wave_clear);

    if was_wave_clear {
        log::info!(
            "Wave {} begins, enemy speed bonus {:.2}",
            state.wave + 1,
            state.enemy_speed
        );
    } else {
        log::debug!("Respawned with {} lives", state.lives);
    }
}

/// Combine the finished round with a freshly built one
///
/// The template supplies the player, projectiles and phase. Progress
/// (score, lives, speed, counters, RNG) carries over. After a death the
/// surviving fleet keeps its composition and losses; after a wave clear the
/// template's new fleet and full convoy take over.
pub fn merge_on_respawn(
    continuing: &GameState,
    template: GameState,
    was_wave_clear: bool,
) -> GameState {
    let mut next = template;

    next.score = continuing.score;
    next.lives = continuing.lives;
    next.save_lives = continuing.save_lives;
    next.difficulty = continuing.difficulty;
    next.step_counter = continuing.step_counter;
    next.rng = continuing.rng;
    next.observation_history = continuing.observation_history.clone();

    if was_wave_clear {
        next.enemy_speed =
            (continuing.enemy_speed + ENEMY_SPEED_WAVE_INCREMENT).min(MAX_ENEMY_SPEED_BONUS);
        next.wave = continuing.wave + 1;
        return next;
    }

    next.enemy_speed = continuing.enemy_speed;
    next.wave = continuing.wave;

    for (slot, (row, old)) in next.jets.iter_mut().zip(&continuing.jets).enumerate() {
        *row = regroup(slot, old);
    }
    for (slot, (row, old)) in next.choppers.iter_mut().zip(&continuing.choppers).enumerate() {
        *row = regroup(slot, old);
    }
    for (row, old) in next.trucks.iter_mut().zip(&continuing.trucks) {
        row.life = old.life;
        if old.life.is_dead() {
            row.direction = 0;
        }
    }

    next
}

/// Surviving enemy back at its starting position
fn regroup(slot: usize, old: &Enemy) -> Enemy {
    match old.life {
        Life::Dead => Enemy::EMPTY,
        Life::Alive(_) => enemy::home(slot),
        Life::Dying(frames_left) => Enemy {
            life: Life::Dying(frames_left),
            ..enemy::home(slot)
        },
    }
}

/// Advance every death animation by one frame
fn tick_deaths(state: &mut GameState) {
    for truck in state.trucks.iter_mut() {
        truck.tick_death();
    }
    for enemy in state.jets.iter_mut().chain(state.choppers.iter_mut()) {
        enemy.tick_death();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::motion::on_screen_position;
    use crate::sim::state::{Lane, PAUSE_NO_MOVE};

    /// Run no-ops until the chopper may move, then start the round
    fn start_round(state: &mut GameState, settings: &Settings) {
        while on_screen_position(&state.player) > ALLOW_MOVE_OFFSET {
            tick(state, Action::Noop, settings);
            assert_eq!(state.phase(), GamePhase::NoMovePause);
        }
        tick(state, Action::Noop, settings);
        assert_eq!(state.phase(), GamePhase::NoMovePause);
        tick(state, Action::Down, settings);
        assert_eq!(state.phase(), GamePhase::Playing);
    }

    /// A playing state with a single jet parked in front of the player
    fn jet_collision_state() -> GameState {
        let mut state = GameState::new(5, &Settings::default());
        state.pause_timer = PAUSE_PLAYING;
        state.jets = [Enemy::EMPTY; MAX_JETS];
        state.choppers = [Enemy::EMPTY; MAX_CHOPPERS];
        state.player.x = state.trucks[6].x;
        state.jets[0] = Enemy::spawn(state.player.x, Lane::band_middle(1));
        state
    }

    #[test]
    fn test_no_move_pause_waits_for_input() {
        let settings = Settings::default();
        let mut state = GameState::new(1, &settings);
        let x = state.player.x;
        for _ in 0..200 {
            tick(&mut state, Action::Noop, &settings);
        }
        assert_eq!(state.phase(), GamePhase::NoMovePause);
        assert_eq!(state.player.x, x);
        assert_eq!(state.step_counter, 200);
        assert!(on_screen_position(&state.player) <= ALLOW_MOVE_OFFSET);

        tick(&mut state, Action::RightFire, &settings);
        assert_eq!(state.pause_timer, PAUSE_PLAYING);
        assert!(!state.player_missiles[0].is_active());
    }

    #[test]
    fn test_held_fire_respects_cooldown() {
        let settings = Settings::default();
        let mut state = GameState::new(42, &settings);
        start_round(&mut state, &settings);

        let mut spawns = 0;
        for _ in 0..20 {
            let before = state.player_missile_cooldown;
            tick(&mut state, Action::Fire, &settings);
            if state.player_missile_cooldown == MISSILE_COOLDOWN_FRAMES {
                assert!(before <= 1, "fired with cooldown {before}");
                spawns += 1;
            }
        }
        assert!(spawns >= 1);
        assert!(spawns <= 20 / MISSILE_COOLDOWN_FRAMES + 1);
    }

    #[test]
    fn test_jet_collision_costs_a_life() {
        let settings = Settings::default();
        let mut state = jet_collision_state();
        tick(&mut state, Action::Noop, &settings);

        assert!(state.player_collision);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.jets[0].life, Life::Dying(FRAMES_DEATH_ANIMATION_ENEMY));
        assert_eq!(state.pause_timer, DEATH_PAUSE_FRAMES);
        assert_eq!(state.score, SCORE_PER_JET_KILL);
    }

    #[test]
    fn test_collision_disabled_by_settings() {
        let settings = Settings {
            player_collision: false,
            ..Default::default()
        };
        let mut state = jet_collision_state();
        tick(&mut state, Action::Noop, &settings);
        assert!(!state.player_collision);
        assert_eq!(state.lives, STARTING_LIVES);
        assert!(state.jets[0].is_alive());
        assert_eq!(state.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_death_pause_then_respawn() {
        let settings = Settings::default();
        let mut state = jet_collision_state();
        state.jets[1] = enemy::home(1);
        tick(&mut state, Action::Noop, &settings);
        assert_eq!(state.pause_timer, DEATH_PAUSE_FRAMES);

        for _ in 0..DEATH_PAUSE_FRAMES {
            tick(&mut state, Action::Fire, &settings);
        }
        assert_eq!(state.phase(), GamePhase::Respawn);
        assert!(!state.player_missiles[0].is_active());
        // The surviving jet kept every truck alive through the pause
        assert_eq!(state.alive_trucks(), MAX_TRUCKS);

        tick(&mut state, Action::Noop, &settings);
        assert_eq!(state.phase(), GamePhase::NoMovePause);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.wave, 0);
        assert_eq!(state.jets[0], Enemy::EMPTY);
        assert_eq!(state.jets[1], enemy::home(1));
        assert_eq!(state.step_counter, 2 + DEATH_PAUSE_FRAMES as u64);
    }

    #[test]
    fn test_game_over_pause_never_ends() {
        let settings = Settings::default();
        let mut state = jet_collision_state();
        state.lives = 0;
        tick(&mut state, Action::Noop, &settings);
        assert!(state.is_game_over());

        for _ in 0..200 {
            tick(&mut state, Action::Fire, &settings);
            assert!(matches!(state.phase(), GamePhase::DeathPause { .. }));
        }
        assert_eq!(state.pause_timer, 1);
        assert_eq!(state.lives, -1);
    }

    #[test]
    fn test_game_over_skips_truck_sweep() {
        let settings = Settings::default();
        let mut state = jet_collision_state();
        state.lives = 0;
        state.score = 9_000;
        tick(&mut state, Action::Noop, &settings);
        assert!(state.is_game_over());
        let score = state.score;

        for _ in 0..2 * DEATH_PAUSE_FRAMES {
            tick(&mut state, Action::Noop, &settings);
            assert!(state.is_game_over());
        }
        assert!(state.all_enemies_dead());
        assert_eq!(state.score, score);
        assert_eq!(state.alive_trucks(), MAX_TRUCKS);
    }

    #[test]
    fn test_enemy_missiles_frozen_during_pause() {
        let settings = Settings::default();
        let mut state = jet_collision_state();
        state.jets[1] = enemy::home(1);
        tick(&mut state, Action::Noop, &settings);
        assert_eq!(state.pause_timer, DEATH_PAUSE_FRAMES);

        let missiles = state.enemy_missiles;
        for _ in 0..DEATH_PAUSE_FRAMES - 1 {
            tick(&mut state, Action::Noop, &settings);
            assert_eq!(state.enemy_missiles, missiles);
        }
    }

    #[test]
    fn test_wave_clear_sweeps_convoy() {
        let settings = Settings::default();
        let mut state = GameState::new(8, &settings);
        state.pause_timer = PAUSE_PLAYING;
        state.jets = [Enemy::EMPTY; MAX_JETS];
        state.choppers = [Enemy::EMPTY; MAX_CHOPPERS];

        tick(&mut state, Action::Noop, &settings);
        assert_eq!(state.pause_timer, DEATH_PAUSE_FRAMES);
        let trucks_at_clear = state.alive_trucks() as u32;
        assert_eq!(trucks_at_clear, MAX_TRUCKS as u32);

        for _ in 0..DEATH_PAUSE_FRAMES {
            tick(&mut state, Action::Noop, &settings);
        }
        assert_eq!(state.pause_timer, 0);
        assert_eq!(state.alive_trucks(), 0);
        assert_eq!(state.score, trucks_at_clear * TRUCK_BONUS_SCORE);

        tick(&mut state, Action::Noop, &settings);
        assert_eq!(state.phase(), GamePhase::NoMovePause);
        assert_eq!(state.wave, 1);
        assert_eq!(state.enemy_speed, ENEMY_SPEED_WAVE_INCREMENT);
        assert_eq!(state.alive_trucks(), MAX_TRUCKS);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.score, trucks_at_clear * TRUCK_BONUS_SCORE);
    }

    #[test]
    fn test_merge_after_death_keeps_losses() {
        let settings = Settings::default();
        let mut continuing = GameState::new(3, &settings);
        continuing.score = 4_200;
        continuing.lives = 1;
        continuing.enemy_speed = 0.5;
        continuing.step_counter = 900;
        continuing.jets[0] = Enemy::EMPTY;
        continuing.choppers[0] = Enemy::EMPTY;
        continuing.trucks[2].life = Life::Dead;
        continuing.trucks[2].direction = 0;
        continuing.player.x = 333.0;
        continuing.pause_timer = 0;

        let template = GameState::new(77, &settings);
        let next = merge_on_respawn(&continuing, template.clone(), false);

        assert_eq!(next.score, 4_200);
        assert_eq!(next.lives, 1);
        assert_eq!(next.enemy_speed, 0.5);
        assert_eq!(next.step_counter, 900);
        assert_eq!(next.player, template.player);
        assert_eq!(next.pause_timer, PAUSE_NO_MOVE);
        assert_eq!(next.jets[0], Enemy::EMPTY);
        assert_eq!(next.choppers[0], Enemy::EMPTY);
        assert_eq!(next.trucks[2].x, template.trucks[2].x);
        assert_eq!(next.trucks[2].direction, 0);
        assert!(next.trucks[3].life.is_alive());
        for slot in 1..MAX_JETS {
            assert_eq!(next.jets[slot].is_alive(), continuing.jets[slot].is_alive());
            assert_eq!(next.choppers[slot].is_alive(), continuing.choppers[slot].is_alive());
        }
    }

    #[test]
    fn test_merge_after_wave_clear_uses_template() {
        let settings = Settings::default();
        let mut continuing = GameState::new(3, &settings);
        continuing.jets = [Enemy::EMPTY; MAX_JETS];
        continuing.choppers = [Enemy::EMPTY; MAX_CHOPPERS];
        continuing.enemy_speed = 1.9;
        continuing.wave = 6;

        let template = GameState::new(77, &settings);
        let next = merge_on_respawn(&continuing, template.clone(), true);
        assert_eq!(next.jets, template.jets);
        assert_eq!(next.choppers, template.choppers);
        assert_eq!(next.trucks, template.trucks);
        assert_eq!(next.enemy_speed, MAX_ENEMY_SPEED_BONUS);
        assert_eq!(next.wave, 7);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let mut a = GameState::new(99_999, &settings);
        let mut b = GameState::new(99_999, &settings);
        for frame in 0..600u32 {
            let action = Action::from_index((frame * 7 % 18) as u8);
            tick(&mut a, action, &settings);
            tick(&mut b, action, &settings);
        }
        assert_eq!(a, b);
    }
}
