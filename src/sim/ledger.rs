//! Score and lives bookkeeping

use super::state::{EnemyKind, GameState};
use crate::consts::*;

/// Add points, saturating at `MAX_SCORE`
pub fn award(state: &mut GameState, points: u32) {
    state.score = state.score.saturating_add(points).min(MAX_SCORE);
}

/// Credit `count` kills of one enemy category
pub fn award_kills(state: &mut GameState, kind: EnemyKind, count: u32) {
    if count > 0 {
        award(state, kind.kill_score() * count);
    }
}

/// Grant one life if the score passed a new milestone
///
/// At most one life per call, so a large jump is paid out over several
/// frames. A finished game gets nothing. Returns true if a life was granted.
pub fn grant_bonus_life(state: &mut GameState) -> bool {
    if state.is_game_over() {
        return false;
    }
    if state.score / BONUS_LIFE_SCORE_STEP > state.save_lives {
        state.save_lives += 1;
        state.lives += 1;
        log::info!(
            "Bonus life at {} points ({} lives left)",
            state.score,
            state.lives
        );
        true
    } else {
        false
    }
}

/// The player was hit: lose a life and freeze for the death pause
pub fn player_hit(state: &mut GameState) {
    state.lives -= 1;
    state.pause_timer = DEATH_PAUSE_FRAMES;
    if state.is_game_over() {
        log::info!("Game over with {} points", state.score);
    } else {
        log::debug!("Player destroyed, {} lives left", state.lives);
    }
}
