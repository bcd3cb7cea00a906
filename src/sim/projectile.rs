//! Player missile and enemy bombs
//!
//! The player's missile is a long horizontal beam that flies with the
//! chopper's momentum. Enemy missiles drop from their owner and may split
//! into an upper and lower half that fly apart vertically.

use rand::Rng;

use super::motion::{on_screen_position, wrap_toward};
use super::state::{
    Enemy, EnemyKind, EnemyMissile, MissilePair, Player, PlayerMissile, RngSite, RngState,
    SplitState,
};
use crate::consts::*;

/// Advance the player's missiles and fire a new one if allowed
///
/// `can_spawn` is false while the game is paused. Returns true if a missile
/// was fired this frame.
pub fn step_player_missiles(
    missiles: &mut [PlayerMissile],
    cooldown: &mut u32,
    player: &Player,
    fire: bool,
    can_spawn: bool,
) -> bool {
    *cooldown = cooldown.saturating_sub(1);

    let on_screen = on_screen_position(player);
    let left_bound = player.x - on_screen - PLAYER_MISSILE_SIZE.0;
    let right_bound = player.x + (WIDTH as f32 - on_screen);

    for missile in missiles.iter_mut().filter(|m| m.is_active()) {
        missile.x += missile.direction as f32 * MISSILE_SPEED + player.velocity_x;
        if missile.x < left_bound || missile.x > right_bound {
            log::trace!("Player missile left the screen at x={:.1}", missile.x);
            *missile = PlayerMissile::EMPTY;
        }
    }

    if !(fire && can_spawn && *cooldown == 0) {
        return false;
    }

    let Some(slot) = missiles.iter_mut().find(|m| !m.is_active()) else {
        return false;
    };

    let direction = player.facing.sign();
    let x = if direction < 0 {
        player.x - PLAYER_MISSILE_SIZE.0
    } else {
        player.x + PLAYER_SIZE.0
    };
    *slot = PlayerMissile {
        x,
        y: (player.y + MISSILE_Y_OFFSET) as f32,
        direction,
        spawn_x: x,
    };
    *cooldown = MISSILE_COOLDOWN_FRAMES;
    log::trace!("Player missile fired at x={x:.1}");
    true
}

/// Advance every enemy missile pair, splitting and spawning as the dice say
///
/// Pair `p` belongs to jet `p` for `p < MAX_JETS`, otherwise to chopper
/// `p - MAX_JETS`. Only runs during normal play; pauses freeze every pair.
pub fn step_enemy_missiles(
    pairs: &mut [MissilePair; MAX_ENEMIES],
    jets: &[Enemy; MAX_JETS],
    choppers: &[Enemy; MAX_CHOPPERS],
    player_x: f32,
    rng: &RngState,
) {
    for (index, pair) in pairs.iter_mut().enumerate() {
        let (kind, owner) = if index < MAX_JETS {
            (EnemyKind::Jet, &jets[index])
        } else {
            (EnemyKind::Chopper, &choppers[index - MAX_JETS])
        };

        if pair.is_dead() {
            if owner.is_alive() {
                let mut stream = rng.stream(RngSite::MissileSpawn, index);
                if stream.random_bool(ENEMY_MISSILE_SPAWN_PROBABILITY) {
                    let speed =
                        stream.random_range(ENEMY_MISSILE_MIN_SPEED..ENEMY_MISSILE_MAX_SPEED);
                    *pair = drop_pair(owner, kind, speed);
                    log::trace!("{kind:?} {index} dropped a missile (speed {speed:.2})");
                }
            }
            continue;
        }

        if can_split(pair)
            && rng
                .stream(RngSite::MissileSplit, index)
                .random_bool(ENEMY_MISSILE_SPLIT_PROBABILITY)
        {
            split(pair);
        }

        for missile in pair.missiles_mut() {
            if missile.is_dead() {
                continue;
            }
            missile.y += missile.y_velocity;
            missile.x = wrap_toward(missile.x, player_x);
            if !(ENEMY_MISSILE_MIN_Y..=ENEMY_MISSILE_MAX_Y).contains(&missile.y) {
                *missile = EnemyMissile::DEAD;
            }
        }
    }
}

/// Both halves at the owner's centre-bottom, falling together
fn drop_pair(owner: &Enemy, kind: EnemyKind, speed: f32) -> MissilePair {
    let size = kind.size();
    let missile = EnemyMissile {
        x: owner.x + size.x / 2.0 - ENEMY_MISSILE_SIZE.0 / 2.0,
        y: owner.y + size.y,
        y_velocity: speed,
        split: SplitState::Unsplit,
    };
    MissilePair {
        upper: missile,
        lower: missile,
    }
}

fn can_split(pair: &MissilePair) -> bool {
    pair.missiles()
        .iter()
        .all(|m| !m.is_dead() && m.split == SplitState::Unsplit)
}

fn split(pair: &mut MissilePair) {
    pair.upper.y_velocity = -ENEMY_MISSILE_SPLIT_SPEED;
    pair.lower.y_velocity = ENEMY_MISSILE_SPLIT_SPEED;
    pair.upper.split = SplitState::Split;
    pair.lower.split = SplitState::Split;
    log::trace!("Enemy missile split at y={:.1}", pair.upper.y);
}
