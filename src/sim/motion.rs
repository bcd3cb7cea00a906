//! Player flight model and world wraparound
//!
//! The world is a ring `WRAP_SPAN` pixels around. Positions are stored
//! unbounded; anything drifting more than `WRAP_HORIZON` from the player is
//! translated by a full span so it reappears on the near side.

use super::action::Action;
use super::state::{Facing, Player};
use crate::consts::*;

/// Shortest signed distance from `from` to `to` on the world ring
///
/// Result is in `[-WRAP_HORIZON, WRAP_HORIZON)`.
#[inline]
pub fn wrap_delta(from: f32, to: f32) -> f32 {
    (to - from + WRAP_HORIZON).rem_euclid(WRAP_SPAN) - WRAP_HORIZON
}

/// Bring `x` back within `WRAP_HORIZON` of the player, if it strayed
#[inline]
pub fn wrap_toward(x: f32, player_x: f32) -> f32 {
    let delta = player_x - x;
    if delta.abs() > WRAP_HORIZON {
        x + delta.signum() * WRAP_SPAN
    } else {
        x
    }
}

/// Player's horizontal screen position (left edge of the sprite)
///
/// The chopper sits left or right of centre by its offset and is pulled
/// toward the centre while flying fast.
#[inline]
pub fn on_screen_position(player: &Player) -> f32 {
    (WIDTH / 2) as f32 - 8.0
        + player.screen_offset as f32
        + player.velocity_x * DISTANCE_WHEN_FLYING
}

/// Visible world window `[left, right)` around the player
pub fn visible_window(player: &Player) -> (f32, f32) {
    let left = player.x - on_screen_position(player);
    (left, left + WIDTH as f32)
}

/// Advance the player by one frame of input
pub fn integrate_player(player: &mut Player, action: Action) {
    let (left, right) = (action.left(), action.right());

    if right {
        player.facing = Facing::Right;
    } else if left {
        player.facing = Facing::Left;
    }

    let accel = if right {
        ACCEL
    } else if left {
        -ACCEL
    } else {
        0.0
    };

    let mut velocity = (player.velocity_x + accel).clamp(-MAX_VELOCITY, MAX_VELOCITY);
    if !(left || right) {
        velocity *= 1.0 - FRICTION;
    }
    if !velocity.is_finite() {
        debug_assert!(false, "non-finite player velocity");
        velocity = 0.0;
    }
    player.velocity_x = velocity;
    player.x += velocity;

    let dy = if action.up() {
        -1
    } else if action.down() {
        1
    } else {
        0
    };
    player.y = (player.y + dy).clamp(PLAYER_MIN_Y, PLAYER_MAX_Y);

    // Facing right pushes the chopper toward the left of the screen
    let shift = -(player.facing.sign() as i32) * LOCAL_PLAYER_OFFSET_SPEED;
    player.screen_offset =
        (player.screen_offset + shift).clamp(-MAX_SCREEN_OFFSET, MAX_SCREEN_OFFSET);
}

/// No-move pause: slide toward the start position.
///
/// Returns true once the chopper is far enough left to accept input.
pub fn slide_to_start(player: &mut Player) -> bool {
    if on_screen_position(player) <= ALLOW_MOVE_OFFSET {
        return true;
    }
    player.screen_offset = (player.screen_offset - LOCAL_PLAYER_OFFSET_SPEED)
        .clamp(-MAX_SCREEN_OFFSET, MAX_SCREEN_OFFSET);
    false
}
