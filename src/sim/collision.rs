//! Collision detection
//!
//! Everything is axis-aligned boxes in world space. Two wrinkles: the
//! player's missile only hits what is on screen, and the chopper is drawn
//! shifted by its speed, so bodies are tested where the renderer puts them.

use glam::Vec2;

use super::state::{Enemy, EnemyKind, EnemyMissile, MissilePair, Player, PlayerMissile, Truck};
use crate::consts::*;

/// Something the player can crash into
pub trait Target {
    fn pos(&self) -> Vec2;
    fn is_alive(&self) -> bool;
    /// Start the death animation; false if already dying or gone
    fn kill(&mut self) -> bool;
}

impl Target for Enemy {
    fn pos(&self) -> Vec2 {
        Enemy::pos(self)
    }

    fn is_alive(&self) -> bool {
        Enemy::is_alive(self)
    }

    fn kill(&mut self) -> bool {
        Enemy::kill(self)
    }
}

impl Target for Truck {
    fn pos(&self) -> Vec2 {
        Truck::pos(self)
    }

    fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    fn kill(&mut self) -> bool {
        Truck::kill(self)
    }
}

/// Strict AABB overlap: touching edges do not count
#[inline]
pub fn overlap(pos_a: Vec2, size_a: Vec2, pos_b: Vec2, size_b: Vec2) -> bool {
    pos_a.x < pos_b.x + size_b.x
        && pos_b.x < pos_a.x + size_a.x
        && pos_a.y < pos_b.y + size_b.y
        && pos_b.y < pos_a.y + size_a.y
}

/// Does the box overlap any of `others` (all of size `size_b`)?
pub fn overlap_any(
    pos: Vec2,
    size: Vec2,
    others: impl IntoIterator<Item = Vec2>,
    size_b: Vec2,
) -> bool {
    others.into_iter().any(|other| overlap(pos, size, other, size_b))
}

/// Clip a box's horizontal extent to `[left, right)`
///
/// Returns the clipped position and size, or `None` if nothing is left.
pub fn clip_to_window(pos: Vec2, size: Vec2, left: f32, right: f32) -> Option<(Vec2, Vec2)> {
    let clipped_left = pos.x.max(left);
    let clipped_right = (pos.x + size.x).min(right);
    let width = clipped_right - clipped_left;
    (width > 0.0).then(|| (Vec2::new(clipped_left, pos.y), Vec2::new(width, size.y)))
}

/// Horizontal shift from world to drawn position for a sprite of `width`
/// tested against the player
#[inline]
pub fn body_correction(player: &Player, width: f32) -> f32 {
    (PLAYER_SIZE.0 / 2.0 - width / 2.0) - player.velocity_x * DISTANCE_WHEN_FLYING
}

/// Player missiles against one enemy category
///
/// A hit kills the enemy and empties the missile slot. Returns the number of
/// kills.
pub fn missile_hits(
    missiles: &mut [PlayerMissile],
    enemies: &mut [Enemy],
    kind: EnemyKind,
    (left, right): (f32, f32),
) -> u32 {
    let enemy_size = kind.size();
    let mut kills = 0;

    for missile in missiles.iter_mut().filter(|m| m.is_active()) {
        let Some((pos, size)) = clip_to_window(missile.pos(), PlayerMissile::size(), left, right)
        else {
            continue;
        };

        let hit = enemies
            .iter_mut()
            .enumerate()
            .find(|(_, e)| e.is_alive() && overlap(pos, size, e.pos(), enemy_size));

        if let Some((slot, enemy)) = hit {
            enemy.kill();
            *missile = PlayerMissile::EMPTY;
            kills += 1;
            log::debug!("Missile destroyed {kind:?} in slot {slot}");
        }
    }

    kills
}

/// Player body against a row of targets of one size
///
/// Every overlapping target starts dying. Returns whether the player was hit
/// and how many targets were destroyed.
pub fn body_hits<T: Target>(player: &Player, rows: &mut [T], size: Vec2) -> (bool, u32) {
    let shift = Vec2::new(body_correction(player, size.x), 0.0);
    let mut count = 0;

    for row in rows.iter_mut() {
        if row.is_alive() && overlap(player.pos(), Player::size(), row.pos() + shift, size) {
            row.kill();
            count += 1;
        }
    }

    (count > 0, count)
}

/// Enemy missiles against the player; a missile that hits is removed
pub fn enemy_missile_hits(player: &Player, pairs: &mut [MissilePair]) -> bool {
    let size = EnemyMissile::size();
    let shift = Vec2::new(body_correction(player, size.x), 0.0);
    let mut hit = false;

    for missile in pairs.iter_mut().flat_map(|p| p.missiles_mut()) {
        if !missile.is_dead() && overlap(player.pos(), Player::size(), missile.pos() + shift, size) {
            *missile = EnemyMissile::DEAD;
            hit = true;
        }
    }

    hit
}
