//! Enemy fleets and the truck convoy
//!
//! Four convoy groups of three trucks roll left through the world. Each group
//! has a fleet of three enemies above it. Only the fleet over the player's
//! own convoy group flies under AI; the others drift with the convoy so the
//! formation stays intact until the player reaches them.

use rand::Rng;
use rand_pcg::Pcg32;

use super::motion::{wrap_delta, wrap_toward};
use super::state::{Enemy, EnemyKind, Lane, Life, RngSite, RngState, Truck};
use crate::consts::*;

/// Per-frame inputs shared by every enemy's AI
#[derive(Debug, Clone, Copy)]
pub struct FleetContext {
    pub player_x: f32,
    /// Convoy anchor nearest the player
    pub player_anchor: usize,
    /// Wave bonus added to base speeds
    pub speed_bonus: f32,
    /// Difficulty multiplier
    pub speed_factor: f32,
}

impl FleetContext {
    pub fn new(trucks: &[Truck], player_x: f32, speed_bonus: f32, speed_factor: f32) -> Self {
        Self {
            player_x,
            player_anchor: nearest_anchor(trucks, player_x),
            speed_bonus,
            speed_factor,
        }
    }
}

/// Initial convoy: four groups, 32px apart inside a group
pub fn spawn_convoy() -> [Truck; MAX_TRUCKS] {
    std::array::from_fn(|i| {
        let group = (i / TRUCKS_PER_GROUP) as f32;
        let within = (i % TRUCKS_PER_GROUP) as f32;
        Truck::new(TRUCK_FIRST_X + group * FLEET_SPACING + within * TRUCK_GAP)
    })
}

/// Initial fleets: one per convoy group, a random mix of jets and choppers
///
/// Unit `i` of a fleet starts in the middle lane of band `i`. Fleet `f`
/// uses slots `3f..3f+3` of both arrays; slots not taken stay empty.
pub fn spawn_fleets(rng: &mut Pcg32) -> ([Enemy; MAX_JETS], [Enemy; MAX_CHOPPERS]) {
    let mut jets = [Enemy::EMPTY; MAX_JETS];
    let mut choppers = [Enemy::EMPTY; MAX_CHOPPERS];

    for fleet in 0..FLEET_COUNT {
        let chopper_count = rng.random_range(0..=UNITS_PER_FLEET);

        for unit in 0..UNITS_PER_FLEET {
            let slot = fleet * UNITS_PER_FLEET + unit;
            let enemy = home(slot);
            if unit < chopper_count {
                choppers[slot] = enemy;
            } else {
                jets[slot] = enemy;
            }
        }
    }

    log::debug!(
        "Spawned fleets: {} jets, {} choppers",
        jets.iter().filter(|e| e.is_alive()).count(),
        choppers.iter().filter(|e| e.is_alive()).count()
    );

    (jets, choppers)
}

/// Starting position of the unit in `slot`: over its group's first truck,
/// in the middle lane of its band
pub fn home(slot: usize) -> Enemy {
    let fleet = slot / UNITS_PER_FLEET;
    let unit = slot % UNITS_PER_FLEET;
    Enemy::spawn(
        TRUCK_FIRST_X + fleet as f32 * FLEET_SPACING,
        Lane::band_middle(unit),
    )
}

/// Index of the convoy anchor (first truck of a group) nearest to `x`
///
/// Dead trucks still mark their group's position, so anchors always exist.
pub fn nearest_anchor(trucks: &[Truck], x: f32) -> usize {
    (0..trucks.len())
        .step_by(TRUCKS_PER_GROUP)
        .min_by(|&a, &b| {
            let da = wrap_delta(x, trucks[a].x).abs();
            let db = wrap_delta(x, trucks[b].x).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(0)
}

/// Enemy belongs to the fleet over the player's convoy group
pub fn in_range(trucks: &[Truck], enemy_x: f32, ctx: &FleetContext) -> bool {
    nearest_anchor(trucks, enemy_x) == ctx.player_anchor
}

/// Horizontal AI, lane weaving and wraparound for one enemy category
pub fn move_enemies(
    enemies: &mut [Enemy],
    kind: EnemyKind,
    trucks: &[Truck],
    ctx: &FleetContext,
    rng: &RngState,
) {
    for (slot, enemy) in enemies.iter_mut().enumerate() {
        match enemy.life {
            Life::Dead => continue,
            Life::Dying(_) => enemy.x -= TRUCK_SPEED,
            Life::Alive(_) => {
                if in_range(trucks, enemy.x, ctx) {
                    step_horizontal(enemy, kind, &trucks[ctx.player_anchor], ctx);
                    let stream = kind.missile_pair_base() + slot;
                    step_lane(enemy, &mut rng.stream(RngSite::LaneChange, stream));
                } else {
                    enemy.x -= TRUCK_SPEED;
                }
            }
        }
        enemy.x = wrap_toward(enemy.x, ctx.player_x);
    }
}

/// Fly along the current heading; past the leash, turn around and jump back
fn step_horizontal(enemy: &mut Enemy, kind: EnemyKind, anchor: &Truck, ctx: &FleetContext) {
    let speed = (kind.base_speed(enemy.direction) + ctx.speed_bonus) * ctx.speed_factor;
    enemy.x += enemy.direction as f32 * speed;

    let from_anchor = wrap_delta(anchor.x, enemy.x);
    if from_anchor.abs() > FLEET_LEASH_RADIUS {
        enemy.direction = -enemy.direction;
        enemy.x -= from_anchor.signum() * FLEET_WIDTH;
    }
}

/// Drift toward the target lane; once there, maybe pick a new one in the same band
pub fn step_lane(enemy: &mut Enemy, rng: &mut Pcg32) {
    let Life::Alive(lane) = enemy.life else {
        return;
    };

    let target = lane.y();
    if enemy.y < target {
        enemy.y = (enemy.y + LANE_DRIFT_SPEED).min(target);
    } else if enemy.y > target {
        enemy.y = (enemy.y - LANE_DRIFT_SPEED).max(target);
    } else if rng.random_bool(LANE_CHANGE_PROBABILITY) {
        let pick = rng.random_range(0..LANES_PER_BAND);
        enemy.life = Life::Alive(Lane::new(lane.band() * LANES_PER_BAND + pick));
    }
}

/// Roll the convoy left; every truck keeps moving so anchors stay in formation
pub fn move_convoy(trucks: &mut [Truck], player_x: f32) {
    for truck in trucks.iter_mut() {
        truck.x = wrap_toward(truck.x - TRUCK_SPEED, player_x);
    }
}

/// Wave-clear sweep: destroy the leftmost surviving truck on screen order
///
/// Returns true if a truck was destroyed.
pub fn sweep_next_truck(trucks: &mut [Truck], player_x: f32) -> bool {
    let leftmost = trucks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.life.is_alive())
        .min_by(|(_, a), (_, b)| {
            wrap_delta(player_x, a.x).total_cmp(&wrap_delta(player_x, b.x))
        })
        .map(|(i, _)| i);

    match leftmost {
        Some(i) => trucks[i].kill(),
        None => false,
    }
}
