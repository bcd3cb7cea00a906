//! Structured observations
//!
//! A fixed-shape snapshot derived purely from `GameState`. Renderers and
//! agents read these; nothing here feeds back into the simulation.

use serde::{Deserialize, Serialize};

use super::state::{EnemyKind, EnemyMissile, GameState, PlayerMissile, Truck};
use crate::consts::*;

/// Bounding box and activity flag of one entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityPosition {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
}

impl EntityPosition {
    fn new(x: f32, y: f32, (width, height): (f32, f32), active: bool) -> Self {
        Self {
            x,
            y,
            width,
            height,
            active,
        }
    }
}

/// Per-frame observation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub player: EntityPosition,
    /// Facing of the player (-1 / +1)
    pub player_facing: i8,
    pub trucks: [EntityPosition; MAX_TRUCKS],
    pub jets: [EntityPosition; MAX_JETS],
    pub choppers: [EntityPosition; MAX_CHOPPERS],
    /// Upper/lower missile per enemy slot
    pub enemy_missiles: [[EntityPosition; 2]; MAX_ENEMIES],
    pub player_missile: EntityPosition,
    pub score: u32,
    pub lives: i32,
}

/// Build the observation for a state
pub fn observe(state: &GameState) -> Observation {
    let player = EntityPosition::new(
        state.player.x,
        state.player.y as f32,
        PLAYER_SIZE,
        true,
    );

    let truck = |t: &Truck| EntityPosition::new(t.x, t.y, TRUCK_SIZE, t.is_active());
    let enemy_size = |kind: EnemyKind| {
        let size = kind.size();
        (size.x, size.y)
    };
    let missile = |m: &EnemyMissile| {
        EntityPosition::new(m.x, m.y, ENEMY_MISSILE_SIZE, !m.is_dead())
    };

    let mut obs = Observation {
        player,
        player_facing: state.player.facing.sign(),
        score: state.score,
        lives: state.lives,
        ..Default::default()
    };

    for (slot, t) in obs.trucks.iter_mut().zip(&state.trucks) {
        *slot = truck(t);
    }
    for kind in [EnemyKind::Jet, EnemyKind::Chopper] {
        let slots = match kind {
            EnemyKind::Jet => &mut obs.jets,
            EnemyKind::Chopper => &mut obs.choppers,
        };
        for (slot, e) in slots.iter_mut().zip(state.enemies(kind)) {
            *slot = EntityPosition::new(e.x, e.y, enemy_size(kind), e.is_active());
        }
    }
    for (slot, pair) in obs.enemy_missiles.iter_mut().zip(&state.enemy_missiles) {
        *slot = [missile(&pair.upper), missile(&pair.lower)];
    }

    let pm: &PlayerMissile = &state.player_missiles[0];
    obs.player_missile = EntityPosition::new(pm.x, pm.y, PLAYER_MISSILE_SIZE, pm.is_active());

    obs
}

/// Ring of the most recent observations, always exactly `FRAME_STACK` long
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationHistory {
    frames: [Observation; FRAME_STACK],
    /// Slot holding the oldest frame
    head: usize,
}

impl ObservationHistory {
    /// History where every slot holds the same observation (episode start)
    pub fn filled(obs: Observation) -> Self {
        Self {
            frames: std::array::from_fn(|_| obs.clone()),
            head: 0,
        }
    }

    /// Drop the oldest frame and append `obs`
    pub fn push(&mut self, obs: Observation) {
        self.frames[self.head] = obs;
        self.head = (self.head + 1) % FRAME_STACK;
    }

    pub fn latest(&self) -> &Observation {
        &self.frames[(self.head + FRAME_STACK - 1) % FRAME_STACK]
    }

    pub fn len(&self) -> usize {
        FRAME_STACK
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Frames from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        (0..FRAME_STACK).map(move |i| &self.frames[(self.head + i) % FRAME_STACK])
    }
}
