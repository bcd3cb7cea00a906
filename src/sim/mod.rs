//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call to `tick` is one frame
//! - Randomness only through `RngState` streams
//! - Fixed-size entity arrays, iterated in slot order
//! - No rendering or platform dependencies

pub mod action;
pub mod collision;
pub mod enemy;
pub mod ledger;
pub mod motion;
pub mod observation;
pub mod projectile;
pub mod state;
pub mod tick;

pub use action::Action;
pub use collision::{
    Target, body_hits, clip_to_window, enemy_missile_hits, missile_hits, overlap, overlap_any,
};
pub use motion::{on_screen_position, wrap_delta, wrap_toward};
pub use observation::{EntityPosition, Observation, ObservationHistory, observe};
pub use state::{
    Enemy, EnemyKind, EnemyMissile, Facing, GamePhase, GameState, Lane, Life, MissilePair,
    PAUSE_NO_MOVE, PAUSE_PLAYING, Player, PlayerMissile, RngSite, RngState, SplitState, Truck,
};
pub use tick::{merge_on_respawn, tick};
