//! Discrete action set
//!
//! Eighteen symbols: no-op, fire, eight directions and eight direction+fire
//! combinations. Indices follow the Atari Learning Environment ordering.

use serde::{Deserialize, Serialize};

use crate::error::ChopperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    #[default]
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl Action {
    /// Every action, in index order
    pub const ALL: [Action; 18] = [
        Action::Noop,
        Action::Fire,
        Action::Up,
        Action::Right,
        Action::Left,
        Action::Down,
        Action::UpRight,
        Action::UpLeft,
        Action::DownRight,
        Action::DownLeft,
        Action::UpFire,
        Action::RightFire,
        Action::LeftFire,
        Action::DownFire,
        Action::UpRightFire,
        Action::UpLeftFire,
        Action::DownRightFire,
        Action::DownLeftFire,
    ];

    /// Decode a raw symbol, treating anything outside the action set as a no-op
    pub fn from_index(index: u8) -> Self {
        Self::try_from(index).unwrap_or_else(|err| {
            log::warn!("{err}; treating as NOOP");
            Action::Noop
        })
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Build an action from stick directions (-1, 0, +1) and the fire button
    ///
    /// `vertical` is negative for up, `horizontal` negative for left.
    pub fn from_components(vertical: i8, horizontal: i8, fire: bool) -> Self {
        use Action::*;
        match (vertical.signum(), horizontal.signum(), fire) {
            (0, 0, false) => Noop,
            (0, 0, true) => Fire,
            (-1, 0, false) => Up,
            (0, 1, false) => Right,
            (0, -1, false) => Left,
            (1, 0, false) => Down,
            (-1, 1, false) => UpRight,
            (-1, -1, false) => UpLeft,
            (1, 1, false) => DownRight,
            (1, -1, false) => DownLeft,
            (-1, 0, true) => UpFire,
            (0, 1, true) => RightFire,
            (0, -1, true) => LeftFire,
            (1, 0, true) => DownFire,
            (-1, 1, true) => UpRightFire,
            (-1, -1, true) => UpLeftFire,
            (1, 1, true) => DownRightFire,
            (1, -1, true) => DownLeftFire,
            // signum only yields -1, 0 or 1
            _ => Noop,
        }
    }

    pub fn up(self) -> bool {
        matches!(
            self,
            Action::Up
                | Action::UpRight
                | Action::UpLeft
                | Action::UpFire
                | Action::UpRightFire
                | Action::UpLeftFire
        )
    }

    pub fn down(self) -> bool {
        matches!(
            self,
            Action::Down
                | Action::DownRight
                | Action::DownLeft
                | Action::DownFire
                | Action::DownRightFire
                | Action::DownLeftFire
        )
    }

    pub fn left(self) -> bool {
        matches!(
            self,
            Action::Left
                | Action::UpLeft
                | Action::DownLeft
                | Action::LeftFire
                | Action::UpLeftFire
                | Action::DownLeftFire
        )
    }

    pub fn right(self) -> bool {
        matches!(
            self,
            Action::Right
                | Action::UpRight
                | Action::DownRight
                | Action::RightFire
                | Action::UpRightFire
                | Action::DownRightFire
        )
    }

    pub fn fire(self) -> bool {
        self == Action::Fire || self.index() >= Action::UpFire.index()
    }
}

impl TryFrom<u8> for Action {
    type Error = ChopperError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Action::ALL
            .get(index as usize)
            .copied()
            .ok_or(ChopperError::InvalidAction(index))
    }
}
