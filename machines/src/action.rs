//! Joystick actions accepted by the console.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the 18 joystick positions (8 directions plus center, each with and
/// without the fire button). Discriminants are the conventional action codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
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

/// Every action in code order.
pub const ALL_ACTIONS: [Action; 18] = [
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

/// Stick deflection of an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Action {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| ALL_ACTIONS.get(index).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Noop => "NOOP",
            Action::Fire => "FIRE",
            Action::Up => "UP",
            Action::Right => "RIGHT",
            Action::Left => "LEFT",
            Action::Down => "DOWN",
            Action::UpRight => "UPRIGHT",
            Action::UpLeft => "UPLEFT",
            Action::DownRight => "DOWNRIGHT",
            Action::DownLeft => "DOWNLEFT",
            Action::UpFire => "UPFIRE",
            Action::RightFire => "RIGHTFIRE",
            Action::LeftFire => "LEFTFIRE",
            Action::DownFire => "DOWNFIRE",
            Action::UpRightFire => "UPRIGHTFIRE",
            Action::UpLeftFire => "UPLEFTFIRE",
            Action::DownRightFire => "DOWNRIGHTFIRE",
            Action::DownLeftFire => "DOWNLEFTFIRE",
        }
    }

    pub fn fire(self) -> bool {
        matches!(
            self,
            Action::Fire
                | Action::UpFire
                | Action::RightFire
                | Action::LeftFire
                | Action::DownFire
                | Action::UpRightFire
                | Action::UpLeftFire
                | Action::DownRightFire
                | Action::DownLeftFire
        )
    }

    pub fn stick(self) -> Stick {
        use Action::*;
        Stick {
            up: matches!(self, Up | UpRight | UpLeft | UpFire | UpRightFire | UpLeftFire),
            down: matches!(
                self,
                Down | DownRight | DownLeft | DownFire | DownRightFire | DownLeftFire
            ),
            left: matches!(
                self,
                Left | UpLeft | DownLeft | LeftFire | UpLeftFire | DownLeftFire
            ),
            right: matches!(
                self,
                Right | UpRight | DownRight | RightFire | UpRightFire | DownRightFire
            ),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses either the action name (case-insensitive) or its numeric code.
impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<i32>() {
            return Action::from_code(code).ok_or_else(|| format!("no action has code {code}"));
        }
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown action `{s}`"))
    }
}
