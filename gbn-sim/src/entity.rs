//! The two simulated hosts

use serde::{Deserialize, Serialize};
use std::fmt;

/// One end of the simulated link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entity {
    A,
    B,
}

impl Entity {
    pub const ALL: [Entity; 2] = [Entity::A, Entity::B];

    /// The entity at the other end of the link
    pub fn peer(self) -> Entity {
        match self {
            Entity::A => Entity::B,
            Entity::B => Entity::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Entity::A => 0,
            Entity::B => 1,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::A => write!(f, "A"),
            Entity::B => write!(f, "B"),
        }
    }
}
