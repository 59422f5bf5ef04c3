//! Player names and the bye partner placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name stored in the second seat of a team formed from the odd player out.
pub const BYE_PARTNER: &str = "random";

/// A player in the tournament, identified by a display name unique within it.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Player(String);

impl Player {
    /// Create a player from a display name (surrounding whitespace is dropped).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(name.trim().to_string())
    }

    /// The placeholder partner of a team that only has one real player.
    pub fn bye() -> Self {
        Self(BYE_PARTNER.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_bye(&self) -> bool {
        self.0 == BYE_PARTNER
    }

    /// Names are compared case-insensitively.
    pub fn same_name(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
