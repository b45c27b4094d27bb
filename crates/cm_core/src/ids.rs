use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a territory ("land"). Matches the numeric mesh name in the world asset.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryId(pub u32);

/// Identifier of a clan.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClanId(pub u32);

/// Token id of an NFT-backed unit.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl TerritoryId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Parse a territory id out of a scene node name.
    ///
    /// Accepts a bare number (`"12"`), the `side_<n>` form and the
    /// `Circle..._<n>` form where the id is the last `_`-separated segment.
    pub fn from_node_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Some(Self(id));
        }
        if let Some(rest) = trimmed.strip_prefix("side_") {
            return rest.parse::<u32>().ok().map(Self);
        }
        if trimmed.starts_with("Circle") {
            return trimmed
                .rsplit('_')
                .next()
                .and_then(|last| last.parse::<u32>().ok())
                .map(Self);
        }
        None
    }
}

impl ClanId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl UnitId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "land #{}", self.0)
    }
}

impl fmt::Display for ClanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clan #{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
