//! Units ("samurai"): the player's NFT-backed agents.
//!
//! A unit's status is never stored. It is derived from the camp and
//! deployment timestamps, and at most one of them may be non-zero.

use bevy::log::debug;
use cm_core::{TerritoryId, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived display state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitStatus {
    #[default]
    Available = 0,
    Deployed = 1,
    Camped = 2,
}

impl UnitStatus {
    /// Numeric code used by the on-chain record.
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Available),
            1 => Some(Self::Deployed),
            2 => Some(Self::Camped),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Deployed => "In War",
            Self::Camped => "Camp",
        }
    }
}

/// A unit owned by some player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner_address: String,
    pub current_territory: TerritoryId,
    pub attack: u32,
    pub defence: u32,
    pub chakra: u32,
    pub max_stamina: u32,
    pub current_stamina: u32,
    #[serde(default)]
    pub is_injured: bool,
    /// Unix seconds when the unit started camping, 0 when not camped.
    #[serde(default)]
    pub camp_start_time: u64,
    /// Unix seconds when the unit was deployed, 0 when not deployed.
    #[serde(default)]
    pub deployment_start_time: u64,
    #[serde(default)]
    pub season: u64,
    #[serde(default)]
    pub light_stones: u64,
}

impl Unit {
    /// Create an available, healthy unit standing on `territory`.
    pub fn new(id: UnitId, owner_address: impl Into<String>, territory: TerritoryId) -> Self {
        Self {
            id,
            owner_address: owner_address.into(),
            current_territory: territory,
            attack: 0,
            defence: 0,
            chakra: 0,
            max_stamina: 0,
            current_stamina: 0,
            is_injured: false,
            camp_start_time: 0,
            deployment_start_time: 0,
            season: 0,
            light_stones: 0,
        }
    }

    /// Derived status; assumes the record passed `validate`.
    pub fn status(&self) -> UnitStatus {
        if self.deployment_start_time != 0 {
            UnitStatus::Deployed
        } else if self.camp_start_time != 0 {
            UnitStatus::Camped
        } else {
            UnitStatus::Available
        }
    }

    pub fn is_at(&self, territory: TerritoryId) -> bool {
        self.current_territory == territory
    }

    pub fn is_camped(&self) -> bool {
        self.camp_start_time != 0
    }

    pub fn is_deployed(&self) -> bool {
        self.deployment_start_time != 0
    }

    /// Timestamp of the current camp or deployment, if any.
    pub fn status_since(&self) -> Option<u64> {
        match self.status() {
            UnitStatus::Deployed => Some(self.deployment_start_time),
            UnitStatus::Camped => Some(self.camp_start_time),
            UnitStatus::Available => None,
        }
    }

    /// "Injured" or "Healthy".
    pub fn health_label(&self) -> &'static str {
        if self.is_injured {
            "Injured"
        } else {
            "Healthy"
        }
    }

    /// Reject records that are camped and deployed at the same time.
    pub fn validate(&self) -> Result<(), UnitRecordError> {
        if self.camp_start_time != 0 && self.deployment_start_time != 0 {
            return Err(UnitRecordError::ConflictingTimers {
                unit: self.id,
                camp_start_time: self.camp_start_time,
                deployment_start_time: self.deployment_start_time,
            });
        }
        Ok(())
    }

    /// Map a live on-chain record onto the unit model.
    ///
    /// The reported status code is ignored in favour of the one derived from
    /// the timestamps; a mismatch is only logged.
    pub fn from_chain(id: UnitId, record: &ChainUnitRecord) -> Result<Self, UnitRecordError> {
        let unit = Self {
            id,
            owner_address: record.owner.clone(),
            current_territory: TerritoryId(record.location),
            attack: record.attack,
            defence: record.defence,
            chakra: record.chakra,
            max_stamina: record.max_agility,
            current_stamina: record.current_agility,
            is_injured: record.is_injured,
            camp_start_time: record.camp_time,
            deployment_start_time: record.deployment_time,
            season: record.season,
            light_stones: record.light_stones,
        };
        unit.validate()?;

        let derived = unit.status();
        if UnitStatus::from_code(record.status) != Some(derived) {
            debug!(
                "Unit {}: reported status {} disagrees with timers, using {}",
                id,
                record.status,
                derived.label()
            );
        }
        Ok(unit)
    }
}

/// The unit tuple as returned by the game contract's `viewSamurai` read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainUnitRecord {
    pub season: u64,
    pub light_stones: u64,
    pub camp_time: u64,
    pub deployment_time: u64,
    pub owner: String,
    pub location: u32,
    pub attack: u32,
    pub defence: u32,
    pub chakra: u32,
    pub max_agility: u32,
    pub current_agility: u32,
    pub is_injured: bool,
    pub status: u8,
}

/// Error for unit records that break the timer invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitRecordError {
    ConflictingTimers {
        unit: UnitId,
        camp_start_time: u64,
        deployment_start_time: u64,
    },
}

impl fmt::Display for UnitRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingTimers {
                unit,
                camp_start_time,
                deployment_start_time,
            } => write!(
                f,
                "unit {} is both camped (since {}) and deployed (since {})",
                unit, camp_start_time, deployment_start_time
            ),
        }
    }
}

impl std::error::Error for UnitRecordError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ChainUnitRecord {
        ChainUnitRecord {
            season: 1,
            light_stones: 4,
            owner: "0xabc".into(),
            location: 3,
            attack: 12,
            defence: 9,
            chakra: 5,
            max_agility: 10,
            current_agility: 7,
            ..Default::default()
        }
    }

    #[test]
    fn status_is_derived_from_timers() {
        let mut unit = Unit::new(UnitId(1), "0xabc", TerritoryId(1));
        assert_eq!(unit.status(), UnitStatus::Available);
        unit.camp_start_time = 100;
        assert_eq!(unit.status(), UnitStatus::Camped);
        unit.camp_start_time = 0;
        unit.deployment_start_time = 200;
        assert_eq!(unit.status(), UnitStatus::Deployed);
        assert_eq!(unit.status_since(), Some(200));
    }

    #[test]
    fn chain_record_maps_onto_unit() {
        let unit = Unit::from_chain(UnitId(77), &record()).unwrap();
        assert_eq!(unit.id, UnitId(77));
        assert_eq!(unit.current_territory, TerritoryId(3));
        assert_eq!(unit.max_stamina, 10);
        assert_eq!(unit.current_stamina, 7);
        assert_eq!(unit.status(), UnitStatus::Available);
    }

    #[test]
    fn reported_status_is_normalized() {
        let mut rec = record();
        rec.camp_time = 500;
        rec.status = 1;
        let unit = Unit::from_chain(UnitId(2), &rec).unwrap();
        assert_eq!(unit.status(), UnitStatus::Camped);
    }

    #[test]
    fn conflicting_timers_are_rejected() {
        let mut rec = record();
        rec.camp_time = 10;
        rec.deployment_time = 20;
        let err = Unit::from_chain(UnitId(5), &rec).unwrap_err();
        assert!(matches!(err, UnitRecordError::ConflictingTimers { unit: UnitId(5), .. }));
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [UnitStatus::Available, UnitStatus::Deployed, UnitStatus::Camped] {
            assert_eq!(UnitStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(UnitStatus::from_code(3), None);
    }
}
