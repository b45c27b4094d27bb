use bevy::prelude::*;

use crate::command::CommandKind;
use crate::ids::{TerritoryId, UnitId};

/// A pointer click resolved to a territory, or to nothing.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerritoryPicked(pub Option<TerritoryId>);

/// The player chose one of their units.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSelected(pub UnitId);

/// Fired only when the selection actually changed.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionChanged {
    pub territory: Option<TerritoryId>,
    pub unit: Option<UnitId>,
}

/// The player pressed a command button. Carried out by the transaction layer.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandRequested {
    pub kind: CommandKind,
    pub unit: UnitId,
    pub territory: TerritoryId,
}
