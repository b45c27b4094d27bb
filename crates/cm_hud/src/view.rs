//! Plain view models for the HUD panels.
//!
//! Built from the selection store each frame so the egui code only lays
//! out strings and buttons.

use cm_core::{ClanId, CommandKind, TerritoryId, UnitId};
use cm_selection::SelectionStore;
use cm_world::{ClanCatalog, Connectivity, Roster, Territory, Unit};

/// The two sides of an ongoing war.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarView {
    pub defender: String,
    pub attacker: String,
    pub defenders_power: u64,
    pub attackers_power: u64,
    pub banner: Option<String>,
}

/// Land panel contents for a resolved territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandPanel {
    pub territory: TerritoryId,
    pub name: String,
    pub description: String,
    pub resource_value: u64,
    pub status: &'static str,
    pub governance: String,
    pub war: Option<WarView>,
    pub available: Vec<UnitButton>,
    pub camped: Vec<UnitButton>,
    pub deployed: Vec<UnitButton>,
    pub commands: Vec<CommandKind>,
}

/// What the land panel shows, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandPanelView {
    Hidden,
    /// Selected, but the catalog has not delivered the record yet.
    Pending(TerritoryId),
    Ready(Box<LandPanel>),
}

/// A clickable unit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitButton {
    pub id: UnitId,
    pub label: String,
    pub selected: bool,
}

fn unit_buttons<'a>(entries: impl IntoIterator<Item = &'a cm_world::RosterEntry>, selected: Option<UnitId>) -> Vec<UnitButton> {
    entries
        .into_iter()
        .map(|e| UnitButton {
            id: e.unit.id,
            label: e.token_name.clone(),
            selected: selected == Some(e.unit.id),
        })
        .collect()
}

fn war_view(territory: &Territory, clans: &ClanCatalog) -> Option<WarView> {
    if !territory.at_war() {
        return None;
    }
    Some(WarView {
        defender: clans.governance_name(territory.controlling_clan).to_string(),
        attacker: clans.governance_name(territory.attacker_clan).to_string(),
        defenders_power: territory.defenders_power,
        attackers_power: territory.attackers_power,
        banner: territory.war_banner(),
    })
}

impl LandPanelView {
    pub fn build<C: Connectivity + ?Sized>(
        store: &SelectionStore,
        player_clan: Option<ClanId>,
        connectivity: &C,
    ) -> Self {
        let Some(id) = store.territory_id() else {
            return Self::Hidden;
        };
        if !store.detail_open() {
            return Self::Hidden;
        }
        let Some(territory) = store.territory() else {
            return Self::Pending(id);
        };

        let clans = store.clans();
        let units = store.roster().at_territory(id);
        let selected = store.unit_id();
        Self::Ready(Box::new(LandPanel {
            territory: id,
            name: territory.name.clone(),
            description: territory.description.clone(),
            resource_value: territory.resource_value,
            status: territory.status_label(),
            governance: clans.governance_name(territory.controlling_clan).to_string(),
            war: war_view(territory, clans),
            available: unit_buttons(units.available, selected),
            camped: unit_buttons(units.camped, selected),
            deployed: unit_buttons(units.deployed, selected),
            commands: store.eligible_commands(player_clan, connectivity).kinds().collect(),
        }))
    }
}

/// Card describing the selected unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCard {
    pub title: String,
    pub location: TerritoryId,
    pub stamina: String,
    pub health: &'static str,
    pub status: &'static str,
    /// How long the unit has been camped or deployed.
    pub elapsed: Option<String>,
    pub stats: String,
}

impl UnitCard {
    /// `now` is the current Unix time in seconds.
    pub fn build(unit: &Unit, now: u64) -> Self {
        Self {
            title: format!("SamuraiWarrior {}", unit.id),
            location: unit.current_territory,
            stamina: format!("{}/{}", unit.current_stamina, unit.max_stamina),
            health: unit.health_label(),
            status: unit.status().label(),
            elapsed: unit.status_since().map(|since| format_elapsed(now.saturating_sub(since))),
            stats: format!("ATK {} / DEF {} / CHAKRA {}", unit.attack, unit.defence, unit.chakra),
        }
    }
}

/// Compact duration such as "2d 3h", "4h 12m" or "35s".
pub fn format_elapsed(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// One button per owned unit.
pub fn roster_buttons(roster: &Roster, selected: Option<UnitId>) -> Vec<UnitButton> {
    unit_buttons(roster.iter(), selected)
}
