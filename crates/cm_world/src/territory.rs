//! Territory records as delivered by the land catalog.
//!
//! Territories are never created client-side; the whole catalog is replaced
//! on every refresh.

use cm_core::{ClanId, TerritoryId};
use serde::{Deserialize, Serialize};

/// A controllable zone of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Resource yield shown as "Resource" in the land panel.
    #[serde(default)]
    pub resource_value: u64,
    /// Clan currently governing this land (`None` = neutral zone).
    #[serde(default)]
    pub controlling_clan: Option<ClanId>,
    /// Active war identifier, 0 when peaceful.
    #[serde(default)]
    pub war_id: u64,
    #[serde(default)]
    pub attacker_clan: Option<ClanId>,
    #[serde(default)]
    pub defenders_power: u64,
    #[serde(default)]
    pub attackers_power: u64,
    /// World-space centre, kept as an array so the record stays plain data.
    #[serde(default)]
    pub centroid: [f32; 3],
    /// Banner image base shown while the land is at war.
    #[serde(default)]
    pub uri: Option<String>,
}

impl Territory {
    /// Create a peaceful, neutral territory.
    pub fn new(id: TerritoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            resource_value: 0,
            controlling_clan: None,
            war_id: 0,
            attacker_clan: None,
            defenders_power: 0,
            attackers_power: 0,
            centroid: [0.0; 3],
            uri: None,
        }
    }

    pub fn at_war(&self) -> bool {
        self.war_id != 0
    }

    /// "Peace" or "War".
    pub fn status_label(&self) -> &'static str {
        if self.at_war() {
            "War"
        } else {
            "Peace"
        }
    }

    /// Whether `clan` governs this land. An unknown clan never does.
    pub fn is_controlled_by(&self, clan: Option<ClanId>) -> bool {
        clan.is_some() && self.controlling_clan == clan
    }

    /// Banner image path while at war, if the land has one.
    pub fn war_banner(&self) -> Option<String> {
        match (&self.uri, self.at_war()) {
            (Some(uri), true) => Some(format!("{}.ads.png", uri)),
            _ => None,
        }
    }
}

/// The latest territory catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerritoryCatalog {
    pub territories: Vec<Territory>,
}

impl TerritoryCatalog {
    pub fn new(territories: Vec<Territory>) -> Self {
        Self { territories }
    }

    /// Look up a territory by id.
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter()
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_territory_is_peaceful_and_neutral() {
        let land = Territory::new(TerritoryId(1), "Kyoto");
        assert!(!land.at_war());
        assert_eq!(land.status_label(), "Peace");
        assert!(land.controlling_clan.is_none());
    }

    #[test]
    fn unknown_clan_never_controls() {
        let land = Territory::new(TerritoryId(1), "Kyoto");
        assert!(!land.is_controlled_by(None));

        let mut held = land.clone();
        held.controlling_clan = Some(ClanId(2));
        assert!(held.is_controlled_by(Some(ClanId(2))));
        assert!(!held.is_controlled_by(Some(ClanId(3))));
    }

    #[test]
    fn war_banner_only_while_at_war() {
        let mut land = Territory::new(TerritoryId(4), "Edo");
        land.uri = Some("https://cdn/lands/4".into());
        assert_eq!(land.war_banner(), None);
        land.war_id = 9;
        assert_eq!(land.war_banner().as_deref(), Some("https://cdn/lands/4.ads.png"));
    }

    #[test]
    fn catalog_lookup_by_id() {
        let catalog = TerritoryCatalog::new(vec![
            Territory::new(TerritoryId(1), "A"),
            Territory::new(TerritoryId(2), "B"),
        ]);
        assert_eq!(catalog.get(TerritoryId(2)).map(|t| t.name.as_str()), Some("B"));
        assert!(catalog.get(TerritoryId(5)).is_none());
    }

    #[test]
    fn minimal_record_deserializes_with_defaults() {
        let land: Territory = ron::from_str(r#"(id: 3, name: "Osaka")"#).unwrap();
        assert_eq!(land.id, TerritoryId(3));
        assert_eq!(land.war_id, 0);
        assert_eq!(land.centroid, [0.0; 3]);
    }
}
