//! Where territory, clan and unit data comes from.
//!
//! The running map talks to a [`CatalogSource`]; the shipped implementation
//! reads a directory of RON files laid out like this:
//!
//! ```text
//! <root>/territories.ron      [Territory]
//! <root>/clans.ron            [Clan]
//! <root>/adjacency.ron        [(TerritoryId, TerritoryId)], optional
//! <root>/roster/<address>.ron [UnitId]
//! <root>/units/<id>.ron       ChainUnitRecord
//! ```

use cm_core::{TerritoryId, UnitId};
use cm_world::{
    AdjacencyTable, ChainUnitRecord, Clan, ClanCatalog, Roster, RosterEntry, Territory, TerritoryCatalog, Unit,
};
use bevy::log::warn;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::ron_io::{key_filename, load_optional_ron, load_ron, save_ron};

/// Read access to the game's catalogs and the player's units.
pub trait CatalogSource: Send + Sync + 'static {
    fn territories(&self) -> Result<TerritoryCatalog, CatalogError>;

    fn clans(&self) -> Result<ClanCatalog, CatalogError>;

    /// Ids of the units owned by `address`.
    fn owned_units(&self, address: &str) -> Result<Vec<UnitId>, CatalogError>;

    /// Raw record of one unit as the game contract reports it.
    fn unit_detail(&self, id: UnitId) -> Result<ChainUnitRecord, CatalogError>;

    /// Move graph, `None` when the source has no adjacency data.
    fn adjacency(&self) -> Result<Option<AdjacencyTable>, CatalogError>;

    /// Resolve one unit, enforcing the timer invariant.
    fn unit(&self, id: UnitId) -> Result<Unit, CatalogError> {
        let record = self.unit_detail(id)?;
        Ok(Unit::from_chain(id, &record)?)
    }

    /// Build the roster for `address`. Units whose records are rejected are
    /// left out and logged.
    fn roster(&self, address: &str) -> Result<Roster, CatalogError> {
        let mut entries = Vec::new();
        for id in self.owned_units(address)? {
            match self.unit(id) {
                Ok(unit) => entries.push(RosterEntry::new(unit)),
                Err(CatalogError::Record(e)) => warn!("skipping unit {}: {}", id, e),
                Err(e) => return Err(e),
            }
        }
        Ok(Roster::new(entries))
    }
}

/// [`CatalogSource`] over a directory of RON files.
#[derive(Debug, Clone)]
pub struct RonCatalogSource {
    root: PathBuf,
}

impl RonCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn territories_path(&self) -> PathBuf {
        self.root.join("territories.ron")
    }

    fn clans_path(&self) -> PathBuf {
        self.root.join("clans.ron")
    }

    fn adjacency_path(&self) -> PathBuf {
        self.root.join("adjacency.ron")
    }

    fn roster_path(&self, address: &str) -> PathBuf {
        self.root.join("roster").join(key_filename(address))
    }

    fn unit_path(&self, id: UnitId) -> PathBuf {
        self.root.join("units").join(format!("{}.ron", id.0))
    }

    pub fn save_territories(&self, territories: &[Territory]) -> Result<(), CatalogError> {
        save_ron(&self.territories_path(), &territories)
    }

    pub fn save_clans(&self, clans: &[Clan]) -> Result<(), CatalogError> {
        save_ron(&self.clans_path(), &clans)
    }

    pub fn save_adjacency(&self, edges: &[(TerritoryId, TerritoryId)]) -> Result<(), CatalogError> {
        save_ron(&self.adjacency_path(), &edges)
    }

    pub fn save_owned_units(&self, address: &str, ids: &[UnitId]) -> Result<(), CatalogError> {
        save_ron(&self.roster_path(address), &ids)
    }

    pub fn save_unit_detail(&self, id: UnitId, record: &ChainUnitRecord) -> Result<(), CatalogError> {
        save_ron(&self.unit_path(id), record)
    }
}

impl CatalogSource for RonCatalogSource {
    fn territories(&self) -> Result<TerritoryCatalog, CatalogError> {
        let territories: Vec<Territory> = load_ron(&self.territories_path())?;
        Ok(TerritoryCatalog::new(territories))
    }

    fn clans(&self) -> Result<ClanCatalog, CatalogError> {
        let clans: Vec<Clan> = load_ron(&self.clans_path())?;
        Ok(ClanCatalog::new(clans))
    }

    fn owned_units(&self, address: &str) -> Result<Vec<UnitId>, CatalogError> {
        // An address with no roster file owns nothing yet.
        Ok(load_optional_ron::<Vec<UnitId>>(&self.roster_path(address))?.unwrap_or_default())
    }

    fn unit_detail(&self, id: UnitId) -> Result<ChainUnitRecord, CatalogError> {
        load_ron(&self.unit_path(id))
    }

    fn adjacency(&self) -> Result<Option<AdjacencyTable>, CatalogError> {
        let edges: Option<Vec<(TerritoryId, TerritoryId)>> = load_optional_ron(&self.adjacency_path())?;
        Ok(edges.map(AdjacencyTable::new))
    }
}
