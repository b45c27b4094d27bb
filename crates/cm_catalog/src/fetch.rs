//! Background catalog reads.
//!
//! Every request becomes a task on the IO pool. Tasks are polled once per
//! frame and may finish in any order; each result is applied on arrival and
//! the last one wins. A request for a read already in flight is queued and
//! issued again once that read completes, so the data it asks for is never
//! older than the request. A failed read leaves the previous data in place.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, poll_once};
use cm_core::{CommandRequested, UnitId, UnitSelected};
use cm_selection::{CatalogUpdate, SelectionStore};
use cm_world::{PlayerProfile, TerritoryGraph};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MapConfig;
use crate::error::CatalogError;
use crate::source::CatalogSource;

/// What a fetch reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Territories,
    Clans,
    Adjacency,
    Roster,
    UnitDetail(UnitId),
}

impl FetchKind {
    /// Everything read when the map opens or is reloaded.
    pub const CATALOGS: [FetchKind; 4] = [Self::Territories, Self::Clans, Self::Adjacency, Self::Roster];
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Territories => write!(f, "territories"),
            Self::Clans => write!(f, "clans"),
            Self::Adjacency => write!(f, "adjacency"),
            Self::Roster => write!(f, "roster"),
            Self::UnitDetail(id) => write!(f, "unit {}", id),
        }
    }
}

/// Ask for a fresh read.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest(pub FetchKind);

/// A read that did not complete.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct FetchFailed {
    pub kind: FetchKind,
    pub message: String,
}

/// Result of one completed read.
#[derive(Debug, Clone)]
pub enum Fetched {
    Update(CatalogUpdate),
    Graph(TerritoryGraph),
}

/// Shared handle to the configured catalog source.
#[derive(Resource, Clone)]
pub struct CatalogHandle(pub Arc<dyn CatalogSource>);

impl CatalogHandle {
    pub fn new(source: impl CatalogSource) -> Self {
        Self(Arc::new(source))
    }
}

/// Reads currently in flight.
#[derive(Resource, Default)]
pub struct PendingFetches {
    tasks: Vec<(FetchKind, Task<Result<Fetched, CatalogError>>)>,
    /// Kinds requested again while in flight.
    queued: HashSet<FetchKind>,
}

impl PendingFetches {
    pub fn in_flight(&self, kind: FetchKind) -> bool {
        self.tasks.iter().any(|(k, _)| *k == kind)
    }

    /// Whether `kind` will be read again after the current read.
    pub fn is_queued(&self, kind: FetchKind) -> bool {
        self.queued.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Most recent failure, cleared once the same read succeeds.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStatus {
    pub last_failure: Option<FetchFailed>,
}

/// Repeating timer driving re-reads of the selected unit.
#[derive(Resource, Debug)]
pub struct UnitRefreshTimer(pub Timer);

impl UnitRefreshTimer {
    pub fn new(period: Duration) -> Self {
        Self(Timer::new(period, TimerMode::Repeating))
    }
}

impl FromWorld for UnitRefreshTimer {
    fn from_world(world: &mut World) -> Self {
        let period = world
            .get_resource::<MapConfig>()
            .map(MapConfig::unit_refresh_interval)
            .unwrap_or_else(|| MapConfig::default().unit_refresh_interval());
        Self::new(period)
    }
}

/// Perform one read synchronously.
pub fn run_fetch(source: &dyn CatalogSource, kind: FetchKind, address: &str) -> Result<Fetched, CatalogError> {
    let fetched = match kind {
        FetchKind::Territories => Fetched::Update(CatalogUpdate::Territories(source.territories()?)),
        FetchKind::Clans => Fetched::Update(CatalogUpdate::Clans(source.clans()?)),
        FetchKind::Roster => Fetched::Update(CatalogUpdate::Roster(source.roster(address)?)),
        FetchKind::UnitDetail(id) => Fetched::Update(CatalogUpdate::UnitDetail(source.unit(id)?)),
        FetchKind::Adjacency => Fetched::Graph(match source.adjacency()? {
            Some(table) => TerritoryGraph::Table(table),
            None => TerritoryGraph::Unrestricted,
        }),
    };
    Ok(fetched)
}

/// Startup system requesting every catalog.
pub fn request_catalogs(mut requests: EventWriter<FetchRequest>) {
    for kind in FetchKind::CATALOGS {
        requests.send(FetchRequest(kind));
    }
}

/// Read the live record of a unit as soon as it is selected.
pub fn request_selected_unit(mut selected: EventReader<UnitSelected>, mut requests: EventWriter<FetchRequest>) {
    for UnitSelected(id) in selected.read() {
        requests.send(FetchRequest(FetchKind::UnitDetail(*id)));
    }
}

/// Re-read the selected unit on a fixed period.
pub fn tick_unit_refresh(
    time: Res<Time>,
    mut timer: ResMut<UnitRefreshTimer>,
    store: Res<SelectionStore>,
    mut requests: EventWriter<FetchRequest>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    if let Some(id) = store.unit_id() {
        requests.send(FetchRequest(FetchKind::UnitDetail(id)));
    }
}

/// Re-read what a dispatched command may change.
pub fn refresh_after_command(mut commands: EventReader<CommandRequested>, mut requests: EventWriter<FetchRequest>) {
    let mut units = Vec::new();
    for command in commands.read() {
        units.push(command.unit);
    }
    if units.is_empty() {
        return;
    }
    requests.send(FetchRequest(FetchKind::Territories));
    requests.send(FetchRequest(FetchKind::Roster));
    units.sort();
    units.dedup();
    for id in units {
        requests.send(FetchRequest(FetchKind::UnitDetail(id)));
    }
}

/// Turn requests into IO tasks. A read already in flight is queued instead
/// of running twice at once.
pub fn spawn_fetches(
    mut requests: EventReader<FetchRequest>,
    source: Option<Res<CatalogHandle>>,
    profile: Res<PlayerProfile>,
    mut pending: ResMut<PendingFetches>,
) {
    let Some(source) = source else {
        if !requests.is_empty() {
            warn!("no catalog source configured, dropping {} fetch requests", requests.len());
            requests.clear();
        }
        return;
    };

    let pool = IoTaskPool::get();
    for FetchRequest(kind) in requests.read() {
        if pending.in_flight(*kind) {
            if pending.queued.insert(*kind) {
                debug!("{} already in flight, reading again once it lands", kind);
            }
            continue;
        }
        let kind = *kind;
        let source = source.0.clone();
        let address = profile.address.clone();
        debug!("fetching {}", kind);
        let task = pool.spawn(async move { run_fetch(source.as_ref(), kind, &address) });
        pending.tasks.push((kind, task));
    }
}

/// Apply finished reads and re-issue the ones queued behind them.
pub fn poll_fetches(
    mut pending: ResMut<PendingFetches>,
    mut updates: EventWriter<CatalogUpdate>,
    mut failures: EventWriter<FetchFailed>,
    mut requests: EventWriter<FetchRequest>,
    mut graph: ResMut<TerritoryGraph>,
    mut status: ResMut<FetchStatus>,
) {
    let mut landed = Vec::new();
    pending.tasks.retain_mut(|(kind, task)| {
        let Some(result) = block_on(poll_once(task)) else {
            return true;
        };
        landed.push(*kind);
        match result {
            Ok(fetched) => {
                log_arrival(*kind, &fetched);
                match fetched {
                    Fetched::Update(update) => {
                        updates.send(update);
                    }
                    Fetched::Graph(new_graph) => *graph = new_graph,
                }
                if status.last_failure.as_ref().is_some_and(|f| f.kind == *kind) {
                    status.last_failure = None;
                }
            }
            Err(e) => {
                failures.send(FetchFailed {
                    kind: *kind,
                    message: e.to_string(),
                });
            }
        }
        false
    });

    for kind in landed {
        if pending.queued.remove(&kind) {
            requests.send(FetchRequest(kind));
        }
    }
}

/// Log failed reads and keep the latest one for the status line.
pub fn record_fetch_failures(mut failures: EventReader<FetchFailed>, mut status: ResMut<FetchStatus>) {
    for failure in failures.read() {
        warn!("fetching {} failed: {}", failure.kind, failure.message);
        status.last_failure = Some(failure.clone());
    }
}

fn log_arrival(kind: FetchKind, fetched: &Fetched) {
    match fetched {
        Fetched::Update(CatalogUpdate::Territories(t)) => info!("{} territories loaded", t.len()),
        Fetched::Update(CatalogUpdate::Clans(c)) => info!("{} clans loaded", c.len()),
        Fetched::Update(CatalogUpdate::Roster(r)) => info!("roster loaded with {} units", r.len()),
        Fetched::Update(CatalogUpdate::UnitDetail(u)) => debug!("{} refreshed: {}", kind, u.status().label()),
        Fetched::Graph(TerritoryGraph::Table(t)) => info!("adjacency loaded with {} edges", t.edges.len()),
        Fetched::Graph(TerritoryGraph::Unrestricted) => info!("no adjacency data, moves are unrestricted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RonCatalogSource;
    use cm_core::{ClanId, TerritoryId};
    use cm_world::{ChainUnitRecord, Clan, Territory};
    use tempfile::tempdir;

    #[test]
    fn run_fetch_maps_each_kind() {
        let dir = tempdir().unwrap();
        let source = RonCatalogSource::new(dir.path());
        source.save_territories(&[Territory::new(TerritoryId(1), "Kyoto")]).unwrap();
        source.save_clans(&[Clan::new(ClanId(1), "Crimson", TerritoryId(1))]).unwrap();
        source.save_unit_detail(UnitId(5), &ChainUnitRecord { location: 1, ..Default::default() }).unwrap();

        assert!(matches!(
            run_fetch(&source, FetchKind::Territories, "").unwrap(),
            Fetched::Update(CatalogUpdate::Territories(t)) if t.len() == 1
        ));
        assert!(matches!(
            run_fetch(&source, FetchKind::Clans, "").unwrap(),
            Fetched::Update(CatalogUpdate::Clans(c)) if c.len() == 1
        ));
        assert!(matches!(
            run_fetch(&source, FetchKind::UnitDetail(UnitId(5)), "").unwrap(),
            Fetched::Update(CatalogUpdate::UnitDetail(u)) if u.current_territory == TerritoryId(1)
        ));
        assert!(matches!(
            run_fetch(&source, FetchKind::Adjacency, "").unwrap(),
            Fetched::Graph(TerritoryGraph::Unrestricted)
        ));
    }

    #[test]
    fn run_fetch_rejects_conflicting_timers() {
        let dir = tempdir().unwrap();
        let source = RonCatalogSource::new(dir.path());
        let record = ChainUnitRecord {
            camp_time: 1,
            deployment_time: 2,
            ..Default::default()
        };
        source.save_unit_detail(UnitId(5), &record).unwrap();
        assert!(matches!(
            run_fetch(&source, FetchKind::UnitDetail(UnitId(5)), ""),
            Err(CatalogError::Record(_))
        ));
    }

    #[test]
    fn kinds_display_for_logs() {
        assert_eq!(FetchKind::Roster.to_string(), "roster");
        assert_eq!(FetchKind::UnitDetail(UnitId(3)).to_string(), "unit #3");
    }
}
