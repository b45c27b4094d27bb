use bevy::prelude::*;

/// Lifecycle of the map screen.
///
/// Picking is only available once the world asset has been harvested into
/// the territory index; pointer clicks during `Loading` are dropped.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum MapPhase {
    /// World asset is still loading, territory index is empty.
    #[default]
    Loading,
    /// Territory index is built and picking is enabled.
    Ready,
}

impl MapPhase {
    /// Get the display name for UI and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Ready => "Ready",
        }
    }
}

/// Event fired when the map moves between phases.
#[derive(Event, Clone, Debug)]
pub struct MapPhaseChanged {
    pub from: MapPhase,
    pub to: MapPhase,
}

/// System logging phase transitions.
pub fn log_phase_changes(mut events: EventReader<MapPhaseChanged>) {
    for event in events.read() {
        info!("Map phase: {} -> {}", event.from.name(), event.to.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_loading() {
        assert_eq!(MapPhase::default(), MapPhase::Loading);
    }
}
