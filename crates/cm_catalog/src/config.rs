//! Runtime settings read from `assets/config/map.ron`.

use bevy::color::ColorToComponents;
use bevy::prelude::*;
use cm_core::ClanId;
use cm_map::HighlightStyle;
use cm_world::PlayerProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CatalogError;
use crate::ron_io::{load_optional_ron, save_ron};

/// Default location of the map config.
pub const CONFIG_PATH: &str = "assets/config/map.ron";

/// Bounds of the unit refresh period, in seconds.
const MIN_REFRESH_SECS: f32 = 0.5;
const MAX_REFRESH_SECS: f32 = 3600.0;

/// Map settings. Every field falls back to its default when omitted.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// glTF scene holding the territory meshes, relative to `assets/`.
    pub world_scene: String,
    /// Directory read by the RON catalog source.
    pub catalog_dir: PathBuf,
    pub player_address: String,
    pub player_clan: Option<ClanId>,
    pub window_title: String,
    pub selected_color: [f32; 3],
    pub default_color: [f32; 3],
    pub marker_offset: [f32; 3],
    pub occupied_lift: f32,
    /// Seconds between re-reads of the selected unit.
    pub unit_refresh_secs: f32,
    /// `EnvFilter` directives handed to the log plugin.
    pub log_filter: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        let style = HighlightStyle::default();
        Self {
            world_scene: "models/world.glb#Scene0".into(),
            catalog_dir: PathBuf::from("assets/catalog"),
            player_address: String::new(),
            player_clan: None,
            window_title: "Clan Map".into(),
            selected_color: style.active_color.to_srgba().to_f32_array_no_alpha(),
            default_color: style.default_color.to_srgba().to_f32_array_no_alpha(),
            marker_offset: style.marker_offset.to_array(),
            occupied_lift: style.occupied_lift,
            unit_refresh_secs: 5.0,
            log_filter: "info,wgpu=error,naga=warn,cm_map=debug,cm_selection=debug".into(),
        }
    }
}

impl MapConfig {
    /// Read the config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Ok(load_optional_ron(path)?.unwrap_or_default())
    }

    /// Read the config, falling back to the defaults on a malformed file.
    /// The error is handed back so it can be logged once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<CatalogError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        save_ron(path, self)
    }

    pub fn player_profile(&self) -> PlayerProfile {
        PlayerProfile {
            address: self.player_address.clone(),
            clan: self.player_clan,
        }
    }

    pub fn highlight_style(&self) -> HighlightStyle {
        let [r, g, b] = self.selected_color;
        let [dr, dg, db] = self.default_color;
        HighlightStyle {
            active_color: Color::srgb(r, g, b),
            default_color: Color::srgb(dr, dg, db),
            marker_offset: Vec3::from_array(self.marker_offset),
            occupied_lift: self.occupied_lift,
            ..default()
        }
    }

    /// Refresh period, clamped to half a second up to an hour.
    /// A NaN falls back to the default period.
    pub fn unit_refresh_interval(&self) -> Duration {
        let secs = if self.unit_refresh_secs.is_nan() {
            Self::default().unit_refresh_secs
        } else {
            self.unit_refresh_secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
        };
        Duration::from_secs_f32(secs)
    }
}
