use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use cm_catalog::{CONFIG_PATH, CatalogHandle, FetchKind, FetchRequest, MapConfig, RonCatalogSource};
use cm_core::{CommandRequested, MapPhase, MapPhaseChanged, MapSystems};
use cm_map::{HighlightController, PointerOverUi, SelectionMarker, TerritoryIndex, WorldScene, spawn_world_scene};
use std::path::Path;

/// Lowest and highest camera height reachable by zooming.
const MIN_HEIGHT: f32 = 20.0;
const MAX_HEIGHT: f32 = 600.0;

fn main() {
    let (config, config_error) = MapConfig::load_or_default(Path::new(CONFIG_PATH));

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window_title.clone(),
                    resolution: (1280.0, 800.0).into(),
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: config.log_filter.clone(),
                ..default()
            }))
        // Read by plugins while they build
        .insert_resource(config.clone())
        .insert_resource(ConfigProblem(config_error.map(|e| e.to_string())))
        .add_plugins((
            cm_core::CmCorePlugin,
            cm_world::CmWorldPlugin,
            cm_map::CmMapPlugin,
            cm_selection::CmSelectionPlugin,
            cm_catalog::CmCatalogPlugin,
            cm_hud::CmHudPlugin,
        ))
        .insert_resource(config.player_profile())
        .insert_resource(config.highlight_style())
        .insert_resource(CatalogHandle::new(RonCatalogSource::new(config.catalog_dir.clone())))
        .add_systems(Startup, (report_config, setup_scene))
        .add_systems(Update, (
            camera_zoom,
            camera_pan,
            reload_world,
        ).in_set(MapSystems::Input))
        .add_systems(Update, log_commands.in_set(MapSystems::Presentation))
        .run();
}

/// Config load failure, kept until logging is available.
#[derive(Resource)]
struct ConfigProblem(Option<String>);

fn report_config(problem: Res<ConfigProblem>, config: Res<MapConfig>) {
    match &problem.0 {
        Some(e) => warn!("Using default config, {} could not be read: {}", CONFIG_PATH, e),
        None => info!("Config loaded, catalog at {}", config.catalog_dir.display()),
    }
}

fn setup_scene(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<MapConfig>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 220.0, 160.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(100.0, 300.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    info!("Loading world scene {}", config.world_scene);
    spawn_world_scene(&mut commands, asset_server.load(config.world_scene.clone()));
}

/// Scroll moves the camera along its view direction.
fn camera_zoom(
    mut scroll_events: EventReader<MouseWheel>,
    over_ui: Res<PointerOverUi>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    let mut scroll_delta = 0.0;

    for event in scroll_events.read() {
        scroll_delta += match event.unit {
            MouseScrollUnit::Line => event.y * 10.0,
            MouseScrollUnit::Pixel => event.y * 0.1,
        };
    }

    if scroll_delta == 0.0 || over_ui.0 {
        return;
    }

    for mut transform in &mut query {
        let forward = transform.forward();
        let next = transform.translation + forward * scroll_delta;
        if (MIN_HEIGHT..=MAX_HEIGHT).contains(&next.y) {
            transform.translation = next;
        }
    }
}

/// Arrow keys or right-drag pan across the ground plane.
fn camera_pan(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion_events: EventReader<MouseMotion>,
    over_ui: Res<PointerOverUi>,
    mut query: Query<&mut Transform, With<Camera3d>>,
    time: Res<Time>,
) {
    let mut pan_delta = Vec2::ZERO;

    let pan_speed = 150.0;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        pan_delta.x -= pan_speed * time.delta_secs();
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        pan_delta.x += pan_speed * time.delta_secs();
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        pan_delta.y -= pan_speed * time.delta_secs();
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        pan_delta.y += pan_speed * time.delta_secs();
    }

    // Left click is reserved for picking
    if mouse.pressed(MouseButton::Right) && !over_ui.0 {
        for event in motion_events.read() {
            pan_delta.x -= event.delta.x * 0.5;
            pan_delta.y -= event.delta.y * 0.5;
        }
    } else {
        motion_events.clear();
    }

    if pan_delta == Vec2::ZERO {
        return;
    }

    for mut transform in &mut query {
        transform.translation.x += pan_delta.x;
        transform.translation.z += pan_delta.y;
    }
}

/// F5 drops the world scene and every catalog, then loads them again.
/// The selection ids survive and resolve once the new data arrives; the
/// highlight is redrawn when the rebuilt index is ready.
#[allow(clippy::too_many_arguments)]
fn reload_world(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<MapConfig>,
    scenes: Query<Entity, With<WorldScene>>,
    markers: Query<Entity, With<SelectionMarker>>,
    mut index: ResMut<TerritoryIndex>,
    mut highlight: ResMut<HighlightController>,
    phase: Res<State<MapPhase>>,
    mut next_phase: ResMut<NextState<MapPhase>>,
    mut phase_changed: EventWriter<MapPhaseChanged>,
    mut requests: EventWriter<FetchRequest>,
) {
    if !keys.just_pressed(KeyCode::F5) {
        return;
    }

    info!("Reloading world scene and catalogs");
    for entity in scenes.iter().chain(markers.iter()) {
        commands.entity(entity).despawn_recursive();
    }
    index.clear();
    highlight.reset();

    if *phase.get() != MapPhase::Loading {
        next_phase.set(MapPhase::Loading);
        phase_changed.send(MapPhaseChanged {
            from: *phase.get(),
            to: MapPhase::Loading,
        });
    }

    spawn_world_scene(&mut commands, asset_server.load(config.world_scene.clone()));
    for kind in FetchKind::CATALOGS {
        requests.send(FetchRequest(kind));
    }
}

/// Stand-in for the transaction layer: commands are only logged.
fn log_commands(mut requested: EventReader<CommandRequested>) {
    for command in requested.read() {
        info!(
            "Command {} requested for SamuraiWarrior {} at {}",
            command.kind.label(),
            command.unit,
            command.territory
        );
    }
}
