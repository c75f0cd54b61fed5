//! Inkmark - paint annotations onto a 3D model and capture the views

use bevy::prelude::*;
use bevy::window::WindowResolution;
use inkmark_config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

mod bridge;
mod config;

use bridge::BridgePlugin;
use config::InkmarkConfig;
use inkmark_scene::ScenePlugin;

fn main() {
    // Parse configuration from environment
    let config = InkmarkConfig::from_env();

    let window_config = Window {
        title: "Inkmark".into(),
        resolution: WindowResolution::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut app = App::new();

    // ScenePlugin reads these while building
    app.insert_resource(config.session_config())
        .insert_resource(config.viewer_settings());

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window_config),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                ..default()
            }),
    );

    app.add_plugins(ScenePlugin)
        .add_plugins(BridgePlugin {
            stdio: config.stdio_bridge,
        })
        .run();
}
