//! Bevy viewer for inkmark
//!
//! This crate wraps a [`PaintSession`] in Bevy: it mirrors the session's
//! surfaces as meshes, drives the camera from the session, maps mouse and
//! keyboard input onto session operations, loads models off the main thread
//! and writes captured views to disk.

use std::path::PathBuf;

use bevy::ecs::message::Message;
use bevy::prelude::*;
use inkmark_config::SessionConfig;
use inkmark_ipc::{ViewerCommand, ViewerEvent};
use painting::{PaintSession, SoftwareRenderer};

mod camera;
mod capture;
mod commands;
mod input;
mod lighting;
mod loading;
mod surfaces;

pub use camera::{CameraControllerPlugin, MainCamera};
pub use capture::{capture_attachments, write_screenshots};
pub use commands::{CommandPlugin, apply_command};
pub use input::InputPlugin;
pub use lighting::{Ground, LightingPlugin};
pub use loading::{LoadRequest, ModelLoadTask, ModelLoadingPlugin};
pub use surfaces::{SurfaceMesh, SurfaceMeshPlugin, vertex_colors, vertex_normals};

/// The paint session shared by every viewer system
#[derive(Resource, Deref, DerefMut)]
pub struct ViewerSession(pub PaintSession<SoftwareRenderer>);

/// Where models come from and captures go
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings {
    /// Model loaded on startup
    pub model: Option<PathBuf>,
    /// Directory captured `screenshot_<n>.png` files are written to
    pub capture_dir: PathBuf,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            model: None,
            capture_dir: PathBuf::from("captures"),
        }
    }
}

/// A command for the viewer, from input handling or the form side
#[derive(Message, Debug, Clone)]
pub struct ViewerCommandMessage(pub ViewerCommand);

/// Resource for queuing events to report to the form side
/// The app crate drains this and forwards the events
#[derive(Resource, Default)]
pub struct OutboundViewerEvents {
    pub events: Vec<ViewerEvent>,
}

impl OutboundViewerEvents {
    /// Queue an event
    pub fn send(&mut self, event: ViewerEvent) {
        self.events.push(event);
    }

    /// Take all queued events, leaving the queue empty
    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SessionConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(ViewerSession(PaintSession::with_software_renderer(config)));

        app.init_resource::<ViewerSettings>()
            .init_resource::<OutboundViewerEvents>()
            .add_message::<ViewerCommandMessage>();

        app.add_plugins(LightingPlugin);
        app.add_plugins(CameraControllerPlugin);
        app.add_plugins(SurfaceMeshPlugin);
        app.add_plugins(ModelLoadingPlugin);
        app.add_plugins(InputPlugin);
        app.add_plugins(CommandPlugin);
    }
}
