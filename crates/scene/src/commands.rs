//! Dispatching viewer commands into the session
//!
//! Keyboard shortcuts and the form side both speak [`ViewerCommand`]; every
//! command is applied here and answered with [`ViewerEvent`]s.

use std::path::Path;

use bevy::prelude::*;
use inkmark_ipc::{ViewerCommand, ViewerEvent};
use painting::{MainMesh, PaintSession, RenderBackend};

use crate::capture::{capture_attachments, write_screenshots};
use crate::loading::{LoadRequest, spawn_load};
use crate::{OutboundViewerEvents, ViewerCommandMessage, ViewerSession, ViewerSettings};

/// Plugin that applies [`ViewerCommandMessage`]s
pub struct CommandPlugin;

impl Plugin for CommandPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_viewer_commands);
    }
}

fn apply_viewer_commands(
    mut commands: Commands,
    mut messages: MessageReader<ViewerCommandMessage>,
    mut session: ResMut<ViewerSession>,
    settings: Res<ViewerSettings>,
    mut events: ResMut<OutboundViewerEvents>,
) {
    for ViewerCommandMessage(command) in messages.read() {
        if let Some(request) =
            apply_command(&mut session.0, command.clone(), &settings.capture_dir, &mut events)
        {
            spawn_load(&mut commands, request);
        }
    }
}

/// Apply one command. Loads are returned to the caller, which decides where
/// the decoding runs.
pub fn apply_command<R: RenderBackend>(
    session: &mut PaintSession<R>,
    command: ViewerCommand,
    capture_dir: &Path,
    events: &mut OutboundViewerEvents,
) -> Option<LoadRequest> {
    match command {
        ViewerCommand::LoadModel { path, main_mesh } => {
            let designation = main_mesh
                .map(MainMesh::Named)
                .unwrap_or_else(|| session.main_mesh());
            return Some(LoadRequest {
                path: path.into(),
                designation,
            });
        }
        ViewerCommand::SetPaintMode { enabled } => {
            session.set_paint_mode(enabled);
            events.send(ViewerEvent::PaintModeChanged { enabled });
        }
        ViewerCommand::SetBrushRadius { ui_value } => {
            let radius = session.set_brush_radius(ui_value);
            events.send(ViewerEvent::BrushRadiusChanged {
                ui_value: session.engine().brush().ui_value(),
                radius,
            });
        }
        ViewerCommand::Undo => {
            if !session.undo() {
                debug!("Nothing to undo");
            }
            events.send(ViewerEvent::HistoryChanged {
                can_undo: session.can_undo(),
            });
        }
        ViewerCommand::Capture => match capture_attachments(session) {
            Ok((focused, attachments)) => {
                if let Err(err) = write_screenshots(capture_dir, &attachments) {
                    warn!("Could not write captures to {:?}: {}", capture_dir, err);
                }
                info!(
                    "Capture ready: {} {} views",
                    attachments.len(),
                    if focused { "focused" } else { "default" }
                );
                events.send(ViewerEvent::CaptureReady {
                    focused,
                    attachments,
                });
            }
            Err(err) => {
                error!("Capture failed: {}", err);
                events.send(ViewerEvent::CaptureFailed {
                    message: err.to_string(),
                });
            }
        },
        ViewerCommand::ZoomIn => {
            let zoom = session.zoom_in();
            events.send(ViewerEvent::ZoomChanged { zoom });
        }
        ViewerCommand::ZoomOut => {
            let zoom = session.zoom_out();
            events.send(ViewerEvent::ZoomChanged { zoom });
        }
    }
    None
}
