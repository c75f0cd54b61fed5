//! Mouse painting and keyboard shortcuts
//!
//! Controls:
//! - P: Toggle paint mode
//! - Left mouse (paint mode): Paint
//! - `+` / `-`: Zoom in / out
//! - `[` / `]`: Shrink / grow the brush
//! - Ctrl+Z: Undo
//! - Enter: Capture

use bevy::input::mouse::MouseButton;
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow};
use inkmark_ipc::{ViewerCommand, ViewerEvent};

use crate::{OutboundViewerEvents, ViewerCommandMessage, ViewerSession};

/// Plugin for pointer painting and hotkeys
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (handle_paint_input, handle_shortcuts));
    }
}

/// Commands for the keys pressed this frame.
pub fn shortcut_commands(
    keys: &ButtonInput<KeyCode>,
    paint_mode: bool,
    brush_ui_value: i32,
) -> Vec<ViewerCommand> {
    let ctrl = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
    let mut commands = Vec::new();

    if keys.just_pressed(KeyCode::KeyP) {
        commands.push(ViewerCommand::SetPaintMode {
            enabled: !paint_mode,
        });
    }
    if ctrl && keys.just_pressed(KeyCode::KeyZ) {
        commands.push(ViewerCommand::Undo);
    }
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        commands.push(ViewerCommand::ZoomIn);
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        commands.push(ViewerCommand::ZoomOut);
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        commands.push(ViewerCommand::SetBrushRadius {
            ui_value: brush_ui_value - 1,
        });
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        commands.push(ViewerCommand::SetBrushRadius {
            ui_value: brush_ui_value + 1,
        });
    }
    if keys.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]) {
        commands.push(ViewerCommand::Capture);
    }
    commands
}

fn handle_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    session: Res<ViewerSession>,
    mut writer: MessageWriter<ViewerCommandMessage>,
) {
    let ui_value = session.engine().brush().ui_value();
    for command in shortcut_commands(&keys, session.paint_mode(), ui_value) {
        writer.write(ViewerCommandMessage(command));
    }
}

/// Handle painting with the left mouse button
fn handle_paint_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<(Entity, &Window), With<PrimaryWindow>>,
    mut cursor_events: MessageReader<CursorMoved>,
    mut session: ResMut<ViewerSession>,
    mut events: ResMut<OutboundViewerEvents>,
) {
    if !session.paint_mode() {
        cursor_events.clear();
        return;
    }

    let Ok((window_entity, window)) = windows.single() else {
        return;
    };
    let viewport = Vec2::new(window.width(), window.height());

    // Collect cursor positions from this frame
    let cursor_positions: Vec<Vec2> = cursor_events
        .read()
        .filter(|e| e.window == window_entity)
        .map(|e| e.position)
        .collect();

    if mouse_button.just_pressed(MouseButton::Left) {
        if !session.begin_stroke() {
            return;
        }
        if let Some(cursor) = cursor_positions.last().copied().or_else(|| window.cursor_position()) {
            session.paint_pointer(cursor.to_array().into(), viewport.to_array().into());
        }
    } else if mouse_button.pressed(MouseButton::Left) && session.engine().is_stroke_active() {
        for cursor in cursor_positions {
            session.paint_pointer(cursor.to_array().into(), viewport.to_array().into());
        }
    }

    if mouse_button.just_released(MouseButton::Left) && session.end_stroke() {
        events.send(ViewerEvent::HistoryChanged {
            can_undo: session.can_undo(),
        });
    }
}
