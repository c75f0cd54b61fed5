//! Line-delimited JSON bridge to the annotation form
//!
//! Each stdin line is one [`ViewerCommand`]; each outbound [`ViewerEvent`]
//! is written to stdout as one line. Diagnostics go to the log, never stdout.

use std::io::{BufRead, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver};

use bevy::prelude::*;
use inkmark_ipc::{ViewerCommand, ViewerEvent, from_json, to_json};
use inkmark_scene::{OutboundViewerEvents, ViewerCommandMessage};

/// Plugin that forwards commands and events across stdio
pub struct BridgePlugin {
    pub stdio: bool,
}

/// Raw command lines from the reader thread
#[derive(Resource)]
struct InboundLines(Mutex<Receiver<String>>);

#[derive(Resource)]
struct StdoutEvents(bool);

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(StdoutEvents(self.stdio))
            .add_systems(PostUpdate, forward_viewer_events);

        if self.stdio {
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });
            app.insert_resource(InboundLines(Mutex::new(rx)))
                .add_systems(PreUpdate, read_inbound_commands);
            info!("Reading viewer commands from stdin");
        }
    }
}

/// Parse a command line; blank lines are skipped.
fn parse_command(line: &str) -> Option<ViewerCommand> {
    if line.trim().is_empty() {
        return None;
    }
    match from_json(line) {
        Ok(command) => Some(command),
        Err(err) => {
            warn!("Ignoring malformed command: {}", err);
            None
        }
    }
}

fn read_inbound_commands(
    inbound: Res<InboundLines>,
    mut writer: MessageWriter<ViewerCommandMessage>,
) {
    let Ok(rx) = inbound.0.lock() else {
        return;
    };
    while let Ok(line) = rx.try_recv() {
        if let Some(command) = parse_command(&line) {
            writer.write(ViewerCommandMessage(command));
        }
    }
}

/// Short description for the log; attachments are summarised by count.
fn describe(event: &ViewerEvent) -> String {
    match event {
        ViewerEvent::CaptureReady {
            focused,
            attachments,
        } => format!("CaptureReady(focused={focused}, {} files)", attachments.len()),
        other => format!("{other:?}"),
    }
}

fn forward_viewer_events(
    mut outbound: ResMut<OutboundViewerEvents>,
    stdout_events: Res<StdoutEvents>,
) {
    let events = outbound.drain();
    if events.is_empty() {
        return;
    }

    let mut stdout = std::io::stdout().lock();
    for event in events {
        debug!("Viewer event: {}", describe(&event));
        if !stdout_events.0 {
            continue;
        }
        match to_json(&event) {
            Ok(json) => {
                if let Err(err) = writeln!(stdout, "{json}") {
                    warn!("Failed to write event: {}", err);
                }
            }
            Err(err) => error!("Failed to encode event: {}", err),
        }
    }
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        assert_eq!(
            parse_command(r#"{"type":"SetPaintMode","data":{"enabled":true}}"#),
            Some(ViewerCommand::SetPaintMode { enabled: true })
        );
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("not json"), None);
    }

    #[test]
    fn test_capture_description_omits_bytes() {
        let event = ViewerEvent::CaptureReady {
            focused: true,
            attachments: inkmark_ipc::screenshot_attachments(vec![vec![1, 2, 3]; 2]),
        };
        assert_eq!(describe(&event), "CaptureReady(focused=true, 2 files)");
    }
}
