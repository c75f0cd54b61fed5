//! Message protocol for inkmark
//!
//! Defines the messages exchanged between the viewer and the external form
//! that collects annotations: commands in, events and captured attachments
//! out. Everything is serde JSON with `{"type": ..., "data": ...}` tagging.

mod commands;
mod error;
mod messages;

pub use commands::*;
pub use error::*;
pub use messages::*;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a message as JSON.
pub fn to_json<T: Serialize>(message: &T) -> Result<String, IpcError> {
    serde_json::to_string(message).map_err(IpcError::Encode)
}

/// Decode a JSON message.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    serde_json::from_str(json).map_err(IpcError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let json = to_json(&ViewerCommand::SetPaintMode { enabled: true }).unwrap();
        assert_eq!(json, r#"{"type":"SetPaintMode","data":{"enabled":true}}"#);

        let json = to_json(&ViewerCommand::Undo).unwrap();
        assert_eq!(json, r#"{"type":"Undo"}"#);
    }

    #[test]
    fn test_load_model_main_mesh_is_optional() {
        let command: ViewerCommand =
            from_json(r#"{"type":"LoadModel","data":{"path":"body.glb"}}"#).unwrap();
        assert_eq!(
            command,
            ViewerCommand::LoadModel {
                path: "body.glb".to_string(),
                main_mesh: None
            }
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            from_json::<ViewerCommand>("  "),
            Err(IpcError::InvalidFormat(_))
        ));
        assert!(matches!(
            from_json::<ViewerCommand>(r#"{"type":"Explode"}"#),
            Err(IpcError::Decode(_))
        ));
    }

    #[test]
    fn test_screenshot_attachments_are_numbered_in_order() {
        let attachments = screenshot_attachments(vec![vec![1], vec![2], vec![3]]);
        let names: Vec<&str> = attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["screenshot_1.png", "screenshot_2.png", "screenshot_3.png"]);
        assert!(attachments.iter().all(|a| a.content_type == "image/png"));
        assert_eq!(attachments[2].data, vec![3]);
    }

    #[test]
    fn test_event_round_trip() {
        let event = ViewerEvent::CaptureReady {
            focused: true,
            attachments: screenshot_attachments(vec![vec![0x89, b'P']]),
        };
        let decoded: ViewerEvent = from_json(&to_json(&event).unwrap()).unwrap();
        assert_eq!(decoded, event);
    }
}
