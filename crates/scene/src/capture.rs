//! Capture output
//!
//! Captured views are PNG-encoded, wrapped as `screenshot_<n>.png`
//! attachments for the form side and also written to the capture directory.

use std::fs;
use std::io;
use std::path::Path;

use inkmark_ipc::{Attachment, screenshot_attachments};
use painting::{PaintSession, RenderBackend, SessionError};

/// Run a capture pass and package the frames. Returns whether the annotated
/// region was framed, and the attachments in capture order.
pub fn capture_attachments<R: RenderBackend>(
    session: &mut PaintSession<R>,
) -> Result<(bool, Vec<Attachment>), SessionError> {
    let capture = session.capture()?;
    let pngs = capture.encode_png()?;
    Ok((capture.plan.is_focused(), screenshot_attachments(pngs)))
}

/// Write attachments into `dir`, creating it if needed.
pub fn write_screenshots(dir: &Path, attachments: &[Attachment]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for attachment in attachments {
        fs::write(dir.join(&attachment.filename), &attachment.data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use inkmark_config::SessionConfig;

    use super::*;

    #[test]
    fn test_empty_scene_captures_default_views() {
        let mut config = SessionConfig::default();
        config.capture.width = 16;
        config.capture.height = 12;
        let mut session = PaintSession::with_software_renderer(config);

        let (focused, attachments) = capture_attachments(&mut session).unwrap();
        assert!(!focused);
        assert_eq!(attachments.len(), 4);
        assert_eq!(attachments[0].filename, "screenshot_1.png");
        assert_eq!(&attachments[3].data[1..4], b"PNG");
    }

    #[test]
    fn test_write_screenshots() {
        let dir = std::env::temp_dir().join(format!("inkmark-capture-{}", std::process::id()));
        let attachments = screenshot_attachments(vec![vec![1, 2, 3], vec![4]]);
        write_screenshots(&dir, &attachments).unwrap();

        assert_eq!(fs::read(dir.join("screenshot_1.png")).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(dir.join("screenshot_2.png")).unwrap(), vec![4]);
        fs::remove_dir_all(&dir).unwrap();
    }
}
