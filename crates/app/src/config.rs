//! Application configuration read from the environment

use std::path::PathBuf;

use bevy::prelude::*;
use inkmark_config::SessionConfig;
use inkmark_scene::ViewerSettings;

/// Model to open on startup
const MODEL_VAR: &str = "INKMARK_MODEL";
/// Name of the mesh to paint on
const MAIN_MESH_VAR: &str = "INKMARK_MAIN_MESH";
/// Where captures are written
const CAPTURE_DIR_VAR: &str = "INKMARK_CAPTURE_DIR";
/// Set to `0` to stop reading commands from stdin
const STDIO_VAR: &str = "INKMARK_STDIO";

/// Application configuration
#[derive(Debug, Clone)]
pub struct InkmarkConfig {
    pub model: Option<PathBuf>,
    pub main_mesh: Option<String>,
    pub capture_dir: Option<PathBuf>,
    /// Accept JSON commands on stdin and report events on stdout
    pub stdio_bridge: bool,
}

impl InkmarkConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Self {
            model: non_empty(MODEL_VAR).map(PathBuf::from),
            main_mesh: non_empty(MAIN_MESH_VAR),
            capture_dir: non_empty(CAPTURE_DIR_VAR).map(PathBuf::from),
            stdio_bridge: !matches!(lookup(STDIO_VAR).as_deref(), Some("0" | "false" | "off")),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            main_mesh: self.main_mesh.clone(),
            ..default()
        }
    }

    pub fn viewer_settings(&self) -> ViewerSettings {
        let mut settings = ViewerSettings {
            model: self.model.clone(),
            ..default()
        };
        if let Some(dir) = &self.capture_dir {
            settings.capture_dir = dir.clone();
        }
        settings
    }
}
