//! Asynchronous model loading
//!
//! Files are read and decoded on the async compute pool; the decoded model
//! is installed into the session on the main schedule once the task is done.
//! A failed load leaves the current model in place.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future};
use inkmark_ipc::ViewerEvent;
use painting::{
    AssetLoadError, LoadedModel, MainMesh, Normalization, PaintSession, RenderBackend, load_model,
};

use crate::{OutboundViewerEvents, ViewerSession, ViewerSettings};

/// A model to load, and which of its meshes to paint
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub designation: MainMesh,
}

/// An in-flight load
#[derive(Component)]
pub struct ModelLoadTask {
    request: LoadRequest,
    task: Task<Result<LoadedModel, AssetLoadError>>,
}

/// Plugin for loading models off the main thread
pub struct ModelLoadingPlugin;

impl Plugin for ModelLoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_startup_model)
            .add_systems(Update, poll_load_tasks);
    }
}

/// Start decoding a model on the async compute pool.
pub(crate) fn spawn_load(commands: &mut Commands, request: LoadRequest) {
    info!("Loading model {:?}", request.path);
    let path = request.path.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move { load_model(&path) });
    commands.spawn(ModelLoadTask { request, task });
}

fn load_startup_model(
    mut commands: Commands,
    settings: Res<ViewerSettings>,
    session: Res<ViewerSession>,
) {
    let Some(path) = settings.model.clone() else {
        info!("No model configured, showing an empty scene");
        return;
    };
    spawn_load(
        &mut commands,
        LoadRequest {
            path,
            designation: session.main_mesh(),
        },
    );
}

fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ModelLoadTask)>,
    mut session: ResMut<ViewerSession>,
    mut events: ResMut<OutboundViewerEvents>,
) {
    for (entity, mut load) in tasks.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut load.task)) else {
            continue;
        };
        commands.entity(entity).despawn();

        let request = &load.request;
        for event in finish_load(&mut session.0, &request.path, result, &request.designation) {
            events.send(event);
        }
    }
}

/// Install a finished load and describe the outcome.
pub(crate) fn finish_load<R: RenderBackend>(
    session: &mut PaintSession<R>,
    path: &Path,
    result: Result<LoadedModel, AssetLoadError>,
    designation: &MainMesh,
) -> Vec<ViewerEvent> {
    let source = path.display().to_string();
    match result.and_then(|model| session.install_model(model, designation)) {
        Ok(report) => {
            let paintable = session
                .registry()
                .get(report.paintable)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            vec![
                ViewerEvent::ModelLoaded {
                    source,
                    meshes: report.meshes,
                    paintable,
                    normalized: matches!(report.normalization, Normalization::Applied(_)),
                },
                ViewerEvent::HistoryChanged {
                    can_undo: session.can_undo(),
                },
            ]
        }
        Err(err) => {
            error!("Failed to load {}: {}", source, err);
            vec![ViewerEvent::ModelLoadFailed {
                source,
                message: err.to_string(),
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};
    use inkmark_config::SessionConfig;
    use painting::{MeshData, SoftwareRenderer};

    use super::*;

    fn two_mesh_model() -> LoadedModel {
        let mesh = |name: &str, offset: f32| MeshData {
            name: name.to_string(),
            positions: vec![
                Vec3::new(offset, 0.0, 0.0),
                Vec3::new(offset + 1.0, 0.0, 0.0),
                Vec3::new(offset, 2.0, 0.5),
            ],
            colors: None,
            indices: vec![0, 1, 2],
            transform: Mat4::IDENTITY,
        };
        LoadedModel {
            source: PathBuf::from("figure.glb"),
            meshes: vec![mesh("hair", 0.0), mesh("body", 2.0)],
        }
    }

    fn session() -> PaintSession<SoftwareRenderer> {
        PaintSession::with_software_renderer(SessionConfig::default())
    }

    #[test]
    fn test_named_main_mesh_is_reported() {
        let mut session = session();
        let events = finish_load(
            &mut session,
            Path::new("figure.glb"),
            Ok(two_mesh_model()),
            &MainMesh::Named("body".into()),
        );
        assert_eq!(
            events[0],
            ViewerEvent::ModelLoaded {
                source: "figure.glb".into(),
                meshes: vec!["hair".into(), "body".into()],
                paintable: "body".into(),
                normalized: true,
            }
        );
        assert_eq!(events[1], ViewerEvent::HistoryChanged { can_undo: false });
    }

    #[test]
    fn test_failed_load_reports_and_keeps_model() {
        let mut session = session();
        finish_load(
            &mut session,
            Path::new("figure.glb"),
            Ok(two_mesh_model()),
            &MainMesh::First,
        );
        let revision = session.registry().model_revision();

        let events = finish_load(
            &mut session,
            Path::new("broken.obj"),
            Err(AssetLoadError::Parse {
                path: PathBuf::from("broken.obj"),
                details: "unexpected token".into(),
            }),
            &MainMesh::First,
        );
        assert!(matches!(
            &events[..],
            [ViewerEvent::ModelLoadFailed { source, .. }] if source == "broken.obj"
        ));
        assert_eq!(session.registry().model_revision(), revision);
        assert_eq!(session.registry().paintable().unwrap().name, "hair");
    }
}
