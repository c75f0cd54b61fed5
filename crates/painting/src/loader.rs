//! Model import for glTF/GLB and Wavefront OBJ.
//!
//! Loading only reads and decodes; it never touches a session, so it can run
//! on a worker thread. Installing the result is a separate step that keeps
//! the previous model on failure.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use tracing::{debug, info, warn};

use crate::constants::DEFAULT_VERTEX_COLOR;
use crate::error::AssetLoadError;
use crate::surface::{Surface, SurfaceTransform};
use crate::types::Rgb;
use crate::validation::clamp_color;

/// Supported model file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.gltf` or `.glb`
    Gltf,
    Obj,
}

impl ModelFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "gltf" | "glb" => Some(ModelFormat::Gltf),
                "obj" => Some(ModelFormat::Obj),
                _ => None,
            })
    }
}

/// One triangle mesh of a model, in object space.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// `None` when the asset has no colour attribute
    pub colors: Option<Vec<Rgb>>,
    pub indices: Vec<u32>,
    /// Flattened scene-graph transform
    pub transform: Mat4,
}

/// A decoded model, ready to be installed.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub source: PathBuf,
    pub meshes: Vec<MeshData>,
}

impl LoadedModel {
    pub fn mesh_names(&self) -> Vec<&str> {
        self.meshes.iter().map(|m| m.name.as_str()).collect()
    }

    /// Validate every mesh and turn it into a surface.
    pub fn into_surfaces(self) -> Result<Vec<Surface>, AssetLoadError> {
        self.meshes
            .into_iter()
            .map(|mesh| {
                let transform = SurfaceTransform::from_matrix(mesh.transform);
                // Asset colours may be HDR or garbage; surfaces hold 0..=1
                let colors = mesh
                    .colors
                    .map(|colors| colors.into_iter().map(clamp_color).collect());
                Surface::new(mesh.name.clone(), mesh.positions, colors, mesh.indices)
                    .map(|surface| surface.with_transform(transform))
                    .map_err(|source| AssetLoadError::InvalidMesh {
                        mesh: mesh.name,
                        source,
                    })
            })
            .collect()
    }
}

/// Load a model from file, auto-detecting format from extension.
pub fn load_model(path: &Path) -> Result<LoadedModel, AssetLoadError> {
    let format = ModelFormat::from_path(path).ok_or_else(|| AssetLoadError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading model from {:?} (format: {:?})", path, format);

    let model = match format {
        ModelFormat::Gltf => load_gltf(path)?,
        ModelFormat::Obj => {
            let file = File::open(path).map_err(|source| AssetLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_obj(&mut BufReader::new(file), path)?
        }
    };

    let vertices: usize = model.meshes.iter().map(|m| m.positions.len()).sum();
    info!(
        "Loaded model: {} meshes {:?}, {} vertices",
        model.meshes.len(),
        model.mesh_names(),
        vertices
    );
    Ok(model)
}

fn load_gltf(path: &Path) -> Result<LoadedModel, AssetLoadError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|err| match err {
        gltf::Error::Io(source) => AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => AssetLoadError::Parse {
            path: path.to_path_buf(),
            details: other.to_string(),
        },
    })?;
    gltf_model(&document, &buffers, path)
}

/// Decode a glTF/GLB held in memory. `path` only labels errors.
pub fn parse_gltf(bytes: &[u8], path: &Path) -> Result<LoadedModel, AssetLoadError> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|err| AssetLoadError::Parse {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;
    gltf_model(&document, &buffers, path)
}

fn gltf_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &Path,
) -> Result<LoadedModel, AssetLoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetLoadError::Empty {
            model: path.display().to_string(),
        })?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, buffers, &mut meshes);
    }

    if meshes.is_empty() {
        return Err(AssetLoadError::Empty {
            model: path.display().to_string(),
        });
    }
    Ok(LoadedModel {
        source: path.to_path_buf(),
        meshes,
    })
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = node
            .name()
            .or(mesh.name())
            .map(String::from)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        if let Some(data) = merge_primitives(&mesh, buffers, name, world) {
            out.push(data);
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

/// Merge all triangle primitives of a glTF mesh into one vertex/index list.
fn merge_primitives(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    name: String,
    transform: Mat4,
) -> Option<MeshData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut colors: Vec<Option<Vec<Rgb>>> = Vec::new();
    let mut primitive_lengths = Vec::new();
    let mut indices = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping {:?} primitive of mesh {}", primitive.mode(), name);
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let Some(prim_positions) = reader.read_positions() else {
            continue;
        };

        let base = positions.len() as u32;
        let start = positions.len();
        positions.extend(prim_positions.map(Vec3::from));
        let count = positions.len() - start;
        primitive_lengths.push(count);

        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| i + base)),
            None => indices.extend(base..base + count as u32),
        }
        colors.push(
            reader
                .read_colors(0)
                .map(|c| c.into_rgb_f32().collect::<Vec<Rgb>>()),
        );
    }

    if positions.is_empty() || indices.is_empty() {
        warn!("Mesh {} has no triangles, skipping", name);
        return None;
    }

    // Primitives without COLOR_0 are padded white so buffers stay parallel
    let colors = colors
        .iter()
        .any(Option::is_some)
        .then(|| merge_colors(colors, &primitive_lengths));

    Some(MeshData {
        name,
        positions,
        colors,
        indices,
        transform,
    })
}

fn merge_colors(colors: Vec<Option<Vec<Rgb>>>, lengths: &[usize]) -> Vec<Rgb> {
    let mut merged = Vec::with_capacity(lengths.iter().sum());
    for (primitive, &len) in colors.into_iter().zip(lengths) {
        let mut block = primitive.unwrap_or_default();
        block.resize(len, DEFAULT_VERTEX_COLOR);
        merged.extend(block);
    }
    merged
}

/// Parse a Wavefront OBJ stream. Materials are ignored.
pub fn parse_obj<R: BufRead>(reader: &mut R, path: &Path) -> Result<LoadedModel, AssetLoadError> {
    let (models, _materials) = tobj::load_obj_buf(
        reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| AssetLoadError::Parse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let meshes: Vec<MeshData> = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let mesh = model.mesh;
            debug!("OBJ model '{}': {} vertices", model.name, mesh.positions.len() / 3);
            let positions: Vec<Vec3> = mesh
                .positions
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect();
            let colors = (mesh.vertex_color.len() == mesh.positions.len()).then(|| {
                mesh.vertex_color
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect()
            });
            MeshData {
                name: model.name,
                positions,
                colors,
                indices: mesh.indices,
                transform: Mat4::IDENTITY,
            }
        })
        .collect();

    if meshes.is_empty() {
        return Err(AssetLoadError::Empty {
            model: path.display().to_string(),
        });
    }
    Ok(LoadedModel {
        source: path.to_path_buf(),
        meshes,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const TRIANGLE_BUFFER: &str = "AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAABAAIAAAA=";

    fn gltf_json() -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "translation": [0, 2, 0], "children": [1, 2] }},
    {{ "name": "body", "mesh": 0 }},
    {{ "name": "hat", "mesh": 1, "scale": [2, 2, 2] }}
  ],
  "meshes": [
    {{ "primitives": [{{ "attributes": {{ "POSITION": 0, "COLOR_0": 1 }}, "indices": 2 }}] }},
    {{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 2 }}] }}
  ],
  "buffers": [{{ "byteLength": 80, "uri": "data:application/octet-stream;base64,{TRIANGLE_BUFFER}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 72, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }},
    {{ "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
        )
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ModelFormat::from_path(Path::new("a/b.GLB")), Some(ModelFormat::Gltf));
        assert_eq!(ModelFormat::from_path(Path::new("body.gltf")), Some(ModelFormat::Gltf));
        assert_eq!(ModelFormat::from_path(Path::new("body.obj")), Some(ModelFormat::Obj));
        assert_eq!(ModelFormat::from_path(Path::new("body.fbx")), None);
        assert_eq!(ModelFormat::from_path(Path::new("body")), None);
    }

    #[test]
    fn test_unsupported_format() {
        let err = load_model(Path::new("body.fbx")).unwrap_err();
        assert!(matches!(
            err,
            AssetLoadError::UnsupportedFormat { extension: Some(ref e) } if e == "fbx"
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_model(Path::new("/definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, AssetLoadError::Io { .. }));
    }

    #[test]
    fn test_parse_gltf_hierarchy_and_colors() {
        let model = parse_gltf(gltf_json().as_bytes(), Path::new("test.gltf")).unwrap();
        assert_eq!(model.mesh_names(), vec!["body", "hat"]);

        let body = &model.meshes[0];
        assert_eq!(body.indices, vec![0, 1, 2]);
        assert_eq!(body.colors.as_ref().unwrap()[0], [1.0, 0.0, 0.0]);
        assert!(model.meshes[1].colors.is_none());

        let surfaces = model.into_surfaces().unwrap();
        let body_top = surfaces[0].world_position(2).unwrap();
        assert!((body_top - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);
        let hat_top = surfaces[1].world_position(2).unwrap();
        assert!((hat_top - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
        assert_eq!(surfaces[1].colors()[0], [1.0; 3]);
    }

    #[test]
    fn test_parse_gltf_garbage() {
        let err = parse_gltf(b"not a model", Path::new("x.glb")).unwrap_err();
        assert!(matches!(err, AssetLoadError::Parse { .. }));
    }

    #[test]
    fn test_parse_obj_quad_is_triangulated() {
        let source = "o body\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let model = parse_obj(&mut Cursor::new(source), Path::new("quad.obj")).unwrap();
        assert_eq!(model.mesh_names(), vec!["body"]);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn test_parse_obj_without_faces_is_empty() {
        let source = "v 0 0 0\nv 1 0 0\n";
        let err = parse_obj(&mut Cursor::new(source), Path::new("points.obj")).unwrap_err();
        assert!(matches!(err, AssetLoadError::Empty { .. }));
    }

    #[test]
    fn test_invalid_mesh_is_reported() {
        let model = LoadedModel {
            source: PathBuf::from("broken"),
            meshes: vec![MeshData {
                name: "broken".into(),
                positions: vec![Vec3::ZERO; 3],
                colors: None,
                indices: vec![0, 1, 5],
                transform: Mat4::IDENTITY,
            }],
        };
        let err = model.into_surfaces().unwrap_err();
        assert!(matches!(err, AssetLoadError::InvalidMesh { ref mesh, .. } if mesh == "broken"));
    }

    #[test]
    fn test_imported_colors_are_clamped() {
        let model = LoadedModel {
            source: PathBuf::from("hdr"),
            meshes: vec![MeshData {
                name: "hdr".into(),
                positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                colors: Some(vec![[2.0, 0.5, -1.0], [0.2; 3], [f32::NAN, 1.0, 1.0]]),
                indices: vec![0, 1, 2],
                transform: Mat4::IDENTITY,
            }],
        };
        let surfaces = model.into_surfaces().unwrap();
        assert_eq!(surfaces[0].colors()[0], [1.0, 0.5, 0.0]);
        assert_eq!(surfaces[0].colors()[1], [0.2; 3]);
        assert_eq!(surfaces[0].colors()[2], [0.0, 1.0, 1.0]);
    }
}
