//! CPU side of mesh loading.
//!
//! A model file is parsed into a [`MeshData`]: one flat vertex array and one flat index array
//! covering every sub-mesh of the scene. Nothing in here touches the GPU, the upload lives in
//! [`crate::abs::MeshBuffer`].

use std::path::Path;

use glam::{Vec3, Vec4};
use glow::HasContext;

use crate::{
    abs::Vertex,
    error::{Error, Result},
};

/// The vertex layout uploaded for every model.
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ModelVertex {
    pub position: Vec4,
    pub normal: Vec4,
}

impl Vertex for ModelVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<ModelVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 4, glow::FLOAT, false, stride, 0);

            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                4,
                glow::FLOAT,
                false,
                stride,
                std::mem::size_of::<Vec4>() as i32,
            );
        }
    }
}

/// Post-processing switches applied while importing a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Generate per-vertex normals for sub-meshes whose file carries none.
    pub gen_smooth_normals: bool,
    /// Deviation: rebase every sub-mesh's indices by the number of vertices before it.
    ///
    /// Off by default, which keeps indices local to their sub-mesh. With more than one
    /// sub-mesh that makes every sub-mesh after the first index into the first one's
    /// vertices, which is almost certainly a defect but is the established behavior.
    pub offset_submesh_indices: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            gen_smooth_normals: true,
            offset_submesh_indices: false,
        }
    }
}

/// Vertex and index data of a whole scene, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub submesh_count: usize,
}

impl MeshData {
    /// Parses the model at `path`, triangulating every face.
    pub fn load(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Self> {
        let path = path.as_ref();
        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &load_options).map_err(|e| Error::MeshLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if models.iter().all(|model| model.mesh.indices.is_empty()) {
            return Err(Error::MeshLoad {
                path: path.to_path_buf(),
                reason: "scene is incomplete: it contains no meshes".to_string(),
            });
        }

        let data = Self::from_models(&models, options);
        if data.submesh_count > 1 && !options.offset_submesh_indices {
            log::warn!(
                "{:?} has {} sub-meshes but their indices are not rebased; \
                 only the first one will draw correctly",
                path,
                data.submesh_count
            );
        }
        log::info!(
            "loaded {:?}: {} vertices, {} indices in {} sub-meshes",
            path,
            data.vertices.len(),
            data.indices.len(),
            data.submesh_count
        );
        Ok(data)
    }

    /// Flattens already parsed sub-meshes into one vertex and one index array.
    ///
    /// Sub-meshes without faces are skipped.
    pub fn from_models(models: &[tobj::Model], options: &ImportOptions) -> Self {
        let mut data = Self::default();
        for model in models.iter().filter(|model| !model.mesh.indices.is_empty()) {
            data.append(&model.mesh, options);
        }
        data
    }

    fn append(&mut self, mesh: &tobj::Mesh, options: &ImportOptions) {
        let base = if options.offset_submesh_indices {
            self.vertices.len() as u32
        } else {
            0
        };

        let positions: Vec<Vec3> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();

        let normals: Option<Vec<Vec3>> = if !mesh.normals.is_empty() {
            Some(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2]))
                    .collect(),
            )
        } else if options.gen_smooth_normals {
            Some(smooth_normals(&positions, &mesh.indices))
        } else {
            None
        };

        for (i, position) in positions.iter().enumerate() {
            let normal = normals
                .as_ref()
                .and_then(|normals| normals.get(i))
                .map_or(Vec4::ZERO, |n| n.extend(1.0).normalize());
            self.vertices.push(ModelVertex {
                position: position.extend(1.0),
                normal,
            });
        }

        self.indices.extend(mesh.indices.iter().map(|i| i + base));
        self.submesh_count += 1;
    }
}

/// Averages the unit normals of every triangle touching a vertex.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let (Some(pa), Some(pb), Some(pc)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let face = (*pb - *pa).cross(*pc - *pa).normalize_or_zero();
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.into_iter().map(Vec3::normalize_or_zero).collect()
}
