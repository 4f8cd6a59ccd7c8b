// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GPU mesh building
//!
//! An OBJ model indexes positions and normals separately. GPUs want one
//! index per vertex, so every distinct `(position, normal)` pair becomes its
//! own vertex and triangles are rewritten to point at those.

use std::path::Path;

use nalgebra::{Point3, Vector3};
use obj_lite_core::{try_load_model, FaceVertex, Model};
use rustc_hash::FxHashMap;

use crate::normals::fill_missing_normals;
use crate::{Error, Mesh, Result};

/// Mesh building options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Compute smooth normals for vertices that have none
    pub generate_normals: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            generate_normals: true,
        }
    }
}

/// Converts loaded models into single-index meshes
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    options: BuildOptions,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Toggle normal generation
    pub fn generate_normals(mut self, enabled: bool) -> Self {
        self.options.generate_normals = enabled;
        self
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Build a mesh from a valid, non-empty model
    pub fn build(&self, model: &Model) -> Result<Mesh> {
        if let Some(message) = model.error_message() {
            return Err(Error::InvalidModel(message.to_string()));
        }
        if model.index_count() == 0 {
            return Err(Error::EmptyMesh("model has no faces".to_string()));
        }

        let mut mesh = Mesh::with_capacity(model.position_count(), model.index_count());
        let mut remap: FxHashMap<(i32, i32), u32> = FxHashMap::default();
        let mut missing = Vec::new();

        for vertex in model.index_triples() {
            let key = (vertex.position, vertex.normal);
            let index = match remap.get(&key) {
                Some(&index) => index,
                None => {
                    let (position, normal) = lookup(model, &vertex)?;
                    let index = mesh.add_vertex(position, normal.unwrap_or_else(Vector3::zeros));
                    missing.push(normal.is_none());
                    remap.insert(key, index);
                    index
                }
            };
            mesh.indices.push(index);
        }

        if self.options.generate_normals {
            fill_missing_normals(&mut mesh, &missing);
        }

        Ok(mesh)
    }
}

/// Fetch the position and (if present) normal a face vertex points at
fn lookup(model: &Model, vertex: &FaceVertex) -> Result<(Point3<f32>, Option<Vector3<f32>>)> {
    let position = vertex
        .position_index()
        .and_then(|i| model.position(i))
        .ok_or(Error::IndexOutOfRange {
            attribute: "position",
            index: vertex.position,
        })?;

    let normal = if vertex.has_normal() {
        let normal = vertex
            .normal_index()
            .and_then(|i| model.normal(i))
            .ok_or(Error::IndexOutOfRange {
                attribute: "normal",
                index: vertex.normal,
            })?;
        Some(Vector3::from(normal))
    } else {
        None
    };

    Ok((Point3::from(position), normal))
}

/// Load an OBJ file and build its GPU mesh with default options
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let model = try_load_model(path)?;
    MeshBuilder::new().build(&model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use obj_lite_core::parse_model;

    #[test]
    fn test_shared_vertices_are_deduplicated() {
        let model = parse_model("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n");
        let mesh = MeshBuilder::new().build(&model).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_split_vertices_on_normal_seams() {
        // Two triangles share positions 1 and 3 but with different normals
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 1\nvn 0 0 1\nvn 0 1 0\n\
                      f 1//1 2//1 3//1\nf 2//2 4//2 3//2\n";
        let mesh = MeshBuilder::new().build(&parse_model(source)).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_generates_missing_normals() {
        let model = parse_model("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mesh = MeshBuilder::new().build(&model).unwrap();

        for normal in mesh.normals.chunks_exact(3) {
            assert_abs_diff_eq!(normal[2], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_generation_disabled_leaves_zeros() {
        let model = parse_model("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mesh = MeshBuilder::new().generate_normals(false).build(&model).unwrap();

        assert!(mesh.normals.iter().all(|&n| n == 0.0));
        assert!(!MeshBuilder::new().generate_normals(false).options().generate_normals);
    }

    #[test]
    fn test_with_options_matches_toggle() {
        let options = BuildOptions {
            generate_normals: false,
        };
        let builder = MeshBuilder::with_options(options);
        assert_eq!(builder.options(), options);
        assert_eq!(builder.options(), MeshBuilder::new().generate_normals(false).options());
        assert!(MeshBuilder::with_options(BuildOptions::default()).options().generate_normals);
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let model = parse_model("nope\n");
        match MeshBuilder::new().build(&model) {
            Err(Error::InvalidModel(message)) => {
                assert_eq!(message, "PARSER ERROR at line 1: unknown statement prefix")
            }
            other => panic!("Expected InvalidModel, got {:?}", other),
        }
    }

    #[test]
    fn test_model_without_faces_is_empty() {
        let model = parse_model("v 0 0 0\n");
        assert!(matches!(MeshBuilder::new().build(&model), Err(Error::EmptyMesh(_))));
    }

    #[test]
    fn test_hand_built_model_out_of_range() {
        let model = Model::new(vec![0.0; 9], Vec::new(), vec![0, -1, -1, 1, -1, -1, 5, -1, -1]);
        assert!(matches!(
            MeshBuilder::new().build(&model),
            Err(Error::IndexOutOfRange { attribute: "position", index: 5 })
        ));
    }

    #[test]
    fn test_load_mesh_missing_file() {
        assert!(matches!(
            load_mesh("no/such/mesh.obj"),
            Err(Error::CoreError(obj_lite_core::Error::NotFound(_)))
        ));
    }
}
