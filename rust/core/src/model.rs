// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded model buffers
//!
//! Layout:
//!
//! ```text
//! positions: x0 y0 z0 x1 y1 z1 ...
//! normals:   x0 y0 z0 x1 y1 z1 ...
//! indices:   p0 t0 n0 p1 t1 n1 ...   (one triple per triangle vertex)
//! ```
//!
//! Index entries address `positions` and `normals` by `index * 3`. A
//! component of `-1` means the attribute does not exist for that vertex;
//! the texture coordinate component is always `-1`. An empty buffer means
//! the attribute is absent from the whole model.

use crate::error::Result;

/// Position/texcoord/normal index triple of one triangle vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceVertex {
    pub position: i32,
    pub texcoord: i32,
    pub normal: i32,
}

impl FaceVertex {
    /// Marker for an absent attribute
    pub const ABSENT: i32 = -1;

    #[inline]
    pub fn new(position: i32, texcoord: i32, normal: i32) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }

    #[inline]
    pub fn position_index(&self) -> Option<usize> {
        usize::try_from(self.position).ok()
    }

    #[inline]
    pub fn normal_index(&self) -> Option<usize> {
        usize::try_from(self.normal).ok()
    }

    #[inline]
    pub fn has_normal(&self) -> bool {
        self.normal != Self::ABSENT
    }
}

/// Result of loading an OBJ file
///
/// A model is either valid (buffers filled, `error` is `None`) or invalid
/// (all buffers empty, `error` holds the diagnostic).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle vertex index triples (position, texcoord, normal)
    pub indices: Vec<i32>,
    /// Why loading failed
    pub error: Option<String>,
}

impl Model {
    /// Create a valid model from flattened buffers
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<i32>) -> Self {
        Self {
            positions,
            normals,
            indices,
            error: None,
        }
    }

    /// Create an invalid model carrying a diagnostic
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Positions, or `None` when the model declares none
    pub fn positions_opt(&self) -> Option<&[f32]> {
        non_empty(&self.positions)
    }

    /// Normals, or `None` when the model declares none
    pub fn normals_opt(&self) -> Option<&[f32]> {
        non_empty(&self.normals)
    }

    /// Index triples, or `None` when the model has no faces
    pub fn indices_opt(&self) -> Option<&[i32]> {
        non_empty(&self.indices)
    }

    /// Number of declared positions
    #[inline]
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of declared normals
    #[inline]
    pub fn normal_count(&self) -> usize {
        self.normals.len() / 3
    }

    /// Number of index triples (triangle vertices)
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }

    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        vec3_at(&self.positions, index)
    }

    pub fn normal(&self, index: usize) -> Option<[f32; 3]> {
        vec3_at(&self.normals, index)
    }

    /// Iterate index triples in emission order
    pub fn index_triples(&self) -> impl Iterator<Item = FaceVertex> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|c| FaceVertex::new(c[0], c[1], c[2]))
    }

    /// Iterate triangles as groups of three index triples
    pub fn triangles(&self) -> impl Iterator<Item = [FaceVertex; 3]> + '_ {
        self.indices.chunks_exact(9).map(|c| {
            [
                FaceVertex::new(c[0], c[1], c[2]),
                FaceVertex::new(c[3], c[4], c[5]),
                FaceVertex::new(c[6], c[7], c[8]),
            ]
        })
    }

    /// Turn the flag-and-message form back into a `Result`
    pub fn into_result(self) -> std::result::Result<Model, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self),
        }
    }
}

impl From<Result<Model>> for Model {
    fn from(result: Result<Model>) -> Self {
        match result {
            Ok(model) => model,
            Err(err) => Model::invalid(err.to_string()),
        }
    }
}

#[inline]
fn non_empty<T>(buffer: &[T]) -> Option<&[T]> {
    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

#[inline]
fn vec3_at(buffer: &[f32], index: usize) -> Option<[f32; 3]> {
    let chunk = buffer.get(index * 3..index * 3 + 3)?;
    Some([chunk[0], chunk[1], chunk[2]])
}
