// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model assembly: accumulators, index fix-up and fan triangulation

use crate::lexer::Token;
use crate::model::{FaceVertex, Model};
use crate::parser::LatchedError;

pub(crate) const MSG_POSITION_RANGE: &str = "position index out of range";
pub(crate) const MSG_NORMAL_RANGE: &str = "normal index out of range";

/// Face vertex as written in the source, before index resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertexRef<'a> {
    pub position: Token<'a>,
    pub texcoord: Option<Token<'a>>,
    pub normal: Option<Token<'a>>,
}

impl<'a> FaceVertexRef<'a> {
    pub fn new(position: Token<'a>, texcoord: Option<Token<'a>>, normal: Option<Token<'a>>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// Resolve an OBJ index against the number of elements declared so far.
///
/// OBJ indices are 1-based; a non-positive index is relative to the end of
/// the list (`-1` is the most recent element). Returns `None` when nothing
/// has been declared yet or the result falls outside `[0, count)`.
#[inline]
pub fn fix_index(index: i32, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }

    let resolved = if index > 0 {
        i64::from(index) - 1
    } else {
        count as i64 + i64::from(index)
    };

    if (0..count as i64).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

/// Running accumulators for one parse
#[derive(Debug, Clone, Default)]
pub struct ModelAssembler {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    triangle_vertices: Vec<FaceVertex>,
}

impl ModelAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_position(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    #[inline]
    pub fn push_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal);
    }

    #[inline]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    /// Triangle vertices emitted so far, three per triangle
    pub fn triangle_vertices(&self) -> &[FaceVertex] {
        &self.triangle_vertices
    }

    /// Resolve a source face vertex against the current counts.
    /// Texture coordinates are never retained.
    pub fn resolve<'a>(&self, vertex: &FaceVertexRef<'a>) -> Result<FaceVertex, LatchedError<'a>> {
        let position = resolve_token(vertex.position, self.positions.len())
            .ok_or_else(|| LatchedError::new(vertex.position, MSG_POSITION_RANGE))?;

        let normal = match vertex.normal {
            Some(token) => resolve_token(token, self.normals.len())
                .ok_or_else(|| LatchedError::new(token, MSG_NORMAL_RANGE))?
                as i32,
            None => FaceVertex::ABSENT,
        };

        Ok(FaceVertex::new(position as i32, FaceVertex::ABSENT, normal))
    }

    /// Fan-triangulate a face: `(0, k+1, k+2)` for `k in 0..len-2`
    pub fn push_face(&mut self, face: &[FaceVertex]) {
        if face.len() < 3 {
            return;
        }

        self.triangle_vertices.reserve((face.len() - 2) * 3);
        for k in 0..face.len() - 2 {
            self.triangle_vertices.push(face[0]);
            self.triangle_vertices.push(face[k + 1]);
            self.triangle_vertices.push(face[k + 2]);
        }
    }

    /// Flatten the accumulators into output buffers
    pub fn into_model(self) -> Model {
        let positions = self.positions.into_iter().flatten().collect();
        let normals = self.normals.into_iter().flatten().collect();
        let indices = self
            .triangle_vertices
            .into_iter()
            .flat_map(|v| [v.position, v.texcoord, v.normal])
            .collect();

        Model::new(positions, normals, indices)
    }
}

#[inline]
fn resolve_token(token: Token<'_>, count: usize) -> Option<usize> {
    fix_index(token.as_int()?, count)
}
