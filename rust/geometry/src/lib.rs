// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ-Lite Geometry Processing
//!
//! Turns loaded OBJ models into single-index triangle meshes ready for GPU
//! upload, using nalgebra for vector math.

pub mod builder;
pub mod error;
pub mod mesh;
pub mod normals;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use builder::{load_mesh, BuildOptions, MeshBuilder};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use normals::{calculate_normals, fill_missing_normals};
