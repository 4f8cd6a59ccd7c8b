// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-file summary types for serialization.

use std::fmt;
use std::path::Path;

use obj_lite_core::{load_model, Model};
use obj_lite_geometry::{Error as GeometryError, MeshBuilder};
use serde::Serialize;

/// Axis-aligned bounds and vertex centroid of the built mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub centroid: [f64; 3],
}

/// Summary of one loaded OBJ file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    /// Path as given on the command line.
    pub path: String,
    /// Declared positions.
    pub positions: usize,
    /// Declared normals.
    pub normals: usize,
    /// Triangles after fan triangulation.
    pub triangles: usize,
    /// Unique (position, normal) vertices after GPU expansion.
    pub gpu_vertices: usize,
    /// Bounds of the GPU mesh, if it has faces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Load or build failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileSummary {
    fn from_model(path: &Path, model: &Model) -> Self {
        Self {
            path: path.display().to_string(),
            positions: model.position_count(),
            normals: model.normal_count(),
            triangles: model.triangle_count(),
            gpu_vertices: 0,
            bounds: None,
            error: model.error_message().map(str::to_string),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Load `path`, build its GPU mesh and summarize both.
pub fn summarize(path: &Path, builder: &MeshBuilder) -> FileSummary {
    let model = load_model(path);
    let mut summary = FileSummary::from_model(path, &model);
    if model.is_invalid() {
        return summary;
    }

    match builder.build(&model) {
        Ok(mesh) => {
            let (min, max) = mesh.bounds();
            let centroid = mesh.centroid();
            summary.gpu_vertices = mesh.vertex_count();
            summary.bounds = Some(Bounds {
                min: [min.x, min.y, min.z],
                max: [max.x, max.y, max.z],
                centroid: [centroid.x, centroid.y, centroid.z],
            });
        }
        // A model with vertices but no faces is still a valid file
        Err(GeometryError::EmptyMesh(_)) => {}
        Err(err) => summary.error = Some(err.to_string()),
    }

    tracing::debug!(path = %summary.path, triangles = summary.triangles, "Summarized OBJ file");
    summary
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            return write!(f, "{}: {}", self.path, error);
        }

        writeln!(f, "{}", self.path)?;
        writeln!(f, "  Positions:    {}", self.positions)?;
        writeln!(f, "  Normals:      {}", self.normals)?;
        writeln!(f, "  Triangles:    {}", self.triangles)?;
        write!(f, "  GPU vertices: {}", self.gpu_vertices)?;
        if let Some(bounds) = &self.bounds {
            write!(
                f,
                "\n  Bounds:       min=({:.3}, {:.3}, {:.3}), max=({:.3}, {:.3}, {:.3})",
                bounds.min[0], bounds.min[1], bounds.min[2], bounds.max[0], bounds.max[1], bounds.max[2]
            )?;
            write!(
                f,
                "\n  Centroid:     ({:.3}, {:.3}, {:.3})",
                bounds.centroid[0], bounds.centroid[1], bounds.centroid[2]
            )?;
        }
        Ok(())
    }
}
