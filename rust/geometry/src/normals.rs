// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smooth vertex normal generation

use nalgebra::Vector3;

use crate::Mesh;

/// Area-weighted vertex normals: the unnormalized cross product of each
/// triangle is added to its three corners, then each sum is normalized.
/// Vertices with no usable contribution get `+Z`.
fn accumulate_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.vertex_count()];

    for triangle in mesh.indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;

        let v0 = mesh.position(i0).cast::<f64>();
        let v1 = mesh.position(i1).cast::<f64>();
        let v2 = mesh.position(i2).cast::<f64>();

        let normal = (v1 - v0).cross(&(v2 - v0));
        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::z))
        .collect()
}

/// Replace every normal of `mesh` with a smooth vertex normal
pub fn calculate_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let normals = accumulate_normals(mesh);

    mesh.normals.clear();
    mesh.normals.reserve(vertex_count * 3);
    for normal in normals {
        mesh.normals.push(normal.x as f32);
        mesh.normals.push(normal.y as f32);
        mesh.normals.push(normal.z as f32);
    }
}

/// Compute smooth normals only for vertices flagged in `missing`,
/// keeping authored normals untouched
pub fn fill_missing_normals(mesh: &mut Mesh, missing: &[bool]) {
    if !missing.iter().any(|&m| m) {
        return;
    }

    let normals = accumulate_normals(mesh);
    mesh.normals.resize(mesh.vertex_count() * 3, 0.0);

    for (index, normal) in normals.iter().enumerate() {
        if missing.get(index).copied().unwrap_or(false) {
            mesh.normals[index * 3] = normal.x as f32;
            mesh.normals[index * 3 + 1] = normal.y as f32;
            mesh.normals[index * 3 + 2] = normal.z as f32;
        }
    }
}
