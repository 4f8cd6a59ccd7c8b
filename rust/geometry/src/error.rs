// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building GPU meshes
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("{attribute} index {index} out of range")]
    IndexOutOfRange { attribute: &'static str, index: i32 },

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Core parser error: {0}")]
    CoreError(#[from] obj_lite_core::Error),
}
