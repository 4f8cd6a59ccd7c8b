// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for OBJ loading
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading an OBJ model
#[derive(Error, Debug)]
pub enum Error {
    /// The source path does not exist
    #[error("specified path \"{0}\" not found")]
    NotFound(String),

    /// The source exists but could not be read
    #[error("failed to read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// First grammar violation found in the token stream
    #[error("PARSER ERROR at line {line}: {message}")]
    Parse { line: u32, message: &'static str },
}

impl Error {
    /// Build a parse error
    pub fn parse(line: u32, message: &'static str) -> Self {
        Error::Parse { line, message }
    }

    /// Map an I/O failure on `path` to `NotFound` or `Io`
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path),
            _ => Error::Io { path, source },
        }
    }

    /// Source line of a parse error
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
