// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model loading entry points
//!
//! `try_*` functions return a [`Result`]; the plain variants fold failures
//! into an invalid [`Model`] carrying the diagnostic, so callers can treat a
//! load as a value that never panics.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::assembler::ModelAssembler;
use crate::error::{Error, Result};
use crate::lexer::lex;
use crate::model::Model;
use crate::parser::Parser;

/// Something that can hand back the full text behind a path
pub trait TextSource {
    /// Read the whole resource, or fail with [`Error::NotFound`] / [`Error::Io`]
    fn read_text(&self, path: &Path) -> Result<String>;
}

/// Reads from the local filesystem
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; the
/// lexer skips anything outside ASCII anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl TextSource for FsSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// In-memory sources keyed by path (embedded assets, tests)
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under `path`, replacing any previous entry
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl TextSource for MemorySource {
    fn read_text(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.display().to_string()))
    }
}

/// Parse OBJ text into a model
pub fn try_parse_model(source: &str) -> Result<Model> {
    let mut parser = Parser::new(lex(source));
    let mut assembler = ModelAssembler::new();
    let stats = parser.run(&mut assembler);
    parser.finish()?;

    let model = assembler.into_model();
    debug!(
        tokens = stats.tokens,
        statements = stats.statements,
        faces = stats.faces,
        skipped = stats.skipped,
        positions = model.position_count(),
        normals = model.normal_count(),
        triangles = model.triangle_count(),
        "Parsed OBJ model"
    );
    Ok(model)
}

/// Parse OBJ text; failures become an invalid model
pub fn parse_model(source: &str) -> Model {
    match try_parse_model(source) {
        Ok(model) => model,
        Err(err) => {
            warn!(error = %err, "Failed to parse OBJ text");
            Model::invalid(err.to_string())
        }
    }
}

/// Read `path` through `source` and parse it
pub fn try_load_model_from<S>(source: &S, path: impl AsRef<Path>) -> Result<Model>
where
    S: TextSource + ?Sized,
{
    let path = path.as_ref();
    let text = source.read_text(path)?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded OBJ source");
    try_parse_model(&text)
}

/// Read `path` through `source` and parse it; failures become an invalid model
pub fn load_model_from<S>(source: &S, path: impl AsRef<Path>) -> Model
where
    S: TextSource + ?Sized,
{
    let path = path.as_ref();
    match try_load_model_from(source, path) {
        Ok(model) => model,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to load OBJ model");
            Model::invalid(err.to_string())
        }
    }
}

/// Load an OBJ file from disk
pub fn try_load_model(path: impl AsRef<Path>) -> Result<Model> {
    try_load_model_from(&FsSource, path)
}

/// Load an OBJ file from disk; failures become an invalid model
pub fn load_model(path: impl AsRef<Path>) -> Model {
    load_model_from(&FsSource, path)
}
