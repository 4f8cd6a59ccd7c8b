// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # OBJ-Lite Core
//!
//! Strict, allocation-light loader for the Wavefront OBJ text format that
//! produces flat buffers ready for GPU upload.
//!
//! ## Overview
//!
//! - **Lexing**: zero-copy tokenization; numbers are accumulated digit by
//!   digit so values are reproducible across platforms
//! - **Parsing**: cursor-based statement dispatch with a first-wins error latch
//! - **Assembly**: 1-based and relative index resolution, fan triangulation of
//!   faces with up to 16 vertices
//!
//! Texture coordinates, materials, groups and smoothing statements are
//! accepted but not retained.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use obj_lite_core::load_model;
//!
//! let model = load_model("assets/cube.obj");
//! if let Some(message) = model.error_message() {
//!     eprintln!("{}", message);
//! } else {
//!     println!("{} triangles", model.triangle_count());
//! }
//! ```
//!
//! ## Buffers
//!
//! - `positions`: `x0 y0 z0 x1 y1 z1 ...`
//! - `normals`: `x0 y0 z0 x1 y1 z1 ...`
//! - `indices`: `(position, texcoord, normal)` per triangle vertex, `-1` for
//!   an absent attribute
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for [`Model`] and [`FaceVertex`]

pub mod assembler;
pub mod error;
pub mod lexer;
pub mod loader;
pub mod model;
pub mod parser;

pub use assembler::{fix_index, FaceVertexRef, ModelAssembler};
pub use error::{Error, Result};
pub use lexer::{lex, Lexer, Token, TokenKind, TokenStream};
pub use loader::{
    load_model, load_model_from, parse_model, try_load_model, try_load_model_from,
    try_parse_model, FsSource, MemorySource, TextSource,
};
pub use model::{FaceVertex, Model};
pub use parser::{ErrorLatch, LatchedError, ParseStats, Parser, MAX_FACE_VERTICES};
