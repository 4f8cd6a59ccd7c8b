// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ statement parser
//!
//! Walks a [`TokenStream`] with a cursor and dispatches one statement at a
//! time into a [`ModelAssembler`]. Grammar violations go into a first-wins
//! [`ErrorLatch`]; once it is set the statement loop stops.

use smallvec::SmallVec;

use crate::assembler::{FaceVertexRef, ModelAssembler};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::model::FaceVertex;

/// Maximum number of vertices in a single face statement
pub const MAX_FACE_VERTICES: usize = 16;

pub(crate) const MSG_UNKNOWN_STATEMENT: &str = "unknown statement prefix";
pub(crate) const MSG_POSITION_NUMBER: &str = "parsing vertex pos: expected a number";
pub(crate) const MSG_NORMAL_NUMBER: &str = "parsing vertex normal: expected a number";
pub(crate) const MSG_POSITION_INDEX: &str = "expected vertex index (an integer)";
pub(crate) const MSG_SLASH: &str = "expected slash (vertex index segregator)";
pub(crate) const MSG_TEXCOORD_INDEX: &str = "expected uv index (an integer)";
pub(crate) const MSG_NORMAL_INDEX: &str = "expected normal index (an integer)";
pub(crate) const MSG_NGON_LIMIT: &str = "n-gon exceeds 16 verts, which is the face vertex limit";
pub(crate) const MSG_FACE_TOO_SMALL: &str = "face statement has less than 3 vertices";

/// A recorded grammar violation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatchedError<'a> {
    pub message: &'static str,
    pub token: Token<'a>,
}

impl<'a> LatchedError<'a> {
    pub fn new(token: Token<'a>, message: &'static str) -> Self {
        Self { message, token }
    }
}

impl From<LatchedError<'_>> for Error {
    fn from(err: LatchedError<'_>) -> Self {
        Error::parse(err.token.line, err.message)
    }
}

/// Once-settable error record: the first latched error wins
#[derive(Debug, Clone, Default)]
pub struct ErrorLatch<'a> {
    first: Option<LatchedError<'a>>,
}

impl<'a> ErrorLatch<'a> {
    pub fn new() -> Self {
        Self { first: None }
    }

    /// Record an error unless one is already held.
    /// Returns true if this call set the latch.
    pub fn latch(&mut self, token: Token<'a>, message: &'static str) -> bool {
        if self.first.is_some() {
            return false;
        }
        self.first = Some(LatchedError::new(token, message));
        true
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.first.is_some()
    }

    /// The first recorded error
    #[inline]
    pub fn get(&self) -> Option<&LatchedError<'a>> {
        self.first.as_ref()
    }

    pub fn into_error(self) -> Option<Error> {
        self.first.map(Error::from)
    }
}

/// Counters collected during one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Tokens in the stream
    pub tokens: usize,
    /// Statements dispatched (including the failing one)
    pub statements: usize,
    /// Face statements
    pub faces: usize,
    /// Recognized but discarded statements (vt, mtllib, o, g, s, usemtl)
    pub skipped: usize,
}

/// What a dispatched statement turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    Position,
    Normal,
    Face,
    Skipped,
    Unknown,
}

/// Cursor over a token stream plus the sticky error latch
pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    next: usize,
    end_line: u32,
    latch: ErrorLatch<'a>,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned at the first token
    pub fn new(tokens: TokenStream<'a>) -> Self {
        let end_line = tokens.as_slice().last().map_or(1, |t| t.line);
        Self {
            tokens,
            next: 0,
            end_line,
            latch: ErrorLatch::new(),
        }
    }

    /// End-of-stream sentinel, placed on the line of the last token.
    ///
    /// A statement cut off at end of input is reported on the last line that
    /// holds a token, not on line 0 as `Token::invalid()` would give.
    #[inline]
    fn end_of_stream(&self) -> Token<'a> {
        Token::new(TokenKind::Invalid, self.end_line)
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.next < self.tokens.len()
    }

    /// Read without consuming
    #[inline]
    pub fn peek(&self) -> Token<'a> {
        self.tokens
            .get(self.next)
            .unwrap_or_else(|| self.end_of_stream())
    }

    /// Read and advance
    #[inline]
    pub fn next(&mut self) -> Token<'a> {
        match self.tokens.get(self.next) {
            Some(token) => {
                self.next += 1;
                token
            }
            None => self.end_of_stream(),
        }
    }

    /// Index of the next unread token
    #[inline]
    pub fn position(&self) -> usize {
        self.next
    }

    /// Record an error (first one wins)
    #[inline]
    pub fn error(&mut self, token: Token<'a>, message: &'static str) {
        self.latch.latch(token, message);
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.latch.is_set()
    }

    pub fn latched(&self) -> Option<&LatchedError<'a>> {
        self.latch.get()
    }

    /// Consume one token, latching `message` unless `accept` holds
    #[inline]
    fn expect(&mut self, accept: impl Fn(&Token<'a>) -> bool, message: &'static str) -> Token<'a> {
        let token = self.next();
        if !accept(&token) {
            self.error(token, message);
        }
        token
    }

    pub fn expect_int(&mut self, message: &'static str) -> Token<'a> {
        self.expect(Token::is_int, message)
    }

    pub fn expect_real(&mut self, message: &'static str) -> Token<'a> {
        self.expect(Token::is_real, message)
    }

    pub fn expect_punct(&mut self, punct: char, message: &'static str) -> Token<'a> {
        self.expect(|t| t.is_punct(punct), message)
    }

    /// Integer or real
    pub fn expect_num(&mut self, message: &'static str) -> Token<'a> {
        self.expect(Token::is_num, message)
    }

    /// Run the statement loop until the stream is exhausted or an error is latched
    pub fn run(&mut self, assembler: &mut ModelAssembler) -> ParseStats {
        let mut stats = ParseStats {
            tokens: self.tokens.len(),
            ..ParseStats::default()
        };

        while self.has_next() && !self.has_error() {
            let keyword = self.next();
            stats.statements += 1;

            match self.parse_statement(keyword, assembler) {
                Statement::Face => stats.faces += 1,
                Statement::Skipped => stats.skipped += 1,
                Statement::Position | Statement::Normal | Statement::Unknown => {}
            }
        }

        stats
    }

    /// Consume the parser, surfacing the latched error if any
    pub fn finish(self) -> Result<()> {
        match self.latch.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn parse_statement(&mut self, keyword: Token<'a>, assembler: &mut ModelAssembler) -> Statement {
        match keyword.as_identifier() {
            Some("v") => {
                let position = self.parse_vec3(MSG_POSITION_NUMBER);
                assembler.push_position(position);
                Statement::Position
            }
            Some("vn") => {
                let normal = self.parse_vec3(MSG_NORMAL_NUMBER);
                assembler.push_normal(normal);
                Statement::Normal
            }
            Some("vt") => {
                // Texture coordinates are read for grammar only
                self.next();
                self.next();
                if self.peek().is_real() {
                    self.next();
                }
                Statement::Skipped
            }
            Some("f") => {
                self.parse_face(keyword, assembler);
                Statement::Face
            }
            // Smoothing groups, objects, groups and materials carry no geometry
            Some("mtllib" | "o" | "g" | "usemtl" | "s") => {
                self.next();
                Statement::Skipped
            }
            _ => {
                self.error(keyword, MSG_UNKNOWN_STATEMENT);
                Statement::Unknown
            }
        }
    }

    /// Three numeric tokens coerced to f32
    fn parse_vec3(&mut self, message: &'static str) -> [f32; 3] {
        let x = self.expect_num(message).as_f32().unwrap_or_default();
        let y = self.expect_num(message).as_f32().unwrap_or_default();
        let z = self.expect_num(message).as_f32().unwrap_or_default();
        [x, y, z]
    }

    /// `INT`, `INT/INT`, `INT//INT` or `INT/INT/INT`
    fn parse_face_vertex(&mut self) -> FaceVertexRef<'a> {
        let position = self.expect_int(MSG_POSITION_INDEX);

        if !self.peek().is_punct('/') {
            return FaceVertexRef::new(position, None, None);
        }

        self.expect_punct('/', MSG_SLASH);

        if self.peek().is_punct('/') {
            self.next();
            let normal = self.expect_int(MSG_NORMAL_INDEX);
            return FaceVertexRef::new(position, None, Some(normal));
        }

        let texcoord = self.expect_int(MSG_TEXCOORD_INDEX);

        if !self.peek().is_punct('/') {
            return FaceVertexRef::new(position, Some(texcoord), None);
        }

        self.next();

        let normal = self.expect_int(MSG_NORMAL_INDEX);
        FaceVertexRef::new(position, Some(texcoord), Some(normal))
    }

    /// Collect up to [`MAX_FACE_VERTICES`] vertices and fan-triangulate them
    fn parse_face(&mut self, keyword: Token<'a>, assembler: &mut ModelAssembler) {
        let mut face: SmallVec<[FaceVertex; MAX_FACE_VERTICES]> = SmallVec::new();

        while self.peek().is_int() {
            if face.len() >= MAX_FACE_VERTICES {
                let extra = self.peek();
                self.error(extra, MSG_NGON_LIMIT);
                break;
            }

            let vertex = self.parse_face_vertex();
            match assembler.resolve(&vertex) {
                Ok(resolved) => face.push(resolved),
                Err(err) => self.error(err.token, err.message),
            }
        }

        if face.len() < 3 {
            self.error(keyword, MSG_FACE_TOO_SMALL);
            return;
        }

        if !self.has_error() {
            assembler.push_face(&face);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn run(source: &str) -> (ModelAssembler, ParseStats, Result<()>) {
        let mut parser = Parser::new(lex(source));
        let mut assembler = ModelAssembler::new();
        let stats = parser.run(&mut assembler);
        (assembler, stats, parser.finish())
    }

    fn error_of(source: &str) -> (u32, &'static str) {
        match run(source).2 {
            Err(Error::Parse { line, message }) => (line, message),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_latch_first_wins() {
        let mut latch = ErrorLatch::new();
        assert!(!latch.is_set());
        assert!(latch.latch(Token::new(TokenKind::Integer(1), 3), "first"));
        assert!(!latch.latch(Token::new(TokenKind::Integer(2), 9), "second"));

        let held = latch.get().unwrap();
        assert_eq!(held.message, "first");
        assert_eq!(held.token.line, 3);
    }

    #[test]
    fn test_cursor_past_end_returns_invalid() {
        let mut parser = Parser::new(lex("v"));
        assert!(parser.has_next());
        assert!(parser.next().is_identifier("v"));
        assert!(!parser.has_next());
        assert!(parser.peek().is_invalid());
        assert!(parser.next().is_invalid());
        assert_eq!(parser.position(), 1);
    }

    #[test]
    fn test_expect_consumes_even_on_mismatch() {
        let mut parser = Parser::new(lex("a 1 2"));
        let t = parser.expect_int("wanted int");
        assert!(t.is_identifier("a"));
        assert_eq!(parser.position(), 1);
        assert!(parser.has_error());

        // A later failure does not overwrite the first one
        parser.expect_real("wanted real");
        assert_eq!(parser.position(), 2);
        assert_eq!(parser.latched().unwrap().message, "wanted int");
    }

    #[test]
    fn test_expect_punct() {
        let mut parser = Parser::new(lex("/ 3"));
        parser.expect_punct('/', "slash");
        assert!(!parser.has_error());
        parser.expect_punct('/', "slash");
        assert!(parser.has_error());
    }

    #[test]
    fn test_positions_and_normals() {
        let (assembler, stats, result) = run("v 1 2 3\nv 4.5 -1 0\nvn 0 0 1\n");
        assert!(result.is_ok());
        assert_eq!(assembler.position_count(), 2);
        assert_eq!(assembler.normal_count(), 1);
        assert_eq!(stats.statements, 3);
        assert_eq!(stats.tokens, 12);
    }

    #[test]
    fn test_ignored_statements() {
        let source = "mtllib scene.mtl\no Cube\ng group-1\nusemtl Material.001\ns off\nvt 0.5 0.25\nvt 0.1 0.2 0.3\nv 0 0 0\n";
        let (assembler, stats, result) = run(source);
        assert!(result.is_ok());
        assert_eq!(stats.skipped, 7);
        assert_eq!(assembler.position_count(), 1);
    }

    #[test]
    fn test_vt_third_component_only_if_real() {
        // The integer after `vt 1 2` is not consumed as a w component
        let (line, message) = error_of("vt 1 2 3\n");
        assert_eq!(message, MSG_UNKNOWN_STATEMENT);
        assert_eq!(line, 1);
    }

    #[test]
    fn test_unknown_statement() {
        let (line, message) = error_of("v 0 0 0\n\nxyz 1 2 3\n");
        assert_eq!(line, 3);
        assert_eq!(message, MSG_UNKNOWN_STATEMENT);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let (_, message) = error_of("V 1 2 3\n");
        assert_eq!(message, MSG_UNKNOWN_STATEMENT);
    }

    #[test]
    fn test_vertex_needs_numbers() {
        let (line, message) = error_of("v 1 2 3\nv 1 oops 3\n");
        assert_eq!(line, 2);
        assert_eq!(message, MSG_POSITION_NUMBER);

        let (_, message) = error_of("vn 1 2\n");
        assert_eq!(message, MSG_NORMAL_NUMBER);
    }

    #[test]
    fn test_truncated_input_reports_last_line() {
        let (line, message) = error_of("v 0 0 0\nv 1 2");
        assert_eq!(line, 2);
        assert_eq!(message, MSG_POSITION_NUMBER);

        // Trailing blank lines do not move the sentinel
        let (line, _) = error_of("v 0 0 0\nv 1 2\n\n\n");
        assert_eq!(line, 2);
    }

    #[test]
    fn test_face_vertex_forms() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1 2/7 3//1\nf 1/1/1 2/2/1 3/3/1\n";
        let (assembler, stats, result) = run(source);
        assert!(result.is_ok());
        assert_eq!(stats.faces, 2);

        let vertices = assembler.triangle_vertices();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0], FaceVertex::new(0, -1, -1));
        assert_eq!(vertices[1], FaceVertex::new(1, -1, -1));
        assert_eq!(vertices[2], FaceVertex::new(2, -1, 0));
        assert!(vertices[3..].iter().all(|v| v.normal == 0 && v.texcoord == -1));
    }

    #[test]
    fn test_face_missing_normal_after_double_slash() {
        let (line, message) = error_of("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3//\n");
        assert_eq!(line, 4);
        assert_eq!(message, MSG_NORMAL_INDEX);

        // `1//2` with no normals declared fails on range, not grammar
        let (_, message) = error_of("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//2 2 3\n");
        assert_eq!(message, "normal index out of range");
    }

    #[test]
    fn test_face_too_small() {
        let (line, message) = error_of("v 0 0 0\nv 1 0 0\n\nf 1 2\n");
        assert_eq!(line, 4);
        assert_eq!(message, MSG_FACE_TOO_SMALL);
    }

    #[test]
    fn test_ngon_limit() {
        let mut source = String::new();
        for i in 0..17 {
            source.push_str(&format!("v {} 0 0\n", i));
        }

        let sixteen: Vec<String> = (1..=16).map(|i| i.to_string()).collect();
        let (assembler, _, result) = run(&format!("{}f {}\n", source, sixteen.join(" ")));
        assert!(result.is_ok());
        assert_eq!(assembler.triangle_vertices().len(), 14 * 3);

        let seventeen: Vec<String> = (1..=17).map(|i| i.to_string()).collect();
        let (line, message) = error_of(&format!("{}f {}\n", source, seventeen.join(" ")));
        assert_eq!(line, 18);
        assert_eq!(message, MSG_NGON_LIMIT);
    }

    #[test]
    fn test_face_index_out_of_range() {
        let (line, message) = error_of("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n");
        assert_eq!(line, 4);
        assert_eq!(message, "position index out of range");
    }

    #[test]
    fn test_face_without_positions_does_not_panic() {
        let (line, message) = error_of("f 1 2 3\n");
        assert_eq!(line, 1);
        assert_eq!(message, "position index out of range");
    }

    #[test]
    fn test_first_error_wins_across_statements() {
        let (line, message) = error_of("v 0 0 0\nbogus\nv 1 x 2\n");
        assert_eq!(line, 2);
        assert_eq!(message, MSG_UNKNOWN_STATEMENT);
    }

    #[test]
    fn test_loop_stops_after_error() {
        let (_, stats, result) = run("nope\nv 1 2 3\nv 4 5 6\n");
        assert!(result.is_err());
        assert_eq!(stats.statements, 1);
    }
}
