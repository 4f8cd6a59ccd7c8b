// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ lexer
//!
//! Single left-to-right scan producing a fully materialized [`TokenStream`].
//! The lexer never fails: bytes it does not recognize are skipped and the
//! parser is left to enforce the grammar.
//!
//! Numbers are accumulated digit by digit (`value * 10 + digit` for the
//! whole part, a decaying `0.1` weight for the fraction) rather than going
//! through a generic float conversion, so values are identical on every
//! platform, bit for bit.

use memchr::memchr;
use nom::{
    bytes::complete::take_while,
    character::complete::{digit0, satisfy},
    combinator::recognize,
    sequence::pair,
    IResult,
};

/// Token payload, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    /// Keyword or free-form name, borrowed from the source text
    Identifier(&'a str),
    /// Whole number: 42, -7
    Integer(i32),
    /// Number with a fractional part or exponent: 0.5, 1.5e2
    Real(f32),
    /// Single-character punctuation (only `/` is produced)
    Punct(char),
    /// Sentinel returned when reading past the end of the stream
    Invalid,
}

/// One lexical unit with the 1-based line of its first character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: u32,
}

impl<'a> Token<'a> {
    /// Create a token
    #[inline]
    pub fn new(kind: TokenKind<'a>, line: u32) -> Self {
        Self { kind, line }
    }

    /// End-of-stream sentinel
    #[inline]
    pub fn invalid() -> Self {
        Self {
            kind: TokenKind::Invalid,
            line: 0,
        }
    }

    /// Exact, case-sensitive identifier match
    #[inline]
    pub fn is_identifier(&self, name: &str) -> bool {
        matches!(self.kind, TokenKind::Identifier(text) if text == name)
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self.kind, TokenKind::Integer(_))
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self.kind, TokenKind::Real(_))
    }

    #[inline]
    pub fn is_num(&self) -> bool {
        self.is_int() || self.is_real()
    }

    #[inline]
    pub fn is_punct(&self, punct: char) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.kind == TokenKind::Invalid
    }

    /// Integer payload
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self.kind {
            TokenKind::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric payload coerced to f32 (integers are widened)
    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match self.kind {
            TokenKind::Integer(value) => Some(value as f32),
            TokenKind::Real(value) => Some(value),
            _ => None,
        }
    }

    /// Identifier text
    #[inline]
    pub fn as_identifier(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Identifier(text) => Some(text),
            _ => None,
        }
    }
}

/// Complete token sequence of one source text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    /// Number of tokens
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`, if any
    #[inline]
    pub fn get(&self, index: usize) -> Option<Token<'a>> {
        self.tokens.get(index).copied()
    }

    /// Iterate over tokens in source order
    pub fn iter(&self) -> impl Iterator<Item = &Token<'a>> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token<'a>] {
        &self.tokens
    }
}

impl<'a> FromIterator<Token<'a>> for TokenStream<'a> {
    fn from_iter<I: IntoIterator<Item = Token<'a>>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

/// Numeric literal as scanned, before exponent folding
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integer(i32),
    Real(f32),
}

impl Number {
    #[inline]
    fn as_f32(self) -> f32 {
        match self {
            Number::Integer(value) => value as f32,
            Number::Real(value) => value,
        }
    }

    /// Integer value; a real exponent is truncated toward zero
    #[inline]
    fn as_i32(self) -> i32 {
        match self {
            Number::Integer(value) => value,
            Number::Real(value) => value as i32,
        }
    }

    #[inline]
    fn into_kind<'a>(self) -> TokenKind<'a> {
        match self {
            Number::Integer(value) => TokenKind::Integer(value),
            Number::Real(value) => TokenKind::Real(value),
        }
    }
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

#[inline]
fn is_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '.'
}

/// Parse identifier: v, vn, usemtl, Material.001, left-arm_2
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_identifier_start),
        take_while(is_identifier_char),
    ))(input)
}

/// Parse a (possibly empty) run of ASCII digits
fn digits(input: &str) -> IResult<&str, &str> {
    digit0(input)
}

/// Split a digit run off the front of `input`
#[inline]
fn split_digits(input: &str) -> (&str, &str) {
    digits(input).unwrap_or((input, ""))
}

/// `value = value * 10 + digit`, wrapping on overflow
#[inline]
fn accumulate_whole(digits: &str) -> i32 {
    digits.bytes().fold(0i32, |value, b| {
        value.wrapping_mul(10).wrapping_add(i32::from(b - b'0'))
    })
}

/// `fraction += digit * weight`, weight starting at 0.1 and decaying by 0.1
#[inline]
fn accumulate_fraction(digits: &str) -> f32 {
    let mut fraction = 0.0f32;
    let mut weight = 0.1f32;
    for b in digits.bytes() {
        fraction += weight * f32::from(b - b'0');
        weight *= 0.1;
    }
    fraction
}

/// Scan `-?[0-9]*(\.[0-9]*)?` from the front of `input`
fn scan_number(input: &str) -> (&str, Number) {
    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (rest, whole_digits) = split_digits(rest);
    let whole = accumulate_whole(whole_digits);

    match rest.strip_prefix('.') {
        Some(after_point) => {
            let (rest, fraction_digits) = split_digits(after_point);
            let sign = if negative { -1.0f32 } else { 1.0 };
            let value = sign * (whole as f32 + accumulate_fraction(fraction_digits));
            (rest, Number::Real(value))
        }
        None => {
            let value = if negative { whole.wrapping_neg() } else { whole };
            (rest, Number::Integer(value))
        }
    }
}

/// Scan a numeric literal, folding an `e`/`E` exponent into a single real
fn scan_literal(input: &str) -> (&str, TokenKind<'_>) {
    let (rest, base) = scan_number(input);

    match rest.as_bytes().first() {
        Some(b'e' | b'E') => {
            let (rest, exponent) = scan_number(&rest[1..]);
            let value = base.as_f32() * 10.0f32.powf(exponent.as_i32() as f32);
            (rest, TokenKind::Real(value))
        }
        _ => (rest, base.into_kind()),
    }
}

/// Streaming tokenizer over OBJ text
pub struct Lexer<'a> {
    rest: &'a str,
    line: u32,
}

impl<'a> Lexer<'a> {
    /// Create a lexer at the start of `source`
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            line: 1,
        }
    }

    /// Current 1-based line
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Produce the next token, or `None` at end of text
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        while let Some(c) = self.rest.chars().next() {
            match c {
                '#' => {
                    self.rest = match memchr(b'\n', self.rest.as_bytes()) {
                        Some(newline) => &self.rest[newline + 1..],
                        None => "",
                    };
                    self.line += 1;
                }
                '\n' => {
                    self.rest = &self.rest[1..];
                    self.line += 1;
                }
                '/' => {
                    self.rest = &self.rest[1..];
                    return Some(Token::new(TokenKind::Punct('/'), self.line));
                }
                c if is_identifier_start(c) => {
                    if let Ok((rest, text)) = identifier(self.rest) {
                        self.rest = rest;
                        return Some(Token::new(TokenKind::Identifier(text), self.line));
                    }
                    self.rest = &self.rest[1..];
                }
                c if is_number_start(c) => {
                    let (rest, kind) = scan_literal(self.rest);
                    self.rest = rest;
                    return Some(Token::new(kind, self.line));
                }
                other => {
                    self.rest = &self.rest[other.len_utf8()..];
                }
            }
        }

        None
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Rough estimate: ~4 bytes per token on average
#[inline]
fn estimate_token_count(source: &str) -> usize {
    source.len() / 4
}

/// Tokenize a whole source text
pub fn lex(source: &str) -> TokenStream<'_> {
    let mut tokens = Vec::with_capacity(estimate_token_count(source));
    tokens.extend(Lexer::new(source));
    TokenStream { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        lex(source).iter().map(|t| t.kind).collect()
    }

    fn single_real(source: &str) -> f32 {
        match kinds(source).as_slice() {
            [TokenKind::Real(value)] => *value,
            other => panic!("Expected a single real token, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("usemtl rest"), Ok((" rest", "usemtl")));
        assert_eq!(identifier("Material.001-b_2 x"), Ok((" x", "Material.001-b_2")));
        assert_eq!(identifier("_hidden"), Ok(("", "_hidden")));
        assert!(identifier("1abc").is_err());
    }

    #[test]
    fn test_vertex_statement() {
        assert_eq!(
            kinds("v 1 -2 0.5"),
            vec![
                TokenKind::Identifier("v"),
                TokenKind::Integer(1),
                TokenKind::Integer(-2),
                TokenKind::Real(0.5),
            ]
        );
    }

    #[test]
    fn test_fixed_point_real() {
        let value = single_real("-3.25");
        assert_abs_diff_eq!(value, -3.25, epsilon = 1e-6);
        assert_eq!(value, -(3.0 + (0.1f32 * 2.0 + 0.1f32 * 0.1 * 5.0)));
    }

    #[test]
    fn test_real_forms() {
        assert_abs_diff_eq!(single_real(".5"), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(single_real("2."), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(single_real("-0.125"), -0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_scientific_notation() {
        assert_abs_diff_eq!(single_real("1.5e2"), 150.0, epsilon = 1e-4);
        assert_abs_diff_eq!(single_real("2E-3"), 0.002, epsilon = 1e-7);
        assert_abs_diff_eq!(single_real("-4.0e1"), -40.0, epsilon = 1e-4);
        // Integer exponents collapse into a real too
        assert_abs_diff_eq!(single_real("3e0"), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exponent_plus_sign_is_not_part_of_literal() {
        let tokens = kinds("1e+5");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], TokenKind::Real(1.0));
        assert_eq!(tokens[1], TokenKind::Integer(5));
    }

    #[test]
    fn test_lone_minus_is_zero() {
        assert_eq!(kinds("-"), vec![TokenKind::Integer(0)]);
    }

    #[test]
    fn test_integer_overflow_wraps() {
        // 99999999999 mod 2^32
        assert_eq!(kinds("99999999999"), vec![TokenKind::Integer(1215752191)]);
    }

    #[test]
    fn test_real_exponent_is_truncated() {
        assert_eq!(kinds("1e2.9"), vec![TokenKind::Real(100.0)]);
        assert_abs_diff_eq!(single_real("5e-1.7"), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_streaming_lexer_tracks_lines() {
        let mut lexer = Lexer::new("v 1 2 3

f 1 2 3");
        assert_eq!(lexer.line(), 1);
        assert_eq!(lexer.by_ref().take(4).count(), 4);
        assert_eq!(lexer.line(), 1);

        let face = lexer.next_token().unwrap();
        assert!(face.is_identifier("f"));
        assert_eq!(face.line, 3);
        assert_eq!(lexer.line(), 3);
    }

    #[test]
    fn test_token_stream_from_iter() {
        let stream: TokenStream<'_> = Lexer::new("vn 0 0 1").filter(Token::is_num).collect();
        assert_eq!(stream.len(), 3);
        assert!(stream.iter().all(|t| t.as_int().is_some()));
        assert_eq!(stream.as_slice()[2].as_int(), Some(1));
    }

    #[test]
    fn test_face_punctuation() {
        assert_eq!(
            kinds("1//2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Punct('/'),
                TokenKind::Punct('/'),
                TokenKind::Integer(2),
            ]
        );
    }

    #[test]
    fn test_line_numbers_and_comments() {
        let source = "# header comment\nv 1 2 3\n\n# another\nf 1 2 3\n";
        let stream = lex(source);
        let lines: Vec<u32> = stream.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![2, 2, 2, 2, 5, 5, 5, 5]);
    }

    #[test]
    fn test_trailing_comment_without_newline() {
        let stream = lex("v 0 0 0 # no newline here");
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn test_garbage_is_skipped() {
        assert_eq!(
            kinds("\t@ v\r\n% ünïcode 7"),
            vec![
                TokenKind::Identifier("v"),
                TokenKind::Identifier("n"),
                TokenKind::Identifier("code"),
                TokenKind::Integer(7),
            ]
        );
    }

    #[test]
    fn test_identifier_borrows_source() {
        let source = String::from("mtllib scene.mtl");
        let stream = lex(&source);
        let name = stream.get(1).and_then(|t| t.as_identifier()).unwrap();
        assert_eq!(name, "scene.mtl");
        assert_eq!(name.as_ptr(), source[7..].as_ptr());
    }

    #[test]
    fn test_invalid_sentinel() {
        let t = Token::invalid();
        assert!(t.is_invalid());
        assert!(!t.is_num());
        assert_eq!(t.as_f32(), None);
    }
}
