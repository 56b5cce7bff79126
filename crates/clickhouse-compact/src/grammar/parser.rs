//! `nom` combinators for the type declaration grammar.

use std::fmt;

use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::{char, digit1, multispace0, one_of, satisfy};
use nom::combinator::{cut, map, opt, recognize};
use nom::error::{ErrorKind, ParseError};
use nom::sequence::delimited;
use nom::{IResult, Parser};

use super::{AstArg, MAX_DEPTH, TypeNode};
use crate::{Error, Result};

/// Characters of remaining input quoted in a syntax error.
const SNIPPET_LEN: usize = 16;

type PResult<'a, T> = IResult<&'a str, T, GrammarError<'a>>;

/// Parse a type declaration into a [`TypeNode`].
///
/// # Errors
///
/// Returns a syntax error carrying the byte offset of the failure when the
/// text does not match the grammar, including trailing input after a
/// complete declaration.
pub fn parse(declaration: &str) -> Result<TypeNode> {
    match delimited(ws, |i| type_expr(i, 1), ws).parse(declaration) {
        Ok(("", node)) => Ok(node),
        Ok((rest, _)) => Err(syntax_error(
            declaration,
            &GrammarError::new(rest, Reason::TrailingInput),
        )),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(syntax_error(declaration, &err)),
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(
            declaration,
            &GrammarError::new("", Reason::Expected("more input")),
        )),
    }
}

fn syntax_error(declaration: &str, err: &GrammarError<'_>) -> Error {
    let offset = declaration.len() - err.input.len();
    let snippet: String = err.input.chars().take(SNIPPET_LEN).collect();
    Error::syntax(declaration, offset, snippet, err.reason.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════════════════════

/// Parse failure at a position of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GrammarError<'a> {
    input: &'a str,
    reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reason {
    Expected(&'static str),
    Char(char),
    Nom(ErrorKind),
    BadEscape(char),
    UnterminatedString,
    IntegerOverflow,
    TooDeep,
    TrailingInput,
}

impl<'a> GrammarError<'a> {
    const fn new(input: &'a str, reason: Reason) -> Self {
        Self { input, reason }
    }
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, Reason::Nom(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: &'a str, c: char) -> Self {
        Self::new(input, Reason::Char(c))
    }

    // Keep whichever branch got furthest into the input.
    fn or(self, other: Self) -> Self {
        if other.input.len() <= self.input.len() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected(what) => write!(f, "expected {what}"),
            Self::Char(c) => write!(f, "expected '{c}'"),
            Self::Nom(ErrorKind::Digit) => f.write_str("expected integer"),
            Self::Nom(kind) => write!(f, "unexpected input ({kind:?})"),
            Self::BadEscape(c) => write!(f, "unsupported escape sequence '\\{c}'"),
            Self::UnterminatedString => f.write_str("unterminated string literal"),
            Self::IntegerOverflow => f.write_str("integer literal does not fit in 64 bits"),
            Self::TooDeep => write!(f, "nesting deeper than {MAX_DEPTH} levels"),
            Self::TrailingInput => f.write_str("unexpected input after type declaration"),
        }
    }
}

/// Replace a recoverable error raised right at `at` with a clearer label.
fn relabel<'a>(
    err: nom::Err<GrammarError<'a>>,
    at: &'a str,
    expected: &'static str,
) -> nom::Err<GrammarError<'a>> {
    match err {
        nom::Err::Error(e) if e.input.len() == at.len() => {
            nom::Err::Error(GrammarError::new(at, Reason::Expected(expected)))
        }
        other => other,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Grammar rules
// ═══════════════════════════════════════════════════════════════════════════

fn ws(input: &str) -> PResult<'_, &str> {
    multispace0(input)
}

fn symbol<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = GrammarError<'a>> {
    char(c)
}

/// `type_expr := IDENT ( "(" arg ("," arg)* ")" )?`
///
/// `depth` is the nesting depth of the node being parsed, 1 at the top.
fn type_expr(input: &str, depth: usize) -> PResult<'_, TypeNode> {
    let start = input;
    let (input, name) = identifier(input)?;
    if depth > MAX_DEPTH {
        return Err(nom::Err::Failure(GrammarError::new(start, Reason::TooDeep)));
    }
    let (after_ws, _) = ws(input)?;
    let Ok((mut input, _)) = symbol('(').parse(after_ws) else {
        return Ok((input, TypeNode::Simple(name.to_owned())));
    };

    let mut args = Vec::new();
    loop {
        let (rest, arg) = argument(input, depth + 1).map_err(cut_error)?;
        args.push(arg);
        let (rest, _) = ws(rest)?;
        if let Ok((rest, _)) = symbol(',').parse(rest) {
            input = rest;
            continue;
        }
        let (rest, _) = symbol(')').parse(rest).map_err(cut_error)?;
        return Ok((
            rest,
            TypeNode::Composite {
                name: name.to_owned(),
                args,
            },
        ));
    }
}

fn cut_error(err: nom::Err<GrammarError<'_>>) -> nom::Err<GrammarError<'_>> {
    match err {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    }
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize((
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
    .map_err(|err| relabel(err, input, "type name"))
}

/// `arg := type_expr | literal`
fn argument(input: &str, depth: usize) -> PResult<'_, AstArg> {
    let (input, _) = ws(input)?;
    let nested = match type_expr(input, depth) {
        Ok((rest, node)) => return Ok((rest, AstArg::Type(node))),
        Err(nom::Err::Error(e)) => e,
        Err(err) => return Err(err),
    };
    alt((string_or_enum_pair, map(integer, AstArg::Int)))
        .parse(input)
        .map_err(|err| match err {
            nom::Err::Error(e) => nom::Err::Error(nested.or(e)),
            other => other,
        })
        .map_err(|err| relabel(err, input, "type name or literal"))
}

/// `STRING | STRING "=" INT`
fn string_or_enum_pair(input: &str) -> PResult<'_, AstArg> {
    let (rest, label) = quoted_string(input)?;
    let (after_ws, _) = ws(rest)?;
    match symbol('=').parse(after_ws) {
        Ok((after_eq, _)) => {
            let (after_eq, _) = ws(after_eq)?;
            let (rest, ordinal) = cut(integer).parse(after_eq)?;
            Ok((rest, AstArg::EnumPair(label, ordinal)))
        }
        Err(nom::Err::Error(_)) => Ok((rest, AstArg::Str(label))),
        Err(err) => Err(err),
    }
}

fn integer(input: &str) -> PResult<'_, i64> {
    let (rest, text) = recognize((opt(one_of("+-")), digit1))
        .parse(input)
        .map_err(|err| relabel(err, input, "integer"))?;
    text.parse::<i64>().map_or_else(
        |_| {
            Err(nom::Err::Failure(GrammarError::new(
                input,
                Reason::IntegerOverflow,
            )))
        },
        |value| Ok((rest, value)),
    )
}

/// Single-quoted string with `\\`, `\'`, `\t`, `\n` and `\0` escapes.
fn quoted_string(input: &str) -> PResult<'_, String> {
    let Some(body) = input.strip_prefix('\'') else {
        return Err(nom::Err::Error(GrammarError::new(
            input,
            Reason::Expected("quoted string"),
        )));
    };

    let mut text = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' => return Ok((&body[i + 1..], text)),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                match escaped {
                    '\\' => text.push('\\'),
                    '\'' => text.push('\''),
                    't' => text.push('\t'),
                    'n' => text.push('\n'),
                    '0' => text.push('\0'),
                    other => {
                        return Err(nom::Err::Failure(GrammarError::new(
                            &body[i..],
                            Reason::BadEscape(other),
                        )));
                    }
                }
            }
            other => text.push(other),
        }
    }

    Err(nom::Err::Failure(GrammarError::new(
        input,
        Reason::UnterminatedString,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_string_escapes() {
        let (rest, text) = quoted_string(r"'a\'b\\c\td\ne\0f' tail").unwrap();
        assert_eq!(text, "a'b\\c\td\ne\0f");
        assert_eq!(rest, " tail");
    }

    #[test]
    fn test_quoted_string_empty() {
        let (rest, text) = quoted_string("''").unwrap();
        assert!(text.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_quoted_string_non_ascii() {
        let (_, text) = quoted_string("'зразок'").unwrap();
        assert_eq!(text, "зразок");
    }

    #[test]
    fn test_unterminated_string() {
        let err = quoted_string(r"'abc\'").unwrap_err();
        assert!(matches!(
            err,
            nom::Err::Failure(GrammarError {
                reason: Reason::UnterminatedString,
                ..
            })
        ));
    }

    #[test]
    fn test_integer_signs() {
        assert_eq!(integer("-128)").unwrap(), (")", -128));
        assert_eq!(integer("+7").unwrap(), ("", 7));
    }

    #[test]
    fn test_integer_overflow_is_failure() {
        assert!(matches!(
            integer("9223372036854775808"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_enum_pair_without_spaces() {
        let (_, arg) = string_or_enum_pair("'a'=-1").unwrap();
        assert_eq!(arg, AstArg::EnumPair("a".into(), -1));
    }

    #[test]
    fn test_error_messages() {
        let err = parse("Array()").unwrap_err();
        assert!(err.to_string().contains("expected type name or literal"), "{err}");

        let err = parse("Array(UInt8").unwrap_err();
        assert!(err.to_string().contains("expected ')'"), "{err}");

        let err = parse("UInt8 x").unwrap_err();
        assert!(err.to_string().contains("after type declaration"), "{err}");
    }
}
