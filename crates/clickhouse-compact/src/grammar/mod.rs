//! Type declaration grammar.
//!
//! Turns the textual column type reported by the server into a [`TypeNode`]
//! syntax tree. The grammar is:
//!
//! ```text
//! type_expr    := IDENT ( "(" arg ("," arg)* ")" )?
//! arg          := type_expr | literal
//! literal      := STRING | INT | STRING "=" INT
//! STRING       := "'" ( escaped_char | [^'\\] )* "'"
//! escaped_char := "\\" ("\\" | "'" | "t" | "n" | "0")
//! ```
//!
//! Whitespace between tokens is insignificant. Declarations nested deeper
//! than [`MAX_DEPTH`] levels are rejected as syntax errors. The parser knows nothing
//! about which identifiers are valid type names; that is decided when the
//! tree is resolved against a [`TypeRegistry`](crate::TypeRegistry).

mod parser;

use std::fmt;

use crate::Result;

pub use parser::parse;

/// Deepest nesting accepted by [`parse`]; a simple type has depth 1.
pub const MAX_DEPTH: usize = 256;

/// A parsed type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// Bare identifier, e.g. `UInt8`.
    Simple(String),
    /// Identifier applied to a non-empty argument list, e.g. `Array(String)`.
    Composite {
        /// Type name.
        name: String,
        /// Ordered arguments.
        args: Vec<AstArg>,
    },
}

/// One argument of a composite declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AstArg {
    /// Nested declaration.
    Type(TypeNode),
    /// Signed integer literal.
    Int(i64),
    /// Quoted string literal, escapes already applied.
    Str(String),
    /// `'label' = ordinal` enum entry.
    EnumPair(String, i64),
}

impl TypeNode {
    /// Parse a declaration string. Shorthand for [`parse`].
    pub fn parse(declaration: &str) -> Result<Self> {
        parse(declaration)
    }

    /// The leading identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(name) | Self::Composite { name, .. } => name,
        }
    }

    /// Arguments of a composite node; empty for a simple one.
    #[must_use]
    pub fn args(&self) -> &[AstArg] {
        match self {
            Self::Simple(_) => &[],
            Self::Composite { args, .. } => args,
        }
    }

    /// Nesting depth; a simple type has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .args()
            .iter()
            .map(|arg| match arg {
                AstArg::Type(node) => node.depth(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Composite { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for AstArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(node) => write!(f, "{node}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(text) => write_quoted(f, text),
            Self::EnumPair(label, ordinal) => {
                write_quoted(f, label)?;
                write!(f, " = {ordinal}")
            }
        }
    }
}

/// Write `text` as a quoted literal using the grammar's escapes.
pub(crate) fn write_quoted(f: &mut impl fmt::Write, text: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\0' => f.write_str("\\0")?,
            other => f.write_char(other)?,
        }
    }
    f.write_char('\'')
}
