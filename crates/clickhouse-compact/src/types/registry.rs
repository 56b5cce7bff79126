//! Type registry: maps type names to descriptor factories.
//!
//! The registry is an explicit value. It is populated through `&mut self`
//! and then shared read-only, typically as `Arc<TypeRegistry>`, so a
//! shared registry can never be observed half-built.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::decimal::DecimalSpec;
use super::descriptor::TypeDescriptor;
use super::enumeration::{EnumSpec, EnumWidth};
use crate::grammar::{self, AstArg, TypeNode};
use crate::{Error, Result};

/// Largest `DateTime64` precision.
const MAX_DATETIME64_PRECISION: i64 = 9;

/// A resolved argument handed to a factory.
#[derive(Debug, Clone)]
pub enum TypeArg {
    /// Nested type, already resolved.
    Type(TypeDescriptor),
    /// Integer literal.
    Int(i64),
    /// String literal.
    Str(String),
    /// `'label' = ordinal` pair.
    EnumPair(String, i64),
}

impl TypeArg {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::EnumPair(..) => "enum pair",
        }
    }
}

/// Constructor for a named type.
///
/// Receives the resolved arguments in declaration order (empty for a bare
/// identifier) and either builds a descriptor or rejects the arguments.
pub type TypeFactory = Arc<dyn Fn(&[TypeArg]) -> Result<TypeDescriptor> + Send + Sync>;

/// Name to factory mapping used to resolve declarations.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use clickhouse_compact::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// registry.register_alias("Int", "Int32")?;
/// let registry = Arc::new(registry);
///
/// let descriptor = registry.parse("Array(Nullable(UInt8))")?;
/// ```
#[derive(Clone)]
pub struct TypeRegistry {
    factories: HashMap<String, TypeFactory>,
}

impl TypeRegistry {
    /// Registry with every built-in type.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    /// Registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Add or replace the factory for `name`.
    ///
    /// Returns the factory previously registered under that name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Option<TypeFactory>
    where
        F: Fn(&[TypeArg]) -> Result<TypeDescriptor> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory))
    }

    /// Make `alias` resolve exactly like `target`.
    ///
    /// # Errors
    ///
    /// Returns an unknown type error if `target` is not registered.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) -> Result<()> {
        let factory = self
            .factories
            .get(target)
            .cloned()
            .ok_or_else(|| Error::unknown_type(target))?;
        self.factories.insert(alias.into(), factory);
        Ok(())
    }

    /// Returns true if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a syntax tree into a descriptor.
    ///
    /// Arguments are resolved depth-first before the node's own factory
    /// runs, so an unknown nested name is reported before any argument
    /// problem of its parent.
    ///
    /// # Errors
    ///
    /// Returns an unknown type error for unregistered names and an invalid
    /// type arguments error when a factory rejects its arguments.
    pub fn resolve(&self, node: &TypeNode) -> Result<TypeDescriptor> {
        let args = node
            .args()
            .iter()
            .map(|arg| self.resolve_arg(arg))
            .collect::<Result<Vec<_>>>()?;

        let name = node.name();
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::unknown_type(name))?;

        trace!(type_name = name, args = args.len(), "Resolving type");
        factory(&args).map_err(|err| {
            if err.is_invalid_type_arguments() {
                err
            } else {
                Error::invalid_type_arguments(name, err.to_string())
            }
        })
    }

    fn resolve_arg(&self, arg: &AstArg) -> Result<TypeArg> {
        Ok(match arg {
            AstArg::Type(node) => TypeArg::Type(self.resolve(node)?),
            AstArg::Int(value) => TypeArg::Int(*value),
            AstArg::Str(text) => TypeArg::Str(text.clone()),
            AstArg::EnumPair(label, ordinal) => TypeArg::EnumPair(label.clone(), *ordinal),
        })
    }

    /// Parse and resolve a declaration.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for malformed text, otherwise the errors of
    /// [`resolve`](Self::resolve).
    pub fn parse(&self, declaration: &str) -> Result<TypeDescriptor> {
        let node = grammar::parse(declaration)?;
        self.resolve(&node)
    }

    fn register_builtins(&mut self) {
        for (name, descriptor) in [
            ("Nothing", TypeDescriptor::Nothing),
            ("Bool", TypeDescriptor::Bool),
            ("UInt8", TypeDescriptor::UInt8),
            ("UInt16", TypeDescriptor::UInt16),
            ("UInt32", TypeDescriptor::UInt32),
            ("UInt64", TypeDescriptor::UInt64),
            ("UInt128", TypeDescriptor::UInt128),
            ("UInt256", TypeDescriptor::UInt256),
            ("Int8", TypeDescriptor::Int8),
            ("Int16", TypeDescriptor::Int16),
            ("Int32", TypeDescriptor::Int32),
            ("Int64", TypeDescriptor::Int64),
            ("Int128", TypeDescriptor::Int128),
            ("Int256", TypeDescriptor::Int256),
            ("Float32", TypeDescriptor::Float32),
            ("Float64", TypeDescriptor::Float64),
            ("String", TypeDescriptor::String),
            ("UUID", TypeDescriptor::Uuid),
            ("Date", TypeDescriptor::Date),
            ("Date32", TypeDescriptor::Date32),
            ("IPv4", TypeDescriptor::Ipv4),
            ("IPv6", TypeDescriptor::Ipv6),
        ] {
            self.register(name, nullary(name, descriptor));
        }
        self.register("Boolean", nullary("Boolean", TypeDescriptor::Bool));

        self.register("FixedString", fixed_string);
        self.register("DateTime", datetime);
        self.register("DateTime64", datetime64);
        self.register("Decimal", decimal);
        self.register("Decimal32", |args: &[TypeArg]| decimal_width("Decimal32", 9, args));
        self.register("Decimal64", |args: &[TypeArg]| decimal_width("Decimal64", 18, args));
        self.register("Decimal128", |args: &[TypeArg]| decimal_width("Decimal128", 38, args));
        self.register("Decimal256", |args: &[TypeArg]| decimal_width("Decimal256", 76, args));
        self.register("Enum8", |args: &[TypeArg]| enumeration(EnumWidth::Enum8, args));
        self.register("Enum16", |args: &[TypeArg]| enumeration(EnumWidth::Enum16, args));
        self.register("Nullable", nullable);
        self.register("LowCardinality", low_cardinality);
        self.register("Array", array);
        self.register("Tuple", tuple);
        self.register("Map", map);
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/// Parse and resolve `declaration` against `registry`.
///
/// # Errors
///
/// See [`TypeRegistry::parse`].
pub fn parse_type(registry: &TypeRegistry, declaration: &str) -> Result<TypeDescriptor> {
    registry.parse(declaration)
}

// ═══════════════════════════════════════════════════════════════════════════
// Built-in factories
// ═══════════════════════════════════════════════════════════════════════════

fn nullary(
    name: &'static str,
    descriptor: TypeDescriptor,
) -> impl Fn(&[TypeArg]) -> Result<TypeDescriptor> + Send + Sync + 'static {
    move |args| {
        if args.is_empty() {
            Ok(descriptor.clone())
        } else {
            Err(Error::invalid_type_arguments(name, "takes no arguments"))
        }
    }
}

fn arity(name: &str, args: &[TypeArg], expected: &str, ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::invalid_type_arguments(
            name,
            format!("expected {expected}, got {} arguments", args.len()),
        ))
    }
}

fn expect_type(name: &str, arg: &TypeArg) -> Result<TypeDescriptor> {
    match arg {
        TypeArg::Type(descriptor) => Ok(descriptor.clone()),
        other => Err(Error::invalid_type_arguments(
            name,
            format!("expected a type, got {}", other.kind()),
        )),
    }
}

fn expect_int(name: &str, arg: &TypeArg) -> Result<i64> {
    match arg {
        TypeArg::Int(value) => Ok(*value),
        other => Err(Error::invalid_type_arguments(
            name,
            format!("expected an integer, got {}", other.kind()),
        )),
    }
}

fn expect_str(name: &str, arg: &TypeArg) -> Result<String> {
    match arg {
        TypeArg::Str(text) => Ok(text.clone()),
        other => Err(Error::invalid_type_arguments(
            name,
            format!("expected a string, got {}", other.kind()),
        )),
    }
}

fn single_type(name: &str, args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity(name, args, "one type", args.len() == 1)?;
    expect_type(name, &args[0])
}

fn fixed_string(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity("FixedString", args, "one length", args.len() == 1)?;
    let length = expect_int("FixedString", &args[0])?;
    usize::try_from(length)
        .ok()
        .filter(|n| *n > 0)
        .map(TypeDescriptor::FixedString)
        .ok_or_else(|| {
            Error::invalid_type_arguments(
                "FixedString",
                format!("length must be positive, got {length}"),
            )
        })
}

fn datetime(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity("DateTime", args, "at most one timezone", args.len() <= 1)?;
    let timezone = args
        .first()
        .map(|arg| expect_str("DateTime", arg))
        .transpose()?;
    Ok(TypeDescriptor::DateTime { timezone })
}

fn datetime64(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity(
        "DateTime64",
        args,
        "precision and optional timezone",
        matches!(args.len(), 1 | 2),
    )?;
    let precision = expect_int("DateTime64", &args[0])?;
    let precision = u8::try_from(precision)
        .ok()
        .filter(|p| i64::from(*p) <= MAX_DATETIME64_PRECISION)
        .ok_or_else(|| {
            Error::invalid_type_arguments(
                "DateTime64",
                format!(
                    "precision must be between 0 and {MAX_DATETIME64_PRECISION}, got {precision}"
                ),
            )
        })?;
    let timezone = args
        .get(1)
        .map(|arg| expect_str("DateTime64", arg))
        .transpose()?;
    Ok(TypeDescriptor::DateTime64 {
        precision,
        timezone,
    })
}

fn decimal(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity("Decimal", args, "precision and scale", args.len() == 2)?;
    let precision = expect_int("Decimal", &args[0])?;
    let scale = expect_int("Decimal", &args[1])?;
    DecimalSpec::new(precision, scale).map(TypeDescriptor::Decimal)
}

fn decimal_width(name: &str, precision: u8, args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity(name, args, "one scale", args.len() == 1)?;
    let scale = expect_int(name, &args[0])?;
    DecimalSpec::with_width(name, precision, scale).map(TypeDescriptor::Decimal)
}

fn enumeration(width: EnumWidth, args: &[TypeArg]) -> Result<TypeDescriptor> {
    let pairs = args
        .iter()
        .map(|arg| match arg {
            TypeArg::EnumPair(label, ordinal) => Ok((label.clone(), *ordinal)),
            other => Err(Error::invalid_type_arguments(
                width.name(),
                format!("expected 'label' = ordinal, got {}", other.kind()),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    EnumSpec::new(width, pairs).map(TypeDescriptor::Enum)
}

fn nullable(args: &[TypeArg]) -> Result<TypeDescriptor> {
    let inner = single_type("Nullable", args)?;
    if inner.is_nullable() {
        return Err(Error::invalid_type_arguments(
            "Nullable",
            "nested Nullable is not allowed",
        ));
    }
    Ok(TypeDescriptor::Nullable(Box::new(inner)))
}

fn low_cardinality(args: &[TypeArg]) -> Result<TypeDescriptor> {
    single_type("LowCardinality", args).map(|inner| TypeDescriptor::LowCardinality(Box::new(inner)))
}

fn array(args: &[TypeArg]) -> Result<TypeDescriptor> {
    single_type("Array", args).map(|element| TypeDescriptor::Array(Box::new(element)))
}

fn tuple(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity("Tuple", args, "at least one type", !args.is_empty())?;
    args.iter()
        .map(|arg| expect_type("Tuple", arg))
        .collect::<Result<Vec<_>>>()
        .map(TypeDescriptor::Tuple)
}

fn map(args: &[TypeArg]) -> Result<TypeDescriptor> {
    arity("Map", args, "key and value types", args.len() == 2)?;
    let key = expect_type("Map", &args[0])?;
    let value = expect_type("Map", &args[1])?;
    Ok(TypeDescriptor::Map(Box::new(key), Box::new(value)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Value;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn test_builtins_resolve() {
        let registry = registry();
        for declaration in [
            "Nothing",
            "Bool",
            "UInt256",
            "Int128",
            "Float32",
            "String",
            "FixedString(16)",
            "UUID",
            "Date32",
            "DateTime",
            "DateTime('Europe/Moscow')",
            "DateTime64(3)",
            "DateTime64(9, 'UTC')",
            "Decimal(76, 76)",
            "Decimal128(10)",
            "Enum16('a' = -32768, 'b' = 32767)",
            "IPv4",
            "IPv6",
            "Nullable(Nothing)",
            "LowCardinality(Nullable(String))",
            "Array(Array(UInt8))",
            "Tuple(UInt8, String)",
            "Map(String, Array(UInt64))",
        ] {
            let descriptor = registry
                .parse(declaration)
                .unwrap_or_else(|e| panic!("{declaration}: {e}"));
            assert_eq!(
                registry.parse(&descriptor.to_string()).unwrap().to_string(),
                descriptor.to_string()
            );
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = registry().parse("Foo").unwrap_err();
        assert!(err.is_unknown_type());
        let err = registry().parse("Array(Foo)").unwrap_err();
        assert!(err.is_unknown_type());
        assert!(err.to_string().contains("Foo"));
    }

    #[test]
    fn test_nested_unknown_reported_before_parent_arity() {
        let err = registry().parse("Nullable(Foo, Bar)").unwrap_err();
        assert!(err.is_unknown_type(), "{err}");
    }

    #[test]
    fn test_invalid_arguments() {
        let registry = registry();
        for declaration in [
            "UInt8(1)",
            "Array",
            "Array(UInt8, UInt8)",
            "Array(1)",
            "Nullable(Nullable(UInt8))",
            "FixedString(0)",
            "FixedString('a')",
            "Decimal(9)",
            "Decimal(0, 0)",
            "Decimal(9, 10)",
            "Decimal32(10)",
            "DateTime64(10)",
            "DateTime(1)",
            "Enum8('a' = 200)",
            "Enum8('a' = 1, 'b' = 1)",
            "Enum8(UInt8)",
            "Enum8",
            "Map(String)",
            "Tuple",
        ] {
            let err = registry.parse(declaration).unwrap_err();
            assert!(
                err.is_invalid_type_arguments(),
                "expected invalid arguments for {declaration}, got {err}"
            );
        }
    }

    #[test]
    fn test_syntax_error_passes_through() {
        assert!(registry().parse("Array(").unwrap_err().is_syntax());
    }

    #[test]
    fn test_resolution_is_pure() {
        let registry = registry();
        let node = TypeNode::parse("Tuple(UInt8, Nullable(String))").unwrap();
        let first = registry.resolve(&node).unwrap();
        let second = registry.resolve(&node).unwrap();
        let wire = json!([1, null]);
        assert_eq!(first.decode(&wire).unwrap(), second.decode(&wire).unwrap());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_nullable_is_idempotent() {
        let registry = registry();
        let descriptor = registry.parse("Nullable(UInt8)").unwrap();
        assert_eq!(descriptor.decode(&json!(null)).unwrap(), Value::Null);
        assert_eq!(descriptor.decode(&json!(3)).unwrap(), Value::UInt8(3));
    }

    #[test]
    fn test_empty_registry() {
        let registry = TypeRegistry::empty();
        assert!(registry.names().is_empty());
        assert!(registry.parse("UInt8").unwrap_err().is_unknown_type());
    }

    #[test]
    fn test_boolean_alias() {
        let descriptor = registry().parse("Boolean").unwrap();
        assert_eq!(descriptor.decode(&json!(true)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_register_alias() {
        let mut registry = registry();
        registry.register_alias("Int", "Int32").unwrap();
        assert!(registry.contains("Int"));
        assert_eq!(
            registry.parse("Int").unwrap().decode(&json!(-1)).unwrap(),
            Value::Int32(-1)
        );
        assert!(registry.register_alias("X", "Missing").unwrap_err().is_unknown_type());
    }

    #[test]
    fn test_register_replaces_factory() {
        let mut registry = registry();
        let previous = registry.register("UInt8", |_: &[TypeArg]| Ok(TypeDescriptor::String));
        assert!(previous.is_some());
        assert_eq!(
            registry.parse("UInt8").unwrap().decode(&json!("x")).unwrap(),
            Value::from("x")
        );
    }

    #[test]
    fn test_custom_factory_receives_resolved_args() {
        let mut registry = registry();
        registry.register("Pair", |args: &[TypeArg]| {
            let [TypeArg::Type(t)] = args else {
                return Err(Error::invalid_type_arguments("Pair", "expected one type"));
            };
            Ok(TypeDescriptor::Tuple(vec![t.clone(), t.clone()]))
        });
        let descriptor = registry.parse("Pair(UInt8)").unwrap();
        assert_eq!(
            descriptor.decode(&json!([1, 2])).unwrap(),
            Value::Tuple(vec![Value::UInt8(1), Value::UInt8(2)])
        );
        assert!(registry.parse("Pair").unwrap_err().is_invalid_type_arguments());
    }

    #[test]
    fn test_foreign_factory_errors_are_classified() {
        let mut registry = registry();
        registry.register("Broken", |_: &[TypeArg]| Err(Error::unsupported_value("nope")));
        let err = registry.parse("Broken").unwrap_err();
        assert!(err.is_invalid_type_arguments());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = registry();
        let names = registry.names();
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
        assert!(names.contains(&"Map"));
    }

    #[test]
    fn test_parse_type_function() {
        let descriptor = parse_type(&registry(), "Array(String)").unwrap();
        assert_eq!(descriptor.to_string(), "Array(String)");
    }
}
