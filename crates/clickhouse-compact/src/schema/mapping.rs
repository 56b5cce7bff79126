//! Column metadata to resolved schema mapping.

use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::cache::DescriptorCache;
use crate::conversion::ColumnMeta;
use crate::types::{TypeDescriptor, TypeRegistry};

/// One result column with its resolved type.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    declaration: String,
    descriptor: Arc<TypeDescriptor>,
}

impl Column {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration text as reported by the server.
    #[must_use]
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Resolved type.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

/// Resolved columns of one response.
#[derive(Debug, Clone)]
pub struct ResultSchema {
    columns: Vec<Column>,
    names: Arc<[String]>,
}

impl ResultSchema {
    /// Columns in server order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true for a result without columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names, shared with every record of the response.
    #[must_use]
    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    /// First column called `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Resolves column metadata against a registry, optionally through a
/// descriptor cache.
///
/// # Example
///
/// ```rust,ignore
/// use clickhouse_compact::schema::SchemaMapper;
///
/// let schema = SchemaMapper::new(&registry).resolve(&response.meta)?;
/// for column in schema.columns() {
///     println!("{}: {}", column.name(), column.descriptor());
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SchemaMapper<'a> {
    registry: &'a TypeRegistry,
    cache: Option<&'a DescriptorCache>,
}

impl<'a> SchemaMapper<'a> {
    /// Mapper resolving every declaration through `registry`.
    #[must_use]
    pub const fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            cache: None,
        }
    }

    /// Reuse descriptors from `cache`.
    #[must_use]
    pub const fn with_cache(mut self, cache: Option<&'a DescriptorCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Resolve every column once, in order.
    ///
    /// # Errors
    ///
    /// Returns the first syntax, unknown type or invalid arguments error,
    /// carrying the column name and its declaration.
    pub fn resolve(&self, meta: &[ColumnMeta]) -> Result<ResultSchema> {
        let columns = meta
            .iter()
            .map(|column| {
                let descriptor = self
                    .descriptor(&column.type_name)
                    .map_err(|e| e.for_column(&column.name, &column.type_name))?;
                debug!(
                    column = %column.name,
                    declaration = %column.type_name,
                    "Resolved column type"
                );
                Ok(Column {
                    name: column.name.clone(),
                    declaration: column.type_name.clone(),
                    descriptor,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let names = columns.iter().map(|c| c.name.clone()).collect();
        Ok(ResultSchema { columns, names })
    }

    fn descriptor(&self, declaration: &str) -> Result<Arc<TypeDescriptor>> {
        match self.cache {
            Some(cache) => cache.get_or_try_insert(declaration, || self.registry.parse(declaration)),
            None => self.registry.parse(declaration).map(Arc::new),
        }
    }
}
