//! Type system: registry, resolved descriptors and native values.
//!
//! # Architecture
//!
//! ```text
//! declaration --grammar--> TypeNode --TypeRegistry--> TypeDescriptor
//! wire JSON ----------------------TypeDescriptor::decode---------> Value
//! ```

mod decimal;
mod descriptor;
mod enumeration;
mod registry;
mod scalar;
mod value;

pub use decimal::DecimalSpec;
pub use descriptor::{CustomType, TypeDescriptor};
pub use enumeration::{EnumSpec, EnumWidth};
pub use registry::{TypeArg, TypeFactory, TypeRegistry, parse_type};
pub use value::Value;
