//! Domain model (type keys, pathways, errors).

pub mod errors;
pub mod pathway;
pub mod type_key;

pub use self::errors::{HandleError, ResolveError};
pub use self::pathway::Pathway;
pub use self::type_key::TypeKey;
