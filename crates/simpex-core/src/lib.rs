pub mod attribute;
pub mod catalogs;
pub mod entry;
pub mod error;
pub mod impex_type;
pub mod macros;
pub mod render;
pub mod result;
pub mod schema;
pub mod types;
pub mod value;

pub use attribute::{parse_declaration, parse_plain};
pub use catalogs::{CATALOG_VERSION_MACRO, GENERATOR_VERSION};
pub use entry::TypeEntry;
pub use error::{ImpexError, Result};
pub use impex_type::ImpexType;
pub use macros::MacroTable;
pub use result::ImpexResult;
pub use schema::TypeSchema;
pub use types::*;
