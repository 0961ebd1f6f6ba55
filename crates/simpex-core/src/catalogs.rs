/// Macro name that marks the catalog-version column of a type.
pub const CATALOG_VERSION_MACRO: &str = "catalogVersion";

/// Nesting limit for macro bodies that reference other macros.
pub const MAX_MACRO_DEPTH: usize = 16;

/// Column separator of header and record lines.
pub const FIELD_SEPARATOR: &str = ";";

/// Joins the elements of a list-typed value.
pub const LIST_SEPARATOR: &str = ",";

/// Separates value, catalog id and version in catalog-version specific values.
pub const CATALOG_VERSION_SEPARATOR: char = ':';

/// Prefix of after-each statements in the import text.
pub const AFTER_EACH_PREFIX: &str = "#%afterEach: ";

/// Extension of files produced per type.
pub const FILE_EXTENSION: &str = "impex";

pub const GENERATOR_VERSION: &str = "0.3.0";
