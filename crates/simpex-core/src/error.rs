//! Error types for model building and value access

use thiserror::Error;

/// Result type for simpex operations
pub type Result<T> = std::result::Result<T, ImpexError>;

/// Errors raised while declaring types, building entries or reading values.
///
/// Every failure is reported at the call that violates the model; nothing is
/// registered or mutated when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpexError {
    /// Malformed attribute token or macro definition
    #[error("invalid attribute declaration '{token}': {reason}")]
    DeclarationSyntax { token: String, reason: String },

    /// `$name` reference without a macro definition
    #[error("unknown macro '${name}'")]
    UnknownMacro { name: String },

    /// Macro that (indirectly) references itself or nests too deep
    #[error("macro '${name}' cannot be expanded: {chain}")]
    MacroRecursion { name: String, chain: String },

    /// Entry values of the wrong shape, or an unusable type
    #[error("invalid values for type '{type_name}': {reason}")]
    ShapeMismatch { type_name: String, reason: String },

    /// Query matches several columns
    #[error(
        "attribute '{query}' is ambiguous in type '{type_name}', use one of: {}",
        .candidates.join(", ")
    )]
    AmbiguousName {
        type_name: String,
        query: String,
        candidates: Vec<String>,
    },

    /// Query matches no column
    #[error("type '{type_name}' has no attribute matching '{query}'")]
    UnresolvedName { type_name: String, query: String },

    /// Catalog-version formatting on a type without the catalog-version macro
    #[error("type '{type_name}' declares no $catalogVersion attribute")]
    MissingCatalogVersion { type_name: String },

    /// Catalog-version column value without a `catalog:version` separator
    #[error("type '{type_name}': catalog version '{value}' is not of the form <catalog>:<version>")]
    MalformedCatalogVersion { type_name: String, value: String },
}

impl ImpexError {
    pub(crate) fn syntax(token: &str, reason: impl Into<String>) -> Self {
        ImpexError::DeclarationSyntax {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(type_name: &str, reason: impl Into<String>) -> Self {
        ImpexError::ShapeMismatch {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = ImpexError::AmbiguousName {
            type_name: "Product".into(),
            query: "name".into(),
            candidates: vec!["name[lang=en]".into(), "name[lang=de]".into()],
        };
        assert_eq!(
            err.to_string(),
            "attribute 'name' is ambiguous in type 'Product', use one of: name[lang=en], name[lang=de]"
        );
    }

    #[test]
    fn test_unknown_macro_display() {
        let err = ImpexError::UnknownMacro {
            name: "catalogVersion".into(),
        };
        assert_eq!(err.to_string(), "unknown macro '$catalogVersion'");
    }
}
