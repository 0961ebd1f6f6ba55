use crate::catalogs::FILE_EXTENSION;
use crate::impex_type::ImpexType;
use crate::types::ImpexFile;

/// Ordered collection of types bound for one destination.
///
/// The destination is opaque here; writing files is left to the caller.
#[derive(Debug)]
pub struct ImpexResult {
    destination: String,
    types: Vec<ImpexType>,
}

impl ImpexResult {
    pub fn new(destination: impl Into<String>) -> Self {
        ImpexResult {
            destination: destination.into(),
            types: Vec::new(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn push(&mut self, ty: ImpexType) {
        self.types.push(ty);
    }

    pub fn types(&self) -> &[ImpexType] {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&ImpexType> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ImpexType> {
        self.types.iter_mut().find(|t| t.name() == name)
    }

    /// All types as one document, a blank line between blocks.
    pub fn render(&self) -> String {
        self.types
            .iter()
            .map(ImpexType::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One file per type, numbered in insertion order: `001_Language.impex`.
    pub fn files(&self) -> Vec<ImpexFile> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| ImpexFile {
                name: format!("{:03}_{}.{}", i + 1, ty.name(), FILE_EXTENSION),
                content: ty.render(),
            })
            .collect()
    }
}
