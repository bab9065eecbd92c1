pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod ir;
pub mod scope;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that render a resolved codegen unit into
/// source files.
pub trait CodeGenerator {
    type Error: std::error::Error;
    fn generate(&self, unit: &ir::CodegenUnit) -> Result<Vec<GeneratedFile>, Self::Error>;
}
