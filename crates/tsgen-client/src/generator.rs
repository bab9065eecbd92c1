use log::debug;
use thiserror::Error;

use tsgen_core::ir::CodegenUnit;
use tsgen_core::{CodeGenerator, GeneratedFile};

use crate::emitters;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders a resolved codegen unit into TypeScript modules plus an index.
pub struct TypeScriptGenerator;

impl CodeGenerator for TypeScriptGenerator {
    type Error = EmitError;

    fn generate(&self, unit: &CodegenUnit) -> Result<Vec<GeneratedFile>, EmitError> {
        debug!("rendering {} modules", unit.modules.len());
        let mut files = Vec::new();
        for module in &unit.modules {
            files.push(GeneratedFile {
                path: module.file_path.clone(),
                content: emitters::module::emit_module(module)?,
            });
        }
        files.push(GeneratedFile {
            path: unit.index.file_path.clone(),
            content: emitters::index::emit_index(&unit.index)?,
        });
        Ok(files)
    }
}
