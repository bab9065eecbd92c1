//! The generation driver: owns the scope tree and the per-module typedef
//! and operation lists, and turns a dereferenced document into a
//! [`CodegenUnit`] ready for rendering.

pub mod operations;
pub mod types;

use indexmap::IndexMap;
use log::debug;

use crate::config::TsgenConfig;
use crate::document::DocNode;
use crate::error::CodegenError;
use crate::ir::{
    CodegenUnit, ExportGroup, HttpMethod, ImportBinding, ImportGroup, IndexUnit, ModuleUnit,
    OperationDescriptor, Typedef,
};
use crate::scope::{Definition, ScopeId, ScopeTree, SymbolEntry};

/// Scope name and file stem of the shared type-definitions module.
pub(crate) const DEFINITIONS_MODULE: &str = "definitions";

/// Run a full generation pass over a dereferenced document.
pub fn run(doc: &DocNode, config: &TsgenConfig) -> Result<CodegenUnit, CodegenError> {
    let mut codegen = Codegen::new(doc, config)?;
    codegen.collect_tag_classes();
    codegen.register_definitions()?;
    codegen.generate_definitions()?;
    codegen.generate_operations()?;
    codegen.into_unit()
}

/// Per-module accumulation context.
pub(crate) struct ModuleState {
    pub(crate) scope: ScopeId,
    pub(crate) file_path: String,
    pub(crate) class_name: Option<String>,
    pub(crate) base_class: Option<String>,
    pub(crate) typedefs: Vec<Typedef>,
    pub(crate) operations: Vec<OperationDescriptor>,
}

pub(crate) struct Codegen<'d> {
    pub(crate) doc: &'d DocNode,
    pub(crate) config: &'d TsgenConfig,
    pub(crate) scopes: ScopeTree,
    pub(crate) modules: IndexMap<String, ModuleState>,
    /// Tag name → generator class annotation.
    pub(crate) classes: IndexMap<String, String>,
}

impl<'d> Codegen<'d> {
    fn new(doc: &'d DocNode, config: &'d TsgenConfig) -> Result<Self, CodegenError> {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();

        // The client base class lives in the runtime module; API modules
        // import it from the root scope.
        scopes.define(
            root,
            &config.client.class_name,
            Definition::new(Some(config.client.module.clone()), None, false),
        )?;

        let file_path = format!("{DEFINITIONS_MODULE}.ts");
        let scope = scopes.scope(root, DEFINITIONS_MODULE, &file_path);
        let mut modules = IndexMap::new();
        modules.insert(
            DEFINITIONS_MODULE.to_string(),
            ModuleState {
                scope,
                file_path,
                class_name: None,
                base_class: None,
                typedefs: Vec::new(),
                operations: Vec::new(),
            },
        );

        Ok(Codegen {
            doc,
            config,
            scopes,
            modules,
            classes: IndexMap::new(),
        })
    }

    fn collect_tag_classes(&mut self) {
        let doc = self.doc;
        if let Some(tags) = doc.get("tags").and_then(DocNode::as_array) {
            for tag in &tags.items {
                if let (Some(name), Some(class)) =
                    (tag.str_field("name"), tag.str_field("x-codegen-class"))
                {
                    self.classes.insert(name.to_string(), class.to_string());
                }
            }
        }
    }

    /// Pre-register every shared definition before any typedef body is
    /// generated, so forward and cyclic references inside the shared area
    /// resolve through the dedup path instead of degrading.
    fn register_definitions(&mut self) -> Result<(), CodegenError> {
        let doc = self.doc;
        let Some(schemas) = doc
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(DocNode::as_object)
        else {
            return Ok(());
        };
        for (name, schema) in &schemas.fields {
            self.register_typedef(DEFINITIONS_MODULE, name, schema)?;
        }
        Ok(())
    }

    fn generate_definitions(&mut self) -> Result<(), CodegenError> {
        let doc = self.doc;
        let Some(schemas) = doc
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(DocNode::as_object)
        else {
            return Ok(());
        };
        debug!("generating {} shared definitions", schemas.fields.len());
        for (name, schema) in &schemas.fields {
            self.typedef_body(DEFINITIONS_MODULE, name, schema)?;
        }
        Ok(())
    }

    fn generate_operations(&mut self) -> Result<(), CodegenError> {
        let doc = self.doc;
        let Some(paths) = doc.get("paths").and_then(DocNode::as_object) else {
            return Ok(());
        };
        for (template, item) in &paths.fields {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (field, value) in &item.fields {
                if let Some(method) = HttpMethod::from_field(field) {
                    self.resolve_operation(method, template, value)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve every module's import entries and public exports into the
    /// final unit.
    fn into_unit(self) -> Result<CodegenUnit, CodegenError> {
        let mut modules = Vec::new();
        let mut exports = Vec::new();

        for (name, state) in &self.modules {
            let imports = self.module_imports(state)?;

            let public: Vec<String> = self
                .scopes
                .symbols(state.scope)
                .filter_map(|(local, entry)| {
                    entry
                        .as_definition()
                        .filter(|def| def.public)
                        .map(|_| local.to_string())
                })
                .collect();
            if !public.is_empty() {
                exports.push(ExportGroup {
                    specifier: module_specifier(&state.file_path),
                    names: public,
                });
            }

            modules.push(ModuleUnit {
                name: name.clone(),
                file_path: state.file_path.clone(),
                class_name: state.class_name.clone(),
                base_class: state.base_class.clone(),
                imports,
                typedefs: state.typedefs.clone(),
                operations: state.operations.clone(),
            });
        }

        Ok(CodegenUnit {
            modules,
            index: IndexUnit {
                file_path: "index.ts".to_string(),
                exports,
            },
        })
    }

    /// Minimal import list for one module: every import entry in its scope,
    /// resolved to the defining module's file and grouped by specifier.
    fn module_imports(&self, state: &ModuleState) -> Result<Vec<ImportGroup>, CodegenError> {
        let root = self.scopes.root();
        let mut groups: IndexMap<String, Vec<ImportBinding>> = IndexMap::new();

        for (local, entry) in self.scopes.symbols(state.scope) {
            let SymbolEntry::Import(import) = entry else {
                continue;
            };
            // Sources are root-qualified; propagation guarantees the root
            // sees a copy of every definition under its qualified name.
            let definition = self
                .scopes
                .entry(root, &import.source)
                .and_then(SymbolEntry::as_definition)
                .ok_or_else(|| CodegenError::UnresolvedImport(import.source.clone()))?;
            let defined_in = definition
                .defined_in
                .as_deref()
                .ok_or_else(|| CodegenError::UnresolvedImport(import.source.clone()))?;

            let exported = import
                .source
                .rsplit('.')
                .next()
                .unwrap_or(&import.source)
                .to_string();
            groups
                .entry(module_specifier(defined_in))
                .or_default()
                .push(ImportBinding {
                    exported,
                    local: local.to_string(),
                });
        }

        Ok(groups
            .into_iter()
            .map(|(specifier, bindings)| ImportGroup {
                specifier,
                bindings,
            })
            .collect())
    }
}

/// Import specifier for a symbol's defining module, relative to the output
/// directory. Bare package names pass through verbatim.
fn module_specifier(path: &str) -> String {
    match path.strip_suffix(".ts") {
        Some(stem) => format!("./{stem}"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_specifier() {
        assert_eq!(module_specifier("definitions.ts"), "./definitions");
        assert_eq!(module_specifier("tsgen-runtime"), "tsgen-runtime");
        assert_eq!(module_specifier("@acme/runtime"), "@acme/runtime");
    }
}
