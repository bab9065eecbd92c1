//! Scope tree and symbol tables for generated modules.
//!
//! One root scope exists per generation run, with one child scope per
//! output module. Defining a symbol in a module propagates renamed copies
//! up the tree (`Widget` in scope `definitions` is visible in the parent as
//! `definitions.Widget`), so any scope can resolve a qualified name without
//! a global registry. Scopes are never removed or merged.

use indexmap::IndexMap;
use log::trace;

use crate::document::CanonicalPath;
use crate::error::ScopeError;

/// Separator used both in propagated local names and in global names.
pub const SEPARATOR: char = '.';

/// Index of a scope within a [`ScopeTree`].
pub type ScopeId = usize;

/// A named definition or import recorded in a scope. The local name is the
/// symbol-table key.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolEntry {
    Definition(Definition),
    Import(Import),
}

impl SymbolEntry {
    pub fn as_definition(&self) -> Option<&Definition> {
        match self {
            SymbolEntry::Definition(def) => Some(def),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// File path of the module that owns the definition.
    pub defined_in: Option<String>,
    /// Canonical path of the schema that produced the symbol; absent for
    /// non-schema symbols such as the client base class.
    pub spec_path: Option<CanonicalPath>,
    pub public: bool,
    /// Dotted path from the module down to the symbol. Present iff `public`,
    /// and only on the defining entry, never on propagated copies.
    pub global_name: Option<String>,
}

impl Definition {
    pub fn new(defined_in: Option<String>, spec_path: Option<CanonicalPath>, public: bool) -> Self {
        Definition {
            defined_in,
            spec_path,
            public,
            global_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Fully-qualified name of the imported symbol.
    pub source: String,
}

#[derive(Debug)]
struct ScopeData {
    name: String,
    file_path: Option<String>,
    parent: Option<ScopeId>,
    symbols: IndexMap<String, SymbolEntry>,
}

/// Arena of scope records addressed by [`ScopeId`]. The root is created
/// once per generation run and passed explicitly to everything that needs
/// lookup.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    /// Create a tree holding only the synthetic root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![ScopeData {
                name: String::new(),
                file_path: None,
                parent: None,
                symbols: IndexMap::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    /// Create a child scope and return its id.
    pub fn scope(&mut self, parent: ScopeId, name: &str, file_path: &str) -> ScopeId {
        self.scopes.push(ScopeData {
            name: name.to_string(),
            file_path: Some(file_path.to_string()),
            parent: Some(parent),
            symbols: IndexMap::new(),
        });
        self.scopes.len() - 1
    }

    pub fn name(&self, id: ScopeId) -> &str {
        &self.scopes[id].name
    }

    pub fn file_path(&self, id: ScopeId) -> Option<&str> {
        self.scopes[id].file_path.as_deref()
    }

    /// Local symbol table, in insertion order.
    pub fn symbols(&self, id: ScopeId) -> impl Iterator<Item = (&str, &SymbolEntry)> {
        self.scopes[id]
            .symbols
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Local-only existence check, no parent delegation.
    pub fn exists(&self, id: ScopeId, name: &str) -> bool {
        self.scopes[id].symbols.contains_key(name)
    }

    /// Exact local short-name lookup, delegating to the parent on a miss.
    pub fn entry(&self, id: ScopeId, name: &str) -> Option<&SymbolEntry> {
        let mut current = Some(id);
        while let Some(scope) = current {
            if let Some(entry) = self.scopes[scope].symbols.get(name) {
                return Some(entry);
            }
            current = self.scopes[scope].parent;
        }
        None
    }

    /// Search the local table in table order, then each ancestor in turn.
    /// The nearest match always wins over a match in an outer scope.
    pub fn find<P>(&self, id: ScopeId, predicate: P) -> Option<(ScopeId, &str, &SymbolEntry)>
    where
        P: Fn(&str, &SymbolEntry) -> bool,
    {
        let mut current = Some(id);
        while let Some(scope) = current {
            for (name, entry) in &self.scopes[scope].symbols {
                if predicate(name, entry) {
                    return Some((scope, name.as_str(), entry));
                }
            }
            current = self.scopes[scope].parent;
        }
        None
    }

    /// The fully-qualified dotted name `name` would have if defined in this
    /// scope. The root's own name never participates.
    pub fn global_name(&self, id: ScopeId, name: &str) -> String {
        let mut parts = vec![name.to_string()];
        let mut current = id;
        while let Some(parent) = self.scopes[current].parent {
            parts.push(self.scopes[current].name.clone());
            current = parent;
        }
        parts.reverse();
        parts.join(&SEPARATOR.to_string())
    }

    /// Record a definition under `name` in the local scope and propagate a
    /// copy into every ancestor, rewriting the local name at each step by
    /// prefixing the child scope's own name.
    ///
    /// Fails if the exact local name is already taken in this scope.
    pub fn define(
        &mut self,
        id: ScopeId,
        name: &str,
        mut definition: Definition,
    ) -> Result<(), ScopeError> {
        if self.exists(id, name) {
            return Err(ScopeError::Redefined {
                scope: self.scopes[id].name.clone(),
                name: name.to_string(),
            });
        }

        if definition.public {
            definition.global_name = Some(self.global_name(id, name));
        }
        trace!(
            "define {} in scope `{}`",
            definition.global_name.as_deref().unwrap_or(name),
            self.scopes[id].name
        );

        let propagated = Definition {
            global_name: None,
            ..definition.clone()
        };
        self.scopes[id]
            .symbols
            .insert(name.to_string(), SymbolEntry::Definition(definition));

        let mut qualified = name.to_string();
        let mut current = id;
        while let Some(parent) = self.scopes[current].parent {
            qualified = format!("{}{}{}", self.scopes[current].name, SEPARATOR, qualified);
            self.scopes[parent]
                .symbols
                .insert(qualified.clone(), SymbolEntry::Definition(propagated.clone()));
            current = parent;
        }
        Ok(())
    }

    /// Import `source` (a fully-qualified symbol name) into this scope and
    /// return the local name it is known by.
    ///
    /// Idempotent: an existing import of the same source, or a definition
    /// already carrying the source's terminal name, is returned unchanged.
    /// Without an explicit local name, the terminal dot-segment is used,
    /// suffixed `_2`, `_3`, … until locally free. An explicit local name
    /// that is already taken fails.
    pub fn import(
        &mut self,
        id: ScopeId,
        source: &str,
        local: Option<&str>,
    ) -> Result<String, ScopeError> {
        let short = source.rsplit(SEPARATOR).next().unwrap_or(source);

        for (name, entry) in &self.scopes[id].symbols {
            match entry {
                SymbolEntry::Import(import) if import.source == source => {
                    return Ok(name.clone());
                }
                SymbolEntry::Definition(_) if name == short => {
                    return Ok(name.clone());
                }
                _ => {}
            }
        }

        let chosen = match local {
            Some(requested) => {
                if self.exists(id, requested) {
                    return Err(ScopeError::ImportTaken {
                        scope: self.scopes[id].name.clone(),
                        name: requested.to_string(),
                    });
                }
                requested.to_string()
            }
            None => {
                let mut candidate = short.to_string();
                let mut suffix = 2;
                while self.exists(id, &candidate) {
                    candidate = format!("{short}_{suffix}");
                    suffix += 1;
                }
                candidate
            }
        };

        self.scopes[id].symbols.insert(
            chosen.clone(),
            SymbolEntry::Import(Import {
                source: source.to_string(),
            }),
        );
        Ok(chosen)
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> Definition {
        Definition::new(Some("definitions.ts".to_string()), None, false)
    }

    #[test]
    fn define_propagates_qualified_copies() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let bar = tree.scope(root, "bar", "bar.ts");

        tree.define(bar, "Foo", definition()).unwrap();

        assert!(tree.exists(bar, "Foo"));
        assert!(tree.exists(root, "bar.Foo"));
        assert!(!tree.exists(root, "Foo"));
    }

    #[test]
    fn define_propagates_through_intermediate_scopes() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let a = tree.scope(root, "a", "a.ts");
        let b = tree.scope(a, "b", "b.ts");

        tree.define(b, "Foo", definition()).unwrap();

        assert!(tree.exists(a, "b.Foo"));
        assert!(tree.exists(root, "a.b.Foo"));
    }

    #[test]
    fn redefining_a_name_fails() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let apis = tree.scope(root, "apis", "apis.ts");

        tree.define(apis, "Foo", definition()).unwrap();
        let err = tree.define(apis, "Foo", definition()).unwrap_err();
        assert!(matches!(err, ScopeError::Redefined { .. }));
    }

    #[test]
    fn public_definitions_get_a_global_name() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let apis = tree.scope(root, "apis", "apis.ts");

        let def = Definition::new(Some("apis.ts".to_string()), None, true);
        tree.define(apis, "WidgetsApi", def).unwrap();

        let entry = tree.entry(apis, "WidgetsApi").unwrap();
        let def = entry.as_definition().unwrap();
        assert_eq!(def.global_name.as_deref(), Some("apis.WidgetsApi"));

        // Propagated copies never carry the global name.
        let copy = tree.entry(root, "apis.WidgetsApi").unwrap();
        assert_eq!(copy.as_definition().unwrap().global_name, None);
    }

    #[test]
    fn global_name_excludes_the_root() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let a = tree.scope(root, "a", "a.ts");
        let b = tree.scope(a, "b", "b.ts");

        assert_eq!(tree.global_name(b, "Foo"), "a.b.Foo");
        assert_eq!(tree.global_name(root, "Foo"), "Foo");
    }

    #[test]
    fn import_is_idempotent() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let apis = tree.scope(root, "apis", "apis.ts");

        let first = tree.import(apis, "definitions.Widget", None).unwrap();
        let count = tree.symbols(apis).count();
        let second = tree.import(apis, "definitions.Widget", None).unwrap();

        assert_eq!(first, "Widget");
        assert_eq!(second, first);
        assert_eq!(tree.symbols(apis).count(), count);
    }

    #[test]
    fn colliding_imports_get_numbered_names() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let apis = tree.scope(root, "apis", "apis.ts");

        let a = tree.import(apis, "definitions.Foo", None).unwrap();
        let b = tree.import(apis, "other.Foo", None).unwrap();
        assert_eq!(a, "Foo");
        assert_eq!(b, "Foo_2");

        // Re-importing either source returns the already-assigned name.
        assert_eq!(tree.import(apis, "definitions.Foo", None).unwrap(), "Foo");
        assert_eq!(tree.import(apis, "other.Foo", None).unwrap(), "Foo_2");
    }

    #[test]
    fn importing_a_locally_defined_symbol_is_a_no_op() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let defs = tree.scope(root, "definitions", "definitions.ts");

        tree.define(defs, "Widget", definition()).unwrap();
        let local = tree.import(defs, "definitions.Widget", None).unwrap();

        assert_eq!(local, "Widget");
        assert_eq!(tree.symbols(defs).count(), 1);
    }

    #[test]
    fn explicit_import_name_conflicts_fail() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let apis = tree.scope(root, "apis", "apis.ts");

        tree.import(apis, "definitions.Foo", None).unwrap();
        let err = tree.import(apis, "other.Bar", Some("Foo")).unwrap_err();
        assert!(matches!(err, ScopeError::ImportTaken { .. }));
    }

    #[test]
    fn find_prefers_the_nearest_match() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let defs = tree.scope(root, "definitions", "definitions.ts");
        let apis = tree.scope(root, "apis", "apis.ts");

        let path = CanonicalPath::from_pointer("#/components/schemas/Widget");
        let mut shared = definition();
        shared.spec_path = Some(path.clone());

        tree.define(defs, "Widget", shared.clone()).unwrap();
        tree.define(apis, "Widget", shared).unwrap();

        let matches_path = |_: &str, entry: &SymbolEntry| {
            entry
                .as_definition()
                .is_some_and(|d| d.spec_path.as_ref() == Some(&path))
        };

        // From `apis`, the local definition wins over the copy propagated
        // from `definitions` into the root.
        let (scope, name, _) = tree.find(apis, matches_path).unwrap();
        assert_eq!(scope, apis);
        assert_eq!(name, "Widget");

        // From the root, only propagated copies are visible.
        let (scope, name, _) = tree.find(root, matches_path).unwrap();
        assert_eq!(scope, root);
        assert_eq!(name, "definitions.Widget");
    }

    #[test]
    fn entry_delegates_to_ancestors() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let defs = tree.scope(root, "definitions", "definitions.ts");
        let apis = tree.scope(root, "apis", "apis.ts");

        tree.define(defs, "Widget", definition()).unwrap();

        // A sibling reaches the definition through the root's copy.
        assert!(tree.entry(apis, "definitions.Widget").is_some());
        assert!(tree.entry(apis, "Widget").is_none());
        assert!(!tree.exists(apis, "definitions.Widget"));
    }
}
