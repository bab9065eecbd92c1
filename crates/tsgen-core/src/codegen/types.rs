//! Schema classification, type resolution, and typedef generation.

use log::debug;

use crate::document::DocNode;
use crate::error::CodegenError;
use crate::ir::{
    ArrayTypedef, EnumTypedef, FieldDef, ObjectTypedef, Typedef, UnionTypedef,
};
use crate::scope::Definition;

use super::Codegen;

/// Type expression used when a schema is missing or carries no usable
/// shape information.
pub(crate) const UNTYPED: &str = "unknown";

/// The closed set of schema shapes the resolver distinguishes, decided
/// once per node instead of duck-typed checks at every use site.
pub(crate) enum SchemaShape<'a> {
    /// `allOf`: logical AND over a list of sub-schemas.
    Merge(Vec<&'a DocNode>),
    Array(Option<&'a DocNode>),
    Object,
    Enum(&'a [DocNode]),
    Primitive(&'a str),
    Untyped,
}

pub(crate) fn shape(node: &DocNode) -> SchemaShape<'_> {
    if let Some(all_of) = node.get("allOf").and_then(DocNode::as_array) {
        if !all_of.items.is_empty() {
            return SchemaShape::Merge(all_of.items.iter().collect());
        }
    }
    let type_tag = node.str_field("type");
    if type_tag == Some("array") {
        return SchemaShape::Array(node.get("items"));
    }
    if type_tag == Some("object") || node.get("properties").is_some() {
        return SchemaShape::Object;
    }
    if let Some(values) = node.get("enum").and_then(DocNode::as_array) {
        if !values.items.is_empty() {
            return SchemaShape::Enum(&values.items);
        }
    }
    match type_tag {
        Some(tag) => SchemaShape::Primitive(tag),
        None => SchemaShape::Untyped,
    }
}

impl<'d> Codegen<'d> {
    /// Resolve a schema node to a type expression, registering new
    /// typedefs and imports in `module`'s scope as a side effect.
    pub(crate) fn resolve_type(
        &mut self,
        module: &str,
        node: Option<&DocNode>,
        suggested: Option<&str>,
    ) -> Result<String, CodegenError> {
        let Some(node) = node else {
            return Ok(UNTYPED.to_string());
        };

        // A definition anywhere in the scope chain with this node's
        // canonical path is the same logical entity: import it instead of
        // regenerating.
        if let Some(path) = node.path() {
            let scope = self.modules[module].scope;
            let found = self.scopes.find(scope, |_, entry| {
                entry
                    .as_definition()
                    .is_some_and(|def| def.spec_path.as_ref() == Some(path))
            });
            if let Some((found_scope, found_name, _)) = found {
                let qualified = self.scopes.global_name(found_scope, found_name);
                let local = self.scopes.import(scope, &qualified, None)?;
                return Ok(local);
            }
        }

        match shape(node) {
            SchemaShape::Merge(members) => {
                let mut parts = Vec::new();
                for member in members {
                    parts.push(parenthesize(self.resolve_type(module, Some(member), None)?));
                }
                Ok(parts.join(" & "))
            }
            SchemaShape::Array(items) => {
                let item_name = suggested.map(|name| format!("{name}Item"));
                let item = self.resolve_type(module, items, item_name.as_deref())?;
                Ok(format!("{}[]", parenthesize(item)))
            }
            SchemaShape::Object => match suggested {
                Some(name) => {
                    self.generate_typedef(module, name, node)?;
                    Ok(name.to_string())
                }
                // Object types without a destination name are not worth
                // naming.
                None => Ok("Record<string, unknown>".to_string()),
            },
            SchemaShape::Enum(values) => Ok(values
                .iter()
                .map(literal)
                .collect::<Vec<_>>()
                .join(" | ")),
            SchemaShape::Primitive("integer") => Ok("number".to_string()),
            SchemaShape::Primitive(tag) => Ok(tag.to_string()),
            SchemaShape::Untyped => Ok(UNTYPED.to_string()),
        }
    }

    /// Register `name` in `module`'s scope tagged with the schema's
    /// canonical path, then emit its typedef body.
    pub(crate) fn generate_typedef(
        &mut self,
        module: &str,
        name: &str,
        node: &DocNode,
    ) -> Result<(), CodegenError> {
        self.register_typedef(module, name, node)?;
        self.typedef_body(module, name, node)
    }

    pub(crate) fn register_typedef(
        &mut self,
        module: &str,
        name: &str,
        node: &DocNode,
    ) -> Result<(), CodegenError> {
        let state = &self.modules[module];
        let definition = Definition::new(
            Some(state.file_path.clone()),
            node.path().cloned(),
            true,
        );
        self.scopes.define(state.scope, name, definition)?;
        Ok(())
    }

    /// Build and record the typedef body for an already-registered name.
    pub(crate) fn typedef_body(
        &mut self,
        module: &str,
        name: &str,
        node: &DocNode,
    ) -> Result<(), CodegenError> {
        let description = node.str_field("description").map(String::from);

        let typedef = match shape(node) {
            SchemaShape::Object => {
                let mut fields = Vec::new();
                if let Some(properties) = node.get("properties").and_then(DocNode::as_object) {
                    for (field_name, field_schema) in &properties.fields {
                        let type_expr = self.resolve_type(module, Some(field_schema), None)?;
                        fields.push(FieldDef {
                            name: field_name.clone(),
                            type_expr,
                            description: field_schema.str_field("description").map(String::from),
                        });
                    }
                }
                Typedef::Object(ObjectTypedef {
                    name: name.to_string(),
                    description,
                    fields,
                })
            }
            SchemaShape::Array(items) => {
                let item_expr =
                    self.resolve_type(module, items, Some(&format!("{name}Item")))?;
                Typedef::Array(ArrayTypedef {
                    name: name.to_string(),
                    description,
                    item_expr,
                })
            }
            SchemaShape::Enum(values) => Typedef::Enum(EnumTypedef {
                name: name.to_string(),
                description,
                literals: values.iter().map(literal).collect(),
            }),
            SchemaShape::Merge(members) => {
                let mut exprs = Vec::new();
                for (index, member) in members.into_iter().enumerate() {
                    let member_name = format!("{name}UnionMember{index}");
                    exprs.push(self.resolve_type(module, Some(member), Some(&member_name))?);
                }
                Typedef::Union(UnionTypedef {
                    name: name.to_string(),
                    description,
                    members: exprs,
                })
            }
            // Primitive aliases and shapeless schemas keep their registered
            // name for dedup but emit nothing.
            SchemaShape::Primitive(_) | SchemaShape::Untyped => {
                debug!("schema `{name}` has no emittable kind, registered without a body");
                return Ok(());
            }
        };

        self.modules[module].typedefs.push(typedef);
        Ok(())
    }
}

/// Render one enumeration literal: strings quoted and escaped, numbers and
/// booleans as-is.
fn literal(node: &DocNode) -> String {
    match node {
        DocNode::String(s) => serde_json::Value::String(s.clone()).to_string(),
        DocNode::Number(n) => n.to_string(),
        DocNode::Bool(b) => b.to_string(),
        _ => "null".to_string(),
    }
}

/// Wrap composite expressions so they survive embedding in `[]` and `&`.
fn parenthesize(expr: String) -> String {
    if expr.contains(" | ") || expr.contains(" & ") {
        format!("({expr})")
    } else {
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Dereferencer;
    use serde_json::json;

    fn node(value: serde_json::Value) -> DocNode {
        Dereferencer::dereference(&value).unwrap()
    }

    #[test]
    fn shape_classification() {
        assert!(matches!(
            shape(&node(json!({ "allOf": [{ "type": "object" }] }))),
            SchemaShape::Merge(_)
        ));
        assert!(matches!(
            shape(&node(json!({ "type": "array", "items": { "type": "string" } }))),
            SchemaShape::Array(Some(_))
        ));
        assert!(matches!(
            shape(&node(json!({ "properties": { "a": { "type": "string" } } }))),
            SchemaShape::Object
        ));
        assert!(matches!(
            shape(&node(json!({ "type": "string", "enum": ["a"] }))),
            SchemaShape::Enum(_)
        ));
        assert!(matches!(
            shape(&node(json!({ "type": "integer" }))),
            SchemaShape::Primitive("integer")
        ));
        assert!(matches!(shape(&node(json!({}))), SchemaShape::Untyped));
    }

    #[test]
    fn literals_are_quoted_and_escaped() {
        assert_eq!(literal(&DocNode::String("on".into())), "\"on\"");
        assert_eq!(literal(&DocNode::String("a\"b".into())), "\"a\\\"b\"");
        assert_eq!(literal(&node(json!(3))), "3");
    }

    #[test]
    fn parenthesize_wraps_unions_only() {
        assert_eq!(parenthesize("string".into()), "string");
        assert_eq!(parenthesize("A | B".into()), "(A | B)");
        assert_eq!(parenthesize("A & B".into()), "(A & B)");
    }
}
