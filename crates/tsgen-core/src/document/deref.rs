use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::node::{ArrayNode, CanonicalPath, DocNode, ObjectNode};
use super::pointer;
use crate::error::DerefError;

/// Eagerly replaces every `$ref` node in a document with the referenced
/// content and stamps every composite node with its canonical path.
///
/// A reference target already being expanded further up the call stack is
/// replaced by a stub object carrying only the `$ref` marker, stamped with
/// the target path, so a cyclic schema graph still produces a finite tree
/// and path-based identity keeps working across the cycle.
pub struct Dereferencer<'d> {
    root: &'d Value,
    in_progress: Vec<String>,
}

impl<'d> Dereferencer<'d> {
    /// Dereference a whole loaded document.
    pub fn dereference(document: &'d Value) -> Result<DocNode, DerefError> {
        let mut deref = Dereferencer {
            root: document,
            in_progress: Vec::new(),
        };
        deref.walk(document, CanonicalPath::root())
    }

    fn walk(&mut self, node: &Value, path: CanonicalPath) -> Result<DocNode, DerefError> {
        match node {
            Value::Null => Ok(DocNode::Null),
            Value::Bool(b) => Ok(DocNode::Bool(*b)),
            Value::Number(n) => Ok(DocNode::Number(n.clone())),
            Value::String(s) => Ok(DocNode::String(s.clone())),
            Value::Array(items) => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.walk(item, path.join(&i.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DocNode::Array(ArrayNode { path, items }))
            }
            Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
                Some(target) => self.follow_ref(target),
                None => {
                    let mut fields = IndexMap::new();
                    for (name, value) in map {
                        fields.insert(name.clone(), self.walk(value, path.join(name))?);
                    }
                    Ok(DocNode::Object(ObjectNode { path, fields }))
                }
            },
        }
    }

    fn follow_ref(&mut self, target: &str) -> Result<DocNode, DerefError> {
        let target_path = CanonicalPath::from_pointer(target);

        if self.in_progress.iter().any(|p| p == target_path.as_str()) {
            debug!("cycle at {target_path}, substituting stub");
            let mut fields = IndexMap::new();
            fields.insert("$ref".to_string(), DocNode::String(target.to_string()));
            return Ok(DocNode::Object(ObjectNode {
                path: target_path,
                fields,
            }));
        }

        let resolved = pointer::resolve(self.root, target)
            .ok_or_else(|| DerefError::TargetNotFound(target.to_string()))?;

        self.in_progress.push(target_path.as_str().to_string());
        let mut inner = self.walk(resolved, target_path)?;
        self.in_progress.pop();

        // Merge the reference marker back alongside the dereferenced content.
        if let DocNode::Object(obj) = &mut inner {
            obj.fields
                .insert("$ref".to_string(), DocNode::String(target.to_string()));
        }
        Ok(inner)
    }
}
