//! Resolution of one API operation into a language-neutral descriptor.

use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase};
use log::debug;

use crate::document::DocNode;
use crate::error::CodegenError;
use crate::ir::{
    BodyDescriptor, HttpMethod, OperationDescriptor, ParamDescriptor, ParamLocation,
    ResponseTranslation,
};
use crate::scope::Definition;

use super::types::{shape, SchemaShape};
use super::Codegen;

impl<'d> Codegen<'d> {
    /// Resolve one path+method pair and append the descriptor to the
    /// owning API group's operation list.
    pub(crate) fn resolve_operation(
        &mut self,
        method: HttpMethod,
        path: &str,
        op: &DocNode,
    ) -> Result<(), CodegenError> {
        let class = self.operation_class(op);
        let module = self.ensure_api_module(&class)?;
        let name = operation_name(method, path, op);
        debug!("resolving {} {} as {class}.{name}", method.as_str(), path);

        let mut args = ArgNames::new();
        let mut params = Vec::new();
        if let Some(list) = op.get("parameters").and_then(DocNode::as_array) {
            for parameter in &list.items {
                let Some(param_name) = parameter.str_field("name") else {
                    continue;
                };
                let type_expr =
                    self.resolve_type(&module, parameter.get("schema"), Some(param_name))?;
                let location =
                    ParamLocation::from_field(parameter.str_field("in").unwrap_or("query"));
                params.push(ParamDescriptor {
                    name: param_name.to_string(),
                    arg_name: args.claim(&param_name.to_lower_camel_case()),
                    location,
                    type_expr,
                    required: location == ParamLocation::Path
                        || parameter.get("required").and_then(DocNode::as_bool).unwrap_or(false),
                    description: parameter.str_field("description").map(String::from),
                });
            }
        }

        let body = self.resolve_body(&module, &name, op, &mut args)?;
        let (return_expr, translations) = self.resolve_responses(&module, &name, op)?;
        let path_expr = render_path_expr(path, &params)?;

        let descriptor = OperationDescriptor {
            name,
            method,
            path: path.to_string(),
            path_expr,
            params,
            body,
            return_expr,
            translations,
            description: op
                .str_field("description")
                .or_else(|| op.str_field("summary"))
                .map(String::from),
        };
        self.modules[&module].operations.push(descriptor);
        Ok(())
    }

    fn resolve_body(
        &mut self,
        module: &str,
        name: &str,
        op: &DocNode,
        args: &mut ArgNames,
    ) -> Result<Option<BodyDescriptor>, CodegenError> {
        let Some(request_body) = op.get("requestBody") else {
            return Ok(None);
        };
        let Some((content_type, media)) = json_content(request_body.get("content")) else {
            return Ok(None);
        };
        let type_name = format!("{}Request", name.to_pascal_case());
        let type_expr = self.resolve_type(module, media.get("schema"), Some(&type_name))?;
        Ok(Some(BodyDescriptor {
            arg_name: args.claim("body"),
            type_expr,
            required: request_body
                .get("required")
                .and_then(DocNode::as_bool)
                .unwrap_or(false),
            content_type: content_type.to_string(),
        }))
    }

    /// Resolve every declared status/content-type pair into translation
    /// records and a deduplicated return-type union.
    fn resolve_responses(
        &mut self,
        module: &str,
        name: &str,
        op: &DocNode,
    ) -> Result<(String, Vec<ResponseTranslation>), CodegenError> {
        let mut returns: Vec<String> = Vec::new();
        let mut translations = Vec::new();

        if let Some(responses) = op.get("responses").and_then(DocNode::as_object) {
            for (status, response) in &responses.fields {
                let Some(content) = response.get("content").and_then(DocNode::as_object) else {
                    continue;
                };
                for (content_type, media) in &content.fields {
                    if !content_type.contains("json") {
                        continue;
                    }

                    let mut schema = media.get("schema");
                    if let Some(directive) = media.str_field("x-codegen-unwrap") {
                        let base = schema.ok_or_else(|| CodegenError::SchemaPath {
                            directive: directive.to_string(),
                            at: format!("{status} {content_type}"),
                        })?;
                        schema = Some(follow_schema_path(base, directive)?);
                        translations.push(ResponseTranslation {
                            status: status.clone(),
                            content_type: content_type.clone(),
                            property: directive.to_string(),
                        });
                    } else if let Some((property, node)) = single_property(schema) {
                        // A single-property wrapper object is unwrapped
                        // implicitly.
                        translations.push(ResponseTranslation {
                            status: status.clone(),
                            content_type: content_type.clone(),
                            property: property.to_string(),
                        });
                        schema = Some(node);
                    }

                    let type_name = format!(
                        "{}{}{}Response",
                        name.to_pascal_case(),
                        status_label(status),
                        content_label(content_type),
                    );
                    let expr = self.resolve_type(module, schema, Some(&type_name))?;
                    if !returns.contains(&expr) {
                        returns.push(expr);
                    }
                }
            }
        }

        let return_expr = if returns.is_empty() {
            "void".to_string()
        } else {
            returns.join(" | ")
        };
        Ok((return_expr, translations))
    }

    /// The owning API group: the first declared tag whose definition
    /// carries a generator-class annotation, else the configured default.
    fn operation_class(&self, op: &DocNode) -> String {
        if let Some(tags) = op.get("tags").and_then(DocNode::as_array) {
            for tag in &tags.items {
                if let Some(class) = tag.as_str().and_then(|t| self.classes.get(t)) {
                    return class.clone();
                }
            }
        }
        self.config.default_class.clone()
    }

    /// Create the module for an API group on first use: its scope, its
    /// public class symbol, and the client base import.
    fn ensure_api_module(&mut self, class: &str) -> Result<String, CodegenError> {
        let key = class.to_lower_camel_case();
        if !self.modules.contains_key(&key) {
            let file_path = format!("{key}.ts");
            let root = self.scopes.root();
            let scope = self.scopes.scope(root, &key, &file_path);
            self.scopes.define(
                scope,
                class,
                Definition::new(Some(file_path.clone()), None, true),
            )?;
            let base_name = self.config.client.class_name.clone();
            let base_class = self.scopes.import(scope, &base_name, None)?;
            self.modules.insert(
                key.clone(),
                super::ModuleState {
                    scope,
                    file_path,
                    class_name: Some(class.to_string()),
                    base_class: Some(base_class),
                    typedefs: Vec::new(),
                    operations: Vec::new(),
                },
            );
        }
        Ok(key)
    }
}

/// Stable operation name: explicit identifier, explicit override, else
/// derived from the path template and method.
fn operation_name(method: HttpMethod, path: &str, op: &DocNode) -> String {
    if let Some(id) = op.str_field("operationId") {
        return id.to_string();
    }
    if let Some(name) = op.str_field("x-codegen-name") {
        return name.to_string();
    }
    let mut concatenated = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let bare = segment.trim_start_matches('{').trim_end_matches('}');
        concatenated.push_str(&bare.to_pascal_case());
    }
    concatenated.push_str(&method.as_str().to_pascal_case());
    concatenated.to_lower_camel_case()
}

/// Follow a dotted sub-path into a response schema, descending through
/// `properties` for objects and `items` for arrays. Any other schema kind
/// mid-path is fatal.
fn follow_schema_path<'a>(
    schema: &'a DocNode,
    directive: &str,
) -> Result<&'a DocNode, CodegenError> {
    let error = |at: &DocNode| CodegenError::SchemaPath {
        directive: directive.to_string(),
        at: at
            .path()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "<schema>".to_string()),
    };

    let mut current = schema;
    for segment in directive.split('.') {
        loop {
            match shape(current) {
                SchemaShape::Array(items) => {
                    current = items.ok_or_else(|| error(current))?;
                }
                SchemaShape::Object => {
                    current = current
                        .get("properties")
                        .and_then(|p| p.get(segment))
                        .ok_or_else(|| error(current))?;
                    break;
                }
                _ => return Err(error(current)),
            }
        }
    }
    Ok(current)
}

/// The implicit unwrap case: an object schema with exactly one property.
fn single_property(schema: Option<&DocNode>) -> Option<(&str, &DocNode)> {
    let node = schema?;
    if !matches!(shape(node), SchemaShape::Object) {
        return None;
    }
    let properties = node.get("properties")?.as_object()?;
    if properties.fields.len() != 1 {
        return None;
    }
    properties
        .fields
        .iter()
        .next()
        .map(|(name, value)| (name.as_str(), value))
}

/// First JSON media type declared under a `content` map.
fn json_content(content: Option<&DocNode>) -> Option<(&str, &DocNode)> {
    content?
        .as_object()?
        .fields
        .iter()
        .find(|(content_type, _)| content_type.contains("json"))
        .map(|(content_type, media)| (content_type.as_str(), media))
}

/// `200` → `200`, `default` → `Default`.
fn status_label(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Label distinguishing non-default JSON media types in response type
/// names.
fn content_label(content_type: &str) -> String {
    if content_type == "application/json" {
        String::new()
    } else {
        content_type.to_pascal_case()
    }
}

/// Substitute every `{param}` placeholder with the parameter's generated
/// argument identifier, as a template-literal body.
fn render_path_expr(path: &str, params: &[ParamDescriptor]) -> Result<String, CodegenError> {
    let mut out = String::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push('{');
            rest = after;
            continue;
        };
        let placeholder = &after[..end];
        let param = params
            .iter()
            .find(|p| p.name == placeholder)
            .ok_or_else(|| CodegenError::UnknownPathParameter {
                path: path.to_string(),
                name: placeholder.to_string(),
            })?;
        out.push_str("${");
        out.push_str(&param.arg_name);
        out.push('}');
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Allocator for locally-unique argument identifiers. `response` is
/// reserved for the generated response-handling variable.
struct ArgNames {
    used: HashSet<String>,
}

impl ArgNames {
    fn new() -> Self {
        ArgNames {
            used: HashSet::from(["response".to_string()]),
        }
    }

    fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "arg" } else { base };
        let mut candidate = base.to_string();
        let mut suffix = 2;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        candidate
    }
}
