//! Resolved, language-neutral output of the codegen driver: typedefs,
//! operation descriptors, and per-module import/export lists, ready for a
//! template-based emitter.

use serde::Serialize;

/// An entity the type resolver decided deserves a name. Created once per
/// distinct canonical schema path per scope, appended to its module's list,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Typedef {
    Object(ObjectTypedef),
    Array(ArrayTypedef),
    Enum(EnumTypedef),
    Union(UnionTypedef),
}

impl Typedef {
    pub fn name(&self) -> &str {
        match self {
            Typedef::Object(t) => &t.name,
            Typedef::Array(t) => &t.name,
            Typedef::Enum(t) => &t.name,
            Typedef::Union(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTypedef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub type_expr: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayTypedef {
    pub name: String,
    pub description: Option<String>,
    pub item_expr: String,
}

/// Literal variants are stored pre-rendered: strings quoted and escaped,
/// numbers as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumTypedef {
    pub name: String,
    pub description: Option<String>,
    pub literals: Vec<String>,
}

/// Members of a merge-of-schemas construct, joined by the emitter with the
/// intersection operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionTypedef {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Match a path-item field name against a known method.
    pub fn from_field(field: &str) -> Option<Self> {
        Some(match field {
            "get" => HttpMethod::Get,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "delete" => HttpMethod::Delete,
            "patch" => HttpMethod::Patch,
            "options" => HttpMethod::Options,
            "head" => HttpMethod::Head,
            "trace" => HttpMethod::Trace,
            _ => return None,
        })
    }
}

/// Where a parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn from_field(field: &str) -> Self {
        match field {
            "path" => ParamLocation::Path,
            "header" => ParamLocation::Header,
            "cookie" => ParamLocation::Cookie,
            _ => ParamLocation::Query,
        }
    }
}

/// One declared parameter, with the argument identifier it was assigned in
/// the generated signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub arg_name: String,
    pub location: ParamLocation,
    pub type_expr: String,
    pub required: bool,
    pub description: Option<String>,
}

/// The JSON request body, if the operation declares one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyDescriptor {
    pub arg_name: String,
    pub type_expr: String,
    pub required: bool,
    pub content_type: String,
}

/// How one response body is unwrapped before being handed back to the
/// caller: either an explicit directive sub-path or an implicit
/// single-property wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTranslation {
    pub status: String,
    pub content_type: String,
    pub property: String,
}

/// The resolved, language-neutral description of one path+method pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub method: HttpMethod,
    /// Original path template.
    pub path: String,
    /// Template-literal body with every `{param}` placeholder substituted
    /// by the parameter's argument identifier.
    pub path_expr: String,
    pub params: Vec<ParamDescriptor>,
    pub body: Option<BodyDescriptor>,
    pub return_expr: String,
    pub translations: Vec<ResponseTranslation>,
    pub description: Option<String>,
}

/// One `import { A, B as C } from "specifier"` group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportGroup {
    pub specifier: String,
    pub bindings: Vec<ImportBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportBinding {
    pub exported: String,
    pub local: String,
}

/// One `export { A, B } from "specifier"` group in the index module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportGroup {
    pub specifier: String,
    pub names: Vec<String>,
}

/// Everything the emitter needs for one output module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleUnit {
    pub name: String,
    pub file_path: String,
    /// Present for API group modules; the definitions module has none.
    pub class_name: Option<String>,
    /// Local name the client base class is known by in this module.
    pub base_class: Option<String>,
    pub imports: Vec<ImportGroup>,
    pub typedefs: Vec<Typedef>,
    pub operations: Vec<OperationDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexUnit {
    pub file_path: String,
    pub exports: Vec<ExportGroup>,
}

/// The complete result of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct CodegenUnit {
    pub modules: Vec<ModuleUnit>,
    pub index: IndexUnit,
}
