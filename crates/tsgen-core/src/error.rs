use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document root must be an object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum DerefError {
    #[error("reference target not found: {0}")]
    TargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("symbol `{name}` is already defined in scope `{scope}`")]
    Redefined { scope: String, name: String },

    #[error("import name `{name}` is already taken in scope `{scope}`")]
    ImportTaken { scope: String, name: String },
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("scope error: {0}")]
    Scope(#[from] ScopeError),

    #[error("dereference error: {0}")]
    Deref(#[from] DerefError),

    #[error("cannot descend into schema at `{at}` while following `{directive}`")]
    SchemaPath { directive: String, at: String },

    #[error("path template `{path}` references undeclared parameter `{name}`")]
    UnknownPathParameter { path: String, name: String },

    #[error("imported symbol `{0}` does not resolve to a definition")]
    UnresolvedImport(String),
}
