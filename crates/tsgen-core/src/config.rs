use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level project configuration loaded from `.tsgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TsgenConfig {
    pub input: String,
    pub output: String,
    pub client: ClientConfig,
    /// API group used for operations whose tags carry no generator-class
    /// annotation.
    pub default_class: String,
}

impl Default for TsgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "src/generated".to_string(),
            client: ClientConfig::default(),
            default_class: "DefaultApi".to_string(),
        }
    }
}

/// Where the runtime HTTP client lives and what the base class is called.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Import specifier of the runtime module; a bare package name or a
    /// relative path.
    pub module: String,
    pub class_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            module: "tsgen-runtime".to_string(),
            class_name: "ApiClient".to_string(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".tsgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<TsgenConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: TsgenConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# tsgen configuration
input: openapi.yaml
output: src/generated

client:
  module: tsgen-runtime   # import specifier of the runtime HTTP client
  class_name: ApiClient   # base class generated API classes extend

default_class: DefaultApi # group for operations without a class annotation
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TsgenConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "src/generated");
        assert_eq!(config.client.module, "tsgen-runtime");
        assert_eq!(config.client.class_name, "ApiClient");
        assert_eq!(config.default_class, "DefaultApi");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: out
client:
  module: ./client
  class_name: BaseClient
default_class: Api
"#;
        let config: TsgenConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.output, "out");
        assert_eq!(config.client.module, "./client");
        assert_eq!(config.client.class_name, "BaseClient");
        assert_eq!(config.default_class, "Api");
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: TsgenConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        // Defaults applied
        assert_eq!(config.output, "src/generated");
        assert_eq!(config.client.class_name, "ApiClient");
    }

    #[test]
    fn test_default_content_parses() {
        let config: TsgenConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.default_class, "DefaultApi");
    }
}
