use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use tsgen_client::TypeScriptGenerator;
use tsgen_core::codegen;
use tsgen_core::config::{self, TsgenConfig, CONFIG_FILE_NAME};
use tsgen_core::document::{self, Dereferencer};
use tsgen_core::ir::CodegenUnit;
use tsgen_core::{CodeGenerator, GeneratedFile};

#[derive(Parser)]
#[command(name = "tsgen", about = "Typed API client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a typed client from an API description
    Generate {
        /// Path to the description file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Inspect the resolved codegen unit of an API description
    Inspect {
        /// Path to the description file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new tsgen configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input } => cmd_generate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "tsgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<TsgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Load, dereference, and resolve a description document.
fn load_unit(path: &Path, cfg: &TsgenConfig) -> Result<CodegenUnit> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");
    let raw = match ext {
        "json" => document::from_json(&content)?,
        _ => document::from_yaml(&content)?,
    };

    let doc = Dereferencer::dereference(&raw)?;
    let unit = codegen::run(&doc, cfg)?;
    Ok(unit)
}

fn cmd_generate(input: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));

    let unit = load_unit(&input, &cfg)?;
    let files = TypeScriptGenerator.generate(&unit)?;
    write_files(Path::new(&cfg.output), &files)?;

    eprintln!("generated {} files in {}", files.len(), cfg.output);
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let unit = load_unit(&input, &cfg)?;

    let rendered = match format {
        InspectFormat::Yaml => serde_yaml_ng::to_string(&unit)?,
        InspectFormat::Json => serde_json::to_string_pretty(&unit)?,
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::write(&path, config::default_config_content())
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_files_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            GeneratedFile {
                path: "definitions.ts".to_string(),
                content: "export interface Widget {}\n".to_string(),
            },
            GeneratedFile {
                path: "nested/index.ts".to_string(),
                content: "export {};\n".to_string(),
            },
        ];

        write_files(dir.path(), &files).unwrap();

        let written = fs::read_to_string(dir.path().join("definitions.ts")).unwrap();
        assert!(written.contains("Widget"));
        assert!(dir.path().join("nested/index.ts").exists());
    }
}
