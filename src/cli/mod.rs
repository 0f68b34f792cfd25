//! CLI subcommands — config, emit, init, absolutize.

use crate::core::error::EmitError;
use crate::core::types::CompiledTree;
use crate::core::writer::Naming;
use crate::core::{config, pairs, writer};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the global config (generating the default on first use) and print it
    Config {
        /// User config file (default: <homedir>/wic/global_config.json)
        #[arg(long)]
        config_file: Option<PathBuf>,

        /// Home directory (default: the current user's home)
        #[arg(long)]
        homedir: Option<PathBuf>,
    },

    /// Write a compiled workflow tree to disk
    Emit {
        /// Serialized compiled workflow tree (YAML)
        #[arg(short, long)]
        tree: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "autogenerated")]
        out: PathBuf,

        /// Put every file in one directory, prefixed with its namespace
        #[arg(long)]
        flat: bool,

        /// Extra inputs merged into every node's inputs file
        #[arg(long)]
        inputs_file: Option<PathBuf>,
    },

    /// Install the bundled search-path files into <homedir>/wic
    Init {
        /// Home directory (default: the current user's home)
        #[arg(long)]
        homedir: Option<PathBuf>,
    },

    /// Rewrite a *_dirs.txt file with absolute paths
    Absolutize {
        /// Path to the pair file
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), EmitError> {
    match cmd {
        Commands::Config {
            config_file,
            homedir,
        } => cmd_config(config_file.as_deref(), &resolve_homedir(homedir)?),
        Commands::Emit {
            tree,
            out,
            flat,
            inputs_file,
        } => cmd_emit(&tree, &out, flat, inputs_file.as_deref()),
        Commands::Init { homedir } => cmd_init(&resolve_homedir(homedir)?),
        Commands::Absolutize { file } => cmd_absolutize(&file),
    }
}

fn resolve_homedir(homedir: Option<PathBuf>) -> Result<PathBuf, EmitError> {
    match homedir.or_else(dirs::home_dir) {
        Some(h) => Ok(h),
        None => Err(EmitError::io("~")(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "cannot determine home directory; pass --homedir",
        ))),
    }
}

fn cmd_config(config_file: Option<&Path>, homedir: &Path) -> Result<(), EmitError> {
    let default = config::default_config_path(homedir);
    let requested = config_file.unwrap_or(&default);
    let global = config::get_config(requested, &default)?;
    let json = serde_json::to_string_pretty(&global).map_err(EmitError::json(requested))?;
    println!("{}", json);
    Ok(())
}

/// Load a serialized compiled workflow tree.
fn load_tree(path: &Path) -> Result<CompiledTree, EmitError> {
    let content = std::fs::read_to_string(path).map_err(EmitError::io(path))?;
    serde_yaml_ng::from_str(&content).map_err(EmitError::yaml(path))
}

fn cmd_emit(tree: &Path, out: &Path, flat: bool, inputs_file: Option<&Path>) -> Result<(), EmitError> {
    let tree = load_tree(tree)?;
    let naming = if flat { Naming::Flat } else { Naming::Nested };
    let written = writer::write_to_disk_with_inputs_file(&tree, out, naming, inputs_file)?;

    println!(
        "Wrote {} file(s) for {} workflow(s) to {}",
        written.len(),
        tree.len(),
        out.display()
    );
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn cmd_init(homedir: &Path) -> Result<(), EmitError> {
    let created = pairs::install_default_files(homedir)?;
    for path in &created {
        println!("Writing {}", path.display());
    }
    if !created.is_empty() {
        println!("Please check these files and make sure that the paths in them are correct.");
    }
    Ok(())
}

fn cmd_absolutize(file: &Path) -> Result<(), EmitError> {
    pairs::write_absolute_dirs_file(file)?;
    println!("Updated {}", file.display());
    Ok(())
}
