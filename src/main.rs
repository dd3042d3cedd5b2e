//! Loam Compiler CLI
//!
//! Thin driver around the library pipeline: loads source files, runs the
//! compiler, and writes the textual IR.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::fs;

use loam::lexer::is_loam_source_file;

/// Loam Programming Language Compiler
#[derive(ClapParser, Debug)]
#[command(name = "loam")]
#[command(about = "Loam language compiler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile Loam sources to textual IR
    Build {
        /// Source file or directory to compile
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output file path (single-file builds only)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check Loam sources for errors without emitting IR
    Check {
        /// Source file or directory to check
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            path,
            output,
            verbose,
        } => build_command(path, output, verbose).await,
        Commands::Check { path, verbose } => check_command(path, verbose).await,
    }
}

/// Build command implementation.
async fn build_command(path: PathBuf, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let files = discover_source_files(&path)?;

    if files.is_empty() {
        anyhow::bail!("No Loam source files found in {}", path.display());
    }

    if output.is_some() && files.len() > 1 {
        anyhow::bail!("--output only applies when building a single file");
    }

    if verbose {
        println!("Found {} source file(s)", files.len());
    }

    for file in &files {
        if verbose {
            println!("Compiling: {}", file.display());
        }

        let out_path = output.clone().unwrap_or_else(|| file.with_extension("ir"));
        compile_file(file, &out_path)
            .await
            .context(format!("Failed to compile {}", file.display()))?;

        if verbose {
            println!("Wrote: {}", out_path.display());
        }
    }

    println!("Build complete.");
    Ok(())
}

/// Check command implementation.
async fn check_command(path: PathBuf, verbose: bool) -> Result<()> {
    let files = discover_source_files(&path)?;

    if files.is_empty() {
        anyhow::bail!("No Loam source files found in {}", path.display());
    }

    let mut errors = Vec::new();

    for file in &files {
        if verbose {
            println!("Checking: {}", file.display());
        }

        if let Err(e) = check_file(file).await {
            errors.push((file.clone(), e));
        }
    }

    if errors.is_empty() {
        println!("All checks passed!");
        Ok(())
    } else {
        eprintln!("Found {} error(s):", errors.len());
        for (file, error) in errors {
            eprintln!("  {}: {:#}", file.display(), error);
        }
        anyhow::bail!("Check failed");
    }
}

/// Compile a single source file and write its textual IR.
async fn compile_file(file: &Path, out_path: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .await
        .context("Failed to read source file")?;

    let module_name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");

    let module = loam::compile(&source, module_name)?;

    fs::write(out_path, module.to_string())
        .await
        .context("Failed to write IR file")?;

    Ok(())
}

/// Check a single source file without emitting IR.
async fn check_file(file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .await
        .context("Failed to read source file")?;

    loam::check(&source)?;

    Ok(())
}

/// Discover Loam source files in a file or directory path.
fn discover_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    use std::fs;

    let mut files = Vec::new();

    if path.is_file() {
        if is_loam_source_file(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();

            if entry_path.is_file() && is_loam_source_file(&entry_path) {
                files.push(entry_path);
            } else if entry_path.is_dir() {
                let sub_files = discover_source_files(&entry_path)?;
                files.extend(sub_files);
            }
        }
    }

    files.sort();
    Ok(files)
}
