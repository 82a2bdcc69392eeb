//! easy-crud CLI: one-shot setup helpers for host applications.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use easy_crud::install::{patch_controller_source, InstallOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "easy-crud")]
#[command(version)]
#[command(about = "Setup helpers for easy-crud", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the base controller to import and implement EasyCrud
    Install {
        /// Controller source file
        #[arg(long, default_value = "src/controllers/mod.rs")]
        path: PathBuf,
        /// Controller type receiving the impl
        #[arg(long, default_value = "Controller")]
        controller: String,
        /// Field holding the easy_crud::Crud service
        #[arg(long, default_value = "crud")]
        crud_field: String,
        /// Print the patched source instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("easy_crud=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Install {
            path,
            controller,
            crud_field,
            dry_run,
        } => install(path, InstallOptions { controller, crud_field }, dry_run)?,
    }
    Ok(())
}

fn install(path: PathBuf, options: InstallOptions, dry_run: bool) -> Result<()> {
    tracing::info!("installing easy-crud into {}", path.display());
    let source = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let patched = patch_controller_source(&source, &options);

    if !patched.changed() {
        tracing::info!("{} already uses EasyCrud, nothing to do", path.display());
        return Ok(());
    }
    if dry_run {
        println!("{}", patched.content);
        return Ok(());
    }
    std::fs::write(&path, &patched.content).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        import_added = patched.import_added,
        impl_added = patched.impl_added,
        "installation completed successfully"
    );
    Ok(())
}
