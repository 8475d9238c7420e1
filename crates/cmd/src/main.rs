// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands::{
    describe_command, exists_command, list_command, load_command, save_command, versions_command,
};
use cmd::common::{CatalogContext, TableFormat};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "h5bucket")]
struct Cli {
    /// Catalog YAML naming the datasets
    #[arg(short, long, global = true, env = "H5BUCKET_CATALOG", default_value = "catalog.yml")]
    catalog: PathBuf,

    /// Credentials YAML referred to by name from the catalog
    #[arg(long, global = true, env = "H5BUCKET_CREDENTIALS")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the datasets in the catalog
    List,
    /// Save a CSV file (with a header row) into a dataset
    Save {
        /// Dataset name in the catalog
        dataset: String,
        /// CSV file to read
        input: PathBuf,
        /// Save under this version instead of a generated one
        #[arg(long)]
        save_version: Option<String>,
    },
    /// Print a dataset
    Load {
        dataset: String,
        /// Load this version instead of the latest
        #[arg(long)]
        load_version: Option<String>,
        #[arg(short, long, value_enum, default_value_t = TableFormat::Table)]
        format: TableFormat,
    },
    /// Report whether a dataset can be loaded; exits 1 when it cannot
    Exists {
        dataset: String,
        #[arg(long)]
        load_version: Option<String>,
    },
    /// Print a dataset's descriptor as JSON
    Describe { dataset: String },
    /// List stored versions of a versioned dataset
    Versions { dataset: String },
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    print!("{output}");
    _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = CatalogContext::new(cli.catalog, cli.credentials);

    match cli.command {
        Commands::List => list_command(&ctx, print_output),
        Commands::Save {
            dataset,
            input,
            save_version,
        } => save_command(&ctx, &dataset, &input, save_version, print_output).await,
        Commands::Load {
            dataset,
            load_version,
            format,
        } => load_command(&ctx, &dataset, load_version, format, print_output).await,
        Commands::Exists {
            dataset,
            load_version,
        } => {
            if !exists_command(&ctx, &dataset, load_version, print_output).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Describe { dataset } => describe_command(&ctx, &dataset, print_output),
        Commands::Versions { dataset } => versions_command(&ctx, &dataset, print_output).await,
    }
}
