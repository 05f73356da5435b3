use apichain::chain::Chain;
use apichain::codec;
use apichain::codec::loader::load_chain_from_path;
use apichain::runtime::engine::ChainRunner;
use apichain::runtime::transport::ReqwestTransport;
use apichain::store::{FileStore, SavedChains};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a chain document end-to-end and print the result trace
    Run {
        /// Path to the chain document (JSON, or YAML for hand authoring)
        file: PathBuf,
    },

    /// Append an imported chain's steps after an existing chain's
    Merge {
        /// Chain document to keep first
        file: PathBuf,

        /// Chain document whose steps are appended
        import: PathBuf,

        /// Where to write the merged document (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Store a chain under a name
    Save {
        /// Chain document to store
        file: PathBuf,

        /// Name to store the chain under
        #[arg(long)]
        name: String,

        /// Store file
        #[arg(long, default_value = "chains.json")]
        store: PathBuf,
    },

    /// Retrieve a named chain as a portable document
    Load {
        /// Name of the saved chain
        #[arg(long)]
        name: String,

        /// Store file
        #[arg(long, default_value = "chains.json")]
        store: PathBuf,

        /// Where to write the document (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List saved chain names
    List {
        /// Store file
        #[arg(long, default_value = "chains.json")]
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => {
            let chain = load_chain_from_path(&file)?;
            info!("loaded chain with {} steps", chain.len());

            let runner = ChainRunner::new(Arc::new(ReqwestTransport::new()));
            let report = runner.execute(&chain).await;

            println!("{}", serde_json::to_string_pretty(&report.trace)?);
            if let Some(message) = report.first_error {
                error!("{message}");
                std::process::exit(1);
            }
        }

        Commands::Merge { file, import, output } => {
            let existing = load_chain_from_path(&file)?;
            let imported = load_chain_from_path(&import)?;
            let merged = codec::merge(&existing, &imported);
            info!(
                "merged {} + {} steps into {}",
                existing.len(),
                imported.len(),
                merged.len()
            );
            write_document(&merged, output.as_deref())?;
        }

        Commands::Save { file, name, store } => {
            let chain = load_chain_from_path(&file)?;
            let store = FileStore::new(store);
            SavedChains::new(&store).save(&name, &chain)?;
            info!("saved chain '{}' ({} steps)", name, chain.len());
        }

        Commands::Load { name, store, output, force } => {
            let store = FileStore::new(store);
            let chain = SavedChains::new(&store).load(&name)?;
            if let Some(path) = &output {
                // Loading replaces whatever the target holds; make the
                // destructive case explicit.
                if path.exists() && !force {
                    bail!("{} already exists, pass --force to replace it", path.display());
                }
            }
            write_document(&chain, output.as_deref())?;
        }

        Commands::List { store } => {
            let store = FileStore::new(store);
            for name in SavedChains::new(&store).names()? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn write_document(chain: &Chain, output: Option<&Path>) -> Result<()> {
    let text = codec::encode(chain);
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}
