use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod repo;
mod settings;

use commands::annotate::AnnotateArgs;

#[derive(Parser)]
#[command(name = "secfeat", version, about = "Locate and annotate security features in a source tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clone (or open) a repository, annotate keyword matches and write the feature model
    Annotate(AnnotateArgs),
    /// Print the flattened keyword taxonomy
    Flatten {
        /// Keyword file (JSON/YAML) or directory of keyword files
        keywords: Option<String>,
    },
    /// Parse a feature-model file and print it normalized
    Model {
        /// Feature-model file
        file: String,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secfeat=info,secfeat_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Annotate(args) => commands::annotate::run(args),
        Command::Flatten { keywords } => commands::flatten::run(keywords),
        Command::Model { file } => commands::model::run(&file),
    }
}
