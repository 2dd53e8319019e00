use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use taxon::config::Config;
use taxon::input::{load_documents, load_embeddings};
use taxon::llm::openai::OpenAiOracle;
use taxon::output::terminal;
use taxon::pipeline::{Pipeline, PipelineConfig};
use taxon::sampling::{self, SamplingParams, Strategy};

/// Taxon: sample representative documents from an embedding space and
/// build a taxonomy of them with an LLM.
#[derive(Parser)]
#[command(name = "taxon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter pipeline configuration
    InitConfig {
        /// Where to write the configuration
        #[arg(default_value = "taxon.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Sample document indices from an embeddings file
    Sample {
        /// JSON array of embedding rows
        #[arg(long)]
        embeddings: PathBuf,

        /// JSON array of documents, for previews (optional)
        #[arg(long)]
        documents: Option<PathBuf>,

        /// nearest, furthest, random or random_in_cluster
        #[arg(long, default_value = "nearest")]
        strategy: String,

        /// Points per cluster (total points for `random`)
        #[arg(short, default_value = "5")]
        k: usize,

        /// Number of k-means clusters (ignored by `random`)
        #[arg(long, default_value = "1")]
        n_clusters: usize,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Print the indices as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline: sampling, taxonomy, resume and context
    Run {
        /// Pipeline configuration file (see `taxon init-config`)
        #[arg(long, default_value = "taxon.json")]
        config: PathBuf,

        /// JSON array of embedding rows
        #[arg(long)]
        embeddings: PathBuf,

        /// JSON array of documents, aligned with the embeddings
        #[arg(long)]
        documents: PathBuf,

        /// Print the run as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taxon=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Pass --force to overwrite it.",
                    path.display()
                );
            }
            PipelineConfig::default().save(&path)?;
            println!("Pipeline configuration written to: {}", path.display());
            println!("\nEdit the stage methods and options, then run:");
            println!("  taxon run --config {} --embeddings <file> --documents <file>", path.display());
        }

        Commands::Sample {
            embeddings,
            documents,
            strategy,
            k,
            n_clusters,
            seed,
            json,
        } => {
            // Parse the tag before touching any file
            let strategy: Strategy = strategy.parse()?;
            let matrix = load_embeddings(&embeddings)?;
            let docs = documents.as_deref().map(load_documents).transpose()?;

            let mut params = SamplingParams::new(k, n_clusters, strategy);
            params.random_state = seed;

            let samples = sampling::sample(matrix.view(), &params)
                .with_context(|| format!("Failed to sample with strategy {strategy}"))?;
            info!(strategy = %strategy, count = samples.len(), "Sampled");

            if json {
                println!("{}", serde_json::to_string(&samples)?);
            } else {
                terminal::display_samples(&samples, docs.as_deref());
            }
        }

        Commands::Run {
            config: config_path,
            embeddings,
            documents,
            json,
        } => {
            let config = Config::load()?;
            config.require_llm()?;

            let pipeline_config = PipelineConfig::load(&config_path)?;
            let matrix = load_embeddings(&embeddings)?;
            let docs = load_documents(&documents)?;
            let oracle = OpenAiOracle::from_config(&config)?;

            info!(
                documents = docs.len(),
                model = %config.llm_model,
                strategy = %pipeline_config.sampling.method,
                "Starting pipeline run"
            );
            if !json {
                println!(
                    "Running pipeline over {} documents with {}...",
                    docs.len(),
                    config.llm_model
                );
            }

            let pipeline = Pipeline::new(pipeline_config);
            match pipeline.run(matrix.view(), &docs, &oracle) {
                Ok(run) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&run)?);
                    } else {
                        terminal::display_run(&run);
                        println!("\n{}", "Pipeline complete.".bold());
                    }
                }
                Err(failure) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&failure.partial)?);
                    } else {
                        terminal::display_failure(&failure);
                    }
                    return Err(failure.into());
                }
            }
        }
    }

    Ok(())
}
