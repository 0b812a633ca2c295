use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cinerag::catalog::{MovieFilter, YearRange};
use cinerag::config::AppConfig;
use cinerag::query::{MAX_YEAR, MIN_YEAR};
use cinerag::rag::ChatRequest;
use cinerag::service::MovieService;

/// Retrieval-augmented chat over a movie catalog.
#[derive(Parser, Debug)]
#[command(name = "cinerag")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a question and print the grounded answer
    Chat {
        /// The question to ask
        message: String,

        /// Print the full chat outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the catalog by attribute filters
    Search {
        /// Title substring, case-insensitive
        #[arg(long)]
        title: Option<String>,

        /// Genre that must be present; repeat for several
        #[arg(long)]
        genre: Vec<String>,

        /// Earliest release year
        #[arg(long)]
        year_from: Option<i32>,

        /// Latest release year
        #[arg(long)]
        year_to: Option<i32>,

        /// Minimum average rating on the 0-5 scale
        #[arg(long)]
        min_rating: Option<f32>,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank catalog entries by semantic similarity to a query
    Semantic {
        /// Free-text query
        query: String,

        /// Number of neighbors to return
        #[arg(short, long, default_value_t = 5)]
        k: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single movie by id
    Movie {
        /// Catalog id of the movie
        id: u32,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the ground-truth evaluation and write a report
    Eval {
        /// Report destination, overriding the configured path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe catalog, index, and generation backends
    Health {
        /// Print the probe results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cinerag::logging::init(&config.logging);

    let service = MovieService::seeded(config).context("Failed to build the movie service")?;

    match cli.command {
        Command::Chat { message, json } => {
            let outcome = service.chat(ChatRequest::new(message)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.response);
                if !outcome.degraded.is_empty() {
                    let modes: Vec<&str> = outcome.degraded.iter().map(|m| m.as_str()).collect();
                    eprintln!("[degraded: {}]", modes.join(", "));
                }
            }
        }

        Command::Search {
            title,
            genre,
            year_from,
            year_to,
            min_rating,
            limit,
            json,
        } => {
            let years = match (year_from, year_to) {
                (None, None) => None,
                (from, to) => Some(YearRange {
                    from: from.unwrap_or(MIN_YEAR),
                    to: to.unwrap_or(MAX_YEAR),
                }),
            };
            let filter = MovieFilter {
                title,
                genres: genre,
                years,
                min_rating,
            };
            let movies = service.search(&filter, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&movies)?);
            } else if movies.is_empty() {
                println!("No matches.");
            } else {
                for movie in &movies {
                    println!(
                        "{:>6}  {:.2}  {} ({})  [{}]",
                        movie.id,
                        movie.avg_rating,
                        movie.title,
                        movie.year,
                        movie.genres.join(", ")
                    );
                }
            }
        }

        Command::Semantic { query, k, json } => {
            let hits = service.semantic(&query, k).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No matches.");
            } else {
                for hit in &hits {
                    println!("{:.3}  {} ({})", hit.score, hit.record.title, hit.record.year);
                }
            }
        }

        Command::Movie { id, json } => match service.movie(id).await? {
            None => anyhow::bail!("No movie with id {id}"),
            Some(movie) if json => println!("{}", serde_json::to_string_pretty(&movie)?),
            Some(movie) => {
                println!("{} ({})", movie.title, movie.year);
                println!("  id:      {}", movie.id);
                println!("  genres:  {}", movie.genres.join(", "));
                println!("  rating:  {:.2}", movie.avg_rating);
                println!("  plot:    {}", movie.plot);
            }
        },

        Command::Eval { out, json } => {
            let path = out.unwrap_or_else(|| service.config().evaluation.report_path.clone());
            let report = service.evaluate().await?;
            report
                .save(&path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_summary());
                println!("Report written to {}", path.display());
            }
        }

        Command::Health { json } => {
            let status = service.health().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("attribute store:  {}", label(status.attribute_store));
                println!("embedding index:  {}", label(status.embedding_index));
                println!("generation:       {}", label(status.generation));
                println!("overall:          {}", label(status.healthy()));
            }
            if !status.healthy() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "unavailable"
    }
}
