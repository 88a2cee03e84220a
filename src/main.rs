//! `topicdiff` command-line front end.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use topicdiff::{
    compare_texts_with, compare_with_portal_using, flatten_blocks, normalize_pdf_text,
    normalize_text, parse_programme, segment_document, topic_portal_url, try_extract, Aligner,
    EdfFilter, HttpFetcher, RowFilter, TopicDiffConfig,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a text file and print the result
    Normalize {
        /// Apply the PDF repairs (split words, hyphen wraps, ligatures)
        #[arg(long)]
        pdf: bool,
        /// Keep one output line per input line (with --pdf)
        #[arg(long)]
        preserve_newlines: bool,
        file: PathBuf,
    },

    /// Segment a text file into blocks
    Segment {
        file: PathBuf,
        /// Print plain text instead of JSON
        #[arg(long)]
        flat: bool,
    },

    /// Align a document-derived description against a portal description
    Diff { source: PathBuf, other: PathBuf },

    /// Extract a topic description from the funding portal
    Portal {
        /// Topic page URL, or a bare topic id
        url: String,
        /// Align this document-derived description against the page
        #[arg(long)]
        against: Option<PathBuf>,
    },

    /// Parse a Horizon Europe or EDF work programme
    Programme {
        file: PathBuf,
        /// Keep only these call types (repeatable, e.g. RIA)
        #[arg(long = "call-type")]
        call_types: Vec<String>,
        /// Minimum budget in EUR million
        #[arg(long)]
        min_budget: Option<f64>,
        /// Opening on or before this period (2026, 2026-Q2, 2026-05, 2026-05-15)
        #[arg(long, default_value = "")]
        opening: String,
        /// Deadline on or before this period
        #[arg(long, default_value = "")]
        deadline: String,
        /// EDF call family prefix (RA, DA, CSA)
        #[arg(long, default_value = "")]
        family: String,
        /// EDF topic budget lower bound in EUR million
        #[arg(long)]
        budget_min: Option<f64>,
        /// EDF topic budget upper bound in EUR million
        #[arg(long)]
        budget_max: Option<f64>,
        /// EDF STEP flag
        #[arg(long)]
        step: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => TopicDiffConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TopicDiffConfig::default(),
    };

    match cli.command {
        Command::Normalize {
            pdf,
            preserve_newlines,
            file,
        } => {
            let text = read(&file)?;
            let output = if pdf {
                let mut pdf_config = config.normalize.clone();
                pdf_config.preserve_newlines |= preserve_newlines;
                normalize_pdf_text(&text, &pdf_config)
            } else {
                normalize_text(&text)
            };
            println!("{output}");
        }
        Command::Segment { file, flat } => {
            let blocks = segment_document(&read(&file)?);
            if flat {
                println!("{}", flatten_blocks(&blocks));
            } else {
                print_json(&blocks)?;
            }
        }
        Command::Diff { source, other } => {
            let aligner = Aligner::new(config.align.clone())?;
            let result = compare_texts_with(&aligner, &read(&source)?, &read(&other)?);
            info!(score = result.score, pairs = result.pairs.len(), "diff_complete");
            print_json(&result)?;
        }
        Command::Portal { url, against } => {
            let url = resolve_portal_url(&url)?;
            let fetcher = HttpFetcher::new(&config.portal)?;
            match against {
                Some(path) => {
                    let aligner = Aligner::new(config.align.clone())?;
                    let document = read(&path)?;
                    let Some(comparison) =
                        compare_with_portal_using(&aligner, &document, &url, &fetcher, &config.portal)
                            .await
                    else {
                        bail!("no topic description found at {url}");
                    };
                    print_json(&comparison)?;
                }
                None => match try_extract(&url, &fetcher, &config.portal).await? {
                    Some(topic) => print_json(&topic)?,
                    None => bail!("no topic description found at {url}"),
                },
            }
        }
        Command::Programme {
            file,
            call_types,
            min_budget,
            opening,
            deadline,
            family,
            budget_min,
            budget_max,
            step,
        } => {
            let rows = RowFilter {
                call_types,
                min_budget_eur_m: min_budget,
                opening,
                deadline,
            };
            let edf = EdfFilter {
                call_family: family,
                budget_min_eur_m: budget_min,
                budget_max_eur_m: budget_max,
                step,
            };
            let mut document = parse_programme(&read(&file)?);
            if !rows.is_empty() || !edf.is_empty() {
                document = document.filter(&rows, &edf);
            }
            info!(family = ?document.family(), records = document.len(), "programme_complete");
            print_json(&document)?;
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve_portal_url(input: &str) -> anyhow::Result<String> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(input.to_string());
    }
    topic_portal_url(input).with_context(|| format!("not a URL or topic id: {input:?}"))
}
