//! Autocom CLI - score, rank and try out fuzzy prefix completion

use autocom::completion::{detect_prefix, score, Autocom, Ranker};
use autocom::config::CompleterConfig;
use autocom::query_editor::QueryEditor;
use autocom::vocabulary::Vocabulary;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "autocom")]
#[command(about = "Fuzzy prefix autocompletion", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/autocom/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the alignment score of a prefix against a candidate
    Score {
        /// Typed prefix
        prefix: String,

        /// Candidate to align against
        candidate: String,
    },

    /// Rank the vocabulary against a prefix
    Rank {
        /// Typed prefix
        prefix: String,

        /// Word list file (one candidate per line) replacing the configured vocabulary
        #[arg(long)]
        vocab: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the word autocompletion would replace
    Detect {
        /// Buffer text
        text: String,

        /// Caret byte offset (default: end of text)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Open the interactive query input
    Edit,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = CompleterConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Score { prefix, candidate } => {
            let value = score(&prefix, &candidate, &config.matching);
            println!("{:.6}", value);
        }

        Commands::Rank {
            prefix,
            vocab,
            json,
        } => {
            let vocabulary = match vocab {
                Some(path) => Vocabulary::load_word_list(&path)?,
                None => config.vocabulary(),
            };
            let ranker = Ranker::new(config.matching);
            let threshold = config.matching.threshold_score;
            let limit = config.matching.max_suggestions.unwrap_or(usize::MAX);

            let ranked: Vec<_> = ranker
                .score_all(&prefix, &vocabulary)
                .into_iter()
                .take_while(|c| c.score >= threshold)
                .take(limit)
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if ranked.is_empty() {
                println!("No suggestions for {:?}", prefix);
            } else {
                for (rank, c) in ranked.iter().enumerate() {
                    println!("{:>3}. {:<32} {:>10.6}", rank + 1, c.candidate, c.score);
                }
            }
        }

        Commands::Detect { text, cursor } => {
            let cursor = cursor.unwrap_or(text.len());
            let patterns = config.word_patterns()?;
            match detect_prefix(&text, cursor, cursor, &patterns) {
                Some(found) => println!("{}", serde_json::to_string(&found)?),
                None => println!("No prefix at {}", cursor),
            }
        }

        Commands::Edit => {
            let autocom = Autocom::from_config(&config)?;
            let mut editor = QueryEditor::new(autocom);
            editor.run()?;
        }
    }

    Ok(())
}
