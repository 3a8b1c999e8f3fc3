//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dars", version, about = "Spaced repetition for Persian vocabulary")]
pub struct Cli {
    /// Progress database (`.json` for a JSON document, anything else for SQLite).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add cards for new items from a JSON catalog.
    Seed {
        /// JSON array of items.
        catalog: PathBuf,
    },
    /// List cards due now.
    Due {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Record a review.
    Review {
        /// Item id or its Persian text.
        item: String,
        /// again, hard, good, easy, correct, wrong, or a number 0-5.
        grade: String,
    },
    /// Star an item so it is shown first when due.
    Pin { item: String },
    /// Remove the star from an item.
    Unpin { item: String },
    /// Show due and total counts.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show when the next card becomes due.
    Next,
    /// Mark today's study session as completed.
    Finish,
    /// Show the current streak.
    Streak,
    /// Show the review history of an item.
    History { item: String },
}
