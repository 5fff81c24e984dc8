use calnote::Granularity;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "calnote", version, about = "Notes for calendar days, by day, week or month")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project note store in the current directory
    Init,
    /// Print the page containing a date
    Show {
        /// Page granularity (defaults to the last used view)
        #[arg(long, value_enum)]
        view: Option<ViewArg>,
        /// Date in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Set the note for a date
    Set {
        /// Date in YYYY-MM-DD format
        date: String,
        /// Note text
        text: String,
    },
    /// Remove the note for a date
    Clear {
        /// Date in YYYY-MM-DD format
        date: String,
    },
    /// List stored notes in date order
    List {
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show the available languages or pick one by index or name
    Language {
        /// Language index or name
        language: Option<String>,
    },
    /// Launch the interactive TUI
    Tui,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewArg {
    Day,
    Week,
    Month,
}

impl From<ViewArg> for Granularity {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Day => Granularity::Day,
            ViewArg::Week => Granularity::Week,
            ViewArg::Month => Granularity::Month,
        }
    }
}
