mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    // The terminal UI owns the screen and logs to a file instead.
    if !matches!(command, cli::Command::Tui) {
        env_logger::init();
    }
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Show { view, date } => commands::show(view.map(Into::into), date),
        cli::Command::Set { date, text } => commands::set(date, text),
        cli::Command::Clear { date } => commands::clear(date),
        cli::Command::List { from, to } => commands::list(from, to),
        cli::Command::Language { language } => commands::language(language),
        cli::Command::Tui => commands::tui(),
    }
}
