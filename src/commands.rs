use crate::ui;
use anyhow::{bail, Context, Result};
use calnote::storage::{
    init_project_store, load_notes, load_preferences, locate_store, save_notes,
    save_preferences, StoreLocation,
};
use calnote::{
    format_date, DateKey, Granularity, Language, NoteStore, PageCell, Preferences, ViewController,
};
use std::env;
use std::fs;
use std::path::Path;

pub fn init() -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_store(&cwd)?;
    println!("Initialized note store at {}", location.dir.display());
    Ok(())
}

pub fn show(view: Option<Granularity>, date: Option<String>) -> Result<()> {
    let location = current_location()?;
    let store = load_notes(&location)?;
    let prefs = load_preferences(&location)?;
    let focus = match date {
        Some(raw) => parse_date(&raw)?,
        None => DateKey::today(),
    };
    let granularity = view.unwrap_or_else(|| prefs.granularity());
    let locale = prefs.language().locale();
    let controller = ViewController::new(granularity, focus);
    println!(
        "{} ({}, {} view)",
        locale.window_title,
        location.scope.label(),
        granularity.label()
    );
    for cell in controller.page_cells(&store, locale, DateKey::today()) {
        print_cell(&cell);
    }
    Ok(())
}

pub fn set(date: String, text: String) -> Result<()> {
    let date = parse_date(&date)?;
    let location = current_location()?;
    let mut store = load_notes(&location)?;
    store.set_text(date, normalize_newlines(&text));
    persist(&location, &mut store)?;
    println!("Saved note for {}", date);
    Ok(())
}

pub fn clear(date: String) -> Result<()> {
    let date = parse_date(&date)?;
    let location = current_location()?;
    let mut store = load_notes(&location)?;
    if store.get_text(date).is_empty() {
        println!("No note for {}", date);
        return Ok(());
    }
    store.set_text(date, "");
    persist(&location, &mut store)?;
    println!("Cleared note for {}", date);
    Ok(())
}

pub fn list(from: Option<String>, to: Option<String>) -> Result<()> {
    let from = from.as_deref().map(parse_date).transpose()?;
    let to = to.as_deref().map(parse_date).transpose()?;
    let location = current_location()?;
    let store = load_notes(&location)?;
    let locale = load_preferences(&location)?.language().locale();
    let notes = store.notes_between(from, to);
    if notes.is_empty() {
        println!("(no notes)");
    }
    for entry in notes {
        println!("{}", format_date(entry.date, locale));
        for line in entry.text.lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}

pub fn language(choice: Option<String>) -> Result<()> {
    let location = current_location()?;
    let mut prefs = load_preferences(&location)?;
    let Some(query) = choice else {
        for lang in Language::ALL {
            let marker = if lang == prefs.language() { "*" } else { " " };
            println!("{} {} {}", marker, lang.index(), lang.locale().name);
        }
        return Ok(());
    };
    let Some(lang) = Language::find(&query) else {
        bail!("unknown language: {}", query);
    };
    prefs.set_language(lang);
    save_preferences(&location, &prefs)?;
    println!("Language set to {}", lang.locale().name);
    Ok(())
}

pub fn tui() -> Result<()> {
    let location = current_location()?;
    if env::var_os("RUST_LOG").is_some() {
        log_to_file(&location.log_path())?;
    }
    let store = load_notes(&location)?;
    let prefs = load_preferences(&location)?;
    ui::run(store, prefs, location)
}

/// Compacts and writes the store.
pub fn persist(location: &StoreLocation, store: &mut NoteStore) -> Result<()> {
    store.compact();
    save_notes(location, store)
}

/// Saves everything a session owns.
pub fn shutdown(
    location: &StoreLocation,
    store: &mut NoteStore,
    prefs: &Preferences,
) -> Result<()> {
    persist(location, store)?;
    save_preferences(location, prefs)
}

/// Note text is stored with `\n` line endings only.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn current_location() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    locate_store(&cwd)
}

fn log_to_file(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {:?}", path))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")
}

fn parse_date(raw: &str) -> Result<DateKey> {
    raw.parse::<DateKey>()
        .with_context(|| format!("parsing date {:?}", raw))
}

fn print_cell(cell: &PageCell) {
    let marker = match (cell.is_today, cell.is_focus) {
        (true, _) => "*",
        (false, true) => ">",
        (false, false) => " ",
    };
    println!("{} {}", marker, cell.label);
    for line in cell.text.lines() {
        println!("    {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_windows_line_endings() {
        assert_eq!(normalize_newlines("a\r\nb\r\n"), "a\nb\n");
        assert_eq!(normalize_newlines("a\nb"), "a\nb");
    }

    #[test]
    fn tui_log_file_is_created_in_the_store() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("store").join("calnote.log");
        log_to_file(&path).unwrap();
        log::warn!("written to the log file");
        assert!(path.exists());
    }

    #[test]
    fn parse_date_reports_input() {
        let err = parse_date("2024-13-01").unwrap_err();
        assert!(format!("{:#}", err).contains("2024-13-01"));
        assert_eq!(parse_date("2024-03-15").unwrap(), DateKey::new(2024, 3, 15).unwrap());
    }
}
