use crate::prefs::Preferences;
use crate::store::NoteStore;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const PROJECT_DIR: &str = ".calnote";
const NOTES_FILE: &str = "notes.yml";
const PREFS_FILE: &str = "prefs.yml";
const LOG_FILE: &str = "calnote.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
}

impl StoreScope {
    pub fn label(self) -> &'static str {
        match self {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
        }
    }
}

/// Directory holding the notes and preference files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub dir: PathBuf,
    pub scope: StoreScope,
}

impl StoreLocation {
    pub fn new(dir: impl Into<PathBuf>, scope: StoreScope) -> Self {
        StoreLocation {
            dir: dir.into(),
            scope,
        }
    }

    pub fn notes_path(&self) -> PathBuf {
        self.dir.join(NOTES_FILE)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.dir.join(PREFS_FILE)
    }

    /// Where the terminal UI writes its log while it owns the screen.
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }
}

/// Creates `.calnote/` under `cwd` with an empty notes file, unless one is
/// already there.
pub fn init_project_store(cwd: &Path) -> Result<StoreLocation> {
    let location = StoreLocation::new(cwd.join(PROJECT_DIR), StoreScope::Project);
    fs::create_dir_all(&location.dir)
        .with_context(|| format!("creating {:?}", location.dir))?;
    if !location.notes_path().exists() {
        save_notes(&location, &NoteStore::new())?;
    }
    Ok(location)
}

/// Finds the nearest `.calnote/` at or above `start`, falling back to the
/// per-user data directory.
pub fn locate_store(start: &Path) -> Result<StoreLocation> {
    if let Some(dir) = find_project_store(start) {
        return Ok(StoreLocation::new(dir, StoreScope::Project));
    }
    Ok(StoreLocation::new(global_store_dir()?, StoreScope::Global))
}

/// Reads the notes file. A missing file is an empty store; unreadable
/// contents degrade to an empty store inside [`NoteStore::load`].
pub fn load_notes(location: &StoreLocation) -> Result<NoteStore> {
    match read_optional(&location.notes_path())? {
        Some(bytes) => Ok(NoteStore::load(&bytes)),
        None => Ok(NoteStore::new()),
    }
}

/// Writes the notes in their current order. Callers compact first.
pub fn save_notes(location: &StoreLocation, store: &NoteStore) -> Result<()> {
    write_file(&location.notes_path(), &store.serialize()?)?;
    info!("saved {} notes to {:?}", store.len(), location.notes_path());
    Ok(())
}

pub fn load_preferences(location: &StoreLocation) -> Result<Preferences> {
    match read_optional(&location.prefs_path())? {
        Some(bytes) => Ok(Preferences::load(&bytes)),
        None => Ok(Preferences::default()),
    }
}

pub fn save_preferences(location: &StoreLocation, prefs: &Preferences) -> Result<()> {
    write_file(&location.prefs_path(), &prefs.serialize()?)
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {:?}", path)),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    fs::write(path, bytes).with_context(|| format!("writing {:?}", path))
}

fn find_project_store(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR))
        .find(|candidate| candidate.is_dir())
}

fn global_store_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "calnote").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;

    #[test]
    fn init_then_locate_from_subdirectory() {
        let root = tempfile::tempdir().unwrap();
        let location = init_project_store(root.path()).unwrap();
        assert_eq!(location.scope, StoreScope::Project);
        assert!(location.notes_path().exists());

        let nested = root.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        let found = locate_store(&nested).unwrap();
        assert_eq!(found, location);
    }

    #[test]
    fn init_keeps_existing_notes() {
        let root = tempfile::tempdir().unwrap();
        let location = init_project_store(root.path()).unwrap();
        let mut store = NoteStore::new();
        store.set_text(DateKey::new(2024, 3, 15).unwrap(), "Dentist");
        save_notes(&location, &store).unwrap();

        init_project_store(root.path()).unwrap();
        assert_eq!(load_notes(&location).unwrap().len(), 1);
    }

    #[test]
    fn files_live_side_by_side() {
        let location = StoreLocation::new("/tmp/notes-here", StoreScope::Project);
        assert_eq!(location.notes_path(), Path::new("/tmp/notes-here/notes.yml"));
        assert_eq!(location.prefs_path(), Path::new("/tmp/notes-here/prefs.yml"));
        assert_eq!(location.log_path(), Path::new("/tmp/notes-here/calnote.log"));
    }

    #[test]
    fn missing_files_load_as_defaults() {
        let root = tempfile::tempdir().unwrap();
        let location = StoreLocation::new(root.path().join("nowhere"), StoreScope::Global);
        assert!(load_notes(&location).unwrap().is_empty());
        assert_eq!(load_preferences(&location).unwrap(), Preferences::default());
    }

    #[test]
    fn save_reports_io_failure() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();
        let location = StoreLocation::new(blocker.join("store"), StoreScope::Global);
        assert!(save_notes(&location, &NoteStore::new()).is_err());
    }
}
