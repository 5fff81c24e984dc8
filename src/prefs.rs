use crate::date::Granularity;
use crate::locale::Language;
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// User preferences persisted between sessions.
///
/// `view` and `language` are stored as raw indices; read them through
/// [`Preferences::granularity`] and [`Preferences::language`], which clamp
/// anything out of range. The window fields belong to graphical hosts and
/// are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub maximized: bool,
    pub view: i64,
    pub language: i64,
    pub monitor_x: i32,
    pub monitor_y: i32,
}

impl Preferences {
    /// Parses persisted preferences, falling back to defaults on malformed
    /// input, and clamps the view and language indices.
    pub fn load(bytes: &[u8]) -> Self {
        let mut prefs: Preferences = match serde_yaml::from_slice(bytes) {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!("ignoring malformed preferences: {}", err);
                Preferences::default()
            }
        };
        prefs.normalize();
        prefs
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let text = serde_yaml::to_string(self).context("serializing preferences")?;
        Ok(text.into_bytes())
    }

    pub fn normalize(&mut self) {
        self.view = self.granularity().index();
        self.language = self.language().index();
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::from_index(self.view)
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.view = granularity.index();
    }

    pub fn language(&self) -> Language {
        Language::from_index(self.language)
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language.index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn out_of_range_values_are_clamped() {
        let prefs = Preferences::load(b"view: 7\nlanguage: 12\n");
        assert_eq!(prefs.view, 1);
        assert_eq!(prefs.granularity(), Granularity::Week);
        assert_eq!(prefs.language(), Language::EnglishUs);

        let prefs = Preferences::load(b"view: -2\nlanguage: -1\n");
        assert_eq!(prefs.granularity(), Granularity::Day);
        assert_eq!(prefs.language, 0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let prefs = Preferences::load(b"language: 2\nmaximized: true\n");
        assert_eq!(
            prefs,
            Preferences {
                maximized: true,
                view: 0,
                language: 2,
                monitor_x: 0,
                monitor_y: 0,
            }
        );
    }

    #[test]
    fn malformed_input_loads_defaults() {
        assert_eq!(Preferences::load(b"view: [oops"), Preferences::default());
    }

    #[test]
    fn window_fields_survive_a_round_trip() {
        let mut prefs = Preferences {
            maximized: true,
            monitor_x: -1920,
            monitor_y: 40,
            ..Preferences::default()
        };
        prefs.set_granularity(Granularity::Month);
        prefs.set_language(Language::German);
        let bytes = prefs.serialize().unwrap();
        assert_eq!(Preferences::load(&bytes), prefs);
    }
}
