// calnote: date-keyed notes browsed by day, week or month.

pub mod date;
pub mod locale;
pub mod prefs;
pub mod storage;
pub mod store;
pub mod view;

pub use date::{DateError, DateKey, Direction, Granularity};
pub use locale::{format_date, Language, Locale};
pub use prefs::Preferences;
pub use store::{NoteEntry, NoteStore};
pub use view::{PageCell, ViewController};
