use crate::date::DateKey;

/// Languages the calendar can be displayed in. The discriminant order is the
/// persisted preference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    EnglishUs,
    EnglishGb,
    German,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    MonthDayYear,
    DayMonthYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLayout {
    pub order: FieldOrder,
    pub separator: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLabels {
    pub today: &'static str,
    pub days: &'static str,
    pub weeks: &'static str,
    pub months: &'static str,
    pub language: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub name: &'static str,
    pub window_title: &'static str,
    pub menu: MenuLabels,
    /// Shown before the ISO week number on Mondays.
    pub week_label: &'static str,
    /// Indexed Sunday first.
    pub short_days: [&'static str; 7],
    pub layout: DateLayout,
}

const ENGLISH_MENU: MenuLabels = MenuLabels {
    today: "Today",
    days: "Days",
    weeks: "Weeks",
    months: "Months",
    language: "Language",
};

const ENGLISH_DAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

static ENGLISH_US: Locale = Locale {
    name: "English US",
    window_title: "Calendar",
    menu: ENGLISH_MENU,
    week_label: "CW",
    short_days: ENGLISH_DAYS,
    layout: DateLayout {
        order: FieldOrder::MonthDayYear,
        separator: '/',
    },
};

static ENGLISH_GB: Locale = Locale {
    name: "English GB",
    window_title: "Calendar",
    menu: ENGLISH_MENU,
    week_label: "CW",
    short_days: ENGLISH_DAYS,
    layout: DateLayout {
        order: FieldOrder::DayMonthYear,
        separator: '/',
    },
};

static GERMAN: Locale = Locale {
    name: "Deutsch",
    window_title: "Kalender",
    menu: MenuLabels {
        today: "Heute",
        days: "Tage",
        weeks: "Wochen",
        months: "Monate",
        language: "Sprache",
    },
    week_label: "KW",
    short_days: ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
    layout: DateLayout {
        order: FieldOrder::DayMonthYear,
        separator: '.',
    },
};

impl Language {
    pub const ALL: [Language; 3] = [Language::EnglishUs, Language::EnglishGb, Language::German];

    pub fn index(self) -> i64 {
        match self {
            Language::EnglishUs => 0,
            Language::EnglishGb => 1,
            Language::German => 2,
        }
    }

    /// Out-of-range indices fall back to the primary language.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .unwrap_or_default()
    }

    /// Looks a language up by index or by (case-insensitive) display name.
    pub fn find(query: &str) -> Option<Self> {
        let query = query.trim();
        if let Ok(idx) = query.parse::<usize>() {
            return Self::ALL.get(idx).copied();
        }
        Self::ALL
            .into_iter()
            .find(|lang| lang.locale().name.eq_ignore_ascii_case(query))
    }

    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % Self::ALL.len() as i64)
    }

    pub fn locale(self) -> &'static Locale {
        match self {
            Language::EnglishUs => &ENGLISH_US,
            Language::EnglishGb => &ENGLISH_GB,
            Language::German => &GERMAN,
        }
    }
}

/// Renders the label of `date`, e.g. `CW 11  Mo 03/11/2024` or
/// `Fr 15.03.2024`. Only Mondays carry the week prefix.
pub fn format_date(date: DateKey, locale: &Locale) -> String {
    let week = if date.is_monday() {
        format!("{} {}  ", locale.week_label, date.iso_week_number())
    } else {
        String::new()
    };
    let short_day = locale.short_days[date.weekday_from_sunday() as usize];
    let sep = locale.layout.separator;
    let (first, second) = match locale.layout.order {
        FieldOrder::MonthDayYear => (date.month(), date.day()),
        FieldOrder::DayMonthYear => (date.day(), date.month()),
    };
    format!(
        "{week}{short_day} {first:02}{sep}{second:02}{sep}{year:04}",
        year = date.year()
    )
}
