use crate::date::{page_anchor, step_unit, DateKey, Direction, Granularity};
use crate::locale::{format_date, Locale};
use crate::store::NoteStore;
use log::debug;

/// One visible date, ready for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCell {
    pub date: DateKey,
    pub label: String,
    pub text: String,
    pub is_today: bool,
    pub is_focus: bool,
}

/// Tracks the granularity, the focus date and the page currently shown.
///
/// The page is realigned to the focus date by navigation operations only.
/// Moving focus between cells of the visible page leaves the page where it
/// is, so a month grid does not jump when the user selects one of the
/// leading days of the previous month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewController {
    granularity: Granularity,
    focus: DateKey,
    anchor: DateKey,
}

impl ViewController {
    pub fn new(granularity: Granularity, focus: DateKey) -> Self {
        ViewController {
            granularity,
            focus,
            anchor: page_anchor(granularity, focus),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn focus(&self) -> DateKey {
        self.focus
    }

    /// First date of the visible page.
    pub fn anchor(&self) -> DateKey {
        self.anchor
    }

    pub fn current_page(&self) -> Vec<DateKey> {
        (0..self.granularity.page_len() as i64)
            .map(|offset| self.anchor.add_days(offset))
            .collect()
    }

    pub fn contains(&self, date: DateKey) -> bool {
        let offset = self.anchor.days_until(date);
        offset >= 0 && offset < self.granularity.page_len() as i64
    }

    pub fn switch_to(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.realign();
    }

    pub fn next_granularity(&mut self) {
        self.switch_to(self.granularity.next());
    }

    pub fn previous_granularity(&mut self) {
        self.switch_to(self.granularity.previous());
    }

    /// Moves one page. In month view the distance depends on the month
    /// being left, so a forward step followed by a backward step does not
    /// always return to the same date.
    pub fn step(&mut self, direction: Direction) {
        let days = step_unit(self.granularity, self.focus, direction) * direction.sign();
        self.focus = self.focus.add_days(days);
        self.realign();
    }

    pub fn jump_to_today(&mut self) {
        self.jump_to(DateKey::today());
    }

    pub fn jump_to(&mut self, date: DateKey) {
        self.focus = date;
        self.realign();
    }

    /// Moves the focus by `days` and realigns the page around it.
    pub fn nudge(&mut self, days: i64) {
        self.focus = self.focus.add_days(days);
        self.realign();
    }

    /// Moves the focus one row of the month grid. Returns `false` outside
    /// month view, where rows are not shown.
    pub fn nudge_week(&mut self, direction: Direction) -> bool {
        if self.granularity != Granularity::Month {
            return false;
        }
        self.nudge(7 * direction.sign());
        true
    }

    /// Records that the host moved focus to another cell of the visible
    /// page. The page itself is not realigned. Dates outside the page are
    /// ignored and reported with `false`.
    pub fn focus_changed_externally(&mut self, date: DateKey) -> bool {
        if !self.contains(date) {
            debug!("ignoring focus on {} outside the visible page", date);
            return false;
        }
        self.focus = date;
        true
    }

    /// The visible page with labels and note text, in page order.
    pub fn page_cells(&self, store: &NoteStore, locale: &Locale, today: DateKey) -> Vec<PageCell> {
        self.current_page()
            .into_iter()
            .map(|date| PageCell {
                date,
                label: format_date(date, locale),
                text: store.get_text(date).to_string(),
                is_today: date == today,
                is_focus: date == self.focus,
            })
            .collect()
    }

    fn realign(&mut self) {
        self.anchor = page_anchor(self.granularity, self.focus);
        debug!(
            "{} page from {} (focus {})",
            self.granularity.label(),
            self.anchor,
            self.focus
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Language;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(y, m, d).unwrap()
    }

    #[test]
    fn page_sizes_follow_granularity() {
        let mut view = ViewController::new(Granularity::Day, date(2024, 3, 15));
        assert_eq!(view.current_page(), vec![date(2024, 3, 15)]);

        view.switch_to(Granularity::Week);
        let week = view.current_page();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], date(2024, 3, 11));
        assert_eq!(week[6], date(2024, 3, 17));

        view.switch_to(Granularity::Month);
        let month = view.current_page();
        assert_eq!(month.len(), 35);
        assert_eq!(month[0], date(2024, 2, 26));
        assert_eq!(month[34], date(2024, 3, 31));
        assert_eq!(view.focus(), date(2024, 3, 15));
    }

    #[test]
    fn day_and_week_steps_invert() {
        for granularity in [Granularity::Day, Granularity::Week] {
            let mut view = ViewController::new(granularity, date(2024, 2, 29));
            view.step(Direction::Forward);
            view.step(Direction::Backward);
            assert_eq!(view.focus(), date(2024, 2, 29));
        }
    }

    #[test]
    fn week_step_crosses_year_end() {
        let mut view = ViewController::new(Granularity::Week, date(2024, 12, 28));
        view.step(Direction::Forward);
        assert_eq!(view.focus(), date(2025, 1, 4));
        assert_eq!(view.anchor(), date(2024, 12, 30));
    }

    #[test]
    fn month_steps_depend_on_month_length() {
        let mut view = ViewController::new(Granularity::Month, date(2024, 1, 31));
        view.step(Direction::Forward);
        assert_eq!(view.focus(), date(2024, 3, 2));
        view.step(Direction::Backward);
        assert_eq!(view.focus(), date(2024, 2, 2));

        let mut view = ViewController::new(Granularity::Month, date(2024, 1, 15));
        view.step(Direction::Backward);
        assert_eq!(view.focus(), date(2023, 12, 15));
        view.step(Direction::Forward);
        assert_eq!(view.focus(), date(2024, 1, 15));
    }

    #[test]
    fn focus_change_inside_page_keeps_anchor() {
        let mut view = ViewController::new(Granularity::Month, date(2024, 3, 15));
        assert!(view.focus_changed_externally(date(2024, 2, 27)));
        assert_eq!(view.focus(), date(2024, 2, 27));
        assert_eq!(view.anchor(), date(2024, 2, 26));

        assert!(!view.focus_changed_externally(date(2024, 4, 1)));
        assert_eq!(view.focus(), date(2024, 2, 27));

        view.switch_to(Granularity::Month);
        assert_eq!(view.anchor(), date(2024, 1, 29));
    }

    #[test]
    fn nudges_realign_the_page() {
        let mut view = ViewController::new(Granularity::Week, date(2024, 3, 17));
        view.nudge(1);
        assert_eq!(view.focus(), date(2024, 3, 18));
        assert_eq!(view.anchor(), date(2024, 3, 18));
        assert!(!view.nudge_week(Direction::Forward));

        view.switch_to(Granularity::Month);
        assert!(view.nudge_week(Direction::Forward));
        assert_eq!(view.focus(), date(2024, 3, 25));
        assert!(view.nudge_week(Direction::Forward));
        assert_eq!(view.focus(), date(2024, 4, 1));
        assert_eq!(view.anchor(), date(2024, 4, 1));
    }

    #[test]
    fn granularity_cycles() {
        let mut view = ViewController::new(Granularity::Month, date(2024, 3, 15));
        view.next_granularity();
        assert_eq!(view.granularity(), Granularity::Day);
        view.previous_granularity();
        assert_eq!(view.granularity(), Granularity::Month);
    }

    #[test]
    fn cells_combine_store_and_locale() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 3, 11), "standup");
        let view = ViewController::new(Granularity::Week, date(2024, 3, 13));
        let cells = view.page_cells(&store, Language::German.locale(), date(2024, 3, 12));
        assert_eq!(cells.len(), 7);
        assert_eq!(
            cells[0],
            PageCell {
                date: date(2024, 3, 11),
                label: "KW 11  Mo 11.03.2024".into(),
                text: "standup".into(),
                is_today: false,
                is_focus: false,
            }
        );
        assert!(cells[1].is_today);
        assert!(cells[2].is_focus);
        assert!(cells[2].text.is_empty());
    }
}
