use crate::commands::{normalize_newlines, persist, shutdown};
use anyhow::Result;
use calnote::storage::StoreLocation;
use calnote::{
    format_date, DateKey, Direction, Granularity, Locale, NoteStore, PageCell, Preferences,
    ViewController,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction as Axis, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(store: NoteStore, prefs: Preferences, location: StoreLocation) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(store, prefs, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    let saved = shutdown(&app.location, &mut app.store, &app.prefs);
    result.and(saved)
}

struct App {
    store: NoteStore,
    prefs: Preferences,
    location: StoreLocation,
    view: ViewController,
    today: DateKey,
    mode: Mode,
    status: String,
    last_save: Instant,
}

enum Mode {
    Normal,
    Editing { date: DateKey, field: FieldValue },
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        self.cursor = prev_boundary(&self.value, self.cursor);
    }

    fn move_right(&mut self) {
        self.cursor = next_boundary(&self.value, self.cursor);
    }

    fn move_up(&mut self) {
        let (starts, line, col) = line_state(&self.value, self.cursor);
        if line > 0 {
            self.cursor = index_at_col(&self.value, starts[line - 1], col);
        }
    }

    fn move_down(&mut self) {
        let (starts, line, col) = line_state(&self.value, self.cursor);
        if let Some(&start) = starts.get(line + 1) {
            self.cursor = index_at_col(&self.value, start, col);
        }
    }

    fn backspace(&mut self) {
        let prev = prev_boundary(&self.value, self.cursor);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert(self.cursor, '▌');
        text
    }
}

impl App {
    fn new(store: NoteStore, prefs: Preferences, location: StoreLocation) -> Self {
        let today = DateKey::today();
        let status = format!("Loaded {} notes from {}", store.len(), location.dir.display());
        App {
            view: ViewController::new(prefs.granularity(), today),
            store,
            prefs,
            location,
            today,
            mode: Mode::Normal,
            status,
            last_save: Instant::now(),
        }
    }

    fn locale(&self) -> &'static Locale {
        self.prefs.language().locale()
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            self.today = DateKey::today();
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Editing { date, mut field } => {
                if !self.handle_edit_key(date, &mut field, key) {
                    self.mode = Mode::Editing { date, field };
                }
                Ok(false)
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => self.view.next_granularity(),
            KeyCode::BackTab => self.view.previous_granularity(),
            KeyCode::Char('d') => self.view.switch_to(Granularity::Day),
            KeyCode::Char('w') => self.view.switch_to(Granularity::Week),
            KeyCode::Char('m') => self.view.switch_to(Granularity::Month),
            KeyCode::F(1) | KeyCode::Char('[') => self.view.step(Direction::Backward),
            KeyCode::F(2) | KeyCode::Char(']') => self.view.step(Direction::Forward),
            KeyCode::F(12) | KeyCode::Char('t') => self.view.jump_to(self.today),
            KeyCode::Left | KeyCode::Char('h') if alt => self.view.nudge(-1),
            KeyCode::Right | KeyCode::Char('l') if alt => self.view.nudge(1),
            KeyCode::Up | KeyCode::Char('k') if alt => self.nudge_week(Direction::Backward),
            KeyCode::Down | KeyCode::Char('j') if alt => self.nudge_week(Direction::Forward),
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_focus(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus_row(Direction::Backward),
            KeyCode::Down | KeyCode::Char('j') => self.move_focus_row(Direction::Forward),
            KeyCode::Enter | KeyCode::Char('e') => self.start_editing(),
            KeyCode::Char('L') => {
                self.prefs.set_language(self.prefs.language().next());
                self.status = format!("{}: {}", self.locale().menu.language, self.locale().name);
            }
            _ => {}
        }
        self.prefs.set_granularity(self.view.granularity());
        Ok(false)
    }

    /// Returns `true` once the editor closes.
    fn handle_edit_key(&mut self, date: DateKey, field: &mut FieldValue, key: KeyEvent) -> bool {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Enter if control => return self.commit(date, field),
            KeyCode::Char('s') if control => return self.commit(date, field),
            KeyCode::Enter => field.insert_char('\n'),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Up => field.move_up(),
            KeyCode::Down => field.move_down(),
            KeyCode::Backspace => field.backspace(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                field.insert_char(c)
            }
            _ => {}
        }
        false
    }

    fn commit(&mut self, date: DateKey, field: &FieldValue) -> bool {
        self.store.set_text(date, normalize_newlines(&field.value));
        match persist(&self.location, &mut self.store) {
            Ok(()) => {
                self.last_save = Instant::now();
                self.status = format!("Saved {}", format_date(date, self.locale()));
                true
            }
            Err(err) => {
                self.status = format!("Save failed: {:#}", err);
                false
            }
        }
    }

    fn start_editing(&mut self) {
        let date = self.view.focus();
        if !self.view.contains(date) {
            self.status = format!(
                "{} is not on this page, move the focus first",
                format_date(date, self.locale())
            );
            return;
        }
        self.mode = Mode::Editing {
            date,
            field: FieldValue::new(self.store.get_text(date)),
        };
        self.status = format!(
            "Editing {} (Ctrl+S save, Esc cancel)",
            format_date(date, self.locale())
        );
    }

    fn move_focus(&mut self, days: i64) {
        let target = self.view.focus().add_days(days);
        if self.view.focus_changed_externally(target) {
            return;
        }
        // A month grid can end before the focus date; step back onto its last cell.
        if days < 0 && !self.view.contains(self.view.focus()) {
            if let Some(&last) = self.view.current_page().last() {
                self.view.focus_changed_externally(last);
                return;
            }
        }
        self.view.nudge(days);
    }

    fn move_focus_row(&mut self, direction: Direction) {
        if self.view.granularity() == Granularity::Month {
            self.move_focus(7 * direction.sign());
        }
    }

    fn nudge_week(&mut self, direction: Direction) {
        if !self.view.nudge_week(direction) {
            self.status = "Rows only exist in month view".into();
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Axis::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_page(f, layout[1]);
        self.draw_footer(f, layout[2]);
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let locale = self.locale();
        let view_label = match self.view.granularity() {
            Granularity::Day => locale.menu.days,
            Granularity::Week => locale.menu.weeks,
            Granularity::Month => locale.menu.months,
        };
        let title = Line::from(vec![
            Span::styled(
                format!("{} ", locale.window_title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(view_label, Style::default().fg(Color::Magenta)),
            Span::raw("  •  "),
            Span::styled(self.location.scope.label(), Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(locale.name, Style::default().fg(Color::Yellow)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_page(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let cells = self.view.page_cells(&self.store, self.locale(), self.today);
        let columns = cells.len().min(7).max(1);
        let rows = cells.len().div_ceil(columns).max(1);

        let row_areas = Layout::default()
            .direction(Axis::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(area);
        for (row_idx, row_area) in row_areas.iter().enumerate() {
            let cell_areas = Layout::default()
                .direction(Axis::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row_area);
            for (col_idx, cell_area) in cell_areas.iter().enumerate() {
                if let Some(cell) = cells.get(row_idx * columns + col_idx) {
                    self.draw_cell(f, *cell_area, cell);
                }
            }
        }
    }

    fn draw_cell(&self, f: &mut ratatui::Frame<'_>, area: Rect, cell: &PageCell) {
        let editing = match &self.mode {
            Mode::Editing { date, field } if *date == cell.date => Some(field),
            _ => None,
        };
        let accent = if editing.is_some() {
            Color::Yellow
        } else if cell.is_focus {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let mut title_style = Style::default().fg(if cell.is_focus {
            Color::Cyan
        } else {
            Color::Gray
        });
        if cell.is_today {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }
        let body = match editing {
            Some(field) => field.with_caret(),
            None => cell.text.clone(),
        };
        let block = Block::default()
            .title(Span::styled(cell.label.clone(), title_style))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent));
        let paragraph = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(if editing.is_some() { Color::White } else { Color::Gray }))
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Axis::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = Style::default().fg(Color::LightCyan);
        let menu = self.locale().menu;
        if let Mode::Editing { .. } = self.mode {
            return Line::from(vec![
                Span::styled("Ctrl+S", key),
                Span::raw(" save  "),
                Span::styled("Enter", key),
                Span::raw(" newline  "),
                Span::styled("Esc", key),
                Span::raw(" cancel"),
            ]);
        }
        Line::from(vec![
            Span::styled("F12/t", key),
            Span::raw(format!(" {}  ", menu.today)),
            Span::styled("d w m", key),
            Span::raw(format!(" {}/{}/{}  ", menu.days, menu.weeks, menu.months)),
            Span::styled("Tab", key),
            Span::raw(" cycle  "),
            Span::styled("F1/[ F2/]", key),
            Span::raw(" < >  "),
            Span::styled("←↑↓→", key),
            Span::raw(" focus  "),
            Span::styled("Enter", key),
            Span::raw(" edit  "),
            Span::styled("L", key),
            Span::raw(format!(" {}  ", menu.language)),
            Span::styled("q", key),
            Span::raw(" quit"),
        ])
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn prev_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_boundary(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(cursor)
}

/// Byte offsets of every line start, plus the caret's line and column (in
/// chars).
fn line_state(text: &str, cursor: usize) -> (Vec<usize>, usize, usize) {
    let mut starts = vec![0];
    starts.extend(
        text.char_indices()
            .filter(|&(_, ch)| ch == '\n')
            .map(|(idx, _)| idx + 1),
    );
    let line = starts.iter().rposition(|&start| start <= cursor).unwrap_or(0);
    let col = text[starts[line]..cursor].chars().count();
    (starts, line, col)
}

fn index_at_col(text: &str, start: usize, col: usize) -> usize {
    let line = &text[start..];
    let end = line.find('\n').unwrap_or(line.len());
    line[..end]
        .char_indices()
        .nth(col)
        .map(|(idx, _)| start + idx)
        .unwrap_or(start + end)
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
