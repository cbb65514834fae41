use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamesearch_core::{
    FilterChange, Game, GameDetail, HttpSearchApi, SearchApi, SearchController, SearchError,
    SearchStatus, SharedLocation, ViewModel,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const SHARE_BASE: &str = "gamesearch://search";
const SNIPPET_CHARS: usize = 480;

const FALLBACK_PLATFORMS: [&str; 6] = [
    "PC",
    "PlayStation 5",
    "PlayStation 4",
    "Xbox Series X",
    "Xbox One",
    "Nintendo Switch",
];

const FALLBACK_GENRES: [&str; 8] = [
    "Action",
    "Adventure",
    "RPG",
    "Strategy",
    "Shooter",
    "Sports",
    "Racing",
    "Indie",
];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Magenta,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Results,
}

enum AppEvent {
    Input(Event),
    Tick,
    DetailLoaded(i64, Result<GameDetail, SearchError>),
    FacetsLoaded {
        platforms: Result<Vec<String>, SearchError>,
        genres: Result<Vec<String>, SearchError>,
    },
}

enum DetailPane {
    Hidden,
    Loading(i64),
    Loaded(Box<GameDetail>),
    Failed(String),
}

enum Wake {
    App(Option<AppEvent>),
    Search(Option<gamesearch_core::ControllerEvent>),
}

/// Terminal renderer driving the search controller.
pub struct GameSearchApp {
    controller: SearchController<HttpSearchApi>,
    location: SharedLocation,
    state: UiState,
    detail: DetailPane,
    platforms: Vec<String>,
    genres: Vec<String>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl GameSearchApp {
    pub fn new(controller: SearchController<HttpSearchApi>, location: SharedLocation) -> Self {
        Self {
            controller,
            location,
            state: UiState::default(),
            detail: DetailPane::Hidden,
            platforms: FALLBACK_PLATFORMS.iter().map(|s| s.to_string()).collect(),
            genres: FALLBACK_GENRES.iter().map(|s| s.to_string()).collect(),
            event_tx: None,
            theme: Theme::default(),
        }
    }

    /// Apply a share query string passed on the command line.
    pub fn restore(&mut self, share_query: &str) {
        self.controller.restore_from_url(share_query);
        let view = self.controller.view_model();
        if view.criteria.has_query() {
            self.state.focus = Focus::Results;
            self.state
                .set_status(format!("Searching for \"{}\"…", view.criteria.query_text));
        } else if !view.results.is_empty() {
            self.state
                .set_status(format!("Showing {} cached results", view.results.len()));
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.load_facets();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let wake = tokio::select! {
                maybe_event = event_rx.recv() => Wake::App(maybe_event),
                maybe_search = self.controller.next_event() => Wake::Search(maybe_search),
            };
            match wake {
                Wake::App(maybe_event) => {
                    if !self.process_app_event(maybe_event) {
                        break;
                    }
                }
                Wake::Search(Some(event)) => {
                    self.controller.handle_event(event);
                    self.after_search_update();
                }
                Wake::Search(None) => {}
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::DetailLoaded(id, result)) => {
                if matches!(self.detail, DetailPane::Loading(pending) if pending == id) {
                    self.detail = match result {
                        Ok(detail) => {
                            info!(id, name = %detail.summary.name, "game details loaded");
                            DetailPane::Loaded(Box::new(detail))
                        }
                        Err(err) => {
                            warn!(id, %err, "game details failed");
                            DetailPane::Failed(err.to_string())
                        }
                    };
                }
                true
            }
            Some(AppEvent::FacetsLoaded { platforms, genres }) => {
                apply_facets(&mut self.platforms, platforms, "platforms");
                apply_facets(&mut self.genres, genres, "genres");
                true
            }
            None => false,
        }
    }

    fn after_search_update(&mut self) {
        let view = self.controller.view_model();
        self.state.clamp_cursor(view.results.len());
        match view.status {
            SearchStatus::Ready => {
                let more = if view.can_load_more {
                    " • press m for more"
                } else {
                    ""
                };
                self.state
                    .set_status(format!("{} games found{more}", view.results.len()));
            }
            SearchStatus::Error => {
                let message = view.error.unwrap_or_else(|| "Search failed".to_string());
                self.state
                    .set_status(format!("{message} • press r to retry"));
            }
            SearchStatus::Loading | SearchStatus::LoadingMore | SearchStatus::Idle => {}
        }
    }

    fn load_facets(&self) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let api = self.controller.api();
        spawn(async move {
            let (platforms, genres) = tokio::join!(api.platforms(), api.genres());
            let _ = tx.send(AppEvent::FacetsLoaded { platforms, genres }).await;
        });
    }

    fn open_detail(&mut self) {
        let view = self.controller.view_model();
        let Some(game) = view.results.get(self.state.cursor) else {
            return;
        };
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let id = game.id;
        self.detail = DetailPane::Loading(id);
        let api = self.controller.api();
        spawn(async move {
            let result = api.game(id).await;
            let _ = tx.send(AppEvent::DetailLoaded(id, result)).await;
        });
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        if key.code == KeyCode::Tab {
            self.state.focus = match self.state.focus {
                Focus::Query => Focus::Results,
                Focus::Results => Focus::Query,
            };
            return Ok(());
        }
        match self.state.focus {
            Focus::Query => self.handle_query_key(key),
            Focus::Results => self.handle_results_key(key),
        }
        Ok(())
    }

    fn handle_query_key(&mut self, key: KeyEvent) {
        let mut text = self.controller.criteria().query_text.clone();
        match key.code {
            KeyCode::Enter | KeyCode::Down | KeyCode::Esc => {
                self.state.focus = Focus::Results;
                return;
            }
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => text.clear(),
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                text.push(c)
            }
            _ => return,
        }
        self.controller.set_query_text(text);
        self.state.cursor = 0;
        self.state.offset = 0;
        self.detail = DetailPane::Hidden;
        if self.controller.criteria().has_query() {
            self.state.set_status("Searching…".to_string());
        } else {
            self.state.set_status("Search cleared".to_string());
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let total = self.controller.view_model().results.len();
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, total),
            KeyCode::PageDown => {
                let step = self.state.list_height.max(1) as isize;
                self.state.move_cursor(step, total);
            }
            KeyCode::PageUp => {
                let step = self.state.list_height.max(1) as isize;
                self.state.move_cursor(-step, total);
            }
            KeyCode::Home => self.state.move_cursor(isize::MIN / 2, total),
            KeyCode::End => self.state.move_cursor(isize::MAX / 2, total),
            KeyCode::Char('/') => self.state.focus = Focus::Query,
            KeyCode::Char('p') => {
                let next = cycle_option(&self.platforms, self.controller.criteria().platform.as_deref());
                self.apply_filter(FilterChange::Platform(next));
            }
            KeyCode::Char('g') => {
                let next = cycle_option(&self.genres, self.controller.criteria().genre.as_deref());
                self.apply_filter(FilterChange::Genre(next));
            }
            KeyCode::Char('s') => {
                let next = self.controller.criteria().sort_key.next();
                self.apply_filter(FilterChange::Sort(next));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let next = self.controller.criteria().min_rating.step_up();
                self.apply_filter(FilterChange::MinRating(next));
            }
            KeyCode::Char('-') => {
                let next = self.controller.criteria().min_rating.step_down();
                self.apply_filter(FilterChange::MinRating(next));
            }
            KeyCode::Char('m') => {
                if self.controller.load_more() {
                    self.state.set_status("Loading more games…".to_string());
                } else {
                    self.state.set_status("No more results".to_string());
                }
            }
            KeyCode::Char('r') => {
                if self.controller.retry() {
                    self.state.set_status("Retrying…".to_string());
                }
            }
            KeyCode::Enter => self.open_detail(),
            KeyCode::Esc => self.detail = DetailPane::Hidden,
            _ => {}
        }
    }

    fn apply_filter(&mut self, change: FilterChange) {
        self.controller.set_filter(change);
        self.state.cursor = 0;
        self.state.offset = 0;
        self.detail = DetailPane::Hidden;
        if self.controller.criteria().has_query() {
            self.state.set_status("Searching…".to_string());
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let view = self.controller.view_model();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);

        self.render_query(frame, chunks[0], &view);
        self.render_filters(frame, chunks[1], &view);
        self.render_results(frame, body[0], &view);
        self.render_detail(frame, body[1], &view);
        self.render_status(frame, chunks[3], &view);
    }

    fn render_query(&self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        let focused = self.state.focus == Focus::Query;
        let border = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let mut spans = vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(view.criteria.query_text.clone()),
        ];
        if focused {
            spans.push(Span::styled("▏", Style::default().fg(self.theme.accent)));
        }
        if view.criteria.query_text.is_empty() && !focused {
            spans.push(Span::styled(
                "Search for games…",
                Style::default().fg(self.theme.muted),
            ));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Game Search");
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        let criteria = &view.criteria;
        let label = Style::default().fg(self.theme.muted);
        let value = Style::default()
            .fg(self.theme.primary_fg)
            .add_modifier(Modifier::BOLD);
        let rating = if criteria.min_rating.is_unset() {
            "any".to_string()
        } else {
            format!("{}+", criteria.min_rating)
        };
        let line = Line::from(vec![
            Span::styled("Sort ", label),
            Span::styled(criteria.sort_key.label(), value),
            Span::styled("  Platform ", label),
            Span::styled(
                criteria.platform.clone().unwrap_or_else(|| "All".to_string()),
                value,
            ),
            Span::styled("  Genre ", label),
            Span::styled(
                criteria.genre.clone().unwrap_or_else(|| "All".to_string()),
                value,
            ),
            Span::styled("  Rating ", label),
            Span::styled(rating, value),
        ]);
        let block = Block::default().borders(Borders::ALL).title("Filters");
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_results(&mut self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor(view.results.len());
        self.state.ensure_cursor_visible();

        let title = match view.status {
            SearchStatus::Loading => "Results (searching…)".to_string(),
            SearchStatus::LoadingMore => format!("Results ({} • loading more…)", view.results.len()),
            _ => format!("Results ({})", view.results.len()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if view.results.is_empty() {
            let message = match view.status {
                SearchStatus::Idle => "Type to search the game catalogue",
                SearchStatus::Loading => "Searching…",
                _ => "No games found",
            };
            let paragraph = Paragraph::new(Span::styled(
                message,
                Style::default().fg(self.theme.muted),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let visible = self.state.visible_range(view.results.len());
        let offset = visible.start;
        let items: Vec<ListItem> = view.results[visible]
            .iter()
            .enumerate()
            .map(|(idx, game)| self.result_item(game, offset + idx == self.state.cursor))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(self.state.cursor.saturating_sub(offset)));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn result_item(&self, game: &Game, selected: bool) -> ListItem<'static> {
        let marker = if selected {
            Span::styled(
                "▶ ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("  ")
        };
        let mut line = vec![
            marker,
            Span::styled(
                game.name.clone(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", game.rating_label()),
                Style::default().fg(self.theme.warning),
            ),
        ];
        if let Some(date) = game.released_on() {
            line.push(Span::styled(
                format!(" · {}", date.format("%Y")),
                Style::default().fg(self.theme.muted),
            ));
        }
        if !game.genres.is_empty() {
            line.push(Span::styled(
                format!(" · {}", game.genres.join(", ")),
                Style::default().fg(self.theme.muted),
            ));
        }
        ListItem::new(Line::from(line))
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        let block = Block::default().borders(Borders::ALL).title("Game Details");
        let lines = match &self.detail {
            DetailPane::Loading(_) => vec![Line::from(Span::styled(
                "Loading details…",
                Style::default().fg(self.theme.muted),
            ))],
            DetailPane::Failed(message) => vec![Line::from(Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            ))],
            DetailPane::Loaded(detail) => self.detail_lines(detail),
            DetailPane::Hidden => match view.results.get(self.state.cursor) {
                Some(game) => self.summary_lines(game),
                None => vec![Line::from("No game selected")],
            },
        };
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn summary_lines(&self, game: &Game) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            game.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        lines.push(Line::from(format!("Rating: {}", game.rating_label())));
        if let Some(score) = game.metacritic {
            lines.push(Line::from(vec![
                Span::raw("Metacritic: "),
                Span::styled(
                    score.to_string(),
                    Style::default().fg(self.metacritic_color(score)),
                ),
            ]));
        }
        if let Some(date) = game.released_on() {
            lines.push(Line::from(format!("Released: {}", date.format("%Y-%m-%d"))));
        }
        if !game.genres.is_empty() {
            lines.push(Line::from(format!("Genres: {}", game.genres.join(", "))));
        }
        if !game.platforms.is_empty() {
            lines.push(Line::from(format!(
                "Platforms: {}",
                game.platforms.join(", ")
            )));
        }
        let snippet = game.snippet(SNIPPET_CHARS);
        if !snippet.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(snippet));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter for full details",
            Style::default().fg(self.theme.muted),
        )));
        lines
    }

    fn detail_lines(&self, detail: &GameDetail) -> Vec<Line<'static>> {
        let mut lines = self.summary_lines(&detail.summary);
        // Replace the trailing hint with the extended fields.
        lines.truncate(lines.len().saturating_sub(2));
        if let Some(hours) = detail.playtime.filter(|hours| *hours > 0) {
            lines.push(Line::from(format!("Playtime: {hours} hours")));
        }
        if !detail.tags.is_empty() {
            lines.push(Line::from(format!("Tags: {}", detail.tags.join(", "))));
        }
        if !detail.screenshots.is_empty() {
            lines.push(Line::from(format!(
                "Screenshots: {}",
                detail.screenshots.len()
            )));
        }
        for (label, slug) in [("Steam", "steam"), ("Epic", "epic-games"), ("GOG", "gog")] {
            if let Some(url) = detail.store_url(slug) {
                lines.push(Line::from(format!("{label}: {url}")));
            }
        }
        if let Some(website) = &detail.website {
            lines.push(Line::from(format!("Website: {website}")));
        }
        lines
    }

    fn metacritic_color(&self, score: i64) -> Color {
        if score >= 75 {
            self.theme.success
        } else if score >= 50 {
            self.theme.warning
        } else {
            self.theme.danger
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = match (&view.status, &view.error) {
            (SearchStatus::Error, Some(message)) => Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            ),
            _ => Span::raw(self.state.status.clone()),
        };
        let share = Span::styled(
            format!("Share: {}", self.location.link(SHARE_BASE)),
            Style::default().fg(self.theme.muted),
        );
        let keys = Span::styled(
            "  Tab focus · p/g/s filters · +/- rating · m more · q quit",
            Style::default().fg(self.theme.muted),
        );
        let paragraph = Paragraph::new(vec![Line::from(primary), Line::from(vec![share, keys])])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn apply_facets(target: &mut Vec<String>, loaded: Result<Vec<String>, SearchError>, what: &str) {
    match loaded {
        Ok(values) if !values.is_empty() => {
            info!(count = values.len(), "loaded {what}");
            *target = values;
        }
        Ok(_) => warn!("service returned no {what}; keeping defaults"),
        Err(err) => warn!(%err, "failed to load {what}; keeping defaults"),
    }
}

/// Next choice after `current`, wrapping through "no filter".
fn cycle_option(options: &[String], current: Option<&str>) -> Option<String> {
    match current.and_then(|value| options.iter().position(|option| option == value)) {
        None if current.is_none() => options.first().cloned(),
        None => None,
        Some(index) => options.get(index + 1).cloned(),
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    focus: Focus,
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Query,
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: "Type to search".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let max = (total - 1) as isize;
        self.cursor = (self.cursor as isize).saturating_add(delta).clamp(0, max) as usize;
    }

    fn clamp_cursor(&mut self, total: usize) {
        if total == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let height = self.list_height.max(1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }

    fn visible_range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(total);
        let end = (start + self.list_height.max(1)).min(total);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["PC".to_string(), "Xbox One".to_string()]
    }

    #[test]
    fn filter_cycle_wraps_through_unset() {
        let options = options();
        assert_eq!(cycle_option(&options, None).as_deref(), Some("PC"));
        assert_eq!(cycle_option(&options, Some("PC")).as_deref(), Some("Xbox One"));
        assert_eq!(cycle_option(&options, Some("Xbox One")), None);
        assert_eq!(cycle_option(&options, Some("Amiga")), None);
        assert_eq!(cycle_option(&[], None), None);
    }

    #[test]
    fn cursor_stays_in_bounds_and_visible() {
        let mut state = UiState {
            list_height: 5,
            ..UiState::default()
        };
        state.move_cursor(12, 30);
        state.ensure_cursor_visible();
        assert_eq!(state.cursor, 12);
        assert_eq!(state.visible_range(30), 8..13);

        state.move_cursor(isize::MAX / 2, 30);
        assert_eq!(state.cursor, 29);
        state.move_cursor(isize::MIN / 2, 30);
        assert_eq!(state.cursor, 0);

        state.cursor = 20;
        state.clamp_cursor(3);
        assert_eq!(state.cursor, 2);
        state.clamp_cursor(0);
        assert_eq!(state.visible_range(0), 0..0);
    }
}
