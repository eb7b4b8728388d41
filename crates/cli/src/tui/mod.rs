pub mod layout;

use std::cell::RefCell;
use std::io::stdout;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{debug, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tagcalc_engine::{
    InteractionController, Key, StoreEvent, Suggestion, SuggestionSource, UiEffect,
};
use tagcalc_suggest_client::SuggestError;

use crate::source::Source;
use crate::util;
use layout::{ChipHit, FormulaLayout};

type FetchResult = Result<Vec<Suggestion>, SuggestError>;

/// Screen regions computed before each draw.
#[derive(Debug, Clone, Copy, Default)]
struct Areas {
    title: Rect,
    formula: Rect,
    result: Rect,
    dropdown: Option<Rect>,
    status: Rect,
}

struct FormulaApp {
    controller: InteractionController,
    fetch_rx: Option<Receiver<FetchResult>>,
    source_label: String,
    max_rows: usize,
    /// First dropdown row on screen
    dropdown_offset: usize,
    formula_layout: FormulaLayout,
    areas: Areas,
    /// Most recent formula change, reported in the status bar
    last_change: Rc<RefCell<Option<StoreEvent>>>,
    fetch_error: Option<String>,
    should_quit: bool,
    show_help: bool,
}

impl FormulaApp {
    fn new(controller: InteractionController, source_label: String, max_rows: usize) -> Self {
        let last_change = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last_change);
        controller.store().borrow_mut().subscribe(Box::new(move |event, formula| {
            debug!("formula changed at {}: {:?} ({} tags)", event.index(), event, formula.len());
            *sink.borrow_mut() = Some(event.clone());
        }));

        Self {
            controller,
            fetch_rx: None,
            source_label,
            max_rows: max_rows.max(1),
            dropdown_offset: 0,
            formula_layout: FormulaLayout::default(),
            areas: Areas::default(),
            last_change,
            fetch_error: None,
            should_quit: false,
            show_help: false,
        }
    }

    /// Start the one-shot suggestion fetch on a worker thread.
    fn spawn_fetch(&mut self, source: Source) {
        let (tx, rx) = mpsc::channel();
        self.controller.begin_loading();
        self.fetch_rx = Some(rx);
        info!("loading suggestions from {}", source.describe());
        thread::spawn(move || {
            // Receiver may be gone if the user quit first
            let _ = tx.send(source.fetch_all());
        });
    }

    fn poll_fetch(&mut self) {
        let Some(rx) = &self.fetch_rx else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(SuggestError::Network(
                "suggestion worker exited without a result".to_string(),
            )),
        };
        self.fetch_rx = None;

        match outcome {
            Ok(list) => {
                info!("loaded {} suggestions", list.len());
                self.controller.load_suggestions(list);
            }
            Err(e) => {
                self.fetch_error = Some(e.to_string());
                self.controller.suggestions_failed(e.to_string());
            }
        }
        self.apply_effects();
    }

    // ── Input ───────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Up => {
                self.controller.on_key(Key::ArrowUp);
            }
            KeyCode::Down => {
                self.controller.on_key(Key::ArrowDown);
            }
            KeyCode::Enter => {
                self.controller.on_key(Key::Enter);
            }
            KeyCode::Backspace => {
                let mut query = self.controller.query().to_string();
                if query.pop().is_some() {
                    self.controller.on_query_change(&query);
                }
            }
            KeyCode::Char(c) => {
                if !self.controller.on_key(Key::Char(c)).suppresses_default() {
                    let mut query = self.controller.query().to_string();
                    query.push(c);
                    self.controller.on_query_change(&query);
                }
            }
            _ => {}
        }
        self.apply_effects();
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_help || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let point = Position::new(mouse.column, mouse.row);

        let body = inner(self.areas.formula);
        if body.contains(point) {
            match self.formula_layout.hit(point.x - body.x, point.y - body.y) {
                Some(ChipHit::Tag(index)) => self.controller.on_tag_click(index),
                Some(ChipHit::Remove(index)) => self.controller.on_tag_remove(index),
                None => {}
            }
        } else if let Some(dropdown) = self.areas.dropdown {
            let rows = inner(dropdown);
            if rows.contains(point) {
                let index = self.dropdown_offset + (point.y - rows.y) as usize;
                self.controller.on_suggestion_click(index);
            }
        }
        self.apply_effects();
    }

    fn apply_effects(&mut self) {
        for effect in self.controller.take_effects() {
            match effect {
                // The input is the only focus target
                UiEffect::FocusInput => {}
                UiEffect::ScrollIntoView { index, .. } => {
                    self.dropdown_offset =
                        layout::nearest_offset(self.dropdown_offset, index, self.max_rows);
                }
            }
        }
        let rows = self.controller.filtered().len();
        if self.dropdown_offset + self.max_rows > rows {
            self.dropdown_offset = rows.saturating_sub(self.max_rows);
        }
    }

    // ── Layout ──────────────────────────────────────────────────────

    fn compute_areas(&mut self, area: Rect) {
        let labels: Vec<String> = self.controller.store().borrow().tokens().to_vec();
        self.formula_layout = layout::layout_formula(&labels, area.width.saturating_sub(2));

        let rows = self.controller.filtered().len();
        let dropdown_height = if rows == 0 {
            0
        } else {
            rows.min(self.max_rows) as u16 + 2
        };

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(self.formula_layout.lines + 2),
            Constraint::Length(1),
            Constraint::Length(dropdown_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

        self.areas = Areas {
            title: chunks[0],
            formula: chunks[1],
            result: chunks[2],
            dropdown: (dropdown_height > 0).then_some(chunks[3]),
            status: chunks[5],
        };
    }

    // ── Drawing ─────────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        self.draw_title(frame, self.areas.title);
        self.draw_formula(frame, self.areas.formula);
        self.draw_result(frame, self.areas.result);
        if let Some(area) = self.areas.dropdown {
            self.draw_dropdown(frame, area);
        }
        self.draw_status(frame, self.areas.status);

        if self.show_help {
            self.draw_help(frame, frame.area());
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" tagcalc  {}", self.source_label);
        let para = Paragraph::new(Line::from(Span::styled(
            util::pad_right(&title, area.width as usize),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(para, area);
    }

    fn draw_formula(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Formula ");
        let body = inner(area);
        frame.render_widget(block, area);

        let tokens = self.controller.store().borrow().tokens().to_vec();
        let chip_style = Style::default().fg(Color::Black).bg(Color::Gray);
        let remove_style = Style::default().fg(Color::Red).bg(Color::Gray);

        let mut lines: Vec<Vec<Span>> = vec![Vec::new(); self.formula_layout.lines as usize];
        let mut cursor_x = vec![0u16; lines.len()];
        for chip in &self.formula_layout.chips {
            let row = chip.y as usize;
            if chip.x > cursor_x[row] {
                lines[row].push(Span::raw(" ".repeat((chip.x - cursor_x[row]) as usize)));
            }
            let label = tokens.get(chip.index).map(String::as_str).unwrap_or("");
            lines[row].push(Span::styled(format!(" {} ", label), chip_style));
            lines[row].push(Span::styled(layout::REMOVE_LABEL, remove_style));
            lines[row].push(Span::styled(" ", chip_style));
            cursor_x[row] = chip.x + chip.width;
        }

        let input_row = self.formula_layout.input_y as usize;
        if self.formula_layout.input_x > cursor_x[input_row] {
            let gap = self.formula_layout.input_x - cursor_x[input_row];
            lines[input_row].push(Span::raw(" ".repeat(gap as usize)));
        }
        let query = self.controller.query();
        if query.is_empty() {
            lines[input_row].push(Span::styled(
                "type a name...",
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            lines[input_row].push(Span::raw(query.to_string()));
        }

        let para = Paragraph::new(lines.into_iter().map(Line::from).collect::<Vec<_>>());
        frame.render_widget(para, body);

        if !self.show_help {
            let x = body.x + self.formula_layout.input_x + util::display_width(query) as u16;
            let y = body.y + self.formula_layout.input_y;
            frame.set_cursor_position(Position::new(x.min(body.right().saturating_sub(1)), y));
        }
    }

    fn draw_result(&self, frame: &mut Frame, area: Rect) {
        let result = self.controller.result();
        let value_style = if result.is_error() {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };
        let line = Line::from(vec![
            Span::raw(" Result: "),
            Span::styled(result.to_display(), value_style),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_dropdown(&self, frame: &mut Frame, area: Rect) {
        let filtered = self.controller.filtered();
        let title = format!(" {} matches ", filtered.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title);
        let body = inner(area);
        frame.render_widget(block, area);

        let width = body.width as usize;
        let lines: Vec<Line> = filtered
            .iter()
            .enumerate()
            .skip(self.dropdown_offset)
            .take(body.height as usize)
            .map(|(i, s)| {
                let text = util::spread(&s.name, &s.category, width);
                let style = if self.controller.highlighted() == Some(i) {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(text, style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), body);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let cache = self.controller.suggestions();
        let left = if cache.is_loading() {
            " loading suggestions...".to_string()
        } else if let Some(err) = &self.fetch_error {
            format!(" suggestions unavailable: {}", err)
        } else {
            match &*self.last_change.borrow() {
                Some(StoreEvent::TagAdded { tag, .. }) => format!(" added {}", tag),
                Some(StoreEvent::TagRemoved { tag, .. }) => format!(" removed {}", tag),
                Some(StoreEvent::TagUpdated { old, new, .. }) => {
                    format!(" replaced {} with {}", old, new)
                }
                None => String::new(),
            }
        };
        let count = cache.entries().map(|e| e.len()).unwrap_or(0);
        let right = format!("{} suggestions  F1: help ", count);

        let padding = (area.width as usize)
            .saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(Span::styled(
            util::truncate_display(&status, area.width as usize),
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Formula",
            "  -------",
            "  type             Filter suggestions",
            "  Up / Down        Move highlight",
            "  Enter            Add highlighted or exact match",
            "  + - * / ( ) ^    Add operator",
            "  Backspace        Delete last character",
            "",
            "  Mouse",
            "  -----",
            "  click tag        Edit tag",
            "  click [x]        Remove tag",
            "  click row        Fill input",
            "",
            "  General",
            "  -------",
            "  Esc / Ctrl+C     Quit",
            "  F1               Toggle this help",
            "",
        ];
        let help_width: u16 = 50;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Area inside a one-cell border.
fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

/// Run the interactive formula editor until the user quits.
pub fn run(controller: InteractionController, source: Source, max_rows: usize) -> Result<(), String> {
    let mut app = FormulaApp::new(controller, source.describe(), max_rows);
    app.spawn_fetch(source);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;
    stdout()
        .execute(EnableMouseCapture)
        .map_err(|e| format!("failed to enable mouse capture: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        app.poll_fetch();

        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        app.compute_areas(term_size);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            match event::read().map_err(|e| format!("event read error: {}", e))? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
