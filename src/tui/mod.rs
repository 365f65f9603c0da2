//! Ratatui-based prediction form.
//!
//! The form has three fields: a category selector whose choices come from the
//! encoder, a score entry bounded by the scaler's fitted domain, and a predict
//! button. The result panel shows the verdict, its confidence and the feature
//! row exactly as the model received it.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::PredictionContext;
use crate::domain::{Lang, Prediction};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::io::{RECORD_DIR, parse_score, write_prediction_record};
use crate::report::texts;

const FIELD_CATEGORY: usize = 0;
const FIELD_SCORE: usize = 1;
const FIELD_PREDICT: usize = 2;
const SCORE_STEP: f64 = 0.1;

/// Start the form.
pub fn run(ctx: &PredictionContext, lang: Lang) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ctx, lang);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_RUNTIME,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    ctx: &'a PredictionContext,
    lang: Lang,
    category_idx: usize,
    score_input: String,
    selected_field: usize,
    editing_score: bool,
    status: String,
    last: Option<Prediction>,
}

impl<'a> App<'a> {
    fn new(ctx: &'a PredictionContext, lang: Lang) -> Self {
        let (lo, _) = ctx.score_domain();
        Self {
            ctx,
            lang,
            category_idx: 0,
            score_input: format_score(lo),
            selected_field: FIELD_CATEGORY,
            editing_score: false,
            status: texts(lang).loaded.to_string(),
            last: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read()
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))?
            {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the form should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_score {
            self.handle_score_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => self.selected_field = (self.selected_field + 1).min(FIELD_PREDICT),
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => match self.selected_field {
                FIELD_SCORE => {
                    self.editing_score = true;
                    self.status = texts(self.lang).editing_hint.to_string();
                }
                _ => self.submit(),
            },
            KeyCode::Char('p') => self.submit(),
            KeyCode::Char('l') => {
                self.lang = self.lang.toggle();
                self.status = texts(self.lang).loaded.to_string();
            }
            KeyCode::Char('d') => self.write_record(),
            _ => {}
        }
        false
    }

    fn handle_score_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_score = false;
                self.status.clear();
            }
            KeyCode::Enter => {
                self.editing_score = false;
                self.submit();
            }
            KeyCode::Backspace => {
                self.score_input.pop();
            }
            KeyCode::Char(c) if accepts_score_char(c) => self.score_input.push(c),
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_CATEGORY => {
                self.category_idx = cycle(self.category_idx, self.ctx.categories().len(), delta);
            }
            FIELD_SCORE => {
                let domain = self.ctx.score_domain();
                let current = parse_score(&self.score_input).unwrap_or(domain.0);
                self.score_input = format_score(step_score(current, delta, domain));
            }
            _ => {}
        }
    }

    fn selected_category(&self) -> &str {
        self.ctx
            .categories()
            .get(self.category_idx)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn submit(&mut self) {
        let Some(score) = parse_score(&self.score_input) else {
            self.status = format!("{} '{}'.", texts(self.lang).invalid_score, self.score_input.trim());
            return;
        };
        let category = self.selected_category().to_string();
        match self.ctx.predict(&category, score) {
            Ok(p) => {
                self.status = if p.clamped {
                    texts(self.lang).clamped_note.to_string()
                } else {
                    String::new()
                };
                self.last = Some(p);
            }
            Err(err) => {
                self.status = err.to_string();
                self.last = None;
            }
        }
    }

    fn write_record(&mut self) {
        self.write_record_in(Path::new(RECORD_DIR));
    }

    fn write_record_in(&mut self, dir: &Path) {
        let t = texts(self.lang);
        let Some(p) = &self.last else {
            self.status = t.no_prediction.to_string();
            return;
        };
        self.status = match write_prediction_record(dir, self.ctx, p) {
            Ok(path) => format!("{} {}", t.record_written, path.display()),
            Err(err) => format!("{}: {err}", t.record_failed),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(7),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_fields(frame, chunks[1]);
        self.draw_result(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let t = texts(self.lang);
        let lines = vec![
            Line::from(Span::styled(
                t.title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(t.subtitle, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_fields(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let t = texts(self.lang);
        let (lo, hi) = self.ctx.score_domain();
        let cursor = if self.editing_score { "_" } else { "" };

        let items = vec![
            ListItem::new(format!("{}: ◀ {} ▶", t.category_label, self.selected_category())),
            ListItem::new(format!(
                "{} [{lo} – {hi}]: {}{cursor}",
                t.score_label, self.score_input
            )),
            ListItem::new(format!("[ {} ]", t.predict_button)),
        ];

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let t = texts(self.lang);
        let block = Block::default().title(t.result_title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(p) = &self.last else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let color = if p.approved { Color::Green } else { Color::Red };
        let verdict = Paragraph::new(Line::from(Span::styled(
            t.verdict(p.approved),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(verdict, chunks[0]);

        let confidence = p.confidence();
        let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(confidence)
            .label(format!("{} {:.1}%", t.confidence, confidence * 100.0));
        frame.render_widget(gauge, chunks[1]);

        let rows: Vec<ListItem> = p
            .row
            .features
            .iter()
            .map(|f| {
                let style = if f.value != 0.0 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(format!("{:<40} {:.4}", f.name, f.value)).style(style)
            })
            .collect();
        frame.render_widget(List::new(rows), chunks[2]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(texts(self.lang).help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn accepts_score_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ',' | '-')
}

fn cycle(idx: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    if delta >= 0 { (idx + 1) % len } else { (idx + len - 1) % len }
}

/// Step the score by one increment, staying inside the fitted domain.
fn step_score(current: f64, delta: i32, (lo, hi): (f64, f64)) -> f64 {
    let next = current + f64::from(delta.signum()) * SCORE_STEP;
    // Round away float drift from repeated steps.
    ((next * 10.0).round() / 10.0).clamp(lo, hi)
}

fn format_score(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::demo_context;

    #[test]
    fn category_cycles_both_ways() {
        assert_eq!(cycle(0, 8, 1), 1);
        assert_eq!(cycle(7, 8, 1), 0);
        assert_eq!(cycle(0, 8, -1), 7);
        assert_eq!(cycle(0, 0, 1), 0);
    }

    #[test]
    fn score_steps_stay_in_domain() {
        assert_eq!(step_score(5.95, 1, (0.0, 6.0)), 6.0);
        assert_eq!(step_score(6.0, 1, (0.0, 6.0)), 6.0);
        assert_eq!(step_score(0.0, -1, (0.0, 6.0)), 0.0);
        assert_eq!(step_score(2.0, 1, (0.0, 6.0)), 2.1);
    }

    #[test]
    fn score_entry_filters_keys() {
        assert!(accepts_score_char('7'));
        assert!(accepts_score_char(','));
        assert!(!accepts_score_char('e'));
    }

    #[test]
    fn submit_fills_result_or_status() {
        let ctx = demo_context();
        let mut app = App::new(&ctx, Lang::En);
        let visual = ctx.categories().iter().position(|c| c == "visual").unwrap();
        app.category_idx = visual;
        app.score_input = "5.0".to_string();
        app.submit();
        let p = app.last.as_ref().expect("prediction");
        assert!(p.approved);

        app.score_input = "9".to_string();
        app.submit();
        assert!(app.last.is_none());
        assert!(app.status.contains("9"));
    }

    #[test]
    fn status_messages_follow_language() {
        let ctx = demo_context();
        let mut app = App::new(&ctx, Lang::Es);
        app.write_record();
        assert_eq!(app.status, texts(Lang::Es).no_prediction);

        app.score_input = "abc".to_string();
        app.submit();
        assert_eq!(app.status, "Nota no válida 'abc'.");

        let tmp = tempfile::tempdir().expect("tmpdir");
        app.score_input = "5".to_string();
        app.submit();
        app.write_record_in(tmp.path());
        assert!(app.status.starts_with(texts(Lang::Es).record_written));
    }

    #[test]
    fn keys_drive_the_form() {
        let ctx = demo_context();
        let mut app = App::new(&ctx, Lang::En);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.category_idx, 1);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert!(app.editing_score);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('4'));
        app.handle_key(KeyCode::Enter);
        assert!(!app.editing_score);
        assert_eq!(app.last.as_ref().map(|p| p.score), Some(4.0));
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(app.lang, Lang::Es);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
