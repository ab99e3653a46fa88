//! Main TUI application state and logic
//!
//! The app holds a finished trace and moves a cursor over it. Stepping,
//! autoplay and jumping only change the cursor; the program is never run
//! again.

use crate::describe::describe_frame;
use crate::snapshot::{Frame as TraceFrame, FrameStatus, LogLine};
use crate::translator::Translator;
use crate::ui::panes::{self, SourceScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Variables,
    Log,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> variables -> log)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    frames: Vec<TraceFrame>,
    log_lines: Vec<LogLine>,
    translator: Arc<Translator>,
    source_code: String,

    /// Index of the frame being shown
    position: usize,

    pub focused_pane: FocusedPane,
    source_scroll: SourceScrollState,
    variables_scroll: usize,
    log_scroll: usize,

    pub should_quit: bool,
    pub is_playing: bool,
    last_play_time: Instant,
    last_space_press: Instant,
}

impl App {
    pub fn new(frames: Vec<TraceFrame>, log_lines: Vec<LogLine>, translator: Arc<Translator>, source_code: String) -> Self {
        let now = Instant::now();
        App {
            frames,
            log_lines,
            translator,
            source_code,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: 0,
            log_scroll: 0,
            should_quit: false,
            is_playing: false,
            last_play_time: now,
            last_space_press: now.checked_sub(Duration::from_secs(1)).unwrap_or(now),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_frame(&self) -> Option<&TraceFrame> {
        self.frames.get(self.position)
    }

    /// Move one frame forward. Returns `false` at the last frame.
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 < self.frames.len() {
            self.position += 1;
            self.log_scroll = usize::MAX;
            true
        } else {
            false
        }
    }

    /// Move one frame back. Returns `false` at the first frame.
    pub fn step_backward(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.frames.len().saturating_sub(1);
        self.log_scroll = usize::MAX;
    }

    pub fn jump_to_start(&mut self) {
        self.position = 0;
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if !self.step_forward() {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Right column: Variables (top) | Console (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let current = self.frames.get(self.position);
        let line = current.map_or(0, |f| f.line);
        let is_error = current.is_some_and(|f| f.status == FrameStatus::Error);
        let description = match current {
            Some(f) => describe_frame(f, &self.translator),
            None => "Nothing to show: the program produced no steps.".to_string(),
        };

        panes::render_source_pane(
            frame,
            columns[0],
            &self.source_code,
            line,
            is_error,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let empty = Default::default();
        let variables = current.map_or(&empty, |f| &f.variables);
        let previous = self.position.checked_sub(1).and_then(|i| self.frames.get(i));
        let changed = panes::changed_names(variables, previous.map(|f| &f.variables));
        panes::render_variables_pane(
            frame,
            right_rows[0],
            variables,
            &changed,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        let time = current.map_or(0, |f| f.time);
        panes::render_log_pane(
            frame,
            right_rows[1],
            panes::visible_log_lines(&self.log_lines, time),
            self.focused_pane == FocusedPane::Log,
            &mut self.log_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &description,
            self.position,
            self.frames.len(),
            is_error,
            self.is_playing,
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => self.scroll(-1),
            KeyCode::Down => self.scroll(1),
            KeyCode::Char(' ') => {
                // Debounce key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to_start();
            }
            _ => {}
        }
    }

    fn scroll(&mut self, delta: isize) {
        match self.focused_pane {
            // Moving the view up pushes the current line down the screen
            FocusedPane::Source => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add_signed(-delta));
                }
            }
            FocusedPane::Variables => self.variables_scroll = self.variables_scroll.saturating_add_signed(delta),
            FocusedPane::Log => self.log_scroll = self.log_scroll.saturating_add_signed(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::api::{interpret, EvaluationContext};

    fn app(source: &str) -> App {
        let result = interpret(source, &EvaluationContext::default());
        App::new(result.frames, result.log_lines, Arc::new(Translator::english()), source.to_string())
    }

    #[test]
    fn test_seeking_moves_over_recorded_frames() {
        let mut app = app("let x = 1;\nx = 2;\nx = 3;");
        assert_eq!(app.position(), 0);
        assert!(!app.step_backward());
        assert!(app.step_forward());
        assert!(app.step_forward());
        assert!(!app.step_forward());
        assert_eq!(app.current_frame().unwrap().line, 3);

        app.jump_to_start();
        assert_eq!(app.current_frame().unwrap().line, 1);
        app.jump_to_end();
        assert_eq!(app.position(), 2);
    }

    #[test]
    fn test_keys_drive_the_cursor() {
        let mut app = app("let x = 1;\nx = 2;");
        app.handle_key_event(KeyEvent::from(KeyCode::Right));
        assert_eq!(app.position(), 1);
        app.handle_key_event(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(app.position(), 0);
        app.handle_key_event(KeyEvent::from(KeyCode::Tab));
        assert_eq!(app.focused_pane, FocusedPane::Variables);
        app.handle_key_event(KeyEvent::from(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_empty_trace() {
        let mut app = app("");
        assert!(app.current_frame().is_none());
        assert!(!app.step_forward());
        app.jump_to_end();
        assert_eq!(app.position(), 0);
    }
}
