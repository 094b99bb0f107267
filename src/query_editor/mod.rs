//! Terminal query input with autocompletion
//!
//! A single-line query editor hosting an [`Autocom`]: keys go through the
//! suggestion session first, unconsumed keys get their normal editing effect,
//! and the resulting buffer is reported back so suggestions follow the caret.

pub mod test_harness;

use crate::completion::{Autocom, Insertion, SessionState};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use tracing::debug;

/// Longest popup the editor draws
const MAX_POPUP_ROWS: usize = 8;

/// Outcome of a key press for the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    Continue,
    /// Enter pressed with no suggestion shown
    Submit(String),
    Quit,
}

/// Where the popup was last drawn, for mouse hit-testing
#[derive(Debug, Clone, Copy)]
struct PopupGeometry {
    area: Rect,
    scroll_offset: usize,
}

/// Single-line query editor state
pub struct QueryEditor {
    /// Current query text
    content: String,
    /// Caret byte offset
    cursor_pos: usize,
    /// Other end of a Shift-extended selection
    selection_anchor: Option<usize>,
    /// Whether the terminal has focus
    has_focus: bool,
    autocom: Autocom,
    /// Latest state handed to the render callback
    popup_state: Rc<RefCell<SessionState>>,
    /// Latest insertion reported through the completion hook
    last_completion: Rc<RefCell<Option<String>>>,
    popup: Option<PopupGeometry>,
    /// First visible character column of the input
    scroll_x: usize,
    status_message: String,
    /// Submitted queries, oldest first
    history: Vec<String>,
}

impl QueryEditor {
    /// Create an editor around `autocom`
    pub fn new(mut autocom: Autocom) -> Self {
        let popup_state = Rc::new(RefCell::new(SessionState::Inactive));
        let sink = Rc::clone(&popup_state);
        autocom.set_renderer(move |state: &SessionState| {
            *sink.borrow_mut() = state.clone();
        });

        let last_completion = Rc::new(RefCell::new(None));
        let completed = Rc::clone(&last_completion);
        autocom.set_completion_hook(move |insertion: &Insertion| {
            *completed.borrow_mut() = Some(insertion.candidate.clone());
        });

        let mut editor = Self {
            content: String::new(),
            cursor_pos: 0,
            selection_anchor: None,
            has_focus: true,
            autocom,
            popup_state,
            last_completion,
            popup: None,
            scroll_x: 0,
            status_message: "Tab/Enter: accept | ↑↓: select | Esc: dismiss | Ctrl-C: quit"
                .to_string(),
            history: Vec::new(),
        };
        editor.report_buffer();
        editor
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn autocom(&self) -> &Autocom {
        &self.autocom
    }

    /// What the popup currently shows (as last rendered)
    pub fn popup_state(&self) -> SessionState {
        self.popup_state.borrow().clone()
    }

    /// Replace the query text, caret at the end
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor_pos = self.content.len();
        self.selection_anchor = None;
        self.report_buffer();
    }

    /// Byte range of the selection (empty when nothing is selected)
    pub fn selection(&self) -> (usize, usize) {
        match self.selection_anchor {
            Some(anchor) => (anchor.min(self.cursor_pos), anchor.max(self.cursor_pos)),
            None => (self.cursor_pos, self.cursor_pos),
        }
    }

    fn report_buffer(&mut self) {
        let (start, end) = self.selection();
        self.autocom
            .on_buffer_changed(&self.content, start, end, self.has_focus);
    }

    fn apply_insertion(&mut self, insertion: Insertion) {
        self.content = insertion.text;
        self.cursor_pos = insertion.caret;
        self.selection_anchor = None;
        if let Some(candidate) = self.last_completion.borrow_mut().take() {
            self.status_message = format!("✓ {}", candidate);
        }
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent) -> KeyResult {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyResult::Quit
            }
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::ALT) => {
                return KeyResult::Quit
            }
            _ => {}
        }

        let outcome = self.autocom.on_key(key.into());
        let mut result = KeyResult::Continue;

        if outcome.consumed {
            if let Some(insertion) = outcome.insertion {
                self.apply_insertion(insertion);
            }
        } else {
            result = self.apply_native(key);
        }

        // The edit has landed; let the suggestions catch up with it
        self.report_buffer();
        result
    }

    /// The key's ordinary editing effect
    fn apply_native(&mut self, key: KeyEvent) -> KeyResult {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
            }
            KeyCode::Char('a') => self.move_to(0, shift),
            KeyCode::Char('e') => self.move_to(self.content.len(), shift),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_char_forward(),
            KeyCode::Left => self.move_to(self.prev_boundary(), shift),
            KeyCode::Right => self.move_to(self.next_boundary(), shift),
            KeyCode::Home => self.move_to(0, shift),
            KeyCode::End => self.move_to(self.content.len(), shift),
            KeyCode::Enter => return self.submit(),
            _ => {}
        }
        KeyResult::Continue
    }

    fn submit(&mut self) -> KeyResult {
        let query = std::mem::take(&mut self.content);
        self.cursor_pos = 0;
        self.selection_anchor = None;
        if query.trim().is_empty() {
            return KeyResult::Continue;
        }
        debug!("Submitted query: {}", query);
        self.status_message = format!("Submitted: {}", query);
        self.history.push(query.clone());
        KeyResult::Submit(query)
    }

    /// Handle mouse input; a left click on a popup row accepts it
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(popup) = self.popup else {
            return;
        };
        let inner_top = popup.area.y.saturating_add(1);
        let inner_bottom = popup
            .area
            .y
            .saturating_add(popup.area.height.saturating_sub(1));
        let inside_x = mouse.column >= popup.area.x
            && mouse.column < popup.area.x.saturating_add(popup.area.width);
        if !inside_x || mouse.row < inner_top || mouse.row >= inner_bottom {
            return;
        }

        let index = popup.scroll_offset + (mouse.row - inner_top) as usize;
        self.click_suggestion(index);
    }

    /// Accept suggestion row `index`, as a mouse click on it would
    pub fn click_suggestion(&mut self, index: usize) {
        let outcome = self.autocom.on_suggestion_clicked(index);
        if let Some(insertion) = outcome.insertion {
            self.apply_insertion(insertion);
            self.report_buffer();
        }
    }

    /// Terminal focus moved
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
        self.report_buffer();
    }

    /// Insert a character, replacing the selection
    fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.content.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    /// Delete the selection, or the character before the caret
    fn delete_char(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor_pos > 0 {
            let start = self.prev_boundary();
            self.content.replace_range(start..self.cursor_pos, "");
            self.cursor_pos = start;
        }
    }

    /// Delete the selection, or the character after the caret
    fn delete_char_forward(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor_pos < self.content.len() {
            let end = self.next_boundary();
            self.content.replace_range(self.cursor_pos..end, "");
        }
    }

    fn delete_selection(&mut self) -> bool {
        let (start, end) = self.selection();
        self.selection_anchor = None;
        if start == end {
            return false;
        }
        self.content.replace_range(start..end, "");
        self.cursor_pos = start;
        true
    }

    /// Move the caret, extending the selection when `extend` is set
    fn move_to(&mut self, pos: usize, extend: bool) {
        if extend {
            self.selection_anchor.get_or_insert(self.cursor_pos);
        } else {
            self.selection_anchor = None;
        }
        self.cursor_pos = pos;
    }

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor_pos]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor_pos..]
            .chars()
            .next()
            .map_or(self.cursor_pos, |c| self.cursor_pos + c.len_utf8())
    }

    /// Run the editor in the terminal until the user quits
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    /// Main application loop
    fn run_app(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key_event(key) == KeyResult::Quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                Event::FocusGained => self.set_focus(true),
                Event::FocusLost => self.set_focus(false),
                Event::Resize(_, _) => {
                    self.autocom.refresh();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Render the UI
    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.size());
        let input_area = chunks[0];

        // Scroll horizontally so the caret stays inside the box
        let inner_width = input_area.width.saturating_sub(2) as usize;
        let caret_col = self.content[..self.cursor_pos].chars().count();
        self.scroll_x = horizontal_scroll(caret_col, self.scroll_x, inner_width);
        let visible: String = self
            .content
            .chars()
            .skip(self.scroll_x)
            .take(inner_width)
            .collect();

        let input = Paragraph::new(visible)
            .block(Block::default().title("Query").borders(Borders::ALL))
            .style(Style::default().fg(Color::White));
        f.render_widget(input, input_area);

        let history_lines: Vec<Line> = self
            .history
            .iter()
            .rev()
            .map(|q| Line::from(Span::styled(format!("› {}", q), Style::default().fg(Color::Gray))))
            .collect();
        let history = Paragraph::new(history_lines)
            .block(Block::default().title("Submitted").borders(Borders::ALL));
        f.render_widget(history, chunks[1]);

        let status = Paragraph::new(self.status_message.as_str())
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, chunks[2]);

        // Bounded by the input width, so it fits the screen
        let screen_col = (caret_col - self.scroll_x) as u16;
        let caret_x = input_area.x.saturating_add(1).saturating_add(screen_col);
        f.set_cursor(caret_x, input_area.y.saturating_add(1));

        self.popup = None;
        let state = self.popup_state();
        if let SessionState::Active(active) = state {
            let widest = active
                .candidates
                .iter()
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0);

            let frame = f.size();
            let popup_top = input_area.y.saturating_add(2);
            let visible_rows = active.candidates.len().min(MAX_POPUP_ROWS) as u16;
            let width = widest
                .saturating_add(4)
                .min(input_area.width as usize) as u16;
            let height = (visible_rows + 2).min(frame.height.saturating_sub(popup_top));

            // Below the caret, pulled left if it would overflow the input
            let input_right = input_area.x.saturating_add(input_area.width);
            let mut x = caret_x;
            if x.saturating_add(width) > input_right {
                x = input_right.saturating_sub(width);
            }
            let area = Rect::new(x, popup_top, width, height);

            // Keep selected row visible
            let inner_rows = height.saturating_sub(2) as usize;
            let scroll_offset = if active.selected_index < inner_rows {
                0
            } else {
                active.selected_index + 1 - inner_rows
            };

            let lines: Vec<Line> = active
                .candidates
                .iter()
                .enumerate()
                .skip(scroll_offset)
                .take(inner_rows)
                .map(|(idx, candidate)| {
                    let style = if idx == active.selected_index {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    Line::from(Span::styled(candidate.clone(), style))
                })
                .collect();

            let popup = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan).bg(Color::Black)),
            );
            f.render_widget(Clear, area);
            f.render_widget(popup, area);
            self.popup = Some(PopupGeometry {
                area,
                scroll_offset,
            });
        }
    }
}

/// First visible column that keeps `caret_col` within a `width`-wide view,
/// moving as little as possible from `scroll`
fn horizontal_scroll(caret_col: usize, scroll: usize, width: usize) -> usize {
    if width == 0 {
        return caret_col;
    }
    if caret_col < scroll {
        caret_col
    } else if caret_col >= scroll + width {
        caret_col + 1 - width
    } else {
        scroll
    }
}
