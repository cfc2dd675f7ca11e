use crate::calendar::cell_at;
use crate::choose::ChoicePrompt;
use crate::controller::{CalendarController, Clock, Command, RenderModel, View};
use crate::dashboard::Dashboard;
use crate::dialog::{Modal, Notice, Step};
use crate::help::Help;
use crate::prompt::TextPrompt;
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use log::warn;
use ratatui::{backend::Backend, buffer::Buffer, layout::Rect, Terminal};
use std::io::{self, Write};
use time::Duration;

/// Source of input events and sink for the bell
pub(crate) trait Console {
    fn read_event(&mut self) -> io::Result<Event>;

    fn beep(&mut self) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct TerminalConsole;

impl Console for TerminalConsole {
    fn read_event(&mut self) -> io::Result<Event> {
        read()
    }

    fn beep(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

/// The terminal implementation of [`View`].  It keeps the last model it was
/// given so that dialogs can be drawn on top of the calendar and the screen
/// can be redrawn after a resize.
pub(crate) struct Screen<B: Backend, K> {
    terminal: Terminal<B>,
    console: K,
    model: Option<RenderModel>,
    area: Rect,
}

impl<B: Backend, K: Console> Screen<B, K> {
    pub(crate) fn new(terminal: Terminal<B>, console: K) -> Self {
        Screen {
            terminal,
            console,
            model: None,
            area: Rect::default(),
        }
    }

    /// Area of the most recently drawn frame
    pub(crate) fn area(&self) -> Rect {
        self.area
    }

    pub(crate) fn read_event(&mut self) -> io::Result<Event> {
        self.console.read_event()
    }

    pub(crate) fn beep(&mut self) -> io::Result<()> {
        self.console.beep()
    }

    pub(crate) fn redraw(&mut self) -> io::Result<()> {
        self.draw(|_, _| ())
    }

    pub(crate) fn show_help(&mut self) -> io::Result<()> {
        self.run_modal(Help)
    }

    fn draw<F: FnOnce(Rect, &mut Buffer)>(&mut self, overlay: F) -> io::Result<()> {
        let model = self.model.as_ref();
        let frame = self.terminal.draw(|frame| {
            let area = frame.area();
            if let Some(model) = model {
                frame.render_widget(Dashboard::new(model), area);
            }
            overlay(area, frame.buffer_mut());
        })?;
        self.area = frame.area;
        Ok(())
    }

    /// Shows `modal` over the calendar and feeds it key presses until it
    /// produces its output
    fn run_modal<M: Modal>(&mut self, mut modal: M) -> io::Result<M::Output> {
        loop {
            self.draw(|area, buf| modal.render(area, buf))?;
            let event = self.console.read_event()?;
            // Anything else, such as a resize, just causes a redraw
            if let Some(key) = key_press(event) {
                let code = if is_interrupt(key) {
                    KeyCode::Esc
                } else if is_plain(key) {
                    key.code
                } else {
                    KeyCode::Null
                };
                match modal.handle_key(code) {
                    Step::Continue => (),
                    Step::Invalid => self.console.beep()?,
                    Step::Done(output) => {
                        self.redraw()?;
                        return Ok(output);
                    }
                }
            }
        }
    }
}

impl<B: Backend, K: Console> View for Screen<B, K> {
    fn render(&mut self, model: &RenderModel) -> io::Result<()> {
        self.model = Some(model.clone());
        self.redraw()
    }

    fn prompt_text(&mut self, title: &str) -> io::Result<Option<String>> {
        self.run_modal(TextPrompt::new(title))
    }

    fn prompt_choice(&mut self, title: &str, options: &[String]) -> io::Result<Option<String>> {
        self.run_modal(ChoicePrompt::new(title, options.to_vec()))
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        self.run_modal(Notice::new(message))
    }
}

/// Turns terminal input into controller commands
pub(crate) struct App<C, B: Backend, K> {
    controller: CalendarController<C>,
    screen: Screen<B, K>,
    state: AppState,
}

impl<C: Clock, B: Backend, K: Console> App<C, B, K> {
    pub(crate) fn new(controller: CalendarController<C>, screen: Screen<B, K>) -> Self {
        App {
            controller,
            screen,
            state: AppState::Running,
        }
    }

    pub(crate) fn run(mut self) -> io::Result<()> {
        self.controller.start(&mut self.screen)?;
        while !self.quitting() {
            let event = self.screen.read_event()?;
            self.handle_event(event)?;
        }
        if self.controller.is_modified() {
            warn!(
                "Quitting with unsaved changes to {}",
                self.controller.events_file().display()
            );
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        let accepted = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_interrupt(key) {
                    self.state = AppState::Quitting;
                    true
                } else {
                    is_plain(key) && self.handle_key(key.code)?
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => self.handle_click(column, row)?,
            Event::Resize(..) => {
                self.screen.redraw()?;
                true
            }
            _ => true,
        };
        if !accepted {
            self.screen.beep()?;
        }
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> io::Result<bool> {
        let command = match key {
            KeyCode::Char('h') | KeyCode::Left => self.step_days(-1),
            KeyCode::Char('l') | KeyCode::Right => self.step_days(1),
            KeyCode::Char('k') | KeyCode::Up => self.step_days(-7),
            KeyCode::Char('j') | KeyCode::Down => self.step_days(7),
            KeyCode::Char('p' | '<') | KeyCode::PageUp => Some(Command::PreviousMonth),
            KeyCode::Char('n' | '>') | KeyCode::PageDown => Some(Command::NextMonth),
            KeyCode::Char('t') | KeyCode::Home => Some(Command::Today),
            KeyCode::Char('a') | KeyCode::Enter => Some(Command::AddEvent),
            KeyCode::Char('d') | KeyCode::Delete => Some(Command::DeleteEvent),
            KeyCode::Char('s') => Some(Command::Save),
            KeyCode::Char('r') => Some(Command::Load),
            KeyCode::Char('?') => {
                self.screen.show_help()?;
                return Ok(true);
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                return Ok(true);
            }
            _ => None,
        };
        match command {
            Some(cmd) => self.controller.dispatch(cmd, &mut self.screen),
            None => Ok(false),
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> io::Result<bool> {
        let month_area = Dashboard::month_area(self.screen.area());
        let date = cell_at(month_area, column, row).and_then(|i| {
            self.controller
                .render_model()
                .cells
                .get(i)
                .and_then(|cell| cell.date)
        });
        match date {
            Some(date) => self.controller.dispatch(Command::Select(date), &mut self.screen),
            None => Ok(false),
        }
    }

    fn step_days(&self, days: i64) -> Option<Command> {
        self.controller
            .selected()
            .checked_add(Duration::days(days))
            .map(Command::Select)
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Running,
    Quitting,
}

fn key_press(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    }
}

fn is_interrupt(key: KeyEvent) -> bool {
    key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c')
}

fn is_plain(key: KeyEvent) -> bool {
    (KeyModifiers::NONE | KeyModifiers::SHIFT).contains(key.modifiers)
}
