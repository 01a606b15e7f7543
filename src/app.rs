use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use arboard::Clipboard;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    Terminal,
};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::components::setup_form::FORM_WIDTH;
use crate::components::{Component, SetupForm};
use crate::error::{Result, SetupError};
use crate::setup::{SetupController, SetupEvent};
use crate::store::StorageMedium;

const TICK_INTERVAL_MS: u64 = 120;

pub struct App<M> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_quit: bool,
    needs_redraw: bool,
    last_tick: Instant,
    controller: SetupController<M>,
    setup_events: mpsc::UnboundedReceiver<SetupEvent>,
    setup_form: SetupForm,
    clipboard: Option<Clipboard>,
}

impl<M: StorageMedium> App<M> {
    pub fn new(
        controller: SetupController<M>,
        setup_events: mpsc::UnboundedReceiver<SetupEvent>,
    ) -> Result<Self> {
        enable_raw_mode().map_err(|e| SetupError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .map_err(|e| SetupError::Terminal(e.to_string()))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| SetupError::Terminal(e.to_string()))?;

        let clipboard = Clipboard::new().ok();

        Ok(Self {
            terminal,
            should_quit: false,
            needs_redraw: true,
            last_tick: Instant::now(),
            controller,
            setup_events,
            setup_form: SetupForm::new(),
            clipboard,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            // ---- 1. Poll non-input sources ----

            while let Ok(setup_event) = self.setup_events.try_recv() {
                self.dispatch(Action::Setup(setup_event))?;
                self.mark_dirty();
            }

            // Tick (drives the submit spinner)
            if self.last_tick.elapsed() >= Duration::from_millis(TICK_INTERVAL_MS) {
                self.setup_form.update(&Action::Tick);
                self.last_tick = Instant::now();
                self.mark_dirty();
            }

            if self.should_quit {
                break;
            }

            // ---- 2. Poll user input ----

            if event::poll(Duration::from_millis(16))
                .map_err(|e| SetupError::Terminal(e.to_string()))?
            {
                let event = event::read().map_err(|e| SetupError::Terminal(e.to_string()))?;
                self.mark_dirty();

                if let Some(action) = self.handle_event(event) {
                    self.dispatch(action)?;
                }
            }

            if self.should_quit {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.needs_redraw {
                self.draw()?;
                self.needs_redraw = false;
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn handle_event(&mut self, event: CrosstermEvent) -> Option<Action> {
        match event {
            CrosstermEvent::Key(key) => self.handle_key(key),
            CrosstermEvent::Paste(_) => self.setup_form.handle_event(&event),
            CrosstermEvent::Resize(_, _) => Some(Action::None),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        // Global keys come first; everything else belongs to the form.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        if key.code == KeyCode::Esc {
            if self.controller.success_notice().is_some() {
                return Some(Action::DismissSuccess);
            }
            if self.controller.configured_notice_visible() {
                return Some(Action::DismissConfiguredNotice);
            }
            return Some(Action::Quit);
        }

        self.setup_form.handle_event(&CrosstermEvent::Key(key))
    }

    fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                self.setup_form.update(&Action::Tick);
            }

            Action::ApiKeyInput(c) => {
                let mut api_key = self.controller.fields().api_key.clone();
                api_key.push(c);
                self.controller.set_api_key(api_key);
            }
            Action::ApiKeyBackspace => {
                let mut api_key = self.controller.fields().api_key.clone();
                api_key.pop();
                self.controller.set_api_key(api_key);
            }
            Action::ApiKeyClear => {
                self.controller.set_api_key(String::new());
            }
            Action::ApiKeyPasteClipboard => {
                let text = self
                    .clipboard
                    .as_mut()
                    .and_then(|clipboard| clipboard.get_text().ok());
                if let Some(text) = text {
                    self.append_api_key(&text);
                }
            }
            Action::ApiKeyPasteText(text) => {
                self.append_api_key(&text);
            }

            Action::ModelNext => {
                self.cycle_model(1);
            }
            Action::ModelPrev => {
                self.cycle_model(-1);
            }
            Action::TermsToggle => {
                self.controller.toggle_terms();
            }

            Action::Submit => {
                self.controller.handle_submit();
            }
            Action::DismissConfiguredNotice => {
                self.controller.dismiss_configured_notice();
            }
            Action::DismissSuccess => {
                self.controller.dismiss_success();
            }
            Action::Setup(event) => {
                self.controller.on_event(event);
            }

            Action::None => {}
        }
        Ok(())
    }

    /// Append pasted text to the API key, keeping only printable ASCII
    /// (keys never contain control characters or newlines)
    fn append_api_key(&mut self, text: &str) {
        let mut api_key = self.controller.fields().api_key.clone();
        api_key.extend(text.chars().filter(|c| c.is_ascii_graphic()));
        self.controller.set_api_key(api_key);
    }

    fn cycle_model(&mut self, step: isize) {
        let catalog = self.controller.catalog();
        let models = catalog.list();
        if models.is_empty() {
            return;
        }
        let len = models.len() as isize;
        let next = match catalog.position(&self.controller.fields().model) {
            Some(current) => (current as isize + step).rem_euclid(len) as usize,
            // Nothing selected yet: either direction lands on an end.
            None => {
                if step >= 0 {
                    0
                } else {
                    models.len() - 1
                }
            }
        };
        let model = models[next].id.clone();
        self.controller.set_model(model);
    }

    fn draw(&mut self) -> Result<()> {
        self.setup_form.sync(&self.controller);
        let form = &self.setup_form;

        self.terminal
            .draw(|frame| {
                let screen = frame.area();
                let area = centered_rect(FORM_WIDTH, form.desired_height(), screen);
                form.render(frame, area, true);
            })
            .map_err(|e| SetupError::Terminal(e.to_string()))?;

        Ok(())
    }
}

impl<M> Drop for App<M> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_centers_within_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(58, 20, area);
        assert_eq!(rect.width, 58);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 21);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn test_centered_rect_clamps_to_small_areas() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_rect(58, 20, area);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 10);
    }
}
