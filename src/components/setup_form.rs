//! Setup form component
//!
//! Renders the API key / model / terms form and translates raw input into
//! actions. All canonical field state lives in the controller; this component
//! keeps only presentation state (focus, mask visibility, spinner frame) plus
//! a per-frame snapshot of what it renders.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::components::banner::{BannerLevel, NoticeBanner};
use crate::components::Component;
use crate::setup::{
    Field, SetupController, SetupFields, SetupPhase, SubmitOutcome, ValidationErrors,
};
use crate::store::StorageMedium;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const FORM_WIDTH: u16 = 58;

/// Focusable controls, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    ApiKey,
    Model,
    Terms,
    Submit,
}

impl FormFocus {
    pub const ALL: &'static [FormFocus] = &[
        FormFocus::ApiKey,
        FormFocus::Model,
        FormFocus::Terms,
        FormFocus::Submit,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Per-frame view of the controller, cloned in by [`SetupForm::sync`]
#[derive(Debug, Clone, Default)]
pub struct FormSnapshot {
    pub fields: SetupFields,
    pub errors: ValidationErrors,
    pub submitting: bool,
    pub success: Option<SubmitOutcome>,
    pub configured_notice: bool,
    pub configured: bool,
    pub model_label: Option<String>,
}

pub struct SetupForm {
    focus: FormFocus,
    /// Whether the masked API key is currently shown in plain text
    show_plain: bool,
    spinner_frame: usize,
    snapshot: FormSnapshot,
}

impl SetupForm {
    pub fn new() -> Self {
        Self {
            focus: FormFocus::ApiKey,
            show_plain: false,
            spinner_frame: 0,
            snapshot: FormSnapshot::default(),
        }
    }

    /// Refresh the render snapshot from the controller
    pub fn sync<M: StorageMedium>(&mut self, controller: &SetupController<M>) {
        self.snapshot = FormSnapshot {
            fields: controller.fields().clone(),
            errors: controller.errors().clone(),
            submitting: controller.phase() == SetupPhase::Submitting,
            success: controller.success_notice(),
            configured_notice: controller.configured_notice_visible(),
            configured: controller.was_configured(),
            model_label: controller
                .catalog()
                .get(&controller.fields().model)
                .map(|m| m.label.clone()),
        };
    }

    pub fn focus(&self) -> FormFocus {
        self.focus
    }

    pub fn mask_shown_plain(&self) -> bool {
        self.show_plain
    }

    fn next_focus(&mut self) {
        let next = (self.focus.index() + 1) % FormFocus::ALL.len();
        self.focus = FormFocus::ALL[next];
    }

    fn prev_focus(&mut self) {
        let len = FormFocus::ALL.len();
        let prev = (self.focus.index() + len - 1) % len;
        self.focus = FormFocus::ALL[prev];
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.next_focus();
                return Some(Action::None);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prev_focus();
                return Some(Action::None);
            }
            KeyCode::Enter => {
                if self.focus == FormFocus::Submit {
                    if self.snapshot.submitting {
                        return Some(Action::None);
                    }
                    return Some(Action::Submit);
                }
                self.next_focus();
                return Some(Action::None);
            }
            _ => {}
        }

        match self.focus {
            FormFocus::ApiKey => match key.code {
                KeyCode::Char('u') if ctrl => {
                    self.show_plain = !self.show_plain;
                    Some(Action::None)
                }
                KeyCode::Char('k') if ctrl => Some(Action::ApiKeyClear),
                KeyCode::Char('v') if ctrl => Some(Action::ApiKeyPasteClipboard),
                KeyCode::Backspace => Some(Action::ApiKeyBackspace),
                KeyCode::Char(c) if !ctrl => Some(Action::ApiKeyInput(c)),
                _ => None,
            },
            FormFocus::Model => match key.code {
                KeyCode::Left | KeyCode::Char('h') => Some(Action::ModelPrev),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    Some(Action::ModelNext)
                }
                _ => None,
            },
            FormFocus::Terms => match key.code {
                KeyCode::Char(' ') => Some(Action::TermsToggle),
                _ => None,
            },
            FormFocus::Submit => match key.code {
                KeyCode::Char(' ') => {
                    if self.snapshot.submitting {
                        Some(Action::None)
                    } else {
                        Some(Action::Submit)
                    }
                }
                _ => None,
            },
        }
    }

    /// Rows the form needs at its current state
    pub fn desired_height(&self) -> u16 {
        let mut rows: u16 = 3; // title, subtitle, spacer
        if self.snapshot.configured_notice {
            rows += self.configured_banner().height();
        }
        if let Some(outcome) = self.snapshot.success {
            rows += self.success_banner(outcome).height();
        }
        rows += 4; // api key box + error row
        rows += 4; // model box + error row
        rows += 2; // terms row + error row
        rows += 3; // submit button
        rows
    }

    fn configured_banner(&self) -> NoticeBanner {
        NoticeBanner::new(BannerLevel::Info, "Configuration detected")
            .with_message("Your API key and model are already configured.")
            .with_dismiss_hint("Esc to dismiss")
    }

    fn success_banner(&self, outcome: SubmitOutcome) -> NoticeBanner {
        match outcome {
            SubmitOutcome::Saved => {
                NoticeBanner::new(BannerLevel::Success, "Setup completed successfully!")
            }
            SubmitOutcome::SavedWithWarning => {
                NoticeBanner::new(BannerLevel::Warning, "Setup completed with warnings")
                    .with_message("Some settings could not be saved. See the log file.")
            }
        }
    }

    fn error_line(&self, field: Field) -> Line<'static> {
        match self.snapshot.errors.get(&field) {
            Some(error) => Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(""),
        }
    }

    fn field_block(&self, title: &'static str, focused: bool) -> Block<'static> {
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
    }
}

impl Default for SetupForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SetupForm {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.focus == FormFocus::ApiKey => {
                Some(Action::ApiKeyPasteText(text.clone()))
            }
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        if matches!(action, Action::Tick) && self.snapshot.submitting {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _focused: bool) {
        frame.render_widget(Clear, area);

        let mut constraints = vec![
            Constraint::Length(1), // title
            Constraint::Length(1), // subtitle
            Constraint::Length(1), // spacer
        ];
        if self.snapshot.configured_notice {
            constraints.push(Constraint::Length(self.configured_banner().height()));
        }
        if let Some(outcome) = self.snapshot.success {
            constraints.push(Constraint::Length(self.success_banner(outcome).height()));
        }
        constraints.extend([
            Constraint::Length(3), // api key
            Constraint::Length(1), // api key error
            Constraint::Length(3), // model
            Constraint::Length(1), // model error
            Constraint::Length(1), // terms
            Constraint::Length(1), // terms error
            Constraint::Length(3), // submit
            Constraint::Min(0),
        ]);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let mut next = 0usize;
        let mut chunk = || {
            let rect = chunks[next];
            next += 1;
            rect
        };

        // Header
        frame.render_widget(
            Paragraph::new(Span::styled(
                "ELEVEN CHATS",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunk(),
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Set up your API key and select a model to get started.",
                Style::default().fg(Color::Gray),
            ))
            .alignment(Alignment::Center),
            chunk(),
        );
        chunk(); // spacer

        // Notices
        if self.snapshot.configured_notice {
            self.configured_banner().render(frame, chunk());
        }
        if let Some(outcome) = self.snapshot.success {
            self.success_banner(outcome).render(frame, chunk());
        }

        // API key
        let api_key = &self.snapshot.fields.api_key;
        let api_key_line = if api_key.is_empty() {
            Line::from(Span::styled(
                "Enter your API key",
                Style::default().fg(Color::DarkGray),
            ))
        } else if self.show_plain {
            Line::from(api_key.clone())
        } else {
            Line::from("•".repeat(api_key.chars().count()))
        };
        frame.render_widget(
            Paragraph::new(api_key_line).block(
                self.field_block(Field::ApiKey.as_str(), self.focus == FormFocus::ApiKey),
            ),
            chunk(),
        );
        frame.render_widget(Paragraph::new(self.error_line(Field::ApiKey)), chunk());

        // Model
        let model_line = match &self.snapshot.model_label {
            Some(label) => Line::from(format!("◂ {label} ▸")),
            None => Line::from(Span::styled(
                "Select a model (◂ ▸ to cycle)",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(
            Paragraph::new(model_line)
                .block(self.field_block(Field::Model.as_str(), self.focus == FormFocus::Model)),
            chunk(),
        );
        frame.render_widget(Paragraph::new(self.error_line(Field::Model)), chunk());

        // Terms
        let checkbox = if self.snapshot.fields.terms_accepted {
            "[x]"
        } else {
            "[ ]"
        };
        let terms_style = if self.focus == FormFocus::Terms {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{checkbox} Accept terms and conditions"),
                terms_style,
            ))),
            chunk(),
        );
        frame.render_widget(
            Paragraph::new(self.error_line(Field::TermsAccepted)),
            chunk(),
        );

        // Submit
        let submit_label = if self.snapshot.submitting {
            format!(
                "{} Submitting...",
                SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
            )
        } else if self.snapshot.configured {
            "Update Configuration".to_string()
        } else {
            "Submit".to_string()
        };
        let submit_style = if self.snapshot.submitting {
            Style::default().fg(Color::DarkGray)
        } else if self.focus == FormFocus::Submit {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(submit_label, submit_style))
                .alignment(Alignment::Center)
                .block(self.field_block("", self.focus == FormFocus::Submit)),
            chunk(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl_key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn test_tab_cycles_focus_in_order() {
        let mut form = SetupForm::new();
        assert_eq!(form.focus(), FormFocus::ApiKey);
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(form.focus(), FormFocus::Model);
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(form.focus(), FormFocus::Terms);
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(form.focus(), FormFocus::Submit);
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(form.focus(), FormFocus::ApiKey);
    }

    #[test]
    fn test_backtab_cycles_backwards() {
        let mut form = SetupForm::new();
        let _ = form.handle_event(&key(KeyCode::BackTab));
        assert_eq!(form.focus(), FormFocus::Submit);
    }

    #[test]
    fn test_typing_into_api_key_field() {
        let mut form = SetupForm::new();
        assert_eq!(
            form.handle_event(&key(KeyCode::Char('s'))),
            Some(Action::ApiKeyInput('s'))
        );
        assert_eq!(
            form.handle_event(&key(KeyCode::Backspace)),
            Some(Action::ApiKeyBackspace)
        );
    }

    #[test]
    fn test_mask_toggle_is_component_internal() {
        let mut form = SetupForm::new();
        assert!(!form.mask_shown_plain());
        assert_eq!(form.handle_event(&ctrl_key('u')), Some(Action::None));
        assert!(form.mask_shown_plain());
        let _ = form.handle_event(&ctrl_key('u'));
        assert!(!form.mask_shown_plain());
    }

    #[test]
    fn test_clear_and_paste_shortcuts() {
        let mut form = SetupForm::new();
        assert_eq!(form.handle_event(&ctrl_key('k')), Some(Action::ApiKeyClear));
        assert_eq!(
            form.handle_event(&ctrl_key('v')),
            Some(Action::ApiKeyPasteClipboard)
        );
    }

    #[test]
    fn test_paste_event_targets_api_key_only() {
        let mut form = SetupForm::new();
        assert_eq!(
            form.handle_event(&Event::Paste("sk-123".to_string())),
            Some(Action::ApiKeyPasteText("sk-123".to_string()))
        );
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(form.handle_event(&Event::Paste("sk-123".to_string())), None);
    }

    #[test]
    fn test_model_field_cycles_with_arrows() {
        let mut form = SetupForm::new();
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(
            form.handle_event(&key(KeyCode::Right)),
            Some(Action::ModelNext)
        );
        assert_eq!(
            form.handle_event(&key(KeyCode::Left)),
            Some(Action::ModelPrev)
        );
    }

    #[test]
    fn test_space_toggles_terms() {
        let mut form = SetupForm::new();
        let _ = form.handle_event(&key(KeyCode::Tab));
        let _ = form.handle_event(&key(KeyCode::Tab));
        assert_eq!(
            form.handle_event(&key(KeyCode::Char(' '))),
            Some(Action::TermsToggle)
        );
    }

    #[test]
    fn test_enter_on_submit_emits_submit() {
        let mut form = SetupForm::new();
        let _ = form.handle_event(&key(KeyCode::BackTab));
        assert_eq!(form.focus(), FormFocus::Submit);
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), Some(Action::Submit));
    }

    #[test]
    fn test_enter_elsewhere_advances_focus() {
        let mut form = SetupForm::new();
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), Some(Action::None));
        assert_eq!(form.focus(), FormFocus::Model);
    }

    #[test]
    fn test_submit_disabled_while_submitting() {
        let mut form = SetupForm::new();
        form.snapshot.submitting = true;
        let _ = form.handle_event(&key(KeyCode::BackTab));
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), Some(Action::None));
        assert_eq!(
            form.handle_event(&key(KeyCode::Char(' '))),
            Some(Action::None)
        );
    }

    #[test]
    fn test_spinner_advances_only_while_submitting() {
        let mut form = SetupForm::new();
        form.update(&Action::Tick);
        assert_eq!(form.spinner_frame, 0);
        form.snapshot.submitting = true;
        form.update(&Action::Tick);
        assert_eq!(form.spinner_frame, 1);
    }
}
