pub mod banner;
pub mod setup_form;

use crossterm::event::Event;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;

pub use setup_form::SetupForm;

pub trait Component {
    fn handle_event(&mut self, event: &Event) -> Option<Action>;

    fn update(&mut self, action: &Action);

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool);
}
