//! Setup form core - field state, validation, and the submission lifecycle

mod controller;
mod validate;

pub use controller::{
    SetupController, SetupEvent, SetupPhase, SubmitOutcome, SUBMIT_DELAY, SUCCESS_DWELL,
};
pub use validate::{validate, Field, ValidationError, ValidationErrors};

/// Form field state. Owned by the controller, edited through it, and reset
/// to defaults after a completed submission. Never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupFields {
    pub api_key: String,
    pub model: String,
    pub terms_accepted: bool,
}
