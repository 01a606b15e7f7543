//! Submission lifecycle - the state machine between the form and the store
//!
//! The controller owns the canonical field state and drives every
//! user-visible transition: unconfigured -> submitting -> success ->
//! configured. Timers run as tokio tasks that only ever report back through
//! the event channel; all state mutation happens on the event-loop thread
//! when the owner feeds the completion back via [`SetupController::on_event`].
//! Both timer handles are aborted on re-arm and on drop, so a torn-down
//! controller can never be mutated by a stale timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{validate, SetupFields, ValidationErrors};
use crate::models::ModelCatalog;
use crate::store::{ConfigStore, StorageMedium, KEY_API_KEY, KEY_MODEL};

/// Simulated backend round-trip before persistence happens
pub const SUBMIT_DELAY: Duration = Duration::from_secs(1);
/// How long the success notice stays up before auto-dismissing
pub const SUCCESS_DWELL: Duration = Duration::from_secs(3);

/// Base phase of the form. `Submitting` holds the submit control disabled.
/// The success and configured notices are overlays tracked separately; they
/// coexist with `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    Idle,
    Submitting,
}

/// Result of a completed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every entry persisted
    Saved,
    /// The form completed but at least one entry failed to persist
    SavedWithWarning,
}

/// Timer completions delivered back through the event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupEvent {
    /// The simulated round-trip finished; persistence may proceed
    SubmitDelayElapsed,
    /// The success notice has been up long enough
    SuccessDwellElapsed,
}

pub struct SetupController<M> {
    store: ConfigStore<M>,
    catalog: ModelCatalog,
    fields: SetupFields,
    errors: ValidationErrors,
    phase: SetupPhase,
    success: Option<SubmitOutcome>,
    configured_notice: bool,
    configured: bool,
    events_tx: mpsc::UnboundedSender<SetupEvent>,
    submit_timer: Option<JoinHandle<()>>,
    dwell_timer: Option<JoinHandle<()>>,
}

impl<M: StorageMedium> SetupController<M> {
    /// Build a controller over `store` and detect prior configuration.
    ///
    /// When both entries already exist the fields are pre-populated from the
    /// stored values and the configured notice is raised. Returns the
    /// receiving end of the timer channel for the event loop to poll.
    pub fn new(
        store: ConfigStore<M>,
        catalog: ModelCatalog,
    ) -> (Self, mpsc::UnboundedReceiver<SetupEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut controller = Self {
            store,
            catalog,
            fields: SetupFields::default(),
            errors: ValidationErrors::new(),
            phase: SetupPhase::Idle,
            success: None,
            configured_notice: false,
            configured: false,
            events_tx,
            submit_timer: None,
            dwell_timer: None,
        };
        controller.detect_existing();
        (controller, events_rx)
    }

    fn detect_existing(&mut self) {
        if !(self.store.has(KEY_API_KEY) && self.store.has(KEY_MODEL)) {
            return;
        }
        self.fields.api_key = self.store.read::<String>(KEY_API_KEY).unwrap_or_default();
        self.fields.model = self.store.read::<String>(KEY_MODEL).unwrap_or_default();
        self.configured_notice = true;
        self.configured = true;
        tracing::info!("Existing configuration detected, pre-populating form");
    }

    pub fn fields(&self) -> &SetupFields {
        &self.fields
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn phase(&self) -> SetupPhase {
        self.phase
    }

    /// The submit control is live only while no submission is in flight
    pub fn submit_enabled(&self) -> bool {
        self.phase == SetupPhase::Idle
    }

    pub fn success_notice(&self) -> Option<SubmitOutcome> {
        self.success
    }

    pub fn configured_notice_visible(&self) -> bool {
        self.configured_notice
    }

    /// True iff prior configuration was found at startup. Survives notice
    /// dismissal; the submit control relabels itself on it.
    pub fn was_configured(&self) -> bool {
        self.configured
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ConfigStore<M> {
        &self.store
    }

    // ---- field edits from the UI surface ----

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.fields.api_key = api_key.into();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.fields.model = model.into();
    }

    pub fn toggle_terms(&mut self) {
        self.fields.terms_accepted = !self.fields.terms_accepted;
    }

    // ---- lifecycle ----

    /// Validate and, if clean, enter `Submitting`. On validation failure the
    /// phase stays `Idle` and every problem lands in `errors` at once.
    pub fn handle_submit(&mut self) {
        if self.phase == SetupPhase::Submitting {
            return;
        }

        self.errors = validate(&self.fields, &self.catalog);
        if !self.errors.is_empty() {
            tracing::debug!("Submit blocked by {} validation error(s)", self.errors.len());
            return;
        }

        self.phase = SetupPhase::Submitting;
        self.arm_submit_timer();
    }

    /// Feed a timer completion back into the state machine
    pub fn on_event(&mut self, event: SetupEvent) {
        match event {
            SetupEvent::SubmitDelayElapsed => {
                if self.phase != SetupPhase::Submitting {
                    // Stale fire from an aborted-but-delivered timer.
                    return;
                }
                let outcome = self.persist_fields();
                self.fields = SetupFields::default();
                self.phase = SetupPhase::Idle;
                self.success = Some(outcome);
                self.arm_dwell_timer();
            }
            SetupEvent::SuccessDwellElapsed => {
                self.success = None;
            }
        }
    }

    /// User closed the "configuration detected" banner
    pub fn dismiss_configured_notice(&mut self) {
        self.configured_notice = false;
    }

    /// User closed the success notice before the dwell timer fired
    pub fn dismiss_success(&mut self) {
        self.success = None;
        if let Some(handle) = self.dwell_timer.take() {
            handle.abort();
        }
    }

    /// Write both entries, patching existing ones and creating absent ones.
    /// The existence check decides between `create` and `update` so that
    /// unrelated fields of a pre-existing record entry survive a re-submit.
    fn persist_fields(&mut self) -> SubmitOutcome {
        let entries = [
            (KEY_API_KEY, self.fields.api_key.clone()),
            (KEY_MODEL, self.fields.model.clone()),
        ];

        let mut all_persisted = true;
        for (key, value) in entries {
            if self.store.has(key) {
                all_persisted &= self.store.update(key, &value);
            } else {
                self.store.create(key, &value);
                all_persisted &= self.store.has(key);
            }
        }

        if all_persisted {
            tracing::info!("Setup persisted");
            SubmitOutcome::Saved
        } else {
            tracing::warn!("Setup completed but some entries failed to persist");
            SubmitOutcome::SavedWithWarning
        }
    }

    fn arm_submit_timer(&mut self) {
        if let Some(handle) = self.submit_timer.take() {
            handle.abort();
        }
        let tx = self.events_tx.clone();
        self.submit_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(SUBMIT_DELAY).await;
            let _ = tx.send(SetupEvent::SubmitDelayElapsed);
        }));
    }

    fn arm_dwell_timer(&mut self) {
        if let Some(handle) = self.dwell_timer.take() {
            handle.abort();
        }
        let tx = self.events_tx.clone();
        self.dwell_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(SUCCESS_DWELL).await;
            let _ = tx.send(SetupEvent::SuccessDwellElapsed);
        }));
    }
}

impl<M> Drop for SetupController<M> {
    fn drop(&mut self) {
        if let Some(handle) = self.submit_timer.take() {
            handle.abort();
        }
        if let Some(handle) = self.dwell_timer.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MediumError, MemoryMedium};
    use pretty_assertions::assert_eq;

    fn controller() -> (
        SetupController<MemoryMedium>,
        mpsc::UnboundedReceiver<SetupEvent>,
    ) {
        SetupController::new(
            ConfigStore::new(MemoryMedium::new()),
            ModelCatalog::new(),
        )
    }

    fn fill_valid(controller: &mut SetupController<impl StorageMedium>) {
        controller.set_api_key("sk-eleven-123");
        controller.set_model("mistral-large-latest");
        controller.toggle_terms();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_store_starts_idle_without_notice() {
        let (controller, _rx) = controller();
        assert_eq!(controller.phase(), SetupPhase::Idle);
        assert!(!controller.configured_notice_visible());
        assert_eq!(controller.success_notice(), None);
        assert_eq!(controller.fields(), &SetupFields::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_submit_surfaces_all_errors_and_stays_idle() {
        let (mut controller, mut rx) = controller();
        controller.handle_submit();

        assert_eq!(controller.errors().len(), 3);
        assert_eq!(controller.phase(), SetupPhase::Idle);
        // No timer was armed.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_submit_persists_resets_and_auto_dismisses() {
        let (mut controller, mut rx) = controller();
        fill_valid(&mut controller);

        controller.handle_submit();
        assert!(controller.errors().is_empty());
        assert_eq!(controller.phase(), SetupPhase::Submitting);
        assert!(!controller.submit_enabled());

        // Simulated round-trip completes.
        let event = rx.recv().await.unwrap();
        assert_eq!(event, SetupEvent::SubmitDelayElapsed);
        controller.on_event(event);

        assert_eq!(controller.phase(), SetupPhase::Idle);
        assert_eq!(controller.success_notice(), Some(SubmitOutcome::Saved));
        assert_eq!(controller.fields(), &SetupFields::default());
        assert_eq!(
            controller.store().read::<String>(KEY_API_KEY).as_deref(),
            Some("sk-eleven-123")
        );
        assert_eq!(
            controller.store().read::<String>(KEY_MODEL).as_deref(),
            Some("mistral-large-latest")
        );

        // Dwell timer auto-dismisses the notice.
        let event = rx.recv().await.unwrap();
        assert_eq!(event, SetupEvent::SuccessDwellElapsed);
        controller.on_event(event);
        assert_eq!(controller.success_notice(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_prefills_and_raises_notice() {
        let mut store = ConfigStore::new(MemoryMedium::new());
        store.create(KEY_API_KEY, &"stored-key");
        store.create(KEY_MODEL, &"mistral-large-latest");

        let (controller, _rx) = SetupController::new(store, ModelCatalog::new());
        assert!(controller.configured_notice_visible());
        assert_eq!(controller.fields().api_key, "stored-key");
        assert_eq!(controller.fields().model, "mistral-large-latest");
        assert_eq!(controller.phase(), SetupPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_requires_both_entries() {
        let mut store = ConfigStore::new(MemoryMedium::new());
        store.create(KEY_API_KEY, &"stored-key");

        let (controller, _rx) = SetupController::new(store, ModelCatalog::new());
        assert!(!controller.configured_notice_visible());
        assert_eq!(controller.fields().api_key, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_patches_instead_of_recreating() {
        let mut store = ConfigStore::new(MemoryMedium::new());
        store.create(KEY_API_KEY, &"old-key");
        store.create(KEY_MODEL, &"mistral-small-latest");

        let (mut controller, mut rx) = SetupController::new(store, ModelCatalog::new());
        controller.dismiss_configured_notice();
        controller.set_api_key("new-key");
        controller.set_model("mistral-large-latest");
        controller.toggle_terms();

        controller.handle_submit();
        let event = rx.recv().await.unwrap();
        controller.on_event(event);

        assert_eq!(
            controller.store().read::<String>(KEY_API_KEY).as_deref(),
            Some("new-key")
        );
        assert_eq!(
            controller.store().read::<String>(KEY_MODEL).as_deref(),
            Some("mistral-large-latest")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_while_submitting_is_ignored() {
        let (mut controller, mut rx) = controller();
        fill_valid(&mut controller);

        controller.handle_submit();
        assert_eq!(controller.phase(), SetupPhase::Submitting);

        // Second submit is a no-op while the control is disabled.
        controller.handle_submit();
        let _ = rx.recv().await.unwrap();
        // Only one delay event was produced.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_delay_event_in_idle_is_ignored() {
        let (mut controller, _rx) = controller();
        controller.on_event(SetupEvent::SubmitDelayElapsed);
        assert_eq!(controller.phase(), SetupPhase::Idle);
        assert_eq!(controller.success_notice(), None);
        assert!(!controller.store().has(KEY_API_KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_success_dismissal_cancels_dwell() {
        let (mut controller, mut rx) = controller();
        fill_valid(&mut controller);
        controller.handle_submit();

        let event = rx.recv().await.unwrap();
        controller.on_event(event);
        assert!(controller.success_notice().is_some());

        controller.dismiss_success();
        assert_eq!(controller.success_notice(), None);
        // The aborted dwell timer never reports back.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_configured_notice() {
        let mut store = ConfigStore::new(MemoryMedium::new());
        store.create(KEY_API_KEY, &"k");
        store.create(KEY_MODEL, &"mistral-large-latest");

        let (mut controller, _rx) = SetupController::new(store, ModelCatalog::new());
        assert!(controller.configured_notice_visible());
        controller.dismiss_configured_notice();
        assert!(!controller.configured_notice_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_timers() {
        let (mut controller, mut rx) = controller();
        fill_valid(&mut controller);
        controller.handle_submit();

        // Tear the controller down while the delay is still pending.
        drop(controller);

        // The aborted timer never delivers; the channel just closes.
        assert_eq!(rx.recv().await, None);
    }

    // Medium that accepts reads but rejects every mutation.
    struct RejectingMedium;

    impl StorageMedium for RejectingMedium {
        fn get(&self, _key: &str) -> Result<Option<String>, MediumError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), MediumError> {
            Err(MediumError::Io(std::io::Error::other("quota exceeded")))
        }
        fn remove(&mut self, _key: &str) -> Result<(), MediumError> {
            Err(MediumError::Io(std::io::Error::other("quota exceeded")))
        }
        fn clear(&mut self) -> Result<(), MediumError> {
            Err(MediumError::Io(std::io::Error::other("quota exceeded")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_fault_reports_success_with_warning() {
        let (mut controller, mut rx) =
            SetupController::new(ConfigStore::new(RejectingMedium), ModelCatalog::new());
        fill_valid(&mut controller);

        controller.handle_submit();
        let event = rx.recv().await.unwrap();
        controller.on_event(event);

        // The lifecycle still completes; the notice carries the warning.
        assert_eq!(controller.phase(), SetupPhase::Idle);
        assert_eq!(
            controller.success_notice(),
            Some(SubmitOutcome::SavedWithWarning)
        );
        assert_eq!(controller.fields(), &SetupFields::default());
    }

    // End-to-end pass over a fresh medium: open, submit, dwell, settle.
    #[tokio::test(start_paused = true)]
    async fn test_full_first_run_flow() {
        let (mut controller, mut rx) = controller();
        assert_eq!(controller.phase(), SetupPhase::Idle);
        assert!(!controller.configured_notice_visible());

        controller.set_api_key("sk-eleven-123");
        controller.set_model("mistral-large-latest");
        controller.toggle_terms();
        controller.handle_submit();
        assert_eq!(controller.phase(), SetupPhase::Submitting);

        let event = rx.recv().await.unwrap();
        controller.on_event(event);
        assert_eq!(controller.success_notice(), Some(SubmitOutcome::Saved));
        assert!(controller.fields().api_key.is_empty());
        assert!(controller.store().has(KEY_API_KEY));
        assert!(controller.store().has(KEY_MODEL));

        let event = rx.recv().await.unwrap();
        controller.on_event(event);
        assert_eq!(controller.success_notice(), None);
        assert_eq!(controller.phase(), SetupPhase::Idle);
    }
}
