use crate::setup::SetupEvent;

/// Everything the UI surface can ask the application to do. Components
/// translate raw input into these; the app loop owns dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Tick,

    // API key field edits
    ApiKeyInput(char),
    ApiKeyBackspace,
    ApiKeyClear,
    ApiKeyPasteClipboard,
    ApiKeyPasteText(String),

    // Model select
    ModelNext,
    ModelPrev,

    // Terms checkbox
    TermsToggle,

    // Lifecycle
    Submit,
    DismissConfiguredNotice,
    DismissSuccess,
    Setup(SetupEvent),

    /// Handled internally by a component; redraw only
    None,
}
