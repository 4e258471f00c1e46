use std::path::PathBuf;

use crate::engine::ConfirmAction;
use crate::mode::DrawingMode;

/// Notifications the engine sends to subscribed observers
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ModeChanged {
        old: Option<DrawingMode>,
        new: DrawingMode,
    },
    ParamsChanged,
    /// A snapshot was pushed or popped
    HistoryChanged {
        len: usize,
    },
    /// Message meant for the user
    Alert(String),
    ImageLoaded {
        name: String,
        width: u32,
        height: u32,
    },
    Saved {
        path: PathBuf,
    },
    ConfirmationRequested(ConfirmAction),
    /// Main surface and history were wiped
    Reset,
}
