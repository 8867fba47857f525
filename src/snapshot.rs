/// Read-only view of the typing queue handed to renderers
use crate::line::{ActiveLine, ProcessedLine};
use serde::Serialize;

/// State emitted after every change to the printed lines, the active line or
/// the running flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Fully typed lines, oldest first
    pub printed: Vec<ProcessedLine>,

    /// The line being typed, empty between lines
    pub active: ActiveLine,

    /// Whether a drain loop is in progress
    pub is_running: bool,
}

impl Snapshot {
    pub fn new(printed: Vec<ProcessedLine>, active: ActiveLine, is_running: bool) -> Self {
        Snapshot {
            printed,
            active,
            is_running,
        }
    }

    /// Nothing printed, nothing typing, not running
    pub fn is_blank(&self) -> bool {
        self.printed.is_empty() && self.active.is_empty() && !self.is_running
    }
}
