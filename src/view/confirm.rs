/// A destructive action waiting for the user to confirm it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete { id: i64, label: String },
    DiscardChanges,
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Delete { label, .. } => {
                format!("Are you sure you want to delete this job record? ({})", label)
            }
            PendingAction::DiscardChanges => {
                "Are you sure you want to exit? Unsaved changes will be lost.".to_string()
            }
        }
    }
}

/// Request, then confirm or cancel. At most one action is pending; a new
/// request replaces the old one.
#[derive(Debug, Default)]
pub struct Confirmation {
    pending: Option<PendingAction>,
}

impl Confirmation {
    pub fn request(&mut self, action: PendingAction) -> &PendingAction {
        self.pending.insert(action)
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Hands back the confirmed action for the caller to execute.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub fn cancel(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }
}
