//! Lifecycle filter: enforces which policy statuses a question may see.

use crate::types::{LifecycleStatus, RetrievedMatch, VisibilityMode};

impl VisibilityMode {
    /// Statuses permitted under this mode. `Old` is never permitted.
    pub fn allowed_statuses(&self) -> &'static [LifecycleStatus] {
        match self {
            Self::ActiveOnly => &[LifecycleStatus::Active],
            Self::IncludeDraft => &[LifecycleStatus::Active, LifecycleStatus::Draft],
        }
    }

    pub fn permits(&self, status: LifecycleStatus) -> bool {
        self.allowed_statuses().contains(&status)
    }
}

/// Keep only the matches whose status `mode` permits, preserving order.
pub fn filter(
    matches: impl IntoIterator<Item = RetrievedMatch>,
    mode: VisibilityMode,
) -> Vec<RetrievedMatch> {
    let mut dropped = 0usize;
    let kept: Vec<RetrievedMatch> = matches
        .into_iter()
        .filter(|m| {
            let keep = mode.permits(m.status());
            if !keep {
                dropped += 1;
                tracing::debug!(source = %m.source(), status = %m.status(), "Filtered out");
            }
            keep
        })
        .collect();

    tracing::info!(mode = %mode, kept = kept.len(), dropped, "Applied lifecycle filter");
    kept
}
