//! Status transition tables
//!
//! Each status enum lists the statuses it may move to. Writing the current
//! status again is always accepted.

use crate::error::{AppError, ErrorCode};

/// A record status with an explicit transition table
pub trait StatusTransition: Copy + Eq + std::fmt::Debug + 'static {
    /// Error code reported for a rejected transition
    const TRANSITION_ERROR: ErrorCode;

    /// Statuses reachable from `self`
    fn allowed_next(self) -> &'static [Self];

    /// Wire label (as stored)
    fn label(self) -> &'static str;

    fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next().contains(&next)
    }

    /// Validate `self -> next`
    fn check_transition(self, next: Self) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::invalid_transition(
                Self::TRANSITION_ERROR,
                self.label(),
                next.label(),
            ))
        }
    }

    /// No outgoing transitions
    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}
