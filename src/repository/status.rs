// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Work-status state machine.
//!
//! ```text
//!             add_job                start
//!  Available ---------> Queued ------------> Working
//!     ^  ^  <---------    ^                 /   |   \
//!     |  |   removed      |          ok    /    |    \  auth required
//!     |  |                |               v     v     v
//!     |  +------------ Success          Fail        Paused
//!     |                   |               |            |
//!     +-------------------+---------------+            |
//!               re-queue: Success/Fail --> Queued       |
//!               credentials supplied: Paused --> Queued-+
//! ```

use std::fmt;

use serde::Serialize;

/// Batch progress of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum WorkStatus {
    #[default]
    Available,
    Queued,
    Working,
    Success,
    Fail,
    Paused,
}

impl WorkStatus {
    /// Whether the state machine permits `self -> next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use WorkStatus::{Available, Fail, Paused, Queued, Success, Working};
        matches!(
            (self, next),
            (Available | Success | Fail | Paused, Queued)
                | (Queued, Working | Available)
                | (Working, Success | Fail | Paused)
                | (Success | Fail | Paused, Available)
        )
    }

    /// Whether a job is pending or running for the repository.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Queued | Self::Working)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Queued => "queued",
            Self::Working => "working",
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
