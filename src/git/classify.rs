// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Output classification.
//!
//! ```text
//! classify(output)
//!   rule 1  local changes would be overwritten  --> MergeAbortedLocalChanges
//!   rule 2  ERROR: Repository not found         --> RemoteNotFound
//!   rule 3  no tracking information             --> RemoteBranchNotSpecified
//!   rule 4  Automatic merge failed              --> ConflictAfterMerge
//!   rule 5  Pulling is not possible (unmerged)  --> UnmergedFiles
//!   rule 6  unable to resolve reference         --> ReferenceBroken
//!   rule 7  Please tell me who you are          --> UserIdentityNotConfigured
//!   rule 8+ remote ref / auth / authorization
//!   none                                        --> Unclassified
//! ```
//!
//! First matching rule wins.

use crate::error::ErrorKind;

/// A single ordered classification rule.
struct Rule {
    needles: &'static [&'static str],
    kind: ErrorKind,
}

const RULES: &[Rule] = &[
    Rule {
        needles: &["error: Your local changes to the following files would be overwritten by merge"],
        kind: ErrorKind::MergeAbortedLocalChanges,
    },
    Rule {
        needles: &["ERROR: Repository not found"],
        kind: ErrorKind::RemoteNotFound,
    },
    Rule {
        needles: &["There is no tracking information for the current branch"],
        kind: ErrorKind::RemoteBranchNotSpecified,
    },
    Rule {
        needles: &["Automatic merge failed; fix conflicts and then commit the result"],
        kind: ErrorKind::ConflictAfterMerge,
    },
    Rule {
        needles: &["error: Pulling is not possible because you have unmerged files."],
        kind: ErrorKind::UnmergedFiles,
    },
    Rule {
        needles: &["unable to resolve reference"],
        kind: ErrorKind::ReferenceBroken,
    },
    Rule {
        needles: &["Please tell me who you are"],
        kind: ErrorKind::UserIdentityNotConfigured,
    },
    Rule {
        needles: &["couldn't find remote ref"],
        kind: ErrorKind::CouldNotFindRemoteRef,
    },
    Rule {
        needles: &[
            "Authentication failed",
            "could not read Username",
            "terminal prompts disabled",
            "authentication required",
        ],
        kind: ErrorKind::AuthenticationRequired,
    },
    Rule {
        needles: &[
            "Permission denied (publickey)",
            "The requested URL returned error: 403",
        ],
        kind: ErrorKind::AuthorizationFailed,
    },
];

/// Classify raw operation output into exactly one [`ErrorKind`].
///
/// Pure and deterministic: rules are tested in fixed priority order and the
/// first match is returned. Output matching no rule is `Unclassified`.
#[must_use]
pub fn classify(output: &str) -> ErrorKind {
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| output.contains(needle)))
        .map_or(ErrorKind::Unclassified, |rule| rule.kind)
}

/// Whether successful output reports that nothing changed.
#[must_use]
pub fn is_up_to_date(output: &str) -> bool {
    output.contains("Already up to date") || output.contains("Already up-to-date")
}
