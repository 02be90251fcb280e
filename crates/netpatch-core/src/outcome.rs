//! Per-request outcomes and the run report

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::ApplyError;
use crate::resolve::Unresolved;

/// Resolved primary names of a subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub rx_device: String,
    pub rx_channel: String,
    pub tx_device: String,
    pub tx_channel: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} <- {}@{}",
            self.rx_channel, self.rx_device, self.tx_channel, self.tx_device
        )
    }
}

/// Terminal state of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Resolved and applied
    Applied { route: Route },
    /// Resolved, but the apply operation failed
    ApplyFailed {
        route: Route,
        #[serde(serialize_with = "display_string")]
        error: ApplyError,
    },
    /// One of the four names did not resolve
    Unresolved { reason: Unresolved },
}

/// Classification of an [`Outcome`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Applied,
    ApplyFailed,
    Unresolved,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Applied { .. } => OutcomeKind::Applied,
            Outcome::ApplyFailed { .. } => OutcomeKind::ApplyFailed,
            Outcome::Unresolved { .. } => OutcomeKind::Unresolved,
        }
    }

    /// The resolved route, if resolution succeeded
    pub fn route(&self) -> Option<&Route> {
        match self {
            Outcome::Applied { route } | Outcome::ApplyFailed { route, .. } => Some(route),
            Outcome::Unresolved { .. } => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::Unresolved { .. })
    }
}

fn display_string<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub requested: usize,
    pub applied: usize,
    pub failed: usize,
    pub unresolved: usize,
}

/// Ordered outcomes of one pipeline run, one per request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            requested: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome.kind() {
                OutcomeKind::Applied => summary.applied += 1,
                OutcomeKind::ApplyFailed => summary.failed += 1,
                OutcomeKind::Unresolved => summary.unresolved += 1,
            }
        }
        summary
    }

    /// True if every request was applied (vacuously true for no requests)
    pub fn all_applied(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_applied)
    }
}

impl IntoIterator for Report {
    type Item = Outcome;
    type IntoIter = std::vec::IntoIter<Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
