//! Snapshot differ: decides which parts of a fresh payload are new.
//!
//! The agent remembers the last payload it fetched (the snapshot) and
//! compares each new payload against it using the policy of the active
//! [`Mode`]:
//!
//! - `check_channel` treats the payload as one unit and emits it whenever
//!   it differs from the snapshot.
//! - `check_playlist` emits every item with no structurally equal item in
//!   the snapshot.
//! - `check_videos` emits every item whose `id` matches no item in the
//!   snapshot.
//!
//! In every case the fresh payload becomes the next snapshot.

use serde_json::Value;

use crate::memory::LoadResult;
use crate::youtube::{Comparison, Mode, items};

/// The remembered snapshot as seen by the differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    /// Nothing remembered yet (first run, `null`, or unreadable memory).
    Absent,
    /// Something is remembered but it is a blank string.
    Blank,
    /// A previously fetched payload.
    Present(Value),
}

impl Prior {
    /// Interprets a memory lookup as a prior snapshot.
    ///
    /// A stored `null` counts as absent. A stored empty or whitespace-only
    /// string counts as [`Prior::Blank`]. Corrupted memory is logged and
    /// treated as absent so the next write replaces it.
    #[must_use]
    pub fn from_memory(result: LoadResult) -> Self {
        match result {
            LoadResult::Loaded(Value::Null) | LoadResult::NotFound => Self::Absent,
            LoadResult::Loaded(Value::String(s)) if s.trim().is_empty() => Self::Blank,
            LoadResult::Loaded(value) => Self::Present(value),
            LoadResult::Corrupted { reason } => {
                tracing::warn!("Remembered snapshot unreadable ({reason}), starting fresh");
                Self::Absent
            }
        }
    }
}

/// Result of comparing a fresh payload against the prior snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    /// Emit-worthy fragments, in payload order.
    pub emit: Vec<Value>,
    /// The snapshot to remember for the next run.
    pub remember: Value,
}

impl Diff {
    /// Returns true if nothing is emit-worthy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emit.is_empty()
    }
}

/// Compares `current` against `prior` under the policy of `mode`.
///
/// The returned [`Diff::remember`] is always `current`. For list modes
/// `current` is expected to carry an `items` array; a missing list reads
/// as empty.
#[must_use]
pub fn diff(mode: Mode, prior: &Prior, current: Value) -> Diff {
    let emit = match mode.comparison() {
        Comparison::WholePayload => diff_whole(prior, &current),
        Comparison::ItemStructural => diff_items(prior, &current, |new, old| new == old),
        Comparison::ItemField(name) => {
            diff_items(prior, &current, |new, old| new.get(name) == old.get(name))
        }
    };

    Diff {
        emit,
        remember: current,
    }
}

/// Whole-payload policy: emit the payload unless it equals the prior one.
fn diff_whole(prior: &Prior, current: &Value) -> Vec<Value> {
    match prior {
        Prior::Present(old) if old == current => Vec::new(),
        Prior::Absent | Prior::Blank | Prior::Present(_) => vec![current.clone()],
    }
}

/// Per-item policy: emit items for which `seen` matches no prior item.
fn diff_items<F>(prior: &Prior, current: &Value, seen: F) -> Vec<Value>
where
    F: Fn(&Value, &Value) -> bool,
{
    match prior {
        Prior::Absent => items(current).to_vec(),
        Prior::Present(old) if old == current => Vec::new(),
        // Present but blank: nothing to compare against, nothing emitted.
        Prior::Blank => Vec::new(),
        Prior::Present(old) => {
            let old_items = items(old);
            items(current)
                .iter()
                .filter(|&item| !old_items.iter().any(|o| seen(item, o)))
                .cloned()
                .collect()
        }
    }
}

/// Describes a comparison for debug logs, one line per finding.
#[must_use]
pub fn explain(prior: &Prior, outcome: &Diff) -> Vec<String> {
    match prior {
        Prior::Absent => vec!["Nothing remembered, nothing to compare".to_string()],
        Prior::Blank => vec!["Remembered snapshot is blank, nothing to compare".to_string()],
        Prior::Present(_) if outcome.is_empty() => {
            vec!["Everything found in the remembered snapshot".to_string()]
        }
        Prior::Present(_) => outcome
            .emit
            .iter()
            .map(|fragment| format!("Not found in the remembered snapshot: {}", label(fragment)))
            .collect(),
    }
}

/// Short identifier of a fragment: its `id`, or "payload" when it has none.
fn label(fragment: &Value) -> String {
    fragment
        .get("id")
        .map_or_else(|| "payload".to_string(), Value::to_string)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
