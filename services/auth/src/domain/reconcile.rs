//! Device-index reconciliation.
//!
//! Session records expire passively via store TTLs while the index key does
//! not, so the index accumulates ids whose records are gone. Listing and
//! bulk revocation reconcile the two; the split itself is pure so it can be
//! tested without a store.

use crate::domain::types::DeviceSession;

/// Outcome of matching a device index against the records it points at.
#[derive(Debug, Default)]
pub struct Reconciled {
    pub live: Vec<DeviceSession>,
    pub stale: Vec<String>,
}

/// Split index entries into live sessions and stale ids with no backing
/// record. `sessions` is positional with `device_ids`.
pub fn split_live(device_ids: &[String], sessions: Vec<Option<DeviceSession>>) -> Reconciled {
    let mut out = Reconciled::default();
    for (device_id, session) in device_ids.iter().zip(sessions) {
        match session {
            Some(session) => out.live.push(session),
            None => out.stale.push(device_id.clone()),
        }
    }
    out
}
