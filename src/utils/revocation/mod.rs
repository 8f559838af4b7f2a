//! Per period revocation bookkeeping.
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Which users lost which attribute in which time period.
///
/// Key issuance consults the list under the same lock that `revoke` takes,
/// so a revocation sequenced before a `keygen` call is always observed.
#[derive(Debug, Default)]
pub struct RevocationList {
    entries: Mutex<HashMap<u64, HashMap<String, HashSet<String>>>>,
}

impl RevocationList {
    pub fn new() -> RevocationList {
        RevocationList {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Revokes `attribute` for `gid` in `period`. Idempotent.
    pub fn revoke(&self, gid: &str, attribute: &str, period: u64) {
        let mut entries = self.entries.lock().unwrap();
        entries
            .entry(period)
            .or_default()
            .entry(attribute.to_string())
            .or_default()
            .insert(gid.to_string());
    }

    pub fn is_revoked(&self, gid: &str, attribute: &str, period: u64) -> bool {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&period)
            .and_then(|attrs| attrs.get(attribute))
            .map(|gids| gids.contains(gid))
            .unwrap_or(false)
    }

    /// The subset of `attributes` that is not revoked for `(gid, period)`.
    pub fn filter(&self, gid: &str, attributes: &[String], period: u64) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        attributes
            .iter()
            .filter(|attribute| {
                entries
                    .get(&period)
                    .and_then(|attrs| attrs.get(*attribute))
                    .map(|gids| !gids.contains(gid))
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    /// All users revoked for `attribute` in `period`.
    pub fn revoked_gids(&self, attribute: &str, period: u64) -> HashSet<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&period)
            .and_then(|attrs| attrs.get(attribute))
            .cloned()
            .unwrap_or_default()
    }
}
