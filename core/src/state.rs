//! VM allow-list store
//!
//! A JSON object mapping domain UUID to a "may be woken" flag. This file
//! is derived from inventory and form state, never hand-edited, so
//! loading never fails: anything undecodable is treated as empty.

use crate::config::ensure_parent_dir;
use crate::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Allow-list: domain UUID to "may be woken by WOL".
pub type VmState = BTreeMap<String, bool>;

/// Load the allow-list. Missing, unreadable, or undecodable files (and
/// any top-level JSON value that is not an object) yield an empty map.
pub fn load(path: &Path) -> VmState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return VmState::new(),
    };
    match serde_json::from_str::<VmState>(&raw) {
        Ok(state) => state,
        Err(e) => {
            log::debug!("ignoring undecodable allow-list {}: {}", path.display(), e);
            VmState::new()
        }
    }
}

/// Persist the allow-list as pretty-printed JSON with a trailing newline.
pub fn save(path: &Path, state: &VmState) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json + "\n")?;
    Ok(())
}
