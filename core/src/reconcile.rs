//! Allow-list reconciliation
//!
//! Derives a fresh allow-list from live inventory and the identifiers the
//! admin selected in the current submission.

use crate::model::VmRecord;
use crate::state::VmState;
use std::collections::BTreeSet;

/// Build the new allow-list from current inventory and the submitted
/// selection set.
///
/// Every identifier in `inventory` gets an entry, true iff it appears in
/// `selected`; identifiers absent from inventory get none. The result is
/// a pure function of the two arguments: the previous allow-list is
/// deliberately not consulted, so a VM deleted or renamed (new UUID)
/// loses its entry and a VM that briefly drops out of enumeration during
/// the save window loses its setting. The latter is a known limitation
/// of rebuilding from live inventory.
pub fn reconcile(inventory: &[VmRecord], selected: &BTreeSet<String>) -> VmState {
    inventory
        .iter()
        .map(|vm| (vm.uuid.clone(), selected.contains(&vm.uuid)))
        .collect()
}
