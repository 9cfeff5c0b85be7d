//! Settings request flow
//!
//! The two request shapes the admin surface supports: a non-mutating
//! view of current settings plus live inventory, and a save that
//! validates the submission, rewrites the config, reconciles the
//! allow-list against live inventory, and signals the daemon. Within a
//! save the order is fixed: load, validate, override, fetch inventory,
//! reconcile, persist, signal. Any error before the signal aborts the
//! request without claiming a restart.

use crate::config::{self, ConfigMap};
use crate::libvirt::LibvirtAdapter;
use crate::model::{self, VmRecord};
use crate::reconcile::reconcile;
use crate::state::{self, VmState};
use crate::{daemon, Error, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// An admin submission. Field values arrive as the form carries them:
/// free text for everything but the enabled flag and the selection set.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub enabled: bool,
    pub interface: String,
    pub udp_ports: String,
    pub allow_subnets: String,
    pub debounce_seconds: String,
    /// UUIDs whose wake checkbox was checked. A UUID absent from this
    /// set was displayed unchecked, not "unchanged".
    pub selected: BTreeSet<String>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            enabled: false,
            interface: "br0".to_string(),
            udp_ports: "7,9".to_string(),
            allow_subnets: String::new(),
            debounce_seconds: "10".to_string(),
            selected: BTreeSet::new(),
        }
    }
}

/// Everything a settings page displays.
#[derive(Debug, Clone)]
pub struct SettingsPage {
    pub config: ConfigMap,
    pub vm_state: VmState,
    pub vms: Vec<VmRecord>,
}

/// Result of a completed save.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub config: ConfigMap,
    pub vm_state: VmState,
    pub vms: Vec<VmRecord>,
    /// Whether the daemon control script was invoked. The save succeeded
    /// either way.
    pub daemon_signaled: bool,
}

/// Handles settings requests against a fixed set of paths.
#[derive(Debug, Clone)]
pub struct SettingsHandler {
    pub config_path: PathBuf,
    /// Canonical allow-list path. Saves always re-derive VM_STATE_PATH
    /// to this value; it is not user-editable.
    pub state_path: PathBuf,
    pub rc_script: PathBuf,
    pub libvirt: LibvirtAdapter,
}

impl Default for SettingsHandler {
    fn default() -> Self {
        Self {
            config_path: config::config_path(),
            state_path: config::vm_state_path(),
            rc_script: daemon::rc_script_path(),
            libvirt: LibvirtAdapter::new(),
        }
    }
}

impl SettingsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load current settings, the allow-list, and live inventory for
    /// display. No mutation.
    pub fn view(&self) -> Result<SettingsPage> {
        let cfg = config::load(&self.config_path)?;
        let state_path = cfg
            .get(config::KEY_VM_STATE_PATH)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.state_path.clone());
        let vm_state = state::load(&state_path);
        let vms = self.libvirt.list_vms();
        Ok(SettingsPage {
            config: cfg,
            vm_state,
            vms,
        })
    }

    /// Apply a submission: validate, rewrite the config, rebuild the
    /// allow-list from live inventory, and ask the daemon to restart.
    pub fn save(&self, form: &SettingsForm) -> Result<SaveOutcome> {
        let mut cfg = config::load(&self.config_path)?;

        validate_form(form)?;

        cfg.insert(
            config::KEY_ENABLED.to_string(),
            if form.enabled { "yes" } else { "no" }.to_string(),
        );
        cfg.insert(
            config::KEY_INTERFACE.to_string(),
            form.interface.trim().to_string(),
        );
        cfg.insert(
            config::KEY_UDP_PORTS.to_string(),
            form.udp_ports.trim().to_string(),
        );
        cfg.insert(
            config::KEY_ALLOW_SUBNETS.to_string(),
            form.allow_subnets.trim().to_string(),
        );
        cfg.insert(
            config::KEY_DEBOUNCE_SECONDS.to_string(),
            form.debounce_seconds.trim().to_string(),
        );
        cfg.insert(
            config::KEY_VM_STATE_PATH.to_string(),
            self.state_path.display().to_string(),
        );

        let vms = self.libvirt.list_vms();
        let vm_state = reconcile(&vms, &form.selected);

        config::save(&self.config_path, &cfg)?;
        state::save(&self.state_path, &vm_state)?;

        let daemon_signaled = daemon::request_restart(&self.rc_script);

        Ok(SaveOutcome {
            config: cfg,
            vm_state,
            vms,
            daemon_signaled,
        })
    }
}

fn validate_form(form: &SettingsForm) -> Result<()> {
    model::validate_interface(form.interface.trim()).map_err(Error::validation)?;
    model::parse_ports(&form.udp_ports).map_err(Error::validation)?;
    model::validate_subnets(&form.allow_subnets).map_err(Error::validation)?;
    let debounce = form.debounce_seconds.trim();
    if debounce.parse::<u64>().is_err() {
        return Err(Error::validation(format!(
            "invalid debounce seconds: {:?}",
            debounce
        )));
    }
    Ok(())
}
