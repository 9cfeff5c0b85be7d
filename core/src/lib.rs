//! Wolgate Core Library
//!
//! This crate manages the settings and VM allow-list consumed by the
//! wolgate Wake-on-LAN gating daemon: the hand-editable daemon config
//! file, the JSON allow-list keyed by VM UUID, live inventory queries
//! against libvirt, and the reconciliation that keeps the allow-list
//! consistent with the VMs that actually exist.

pub mod config;
pub mod daemon;
pub mod error;
pub mod libvirt;
pub mod model;
pub mod reconcile;
pub mod settings;
pub mod state;

pub use config::ConfigMap;
pub use error::{Error, Result};
pub use libvirt::LibvirtAdapter;
pub use model::{DaemonConfig, VmRecord};
pub use reconcile::reconcile;
pub use settings::{SaveOutcome, SettingsForm, SettingsHandler, SettingsPage};
pub use state::VmState;
