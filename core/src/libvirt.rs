//! Libvirt inventory queries via the virsh CLI
//!
//! Read-only: this module enumerates domains and resolves their UUIDs.
//! It never starts, stops, or defines anything. VM names reported by
//! virsh are untrusted and only ever passed back as argv elements, never
//! through a shell.

use crate::model::VmRecord;
use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Output from a command execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Adapter for libvirt inventory queries via the virsh CLI
#[derive(Debug, Clone)]
pub struct LibvirtAdapter {
    /// Program invoked for domain queries; overridable for tests and
    /// non-standard installs.
    pub virsh: PathBuf,
}

impl Default for LibvirtAdapter {
    fn default() -> Self {
        Self {
            virsh: PathBuf::from("virsh"),
        }
    }
}

impl LibvirtAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_virsh(virsh: impl Into<PathBuf>) -> Self {
        Self {
            virsh: virsh.into(),
        }
    }

    /// Run virsh with an argument vector and capture output.
    fn run_virsh(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(&self.virsh).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound(self.virsh.display().to_string())
            } else {
                Error::Command {
                    cmd: format!("{} {}", self.virsh.display(), args.join(" ")),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(parse_output(output))
    }

    /// List all domains (running and stopped), sorted ascending by name.
    ///
    /// Names whose UUID cannot be resolved are dropped: an entry without
    /// a stable identifier cannot be referenced safely. An unavailable
    /// or failing virsh yields an empty inventory, never an error — the
    /// caller treats "no VMs" as a valid, quiet state.
    pub fn list_vms(&self) -> Vec<VmRecord> {
        let output = match self.run_virsh(&["list", "--all", "--name"]) {
            Ok(output) => output,
            Err(e) => {
                log::debug!("virsh enumeration failed: {}", e);
                return Vec::new();
            }
        };
        if !output.success() {
            log::debug!("virsh enumeration exited {}: {}", output.exit_code, output.stderr.trim());
            return Vec::new();
        }

        let mut vms = Vec::new();
        for line in output.stdout.lines() {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            match self.domain_uuid(name) {
                Some(uuid) => vms.push(VmRecord {
                    name: name.to_string(),
                    uuid,
                }),
                None => log::debug!("dropping domain {:?}: no resolvable UUID", name),
            }
        }

        vms.sort_by(|a, b| a.name.cmp(&b.name));
        vms
    }

    /// Resolve the stable UUID for a domain name. None if virsh fails or
    /// reports nothing.
    pub fn domain_uuid(&self, name: &str) -> Option<String> {
        let output = self.run_virsh(&["domuuid", name]).ok()?;
        if !output.success() {
            return None;
        }
        let uuid = output.stdout.trim();
        if uuid.is_empty() {
            None
        } else {
            Some(uuid.to_string())
        }
    }
}

fn parse_output(output: Output) -> CommandOutput {
    CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
