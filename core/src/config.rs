//! Daemon settings file management
//!
//! The daemon config is a flat, hand-editable `KEY="value"` file. Loading
//! is lenient (comment lines, blank lines, and lines without a separator
//! are skipped); saving always writes the full recognized key set in a
//! fixed order so the file stays self-documenting.

use crate::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Raw settings record: recognized keys to string values.
pub type ConfigMap = BTreeMap<String, String>;

/// Settings directory on an appliance install (persists across reboots).
pub const PLUGIN_DIR: &str = "/boot/config/plugins/wolgate";

pub const KEY_ENABLED: &str = "ENABLED";
pub const KEY_INTERFACE: &str = "INTERFACE";
pub const KEY_UDP_PORTS: &str = "UDP_PORTS";
pub const KEY_ALLOW_SUBNETS: &str = "ALLOW_SUBNETS";
pub const KEY_DEBOUNCE_SECONDS: &str = "DEBOUNCE_SECONDS";
pub const KEY_VM_STATE_PATH: &str = "VM_STATE_PATH";

/// Directory holding the config and allow-list files.
///
/// Prefers the plugin directory when it exists; falls back to the user
/// config directory on development machines.
pub fn settings_dir() -> PathBuf {
    let plugin = PathBuf::from(PLUGIN_DIR);
    if plugin.is_dir() {
        return plugin;
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("wolgate")
}

/// Default path of the daemon config file.
pub fn config_path() -> PathBuf {
    settings_dir().join("wolgate.cfg")
}

/// Canonical path of the VM allow-list file.
pub fn vm_state_path() -> PathBuf {
    settings_dir().join("vms.json")
}

/// Load the settings file into a raw key/value map.
///
/// A missing file yields an empty map. Any other read failure is an IO
/// error: a config file that exists but cannot be read must not silently
/// degrade to defaults.
pub fn load(path: &Path) -> Result<ConfigMap> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfigMap::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(parse(&content))
}

/// Parse `KEY="value"` settings content.
///
/// Skips blank lines and `#`/`;` comments, ignores lines without `=`,
/// trims whitespace around key and value, and strips one layer of
/// matching surrounding quotes from the value.
pub fn parse(content: &str) -> ConfigMap {
    let mut map = ConfigMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            map.insert(key.to_string(), unquote(value.trim()).to_string());
        }
    }
    map
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Write the settings file.
///
/// Exactly the recognized keys are written, in a fixed order, with
/// defaults filling any key absent from the map; unrecognized keys are
/// dropped. An empty `ALLOW_SUBNETS` is written as a commented-out
/// example line rather than an empty assignment.
pub fn save(path: &Path, cfg: &ConfigMap) -> Result<()> {
    ensure_parent_dir(path)?;

    let get = |key: &str, default: &str| -> String {
        match cfg.get(key) {
            Some(value) => value.clone(),
            None => default.to_string(),
        }
    };

    let mut lines = Vec::new();
    lines.push("# wolgate settings".to_string());
    lines.push(format!("ENABLED=\"{}\"", get(KEY_ENABLED, "no")));
    lines.push(format!("INTERFACE=\"{}\"", get(KEY_INTERFACE, "br0")));
    lines.push(format!("UDP_PORTS=\"{}\"", get(KEY_UDP_PORTS, "7,9")));
    match cfg.get(KEY_ALLOW_SUBNETS) {
        Some(subnets) if !subnets.is_empty() => {
            lines.push(format!("ALLOW_SUBNETS=\"{}\"", subnets));
        }
        _ => {
            lines.push("# ALLOW_SUBNETS=\"192.168.1.0/24,10.0.0.0/8\"".to_string());
        }
    }
    lines.push(format!(
        "DEBOUNCE_SECONDS=\"{}\"",
        get(KEY_DEBOUNCE_SECONDS, "10")
    ));
    lines.push(format!(
        "VM_STATE_PATH=\"{}\"",
        get(KEY_VM_STATE_PATH, &vm_state_path().display().to_string())
    ));

    fs::write(path, lines.join("\n") + "\n")?;
    Ok(())
}

/// Create the parent directory of `path` if missing.
///
/// Directories are created group-readable (mode 0775) so the web UI and
/// the daemon can both reach them.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o775);
            }
            builder.create(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let cfg = load(&dir.path().join("nope.cfg")).unwrap();
        assert!(cfg.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        // A directory at the config path is readable as a path but not as
        // a file; this must surface, not degrade to defaults.
        let dir = tempdir().unwrap();
        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn test_parse_quotes_and_comments() {
        let content = r#"
# comment
; also a comment
ENABLED="yes"
INTERFACE='br0'
UDP_PORTS=7,9
BROKEN LINE
=novalue
ODD=va"lue
EMPTY=""
"#;
        let cfg = parse(content);
        assert_eq!(cfg.get("ENABLED").map(String::as_str), Some("yes"));
        assert_eq!(cfg.get("INTERFACE").map(String::as_str), Some("br0"));
        assert_eq!(cfg.get("UDP_PORTS").map(String::as_str), Some("7,9"));
        assert_eq!(cfg.get("ODD").map(String::as_str), Some("va\"lue"));
        assert_eq!(cfg.get("EMPTY").map(String::as_str), Some(""));
        assert!(!cfg.contains_key("BROKEN LINE"));
        assert!(!cfg.contains_key(""));
    }

    #[test]
    fn test_comment_only_file_saves_full_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wolgate.cfg");

        let cfg = parse("# nothing here\n\n; still nothing\n");
        assert!(cfg.is_empty());

        save(&path, &cfg).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# wolgate settings\n"));
        assert!(written.contains("ENABLED=\"no\"\n"));
        assert!(written.contains("INTERFACE=\"br0\"\n"));
        assert!(written.contains("UDP_PORTS=\"7,9\"\n"));
        assert!(written.contains("# ALLOW_SUBNETS=\"192.168.1.0/24,10.0.0.0/8\"\n"));
        assert!(written.contains("DEBOUNCE_SECONDS=\"10\"\n"));
        assert!(written.contains("VM_STATE_PATH=\""));
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wolgate.cfg");

        let mut cfg = ConfigMap::new();
        cfg.insert(KEY_ENABLED.to_string(), "yes".to_string());
        cfg.insert(KEY_INTERFACE.to_string(), "br1".to_string());
        cfg.insert(KEY_UDP_PORTS.to_string(), "7,9,40000".to_string());
        cfg.insert(KEY_ALLOW_SUBNETS.to_string(), "192.168.1.0/24".to_string());
        cfg.insert(KEY_VM_STATE_PATH.to_string(), "/tmp/vms.json".to_string());
        cfg.insert("UNRECOGNIZED".to_string(), "junk".to_string());

        save(&path, &cfg).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.get(KEY_ENABLED).map(String::as_str), Some("yes"));
        assert_eq!(loaded.get(KEY_INTERFACE).map(String::as_str), Some("br1"));
        assert_eq!(
            loaded.get(KEY_UDP_PORTS).map(String::as_str),
            Some("7,9,40000")
        );
        assert_eq!(
            loaded.get(KEY_ALLOW_SUBNETS).map(String::as_str),
            Some("192.168.1.0/24")
        );
        assert_eq!(
            loaded.get(KEY_DEBOUNCE_SECONDS).map(String::as_str),
            Some("10")
        );
        assert_eq!(
            loaded.get(KEY_VM_STATE_PATH).map(String::as_str),
            Some("/tmp/vms.json")
        );
        assert!(!loaded.contains_key("UNRECOGNIZED"));
    }

    #[test]
    fn test_empty_subnets_round_trips_to_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wolgate.cfg");

        let mut cfg = ConfigMap::new();
        cfg.insert(KEY_ALLOW_SUBNETS.to_string(), String::new());
        save(&path, &cfg).unwrap();

        let loaded = load(&path).unwrap();
        assert!(!loaded.contains_key(KEY_ALLOW_SUBNETS));
    }
}
