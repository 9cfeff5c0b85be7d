//! Domain model types: inventory records and the typed daemon config view

use crate::config::{self, ConfigMap};
use std::net::IpAddr;
use std::path::PathBuf;

/// A live VM as reported by libvirt. Request-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRecord {
    /// Human-readable domain name (may change across renames).
    pub name: String,
    /// Stable domain UUID (survives renames).
    pub uuid: String,
}

/// Typed view over the raw settings record, as the daemon reads it.
///
/// Derivation is lenient: missing or unparseable values fall back to the
/// documented defaults. This mirrors how the daemon treats its own config
/// file; strict validation belongs to the save path, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub enabled: bool,
    pub interface: String,
    pub udp_ports: Vec<u16>,
    pub allow_subnets: Vec<String>,
    pub debounce_seconds: u64,
    pub vm_state_path: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interface: "br0".to_string(),
            udp_ports: vec![7, 9],
            allow_subnets: Vec::new(),
            debounce_seconds: 10,
            vm_state_path: config::vm_state_path(),
        }
    }
}

impl DaemonConfig {
    /// Build the typed view from a raw settings map.
    pub fn from_map(cfg: &ConfigMap) -> Self {
        let mut out = Self::default();

        if let Some(v) = cfg.get(config::KEY_ENABLED) {
            out.enabled = parse_bool(v);
        }
        if let Some(v) = cfg.get(config::KEY_INTERFACE) {
            if !v.trim().is_empty() {
                out.interface = v.trim().to_string();
            }
        }
        if let Some(v) = cfg.get(config::KEY_UDP_PORTS) {
            if let Ok(ports) = parse_ports(v) {
                out.udp_ports = ports;
            }
        }
        if let Some(v) = cfg.get(config::KEY_ALLOW_SUBNETS) {
            out.allow_subnets = split_csv(v);
        }
        if let Some(v) = cfg.get(config::KEY_DEBOUNCE_SECONDS) {
            if let Ok(n) = v.trim().parse::<u64>() {
                out.debounce_seconds = n;
            }
        }
        if let Some(v) = cfg.get(config::KEY_VM_STATE_PATH) {
            if !v.trim().is_empty() {
                out.vm_state_path = PathBuf::from(v.trim());
            }
        }

        out
    }
}

/// Parse a config boolean the way the daemon does.
///
/// Accepts `1`, `true`, `yes`, `on`, `enable`, `enabled` (any case);
/// everything else is false.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enable" | "enabled"
    )
}

/// Parse a comma-separated UDP port list.
///
/// Every entry must be an integer in 1..=65535; an empty list is an error
/// (a daemon with no listen ports is a misconfiguration).
pub fn parse_ports(s: &str) -> Result<Vec<u16>, String> {
    let parts = split_csv(s);
    if parts.is_empty() {
        return Err("UDP port list is empty".to_string());
    }
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        match part.parse::<u32>() {
            Ok(n) if (1..=65535).contains(&n) => out.push(n as u16),
            _ => return Err(format!("invalid UDP port: {:?}", part)),
        }
    }
    Ok(out)
}

/// Split a comma-separated value, trimming whitespace and stray quotes
/// and dropping empty entries.
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Validate a network interface name (e.g. `br0`, `eth0.10`, `bond0:1`).
pub fn validate_interface(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Interface name cannot be empty".to_string());
    }
    if name.len() > 15 {
        return Err("Interface name must be 15 characters or less".to_string());
    }
    let re = regex::Regex::new(r"^[A-Za-z0-9._:-]+$").unwrap();
    if !re.is_match(name) {
        return Err(
            "Interface name must contain only letters, numbers, dots, underscores, colons, and hyphens"
                .to_string(),
        );
    }
    Ok(())
}

/// Validate a comma-separated CIDR subnet list. An empty list is allowed
/// (no source restriction).
pub fn validate_subnets(s: &str) -> Result<(), String> {
    for entry in split_csv(s) {
        let (addr, prefix) = entry
            .split_once('/')
            .ok_or_else(|| format!("subnet {:?} is not in CIDR form", entry))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| format!("subnet {:?} has an invalid address", entry))?;
        let max_prefix = if addr.is_ipv4() { 32 } else { 128 };
        match prefix.parse::<u8>() {
            Ok(n) if n <= max_prefix => {}
            _ => return Err(format!("subnet {:?} has an invalid prefix length", entry)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_tokens() {
        for token in ["1", "true", "YES", "On", "enable", "Enabled", " yes "] {
            assert!(parse_bool(token), "expected {:?} to be true", token);
        }
        for token in ["", "no", "0", "false", "off", "nonsense"] {
            assert!(!parse_bool(token), "expected {:?} to be false", token);
        }
    }

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("7,9").unwrap(), vec![7, 9]);
        assert_eq!(parse_ports(" 7 , 9 , 40000 ").unwrap(), vec![7, 9, 40000]);
        assert!(parse_ports("").is_err());
        assert!(parse_ports("0").is_err());
        assert!(parse_ports("65536").is_err());
        assert!(parse_ports("7,abc").is_err());
    }

    #[test]
    fn test_validate_interface() {
        assert!(validate_interface("br0").is_ok());
        assert!(validate_interface("eth0.10").is_ok());
        assert!(validate_interface("bond0:1").is_ok());
        assert!(validate_interface("").is_err());
        assert!(validate_interface("br0; rm -rf /").is_err());
        assert!(validate_interface("averylonginterfacename").is_err());
    }

    #[test]
    fn test_validate_subnets() {
        assert!(validate_subnets("").is_ok());
        assert!(validate_subnets("192.168.1.0/24").is_ok());
        assert!(validate_subnets("192.168.1.0/24,10.0.0.0/8").is_ok());
        assert!(validate_subnets("fd00::/8").is_ok());
        assert!(validate_subnets("192.168.1.0").is_err());
        assert!(validate_subnets("192.168.1.0/33").is_err());
        assert!(validate_subnets("not-an-addr/24").is_err());
    }

    #[test]
    fn test_daemon_config_defaults() {
        let cfg = DaemonConfig::from_map(&ConfigMap::new());
        assert!(!cfg.enabled);
        assert_eq!(cfg.interface, "br0");
        assert_eq!(cfg.udp_ports, vec![7, 9]);
        assert!(cfg.allow_subnets.is_empty());
        assert_eq!(cfg.debounce_seconds, 10);
    }

    #[test]
    fn test_daemon_config_from_map() {
        let mut map = ConfigMap::new();
        map.insert("ENABLED".to_string(), "yes".to_string());
        map.insert("INTERFACE".to_string(), "br1".to_string());
        map.insert("UDP_PORTS".to_string(), "9".to_string());
        map.insert("ALLOW_SUBNETS".to_string(), "10.0.0.0/8".to_string());
        map.insert("DEBOUNCE_SECONDS".to_string(), "30".to_string());

        let cfg = DaemonConfig::from_map(&map);
        assert!(cfg.enabled);
        assert_eq!(cfg.interface, "br1");
        assert_eq!(cfg.udp_ports, vec![9]);
        assert_eq!(cfg.allow_subnets, vec!["10.0.0.0/8".to_string()]);
        assert_eq!(cfg.debounce_seconds, 30);
    }

    #[test]
    fn test_daemon_config_ignores_garbage() {
        let mut map = ConfigMap::new();
        map.insert("UDP_PORTS".to_string(), "not,ports".to_string());
        map.insert("DEBOUNCE_SECONDS".to_string(), "-5".to_string());

        let cfg = DaemonConfig::from_map(&map);
        assert_eq!(cfg.udp_ports, vec![7, 9]);
        assert_eq!(cfg.debounce_seconds, 10);
    }
}
