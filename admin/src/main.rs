//! Wolgate admin CLI
//!
//! Thin front-end over wolgate-core. `show` renders the current settings
//! and live inventory; `apply` maps command-line options onto the same
//! submission a settings form would carry and runs the save flow.

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use wolgate_core::{config, model, DaemonConfig, SettingsForm, SettingsHandler};

#[derive(Parser)]
#[command(
    name = "wolgate-admin",
    version,
    about = "View and apply Wake-on-LAN gating settings"
)]
struct Cli {
    /// Daemon config file (default: the wolgate settings directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// VM allow-list file (default: vms.json next to the config)
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Daemon control script (default: /etc/rc.d/rc.wolgate)
    #[arg(long, global = true, value_name = "PATH")]
    rc_script: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current settings and live VM inventory
    Show,

    /// Apply settings; omitted options keep their current values
    Apply {
        /// Enable or disable the daemon (yes/no)
        #[arg(long, value_name = "YES|NO")]
        enabled: Option<String>,

        /// Network interface the daemon listens on
        #[arg(long, value_name = "NAME")]
        interface: Option<String>,

        /// Comma-separated UDP ports to listen on
        #[arg(long, value_name = "PORTS")]
        udp_ports: Option<String>,

        /// Comma-separated CIDR source allow-list; empty = unrestricted
        #[arg(long, value_name = "SUBNETS")]
        allow_subnets: Option<String>,

        /// Minimum seconds between wake triggers for the same VM
        #[arg(long, value_name = "SECONDS")]
        debounce_seconds: Option<String>,

        /// UUID of a VM allowed to wake; repeatable. When given, replaces
        /// the current selection entirely.
        #[arg(long = "wake", value_name = "UUID")]
        wake: Vec<String>,

        /// Deselect every VM
        #[arg(long, conflicts_with = "wake")]
        clear_wake: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut handler = SettingsHandler::new();
    if let Some(path) = cli.config {
        handler.config_path = path;
    }
    if let Some(path) = cli.state {
        handler.state_path = path;
    }
    if let Some(path) = cli.rc_script {
        handler.rc_script = path;
    }

    let result = match cli.command {
        Commands::Show => show(&handler),
        Commands::Apply {
            enabled,
            interface,
            udp_ports,
            allow_subnets,
            debounce_seconds,
            wake,
            clear_wake,
        } => apply(
            &handler,
            ApplyArgs {
                enabled,
                interface,
                udp_ports,
                allow_subnets,
                debounce_seconds,
                wake,
                clear_wake,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn show(handler: &SettingsHandler) -> wolgate_core::Result<()> {
    let page = handler.view()?;
    let cfg = DaemonConfig::from_map(&page.config);

    println!("Daemon enabled:   {}", if cfg.enabled { "yes" } else { "no" });
    println!("Interface:        {}", cfg.interface);
    println!(
        "UDP ports:        {}",
        cfg.udp_ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );
    println!(
        "Allow subnets:    {}",
        if cfg.allow_subnets.is_empty() {
            "(unrestricted)".to_string()
        } else {
            cfg.allow_subnets.join(",")
        }
    );
    println!("Debounce seconds: {}", cfg.debounce_seconds);
    println!("Allow-list file:  {}", cfg.vm_state_path.display());
    println!();

    if page.vms.is_empty() {
        println!("No VMs reported by libvirt.");
        return Ok(());
    }

    println!("{:<5} {:<30} UUID", "WAKE", "NAME");
    for vm in &page.vms {
        let wake = page.vm_state.get(&vm.uuid).copied().unwrap_or(false);
        println!(
            "{:<5} {:<30} {}",
            if wake { "yes" } else { "no" },
            vm.name,
            vm.uuid
        );
    }
    Ok(())
}

struct ApplyArgs {
    enabled: Option<String>,
    interface: Option<String>,
    udp_ports: Option<String>,
    allow_subnets: Option<String>,
    debounce_seconds: Option<String>,
    wake: Vec<String>,
    clear_wake: bool,
}

fn apply(handler: &SettingsHandler, args: ApplyArgs) -> wolgate_core::Result<()> {
    // Pre-fill from persisted values, the way a rendered form would.
    let page = handler.view()?;
    let current = |key: &str, default: &str| -> String {
        match page.config.get(key) {
            Some(value) => value.clone(),
            None => default.to_string(),
        }
    };

    let enabled = match args.enabled {
        Some(value) => model::parse_bool(&value),
        None => model::parse_bool(&current(config::KEY_ENABLED, "no")),
    };
    let selected: BTreeSet<String> = if args.clear_wake {
        BTreeSet::new()
    } else if !args.wake.is_empty() {
        args.wake.into_iter().collect()
    } else {
        page.vm_state
            .iter()
            .filter(|(_, &wake)| wake)
            .map(|(uuid, _)| uuid.clone())
            .collect()
    };

    let form = SettingsForm {
        enabled,
        interface: args
            .interface
            .unwrap_or_else(|| current(config::KEY_INTERFACE, "br0")),
        udp_ports: args
            .udp_ports
            .unwrap_or_else(|| current(config::KEY_UDP_PORTS, "7,9")),
        allow_subnets: args
            .allow_subnets
            .unwrap_or_else(|| current(config::KEY_ALLOW_SUBNETS, "")),
        debounce_seconds: args
            .debounce_seconds
            .unwrap_or_else(|| current(config::KEY_DEBOUNCE_SECONDS, "10")),
        selected,
    };

    let outcome = handler.save(&form)?;

    println!("Settings saved. Daemon restart requested.");
    if !outcome.daemon_signaled {
        log::info!("daemon control script not installed; changes apply on next daemon start");
    }
    println!(
        "Allow-list: {} VM(s), {} allowed to wake.",
        outcome.vm_state.len(),
        outcome.vm_state.values().filter(|wake| **wake).count()
    );
    Ok(())
}
