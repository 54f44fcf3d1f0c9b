use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use colored::*;
use std::path::Path;

use smartie_hwmon::core::cpu::HardwareMonitor;
use smartie_hwmon::core::metrics::{CpuMetric, Domain, GpuMetric};
use smartie_hwmon::core::router::INVALID_PARAMETER;
use smartie_hwmon::platform::{self, LogNotifier, ReplayBackend};
use smartie_hwmon::ui::format_tree;
use smartie_hwmon::{PluginConfig, SensorPlugin};

fn units_arg() -> Arg {
    Arg::new("units")
        .short('u')
        .long("units")
        .help("Append unit suffixes, as the host does with show-units = 1")
        .action(clap::ArgAction::SetTrue)
}

fn main() -> Result<()> {
    let matches = Command::new("smartie-probe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Query the smartie-hwmon sensors without the LCD Smartie host")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file (defaults to the user config directory)")
                .global(true),
        )
        .arg(
            Arg::new("replay")
                .long("replay")
                .value_name("TREE_JSON")
                .help("Answer CPU queries from a captured hardware tree")
                .global(true),
        )
        .subcommand(
            Command::new("cpu")
                .about("Run one CPU query (function1)")
                .arg(Arg::new("metric").required(true).index(1))
                .arg(units_arg()),
        )
        .subcommand(
            Command::new("gpu")
                .about("Run one GPU query (function2)")
                .arg(Arg::new("metric").required(true).index(1))
                .arg(units_arg()),
        )
        .subcommand(
            Command::new("all")
                .about("Run every supported query in both domains")
                .arg(units_arg()),
        )
        .subcommand(
            Command::new("tree")
                .about("Dump the hardware tree the CPU queries scan")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON (usable with --replay)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .get_matches();

    let config = load_config(&matches)?;
    smartie_hwmon::init_logging(config.log_filter());

    let mut plugin = build_plugin(&matches, config)?;
    plugin.initialize();

    let result = match matches.subcommand() {
        Some(("cpu", sub_matches)) => handle_query(&mut plugin, Domain::Cpu, sub_matches),
        Some(("gpu", sub_matches)) => handle_query(&mut plugin, Domain::Gpu, sub_matches),
        Some(("all", sub_matches)) => {
            handle_all(&mut plugin, sub_matches.get_flag("units"));
            Ok(())
        }
        Some(("tree", sub_matches)) => handle_tree(&mut plugin, sub_matches.get_flag("json")),
        _ => Ok(()),
    };

    plugin.shutdown();
    result
}

fn load_config(matches: &ArgMatches) -> Result<PluginConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => PluginConfig::load_from(Path::new(path))?,
        None => PluginConfig::load(),
    };
    // The CLI reports problems on stderr, never with message boxes
    config.show_notices = false;
    Ok(config)
}

fn build_plugin(matches: &ArgMatches, config: PluginConfig) -> Result<SensorPlugin> {
    let plugin = match matches.get_one::<String>("replay") {
        Some(path) => {
            let backend = ReplayBackend::from_file(Path::new(path))
                .with_context(|| format!("Failed to load hardware tree from {}", path))?;
            let cpu = HardwareMonitor::from_config(backend, &config);
            let gpu = platform::default_gpu_source(&config);
            SensorPlugin::new(config, Box::new(cpu), gpu)
        }
        None => SensorPlugin::with_platform_defaults(config),
    };
    Ok(plugin.with_notifier(Box::new(LogNotifier)))
}

fn handle_query(plugin: &mut SensorPlugin, domain: Domain, matches: &ArgMatches) -> Result<()> {
    let metric = matches
        .get_one::<String>("metric")
        .map(String::as_str)
        .unwrap_or_default();
    let text = plugin.query(domain, metric, matches.get_flag("units"));

    if text == INVALID_PARAMETER {
        let names: Vec<&str> = match domain {
            Domain::Cpu => CpuMetric::ALL.iter().map(|m| m.name()).collect(),
            Domain::Gpu => GpuMetric::ALL.iter().map(|m| m.name()).collect(),
        };
        anyhow::bail!(
            "Unknown {} metric '{}'. Supported: {}",
            domain,
            metric,
            names.join(", ")
        );
    }

    println!("{}", text);
    Ok(())
}

fn print_row(domain: Domain, name: &str, text: &str) {
    let failed = ["Error", "NVML", "GPU handle"]
        .iter()
        .any(|prefix| text.starts_with(prefix));
    let value = if failed { text.red() } else { text.green() };
    println!("  {:<4} {:<10} {}", domain.to_string().cyan(), name, value);
}

fn handle_all(plugin: &mut SensorPlugin, show_units: bool) {
    println!("{}", "CPU (function1)".bold());
    for metric in CpuMetric::ALL {
        let text = plugin.query_cpu(metric.name(), show_units);
        print_row(Domain::Cpu, metric.name(), &text);
    }

    println!("{}", "GPU (function2)".bold());
    for metric in GpuMetric::ALL {
        let text = plugin.query_gpu(metric.name(), show_units);
        print_row(Domain::Gpu, metric.name(), &text);
    }

    println!(
        "{} {} ms",
        "Minimum refresh interval:".dimmed(),
        plugin.min_refresh_interval_ms()
    );
}

fn handle_tree(plugin: &mut SensorPlugin, json: bool) -> Result<()> {
    let nodes = plugin.hardware_snapshot();
    if nodes.is_empty() {
        println!("{}", "Hardware tree is empty or could not be opened".yellow());
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&nodes).context("Failed to serialize hardware tree")?
        );
    } else {
        print!("{}", format_tree(&nodes));
    }
    Ok(())
}
