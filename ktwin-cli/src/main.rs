// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! KTwin CLI
//!
//! Offline planner: loads Interface and Instance resources from JSON files
//! and prints the derived event topology, inheritance chains, or the graph
//! snapshot a twin service would receive.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ktwin_core::{normalize_name, TopologyConfig, TwinInstance, TwinInterface, TwinPhase};
use ktwin_graph::{interface_graph, resolve_ancestors, InterfaceGraph, TwinGraphServer};
use ktwin_topology::{Binding, BrokerInventory, EventTopologyBuilder, Trigger};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "ktwin")]
#[command(about = "KTwin - twin graph and event topology planner", long_about = None)]
struct Cli {
    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive Triggers and Bindings for Interfaces
    Plan {
        /// JSON array of TwinInterface resources
        #[arg(long)]
        interfaces: PathBuf,

        /// Broker inventory (exchange, capture queue, trigger queues) as JSON
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Topology settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only plan this Interface
        #[arg(long)]
        interface: Option<String>,
    },

    /// Print the inheritance chain of an Interface, child first
    Ancestors {
        /// Interface id
        interface: String,

        /// JSON array of TwinInterface resources
        #[arg(long)]
        interfaces: PathBuf,
    },

    /// Print the Interface graph and any unresolved references
    Inspect {
        /// JSON array of TwinInterface resources
        #[arg(long)]
        interfaces: PathBuf,
    },

    /// Print the snapshot served on /twin-graph for an Instance inventory
    Graph {
        /// JSON array of TwinInstance resources
        #[arg(long)]
        instances: PathBuf,
    },
}

/// Planned topology for one Interface
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanReport {
    interface: String,
    phase: TwinPhase,
    fingerprint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<String>,
    triggers: Vec<Trigger>,
    bindings: Vec<Binding>,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_topology_config(path: Option<&Path>) -> Result<TopologyConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
        None => Ok(TopologyConfig::default()),
    }
}

fn load_interface_graph(path: &Path) -> Result<(Vec<TwinInterface>, InterfaceGraph)> {
    let interfaces: Vec<TwinInterface> = load_json(path)?;
    let graph = interface_graph(&interfaces);
    debug!("Loaded {} interfaces into {} vertices", interfaces.len(), graph.len());
    Ok((interfaces, graph))
}

fn plan_reports(
    interfaces: &[TwinInterface],
    graph: &InterfaceGraph,
    config: &TopologyConfig,
    inventory: &BrokerInventory,
    only: Option<&str>,
) -> Result<Vec<PlanReport>> {
    let builder = EventTopologyBuilder::new(config, graph, inventory);

    let mut ids: Vec<String> = match only {
        Some(id) => vec![normalize_name(id)],
        None => interfaces.iter().map(|i| normalize_name(i.name())).collect(),
    };
    ids.sort();
    ids.dedup();

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        let plan = builder
            .build_resolved(&id, graph)
            .with_context(|| format!("Failed to plan interface {}", id))?;

        reports.push(PlanReport {
            fingerprint: plan.fingerprint()?,
            phase: plan.phase(),
            failures: plan.failures().iter().map(ToString::to_string).collect(),
            interface: plan.interface,
            triggers: plan.triggers,
            bindings: plan.bindings,
        });
    }

    Ok(reports)
}

fn print_report(report: &PlanReport) {
    let mark = if report.failures.is_empty() { "✓" } else { "✗" };
    println!(
        "{} {} ({:?}) - {} triggers, {} bindings [{}]",
        mark,
        report.interface,
        report.phase,
        report.triggers.len(),
        report.bindings.len(),
        &report.fingerprint[..12]
    );
    for trigger in &report.triggers {
        println!(
            "    trigger {} <- {} -> {}",
            trigger.name, trigger.filter.event_type, trigger.subscriber.reference.name
        );
    }
    for binding in &report.bindings {
        let selector = binding.event_type().unwrap_or(binding.routing_key.as_str());
        println!(
            "    binding {} : {} [{}] -> {}",
            binding.name, binding.source, selector, binding.destination
        );
    }
    for failure in &report.failures {
        println!("    ! {}", failure);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan {
            interfaces,
            inventory,
            config,
            interface,
        } => {
            let (list, graph) = load_interface_graph(&interfaces)?;
            let config = load_topology_config(config.as_deref())?;
            let inventory: BrokerInventory = match inventory {
                Some(path) => load_json(&path)?,
                None => BrokerInventory::default(),
            };

            let reports = plan_reports(&list, &graph, &config, &inventory, interface.as_deref())?;
            info!("Planned {} interfaces", reports.len());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report);
                }
            }
        }

        Commands::Ancestors {
            interface,
            interfaces,
        } => {
            let (_, graph) = load_interface_graph(&interfaces)?;
            let chain: Vec<String> = resolve_ancestors(&interface, &graph)
                .with_context(|| format!("Failed to resolve ancestors of {}", interface))?
                .iter()
                .map(|a| normalize_name(a.name()))
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&chain)?);
            } else {
                println!("{}", chain.join(" -> "));
            }
        }

        Commands::Inspect { interfaces } => {
            let (_, graph) = load_interface_graph(&interfaces)?;
            let unresolved = graph.temporary_ids();

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "vertices": graph.len(),
                        "edges": graph.edge_count(),
                        "unresolved": unresolved,
                    })
                );
            } else {
                print!("{}", graph.describe());
                if !unresolved.is_empty() {
                    println!("Unresolved references: {}", unresolved.join(", "));
                }
            }
        }

        Commands::Graph { instances } => {
            let instances: Vec<TwinInstance> = load_json(&instances)?;
            let server = TwinGraphServer::new();
            let stats = server.rebuild(&instances);
            let snapshot = server.serialize_snapshot()?;

            if cli.json {
                println!("{}", String::from_utf8_lossy(&snapshot));
            } else {
                let value: serde_json::Value = serde_json::from_slice(&snapshot)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
                println!("✓ {} instances, {} links", stats.vertices, stats.edges);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INTERFACES: &str = r#"[
        {"metadata": {"name": "asset"},
         "spec": {"relationships": [{"name": "tracked", "target": "vehicle", "aggregateData": true}]}},
        {"metadata": {"name": "fleet"}, "spec": {"extendsInterface": "asset", "service": {}}},
        {"metadata": {"name": "vehicle"}}
    ]"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_plan_reports_for_all_interfaces() {
        let file = write_temp(INTERFACES);
        let (list, graph) = load_interface_graph(file.path()).unwrap();
        let inventory = BrokerInventory::default()
            .with_exchange("b.ktwin.broker")
            .with_capture_queue("t.event-store");

        let reports =
            plan_reports(&list, &graph, &TopologyConfig::default(), &inventory, None).unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.interface.as_str()).collect();
        assert_eq!(names, vec!["asset", "fleet", "vehicle"]);

        // fleet has a service but its trigger queue is not in the inventory
        let fleet = &reports[1];
        assert_eq!(fleet.phase, TwinPhase::Failed);
        assert_eq!(fleet.failures.len(), 1);
        assert!(fleet.bindings.iter().any(|b| b.name == "fleet-tracked-virtual-event-store"));
    }

    #[test]
    fn test_plan_single_unknown_interface_fails() {
        let file = write_temp(INTERFACES);
        let (list, graph) = load_interface_graph(file.path()).unwrap();

        let result = plan_reports(
            &list,
            &graph,
            &TopologyConfig::default(),
            &BrokerInventory::default(),
            Some("ghost"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_topology_config_from_toml() {
        let file = write_temp("broker_name = \"edge\"\nmqtt_dispatch = true\n");
        let config = load_topology_config(Some(file.path())).unwrap();
        assert_eq!(config.broker_name, "edge");
        assert!(config.mqtt_dispatch);
        assert_eq!(config.capture_service, "event-store");
    }
}
