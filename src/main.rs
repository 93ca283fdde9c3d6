use anyhow::Result;
use clap::{Parser, Subcommand};
use object_storage_sim::backend::{self, cluster::{MockCluster, MockConfig}};
use object_storage_sim::control_plane::client::{ClientConfig, ControlPlane, HttpControlPlane};
use object_storage_sim::election::poller::{PollerConfig, ReconcileReport};
use object_storage_sim::scenario::types::Scenario;
use object_storage_sim::simulator::renderer::ConsoleRenderer;
use object_storage_sim::simulator::session::{Session, SessionConfig};
use object_storage_sim::simulator::types::SimulatorConfig;
use object_storage_sim::topology::types::ComponentStatus;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "objsim")]
#[command(author, version, about = "Object storage read-path simulator")]
struct Cli {
    /// Control-plane base URL
    #[arg(long, env = "OBJSIM_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// Per-request timeout
    #[arg(long, env = "OBJSIM_TIMEOUT", default_value = "2s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the in-memory mock cluster
    Serve {
        #[arg(long, env = "OBJSIM_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Leader-log reads a Partition Manager election takes
        #[arg(long, default_value = "3")]
        election_steps: u32,
    },

    /// Print component status, partition servers and the leader-election log
    Status,

    /// Set a component up or down
    Toggle {
        /// Component name, e.g. "Extent Node 2"
        name: String,
        /// up | down
        status: ComponentStatus,

        /// Election polls before giving up
        #[arg(long, env = "OBJSIM_MAX_POLLS", default_value = "6")]
        max_polls: u32,

        /// Wait between two election polls
        #[arg(long, env = "OBJSIM_POLL_INTERVAL", default_value = "200ms", value_parser = humantime::parse_duration)]
        poll_interval: Duration,
    },

    /// Animate a GET of FILENAME under a fault scenario
    Simulate {
        filename: String,

        /// all_healthy | extent_down | partition_down | frontend_down | file_not_found
        #[arg(short, long, default_value = "all_healthy")]
        scenario: Scenario,

        /// Delay between two hops
        #[arg(long, env = "OBJSIM_HOP_DELAY", default_value = "600ms", value_parser = humantime::parse_duration)]
        hop_delay: Duration,

        /// Election polls before giving up
        #[arg(long, env = "OBJSIM_MAX_POLLS", default_value = "6")]
        max_polls: u32,

        /// Wait between two election polls
        #[arg(long, env = "OBJSIM_POLL_INTERVAL", default_value = "200ms", value_parser = humantime::parse_duration)]
        poll_interval: Duration,

        /// Run against an in-process mock cluster instead of --base-url
        #[arg(long)]
        mock: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let client_config = ClientConfig {
        base_url: cli.base_url.clone(),
        request_timeout: cli.timeout,
    };

    match cli.command {
        Command::Serve {
            bind,
            election_steps,
        } => {
            let cluster = MockCluster::new(MockConfig {
                election_steps,
                ..Default::default()
            });
            tracing::info!("Press Ctrl+C to shutdown");
            backend::bind_and_serve(bind, cluster).await?;
        }
        Command::Status => {
            let client = HttpControlPlane::new(client_config);
            print_status(&client).await?;
        }
        Command::Toggle {
            name,
            status,
            max_polls,
            poll_interval,
        } => {
            let config = SessionConfig {
                poller: PollerConfig {
                    max_polls,
                    interval: poll_interval,
                },
                ..Default::default()
            };
            let session = Session::new(Arc::new(HttpControlPlane::new(client_config)), config);

            let migrations = session.toggle(&name, status).await?;
            println!("{} is {}", name, status);
            for m in &migrations {
                println!("  migrated {}: {} -> {}", m.file, m.from, m.to);
            }

            if let Some(report) = session.wait_for_reconciliation().await {
                print_reconciliation(&report);
            }
        }
        Command::Simulate {
            filename,
            scenario,
            hop_delay,
            max_polls,
            poll_interval,
            mock,
        } => {
            let client_config = if mock {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
                let addr = listener.local_addr()?;
                tokio::spawn(backend::serve(listener, MockCluster::new(MockConfig::default())));
                ClientConfig {
                    base_url: format!("http://{}", addr),
                    ..client_config
                }
            } else {
                client_config
            };

            let config = SessionConfig {
                simulator: SimulatorConfig {
                    hop_delay,
                    ..Default::default()
                },
                poller: PollerConfig {
                    max_polls,
                    interval: poll_interval,
                },
            };
            let session = Session::new(Arc::new(HttpControlPlane::new(client_config)), config);

            let events = session.submit(&filename, scenario)?;
            let mut renderer = ConsoleRenderer::new(std::io::stdout());
            session.render(events, &mut renderer).await;

            for m in session.migrations().await {
                println!("Migrated {}: {} -> {}", m.file, m.from, m.to);
            }

            if let Some(report) = session.wait_for_reconciliation().await {
                print_reconciliation(&report);
            }
        }
    }

    Ok(())
}

fn print_reconciliation(report: &ReconcileReport) {
    println!(
        "Leader election: {:?} after {} poll(s)",
        report.outcome, report.polls
    );
    for line in &report.leader_log {
        println!("  {}", line);
    }
}

async fn print_status(client: &HttpControlPlane) -> Result<()> {
    for component in client.get_system_status().await? {
        println!("{:<20} {}", component.name(), component.status);
    }

    let servers = client.get_partition_servers().await?;
    if !servers.is_empty() {
        println!();
        for server in servers {
            println!("{:<20} {:<5} {}", server.name, server.status.to_string(), server.files.join(", "));
        }
    }

    let log = client.get_leader_election_log().await?;
    if !log.is_empty() {
        println!();
        for line in log {
            println!("{}", line);
        }
    }

    Ok(())
}
