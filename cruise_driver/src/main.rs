//! Cruise
//!
//! PID cruise control for one AI car in Live for Speed. Connects over
//! InSim, regulates the car's speed to the target typed into the on-screen
//! button and drives its throttle and brake.

use anyhow::{bail, Context, Result};
use clap::Parser;
use cruise_core::{Dispatcher, NodeState};
use cruise_driver::config::DEFAULT_CONFIG_FILE;
use cruise_driver::{CruiseConfig, Overrides, ReconnectContext, Session, SessionEnd};
use cruise_library::{SpeedControlNode, VehicleEvent};
use std::future::Future;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cruise")]
#[command(about = "PID cruise control for a Live for Speed AI car", long_about = None)]
struct Args {
    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// InSim host (overrides HOST and the config file)
    #[arg(long)]
    host: Option<String>,

    /// InSim port (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Player id of the car to regulate
    #[arg(short, long)]
    target: Option<u8>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            target: self.target,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "cruise_driver=debug,cruise_core=debug,cruise_library=debug,cruise=debug"
    } else {
        "cruise_driver=info,cruise_core=info,cruise_library=info,cruise=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connect, run one session and clean up after it
async fn run_session<F>(
    config: &CruiseConfig,
    dispatcher: &mut Dispatcher<SpeedControlNode>,
    reconnect: &mut ReconnectContext,
    shutdown: &mut F,
) -> Result<SessionEnd>
where
    F: Future + Unpin,
{
    let insim = &config.insim;
    let mut session = Session::connect(&insim.host, insim.port)
        .await
        .with_context(|| format!("Failed to connect to InSim at {}:{}", insim.host, insim.port))?;
    reconnect.mark_connected();

    session
        .handshake(&config.init_request())
        .await
        .context("InSim handshake failed")?;

    let result = session.run(dispatcher, shutdown).await;

    // The host already hung up on Closed; everything else gets an orderly
    // disconnect so the car is not left on the throttle.
    if !matches!(result, Ok(SessionEnd::Closed)) {
        if let Err(e) = session.close(dispatcher.node()).await {
            warn!("Orderly disconnect from {} failed: {}", session.peer(), e);
        }
        if dispatcher.node().is_engaged() {
            if let Err(e) = dispatcher.dispatch(VehicleEvent::Disconnected) {
                warn!("Failed to end session: {}", e);
            }
        }
    }

    Ok(result?)
}

/// Shut the node down on the way out of a failure
fn shutdown_node(dispatcher: &mut Dispatcher<SpeedControlNode>) {
    if let Err(e) = dispatcher.shutdown() {
        warn!("Node shutdown failed: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = CruiseConfig::load(&args.config)?;
    config.resolve(&args.overrides())?;
    config.validate().context("Invalid configuration")?;

    let node = SpeedControlNode::new(config.speed_control()).context("Invalid control settings")?;
    let mut dispatcher = Dispatcher::new(node);
    dispatcher.init()?;

    let mut reconnect = ReconnectContext::new(config.reconnect.strategy());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        match run_session(&config, &mut dispatcher, &mut reconnect, &mut shutdown).await {
            Ok(SessionEnd::Shutdown) => break,
            Ok(SessionEnd::Closed) => {
                if !config.reconnect.enabled {
                    break;
                }
            }
            Err(e) => {
                error!("{:#}", e);
                let crashed = matches!(dispatcher.info().state(), NodeState::Crashed(_));
                if crashed || !config.reconnect.enabled {
                    shutdown_node(&mut dispatcher);
                    return Err(e);
                }
            }
        }

        if !reconnect.should_retry() {
            reconnect.mark_failed();
            shutdown_node(&mut dispatcher);
            bail!("Giving up after {} reconnect attempts", reconnect.attempt);
        }
        reconnect.begin_reconnect();
        info!(
            "Reconnecting in {:?} (attempt {})",
            reconnect.backoff_delay(),
            reconnect.attempt
        );

        tokio::select! {
            _ = reconnect.wait_backoff() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    dispatcher.shutdown()?;
    info!("Cruise stopped");
    Ok(())
}
