use acuparse::{setup_platform, AcuparseConfig};
use argh::FromArgs;
use std::path::PathBuf;
use tokio::sync::watch;

/// Acuparse weather station poller
#[derive(FromArgs)]
struct Args {
    /// path to the configuration file
    #[argh(option, short = 'c', default = "default_config_path()")]
    config: PathBuf,

    /// update every sensor once, print the states as JSON and exit
    #[argh(switch)]
    once: bool,

    /// list the supported monitored conditions and exit
    #[argh(switch)]
    list_conditions: bool,
}

fn default_config_path() -> PathBuf {
    PathBuf::from("configs/acuparse.yaml")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    if args.list_conditions {
        for descriptor in acuparse::catalog::descriptors() {
            println!("{:<24} {}", descriptor.id, descriptor.display_name);
        }
        return Ok(());
    }

    log::info!("Loading config from: {}", args.config.display());
    let config = AcuparseConfig::from_file(&args.config)?;
    log::info!(
        "Hostname: {}, refresh: {}s, conditions: {:?}",
        config.hostname,
        config.refresh_seconds,
        config.monitored_conditions
    );

    let mut platform = setup_platform(&config).await?;

    if args.once {
        platform.update_all().await;
        println!("{}", serde_json::to_string_pretty(&platform.snapshots())?);
        return Ok(());
    }

    // Graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(());
    ctrlc::set_handler(move || {
        log::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    })?;

    let mut interval = tokio::time::interval(config.refresh_interval());
    log::info!("Acuparse node running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = interval.tick() => {
                platform.update_all().await;
                for sensor in &platform.sensors {
                    log::info!(
                        "{} ({}): {} {}",
                        sensor.name(),
                        sensor.condition(),
                        sensor
                            .state()
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        sensor.unit_of_measurement()
                    );
                }
            }
        }
    }

    log::info!("Acuparse node shut down");
    Ok(())
}
