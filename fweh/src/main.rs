use anyhow::Context;
use clap::Parser;
use fweh::{replay, Args};
use log::info;
use tokio::{signal, time::timeout};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if args.verbose { "debug" } else { "info" },
    ))
    .init();

    let config = args.to_configuration()?;
    let events = args.event_codes()?;
    info!(
        "fweh-replay {} started: vendor {}, {} events",
        env!("CARGO_PKG_VERSION"),
        config.vendor.name,
        events.len()
    );

    let run = replay::replay_file(&config, &args.capture, &events);

    let report = if let Some(duration) = config.duration() {
        match timeout(duration, run).await {
            Ok(report) => report?,
            Err(_) => anyhow::bail!(
                "replay did not finish within {} seconds",
                duration.as_secs()
            ),
        }
    } else {
        tokio::select! {
            report = run => report?,
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, exiting...");
                return Ok(());
            }
        }
    };

    let format = config.report_format();
    match &args.output {
        Some(path) => {
            report
                .save(path, format)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!("report saved to {}", path.display());
        }
        None => println!("{}", report.render(format)?),
    }

    Ok(())
}
