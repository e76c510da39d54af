use std::path::PathBuf;

use clap::Parser;
use netpulse_app::{config::Config, shell::Shell};
use netpulse_speedtest::{SpeedTestEvent, SpeedTestRun};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "netpulse")]
#[command(about = "NetPulse network outage reporting console")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "netpulse.toml")]
    config: PathBuf,

    /// Directory CSV exports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

enum Input {
    Line(Option<String>),
    SpeedTest(Option<SpeedTestEvent>),
    Interrupt,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    if let Some(dir) = cli.export_dir {
        config.export.dir = dir;
    }

    info!(
        export_dir = ?config.export.dir,
        tick_interval_ms = config.speed_test.tick_interval_ms,
        "Starting NetPulse console"
    );

    let cancel = CancellationToken::new();
    let mut shell = Shell::new(&config, cancel.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut active_run: Option<SpeedTestRun> = None;

    print(&mut stdout, &shell.screen()).await?;
    prompt(&mut stdout).await?;

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            event = next_event(&mut active_run) => Input::SpeedTest(event),
            _ = tokio::signal::ctrl_c() => Input::Interrupt,
        };

        match input {
            Input::Line(None) | Input::Interrupt => break,
            Input::Line(Some(line)) => {
                match shell.execute(&line) {
                    Ok(reply) => {
                        if !reply.output.is_empty() {
                            print(&mut stdout, &reply.output).await?;
                        }
                        if let Some(run) = reply.started {
                            active_run = Some(run);
                        }
                        if reply.quit {
                            break;
                        }
                    }
                    Err(e) => print(&mut stdout, &format!("Error: {e}")).await?,
                }
                prompt(&mut stdout).await?;
            }
            Input::SpeedTest(Some(event)) => {
                if let Some(text) = shell.on_speed_test_event(event) {
                    print(&mut stdout, &text).await?;
                }
            }
            Input::SpeedTest(None) => {
                if let Some(run) = active_run.take()
                    && let Some(text) = shell.on_speed_test_closed(run.id)
                {
                    print(&mut stdout, &text).await?;
                }
            }
        }
    }

    info!("Shutting down");
    cancel.cancel();

    Ok(())
}

/// Next event of the active speed test run; pending while there is none.
async fn next_event(run: &mut Option<SpeedTestRun>) -> Option<SpeedTestEvent> {
    match run {
        Some(run) => run.events.recv().await,
        None => std::future::pending().await,
    }
}

async fn print(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await
}

async fn prompt(stdout: &mut tokio::io::Stdout) -> std::io::Result<()> {
    stdout.write_all(b"> ").await?;
    stdout.flush().await
}
