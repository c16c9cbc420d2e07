//! spamguard - replay host events against the content guard.
//!
//! Usage: `spamguard [config.toml] [events.jsonl|-]`

use spamguard::config::Config;
use spamguard::notify::{LogSink, Notifier, ViolationSink, WebhookSink};
use spamguard::replay::{Replay, ReplayEvent, Scheduled};
use spamguard::services::{GuardService, ScheduledTask};
use spamguard::host::SessionHost;
use spamguard::{http, metrics};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "spamguard.toml".to_string());
    let events_path = args.next().unwrap_or_else(|| "-".to_string());

    let config = Config::load(&config_path)?;

    let default_level = if config.settings.debug_mode { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(label = %config.server.label, config = %config_path, "Starting spamguard");

    // Convention: metrics_port = 0 disables the HTTP endpoint.
    metrics::init();
    if let Some(addr) = config.server.metrics_addr() {
        tokio::spawn(http::run_http_server(addr));
    }

    let sink: Arc<dyn ViolationSink> = if config.webhook.enabled {
        match WebhookSink::new(config.webhook.clone()) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                warn!(error = %e, "Webhook unavailable; violations will only be logged");
                Arc::new(LogSink)
            }
        }
    } else {
        Arc::new(LogSink)
    };
    let (notifier, notifier_task) = Notifier::spawn(config.webhook.queue_size, sink);

    let guard = GuardService::new(Arc::new(config)).with_notifier(notifier);
    let mut replay = Replay::new(guard, SessionHost::new()).with_config_path(&config_path);

    let input: Box<dyn AsyncRead + Unpin + Send> = if events_path == "-" {
        Box::new(tokio::io::stdin())
    } else {
        Box::new(tokio::fs::File::open(&events_path).await?)
    };
    let mut lines = BufReader::new(input).lines();

    let (task_tx, mut task_rx) = mpsc::unbounded_channel::<ScheduledTask>();
    let mut pending = 0usize;
    let mut input_open = true;
    let mut resume_at: Option<tokio::time::Instant> = None;
    let mut printed = 0usize;

    let schedule = |scheduled: Scheduled, pending: &mut usize| {
        for (delay, task) in scheduled {
            *pending += 1;
            let tx = task_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(task);
            });
        }
    };

    loop {
        if !input_open && pending == 0 {
            break;
        }

        tokio::select! {
            Some(task) = task_rx.recv(), if pending > 0 => {
                pending -= 1;
                let scheduled = replay.fire(task);
                schedule(scheduled, &mut pending);
            }
            _ = tokio::time::sleep_until(resume_at.unwrap_or_else(tokio::time::Instant::now)), if resume_at.is_some() => {
                resume_at = None;
            }
            line = lines.next_line(), if input_open && resume_at.is_none() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    match ReplayEvent::parse(line) {
                        Ok(ReplayEvent::Wait { ms }) => {
                            resume_at = Some(tokio::time::Instant::now() + std::time::Duration::from_millis(ms));
                        }
                        Ok(event) => {
                            let scheduled = replay.handle(event);
                            schedule(scheduled, &mut pending);
                        }
                        Err(e) => warn!(error = %e, line = %line, "Skipping malformed event"),
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    error!(error = %e, "Failed to read events");
                    input_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        let records = replay.host().records();
        for record in &records[printed..] {
            println!("{}", serde_json::to_string(record)?);
        }
        printed = records.len();
    }

    for command in replay.host().commands() {
        info!(command = %command, "Executed");
    }
    info!(
        records = printed,
        commands = replay.host().commands().len(),
        renames = replay.host().renames_applied(),
        enforced = replay.guard().enforcer().len(),
        "Replay finished"
    );

    replay.shutdown();
    drop(replay);
    if let Err(e) = notifier_task.await {
        error!(error = %e, "Notifier task failed");
    }

    Ok(())
}
