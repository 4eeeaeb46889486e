use bazaar::{Config, NotificationEvent, NotificationQueue, PhoneValidator};
use serde::Serialize;
use std::io::Write;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> bazaar::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "bazaar=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let numbers: Vec<String> = std::env::args().skip(1).collect();
    if numbers.is_empty() {
        anyhow::bail!("usage: bazaar <phone number>...");
    }

    info!(
        "Validating {} phone numbers (max {} notifications)",
        numbers.len(),
        config.notifications.max_notifications
    );

    let queue = NotificationQueue::new(config.notifications.clone());
    let mut events = queue.subscribe();

    for raw in &numbers {
        let result = PhoneValidator::validate(raw);
        if result.is_valid {
            let detail = format!(
                "Country code {}, national number {}",
                result.country_code, result.national_number
            );
            queue.success(format!("Saved {}", result.formatted), Some(detail.as_str()), None);
        } else {
            queue.error(format!("Rejected {:?}", raw), result.error.as_deref(), None);
        }
        print_json(&result)?;
    }

    print_json(&queue.visible())?;

    // Wait for the queue to drain on its own.
    loop {
        let remaining = queue.notifications();
        if remaining.iter().all(|n| !n.will_expire()) {
            if !remaining.is_empty() {
                info!("{} notifications will not expire", remaining.len());
            }
            break;
        }

        match events.recv().await {
            Ok(NotificationEvent::Removed { id, reason }) => {
                info!("Notification {} removed ({:?})", id, reason);
            }
            Ok(event) => debug!("{:?}", event),
            Err(RecvError::Lagged(skipped)) => warn!("Skipped {} notification events", skipped),
            Err(RecvError::Closed) => break,
        }
    }

    Ok(())
}
