use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use touchgrass_core::{AppStateChange, UnlockMonitor};

use super::Context;

fn parse_change(line: &str) -> Option<AppStateChange> {
    match line.trim().to_ascii_lowercase().as_str() {
        "active" | "foreground" | "unlock" => Some(AppStateChange { is_active: true }),
        "inactive" | "background" | "lock" => Some(AppStateChange { is_active: false }),
        _ => None,
    }
}

/// Feed stdin lines to the unlock monitor until EOF. Each activation that
/// triggers a pause prints one line to stdout.
pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let app = ctx.app();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let triggered = runtime.block_on(async {
        let mut monitor = UnlockMonitor::new(ctx.stats());
        monitor.initialize(app.settings(), || {
            println!("mindful pause triggered");
        });

        let (tx, rx) = mpsc::channel(16);
        let worker = tokio::spawn(monitor.run(rx));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_change(&line) {
                Some(change) => {
                    if tx.send(change).await.is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => tracing::warn!(input = %line.trim(), "ignoring unknown app state"),
            }
        }
        drop(tx);

        Ok::<u64, Box<dyn std::error::Error>>(worker.await?)
    })?;

    eprintln!("{triggered} mindful pause(s) triggered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_state_words() {
        assert_eq!(parse_change("active"), Some(AppStateChange { is_active: true }));
        assert_eq!(parse_change(" Background "), Some(AppStateChange { is_active: false }));
        assert_eq!(parse_change("sideways"), None);
    }
}
