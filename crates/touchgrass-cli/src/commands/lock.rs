use std::io::BufRead;

use clap::Args;
use touchgrass_core::lock::{INCORRECT_PIN_MESSAGE, TITLE};
use touchgrass_core::{EmergencyApp, Event};

use super::{print_event, Context};

#[derive(Args)]
pub struct LockArgs {
    /// PIN entries to replay instead of reading stdin (repeatable)
    #[arg(long = "pin")]
    pins: Vec<String>,
}

/// Drives the pause screen from `--pin` values or stdin lines. Each line is
/// a 4-digit PIN, `continue` (when no PIN is required), `app <name>` (the
/// pause stays up afterwards) or `quit`. Prompts go to stderr, events to stdout as JSON lines.
pub fn run(ctx: &Context, args: LockArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ctx.app();
    if !app.is_setup_complete() {
        return Err("setup not complete; run `touchgrass onboarding run` first".into());
    }

    let events = app.simulate_unlock()?;
    if events.is_empty() {
        return Err("protection is disabled; run `touchgrass settings enable`".into());
    }
    for event in &events {
        print_event(event)?;
    }

    let inputs: Box<dyn Iterator<Item = std::io::Result<String>>> = if args.pins.is_empty() {
        Box::new(std::io::stdin().lock().lines())
    } else {
        Box::new(args.pins.into_iter().map(Ok))
    };

    show_prompt(&app);
    for line in inputs {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            if let Some(session) = app.abandon_lock() {
                eprintln!("pause abandoned after {}s", session.pause_duration);
            }
            return Ok(());
        }

        if let Some(name) = input.strip_prefix("app ") {
            let target: EmergencyApp = name.parse()?;
            print_event(&app.open_emergency_app(target)?)?;
            show_prompt(&app);
            continue;
        }

        let lock = app
            .lock_screen_mut()
            .ok_or("pause screen closed unexpectedly")?;
        let result = if input.eq_ignore_ascii_case("continue") || input.eq_ignore_ascii_case("c") {
            lock.continue_without_pin()
        } else {
            lock.enter_pin(input)
        };

        match result {
            Ok(event) => {
                if matches!(event, Event::PinRejected { .. }) {
                    eprintln!("{INCORRECT_PIN_MESSAGE}");
                }
                print_event(&event)?;
            }
            Err(e) => eprintln!("{e}"),
        }

        if let Some(event) = app.handle_unlock()? {
            print_event(&event)?;
            return Ok(());
        }
        show_prompt(&app);
    }

    Err("input ended before the pause was completed".into())
}

fn show_prompt(app: &touchgrass_core::App) {
    let Some(lock) = app.lock_screen() else {
        return;
    };
    eprintln!("{TITLE}");
    eprintln!("{}", lock.prompt());
    let apps: Vec<&str> = lock.emergency_apps().iter().map(|a| a.name()).collect();
    if !apps.is_empty() {
        eprintln!("Emergency access: {}", apps.join(", "));
    }
}
