use clap::Subcommand;
use serde_json::json;
use touchgrass_core::settings::MAX_PIN_RETRIES;
use touchgrass_core::{EmergencyApp, PinChange};

use super::{print_event, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current configuration summary
    Show,
    /// Turn the mindful pause on
    Enable,
    /// Turn the mindful pause off
    Disable,
    /// How many times the PIN must be re-entered after unlocking (0 keeps
    /// the pause without a PIN)
    Retries {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=MAX_PIN_RETRIES as i64))]
        count: u8,
    },
    /// Select or deselect an emergency app (at most 3)
    App {
        /// App name, e.g. "Phone" or "Maps"
        name: String,
    },
    /// List selectable emergency apps
    Apps,
    /// Change the PIN
    Pin {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Restore default settings
    Reset,
}

pub fn run(ctx: &Context, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ctx.app();

    match action {
        SettingsAction::Show => {
            let settings = app.settings();
            let out = json!({
                "summary": settings.summary(),
                "emergencyApps": settings.emergency_apps(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        SettingsAction::Enable => print_event(&app.update_settings("isEnabled", |s| {
            s.set_enabled(true);
            Ok(())
        })?)?,
        SettingsAction::Disable => print_event(&app.update_settings("isEnabled", |s| {
            s.set_enabled(false);
            Ok(())
        })?)?,
        SettingsAction::Retries { count } => {
            print_event(&app.update_settings("pinRetries", |s| s.set_pin_retries(count))?)?;
        }
        SettingsAction::App { name } => {
            let target: EmergencyApp = name.parse()?;
            print_event(&app.update_settings("emergencyApps", |s| {
                s.toggle_emergency_app(target).map(|_| ())
            })?)?;
            let state = if app.settings().is_selected(target) {
                "selected"
            } else {
                "removed"
            };
            eprintln!("{target} {state} ({})", app.settings().summary().emergency_apps);
        }
        SettingsAction::Apps => {
            let settings = app.settings();
            for candidate in EmergencyApp::ALL {
                let mark = if settings.is_selected(candidate) {
                    "[x]"
                } else if settings.can_select(candidate) {
                    "[ ]"
                } else {
                    "[-]"
                };
                println!("{mark} {candidate}");
            }
        }
        SettingsAction::Pin {
            current,
            new,
            confirm,
        } => {
            let mut flow = PinChange::new();
            flow.verify_current(app.settings(), &current)?;
            let mut changed = None;
            app.update_settings("pin", |s| {
                changed = Some(flow.submit(s, &new, &confirm)?);
                Ok(())
            })?;
            if let Some(event) = changed {
                print_event(&event)?;
            }
        }
        SettingsAction::Reset => {
            print_event(&app.reset_settings()?)?;
        }
    }
    Ok(())
}
