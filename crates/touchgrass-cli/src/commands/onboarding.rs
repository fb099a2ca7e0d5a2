use clap::Subcommand;
use touchgrass_core::onboarding;
use touchgrass_core::{Advance, Onboarding};

use super::{print_event, Context};

#[derive(Subcommand)]
pub enum OnboardingAction {
    /// Whether setup has been completed
    Status,
    /// Walk through the setup steps and finish
    Run {
        /// PIN entries required after each unlock (1-5)
        #[arg(long, default_value_t = 3)]
        retries: u8,
    },
    /// Forget that setup was completed
    Reset,
}

pub fn run(ctx: &Context, action: OnboardingAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        OnboardingAction::Status => {
            println!("{}", onboarding::is_complete(ctx.store.as_ref()));
        }
        OnboardingAction::Run { retries } => {
            let mut app = ctx.app();
            let mut flow = Onboarding::new();
            flow.choose_pin_retries(retries)?;

            loop {
                let step = flow.current_step();
                println!(
                    "[{}/{}] {}",
                    flow.step_index() + 1,
                    flow.step_count(),
                    step.title()
                );
                println!("  {}", step.description());
                println!("  {}", step.body());
                println!("  > {}", flow.primary_label());

                if let Advance::Completed(event) = app.advance_onboarding(&mut flow)? {
                    print_event(&event)?;
                    break;
                }
            }
        }
        OnboardingAction::Reset => {
            onboarding::reset(ctx.store.as_ref())?;
            println!("onboarding reset");
        }
    }
    Ok(())
}
