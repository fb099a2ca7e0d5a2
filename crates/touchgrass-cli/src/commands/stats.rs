use clap::Subcommand;

use super::{print_event, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current usage stats
    Show,
    /// Count one unlock attempt
    Unlock,
    /// Count one mindful pause
    Pause {
        /// Seconds spent on the pause screen
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
    /// Zero all counters
    Reset,
}

pub fn run(ctx: &Context, action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let stats = ctx.stats();

    match action {
        StatsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&stats.get_usage_stats())?);
        }
        StatsAction::Unlock => print_event(&stats.record_unlock_attempt()?)?,
        StatsAction::Pause { seconds } => print_event(&stats.record_mindful_pause(seconds)?)?,
        StatsAction::Reset => {
            stats.reset_stats()?;
            println!("stats reset");
        }
    }
    Ok(())
}
