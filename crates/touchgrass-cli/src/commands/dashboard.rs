use super::Context;

pub fn run(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let app = ctx.app();
    if !app.is_setup_complete() {
        return Err("setup not complete; run `touchgrass onboarding run` first".into());
    }
    let summary = app.dashboard();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("TouchGrass - Mindful phone usage starts here");
    println!();
    println!("Protection Status");
    println!("  Status:          {}", summary.protection_status);
    println!("  PIN Entries:     {}", summary.pin_entries);
    println!("  Emergency Apps:  {}", summary.emergency_app_slots);
    println!();
    println!("Stats");
    println!("  Unlock Attempts: {}", summary.stats.unlock_attempts);
    println!("  Mindful Pauses:  {}", summary.stats.mindful_pauses);
    println!("  Time Saved:      {} minutes", summary.stats.time_saved);
    println!(
        "  Last Updated:    {}",
        summary.stats.last_updated.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    println!("Emergency Apps: {}", summary.emergency_apps_line());
    println!();
    if summary.can_simulate_unlock {
        println!("{}: touchgrass lock", summary.simulate_label);
    } else {
        println!("{}: touchgrass settings enable", summary.simulate_label);
    }
    Ok(())
}
