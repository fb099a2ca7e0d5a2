use clap::Subcommand;
use serde_json::json;
use touchgrass_core::platform::is_native_device;
use touchgrass_core::StorageBackend;

use super::Context;

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Detected device information
    Info,
    /// Print "true" on Android/iOS, "false" otherwise
    IsNative,
}

pub fn run(ctx: &Context, action: DeviceAction) -> Result<(), Box<dyn std::error::Error>> {
    let is_native = is_native_device(ctx.device.as_ref());

    match action {
        DeviceAction::Info => {
            let requested: StorageBackend = ctx.config.storage.backend;
            let out = json!({
                "device": ctx.device,
                "isNative": is_native,
                "configuredBackend": requested,
                "activeBackend": ctx.store.backend(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        DeviceAction::IsNative => println!("{is_native}"),
    }
    Ok(())
}
