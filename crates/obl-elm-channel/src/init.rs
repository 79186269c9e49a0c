//! Adapter initialization sequence.

use tracing::{debug, info};

use crate::channel::CommandChannel;
use crate::error::{ElmError, ElmResult};

/// The fixed adapter-configuration sequence, in required order.
pub const INIT_COMMANDS: [&str; 6] = [
    "ATZ",   // reset
    "ATE0",  // echo off
    "ATL0",  // line feeds off
    "ATS0",  // spaces off
    "ATH0",  // headers off
    "ATSP0", // protocol auto
];

/// Run the configuration sequence through the channel, each command awaited
/// to completion before the next is issued.
///
/// Fails fast, naming the command that failed. Never retries — retry policy
/// belongs to the caller.
pub async fn initialize(channel: &CommandChannel) -> ElmResult<()> {
    for command in INIT_COMMANDS {
        match channel
            .execute_with_timeout(command, channel.init_timeout())
            .await
        {
            Ok(response) => debug!(%command, %response, "init command acknowledged"),
            Err(e) => {
                return Err(ElmError::Init {
                    command,
                    source: Box::new(e),
                });
            }
        }
    }
    info!("adapter initialized");
    Ok(())
}
