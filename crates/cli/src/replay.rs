use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use events::{MessageChannel, NuiMessage};
use scratchcard_core::OverlayState;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ReplaySettings;
use crate::overlay::OverlayComponent;

#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub envelopes: usize,
    pub invocations: usize,
    pub final_state: OverlayState,
}

/// Parse a JSON Lines recording. Blank lines and `#` comments are skipped.
pub fn parse_envelopes(content: &str) -> Result<Vec<NuiMessage<Value>>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            NuiMessage::from_json(line.trim()).with_context(|| format!("Line {}", index + 1))
        })
        .collect()
}

pub async fn read_envelopes(path: &Path) -> Result<Vec<NuiMessage<Value>>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_envelopes(&content).with_context(|| format!("Invalid recording {}", path.display()))
}

/// Mount an overlay, push every envelope through the channel, then unmount.
pub async fn play(
    envelopes: Vec<NuiMessage<Value>>,
    settings: &ReplaySettings,
) -> Result<ReplaySummary> {
    let channel = MessageChannel::new();
    let overlay = OverlayComponent::mount(&channel, settings)?;
    let delay = Duration::from_millis(settings.delay_ms);
    let total = envelopes.len();

    info!(envelopes = total, "Replay started");

    for (index, envelope) in envelopes.into_iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let event_type = envelope.event_type.clone();
        let invoked = channel.post_message(envelope);
        debug!(index, event_type = %event_type, invoked, "Envelope posted");
    }

    let invocations = overlay.invocations();
    let final_state = overlay.unmount();

    info!(
        envelopes = total,
        invocations,
        messages = channel.message_count(),
        "Replay finished"
    );

    Ok(ReplaySummary {
        envelopes: total,
        invocations,
        final_state,
    })
}
