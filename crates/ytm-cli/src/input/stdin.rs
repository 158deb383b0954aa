use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a JSON request from stdin when data is piped in.
///
/// Returns `None` for an interactive terminal or an empty pipe, so callers
/// can fall back to command-line flags.
pub fn read_request<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let request = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin request: {}", e))?;
    tracing::debug!("read request from stdin");
    Ok(Some(request))
}
