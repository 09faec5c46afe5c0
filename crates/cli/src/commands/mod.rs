//! CLI command implementations.

pub mod demos;
pub mod issues;
pub mod leads;
pub mod sales;

use celekt_crm::{CrmConfig, CrmError, RemoteClient, SyncState};

/// Build a CRM client from the environment.
pub fn client_from_env() -> Result<RemoteClient, Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    Ok(RemoteClient::new(&config))
}

/// Verify credentials and connectivity by acquiring a token.
#[allow(clippy::print_stdout)]
pub async fn check(client: &RemoteClient) -> Result<(), CrmError> {
    client.credentials().access_token().await?;
    println!("ok: credential acquired");
    Ok(())
}

/// Extract the payload of a finished operation, turning an error state into
/// a printable error.
pub fn into_result<T: Clone>(state: &SyncState<T>) -> Result<T, Box<dyn std::error::Error>> {
    ensure_ok(state)?;
    state
        .data
        .clone()
        .ok_or_else(|| "operation returned no data".into())
}

/// Check a finished operation for failure without consuming its payload
/// (commands with an empty success body leave `data` untouched).
pub fn ensure_ok<T>(state: &SyncState<T>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(error) = &state.error {
        return Err(error.clone().into());
    }
    Ok(())
}

/// Parse a remote picklist label strictly: the label must round-trip, so a
/// typo errors instead of silently mapping to the default.
pub fn parse_label<T>(
    label: &str,
    parse: impl Fn(&str) -> T,
    render: impl Fn(&T) -> &'static str,
) -> Result<T, String> {
    let value = parse(label);
    if render(&value) == label {
        Ok(value)
    } else {
        Err(format!("unknown value '{label}'"))
    }
}
