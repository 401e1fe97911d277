//! `hyprctl` query wrappers.
//!
//! Each query shells out to `hyprctl <topic> -j` and parses the JSON
//! payload. Parsing is split from the subprocess call so malformed payloads
//! can be exercised directly in tests. Missing fields inside an otherwise
//! valid payload degrade to the same fallbacks as a failed query.

use serde::Deserialize;

use crate::constants::fallback;
use crate::error::ShellError;
use crate::utils::command::capture;

#[derive(Debug, Deserialize)]
struct ActiveWindowPayload {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkspacePayload {
    #[serde(default)]
    id: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ClientWorkspaceRef {
    #[serde(default)]
    id: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ClientPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    workspace: Option<ClientWorkspaceRef>,
}

/// Title of the focused window, trimmed; empty titles degrade to the
/// desktop fallback.
///
/// # Errors
///
/// Returns `Err` when `hyprctl` fails or returns malformed JSON.
pub async fn active_window_title() -> Result<String, ShellError> {
    let raw = capture("hyprctl", &["activewindow", "-j"]).await?;
    parse_active_window(&raw)
}

/// Id of the focused workspace.
///
/// # Errors
///
/// Returns `Err` when `hyprctl` fails or returns malformed JSON.
pub async fn active_workspace_id() -> Result<i32, ShellError> {
    let raw = capture("hyprctl", &["activeworkspace", "-j"]).await?;
    parse_active_workspace(&raw)
}

/// Every workspace id Hyprland currently reports, unnormalized.
///
/// # Errors
///
/// Returns `Err` when `hyprctl` fails or returns malformed JSON.
pub async fn workspace_ids() -> Result<Vec<i32>, ShellError> {
    let raw = capture("hyprctl", &["workspaces", "-j"]).await?;
    parse_workspace_list(&raw)
}

/// One `[workspace] title` line per titled client, for the overview.
///
/// # Errors
///
/// Returns `Err` when `hyprctl` fails or returns malformed JSON.
pub async fn client_titles() -> Result<Vec<String>, ShellError> {
    let raw = capture("hyprctl", &["clients", "-j"]).await?;
    parse_client_titles(&raw)
}

fn parse_active_window(raw: &str) -> Result<String, ShellError> {
    let payload: ActiveWindowPayload = serde_json::from_str(raw)?;
    let title = payload
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| fallback::WINDOW_TITLE.to_string());
    Ok(title)
}

fn parse_active_workspace(raw: &str) -> Result<i32, ShellError> {
    let payload: WorkspacePayload = serde_json::from_str(raw)?;
    Ok(payload.id.unwrap_or(fallback::WORKSPACE_ID))
}

fn parse_workspace_list(raw: &str) -> Result<Vec<i32>, ShellError> {
    let payloads: Vec<WorkspacePayload> = serde_json::from_str(raw)?;
    Ok(payloads.into_iter().filter_map(|payload| payload.id).collect())
}

fn parse_client_titles(raw: &str) -> Result<Vec<String>, ShellError> {
    let payloads: Vec<ClientPayload> = serde_json::from_str(raw)?;
    Ok(payloads
        .into_iter()
        .filter_map(|client| {
            let title = client.title?;
            let title = title.trim();
            if title.is_empty() {
                return None;
            }
            let workspace = client
                .workspace
                .and_then(|workspace| workspace.id)
                .map_or_else(|| "?".to_string(), |id| id.to_string());
            Some(format!("[{workspace}] {title}"))
        })
        .collect())
}
