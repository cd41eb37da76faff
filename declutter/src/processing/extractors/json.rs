use serde_json::Value;
use std::fmt::Write as _;
use std::io::BufRead;

use super::{ExtractedContent, SmartExtractor};
use crate::error::Result;

const ROLES_ENDPOINT: &str = "GET /api/roles";
const HEALTH_ENDPOINT: &str = "GET /api/health";

/// Pretty-print with two-space indentation, keys in document order
pub(crate) fn to_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render a scalar the way a person would read it: strings unquoted,
/// missing values as `None`
fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}

fn display_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None => default.to_string(),
        some => display(some),
    }
}

/// The `snapshots` list of an API test dump, if `data` has that shape
fn snapshots(data: &Value) -> Option<&Vec<Value>> {
    data.as_object()?.get("snapshots")?.as_array()
}

fn endpoint(snapshot: &Value) -> Option<&str> {
    snapshot.get("endpoint").and_then(Value::as_str)
}

fn render_snapshots(out: &mut String, data: &Value, snapshots: &[Value]) {
    if let Some(meta) = data.get("test_snapshots") {
        out.push_str("--- Metadata ---\n");
        let _ = writeln!(out, "Description: {}", display_or(meta.get("description"), "N/A"));
        let _ = writeln!(out, "Environment: {}", display_or(meta.get("environment"), "N/A"));
        let _ = writeln!(out, "Generated: {}", display_or(meta.get("generated_at"), "N/A"));
        out.push('\n');
    }

    out.push_str("--- API Endpoints ---\n");
    for snapshot in snapshots {
        let _ = writeln!(
            out,
            "- {} [{}]",
            display_or(snapshot.get("endpoint"), ""),
            display_or(snapshot.get("status"), "")
        );
    }

    for snapshot in snapshots.iter().filter(|s| endpoint(s) == Some(ROLES_ENDPOINT)) {
        out.push_str("\n--- Roles Defined ---\n");
        let roles = snapshot
            .get("response")
            .and_then(|r| r.get("data"))
            .and_then(Value::as_array);
        for role in roles.into_iter().flatten() {
            let _ = writeln!(
                out,
                "- {}: {} ({} users)",
                display(role.get("name")),
                display(role.get("description")),
                display(role.get("user_count"))
            );
        }
    }

    out.push_str("\n--- Error Codes ---\n");
    for snapshot in snapshots {
        let Some(err) = snapshot
            .get("response")
            .and_then(Value::as_object)
            .and_then(|r| r.get("error"))
        else {
            continue;
        };
        let _ = writeln!(
            out,
            "- {}: {}",
            display(err.get("code")),
            display(err.get("message"))
        );
    }

    for snapshot in snapshots.iter().filter(|s| endpoint(s) == Some(HEALTH_ENDPOINT)) {
        out.push_str("\n--- Health Check Info ---\n");
        let response = snapshot.get("response");
        let _ = writeln!(
            out,
            "Version: {}",
            display(response.and_then(|r| r.get("version")))
        );
        let checks = response
            .and_then(|r| r.get("checks"))
            .and_then(Value::as_object);
        for (service, info) in checks.into_iter().flatten() {
            let _ = writeln!(
                out,
                "- {service}: {} ({}ms)",
                display(info.get("status")),
                display(info.get("latency_ms"))
            );
        }
    }

    let permissions = snapshots.iter().find_map(|s| {
        s.get("response")?
            .as_object()?
            .get("data")?
            .as_object()?
            .get("permissions")
    });
    if let Some(perms) = permissions {
        out.push_str("\n--- Permissions Structure ---\n");
        let listed: Vec<String> = perms
            .as_array()
            .map(|items| items.iter().map(|p| display(Some(p))).collect())
            .unwrap_or_default();
        let _ = writeln!(out, "Permissions: {}", listed.join(", "));
    }
}

impl SmartExtractor {
    /// Summarize an API snapshot dump, or fall back to a typed overview plus
    /// the full structure for any other JSON
    pub(super) fn json_content<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        original_size: u64,
    ) -> Result<ExtractedContent> {
        let data: Value = serde_json::from_reader(reader)?;

        let mut content = format!("=== Extracted from {filename} ===\n\n");
        let items_found = if let Some(snapshots) = snapshots(&data) {
            render_snapshots(&mut content, &data, snapshots);
            snapshots.len()
        } else {
            match &data {
                Value::Object(map) => {
                    let keys: Vec<&str> = map.keys().take(10).map(String::as_str).collect();
                    let _ = writeln!(content, "Type: Object with {} keys", map.len());
                    let _ = writeln!(content, "Keys: {}\n", keys.join(", "));
                    content.push_str("--- Full Content ---\n");
                    content.push_str(&to_pretty(&data)?);
                    map.len()
                }
                Value::Array(items) => {
                    let _ = writeln!(content, "Type: Array with {} items", items.len());
                    content.push_str("--- Full Content ---\n");
                    content.push_str(&to_pretty(&data)?);
                    items.len()
                }
                scalar => {
                    content.push_str(&to_pretty(scalar)?);
                    0
                }
            }
        };

        Ok(ExtractedContent::new(
            filename,
            content,
            original_size,
            items_found,
        ))
    }
}
