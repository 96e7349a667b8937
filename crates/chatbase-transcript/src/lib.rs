//! Rendering of conversation records into human-readable transcripts.

use chatbase_core::{ConversationRecord, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const BANNER_WIDTH: usize = 80;
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn rule(fill: char) -> String {
    fill.to_string().repeat(BANNER_WIDTH)
}

/// Format an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Offset-carrying values (including a trailing `Z`) are converted to UTC;
/// naive datetimes and bare dates are formatted as-is. Anything that does
/// not parse is returned unchanged — this never fails.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format(DISPLAY_FORMAT).to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format(DISPLAY_FORMAT).to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return midnight.format(DISPLAY_FORMAT).to_string();
        }
    }

    raw.to_string()
}

/// Render a single conversation: bordered header block, then the
/// speaker-labeled transcript (or a "No transcript available." notice).
pub fn format_conversation(conversation: &ConversationRecord) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(rule('='));
    lines.push(format!(
        "CONVERSATION ID: {}",
        conversation.id().unwrap_or_else(|| "N/A".to_string())
    ));
    lines.push(format!(
        "Session ID: {}",
        conversation.session_id().unwrap_or_else(|| "N/A".to_string())
    ));

    if let Some(created) = conversation.created_at() {
        lines.push(format!("Started: {}", format_timestamp(&created)));
    }
    if let Some(updated) = conversation.updated_at() {
        lines.push(format!("Last Updated: {}", format_timestamp(&updated)));
    }
    if let Some(source) = conversation.source() {
        lines.push(format!("Source: {}", source));
    }
    if let Some(user_id) = conversation.user_id() {
        lines.push(format!("User ID: {}", user_id));
    }

    lines.push(rule('='));
    lines.push(String::new());

    let messages = conversation.messages();
    if messages.is_empty() {
        lines.push("No transcript available.".to_string());
    } else {
        lines.push("TRANSCRIPT:".to_string());
        lines.push(rule('-'));

        for message in &messages {
            let timestamp = message
                .timestamp()
                .map(|ts| format!(" [{}]", format_timestamp(&ts)))
                .unwrap_or_default();

            lines.push(format!("\n[{}]{}", message.speaker(), timestamp));
            lines.push(message.content());

            if let Some(feedback) = message.feedback() {
                lines.push(format!("  Feedback: {}", feedback));
            }
        }

        lines.push(rule('-'));
    }

    lines.push(String::new());
    lines.push(String::new());

    lines.join("\n")
}

/// Assemble the full report: a summary banner and numbered conversation
/// blocks, or — when nothing matched — a notice plus a pretty-printed dump
/// of the raw response body.
pub fn render_report(conversations: &[ConversationRecord], raw: &Value) -> Result<String> {
    let mut blocks: Vec<String> = Vec::new();

    if conversations.is_empty() {
        blocks.push("\nNo conversations found for the specified date range.".to_string());
        blocks.push("\nRaw API Response:".to_string());
        blocks.push(serde_json::to_string_pretty(raw)?);
    } else {
        let total = conversations.len();
        blocks.push(format!(
            "\n{}\nFOUND {} CONVERSATION(S)\n{}\n",
            rule('='),
            total,
            rule('=')
        ));

        for (idx, conversation) in conversations.iter().enumerate() {
            blocks.push(format!(
                "\n{}\nCONVERSATION #{} of {}\n{}\n",
                rule('#'),
                idx + 1,
                total,
                rule('#')
            ));
            blocks.push(format_conversation(conversation));
        }
    }

    Ok(blocks.join("\n"))
}
