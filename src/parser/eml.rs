//! Import of individual `.eml` files (RFC 5322 messages) into [`Email`] values.

use std::path::Path;

use mail_parser::MessageParser;

use crate::error::{MailRulesError, Result};
use crate::model::email::Email;

/// Parse a single `.eml` file.
///
/// `from` becomes `Name <address>` when the sender has a display name, the
/// body is the first text part (or the first HTML part stripped to text),
/// and Gmail's `X-Gmail-Labels` header seeds `labels`. The source file name
/// and the `Date`/`Message-ID` headers are kept as pass-through fields.
pub fn import_eml(path: impl AsRef<Path>) -> Result<Email> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| MailRulesError::io(path, e))?;
    let mut email =
        parse_message(&data).ok_or_else(|| MailRulesError::InvalidEml(path.to_path_buf()))?;
    email.extra.insert(
        "source".into(),
        serde_json::Value::String(path.display().to_string()),
    );
    tracing::debug!(path = %path.display(), subject = %email.subject, "Imported message");
    Ok(email)
}

/// Parse raw message bytes. Returns `None` if the bytes carry no headers at all.
pub fn parse_message(data: &[u8]) -> Option<Email> {
    let msg = MessageParser::default().parse(data)?;
    if msg.headers().is_empty() {
        return None;
    }

    let from = msg
        .from()
        .and_then(|addr| addr.first())
        .map(|addr| {
            let address = addr.address.as_deref().unwrap_or_default();
            match addr.name.as_deref() {
                Some(name) if !name.trim().is_empty() => format!("{} <{address}>", name.trim()),
                _ => address.to_string(),
            }
        })
        .unwrap_or_default();

    let body = msg
        .body_text(0)
        .map(|s| s.into_owned())
        .or_else(|| msg.body_html(0).map(|html| html_to_text(&html)))
        .unwrap_or_default();

    let labels = msg
        .headers()
        .iter()
        .find(|h| h.name().eq_ignore_ascii_case("X-Gmail-Labels"))
        .and_then(|h| h.value().as_text())
        .map(parse_gmail_labels)
        .unwrap_or_default();

    let mut email = Email {
        from,
        subject: msg.subject().unwrap_or_default().to_string(),
        body,
        labels,
        ..Email::default()
    };
    if let Some(date) = msg.date() {
        email
            .extra
            .insert("timestamp".into(), serde_json::Value::String(date.to_rfc3339()));
    }
    if let Some(id) = msg.message_id() {
        email
            .extra
            .insert("message_id".into(), serde_json::Value::String(id.to_string()));
    }
    Some(email)
}

/// `"Inbox,Important, Work "` → `["Inbox", "Important", "Work"]`.
fn parse_gmail_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Reduce an HTML body to plain text good enough for substring matching.
fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["<br>", "<br/>", "<br />", "</p>", "</div>", "</li>", "</tr>"] {
        text = text.replace(tag, "\n");
    }

    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
