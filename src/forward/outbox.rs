//! Forwarding into an outbox directory.
//!
//! Each forward request becomes one `.eml` file (an RFC 5322 message built
//! with `lettre`) that a separate sender can pick up.

use std::path::{Path, PathBuf};

use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;

use super::Forwarder;
use crate::error::{MailRulesError, Result};
use crate::model::email::Email;

/// Writes forwarded emails as `.eml` files into `dir`.
#[derive(Debug, Clone)]
pub struct OutboxForwarder {
    dir: PathBuf,
    sender: String,
}

impl OutboxForwarder {
    /// `sender` goes into the `From:` header of every forwarded message.
    pub fn new(dir: impl Into<PathBuf>, sender: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            sender: sender.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the forwarded message and return its path.
    pub fn write_message(&self, email: &Email, destination: &str) -> Result<PathBuf> {
        let message = render_forward(email, destination, &self.sender)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| MailRulesError::io(&self.dir, e))?;

        let path = unique_path(&self.dir, &eml_filename(email, destination));
        std::fs::write(&path, message).map_err(|e| MailRulesError::io(&path, e))?;
        Ok(path)
    }
}

impl Forwarder for OutboxForwarder {
    fn forward(&self, email: &Email, destination: &str) {
        match self.write_message(email, destination) {
            Ok(path) => {
                tracing::info!(destination, path = %path.display(), "Queued forward in outbox");
            }
            Err(e) => {
                tracing::warn!(destination, error = %e, "Failed to queue forward");
            }
        }
    }
}

/// Render the forwarded copy as an RFC 5322 message.
///
/// Both mailboxes are validated and non-ASCII header text is encoded, so the
/// header section is always 7-bit clean.
fn render_forward(email: &Email, destination: &str, sender: &str) -> Result<Vec<u8>> {
    let from = parse_mailbox(sender)?;
    let to = parse_mailbox(destination)?;
    let subject = single_line(&email.subject);
    let original_from = single_line(&email.from);

    let mut text = String::with_capacity(email.body.len() + 128);
    text.push_str("---------- Forwarded message ----------\n");
    text.push_str(&format!("From: {original_from}\n"));
    text.push_str(&format!("Subject: {subject}\n\n"));
    text.push_str(&email.body);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Fwd: {subject}"))
        .date_now()
        .header(ContentType::TEXT_PLAIN)
        .body(text)?;
    Ok(message.formatted())
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailRulesError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Header values must not carry line breaks.
fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

/// Format: `{timestamp}_{destination}_{subject}.eml`, truncated to 200 chars.
fn eml_filename(email: &Email, destination: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S%3f").to_string();
    let dest = sanitize_filename_part(destination, 40);
    let subject = sanitize_filename_part(&email.subject, 80);

    let name = format!("{stamp}_{dest}_{subject}.eml");
    if name.len() > 200 {
        let mut cut = 196;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}.eml", &name[..cut])
    } else {
        name
    }
}

/// Append `-1`, `-2`, ... before the extension until the name is free.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let stem = filename.trim_end_matches(".eml");
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}.eml")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Replace characters that are unsafe in filenames with `_` and truncate.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '@') {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}
