//! Mailbox reading and job-alert extraction.
//!
//! The get-mail stage feeds on locally synced mbox files. This crate splits
//! them into messages, keeps the Google job alerts, and de-duplicates them
//! into an ordered set ready to be written as a JSON document. Only the
//! headers the pipeline needs are parsed; everything else in a message is
//! carried as opaque body text.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailError>;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message missing `{0}` header")]
    MissingHeader(&'static str),

    #[error("malformed date header `{0}`: {1}")]
    Date(String, chrono::ParseError),
}

/// Sender of the alerts this pipeline cares about.
pub const JOB_ALERT_SENDER: &str = "Job Alerts from Google <notify-noreply@google.com>";

/// A message as read from an mbox, sender included.
///
/// `sender` is dropped on serialization: downstream stages only see the
/// alert payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(alias = "from", skip_serializing)]
    pub sender: String,
    pub subject: String,
    #[serde(alias = "date")]
    pub received: DateTime<FixedOffset>,
    pub body: String,
}

/// The de-duplicated alert payload written by the get-mail stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub received: DateTime<FixedOffset>,
    pub body: String,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        Self {
            subject: raw.subject,
            received: raw.received,
            body: raw.body,
        }
    }
}

/// Read every message in an mbox file.
pub fn read_mbox(path: &Path) -> Result<Vec<RawMessage>> {
    parse_mbox(&fs::read_to_string(path)?)
}

/// Split mbox text on `From ` separator lines and parse each message.
pub fn parse_mbox(text: &str) -> Result<Vec<RawMessage>> {
    let mut messages = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    for line in text.lines() {
        if line.starts_with("From ") {
            if let Some(lines) = current.take() {
                messages.push(parse_message(&lines)?);
            }
            current = Some(Vec::new());
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some(lines) = current {
        messages.push(parse_message(&lines)?);
    }
    Ok(messages)
}

/// Keep only job alerts, de-duplicated and ordered.
pub fn job_alerts(messages: impl IntoIterator<Item = RawMessage>) -> BTreeSet<Message> {
    messages
        .into_iter()
        .filter(|message| message.sender == JOB_ALERT_SENDER)
        .map(Message::from)
        .collect()
}

fn parse_message(lines: &[&str]) -> Result<RawMessage> {
    let split = lines
        .iter()
        .position(|line| line.is_empty())
        .unwrap_or(lines.len());
    let (header_lines, body_lines) = lines.split_at(split);
    let body_lines = body_lines.strip_prefix(&[""][..]).unwrap_or(body_lines);

    let mut sender = None;
    let mut date = None;
    let mut subject = String::new();
    for header in unfold(header_lines) {
        if let Some((name, value)) = header.split_once(':') {
            match name.to_ascii_lowercase().as_str() {
                "from" => sender = Some(value.trim().to_owned()),
                "date" => date = Some(value.trim().to_owned()),
                "subject" => subject = value.trim().to_owned(),
                _ => {}
            }
        }
    }

    let sender = sender.ok_or(MailError::MissingHeader("From"))?;
    let date = date.ok_or(MailError::MissingHeader("Date"))?;
    let received =
        DateTime::parse_from_rfc2822(&date).map_err(|err| MailError::Date(date.clone(), err))?;
    let body = body_lines
        .iter()
        .map(|line| match line.strip_prefix('>') {
            // mbox quoting: ">From " at the start of a body line
            Some(rest) if rest.starts_with("From ") => rest,
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RawMessage {
        sender,
        subject,
        received,
        body,
    })
}

fn unfold(lines: &[&str]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for line in lines {
        if line.starts_with([' ', '\t']) {
            if let Some(last) = headers.last_mut() {
                last.push(' ');
                last.push_str(line.trim_start());
            }
        } else {
            headers.push((*line).to_owned());
        }
    }
    headers
}
