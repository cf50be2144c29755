//! Redirect module.
//!
//! This module prepares the copy of a message sent to a redirect
//! target, making sure the headers required by the transport exist.

use chrono::{DateTime, Local};
use log::{debug, info};
use mailparse::MailParseError;
use std::result;
use thiserror::Error;
use uuid::Uuid;

use crate::ParsedMessage;

#[derive(Debug, Error)]
enum NormalizeError {
    #[error("cannot parse mime structure")]
    ParseMimeError(#[source] MailParseError),
    #[error("cannot parse date {1:?}")]
    ParseDateError(#[source] chrono::ParseError, String),
}

/// Returns the raw message to hand over to the transport.
///
/// A message with a valid MIME structure gets `MIME-Version`,
/// `Message-ID` and `Date` headers prepended when missing. A message
/// that cannot be normalized is wrapped with the minimal
/// `MIME-Version` and `Message-ID` headers only.
pub fn prepare_redirect(msg: &ParsedMessage) -> Vec<u8> {
    match normalize(msg) {
        Ok(raw) => raw,
        Err(err) => {
            info!("message format error detected, minimal headers wrapper in use");
            debug!("message format error: {}", err);
            with_transport_headers(msg, false)
        }
    }
}

/// Checks the MIME structure and the existing date of the message
/// before completing its transport headers.
fn normalize(msg: &ParsedMessage) -> result::Result<Vec<u8>, NormalizeError> {
    mailparse::parse_mail(msg.raw()).map_err(NormalizeError::ParseMimeError)?;

    if let Some(date) = msg.header("Date") {
        DateTime::parse_from_rfc2822(date.trim())
            .map_err(|err| NormalizeError::ParseDateError(err, date.clone()))?;
    }

    Ok(with_transport_headers(msg, true))
}

fn with_transport_headers(msg: &ParsedMessage, full: bool) -> Vec<u8> {
    let eol = if msg.raw().windows(2).any(|w| w == b"\r\n") {
        "\r\n"
    } else {
        "\n"
    };

    let mut headers = String::new();

    if msg.header("MIME-Version").is_none() {
        headers.push_str("MIME-Version: 1.0");
        headers.push_str(eol);
    }

    if msg.message_id().is_none() {
        headers.push_str(&format!("Message-ID: {}", generate_message_id(msg)));
        headers.push_str(eol);
    }

    if full && msg.header("Date").is_none() {
        headers.push_str(&format!("Date: {}", Local::now().to_rfc2822()));
        headers.push_str(eol);
    }

    debug!("prepended redirect headers: {:?}", headers);

    let mut raw = headers.into_bytes();
    raw.extend_from_slice(msg.raw());
    raw
}

fn generate_message_id(msg: &ParsedMessage) -> String {
    let sender = msg.sender();
    let domain = sender
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
        .unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

#[cfg(test)]
mod tests {
    use concat_with::concat_line;

    use crate::ParsedMessage;

    use super::prepare_redirect;

    #[test]
    fn complete_headers_untouched() {
        let raw = concat_line!(
            "MIME-Version: 1.0",
            "Message-ID: <id@localhost>",
            "Date: Thu, 1 Sep 2022 10:00:00 +0000",
            "From: alice@localhost",
            "",
            "Hello!",
        );
        let msg = ParsedMessage::from_bytes(raw).unwrap();
        assert_eq!(raw.as_bytes(), prepare_redirect(&msg).as_slice());
    }

    #[test]
    fn missing_headers_prepended() {
        let msg = ParsedMessage::from_bytes(concat_line!(
            "From: alice@example.com",
            "",
            "Hello!",
        ))
        .unwrap();
        let redirected = ParsedMessage::from_bytes(prepare_redirect(&msg)).unwrap();

        assert_eq!(Some("1.0".into()), redirected.header("MIME-Version"));
        assert!(redirected.header("Date").is_some());
        let message_id = redirected.message_id().unwrap();
        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@example.com>"));
        assert_eq!("alice@example.com", redirected.sender());
    }

    #[test]
    fn malformed_date_gets_minimal_headers() {
        let msg = ParsedMessage::from_bytes(concat_line!(
            "From: alice@example.com",
            "Date: sometime last week",
            "",
            "Hello!",
        ))
        .unwrap();
        let redirected = ParsedMessage::from_bytes(prepare_redirect(&msg)).unwrap();

        assert_eq!(Some("1.0".into()), redirected.header("MIME-Version"));
        assert!(redirected
            .message_id()
            .unwrap()
            .ends_with("@example.com>"));
        // the existing date is left alone, none is added
        assert_eq!(vec!["sometime last week"], redirected.headers("Date"));
    }

    #[test]
    fn malformed_date_with_message_id() {
        let raw = concat_line!(
            "MIME-Version: 1.0",
            "Message-ID: <id@localhost>",
            "Date: yesterday",
            "",
            "Hello!",
        );
        let msg = ParsedMessage::from_bytes(raw).unwrap();
        assert_eq!(raw.as_bytes(), prepare_redirect(&msg).as_slice());
    }
}
