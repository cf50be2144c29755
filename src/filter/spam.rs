//! Spam module.
//!
//! This module contains the detector reading the verdict the upstream
//! spam filter left in the message headers.

use log::{debug, trace};
use regex::Regex;

use crate::{
    filter::{Error, Result},
    ParsedMessage, SpamConfig,
};

/// Represents the spam detector, built once from the spam config and
/// shared by every delivery.
#[derive(Debug, Clone, Default)]
pub struct SpamDetector {
    header: Option<String>,
    header_value: Option<Regex>,
}

impl SpamDetector {
    /// Builds the detector. The value pattern has to match the whole
    /// header value, an invalid pattern is an error.
    pub fn new(config: &SpamConfig) -> Result<Self> {
        let header_value = match config.header_value() {
            Some(pattern) => {
                let anchored = format!("^(?:{})$", pattern);
                let regex = Regex::new(&anchored)
                    .map_err(|err| Error::CompileSpamPatternError(err, pattern.to_owned()))?;
                Some(regex)
            }
            None => None,
        };

        let detector = Self {
            header: config.header().map(ToOwned::to_owned),
            header_value,
        };
        trace!("spam detector: {:?}", detector);

        Ok(detector)
    }

    pub fn is_spam(&self, msg: &ParsedMessage) -> bool {
        let header = match self.header.as_deref() {
            Some(header) => header,
            None => return false,
        };

        let is_spam = match (msg.header(header), &self.header_value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(val), Some(regex)) => regex.is_match(&val),
        };
        debug!("spam header {}: spam={}", header, is_spam);

        is_spam
    }
}

#[cfg(test)]
mod tests {
    use crate::{filter::Error, ParsedMessage, SpamConfig};

    use super::SpamDetector;

    fn message(spam_header: &str) -> ParsedMessage {
        ParsedMessage::from_bytes(format!("From: alice@localhost\n{}\n\nHello!\n", spam_header))
            .unwrap()
    }

    fn config(header: Option<&str>, header_value: Option<&str>) -> SpamConfig {
        SpamConfig {
            header: header.map(ToOwned::to_owned),
            header_value: header_value.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn no_header_configured() {
        let detector = SpamDetector::new(&SpamConfig::default()).unwrap();
        assert!(!detector.is_spam(&message("X-Spam-Flag: YES")));
    }

    #[test]
    fn header_presence() {
        let detector = SpamDetector::new(&config(Some("X-Spam-Flag"), None)).unwrap();
        assert!(detector.is_spam(&message("X-Spam-Flag: NO")));
        assert!(detector.is_spam(&message("x-spam-flag: YES")));
        assert!(!detector.is_spam(&message("Subject: hi")));
    }

    #[test]
    fn header_value_full_match() {
        let detector = SpamDetector::new(&config(Some("X-Spam-Flag"), Some("YES"))).unwrap();
        assert!(detector.is_spam(&message("X-Spam-Flag: YES")));
        assert!(!detector.is_spam(&message("X-Spam-Flag: YES, score=8")));
        assert!(!detector.is_spam(&message("X-Spam-Flag: NO")));
        assert!(!detector.is_spam(&message("Subject: hi")));

        let detector =
            SpamDetector::new(&config(Some("X-Spam-Status"), Some("Yes|Spam.*"))).unwrap();
        assert!(detector.is_spam(&message("X-Spam-Status: Spam, score=8")));
        assert!(!detector.is_spam(&message("X-Spam-Status: No, not Spam")));
    }

    #[test]
    fn invalid_pattern() {
        assert!(matches!(
            SpamDetector::new(&config(Some("X-Spam-Flag"), Some("(YES"))),
            Err(Error::CompileSpamPatternError(_, _))
        ));
    }
}
