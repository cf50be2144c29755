//! SMTP module.
//!
//! This module contains the representation of the SMTP email sender.

use lettre::{
    self,
    address::{Address, AddressError, Envelope},
    transport::smtp::{
        client::{Tls, TlsParameters},
        SmtpTransport,
    },
    Transport,
};
use log::debug;
use std::result;
use thiserror::Error;

use crate::{sender, ParsedMessage, Sender, SmtpConfig};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build smtp transport relay")]
    BuildTransportRelayError(#[source] lettre::transport::smtp::Error),
    #[error("cannot build smtp tls parameters")]
    BuildTlsParamsError(#[source] lettre::transport::smtp::Error),
    #[error("cannot parse recipient {1}")]
    ParseRecipientError(#[source] AddressError, String),
    #[error("cannot build smtp envelope")]
    BuildEnvelopeError(#[source] lettre::error::Error),
    #[error("cannot send email")]
    SendError(#[source] lettre::transport::smtp::Error),

    #[error(transparent)]
    SmtpConfigError(#[from] sender::smtp::config::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub struct Smtp<'a> {
    config: &'a SmtpConfig,
    transport: Option<SmtpTransport>,
}

impl<'a> Smtp<'a> {
    pub fn new(config: &'a SmtpConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    fn transport(&mut self) -> Result<&SmtpTransport> {
        match self.transport {
            Some(ref transport) => Ok(transport),
            None => {
                let transport = build_transport(self.config)?;
                Ok(self.transport.insert(transport))
            }
        }
    }
}

fn build_transport(config: &SmtpConfig) -> Result<SmtpTransport> {
    let builder = if config.ssl() {
        let tls = TlsParameters::builder(config.host.to_owned())
            .dangerous_accept_invalid_hostnames(config.insecure())
            .dangerous_accept_invalid_certs(config.insecure())
            .build()
            .map_err(Error::BuildTlsParamsError)?;

        if config.starttls() {
            SmtpTransport::starttls_relay(&config.host)
                .map_err(Error::BuildTransportRelayError)?
                .tls(Tls::Required(tls))
        } else {
            SmtpTransport::relay(&config.host)
                .map_err(Error::BuildTransportRelayError)?
                .tls(Tls::Wrapper(tls))
        }
    } else {
        SmtpTransport::relay(&config.host)
            .map_err(Error::BuildTransportRelayError)?
            .tls(Tls::None)
    };

    let builder = builder.port(config.port);
    let builder = match config.credentials()? {
        Some(credentials) => builder.credentials(credentials),
        None => builder,
    };

    Ok(builder.build())
}

/// Builds the envelope of a redirected message: the author of the
/// message as reverse path, the redirect target as only recipient.
fn build_envelope(email: &[u8], rcpt: &str) -> Result<Envelope> {
    let from = ParsedMessage::from_bytes(email)
        .ok()
        .map(|msg| msg.sender())
        .and_then(|sender| sender.parse::<Address>().ok());
    let to = rcpt
        .parse::<Address>()
        .map_err(|err| Error::ParseRecipientError(err, rcpt.to_owned()))?;

    Envelope::new(from, vec![to]).map_err(Error::BuildEnvelopeError)
}

impl<'a> Sender for Smtp<'a> {
    fn send(&mut self, email: &[u8], rcpt: &str) -> sender::Result<()> {
        let envelope = build_envelope(email, rcpt)?;
        debug!("sending message to {} with smtp", rcpt);

        self.transport()?
            .send_raw(&envelope, email)
            .map_err(Error::SendError)?;
        Ok(())
    }
}
