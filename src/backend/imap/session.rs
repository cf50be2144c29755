//! IMAP session module.
//!
//! This module contains the remote connector that reaches the mailbox
//! of a folder owner through an IMAP server, authenticating as a
//! trusted account acting on behalf of that owner.

use log::{debug, log_enabled, trace, Level};
use native_tls::{TlsConnector, TlsStream};
use std::{
    io::{self, Read, Write},
    net::TcpStream,
    result,
};
use thiserror::Error;
use utf7_imap::{decode_utf7_imap as decode_utf7, encode_utf7_imap as encode_utf7};

use crate::{
    backend::{
        imap::{config, imap_flags::into_imap_flags},
        remote::{self, AuthToken, RemoteConnector, RemoteFolder, RemoteSession},
    },
    Flags, ImapConfig, ItemId, FOLDER_DELIM,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create tls connector")]
    CreateTlsConnectorError(#[source] native_tls::Error),
    #[error("cannot connect to imap server")]
    ConnectImapServerError(#[source] imap::Error),
    #[error("cannot authenticate to imap server as {1} on behalf of {2}")]
    AuthenticateImapServerError(#[source] imap::Error, String, String),
    #[error("cannot list mailboxes matching {1}")]
    ListMboxesError(#[source] imap::Error, String),
    #[error("cannot append message to mailbox {1}")]
    AppendMsgError(#[source] imap::Error, String),

    #[error(transparent)]
    ImapConfigError(#[from] config::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub enum ImapSessionStream {
    Tls(TlsStream<TcpStream>),
    Tcp(TcpStream),
}

impl Read for ImapSessionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.read(buf),
            Self::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for ImapSessionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.write(buf),
            Self::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.flush(),
            Self::Tcp(stream) => stream.flush(),
        }
    }
}

/// Represents the SASL PLAIN credentials of a trusted account acting
/// on behalf of a mailbox owner.
struct PlainAuthenticator {
    authzid: String,
    authcid: String,
    passwd: String,
}

impl imap::Authenticator for PlainAuthenticator {
    type Response = String;

    fn process(&self, _challenge: &[u8]) -> Self::Response {
        format!("{}\x00{}\x00{}", self.authzid, self.authcid, self.passwd)
    }
}

/// Represents the remote connector backed by an IMAP server.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    config: ImapConfig,
}

impl ImapConnector {
    pub fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    fn create_session(&self, token: &AuthToken, owner_id: &str) -> Result<ImapSession<'_>> {
        let builder = TlsConnector::builder()
            .danger_accept_invalid_certs(self.config.insecure())
            .danger_accept_invalid_hostnames(self.config.insecure())
            .build()
            .map_err(Error::CreateTlsConnectorError)?;

        let mut client_builder = imap::ClientBuilder::new(&self.config.host, self.config.port);
        if self.config.starttls() {
            client_builder.starttls();
        }

        let client = if self.config.ssl() {
            client_builder.connect(|domain, tcp| {
                let connector = TlsConnector::connect(&builder, domain, tcp)?;
                Ok(ImapSessionStream::Tls(connector))
            })
        } else {
            client_builder.connect(|_, tcp| Ok(ImapSessionStream::Tcp(tcp)))
        }
        .map_err(Error::ConnectImapServerError)?;

        let authenticator = PlainAuthenticator {
            authzid: owner_id.to_owned(),
            authcid: self.config.login.clone(),
            passwd: self.config.passwd(token)?,
        };

        let mut session = client.authenticate("PLAIN", &authenticator).map_err(|res| {
            Error::AuthenticateImapServerError(
                res.0,
                self.config.login.clone(),
                owner_id.to_owned(),
            )
        })?;
        session.debug = log_enabled!(Level::Trace);

        Ok(ImapSession {
            config: &self.config,
            session,
        })
    }
}

impl RemoteConnector for ImapConnector {
    fn connect(
        &self,
        token: &AuthToken,
        owner_id: &str,
    ) -> remote::Result<Box<dyn RemoteSession + '_>> {
        debug!("connecting to imap mailbox of {}", owner_id);
        let session = self.create_session(token, owner_id)?;
        Ok(Box::new(session))
    }
}

/// Represents an authenticated IMAP session to the mailbox of a
/// folder owner.
pub struct ImapSession<'a> {
    config: &'a ImapConfig,
    session: imap::Session<ImapSessionStream>,
}

impl ImapSession<'_> {
    /// Lists the mailbox with the given name, returning it only when
    /// it exists.
    fn find_mbox(&mut self, name: &str) -> Result<Option<RemoteFolder>> {
        let encoded_name = encode_utf7(name.to_owned());
        let mboxes = self
            .session
            .list(Some(""), Some(encoded_name.as_str()))
            .map_err(|err| Error::ListMboxesError(err, name.to_owned()))?;

        let folder = mboxes
            .iter()
            .find(|mbox| mbox.name() == encoded_name)
            .map(|mbox| RemoteFolder {
                id: mbox.name().to_owned(),
                path: decode_utf7(mbox.name().to_owned()),
                delim: mbox.delimiter().unwrap_or_default().to_owned(),
            });
        trace!("imap mailbox {}: {:?}", name, folder);

        Ok(folder)
    }
}

impl RemoteSession for ImapSession<'_> {
    fn get_folder_by_id(&mut self, id: &ItemId) -> remote::Result<Option<RemoteFolder>> {
        let config = self.config;
        match config.find_mount(id) {
            Some(name) => Ok(self.find_mbox(name)?),
            None => {
                debug!("no imap mailbox mounted for folder {}", id);
                Ok(None)
            }
        }
    }

    fn get_subfolder_by_path(
        &mut self,
        parent: &RemoteFolder,
        path: &str,
    ) -> remote::Result<Option<RemoteFolder>> {
        let delim = if parent.delim.is_empty() {
            FOLDER_DELIM.to_string()
        } else {
            parent.delim.clone()
        };

        let mut name = parent.path.clone();
        for segment in path.split(FOLDER_DELIM).filter(|s| !s.trim().is_empty()) {
            name.push_str(&delim);
            name.push_str(segment.trim());
        }

        Ok(self.find_mbox(&name)?)
    }

    fn add_message(
        &mut self,
        folder: &RemoteFolder,
        flags: &Flags,
        email: &[u8],
    ) -> remote::Result<()> {
        debug!("appending message to imap mailbox {}", folder.path);
        debug!("flags: {}", flags);

        self.session
            .append(&folder.id, email)
            .flags(into_imap_flags(flags))
            .finish()
            .map_err(|err| Error::AppendMsgError(err, folder.path.clone()))?;

        Ok(())
    }
}

impl Drop for ImapSession<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.session.logout() {
            debug!("cannot logout from imap server: {}", err);
        }
    }
}
