use std::fmt;
use std::ops::{Deref, DerefMut};

use lettre::transport::smtp::authentication::{Credentials, DEFAULT_MECHANISMS};
use lettre::transport::smtp::client::{CertificateStore, SmtpConnection, TlsParameters};
use lettre::transport::smtp::commands::{Data, Mail, Rcpt};
use lettre::transport::smtp::extension::{ClientId, Extension, MailBodyParameter, MailParameter};
use lettre::transport::smtp::Error;
use lettre::Address;
use log::debug;

/// A failed session step.
pub trait SessionError: fmt::Display {
    /// The step itself was turned down, by a server reply or by the client's
    /// own checks, while the conversation is still in sync. Anything else
    /// (a dropped socket, a garbled reply) is not a refusal.
    fn is_refusal(&self) -> bool;
}

impl SessionError for Error {
    fn is_refusal(&self) -> bool {
        self.is_permanent() || self.is_transient() || self.is_client()
    }
}

/// One SMTP conversation, past the greeting and the first `EHLO`.
pub trait Session {
    type Error: SessionError;

    fn supports_starttls(&self) -> bool;

    /// Upgrades to TLS and says `EHLO` again.
    fn starttls(&mut self, verify: bool) -> Result<(), Self::Error>;

    fn login(&mut self, credentials: &Credentials) -> Result<(), Self::Error>;

    fn mail_from(&mut self, sender: &Address, eight_bit: bool) -> Result<(), Self::Error>;

    fn rcpt_to(&mut self, recipient: &Address) -> Result<(), Self::Error>;

    /// `DATA` followed by the payload and the terminating dot.
    fn data(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    fn quit(&mut self);
}

pub trait Connector {
    type Session: Session;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Self::Session, <Self::Session as Session>::Error>;
}

/// Opens real sessions through lettre's blocking SMTP client.
pub struct SmtpConnector {
    hello_name: ClientId,
    cert_store: CertificateStore,
}

impl SmtpConnector {
    pub fn new(cert_store: CertificateStore) -> Self {
        SmtpConnector {
            hello_name: ClientId::default(),
            cert_store,
        }
    }
}

impl Connector for SmtpConnector {
    type Session = SmtpSession;

    fn connect(&self, host: &str, port: u16) -> Result<SmtpSession, Error> {
        // No timeout of our own: the OS defaults apply.
        // lettre says EHLO inside connect and hands back no connection when
        // it is refused, so there is nothing to QUIT on that path.
        let connection = SmtpConnection::connect((host, port), None, &self.hello_name, None, None)?;
        Ok(SmtpSession {
            connection,
            domain: host.to_string(),
            hello_name: self.hello_name.clone(),
            cert_store: self.cert_store.clone(),
        })
    }
}

pub struct SmtpSession {
    connection: SmtpConnection,
    domain: String,
    hello_name: ClientId,
    cert_store: CertificateStore,
}

impl Session for SmtpSession {
    type Error = Error;

    fn supports_starttls(&self) -> bool {
        self.connection.can_starttls()
    }

    fn starttls(&mut self, verify: bool) -> Result<(), Error> {
        let parameters = TlsParameters::builder(self.domain.clone())
            .certificate_store(self.cert_store.clone())
            .dangerous_accept_invalid_certs(!verify)
            .dangerous_accept_invalid_hostnames(!verify)
            .build()?;
        self.connection.starttls(&parameters, &self.hello_name)
    }

    fn login(&mut self, credentials: &Credentials) -> Result<(), Error> {
        self.connection
            .auth(DEFAULT_MECHANISMS, credentials)
            .map(drop)
    }

    fn mail_from(&mut self, sender: &Address, eight_bit: bool) -> Result<(), Error> {
        let mut parameters = Vec::new();
        if eight_bit
            && self
                .connection
                .server_info()
                .supports_feature(Extension::EightBitMime)
        {
            parameters.push(MailParameter::Body(MailBodyParameter::EightBitMime));
        }
        self.connection
            .command(Mail::new(Some(sender.clone()), parameters))
            .map(drop)
    }

    fn rcpt_to(&mut self, recipient: &Address) -> Result<(), Error> {
        self.connection
            .command(Rcpt::new(recipient.clone(), Vec::new()))
            .map(drop)
    }

    fn data(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.connection.command(Data)?;
        self.connection.message(payload).map(drop)
    }

    // Sends QUIT unless already sent, then shuts the socket down
    fn quit(&mut self) {
        self.connection.abort();
    }
}

/// Holds a session open and closes it when dropped, whichever way the
/// transaction ended.
pub struct Guard<S: Session> {
    session: S,
}

impl<S: Session> Guard<S> {
    pub fn new(session: S) -> Self {
        Guard { session }
    }
}

impl<S: Session> Deref for Guard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> DerefMut for Guard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: Session> Drop for Guard<S> {
    fn drop(&mut self) {
        self.session.quit();
        debug!("session closed");
    }
}
