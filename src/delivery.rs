use itertools::Itertools;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Address;
use log::debug;
use serde::Deserialize;

pub mod error;
pub mod session;

use crate::composer::message::Message;
use crate::delivery::error::{DeliveryError, Refusal};
use crate::delivery::session::{Connector, Guard, Session, SessionError};

/// How the session is secured after the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plaintext for the whole session.
    #[default]
    None,
    /// STARTTLS without certificate checks, if the server offers it.
    Opportunistic,
    /// STARTTLS against the trusted roots; refuses to continue otherwise.
    Verified,
}

impl TlsMode {
    /// `--verify-tls` overrides whatever the settings file asks for.
    pub fn resolve(verify_tls: bool, configured: Option<TlsMode>) -> TlsMode {
        if verify_tls {
            TlsMode::Verified
        } else {
            configured.unwrap_or_default()
        }
    }
}

#[derive(Clone)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub tls: TlsMode,
}

/// What was actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipients: Vec<Address>,
}

// Both halves must be present, otherwise the relay is used anonymously
pub fn credentials(username: &str, password: &str) -> Option<Credentials> {
    if username.is_empty() || password.is_empty() {
        None
    } else {
        Some(Credentials::new(username.to_string(), password.to_string()))
    }
}

/// Envelope recipients: `To`, then `Cc`, then `Bcc`, each address once.
pub fn recipients(message: &Message) -> Vec<Address> {
    message
        .to()
        .iter()
        .chain(message.cc())
        .chain(message.bcc())
        .map(|mailbox| mailbox.email.clone())
        .unique()
        .collect()
}

// Refusals belong to the step that was refused; anything else is the session failing
fn refused_or_broken<E: SessionError>(err: E, refused: fn(String) -> DeliveryError) -> DeliveryError {
    if err.is_refusal() {
        refused(err.to_string())
    } else {
        DeliveryError::Protocol(err.to_string())
    }
}

// Secure the session as requested before anything sensitive goes over it
fn negotiate_tls<S: Session>(session: &mut S, mode: TlsMode) -> Result<(), DeliveryError> {
    let verify = match mode {
        TlsMode::None => return Ok(()),
        TlsMode::Verified => true,
        TlsMode::Opportunistic if session.supports_starttls() => false,
        TlsMode::Opportunistic => {
            debug!("server does not offer STARTTLS, staying in plaintext");
            return Ok(());
        }
    };

    session
        .starttls(verify)
        .map_err(|e| DeliveryError::Protocol(format!("TLS negotiation failed: {}", e)))?;
    debug!("-- connection encrypted (certificate verified: {})", verify);
    Ok(())
}

/// Delivers `message` in a single SMTP session.
///
/// The session is opened, used once and closed; nothing is retried.
pub fn send<C: Connector>(
    connector: &C,
    server: &Server,
    message: &Message,
) -> Result<Delivery, DeliveryError> {
    let recipients = recipients(message);
    let payload = message.formatted();

    let session = connector
        .connect(&server.host, server.port)
        .map_err(|e| DeliveryError::Connect(e.to_string()))?;
    let mut session = Guard::new(session);
    debug!("-- connected to {}:{}", server.host, server.port);

    negotiate_tls(&mut *session, server.tls)?;

    if let Some(credentials) = &server.credentials {
        session
            .login(credentials)
            .map_err(|e| refused_or_broken(e, DeliveryError::Auth))?;
        debug!("-- logged in");
    }

    session
        .mail_from(&message.sender().email, !payload.is_ascii())
        .map_err(|e| refused_or_broken(e, DeliveryError::SenderRefused))?;

    let mut refused = Vec::new();
    for recipient in &recipients {
        if let Err(e) = session.rcpt_to(recipient) {
            // A dead session would fail every remaining address the same way
            if !e.is_refusal() {
                return Err(DeliveryError::Protocol(e.to_string()));
            }
            refused.push(Refusal {
                recipient: recipient.clone(),
                reason: e.to_string(),
            });
        }
    }
    if !refused.is_empty() {
        return Err(DeliveryError::RecipientsRefused(refused));
    }

    session
        .data(&payload)
        .map_err(|e| refused_or_broken(e, DeliveryError::Data))?;
    debug!("-- message accepted for {} recipient(s)", recipients.len());

    Ok(Delivery { recipients })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_flag_overrides_settings() {
        assert_eq!(TlsMode::resolve(true, None), TlsMode::Verified);
        assert_eq!(TlsMode::resolve(true, Some(TlsMode::Opportunistic)), TlsMode::Verified);
        assert_eq!(TlsMode::resolve(false, Some(TlsMode::Opportunistic)), TlsMode::Opportunistic);
        assert_eq!(TlsMode::resolve(false, None), TlsMode::None);
    }

    #[test]
    fn credentials_need_both_halves() {
        assert!(credentials("", "").is_none());
        assert!(credentials("user", "").is_none());
        assert!(credentials("", "secret").is_none());
        assert!(credentials("user", "secret").is_some());
    }

    #[test]
    fn tls_mode_reads_lowercase_names() {
        let mode: TlsMode = serde_yaml::from_str("opportunistic").unwrap();
        assert_eq!(mode, TlsMode::Opportunistic);
        let mode: TlsMode = serde_yaml::from_str("verified").unwrap();
        assert_eq!(mode, TlsMode::Verified);
    }
}
