use itertools::Itertools;
use lettre::Address;
use thiserror::Error;

/// A recipient the server would not accept, with the server's reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub recipient: Address,
    pub reason: String,
}

/// Every way a delivery can fail. Each one ends the run.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Error connecting to SMTP server: {0}")]
    Connect(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Sender address refused: {0}")]
    SenderRefused(String),
    #[error("Recipient(s) refused: {}", describe(.0))]
    RecipientsRefused(Vec<Refusal>),
    #[error("SMTP data error: {0}")]
    Data(String),
    #[error("SMTP error: {0}")]
    Protocol(String),
}

fn describe(refusals: &[Refusal]) -> String {
    refusals
        .iter()
        .map(|refusal| format!("{} ({})", refusal.recipient, refusal.reason))
        .join(", ")
}
