use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::composer::message::BodyKind;
use crate::composer::Draft;
use crate::delivery::TlsMode;
use crate::settings::Settings;

const DEFAULT_PORT: u16 = 25;

/// couri: send SMTP mail easily.
#[derive(Debug, Parser)]
#[command(name = "couri", version)]
pub struct Args {
    /// SMTP server hostname or IP
    #[arg(short = 'H', long)]
    pub host: Option<String>,
    /// SMTP port (default: 25)
    #[arg(short, long)]
    pub port: Option<u16>,
    /// SMTP username (optional)
    #[arg(short, long)]
    pub username: Option<String>,
    /// SMTP password (optional)
    #[arg(short = 'w', long)]
    pub password: Option<String>,
    /// Sender's email address
    #[arg(short, long)]
    pub sender: Option<String>,
    /// Recipient email(s)
    #[arg(short, long, required = true, num_args = 1..)]
    pub to: Vec<String>,
    /// CC recipient(s)
    #[arg(short, long, num_args = 0..)]
    pub cc: Vec<String>,
    /// BCC recipient(s)
    #[arg(short = 'k', long, num_args = 0..)]
    pub bcc: Vec<String>,
    /// Email subject
    #[arg(short = 'j', long, default_value = "")]
    pub subject: String,
    /// Email body (omit to read from pipe)
    #[arg(short, long, default_value = "")]
    pub body: String,
    /// Mime type for body
    #[arg(short, long, value_enum, default_value_t = BodyKind::Plain)]
    pub mimetype: BodyKind,
    /// Attachment file(s)
    #[arg(short, long, num_args = 0..)]
    pub attachment: Vec<PathBuf>,
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
    /// Log connection progress to stderr
    #[arg(long)]
    pub debug: bool,
    /// Verify SMTP TLS certificate
    #[arg(long)]
    pub verify_tls: bool,
    /// YAML file with defaults for host, port, credentials, sender and tls
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Prompt for the SMTP password when none was given
    #[arg(long)]
    pub ask_password: bool,
}

/// Everything a run needs, after merging the command line with the settings file.
#[derive(Debug, Clone)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
    pub draft: Draft,
    pub verbose: bool,
    pub ask_password: bool,
}

impl Args {
    /// Command line values win; host and sender must come from one of the two.
    pub fn into_options(self, settings: Settings) -> Result<Options, clap::Error> {
        let host = self
            .host
            .or(settings.host)
            .ok_or_else(|| missing("--host <HOST>"))?;
        let sender = self
            .sender
            .or(settings.sender)
            .ok_or_else(|| missing("--sender <SENDER>"))?;

        Ok(Options {
            host,
            port: self.port.or(settings.port).unwrap_or(DEFAULT_PORT),
            username: self.username.or(settings.username).unwrap_or_default(),
            password: self.password.or(settings.password).unwrap_or_default(),
            tls: TlsMode::resolve(self.verify_tls, settings.tls),
            draft: Draft {
                sender,
                to: self.to,
                cc: self.cc,
                bcc: self.bcc,
                subject: self.subject,
                body: self.body,
                kind: self.mimetype,
                attachments: self.attachment,
            },
            verbose: self.verbose,
            ask_password: self.ask_password,
        })
    }
}

fn missing(argument: &str) -> clap::Error {
    Args::command().error(
        ErrorKind::MissingRequiredArgument,
        format!("the following required arguments were not provided:\n  {}", argument),
    )
}
