use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub mod address;
pub mod clock;
pub mod input;
pub mod message;

use crate::composer::address::{parse_mailbox, parse_mailboxes, parse_required_mailboxes, AddressListError};
use crate::composer::clock::Clock;
use crate::composer::input::Input;
use crate::composer::message::{Attachment, Body, BodyKind, Message};

/// Raw message fields as they come off the command line.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub sender: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub kind: BodyKind,
    pub attachments: Vec<PathBuf>,
}

/// Builds the message, pulling the body from `input` when none was given.
///
/// Attachments that cannot be read are reported and left out; only
/// unusable addresses fail the build.
pub fn build<C, R>(draft: &Draft, clock: &C, input: &mut Input<R>) -> Result<Message, AddressListError>
where
    C: Clock + ?Sized,
    R: Read,
{
    let date = clock.now();

    let sender = parse_mailbox("From", &draft.sender)?;
    let to = parse_required_mailboxes("To", &draft.to)?;
    let cc = parse_mailboxes("Cc", &draft.cc)?;
    let bcc = parse_mailboxes("Bcc", &draft.bcc)?;

    let text = if draft.body.is_empty() {
        read_body(input)
    } else {
        draft.body.clone()
    };
    let body = (!text.is_empty()).then(|| Body {
        kind: draft.kind,
        text,
    });

    let attachments = draft
        .attachments
        .iter()
        .filter_map(|path| load_attachment(path))
        .collect();

    Ok(Message {
        sender,
        to,
        cc,
        bcc,
        subject: (!draft.subject.is_empty()).then(|| draft.subject.clone()),
        date,
        body,
        attachments,
    })
}

fn read_body<R: Read>(input: &mut Input<R>) -> String {
    match input.read_piped() {
        Ok(Some(text)) => {
            debug!("read {} bytes of body from standard input", text.len());
            text
        }
        Ok(None) => String::new(),
        Err(err) => {
            warn!("could not read the body from standard input: {}", err);
            String::new()
        }
    }
}

fn load_attachment(path: &Path) -> Option<Attachment> {
    let Some(filename) = path.file_name() else {
        warn!("attachment '{}' has no file name and will be skipped.", path.display());
        return None;
    };

    match fs::read(path) {
        Ok(content) => {
            debug!("attaching '{}' ({} bytes)", path.display(), content.len());
            Some(Attachment {
                filename: filename.to_string_lossy().into_owned(),
                content,
            })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("attachment '{}' does not exist and will be skipped.", path.display());
            None
        }
        Err(err) => {
            warn!("attachment '{}' could not be read ({}) and will be skipped.", path.display(), err);
            None
        }
    }
}
