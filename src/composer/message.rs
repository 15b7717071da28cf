use chrono::{DateTime, FixedOffset};
use lettre::message::header::{self, ContentType, HeaderName, HeaderValue, Headers};
use lettre::message::{Attachment as AttachmentPart, Mailbox, Mailboxes, MultiPart, SinglePart};

use crate::composer::clock::RFC5322_DATE;

const DATE: HeaderName = HeaderName::new_from_ascii_str("Date");
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BodyKind {
    #[default]
    Plain,
    Html,
}

impl BodyKind {
    fn content_type(self) -> ContentType {
        match self {
            BodyKind::Plain => ContentType::TEXT_PLAIN,
            BodyKind::Html => ContentType::TEXT_HTML,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub kind: BodyKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Multipart container kind of the top-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mixed,
    Alternative,
}

/// A composed email, ready to be handed to the transport.
///
/// Nothing changes after construction; `Bcc` recipients are carried along
/// for the envelope but never rendered as a header.
#[derive(Debug, Clone)]
pub struct Message {
    pub(super) sender: Mailbox,
    pub(super) to: Vec<Mailbox>,
    pub(super) cc: Vec<Mailbox>,
    pub(super) bcc: Vec<Mailbox>,
    pub(super) subject: Option<String>,
    pub(super) date: DateTime<FixedOffset>,
    pub(super) body: Option<Body>,
    pub(super) attachments: Vec<Attachment>,
}

impl Message {
    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    pub fn bcc(&self) -> &[Mailbox] {
        &self.bcc
    }

    /// `None` for a header-only message.
    pub fn container(&self) -> Option<Container> {
        if !self.attachments.is_empty() {
            Some(Container::Mixed)
        } else if self.body.is_some() {
            Some(Container::Alternative)
        } else {
            None
        }
    }

    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert_raw(HeaderValue::new(
            DATE,
            self.date.format(RFC5322_DATE).to_string(),
        ));
        headers.set(header::From::from(Mailboxes::from(self.sender.clone())));
        headers.set(header::To::from(mailboxes(&self.to)));
        if !self.cc.is_empty() {
            headers.set(header::Cc::from(mailboxes(&self.cc)));
        }
        if let Some(subject) = &self.subject {
            headers.set(header::Subject::from(subject.clone()));
        }
        headers.set(header::MIME_VERSION_1_0);
        headers
    }

    fn mime_body(&self) -> Option<MultiPart> {
        let body = self.body.iter().map(|body| {
            SinglePart::builder()
                .header(body.kind.content_type())
                .body(body.text.clone())
        });
        let attachments = self.attachments.iter().map(|attachment| {
            AttachmentPart::new(attachment.filename.clone())
                .body(attachment.content.clone(), octet_stream())
        });
        let mut parts = body.chain(attachments);

        let builder = match self.container()? {
            Container::Mixed => MultiPart::mixed(),
            Container::Alternative => MultiPart::alternative(),
        };
        let first = parts.next()?;
        Some(parts.fold(builder.singlepart(first), MultiPart::singlepart))
    }

    /// Renders the message as it goes over the wire after `DATA`.
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = self.headers().to_string().into_bytes();
        match self.mime_body() {
            Some(multipart) => out.extend_from_slice(&multipart.formatted()),
            None => out.extend_from_slice(b"\r\n"),
        }
        out
    }
}

fn mailboxes(list: &[Mailbox]) -> Mailboxes {
    list.iter().cloned().fold(Mailboxes::new(), Mailboxes::with)
}

// lettre has no constant for it; parsing a fixed, well-formed literal cannot fail
fn octet_stream() -> ContentType {
    ContentType::parse(OCTET_STREAM).expect("application/octet-stream is a valid content type")
}
