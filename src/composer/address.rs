use lettre::address::AddressError;
use lettre::message::Mailbox;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressListError {
    #[error("invalid {field} address '{value}'")]
    Invalid {
        field: &'static str,
        value: String,
        #[source]
        source: AddressError,
    },
    #[error("no usable {field} address was given")]
    Empty { field: &'static str },
}

pub fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, AddressListError> {
    let value = value.trim();
    value
        .parse::<Mailbox>()
        .map_err(|source| AddressListError::Invalid {
            field,
            value: value.to_string(),
            source,
        })
}

// Blank entries are dropped rather than rejected
pub fn parse_mailboxes(
    field: &'static str,
    values: &[String],
) -> Result<Vec<Mailbox>, AddressListError> {
    values
        .iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_mailbox(field, value))
        .collect()
}

pub fn parse_required_mailboxes(
    field: &'static str,
    values: &[String],
) -> Result<Vec<Mailbox>, AddressListError> {
    let mailboxes = parse_mailboxes(field, values)?;
    if mailboxes.is_empty() {
        return Err(AddressListError::Empty { field });
    }
    Ok(mailboxes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn keeps_order_and_display_names() {
        let parsed = parse_mailboxes("To", &strings(&["b@x.com", "Carol <c@x.com>"])).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].email.to_string(), "b@x.com");
        assert_eq!(parsed[1].name.as_deref(), Some("Carol"));
        assert_eq!(parsed[1].email.to_string(), "c@x.com");
    }

    #[test]
    fn skips_blank_entries() {
        let parsed = parse_mailboxes("Cc", &strings(&["", "  ", " d@x.com "])).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].email.to_string(), "d@x.com");
    }

    #[test]
    fn names_the_offending_field() {
        let err = parse_mailboxes("Bcc", &strings(&["not an address"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid Bcc address 'not an address'");
    }

    #[test]
    fn required_list_must_not_end_up_empty() {
        let err = parse_required_mailboxes("To", &strings(&[" "])).unwrap_err();
        assert!(matches!(err, AddressListError::Empty { field: "To" }));
    }
}
