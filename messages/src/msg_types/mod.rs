pub mod cred_issuance;

use serde::Serialize;

pub use cred_issuance::CredentialIssuanceTypeV1_0;

use crate::error::MsgTypeError;

/// Borrowed decomposition of a message type URI of the form
/// `<doc-uri><protocol>/<version>/<message-name>`, e.g.
/// `did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/issue-credential/1.0/offer-credential`.
///
/// The grammar is matched from the right, so any doc URI prefix is accepted
/// (`did:...;spec/` as well as `https://didcomm.org/` styles). Dispatch on the
/// parsed parts is exact string matching; versions are not negotiated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MessageType<'a> {
    pub doc_uri: &'a str,
    pub protocol: &'a str,
    pub version: &'a str,
    pub kind: &'a str,
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-".contains(c))
}

impl<'a> TryFrom<&'a str> for MessageType<'a> {
    type Error = MsgTypeError;

    fn try_from(uri: &'a str) -> Result<Self, Self::Error> {
        let malformed = || MsgTypeError::InvalidTypeUri(uri.to_owned());

        let (rest, kind) = uri.rsplit_once('/').ok_or_else(malformed)?;
        let (rest, version) = rest.rsplit_once('/').ok_or_else(malformed)?;
        let (doc_uri, protocol) = rest.rsplit_once('/').unwrap_or(("", rest));

        if !valid_segment(kind)
            || !valid_segment(protocol)
            || !version.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(malformed());
        }

        Ok(MessageType {
            doc_uri,
            protocol,
            version,
            kind,
        })
    }
}

/// Wrapper serializing a message along with the `@type` field
/// corresponding to its kind.
#[derive(Debug, Serialize)]
pub struct MsgWithType<'a, T> {
    #[serde(rename = "@type")]
    msg_type: String,
    #[serde(flatten)]
    message: &'a T,
}

impl<'a, T> MsgWithType<'a, T> {
    pub fn new(kind: CredentialIssuanceTypeV1_0, message: &'a T) -> Self {
        Self {
            msg_type: kind.type_uri(),
            message,
        }
    }
}
