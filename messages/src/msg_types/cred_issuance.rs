use std::str::FromStr;

use strum_macros::{AsRefStr, EnumString};

use super::MessageType;
use crate::error::{MsgTypeError, MsgTypeResult};

/// Doc URI used for outbound message types, taken from the transcript DID
/// published for the issue-credential 1.0 RFC.
pub const DOC_URI: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec";
pub const PROTOCOL: &str = "issue-credential";
pub const VERSION_1_0: &str = "1.0";

/// Message kinds of the issue-credential 1.0 protocol.
///
/// `CredentialPreview` is not a standalone message; it is only encountered
/// embedded within an offer or proposal.
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum CredentialIssuanceTypeV1_0 {
    ProposeCredential,
    OfferCredential,
    RequestCredential,
    IssueCredential,
    Ack,
    CredentialPreview,
}

impl CredentialIssuanceTypeV1_0 {
    /// Full `@type` URI for this message kind.
    pub fn type_uri(self) -> String {
        format!("{DOC_URI}/{PROTOCOL}/{VERSION_1_0}/{}", self.as_ref())
    }

    /// Resolve a full `@type` URI into a kind, requiring an exact
    /// protocol and version match.
    pub fn from_type_uri(uri: &str) -> MsgTypeResult<Self> {
        Self::from_msg_type(&MessageType::try_from(uri)?)
    }

    pub fn from_msg_type(msg_type: &MessageType<'_>) -> MsgTypeResult<Self> {
        if msg_type.protocol != PROTOCOL {
            return Err(MsgTypeError::UnknownProtocol(msg_type.protocol.to_owned()));
        }
        if msg_type.version != VERSION_1_0 {
            return Err(MsgTypeError::UnknownVersion(msg_type.version.to_owned()));
        }
        Self::from_str(msg_type.kind)
            .map_err(|_| MsgTypeError::UnknownKind(msg_type.kind.to_owned()))
    }
}
