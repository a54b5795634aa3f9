#![allow(clippy::module_inception)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::large_enum_variant)]

pub mod decorators;
pub mod error;
pub mod misc;
pub mod msg_fields;
pub mod msg_parts;
pub mod msg_types;

use derive_more::From;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    msg_fields::{
        ack::AckCredentialV1, issue_credential::IssueCredentialV1,
        offer_credential::OfferCredentialV1, propose_credential::ProposeCredentialV1,
        request_credential::RequestCredentialV1,
    },
    msg_types::{CredentialIssuanceTypeV1_0, MsgWithType},
};

/// Enum representing any standalone message of the issue-credential 1.0 protocol.
///
/// It abstracts away the `@type` field and uses it to determine how
/// to deserialize the input into the correct message type.
///
/// It also automatically appends the correct `@type` field when serializing
/// a message.
#[derive(Clone, Debug, From, PartialEq)]
pub enum CredentialIssuanceV1 {
    ProposeCredential(ProposeCredentialV1),
    OfferCredential(OfferCredentialV1),
    RequestCredential(RequestCredentialV1),
    IssueCredential(IssueCredentialV1),
    Ack(AckCredentialV1),
}

impl CredentialIssuanceV1 {
    pub fn kind(&self) -> CredentialIssuanceTypeV1_0 {
        match self {
            Self::ProposeCredential(_) => CredentialIssuanceTypeV1_0::ProposeCredential,
            Self::OfferCredential(_) => CredentialIssuanceTypeV1_0::OfferCredential,
            Self::RequestCredential(_) => CredentialIssuanceTypeV1_0::RequestCredential,
            Self::IssueCredential(_) => CredentialIssuanceTypeV1_0::IssueCredential,
            Self::Ack(_) => CredentialIssuanceTypeV1_0::Ack,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::ProposeCredential(msg) => &msg.id,
            Self::OfferCredential(msg) => &msg.id,
            Self::RequestCredential(msg) => &msg.id,
            Self::IssueCredential(msg) => &msg.id,
            Self::Ack(msg) => &msg.id,
        }
    }

    /// The thread id correlating this message to the one that prompted it,
    /// if the message carries a `~thread` decorator.
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::ProposeCredential(msg) => {
                msg.decorators.thread.as_ref().map(|t| t.thid.as_str())
            }
            Self::OfferCredential(msg) => msg.decorators.thread.as_ref().map(|t| t.thid.as_str()),
            Self::RequestCredential(msg) => {
                msg.decorators.thread.as_ref().map(|t| t.thid.as_str())
            }
            Self::IssueCredential(msg) => Some(msg.decorators.thread.thid.as_str()),
            Self::Ack(msg) => Some(msg.decorators.thread.thid.as_str()),
        }
    }
}

impl Serialize for CredentialIssuanceV1 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::ProposeCredential(v) => MsgWithType::new(self.kind(), v).serialize(serializer),
            Self::OfferCredential(v) => MsgWithType::new(self.kind(), v).serialize(serializer),
            Self::RequestCredential(v) => MsgWithType::new(self.kind(), v).serialize(serializer),
            Self::IssueCredential(v) => MsgWithType::new(self.kind(), v).serialize(serializer),
            Self::Ack(v) => MsgWithType::new(self.kind(), v).serialize(serializer),
        }
    }
}

/// Custom [`Deserialize`] impl using the `@type` field as internal tag.
///
/// The remaining fields are buffered, the `@type` URI is parsed into a
/// [`CredentialIssuanceTypeV1_0`] and the buffered payload is then
/// deserialized into the matching message type. The kind match is
/// exhaustive, so adding a message kind forces handling it here.
impl<'de> Deserialize<'de> for CredentialIssuanceV1 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TypeAndContent {
            #[serde(rename = "@type")]
            msg_type: String,
            #[serde(flatten)]
            content: serde_json::Value,
        }

        let TypeAndContent { msg_type, content } = TypeAndContent::deserialize(deserializer)?;
        let kind =
            CredentialIssuanceTypeV1_0::from_type_uri(&msg_type).map_err(D::Error::custom)?;

        match kind {
            CredentialIssuanceTypeV1_0::ProposeCredential => {
                serde_json::from_value::<ProposeCredentialV1>(content)
                    .map(From::from)
                    .map_err(D::Error::custom)
            }
            CredentialIssuanceTypeV1_0::OfferCredential => {
                serde_json::from_value::<OfferCredentialV1>(content)
                    .map(From::from)
                    .map_err(D::Error::custom)
            }
            CredentialIssuanceTypeV1_0::RequestCredential => {
                serde_json::from_value::<RequestCredentialV1>(content)
                    .map(From::from)
                    .map_err(D::Error::custom)
            }
            CredentialIssuanceTypeV1_0::IssueCredential => {
                serde_json::from_value::<IssueCredentialV1>(content)
                    .map(From::from)
                    .map_err(D::Error::custom)
            }
            CredentialIssuanceTypeV1_0::Ack => serde_json::from_value::<AckCredentialV1>(content)
                .map(From::from)
                .map_err(D::Error::custom),
            CredentialIssuanceTypeV1_0::CredentialPreview => Err(D::Error::custom(format!(
                "{} is not a standalone message",
                kind.as_ref()
            ))),
        }
    }
}
