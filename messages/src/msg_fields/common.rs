use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::{misc::MimeType, msg_types::CredentialIssuanceTypeV1_0};

/// An attribute (name, value) pair carried in a credential preview.
/// Values may be typed (string, number), but are serialized uniformly.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct CredentialAttr {
    pub name: String,
    pub value: Value,
    #[builder(default, setter(strip_option))]
    #[serde(rename = "mime-type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<MimeType>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CredentialPreviewV1 {
    #[serde(rename = "@type")]
    msg_type: CredentialPreviewV1MsgType,
    pub attributes: Vec<CredentialAttr>,
}

impl CredentialPreviewV1 {
    pub fn new(attributes: Vec<CredentialAttr>) -> Self {
        Self {
            msg_type: CredentialPreviewV1MsgType,
            attributes,
        }
    }
}

/// Non-standalone message type.
/// This is only encountered as part of an existent message.
/// It is not a message on it's own.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct CredentialPreviewV1MsgType;

impl Serialize for CredentialPreviewV1MsgType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CredentialIssuanceTypeV1_0::CredentialPreview
            .type_uri()
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CredentialPreviewV1MsgType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let uri = String::deserialize(deserializer)?;
        match CredentialIssuanceTypeV1_0::from_type_uri(&uri) {
            Ok(CredentialIssuanceTypeV1_0::CredentialPreview) => Ok(CredentialPreviewV1MsgType),
            _ => Err(D::Error::custom(format!(
                "message kind is not credential-preview: {uri}"
            ))),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use serde_json::json;

    use super::*;

    pub fn make_preview() -> CredentialPreviewV1 {
        CredentialPreviewV1::new(vec![
            CredentialAttr::builder()
                .name("name".to_owned())
                .value(json!("Alice"))
                .build(),
            CredentialAttr::builder()
                .name("GPA".to_owned())
                .value(json!(4))
                .build(),
        ])
    }

    #[test]
    fn test_preview_serde() {
        let preview = make_preview();
        let expected = json!({
            "@type": "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/issue-credential/1.0/credential-preview",
            "attributes": [
                { "name": "name", "value": "Alice" },
                { "name": "GPA", "value": 4 },
            ],
        });

        assert_eq!(serde_json::to_value(&preview).unwrap(), expected);
        let roundtrip: CredentialPreviewV1 = serde_json::from_value(expected).unwrap();
        assert_eq!(roundtrip, preview);
    }

    #[test]
    fn test_preview_rejects_foreign_type() {
        let value = json!({
            "@type": "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/issue-credential/1.0/offer-credential",
            "attributes": [],
        });
        assert!(serde_json::from_value::<CredentialPreviewV1>(value).is_err());
    }
}
