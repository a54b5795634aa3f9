use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    decorators::{attachment::Attachment, thread::Thread, timing::Timing},
    msg_fields::common::CredentialPreviewV1,
    msg_parts::MsgParts,
};

pub type OfferCredentialV1 = MsgParts<OfferCredentialV1Content, OfferCredentialV1Decorators>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct OfferCredentialV1Content {
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub credential_preview: CredentialPreviewV1,
    #[serde(rename = "offers~attach")]
    pub offers_attach: Vec<Attachment>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct OfferCredentialV1Decorators {
    #[builder(default, setter(strip_option))]
    #[serde(rename = "~thread")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
    #[builder(default, setter(strip_option))]
    #[serde(rename = "~timing")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        decorators::attachment::tests::make_base64_attachment,
        misc::test_utils,
        msg_fields::common::tests::make_preview,
        msg_types::CredentialIssuanceTypeV1_0,
    };

    #[test]
    fn test_minimal_offer_cred() {
        let content = OfferCredentialV1Content::builder()
            .credential_preview(make_preview())
            .offers_attach(vec![make_base64_attachment("eyJ9")])
            .build();

        let decorators = OfferCredentialV1Decorators::default();

        let expected = json!({
            "credential_preview": content.credential_preview,
            "offers~attach": content.offers_attach,
        });

        let msg = OfferCredentialV1::builder()
            .id("test".to_owned())
            .content(content.clone())
            .decorators(decorators)
            .build();

        test_utils::test_msg(
            msg.into(),
            CredentialIssuanceTypeV1_0::OfferCredential,
            expected,
        );
    }

    #[test]
    fn test_extended_offer_cred() {
        let content = OfferCredentialV1Content::builder()
            .credential_preview(make_preview())
            .offers_attach(vec![make_base64_attachment("eyJ9")])
            .comment("test_comment".to_owned())
            .build();

        let decorators = OfferCredentialV1Decorators::builder()
            .thread(Thread::builder().thid("test_thid".to_owned()).build())
            .build();

        let expected = json!({
            "credential_preview": content.credential_preview,
            "offers~attach": content.offers_attach,
            "comment": content.comment,
            "~thread": decorators.thread,
        });

        let msg = OfferCredentialV1::builder()
            .id("test".to_owned())
            .content(content.clone())
            .decorators(decorators.clone())
            .build();

        test_utils::test_msg(
            msg.into(),
            CredentialIssuanceTypeV1_0::OfferCredential,
            expected,
        );
    }
}
