use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    decorators::{attachment::Attachment, thread::Thread, timing::Timing},
    msg_parts::MsgParts,
};

pub type IssueCredentialV1 = MsgParts<IssueCredentialV1Content, IssueCredentialV1Decorators>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct IssueCredentialV1Content {
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "credentials~attach")]
    pub credentials_attach: Vec<Attachment>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct IssueCredentialV1Decorators {
    #[serde(rename = "~thread")]
    pub thread: Thread,
    #[builder(default, setter(strip_option))]
    #[serde(rename = "~timing")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        decorators::attachment::tests::make_base64_attachment, misc::test_utils,
        msg_types::CredentialIssuanceTypeV1_0,
    };

    #[test]
    fn test_minimal_issue_cred() {
        let content = IssueCredentialV1Content::builder()
            .credentials_attach(vec![make_base64_attachment("eyJ9")])
            .build();

        let decorators = IssueCredentialV1Decorators::builder()
            .thread(Thread::builder().thid("test_thid".to_owned()).build())
            .build();

        let expected = json!({
            "credentials~attach": content.credentials_attach,
            "~thread": decorators.thread,
        });

        let msg = IssueCredentialV1::builder()
            .id("test".to_owned())
            .content(content.clone())
            .decorators(decorators.clone())
            .build();

        test_utils::test_msg(
            msg.into(),
            CredentialIssuanceTypeV1_0::IssueCredential,
            expected,
        );
    }
}
