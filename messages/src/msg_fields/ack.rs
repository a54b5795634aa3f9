use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    decorators::{thread::Thread, timing::Timing},
    msg_parts::MsgParts,
};

pub type AckCredentialV1 = MsgParts<AckCredentialV1Content, AckCredentialV1Decorators>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct AckCredentialV1Content {
    pub status: AckStatus,
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AckStatus {
    Ok,
    Fail,
    Pending,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct AckCredentialV1Decorators {
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
    use crate::{misc::test_utils, msg_types::CredentialIssuanceTypeV1_0};

    #[test]
    fn test_minimal_ack_cred() {
        let content = AckCredentialV1Content::builder().status(AckStatus::Ok).build();

        let decorators = AckCredentialV1Decorators::builder()
            .thread(Thread::builder().thid("test_thid".to_owned()).build())
            .build();

        let expected = json!({
            "status": "OK",
            "~thread": decorators.thread,
        });

        let msg = AckCredentialV1::builder()
            .id("test".to_owned())
            .content(content)
            .decorators(decorators.clone())
            .build();

        test_utils::test_msg(msg.into(), CredentialIssuanceTypeV1_0::Ack, expected);
    }
}
