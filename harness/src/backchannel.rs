use async_trait::async_trait;
use messages::msg_fields::common::CredentialAttr;

use crate::errors::error::HarnessResult;

/// Out-of-band control channel used to command the agent under test,
/// separate from the protocol messages being tested.
///
/// Commands are scoped to a protocol role and version. Failures surface
/// as [`crate::errors::error::HarnessErrorKind::Backchannel`] errors and
/// are not retried by the harness.
#[async_trait]
pub trait Backchannel {
    /// Command the agent under test (playing issuer) to send a credential
    /// offer with the given attribute values over its connection to the
    /// test suite.
    async fn issue_credential_v1_0_send_cred_offer(
        &self,
        attributes: Vec<CredentialAttr>,
    ) -> HarnessResult<()>;

    /// Command the agent under test (playing holder) to accept the
    /// credential offer previously sent by the test suite.
    async fn issue_credential_v1_0_accept_cred_offer(&self, offer_id: &str) -> HarnessResult<()>;
}
