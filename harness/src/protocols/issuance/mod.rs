//! Role drivers for the issue-credential 1.0 conformance scenarios.
//!
//! The test suite plays the role complementary to the agent under test:
//! [`holder::Holder`] when the agent is tested as issuer,
//! [`issuer::Issuer`] when the agent is tested as holder.

pub mod holder;
pub mod issuer;

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use messages::{
    decorators::attachment::{Attachment, AttachmentData, AttachmentType},
    misc::MimeType,
    msg_fields::common::CredentialAttr,
    msg_types::CredentialIssuanceTypeV1_0,
    CredentialIssuanceV1,
};
use serde::de::DeserializeOwned;
use strum_macros::{AsRefStr, EnumString};

use crate::{
    backchannel::Backchannel,
    connection::{Connection, PendingWait},
    errors::error::{err_msg, HarnessErrorKind, HarnessResult},
    events::{EventKind, EventRecorder},
};

use self::{holder::Holder, issuer::Issuer};

#[derive(Debug, Clone, Copy, AsRefStr, EnumString, PartialEq)]
pub enum AttachmentId {
    #[strum(serialize = "libindy-cred-offer-0")]
    CredentialOffer,
    #[strum(serialize = "libindy-cred-request-0")]
    CredentialRequest,
    #[strum(serialize = "libindy-cred-0")]
    Credential,
}

pub fn make_attach_from_str(content: &str, id: AttachmentId) -> Attachment {
    let data = AttachmentData::builder()
        .content(AttachmentType::Base64(STANDARD.encode(content)))
        .build();
    Attachment::builder()
        .id(id.as_ref().to_owned())
        .mime_type(MimeType::Json)
        .data(data)
        .build()
}

pub fn get_attach_as_string(attachments: &[Attachment]) -> HarnessResult<String> {
    let attach = attachments.first().map(|a| &a.data.content);
    let Some(AttachmentType::Base64(encoded)) = attach else {
        return Err(err_msg(
            HarnessErrorKind::ProtocolViolation,
            format!("attachment is not base64 encoded JSON: {attach:?}"),
        ));
    };
    let bytes = STANDARD.decode(encoded).map_err(|err| {
        err_msg(
            HarnessErrorKind::ProtocolViolation,
            format!("attachment is not valid base64: {err}"),
        )
    })?;
    String::from_utf8(bytes).map_err(|err| {
        err_msg(
            HarnessErrorKind::ProtocolViolation,
            format!("attachment is not valid utf-8: {err}"),
        )
    })
}

pub fn decode_attach<T: DeserializeOwned>(attachments: &[Attachment]) -> HarnessResult<T> {
    let content = get_attach_as_string(attachments)?;
    serde_json::from_str(&content).map_err(|err| {
        err_msg(
            HarnessErrorKind::ProtocolViolation,
            format!("attachment payload has unexpected shape: {err}"),
        )
    })
}

/// Bounded receive step of a scenario: a timed-out wait records the
/// `timed-out` event before the error propagates, so the verdict and the
/// event log stay consistent.
async fn recv_bounded(
    wait: PendingWait,
    timeout: Duration,
    events: &mut EventRecorder,
) -> HarnessResult<CredentialIssuanceV1> {
    match wait.recv(timeout).await {
        Err(err) if err.kind() == HarnessErrorKind::Timeout => {
            events.record(EventKind::TimedOut);
            Err(err)
        }
        other => other,
    }
}

/// Conformance scenario for an agent under test playing the issuer role.
///
/// The agent is commanded over the backchannel to send a credential offer;
/// the harness accepts the offer as holder and stores the issued
/// credential. Passes iff a `stored` event is recorded within `timeout`
/// per wait.
pub async fn run_issuer_conformance<B: Backchannel + ?Sized>(
    connection: &Connection,
    backchannel: &B,
    holder: &mut Holder,
    attributes: Vec<CredentialAttr>,
    timeout: Duration,
) -> HarnessResult<()> {
    info!(
        "run_issuer_conformance >>> connection: {}, timeout: {}ms",
        connection.source_id(),
        timeout.as_millis()
    );
    holder.reset_events();

    // Register both waits before commanding the agent: inbound traffic
    // with no registered waiter is dropped, and a fast agent may answer
    // the request before control returns from handle_offer_credential.
    let wait_offer = connection.next(CredentialIssuanceTypeV1_0::OfferCredential)?;
    let wait_credential = connection.next(CredentialIssuanceTypeV1_0::IssueCredential)?;
    backchannel
        .issue_credential_v1_0_send_cred_offer(attributes)
        .await
        .map_err(|err| err.extend("send-cred-offer command failed"))?;
    let offer = recv_bounded(wait_offer, timeout, holder.events_mut()).await?;
    holder.handle_offer_credential(offer, connection)?;

    let credential = recv_bounded(wait_credential, timeout, holder.events_mut()).await?;
    holder.handle_issue_credential(credential, connection)?;

    holder.events().assert_event(EventKind::Stored)
}

/// Conformance scenario for an agent under test playing the holder role.
///
/// The harness sends a credential offer as issuer, the agent is commanded
/// to accept it, and the harness issues the credential once the request
/// arrives. Passes iff an `issued` event is recorded within `timeout`.
pub async fn run_holder_conformance<B: Backchannel + ?Sized>(
    connection: &Connection,
    backchannel: &B,
    issuer: &mut Issuer,
    cred_def_id: &str,
    attributes: Vec<CredentialAttr>,
    timeout: Duration,
) -> HarnessResult<()> {
    info!(
        "run_holder_conformance >>> connection: {}, cred_def_id: {}, timeout: {}ms",
        connection.source_id(),
        cred_def_id,
        timeout.as_millis()
    );
    issuer.reset_events();

    let offer_id = issuer.send_offer_credential(connection, cred_def_id, attributes)?;

    let wait_request = connection.next(CredentialIssuanceTypeV1_0::RequestCredential)?;
    backchannel
        .issue_credential_v1_0_accept_cred_offer(&offer_id)
        .await
        .map_err(|err| err.extend("accept-cred-offer command failed"))?;
    let request = recv_bounded(wait_request, timeout, issuer.events_mut()).await?;
    issuer.handle_request_credential(request, connection)?;

    issuer.events().assert_event(EventKind::Issued)
}
