use chrono::Utc;
use messages::{
    decorators::{thread::Thread, timing::Timing},
    msg_fields::{
        ack::{AckCredentialV1, AckCredentialV1Content, AckCredentialV1Decorators, AckStatus},
        offer_credential::OfferCredentialV1,
        request_credential::{
            RequestCredentialV1, RequestCredentialV1Content, RequestCredentialV1Decorators,
        },
    },
    CredentialIssuanceV1,
};
use uuid::Uuid;

use crate::{
    connection::Connection,
    credentials::{CredentialData, CredentialOfferData, CredentialRequestData, CredentialStore},
    errors::error::{err_msg, HarnessErrorKind, HarnessResult},
    events::{EventKind, EventRecorder},
    protocols::issuance::{decode_attach, make_attach_from_str, AttachmentId},
};

#[derive(Clone, Debug, PartialEq)]
pub enum HolderState {
    Initial,
    RequestSent {
        thread_id: String,
        cred_def_id: String,
    },
    Finished {
        credential_id: String,
    },
    Declined,
}

/// Holder-side driver: plays the credential holder against an agent under
/// test acting as issuer. Owns the credential storage and the event log of
/// its scenario.
#[derive(Debug)]
pub struct Holder {
    source_id: String,
    state: HolderState,
    store: CredentialStore,
    events: EventRecorder,
}

impl Holder {
    pub fn create(source_id: &str) -> Self {
        trace!("Holder::create >>> source_id: {}", source_id);
        Self {
            source_id: source_id.to_owned(),
            state: HolderState::Initial,
            store: CredentialStore::new(),
            events: EventRecorder::new(),
        }
    }

    pub fn state(&self) -> &HolderState {
        &self.state
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn events(&self) -> &EventRecorder {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventRecorder {
        &mut self.events
    }

    pub fn reset_events(&mut self) {
        self.events.reset();
    }

    /// Accept an inbound credential offer: reply with a request-credential
    /// threaded on the offer and record a `requested` event.
    pub fn handle_offer_credential(
        &mut self,
        message: CredentialIssuanceV1,
        connection: &Connection,
    ) -> HarnessResult<()> {
        trace!(
            "Holder[{}]::handle_offer_credential >>> kind: {}",
            self.source_id,
            message.kind().as_ref()
        );
        let offer = expect_offer(message)?;
        if self.state != HolderState::Initial {
            return Err(err_msg(
                HarnessErrorKind::InvalidState,
                format!("cannot accept an offer in state {:?}", self.state),
            ));
        }

        // The offer opens the thread; replies adopt its id as thid.
        let thread_id = offer
            .decorators
            .thread
            .as_ref()
            .map(|thread| thread.thid.clone())
            .unwrap_or_else(|| offer.id.clone());
        let offer_data: CredentialOfferData = decode_attach(&offer.content.offers_attach)?;

        let request = build_request(&thread_id, &offer_data.cred_def_id)?;
        connection.send(&request.into())?;
        self.events
            .record_correlated(EventKind::Requested, Some(thread_id.clone()));
        self.state = HolderState::RequestSent {
            thread_id,
            cred_def_id: offer_data.cred_def_id,
        };
        Ok(())
    }

    /// Store an inbound credential matching the outstanding request, ack it
    /// and record a `stored` event.
    pub fn handle_issue_credential(
        &mut self,
        message: CredentialIssuanceV1,
        connection: &Connection,
    ) -> HarnessResult<()> {
        trace!(
            "Holder[{}]::handle_issue_credential >>> kind: {}",
            self.source_id,
            message.kind().as_ref()
        );
        let credential = match message {
            CredentialIssuanceV1::IssueCredential(credential) => credential,
            other => {
                return Err(err_msg(
                    HarnessErrorKind::ProtocolViolation,
                    format!(
                        "expected issue-credential, received {}",
                        other.kind().as_ref()
                    ),
                ))
            }
        };
        let HolderState::RequestSent { thread_id, .. } = &self.state else {
            return Err(err_msg(
                HarnessErrorKind::InvalidState,
                format!("no outstanding credential request in state {:?}", self.state),
            ));
        };
        if credential.decorators.thread.thid != *thread_id {
            return Err(err_msg(
                HarnessErrorKind::CorrelationError,
                format!(
                    "credential thread id {} does not match outstanding request {}",
                    credential.decorators.thread.thid, thread_id
                ),
            ));
        }

        let data: CredentialData = decode_attach(&credential.content.credentials_attach)?;
        let thread_id = thread_id.clone();
        let credential_id = self.store.store_credential(data);

        let ack = build_ack(&thread_id);
        connection.send(&ack.into())?;
        self.events
            .record_correlated(EventKind::Stored, Some(credential_id.clone()));
        self.state = HolderState::Finished { credential_id };
        Ok(())
    }

    /// Turn down an inbound offer without replying; records a `rejected`
    /// event correlated with the offer id.
    pub fn decline_offer(&mut self, message: CredentialIssuanceV1) -> HarnessResult<()> {
        trace!("Holder[{}]::decline_offer", self.source_id);
        let offer = expect_offer(message)?;
        self.events
            .record_correlated(EventKind::Rejected, Some(offer.id));
        self.state = HolderState::Declined;
        Ok(())
    }
}

fn expect_offer(message: CredentialIssuanceV1) -> HarnessResult<OfferCredentialV1> {
    match message {
        CredentialIssuanceV1::OfferCredential(offer) => Ok(offer),
        other => Err(err_msg(
            HarnessErrorKind::ProtocolViolation,
            format!(
                "expected offer-credential, received {}",
                other.kind().as_ref()
            ),
        )),
    }
}

fn build_request(thread_id: &str, cred_def_id: &str) -> HarnessResult<RequestCredentialV1> {
    let request_data = CredentialRequestData {
        cred_def_id: cred_def_id.to_owned(),
    };
    let payload = serde_json::to_string(&request_data).map_err(|err| {
        err_msg(
            HarnessErrorKind::SerializationError,
            format!("cannot serialize credential request payload: {err}"),
        )
    })?;
    let content = RequestCredentialV1Content::builder()
        .requests_attach(vec![make_attach_from_str(
            &payload,
            AttachmentId::CredentialRequest,
        )])
        .build();
    let decorators = RequestCredentialV1Decorators::builder()
        .thread(Thread::builder().thid(thread_id.to_owned()).build())
        .timing(Timing::builder().out_time(Utc::now()).build())
        .build();
    Ok(RequestCredentialV1::builder()
        .id(Uuid::new_v4().to_string())
        .content(content)
        .decorators(decorators)
        .build())
}

fn build_ack(thread_id: &str) -> AckCredentialV1 {
    let content = AckCredentialV1Content::builder().status(AckStatus::Ok).build();
    let decorators = AckCredentialV1Decorators::builder()
        .thread(Thread::builder().thid(thread_id.to_owned()).build())
        .timing(Timing::builder().out_time(Utc::now()).build())
        .build();
    AckCredentialV1::builder()
        .id(Uuid::new_v4().to_string())
        .content(content)
        .decorators(decorators)
        .build()
}
