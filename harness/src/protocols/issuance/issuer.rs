use std::collections::HashMap;

use chrono::Utc;
use messages::{
    decorators::{thread::Thread, timing::Timing},
    msg_fields::{
        common::{CredentialAttr, CredentialPreviewV1},
        issue_credential::{
            IssueCredentialV1, IssueCredentialV1Content, IssueCredentialV1Decorators,
        },
        offer_credential::{
            OfferCredentialV1, OfferCredentialV1Content, OfferCredentialV1Decorators,
        },
    },
    CredentialIssuanceV1,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    connection::Connection,
    credentials::{CredentialData, CredentialOfferData, CredentialRequestData, CredentialStore},
    errors::error::{err_msg, HarnessErrorKind, HarnessResult},
    events::{EventKind, EventRecorder},
    protocols::issuance::{decode_attach, make_attach_from_str, AttachmentId},
};

#[derive(Clone, Debug)]
struct OutstandingOffer {
    schema_id: String,
    cred_def_id: String,
    preview: CredentialPreviewV1,
}

/// Issuer-side driver: plays the credential issuer against an agent under
/// test acting as holder. Tracks every offer it has sent so requests can
/// be correlated back by thread id.
#[derive(Debug)]
pub struct Issuer {
    source_id: String,
    store: CredentialStore,
    events: EventRecorder,
    outstanding: HashMap<String, OutstandingOffer>,
}

impl Issuer {
    pub fn create(source_id: &str) -> Self {
        trace!("Issuer::create >>> source_id: {}", source_id);
        Self {
            source_id: source_id.to_owned(),
            store: CredentialStore::new(),
            events: EventRecorder::new(),
            outstanding: HashMap::new(),
        }
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

    /// Publish a schema and credential definition for the attributes an
    /// upcoming offer will carry.
    pub fn create_cred_def(
        &mut self,
        schema_name: &str,
        schema_version: &str,
        attr_names: Vec<String>,
    ) -> HarnessResult<String> {
        let schema_id = self.store.create_schema(schema_name, schema_version, attr_names);
        self.store.create_cred_def(&schema_id)
    }

    /// Send a credential offer for an existing credential definition and
    /// record an `offered` event. Returns the offer id, which doubles as
    /// the thread id of the issuance.
    pub fn send_offer_credential(
        &mut self,
        connection: &Connection,
        cred_def_id: &str,
        attributes: Vec<CredentialAttr>,
    ) -> HarnessResult<String> {
        trace!(
            "Issuer[{}]::send_offer_credential >>> cred_def_id: {}",
            self.source_id,
            cred_def_id
        );
        let cred_def = self.store.cred_def(cred_def_id).ok_or_else(|| {
            err_msg(
                HarnessErrorKind::InvalidState,
                format!("no credential definition {cred_def_id} to offer against"),
            )
        })?;
        let schema_id = cred_def.schema_id.clone();

        let offer_id = Uuid::new_v4().to_string();
        let preview = CredentialPreviewV1::new(attributes);
        let offer_data = CredentialOfferData {
            schema_id: schema_id.clone(),
            cred_def_id: cred_def_id.to_owned(),
        };
        let payload = serde_json::to_string(&offer_data).map_err(|err| {
            err_msg(
                HarnessErrorKind::SerializationError,
                format!("cannot serialize credential offer payload: {err}"),
            )
        })?;
        let content = OfferCredentialV1Content::builder()
            .credential_preview(preview.clone())
            .offers_attach(vec![make_attach_from_str(
                &payload,
                AttachmentId::CredentialOffer,
            )])
            .build();
        let decorators = OfferCredentialV1Decorators::builder()
            .timing(Timing::builder().out_time(Utc::now()).build())
            .build();
        let offer = OfferCredentialV1::builder()
            .id(offer_id.clone())
            .content(content)
            .decorators(decorators)
            .build();

        connection.send(&offer.into())?;
        self.events
            .record_correlated(EventKind::Offered, Some(offer_id.clone()));
        self.outstanding.insert(
            offer_id.clone(),
            OutstandingOffer {
                schema_id,
                cred_def_id: cred_def_id.to_owned(),
                preview,
            },
        );
        Ok(offer_id)
    }

    /// Issue the credential for an inbound request matching one of our
    /// outstanding offers and record an `issued` event. Each offer is
    /// consumed by the first matching request.
    pub fn handle_request_credential(
        &mut self,
        message: CredentialIssuanceV1,
        connection: &Connection,
    ) -> HarnessResult<()> {
        trace!(
            "Issuer[{}]::handle_request_credential >>> kind: {}",
            self.source_id,
            message.kind().as_ref()
        );
        let request = match message {
            CredentialIssuanceV1::RequestCredential(request) => request,
            other => {
                return Err(err_msg(
                    HarnessErrorKind::ProtocolViolation,
                    format!(
                        "expected request-credential, received {}",
                        other.kind().as_ref()
                    ),
                ))
            }
        };
        let thread_id = request
            .decorators
            .thread
            .as_ref()
            .map(|thread| thread.thid.clone())
            .ok_or_else(|| {
                err_msg(
                    HarnessErrorKind::CorrelationError,
                    "credential request carries no thread id",
                )
            })?;
        let offer = self.outstanding.remove(&thread_id).ok_or_else(|| {
            err_msg(
                HarnessErrorKind::CorrelationError,
                format!("thread id {thread_id} matches no outstanding offer"),
            )
        })?;

        let request_data: CredentialRequestData = decode_attach(&request.content.requests_attach)?;
        if request_data.cred_def_id != offer.cred_def_id {
            return Err(err_msg(
                HarnessErrorKind::ProtocolViolation,
                format!(
                    "request is for credential definition {}, offer was for {}",
                    request_data.cred_def_id, offer.cred_def_id
                ),
            ));
        }

        let credential = build_credential(&thread_id, &offer)?;
        connection.send(&credential.into())?;
        self.events
            .record_correlated(EventKind::Issued, Some(thread_id));
        Ok(())
    }
}

fn build_credential(thread_id: &str, offer: &OutstandingOffer) -> HarnessResult<IssueCredentialV1> {
    let mut values = Map::new();
    for attr in &offer.preview.attributes {
        values.insert(attr.name.clone(), attr.value.clone());
    }
    let data = CredentialData {
        schema_id: offer.schema_id.clone(),
        cred_def_id: offer.cred_def_id.clone(),
        values: Value::Object(values),
    };
    let payload = serde_json::to_string(&data).map_err(|err| {
        err_msg(
            HarnessErrorKind::SerializationError,
            format!("cannot serialize credential payload: {err}"),
        )
    })?;
    let content = IssueCredentialV1Content::builder()
        .credentials_attach(vec![make_attach_from_str(&payload, AttachmentId::Credential)])
        .build();
    let decorators = IssueCredentialV1Decorators::builder()
        .thread(Thread::builder().thid(thread_id.to_owned()).build())
        .timing(Timing::builder().out_time(Utc::now()).build())
        .build();
    Ok(IssueCredentialV1::builder()
        .id(Uuid::new_v4().to_string())
        .content(content)
        .decorators(decorators)
        .build())
}
