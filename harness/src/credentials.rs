use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::error::{err_msg, HarnessErrorKind, HarnessResult};

/// DID the test suite publishes schemas and credential definitions under.
pub const SUBMITTER_DID: &str = "BzCbsNYhMrjHiqZDTUASHg";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub schema_id: String,
    pub name: String,
    pub version: String,
    pub attr_names: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialDefinition {
    pub cred_def_id: String,
    pub schema_id: String,
}

/// Payload of an `offers~attach` attachment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialOfferData {
    pub schema_id: String,
    pub cred_def_id: String,
}

/// Payload of a `requests~attach` attachment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRequestData {
    pub cred_def_id: String,
}

/// Payload of a `credentials~attach` attachment: the packaged credential.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CredentialData {
    pub schema_id: String,
    pub cred_def_id: String,
    pub values: Value,
}

/// Local schema, credential definition and credential storage needed to
/// validate an issuance flow. Identifiers follow the indy layout so the
/// agent under test sees realistic references.
#[derive(Debug, Default)]
pub struct CredentialStore {
    schemas: HashMap<String, Schema>,
    cred_defs: HashMap<String, CredentialDefinition>,
    credentials: HashMap<String, CredentialData>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_schema(
        &mut self,
        name: &str,
        version: &str,
        attr_names: Vec<String>,
    ) -> String {
        trace!(
            "CredentialStore::create_schema >>> name: {}, version: {}, attr_names: {:?}",
            name,
            version,
            attr_names
        );
        let schema_id = format!("{SUBMITTER_DID}:2:{name}:{version}");
        self.schemas.insert(
            schema_id.clone(),
            Schema {
                schema_id: schema_id.clone(),
                name: name.to_owned(),
                version: version.to_owned(),
                attr_names,
            },
        );
        schema_id
    }

    pub fn create_cred_def(&mut self, schema_id: &str) -> HarnessResult<String> {
        trace!("CredentialStore::create_cred_def >>> schema_id: {}", schema_id);
        if !self.schemas.contains_key(schema_id) {
            return Err(err_msg(
                HarnessErrorKind::InvalidState,
                format!("no schema {schema_id} to build a credential definition from"),
            ));
        }
        let cred_def_id = format!("{SUBMITTER_DID}:3:CL:{schema_id}:tag1");
        self.cred_defs.insert(
            cred_def_id.clone(),
            CredentialDefinition {
                cred_def_id: cred_def_id.clone(),
                schema_id: schema_id.to_owned(),
            },
        );
        Ok(cred_def_id)
    }

    pub fn cred_def(&self, cred_def_id: &str) -> Option<&CredentialDefinition> {
        self.cred_defs.get(cred_def_id)
    }

    pub fn store_credential(&mut self, credential: CredentialData) -> String {
        let credential_id = Uuid::new_v4().to_string();
        trace!(
            "CredentialStore::store_credential >>> credential_id: {}, cred_def_id: {}",
            credential_id,
            credential.cred_def_id
        );
        self.credentials.insert(credential_id.clone(), credential);
        credential_id
    }

    pub fn get_credential(&self, credential_id: &str) -> Option<&CredentialData> {
        self.credentials.get(credential_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_schema_and_cred_def_ids() {
        let mut store = CredentialStore::new();
        let schema_id = store.create_schema(
            "Transcript",
            "2.0",
            vec!["name".to_owned(), "GPA".to_owned()],
        );
        assert_eq!(schema_id, "BzCbsNYhMrjHiqZDTUASHg:2:Transcript:2.0");

        let cred_def_id = store.create_cred_def(&schema_id).unwrap();
        assert_eq!(
            store.cred_def(&cred_def_id).unwrap().schema_id,
            schema_id
        );
    }

    #[test]
    fn test_cred_def_requires_existing_schema() {
        let mut store = CredentialStore::new();
        let err = store.create_cred_def("nonexistent:2:Foo:1.0").unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::InvalidState);
    }

    #[test]
    fn test_store_and_fetch_credential() {
        let mut store = CredentialStore::new();
        let credential = CredentialData {
            schema_id: "schema".to_owned(),
            cred_def_id: "cred-def".to_owned(),
            values: json!({ "name": "Alice", "GPA": 4 }),
        };
        let credential_id = store.store_credential(credential.clone());
        assert_eq!(store.get_credential(&credential_id), Some(&credential));
        assert_eq!(store.get_credential("missing"), None);
    }
}
