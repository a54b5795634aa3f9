use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum MimeType {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "text/plain")]
    Plain,
}
