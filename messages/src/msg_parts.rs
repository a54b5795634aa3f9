use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Struct representing a complete message (apart from the `@type` field) as
/// defined in a protocol RFC. The protocol specific fields and the decorators
/// are provided as standalone types so they can be processed independently.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, TypedBuilder)]
pub struct MsgParts<C, D> {
    /// All standalone messages have an `@id` field.
    #[serde(rename = "@id")]
    pub id: String,
    /// The protocol specific fields.
    #[serde(flatten)]
    pub content: C,
    /// The decorators this message uses.
    #[serde(flatten)]
    pub decorators: D,
}
