//! Codec adapters under test.

use crate::cases::Payload;
use crate::error::Fault;
use crate::SubjectVariant;
use std::sync::Arc;

/// A serializer/deserializer pair. Implementations hold no mutable state and are
/// invoked concurrently from several workers.
pub trait Subject: Send + Sync {
    fn name(&self) -> &str;

    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, Fault>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Payload, Fault>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSubject;

impl Subject for JsonSubject {
    fn name(&self) -> &str {
        "serde_json"
    }

    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, Fault> {
        serde_json::to_vec(payload).map_err(Fault::codec)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Payload, Fault> {
        serde_json::from_slice(bytes).map_err(Fault::codec)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeSubject;

impl Subject for BincodeSubject {
    fn name(&self) -> &str {
        "bincode"
    }

    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, Fault> {
        bincode::serialize(payload).map_err(Fault::codec)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Payload, Fault> {
        bincode::deserialize(bytes).map_err(Fault::codec)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MessagePackSubject;

impl Subject for MessagePackSubject {
    fn name(&self) -> &str {
        "rmp-serde"
    }

    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, Fault> {
        rmp_serde::to_vec(payload).map_err(Fault::codec)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Payload, Fault> {
        rmp_serde::from_slice(bytes).map_err(Fault::codec)
    }
}

/// Adapters selected by `variant`, in reporting order.
pub fn subjects(variant: SubjectVariant) -> Vec<Arc<dyn Subject>> {
    let mut out: Vec<Arc<dyn Subject>> = Vec::new();
    if matches!(variant, SubjectVariant::All | SubjectVariant::Json) {
        out.push(Arc::new(JsonSubject));
    }
    if matches!(variant, SubjectVariant::All | SubjectVariant::Bincode) {
        out.push(Arc::new(BincodeSubject));
    }
    if matches!(variant, SubjectVariant::All | SubjectVariant::MessagePack) {
        out.push(Arc::new(MessagePackSubject));
    }
    out
}
