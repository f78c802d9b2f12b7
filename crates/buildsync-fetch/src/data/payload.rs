use serde_json::Value;

/// Opaque structured document returned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    pub fn new(value: Value) -> Self { Self(value) }

    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body).map(Self)
    }

    pub fn as_value(&self) -> &Value { &self.0 }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self { Self(value) }
}
