use crate::error::PublishError;
use crate::origin::OriginId;

/// Maximum MQTT topic length in UTF-8 bytes.
pub const MAX_TOPIC_LEN: usize = 65_535;

/// MQTT quality-of-service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qos {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// A broker-native inbound PUBLISH — the trigger of one broker→stream
/// transformer call. Constructed by the transport layer from the broker's
/// own representation; transformers only ever see it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPacket {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: Qos,
    pub retain: bool,
    pub content_type: Option<String>,
    pub response_topic: Option<String>,
    pub correlation_data: Option<Vec<u8>>,
    pub user_properties: Vec<(String, String)>,
}

impl PublishPacket {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            payload,
            qos: Qos::AtMostOnce,
            retain: false,
            content_type: None,
            response_topic: None,
            correlation_data: None,
            user_properties: Vec::new(),
        }
    }
}

/// An outgoing broker message, built via [`PublishBuilder`]. Immutable
/// once built; carries the provenance of the output that created its
/// builder so foreign instances can be rejected at the output setter.
#[derive(Debug, Clone)]
pub struct Publish {
    topic: String,
    payload: Vec<u8>,
    qos: Qos,
    retain: bool,
    content_type: Option<String>,
    response_topic: Option<String>,
    correlation_data: Option<Vec<u8>>,
    user_properties: Vec<(String, String)>,
    origin: OriginId,
}

impl Publish {
    pub(crate) fn origin(&self) -> OriginId {
        self.origin
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Read-only view of the payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Defensive copy of the payload.
    pub fn payload_to_vec(&self) -> Vec<u8> {
        self.payload.clone()
    }

    pub fn qos(&self) -> Qos {
        self.qos
    }

    pub fn retain(&self) -> bool {
        self.retain
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn response_topic(&self) -> Option<&str> {
        self.response_topic.as_deref()
    }

    pub fn correlation_data(&self) -> Option<&[u8]> {
        self.correlation_data.as_deref()
    }

    pub fn user_properties(&self) -> &[(String, String)] {
        &self.user_properties
    }
}

// Value equality — provenance is not part of the message's value.
impl PartialEq for Publish {
    fn eq(&self, other: &Self) -> bool {
        self.topic == other.topic
            && self.payload == other.payload
            && self.qos == other.qos
            && self.retain == other.retain
            && self.content_type == other.content_type
            && self.response_topic == other.response_topic
            && self.correlation_data == other.correlation_data
            && self.user_properties == other.user_properties
    }
}

impl Eq for Publish {}

/// Mutable, reusable builder for [`Publish`] messages. Same contract as
/// the outbound record builder: fail-fast setters, deep copies on entry,
/// state retained across `build()` calls.
#[derive(Debug, Clone)]
pub struct PublishBuilder {
    topic: Option<String>,
    payload: Vec<u8>,
    qos: Qos,
    retain: bool,
    content_type: Option<String>,
    response_topic: Option<String>,
    correlation_data: Option<Vec<u8>>,
    user_properties: Vec<(String, String)>,
    origin: OriginId,
}

impl PublishBuilder {
    /// Standalone builder. Inside a transformer, use the output's builder
    /// factory instead, or `set_publishes` will reject the results.
    pub fn new() -> Self {
        Self::with_origin(OriginId::next())
    }

    pub(crate) fn with_origin(origin: OriginId) -> Self {
        Self {
            topic: None,
            payload: Vec::new(),
            qos: Qos::AtMostOnce,
            retain: false,
            content_type: None,
            response_topic: None,
            correlation_data: None,
            user_properties: Vec::new(),
            origin,
        }
    }

    /// Set the topic. Required. Publish topic names must be non-empty,
    /// at most 65,535 UTF-8 bytes, and free of `+`, `#` and NUL.
    pub fn topic(&mut self, topic: &str) -> Result<&mut Self, PublishError> {
        validate_topic_name(topic)?;
        self.topic = Some(topic.to_owned());
        Ok(self)
    }

    /// Set the payload. Copied on entry; defaults to empty.
    pub fn payload(&mut self, payload: &[u8]) -> &mut Self {
        self.payload = payload.to_vec();
        self
    }

    /// Set the payload from a string (UTF-8 encoded).
    pub fn payload_str(&mut self, payload: &str) -> &mut Self {
        self.payload(payload.as_bytes())
    }

    pub fn qos(&mut self, qos: Qos) -> &mut Self {
        self.qos = qos;
        self
    }

    pub fn retain(&mut self, retain: bool) -> &mut Self {
        self.retain = retain;
        self
    }

    pub fn content_type(&mut self, content_type: &str) -> &mut Self {
        self.content_type = Some(content_type.to_owned());
        self
    }

    /// Set the response topic. Validated by the same rules as `topic`.
    pub fn response_topic(&mut self, response_topic: &str) -> Result<&mut Self, PublishError> {
        validate_topic_name(response_topic)?;
        self.response_topic = Some(response_topic.to_owned());
        Ok(self)
    }

    pub fn correlation_data(&mut self, correlation_data: &[u8]) -> &mut Self {
        self.correlation_data = Some(correlation_data.to_vec());
        self
    }

    /// Append one user property. Names may repeat.
    pub fn user_property(&mut self, name: &str, value: &str) -> &mut Self {
        self.user_properties.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Snapshot the current state into a new immutable [`Publish`].
    /// Fails if no topic was ever set. Builder state is untouched.
    pub fn build(&self) -> Result<Publish, PublishError> {
        let topic = self.topic.clone().ok_or(PublishError::MissingTopic)?;
        Ok(Publish {
            topic,
            payload: self.payload.clone(),
            qos: self.qos,
            retain: self.retain,
            content_type: self.content_type.clone(),
            response_topic: self.response_topic.clone(),
            correlation_data: self.correlation_data.clone(),
            user_properties: self.user_properties.clone(),
            origin: self.origin,
        })
    }
}

impl Default for PublishBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_topic_name(topic: &str) -> Result<(), PublishError> {
    let reason = if topic.is_empty() {
        "must not be empty"
    } else if topic.len() > MAX_TOPIC_LEN {
        "exceeds 65535 bytes"
    } else if topic.contains(['+', '#']) {
        "wildcards are not allowed in publish topics"
    } else if topic.contains('\0') {
        "must not contain NUL"
    } else {
        return Ok(());
    };
    Err(PublishError::InvalidTopic {
        topic: topic.to_owned(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_validation() {
        let mut builder = PublishBuilder::new();
        assert!(builder.topic("sensors/room-1/temp").is_ok());
        for bad in ["", "sensors/+/temp", "sensors/#", "a\0b"] {
            assert!(
                matches!(builder.topic(bad), Err(PublishError::InvalidTopic { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_build_requires_topic() {
        let builder = PublishBuilder::new();
        assert_eq!(builder.build().unwrap_err(), PublishError::MissingTopic);
    }

    #[test]
    fn test_build_defaults() {
        let mut builder = PublishBuilder::new();
        builder.topic("t").unwrap();
        let publish = builder.build().unwrap();
        assert!(publish.payload().is_empty());
        assert_eq!(publish.qos(), Qos::AtMostOnce);
        assert!(!publish.retain());
        assert!(publish.content_type().is_none());
    }

    #[test]
    fn test_builder_is_reusable() {
        let mut builder = PublishBuilder::new();
        builder.topic("t").unwrap().payload_str("one");
        let first = builder.build().unwrap();

        builder.payload_str("two");
        let second = builder.build().unwrap();

        assert_eq!(first.payload(), b"one");
        assert_eq!(second.payload(), b"two");
        assert_eq!(first.topic(), second.topic());
    }

    #[test]
    fn test_payload_copied_at_set_time() {
        let mut payload = b"abc".to_vec();
        let mut builder = PublishBuilder::new();
        builder.topic("t").unwrap().payload(&payload);

        payload[0] = b'x';
        assert_eq!(builder.build().unwrap().payload(), b"abc");
    }

    #[test]
    fn test_user_properties_preserve_order_and_repeats() {
        let mut builder = PublishBuilder::new();
        builder
            .topic("t")
            .unwrap()
            .user_property("k", "1")
            .user_property("k", "2");
        let publish = builder.build().unwrap();
        assert_eq!(
            publish.user_properties(),
            &[("k".to_owned(), "1".to_owned()), ("k".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn test_equality_ignores_origin() {
        let mut a = PublishBuilder::new();
        let mut b = PublishBuilder::new();
        a.topic("t").unwrap().payload_str("x");
        b.topic("t").unwrap().payload_str("x");
        assert_eq!(a.build().unwrap(), b.build().unwrap());
    }
}
