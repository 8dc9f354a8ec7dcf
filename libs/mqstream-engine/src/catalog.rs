use std::collections::HashMap;
use std::sync::Arc;

use mqstream_api::transformer::{MqttToStreamTransformer, StreamToMqttTransformer};

type StreamToMqttFactory = Box<dyn Fn() -> Arc<dyn StreamToMqttTransformer> + Send + Sync>;
type MqttToStreamFactory = Box<dyn Fn() -> Arc<dyn MqttToStreamTransformer> + Send + Sync>;

/// Named transformer factories.
///
/// Routes reference transformers by name; at bootstrap the catalog creates
/// one fresh instance per route reference, so two routes naming the same
/// transformer never share state.
#[derive(Default)]
pub struct TransformerCatalog {
    stream_to_mqtt: HashMap<String, StreamToMqttFactory>,
    mqtt_to_stream: HashMap<String, MqttToStreamFactory>,
}

impl std::fmt::Debug for TransformerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerCatalog")
            .field("stream_to_mqtt", &self.stream_to_mqtt.keys().collect::<Vec<_>>())
            .field("mqtt_to_stream", &self.mqtt_to_stream.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransformerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream→broker transformer factory under `name`.
    /// Re-registering a name replaces the previous factory.
    pub fn register_stream_to_mqtt<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: StreamToMqttTransformer + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.stream_to_mqtt.insert(
            name.into(),
            Box::new(move || Arc::new(factory()) as Arc<dyn StreamToMqttTransformer>),
        );
    }

    /// Register a broker→stream transformer factory under `name`.
    pub fn register_mqtt_to_stream<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: MqttToStreamTransformer + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.mqtt_to_stream.insert(
            name.into(),
            Box::new(move || Arc::new(factory()) as Arc<dyn MqttToStreamTransformer>),
        );
    }

    pub(crate) fn create_stream_to_mqtt(&self, name: &str) -> Option<Arc<dyn StreamToMqttTransformer>> {
        self.stream_to_mqtt.get(name).map(|factory| factory())
    }

    pub(crate) fn create_mqtt_to_stream(&self, name: &str) -> Option<Arc<dyn MqttToStreamTransformer>> {
        self.mqtt_to_stream.get(name).map(|factory| factory())
    }
}
