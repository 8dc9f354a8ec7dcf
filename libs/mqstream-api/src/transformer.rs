use std::sync::Arc;

use crate::metrics::MetricRegistry;
use crate::mqtt_to_stream::{MqttToStreamInput, MqttToStreamOutput};
use crate::settings::CustomSettings;
use crate::stream_to_mqtt::{StreamToMqttInput, StreamToMqttOutput};

/// Read-only context handed to `init`, once per transformer instance,
/// before any transform call.
#[derive(Debug, Clone)]
pub struct TransformerInitInput {
    metrics: Arc<MetricRegistry>,
    settings: Arc<CustomSettings>,
}

impl TransformerInitInput {
    pub fn new(metrics: Arc<MetricRegistry>, settings: Arc<CustomSettings>) -> Self {
        Self { metrics, settings }
    }

    /// Shared metric registry. Counter and gauge handles minted here stay
    /// valid for the transformer's lifetime.
    pub fn metric_registry(&self) -> &MetricRegistry {
        &self.metrics
    }

    /// Custom settings of the route this transformer is bound to.
    pub fn custom_settings(&self) -> &CustomSettings {
        &self.settings
    }
}

/// User callback for the stream→broker direction: turns one inbound
/// stream record into zero or more broker publishes.
///
/// One instance exists per configured route reference. The transform
/// method may be called concurrently from multiple worker threads against
/// the same instance; implementations own the thread safety of any state
/// they keep. Each call receives a fresh input and a fresh output —
/// output state never leaks between calls.
///
/// Implementations must contain their own faults: the transform method
/// must not panic. A record whose transformation produced nothing is
/// consumed, not retried.
pub trait StreamToMqttTransformer: Send + Sync {
    /// Called exactly once, before any transform call. Default: no-op.
    fn init(&self, _input: &TransformerInitInput) {}

    /// Called once per inbound stream record. Register results via
    /// [`StreamToMqttOutput::set_publishes`]; leaving the output untouched
    /// means an empty effective result list.
    fn transform_stream_to_mqtt(&self, input: &StreamToMqttInput, output: &mut StreamToMqttOutput);
}

/// User callback for the broker→stream direction: turns one broker
/// PUBLISH into zero or more outbound stream records.
///
/// Same contract as [`StreamToMqttTransformer`]: one instance per route
/// reference, concurrent invocation, fresh input/output per call, faults
/// contained by the implementation.
pub trait MqttToStreamTransformer: Send + Sync {
    /// Called exactly once, before any transform call. Default: no-op.
    fn init(&self, _input: &TransformerInitInput) {}

    /// Called once per broker PUBLISH matching the route's topic filters.
    /// Register results via [`MqttToStreamOutput::set_outbound_records`].
    fn transform_mqtt_to_stream(&self, input: &MqttToStreamInput, output: &mut MqttToStreamOutput);
}
