use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use mqstream_api::metrics::{Counter, MetricRegistry};
use mqstream_api::mqtt_to_stream::{MqttToStreamInput, MqttToStreamOutput};
use mqstream_api::publish::{Publish, PublishPacket};
use mqstream_api::record::{InboundRecord, OutboundRecord};
use mqstream_api::settings::CustomSettings;
use mqstream_api::stream_to_mqtt::{StreamToMqttInput, StreamToMqttOutput};
use mqstream_api::transformer::{MqttToStreamTransformer, StreamToMqttTransformer};

/// Drives one stream→broker transformer instance.
///
/// Every invocation gets a fresh input and a fresh output; nothing is
/// shared between calls, so `invoke` is safe to call from any number of
/// worker threads simultaneously. A panic escaping the transformer is
/// contained here: the record is dropped with zero output and the panic
/// is logged — the invoker stays usable.
pub struct StreamToMqttInvoker {
    route: String,
    transformer: Arc<dyn StreamToMqttTransformer>,
    metrics: Arc<MetricRegistry>,
    settings: Arc<CustomSettings>,
    invocations: Counter,
    produced: Counter,
    contained_panics: Counter,
}

impl std::fmt::Debug for StreamToMqttInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamToMqttInvoker")
            .field("route", &self.route)
            .finish()
    }
}

impl StreamToMqttInvoker {
    pub fn new(
        route: impl Into<String>,
        transformer: Arc<dyn StreamToMqttTransformer>,
        metrics: Arc<MetricRegistry>,
        settings: Arc<CustomSettings>,
    ) -> Self {
        let route = route.into();
        let invocations = metrics.counter(&format!("route.{route}.invocations"));
        let produced = metrics.counter(&format!("route.{route}.publishes"));
        let contained_panics = metrics.counter(&format!("route.{route}.contained_panics"));
        Self {
            route,
            transformer,
            metrics,
            settings,
            invocations,
            produced,
            contained_panics,
        }
    }

    /// One invocation of the transformer for one inbound record. Returns
    /// the publishes to deliver, in the order the transformer listed them.
    pub fn invoke(&self, record: InboundRecord) -> Vec<Publish> {
        self.invocations.increment();

        let input = StreamToMqttInput::new(
            record,
            Arc::clone(&self.metrics),
            Arc::clone(&self.settings),
        );
        let mut output = StreamToMqttOutput::new();

        let call = catch_unwind(AssertUnwindSafe(|| {
            self.transformer.transform_stream_to_mqtt(&input, &mut output);
        }));
        if call.is_err() {
            self.contained_panics.increment();
            tracing::error!(route = %self.route, "transformer panicked, record dropped with zero output");
            return Vec::new();
        }

        let publishes = output.into_publishes();
        self.produced.add(publishes.len() as u64);
        publishes
    }
}

/// Drives one broker→stream transformer instance. Same contract as
/// [`StreamToMqttInvoker`].
pub struct MqttToStreamInvoker {
    route: String,
    transformer: Arc<dyn MqttToStreamTransformer>,
    metrics: Arc<MetricRegistry>,
    settings: Arc<CustomSettings>,
    invocations: Counter,
    produced: Counter,
    contained_panics: Counter,
}

impl std::fmt::Debug for MqttToStreamInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttToStreamInvoker")
            .field("route", &self.route)
            .finish()
    }
}

impl MqttToStreamInvoker {
    pub fn new(
        route: impl Into<String>,
        transformer: Arc<dyn MqttToStreamTransformer>,
        metrics: Arc<MetricRegistry>,
        settings: Arc<CustomSettings>,
    ) -> Self {
        let route = route.into();
        let invocations = metrics.counter(&format!("route.{route}.invocations"));
        let produced = metrics.counter(&format!("route.{route}.records"));
        let contained_panics = metrics.counter(&format!("route.{route}.contained_panics"));
        Self {
            route,
            transformer,
            metrics,
            settings,
            invocations,
            produced,
            contained_panics,
        }
    }

    /// One invocation of the transformer for one broker PUBLISH. Returns
    /// the records to push, in the order the transformer listed them.
    pub fn invoke(&self, packet: PublishPacket) -> Vec<OutboundRecord> {
        self.invocations.increment();

        let input = MqttToStreamInput::new(
            packet,
            Arc::clone(&self.metrics),
            Arc::clone(&self.settings),
        );
        let mut output = MqttToStreamOutput::new();

        let call = catch_unwind(AssertUnwindSafe(|| {
            self.transformer.transform_mqtt_to_stream(&input, &mut output);
        }));
        if call.is_err() {
            self.contained_panics.increment();
            tracing::error!(route = %self.route, "transformer panicked, publish dropped with zero output");
            return Vec::new();
        }

        let records = output.into_records();
        self.produced.add(records.len() as u64);
        records
    }
}
