use std::sync::Arc;

use mqstream_api::metrics::MetricRegistry;
use mqstream_api::publish::{Publish, PublishPacket};
use mqstream_api::record::{InboundRecord, OutboundRecord, StreamRecord};
use mqstream_api::settings::CustomSettings;
use mqstream_api::transformer::TransformerInitInput;

use crate::catalog::TransformerCatalog;
use crate::config::BridgeConfig;
use crate::error::EngineError;
use crate::invoker::{MqttToStreamInvoker, StreamToMqttInvoker};
use crate::route::{MqttToStreamRoute, RouteRegistry, StreamToMqttRoute, is_valid_topic_filter};

/// The bootstrapped bridge — every configured route resolved against the
/// catalog, every transformer instance created and initialized.
///
/// The transport layer owns polling and publishing; it hands each inbound
/// unit to [`on_stream_record`](Bridge::on_stream_record) or
/// [`on_publish`](Bridge::on_publish) and performs the I/O for whatever
/// comes back, in list order.
pub struct Bridge {
    registry: Arc<RouteRegistry>,
    metrics: Arc<MetricRegistry>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").field("registry", &self.registry).finish()
    }
}

impl Bridge {
    /// Bootstrap from a parsed configuration with a fresh metric registry.
    pub fn bootstrap(config: &BridgeConfig, catalog: &TransformerCatalog) -> Result<Self, EngineError> {
        Self::bootstrap_with_metrics(config, catalog, Arc::new(MetricRegistry::new()))
    }

    /// Bootstrap against a host-owned metric registry.
    ///
    /// For every route: create one fresh transformer instance via the
    /// catalog, call its `init` exactly once, then register the bound
    /// route. Fails on unknown transformer names, duplicate route names,
    /// empty stream lists and malformed topic filters.
    pub fn bootstrap_with_metrics(
        config: &BridgeConfig,
        catalog: &TransformerCatalog,
        metrics: Arc<MetricRegistry>,
    ) -> Result<Self, EngineError> {
        let registry = Arc::new(RouteRegistry::new());

        for route_cfg in &config.stream_to_mqtt_routes {
            if registry.stream_to_mqtt(&route_cfg.name).is_some() {
                return Err(EngineError::DuplicateRoute(route_cfg.name.clone()));
            }
            if route_cfg.streams.is_empty() {
                return Err(EngineError::Config("at least one stream is required".into())
                    .with_context(format!("route '{}'", route_cfg.name)));
            }

            let transformer = catalog
                .create_stream_to_mqtt(&route_cfg.transformer)
                .ok_or_else(|| EngineError::UnknownTransformer {
                    route: route_cfg.name.clone(),
                    transformer: route_cfg.transformer.clone(),
                })?;

            let settings = Arc::new(CustomSettings::from_entries(
                route_cfg.custom_settings.clone(),
            ));
            transformer.init(&TransformerInitInput::new(
                Arc::clone(&metrics),
                Arc::clone(&settings),
            ));

            let invoker = StreamToMqttInvoker::new(
                &route_cfg.name,
                transformer,
                Arc::clone(&metrics),
                settings,
            );
            registry.register_stream_to_mqtt(StreamToMqttRoute::new(
                route_cfg.name.clone(),
                route_cfg.streams.clone(),
                invoker,
            ));
            tracing::info!(
                route = %route_cfg.name,
                transformer = %route_cfg.transformer,
                "bound stream-to-mqtt route"
            );
        }

        for route_cfg in &config.mqtt_to_stream_routes {
            if registry.mqtt_to_stream(&route_cfg.name).is_some() {
                return Err(EngineError::DuplicateRoute(route_cfg.name.clone()));
            }
            if route_cfg.topic_filters.is_empty() {
                return Err(
                    EngineError::Config("at least one topic filter is required".into())
                        .with_context(format!("route '{}'", route_cfg.name)),
                );
            }
            for filter in &route_cfg.topic_filters {
                if !is_valid_topic_filter(filter) {
                    return Err(
                        EngineError::Config(format!("invalid topic filter {filter:?}"))
                            .with_context(format!("route '{}'", route_cfg.name)),
                    );
                }
            }

            let transformer = catalog
                .create_mqtt_to_stream(&route_cfg.transformer)
                .ok_or_else(|| EngineError::UnknownTransformer {
                    route: route_cfg.name.clone(),
                    transformer: route_cfg.transformer.clone(),
                })?;

            let settings = Arc::new(CustomSettings::from_entries(
                route_cfg.custom_settings.clone(),
            ));
            transformer.init(&TransformerInitInput::new(
                Arc::clone(&metrics),
                Arc::clone(&settings),
            ));

            let invoker = MqttToStreamInvoker::new(
                &route_cfg.name,
                transformer,
                Arc::clone(&metrics),
                settings,
            );
            registry.register_mqtt_to_stream(MqttToStreamRoute::new(
                route_cfg.name.clone(),
                route_cfg.topic_filters.clone(),
                invoker,
            ));
            tracing::info!(
                route = %route_cfg.name,
                transformer = %route_cfg.transformer,
                "bound mqtt-to-stream route"
            );
        }

        Ok(Self { registry, metrics })
    }

    /// Dispatch one inbound stream record to every route bound to its
    /// stream. Returns all produced publishes, preserving each route's
    /// list order; cross-route order follows registry iteration and is
    /// not part of the contract.
    pub fn on_stream_record(&self, record: &InboundRecord) -> Vec<Publish> {
        let mut publishes = Vec::new();
        for route in self.registry.stream_routes_for(record.stream_name()) {
            publishes.extend(route.invoker().invoke(record.clone()));
        }
        publishes
    }

    /// Dispatch one broker PUBLISH to every route whose filters match its
    /// topic. Returns all produced records, preserving each route's list
    /// order.
    pub fn on_publish(&self, packet: &PublishPacket) -> Vec<OutboundRecord> {
        let mut records = Vec::new();
        for route in self.registry.mqtt_routes_for(&packet.topic) {
            records.extend(route.invoker().invoke(packet.clone()));
        }
        records
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<MetricRegistry> {
        &self.metrics
    }
}
