use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EngineError;

/// Root bridge configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Stream→broker route definitions.
    #[serde(default)]
    pub stream_to_mqtt_routes: Vec<StreamToMqttRouteConfig>,

    /// Broker→stream route definitions.
    #[serde(default)]
    pub mqtt_to_stream_routes: Vec<MqttToStreamRouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamToMqttRouteConfig {
    pub name: String,
    /// Stream names this route consumes records from.
    pub streams: Vec<String>,
    /// Catalog name of the transformer implementation.
    pub transformer: String,
    /// Opaque per-route settings, exposed read-only to the transformer.
    #[serde(default)]
    pub custom_settings: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttToStreamRouteConfig {
    pub name: String,
    /// MQTT topic filters (`+`/`#` wildcards) this route consumes.
    pub topic_filters: Vec<String>,
    /// Catalog name of the transformer implementation.
    pub transformer: String,
    #[serde(default)]
    pub custom_settings: HashMap<String, String>,
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = BridgeConfig::parse(
            r#"
            [[stream_to_mqtt_routes]]
            name = "orders-out"
            streams = ["orders"]
            transformer = "orders-to-mqtt"

            [stream_to_mqtt_routes.custom_settings]
            prefix = "shop"

            [[mqtt_to_stream_routes]]
            name = "telemetry-in"
            topic_filters = ["sensors/#", "devices/+/state"]
            transformer = "telemetry-to-stream"
            "#,
        )
        .unwrap();

        assert_eq!(config.stream_to_mqtt_routes.len(), 1);
        let route = &config.stream_to_mqtt_routes[0];
        assert_eq!(route.name, "orders-out");
        assert_eq!(route.streams, ["orders"]);
        assert_eq!(route.custom_settings.get("prefix").map(String::as_str), Some("shop"));

        assert_eq!(config.mqtt_to_stream_routes.len(), 1);
        assert_eq!(
            config.mqtt_to_stream_routes[0].topic_filters,
            ["sensors/#", "devices/+/state"]
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = BridgeConfig::parse("").unwrap();
        assert!(config.stream_to_mqtt_routes.is_empty());
        assert!(config.mqtt_to_stream_routes.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_transformer() {
        let result = BridgeConfig::parse(
            r#"
            [[stream_to_mqtt_routes]]
            name = "orders-out"
            streams = ["orders"]
            "#,
        );
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
