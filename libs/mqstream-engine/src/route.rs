use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::invoker::{MqttToStreamInvoker, StreamToMqttInvoker};

/// MQTT topic filter matching: `+` matches one level, a trailing `#`
/// matches the remaining levels (including none).
pub fn topic_matches_filter(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');
    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(f), Some(t)) if f == t => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Structural topic filter validation: non-empty, `+` only as a whole
/// level, `#` only as the final whole level.
pub fn is_valid_topic_filter(filter: &str) -> bool {
    if filter.is_empty() || filter.contains('\0') {
        return false;
    }
    let levels: Vec<&str> = filter.split('/').collect();
    let last = levels.len() - 1;
    levels.iter().enumerate().all(|(i, level)| {
        if level.contains('#') {
            *level == "#" && i == last
        } else {
            !level.contains('+') || *level == "+"
        }
    })
}

/// A bound stream→broker route: stream names plus the invoker that drives
/// its transformer instance.
pub struct StreamToMqttRoute {
    name: String,
    streams: Vec<String>,
    invoker: StreamToMqttInvoker,
}

impl std::fmt::Debug for StreamToMqttRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamToMqttRoute").field("name", &self.name).finish()
    }
}

impl StreamToMqttRoute {
    pub fn new(name: String, streams: Vec<String>, invoker: StreamToMqttInvoker) -> Self {
        Self {
            name,
            streams,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn matches_stream(&self, stream: &str) -> bool {
        self.streams.iter().any(|s| s == stream)
    }

    pub fn invoker(&self) -> &StreamToMqttInvoker {
        &self.invoker
    }
}

/// A bound broker→stream route: topic filters plus the invoker that
/// drives its transformer instance.
pub struct MqttToStreamRoute {
    name: String,
    topic_filters: Vec<String>,
    invoker: MqttToStreamInvoker,
}

impl std::fmt::Debug for MqttToStreamRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttToStreamRoute").field("name", &self.name).finish()
    }
}

impl MqttToStreamRoute {
    pub fn new(name: String, topic_filters: Vec<String>, invoker: MqttToStreamInvoker) -> Self {
        Self {
            name,
            topic_filters,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic_filters(&self) -> &[String] {
        &self.topic_filters
    }

    pub fn matches_topic(&self, topic: &str) -> bool {
        self.topic_filters
            .iter()
            .any(|filter| topic_matches_filter(filter, topic))
    }

    pub fn invoker(&self) -> &MqttToStreamInvoker {
        &self.invoker
    }
}

/// Registry of all bound routes, both directions.
///
/// Interior mutability so routes can be added while lookups run on other
/// threads.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    stream_to_mqtt: RwLock<HashMap<String, Arc<StreamToMqttRoute>>>,
    mqtt_to_stream: RwLock<HashMap<String, Arc<MqttToStreamRoute>>>,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("route registry read lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("route registry write lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_stream_to_mqtt(&self, route: StreamToMqttRoute) {
        let name = route.name.clone();
        write_lock(&self.stream_to_mqtt).insert(name, Arc::new(route));
    }

    pub fn register_mqtt_to_stream(&self, route: MqttToStreamRoute) {
        let name = route.name.clone();
        write_lock(&self.mqtt_to_stream).insert(name, Arc::new(route));
    }

    pub fn stream_to_mqtt(&self, name: &str) -> Option<Arc<StreamToMqttRoute>> {
        read_lock(&self.stream_to_mqtt).get(name).cloned()
    }

    pub fn mqtt_to_stream(&self, name: &str) -> Option<Arc<MqttToStreamRoute>> {
        read_lock(&self.mqtt_to_stream).get(name).cloned()
    }

    /// All stream→broker routes bound to `stream`.
    pub fn stream_routes_for(&self, stream: &str) -> Vec<Arc<StreamToMqttRoute>> {
        read_lock(&self.stream_to_mqtt)
            .values()
            .filter(|route| route.matches_stream(stream))
            .cloned()
            .collect()
    }

    /// All broker→stream routes whose filters match `topic`.
    pub fn mqtt_routes_for(&self, topic: &str) -> Vec<Arc<MqttToStreamRoute>> {
        read_lock(&self.mqtt_to_stream)
            .values()
            .filter(|route| route.matches_topic(topic))
            .cloned()
            .collect()
    }

    pub fn route_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_lock(&self.stream_to_mqtt).keys().cloned().collect();
        names.extend(read_lock(&self.mqtt_to_stream).keys().cloned());
        names
    }
}
