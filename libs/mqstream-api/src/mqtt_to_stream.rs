use std::sync::Arc;

use crate::builder::OutboundRecordBuilder;
use crate::error::OutputError;
use crate::metrics::MetricRegistry;
use crate::origin::OriginId;
use crate::publish::PublishPacket;
use crate::record::OutboundRecord;
use crate::settings::CustomSettings;

/// Input of one broker→stream transformer call. Fresh per invocation;
/// owns the triggering PUBLISH for the duration of the call.
#[derive(Debug, Clone)]
pub struct MqttToStreamInput {
    packet: PublishPacket,
    metrics: Arc<MetricRegistry>,
    settings: Arc<CustomSettings>,
}

impl MqttToStreamInput {
    pub fn new(
        packet: PublishPacket,
        metrics: Arc<MetricRegistry>,
        settings: Arc<CustomSettings>,
    ) -> Self {
        Self {
            packet,
            metrics,
            settings,
        }
    }

    /// The broker PUBLISH that triggered this call.
    pub fn publish_packet(&self) -> &PublishPacket {
        &self.packet
    }

    pub fn metric_registry(&self) -> &MetricRegistry {
        &self.metrics
    }

    pub fn custom_settings(&self) -> &CustomSettings {
        &self.settings
    }
}

/// Output accumulator of one broker→stream transformer call. Fresh per
/// invocation, never reused across calls.
///
/// Records registered here are pushed to the stream by the transport
/// layer in list order after the call returns. The same record may occupy
/// multiple list positions and is then pushed once per occurrence.
#[derive(Debug)]
pub struct MqttToStreamOutput {
    origin: OriginId,
    records: Option<Vec<OutboundRecord>>,
}

impl MqttToStreamOutput {
    pub fn new() -> Self {
        Self {
            origin: OriginId::next(),
            records: None,
        }
    }

    /// A new outbound record builder bound to this output. One builder can
    /// build multiple records; only records from this output's builders
    /// are accepted by [`set_outbound_records`](Self::set_outbound_records).
    pub fn record_builder(&self) -> OutboundRecordBuilder {
        OutboundRecordBuilder::with_origin(self.origin)
    }

    /// Set the result list, replacing any previously set list in full.
    ///
    /// Rejects — without touching the current list — any element that was
    /// not built through this output's [`record_builder`](Self::record_builder).
    pub fn set_outbound_records(&mut self, records: Vec<OutboundRecord>) -> Result<(), OutputError> {
        for (index, record) in records.iter().enumerate() {
            if record.origin() != self.origin {
                return Err(OutputError::ForeignElement { index });
            }
        }
        self.records = Some(records);
        Ok(())
    }

    /// The effective result list: empty if the setter was never called —
    /// the triggering PUBLISH is then consumed with zero records.
    pub fn into_records(self) -> Vec<OutboundRecord> {
        self.records.unwrap_or_default()
    }
}

impl Default for MqttToStreamOutput {
    fn default() -> Self {
        Self::new()
    }
}
