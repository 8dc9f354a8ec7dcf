use std::sync::Arc;

use crate::error::OutputError;
use crate::metrics::MetricRegistry;
use crate::origin::OriginId;
use crate::publish::{Publish, PublishBuilder};
use crate::record::InboundRecord;
use crate::settings::CustomSettings;

/// Input of one stream→broker transformer call. Fresh per invocation;
/// owns the triggering record for the duration of the call.
#[derive(Debug, Clone)]
pub struct StreamToMqttInput {
    record: InboundRecord,
    metrics: Arc<MetricRegistry>,
    settings: Arc<CustomSettings>,
}

impl StreamToMqttInput {
    pub fn new(
        record: InboundRecord,
        metrics: Arc<MetricRegistry>,
        settings: Arc<CustomSettings>,
    ) -> Self {
        Self {
            record,
            metrics,
            settings,
        }
    }

    /// The inbound record that triggered this call.
    pub fn inbound_record(&self) -> &InboundRecord {
        &self.record
    }

    pub fn metric_registry(&self) -> &MetricRegistry {
        &self.metrics
    }

    pub fn custom_settings(&self) -> &CustomSettings {
        &self.settings
    }
}

/// Output accumulator of one stream→broker transformer call. Fresh per
/// invocation, never reused across calls.
///
/// Publishes registered here are delivered by the transport layer in list
/// order after the call returns. The same publish may occupy multiple
/// list positions and is then delivered once per occurrence.
#[derive(Debug)]
pub struct StreamToMqttOutput {
    origin: OriginId,
    publishes: Option<Vec<Publish>>,
}

impl StreamToMqttOutput {
    pub fn new() -> Self {
        Self {
            origin: OriginId::next(),
            publishes: None,
        }
    }

    /// A new publish builder bound to this output. One builder can build
    /// multiple publishes; only publishes from this output's builders are
    /// accepted by [`set_publishes`](Self::set_publishes).
    pub fn publish_builder(&self) -> PublishBuilder {
        PublishBuilder::with_origin(self.origin)
    }

    /// Set the result list, replacing any previously set list in full.
    ///
    /// Rejects — without touching the current list — any element that was
    /// not built through this output's [`publish_builder`](Self::publish_builder).
    pub fn set_publishes(&mut self, publishes: Vec<Publish>) -> Result<(), OutputError> {
        for (index, publish) in publishes.iter().enumerate() {
            if publish.origin() != self.origin {
                return Err(OutputError::ForeignElement { index });
            }
        }
        self.publishes = Some(publishes);
        Ok(())
    }

    /// The effective result list: empty if the setter was never called —
    /// the triggering record is then consumed with zero publishes.
    pub fn into_publishes(self) -> Vec<Publish> {
        self.publishes.unwrap_or_default()
    }
}

impl Default for StreamToMqttOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::PublishBuilder;

    fn own_publish(output: &StreamToMqttOutput, topic: &str) -> Publish {
        let mut builder = output.publish_builder();
        builder.topic(topic).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_default_is_empty_list() {
        let output = StreamToMqttOutput::new();
        assert!(output.into_publishes().is_empty());
    }

    #[test]
    fn test_set_replaces_previous_list() {
        let mut output = StreamToMqttOutput::new();
        let a = own_publish(&output, "a");
        let b = own_publish(&output, "b");
        let c = own_publish(&output, "c");

        output.set_publishes(vec![a]).unwrap();
        output.set_publishes(vec![b.clone(), c.clone()]).unwrap();

        assert_eq!(output.into_publishes(), vec![b, c]);
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let mut output = StreamToMqttOutput::new();
        let a = own_publish(&output, "a");
        let b = own_publish(&output, "b");

        output
            .set_publishes(vec![a.clone(), b.clone(), a.clone()])
            .unwrap();
        assert_eq!(output.into_publishes(), vec![a.clone(), b, a]);
    }

    #[test]
    fn test_foreign_publish_rejected() {
        let mut output = StreamToMqttOutput::new();
        let own = own_publish(&output, "mine");

        let mut foreign_builder = PublishBuilder::new();
        foreign_builder.topic("theirs").unwrap();
        let foreign = foreign_builder.build().unwrap();

        assert_eq!(
            output.set_publishes(vec![own, foreign]).unwrap_err(),
            OutputError::ForeignElement { index: 1 }
        );
    }

    #[test]
    fn test_publish_from_other_output_rejected() {
        let other = StreamToMqttOutput::new();
        let foreign = own_publish(&other, "t");

        let mut output = StreamToMqttOutput::new();
        assert_eq!(
            output.set_publishes(vec![foreign]).unwrap_err(),
            OutputError::ForeignElement { index: 0 }
        );
    }

    #[test]
    fn test_rejected_call_leaves_previous_list() {
        let mut output = StreamToMqttOutput::new();
        let own = own_publish(&output, "mine");
        output.set_publishes(vec![own.clone()]).unwrap();

        let other = StreamToMqttOutput::new();
        let foreign = own_publish(&other, "t");
        assert!(output.set_publishes(vec![foreign]).is_err());

        assert_eq!(output.into_publishes(), vec![own]);
    }
}
