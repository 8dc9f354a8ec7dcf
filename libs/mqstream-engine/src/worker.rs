use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use mqstream_api::publish::{Publish, PublishPacket};
use mqstream_api::record::{InboundRecord, OutboundRecord};

use crate::route::{MqttToStreamRoute, StreamToMqttRoute};

/// Concurrent pump for one stream→broker route.
///
/// Spawns `workers` tasks that pull records from `input` and forward each
/// invocation's publishes, in list order, to `output`. Invocations for
/// different records run in parallel and may complete in any order —
/// callers needing a cross-record ordering policy must apply it
/// downstream. The tasks exit when `input` closes or the `output`
/// receiver is dropped.
pub fn spawn_stream_workers(
    route: Arc<StreamToMqttRoute>,
    input: mpsc::Receiver<InboundRecord>,
    output: mpsc::Sender<Publish>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let input = Arc::new(Mutex::new(input));
    (0..workers)
        .map(|_| {
            let route = Arc::clone(&route);
            let input = Arc::clone(&input);
            let output = output.clone();
            tokio::spawn(async move {
                loop {
                    let record = input.lock().await.recv().await;
                    let Some(record) = record else { break };
                    for publish in route.invoker().invoke(record) {
                        if output.send(publish).await.is_err() {
                            return;
                        }
                    }
                }
            })
        })
        .collect()
}

/// Concurrent pump for one broker→stream route. Same contract as
/// [`spawn_stream_workers`].
pub fn spawn_mqtt_workers(
    route: Arc<MqttToStreamRoute>,
    input: mpsc::Receiver<PublishPacket>,
    output: mpsc::Sender<OutboundRecord>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let input = Arc::new(Mutex::new(input));
    (0..workers)
        .map(|_| {
            let route = Arc::clone(&route);
            let input = Arc::clone(&input);
            let output = output.clone();
            tokio::spawn(async move {
                loop {
                    let packet = input.lock().await.recv().await;
                    let Some(packet) = packet else { break };
                    for record in route.invoker().invoke(packet) {
                        if output.send(record).await.is_err() {
                            return;
                        }
                    }
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::SystemTime;

    use mqstream_api::metrics::MetricRegistry;
    use mqstream_api::record::{ENCRYPTION_NONE, StreamRecord};
    use mqstream_api::settings::CustomSettings;
    use mqstream_api::stream_to_mqtt::{StreamToMqttInput, StreamToMqttOutput};
    use mqstream_api::transformer::StreamToMqttTransformer;

    use crate::invoker::StreamToMqttInvoker;

    struct Echo;

    impl StreamToMqttTransformer for Echo {
        fn transform_stream_to_mqtt(
            &self,
            input: &StreamToMqttInput,
            output: &mut StreamToMqttOutput,
        ) {
            let mut builder = output.publish_builder();
            builder
                .topic("echo")
                .unwrap()
                .payload(input.inbound_record().data());
            let publish = builder.build().unwrap();
            output.set_publishes(vec![publish]).unwrap();
        }
    }

    fn echo_route() -> Arc<StreamToMqttRoute> {
        let invoker = StreamToMqttInvoker::new(
            "echo",
            Arc::new(Echo),
            Arc::new(MetricRegistry::new()),
            Arc::new(CustomSettings::new()),
        );
        Arc::new(StreamToMqttRoute::new(
            "echo".to_owned(),
            vec!["orders".to_owned()],
            invoker,
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_drain_input_and_forward_output() {
        let (record_tx, record_rx) = mpsc::channel(64);
        let (publish_tx, mut publish_rx) = mpsc::channel(64);

        let handles = spawn_stream_workers(echo_route(), record_rx, publish_tx, 4);

        for i in 0..50 {
            let record = InboundRecord::new(
                "orders",
                format!("payload-{i}").into_bytes(),
                "k",
                i.to_string(),
                SystemTime::UNIX_EPOCH,
                ENCRYPTION_NONE,
            );
            record_tx.send(record).await.unwrap();
        }
        drop(record_tx);

        let mut seen = HashSet::new();
        while let Some(publish) = publish_rx.recv().await {
            seen.insert(String::from_utf8(publish.payload_to_vec()).unwrap());
        }
        assert_eq!(seen.len(), 50);

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
