pub mod builder;
pub mod error;
pub mod metrics;
pub mod mqtt_to_stream;
pub mod publish;
pub mod record;
pub mod settings;
pub mod stream_to_mqtt;
pub mod transformer;

mod origin;
