use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::publisher::Publisher;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{debug, info};

/// Publishes alerts to Kafka; a topic's registered target is the Kafka topic name.
pub struct KafkaPublisher {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaPublisher {
    /// Builds a producer with SASL authentication from the application config.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        info!(
            "Initializing Kafka producer for {}",
            config.kafka_bootstrap_servers
        );

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.kafka_bootstrap_servers)
            .set(
                "message.timeout.ms",
                config.kafka_message_timeout_ms.to_string(),
            )
            // SASL Configuration
            .set("security.protocol", &config.kafka_security_protocol)
            .set("sasl.mechanism", &config.kafka_sasl_mechanism)
            .set("sasl.username", &config.kafka_username)
            .set("sasl.password", &config.kafka_password);

        let producer: FutureProducer = client_config.create()?;

        Ok(Self {
            producer,
            queue_timeout: Duration::from_millis(config.kafka_message_timeout_ms),
        })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, target: &str, key: &str, message: &str) -> Result<(), PipelineError> {
        let record = FutureRecord::to(target).key(key).payload(message);

        match self.producer.send(record, self.queue_timeout).await {
            Ok((partition, offset)) => {
                debug!("Delivered alert to {} [{}] @ {}", target, partition, offset);
                Ok(())
            }
            Err((e, _)) => Err(PipelineError::Publish {
                target: target.to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}
