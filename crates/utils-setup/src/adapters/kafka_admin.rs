//! Kafka-backed message bus admin driving the stock Kafka admin scripts.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use shared_bus::{MessageBusAdmin, MessageBusError, MessageBusErrorKind};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::ports::outbound::{CommandSpec, ProcessOutput, ProcessRunner};

/// Default location of the Kafka scripts.
pub const DEFAULT_KAFKA_BIN_DIR: &str = "/opt/kafka/bin";

const TOPICS_SCRIPT: &str = "kafka-topics.sh";
const DELETE_RECORDS_SCRIPT: &str = "kafka-delete-records.sh";
/// Offset the broker resolves to the partition's high watermark.
const HIGH_WATERMARK: i64 = -1;

/// `MessageBusAdmin` over `kafka-topics.sh` / `kafka-delete-records.sh`.
///
/// Script output is mapped to structured error kinds here so callers never
/// inspect message text.
pub struct KafkaCliAdmin {
    runner: Arc<dyn ProcessRunner>,
    bin_dir: PathBuf,
    bootstrap: RwLock<Option<String>>,
}

impl KafkaCliAdmin {
    pub fn new(runner: Arc<dyn ProcessRunner>, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            bin_dir: bin_dir.into(),
            bootstrap: RwLock::new(None),
        }
    }

    fn bootstrap(&self) -> Result<String, MessageBusError> {
        self.bootstrap.read().clone().ok_or_else(|| {
            MessageBusError::new(MessageBusErrorKind::NotInitialized, "message bus is not initialized")
        })
    }

    fn topics_command(&self, bootstrap: &str) -> CommandSpec {
        CommandSpec::new(self.bin_dir.join(TOPICS_SCRIPT)).args(["--bootstrap-server", bootstrap])
    }

    fn delete_records_command(&self, bootstrap: &str, offsets: &NamedTempFile) -> CommandSpec {
        CommandSpec::new(self.bin_dir.join(DELETE_RECORDS_SCRIPT))
            .args(["--bootstrap-server", bootstrap, "--offset-json-file"])
            .arg(offsets.path())
    }

    async fn exec(&self, command: &CommandSpec) -> Result<ProcessOutput, MessageBusError> {
        debug!(%command, "Running kafka admin script");
        self.runner
            .run(command, false)
            .await
            .map_err(|e| io_failure(format!("{} could not be run", command), &e))
    }

    async fn list_topics(&self, bootstrap: &str) -> Result<Vec<String>, MessageBusError> {
        let output = self.exec(&self.topics_command(bootstrap).arg("--list")).await?;
        if !output.success() {
            return Err(script_error(MessageBusErrorKind::Backend, &output));
        }
        Ok(parse_topic_list(&output.stdout))
    }
}

/// Strip a `tcp://` style scheme, keeping `host:port`.
fn bootstrap_server(endpoint: &str) -> &str {
    endpoint
        .split_once("://")
        .map_or(endpoint, |(_, address)| address)
        .trim_end_matches('/')
}

/// Topic names printed by `--list`, without Kafka's internal topics.
fn parse_topic_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("__"))
        .map(str::to_string)
        .collect()
}

/// Partition ids printed by `kafka-topics.sh --describe`.
fn parse_partitions(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            words.find(|w| *w == "Partition:")?;
            words.next()?.parse().ok()
        })
        .collect()
}

/// Offset file asking the broker to drop every record below the high
/// watermark of each partition.
fn offsets_file(topic: &str, partitions: &[u32]) -> io::Result<NamedTempFile> {
    let entries: Vec<_> = partitions
        .iter()
        .map(|p| json!({ "topic": topic, "partition": p, "offset": HIGH_WATERMARK }))
        .collect();
    let request = json!({ "version": 1, "partitions": entries });

    let mut file = NamedTempFile::new()?;
    file.write_all(request.to_string().as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn io_failure(what: String, e: &io::Error) -> MessageBusError {
    let err = MessageBusError::new(MessageBusErrorKind::Backend, format!("{}: {}", what, e));
    match e.raw_os_error() {
        Some(code) => err.with_code(code),
        None => err,
    }
}

fn combined_output(output: &ProcessOutput) -> String {
    format!("{}{}", output.stdout, output.stderr).trim().to_string()
}

fn script_error(kind: MessageBusErrorKind, output: &ProcessOutput) -> MessageBusError {
    MessageBusError::new(kind, combined_output(output))
}

fn reports_existing(output: &ProcessOutput) -> bool {
    combined_output(output).contains("already exists")
}

fn reports_missing(output: &ProcessOutput) -> bool {
    let text = combined_output(output);
    text.contains("does not exist") || text.contains("UnknownTopicOrPartition")
}

/// `kafka-delete-records.sh` exits 0 even when a partition fails.
fn reports_partition_error(output: &ProcessOutput) -> bool {
    combined_output(output).contains("error:")
}

fn topic_error(output: &ProcessOutput) -> MessageBusError {
    let kind = if reports_missing(output) {
        MessageBusErrorKind::UnknownTopic
    } else {
        MessageBusErrorKind::Backend
    };
    script_error(kind, output)
}

#[async_trait]
impl MessageBusAdmin for KafkaCliAdmin {
    async fn init(&self, endpoints: &[String]) -> Result<(), MessageBusError> {
        if endpoints.is_empty() {
            return Err(MessageBusError::new(
                MessageBusErrorKind::InvalidRequest,
                "no message bus endpoints given",
            ));
        }
        let bootstrap = endpoints
            .iter()
            .map(|e| bootstrap_server(e))
            .collect::<Vec<_>>()
            .join(",");

        let output = self.exec(&self.topics_command(&bootstrap).arg("--list")).await?;
        if !output.success() {
            return Err(script_error(MessageBusErrorKind::Unreachable, &output));
        }
        info!(%bootstrap, "Connected to kafka");
        *self.bootstrap.write() = Some(bootstrap);
        Ok(())
    }

    async fn register_message_types(
        &self,
        message_types: &[String],
        partitions: u32,
    ) -> Result<(), MessageBusError> {
        if partitions == 0 {
            return Err(MessageBusError::new(
                MessageBusErrorKind::InvalidRequest,
                "partitions must be at least 1",
            ));
        }
        let bootstrap = self.bootstrap()?;
        let partitions = partitions.to_string();
        let mut existing = Vec::new();
        for topic in message_types {
            let command = self.topics_command(&bootstrap).args([
                "--create",
                "--topic",
                topic.as_str(),
                "--partitions",
                partitions.as_str(),
            ]);
            let output = self.exec(&command).await?;
            if output.success() {
                info!(message_type = %topic, "Topic created");
            } else if reports_existing(&output) {
                existing.push(topic.clone());
            } else {
                return Err(script_error(MessageBusErrorKind::Backend, &output));
            }
        }
        if existing.is_empty() {
            Ok(())
        } else {
            Err(MessageBusError::new(
                MessageBusErrorKind::TopicAlreadyExists,
                format!("message types already exist: {}", existing.join(", ")),
            ))
        }
    }

    async fn list_message_types(&self) -> Result<Vec<String>, MessageBusError> {
        let bootstrap = self.bootstrap()?;
        self.list_topics(&bootstrap).await
    }

    async fn deregister_message_types(
        &self,
        message_types: &[String],
    ) -> Result<(), MessageBusError> {
        let bootstrap = self.bootstrap()?;
        for topic in message_types {
            let command = self
                .topics_command(&bootstrap)
                .args(["--delete", "--topic", topic.as_str()]);
            let output = self.exec(&command).await?;
            if !output.success() {
                return Err(topic_error(&output));
            }
            info!(message_type = %topic, "Topic deleted");
        }
        Ok(())
    }

    async fn purge_message_type(&self, message_type: &str) -> Result<(), MessageBusError> {
        let bootstrap = self.bootstrap()?;
        let describe = self
            .topics_command(&bootstrap)
            .args(["--describe", "--topic", message_type]);
        let output = self.exec(&describe).await?;
        if !output.success() {
            return Err(topic_error(&output));
        }
        let partitions = parse_partitions(&output.stdout);
        if partitions.is_empty() {
            return Err(MessageBusError::new(
                MessageBusErrorKind::UnknownTopic,
                format!("no partitions reported for {}", message_type),
            ));
        }

        let offsets = offsets_file(message_type, &partitions)
            .map_err(|e| io_failure(format!("offset file for {}", message_type), &e))?;
        let output = self
            .exec(&self.delete_records_command(&bootstrap, &offsets))
            .await?;
        if !output.success() || reports_partition_error(&output) {
            return Err(topic_error(&output));
        }
        debug!(%message_type, partitions = partitions.len(), "Topic purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;

    /// Answers each script invocation from a queue and records the command.
    struct ScriptedRunner {
        replies: Mutex<Vec<ProcessOutput>>,
        seen: Mutex<Vec<String>>,
        offset_files: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedRunner {
        fn new(replies: Vec<ProcessOutput>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
                offset_files: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, command: &CommandSpec, _realtime: bool) -> io::Result<ProcessOutput> {
            self.seen.lock().push(command.to_string());
            let args = command.get_args();
            if let Some(pos) = args.iter().position(|a| a == "--offset-json-file") {
                let contents = std::fs::read_to_string(&args[pos + 1])?;
                self.offset_files
                    .lock()
                    .push(serde_json::from_str(&contents).unwrap());
            }
            Ok(self.replies.lock().remove(0))
        }
    }

    fn reply(stdout: &str, stderr: &str, return_code: i32) -> ProcessOutput {
        ProcessOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            return_code,
        }
    }

    #[test]
    fn test_bootstrap_server() {
        assert_eq!(bootstrap_server("tcp://kafka-1:9092"), "kafka-1:9092");
        assert_eq!(bootstrap_server("kafka-1:9092"), "kafka-1:9092");
        assert_eq!(
            parse_topic_list("IEM\n__consumer_offsets\n\naudit_messages\n"),
            vec!["IEM", "audit_messages"]
        );
    }

    const DESCRIBE_IEM: &str = "Topic: IEM\tTopicId: x1\tPartitionCount: 2\tReplicationFactor: 1\tConfigs: \n\
        \tTopic: IEM\tPartition: 0\tLeader: 1\tReplicas: 1\tIsr: 1\n\
        \tTopic: IEM\tPartition: 1\tLeader: 1\tReplicas: 1\tIsr: 1\n";

    #[test]
    fn test_parse_partitions() {
        assert_eq!(parse_partitions(DESCRIBE_IEM), vec![0, 1]);
        assert!(parse_partitions("").is_empty());
    }

    #[tokio::test]
    async fn test_purge_deletes_records_up_to_high_watermark() {
        let runner = ScriptedRunner::new(vec![
            reply("", "", 0),
            reply(DESCRIBE_IEM, "", 0),
            reply(
                "Records delete operation completed:\npartition: IEM-0\tlow_watermark: 42\npartition: IEM-1\tlow_watermark: 7\n",
                "",
                0,
            ),
        ]);
        let admin = KafkaCliAdmin::new(runner.clone(), "/opt/kafka/bin");
        admin.init(&["kafka-1:9092".to_string()]).await.unwrap();
        admin.purge_message_type("IEM").await.unwrap();

        let seen = runner.seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[1],
            "/opt/kafka/bin/kafka-topics.sh --bootstrap-server kafka-1:9092 --describe --topic IEM"
        );
        assert!(seen[2].starts_with(
            "/opt/kafka/bin/kafka-delete-records.sh --bootstrap-server kafka-1:9092 --offset-json-file "
        ));
        assert_eq!(
            runner.offset_files.lock().as_slice(),
            [serde_json::json!({
                "version": 1,
                "partitions": [
                    { "topic": "IEM", "partition": 0, "offset": -1 },
                    { "topic": "IEM", "partition": 1, "offset": -1 }
                ]
            })]
        );
    }

    #[tokio::test]
    async fn test_purge_reports_partition_errors() {
        let runner = ScriptedRunner::new(vec![
            reply("", "", 0),
            reply(DESCRIBE_IEM, "", 0),
            reply(
                "Records delete operation completed:\npartition: IEM-0\terror: org.apache.kafka.common.errors.TimeoutException\n",
                "",
                0,
            ),
        ]);
        let admin = KafkaCliAdmin::new(runner, "/opt/kafka/bin");
        admin.init(&["kafka-1:9092".to_string()]).await.unwrap();
        let err = admin.purge_message_type("IEM").await.unwrap_err();
        assert_eq!(err.kind, MessageBusErrorKind::Backend);
    }

    #[tokio::test]
    async fn test_purge_unknown_topic() {
        let runner = ScriptedRunner::new(vec![
            reply("", "", 0),
            reply("", "Error while executing topic command : Topic 'IEM' does not exist as expected", 1),
        ]);
        let admin = KafkaCliAdmin::new(runner.clone(), "/opt/kafka/bin");
        admin.init(&["kafka-1:9092".to_string()]).await.unwrap();
        let err = admin.purge_message_type("IEM").await.unwrap_err();
        assert_eq!(err.kind, MessageBusErrorKind::UnknownTopic);
        assert_eq!(runner.seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_calls_before_init_fail() {
        let admin = KafkaCliAdmin::new(ScriptedRunner::new(vec![]), "/opt/kafka/bin");
        let err = admin.list_message_types().await.unwrap_err();
        assert_eq!(err.kind, MessageBusErrorKind::NotInitialized);
    }

    #[tokio::test]
    async fn test_unreachable_broker() {
        let runner = ScriptedRunner::new(vec![reply("", "Timed out waiting for a node", 1)]);
        let admin = KafkaCliAdmin::new(runner, "/opt/kafka/bin");
        let err = admin
            .init(&["tcp://kafka-1:9092".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind, MessageBusErrorKind::Unreachable);
    }

    #[tokio::test]
    async fn test_register_reports_existing_topics() {
        let runner = ScriptedRunner::new(vec![
            reply("", "", 0),
            reply("Error while executing topic command : Topic 'IEM' already exists.", "", 1),
            reply("Created topic audit_messages.", "", 0),
        ]);
        let admin = KafkaCliAdmin::new(runner.clone(), "/opt/kafka/bin");
        admin
            .init(&["tcp://kafka-1:9092".to_string(), "tcp://kafka-2:9092".to_string()])
            .await
            .unwrap();
        let err = admin
            .register_message_types(&["IEM".to_string(), "audit_messages".to_string()], 1)
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        let seen = runner.seen.lock();
        assert_eq!(
            seen[0],
            "/opt/kafka/bin/kafka-topics.sh --bootstrap-server kafka-1:9092,kafka-2:9092 --list"
        );
        assert_eq!(
            seen[2],
            "/opt/kafka/bin/kafka-topics.sh --bootstrap-server kafka-1:9092,kafka-2:9092 --create --topic audit_messages --partitions 1"
        );
    }

    #[tokio::test]
    async fn test_deregister_unknown_topic() {
        let runner = ScriptedRunner::new(vec![
            reply("", "", 0),
            reply("", "Topic 'IEM' does not exist as expected", 1),
        ]);
        let admin = KafkaCliAdmin::new(runner, "/opt/kafka/bin");
        admin.init(&["kafka-1:9092".to_string()]).await.unwrap();
        let err = admin
            .deregister_message_types(&["IEM".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind, MessageBusErrorKind::UnknownTopic);
    }
}
