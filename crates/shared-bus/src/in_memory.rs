//! # In-Memory Message Bus
//!
//! Single-process `MessageBusAdmin` keeping topics in a map. Suitable for
//! local runs and tests; clustered deployments use a broker-backed adapter.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::admin::MessageBusAdmin;
use crate::error::{MessageBusError, MessageBusErrorKind};

#[derive(Debug, Default)]
struct Topic {
    partitions: u32,
    messages: Vec<String>,
}

#[derive(Debug, Default)]
struct BusState {
    endpoints: Option<Vec<String>>,
    topics: BTreeMap<String, Topic>,
}

/// In-memory implementation of the message bus admin port.
#[derive(Debug, Default)]
pub struct InMemoryMessageBus {
    /// When set, `init` fails unless at least one endpoint is in this set.
    reachable: Option<HashSet<String>>,
    state: RwLock<BusState>,
}

impl InMemoryMessageBus {
    /// Bus that accepts any endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus that only answers on the listed endpoints.
    #[must_use]
    pub fn with_reachable_endpoints<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reachable: Some(endpoints.into_iter().map(Into::into).collect()),
            state: RwLock::default(),
        }
    }

    /// Append a message to a registered type.
    pub fn publish(&self, message_type: &str, message: impl Into<String>) -> Result<(), MessageBusError> {
        let mut state = self.state.write();
        let topic = state
            .topics
            .get_mut(message_type)
            .ok_or_else(|| unknown_topic(message_type))?;
        topic.messages.push(message.into());
        Ok(())
    }

    /// Pending messages of a type, `None` if the type is not registered.
    pub fn message_count(&self, message_type: &str) -> Option<usize> {
        self.state.read().topics.get(message_type).map(|t| t.messages.len())
    }

    /// Partition count of a type, `None` if the type is not registered.
    pub fn partitions(&self, message_type: &str) -> Option<u32> {
        self.state.read().topics.get(message_type).map(|t| t.partitions)
    }

    /// Endpoints passed to the last successful `init`.
    pub fn connected_endpoints(&self) -> Option<Vec<String>> {
        self.state.read().endpoints.clone()
    }

    fn ensure_initialized(state: &BusState) -> Result<(), MessageBusError> {
        if state.endpoints.is_none() {
            return Err(MessageBusError::new(
                MessageBusErrorKind::NotInitialized,
                "message bus is not initialized",
            ));
        }
        Ok(())
    }
}

fn unknown_topic(message_type: &str) -> MessageBusError {
    MessageBusError::new(
        MessageBusErrorKind::UnknownTopic,
        format!("message type {} is not registered", message_type),
    )
}

#[async_trait]
impl MessageBusAdmin for InMemoryMessageBus {
    async fn init(&self, endpoints: &[String]) -> Result<(), MessageBusError> {
        if endpoints.is_empty() {
            return Err(MessageBusError::new(
                MessageBusErrorKind::InvalidRequest,
                "no message bus endpoints given",
            ));
        }
        if let Some(reachable) = &self.reachable {
            if !endpoints.iter().any(|e| reachable.contains(e)) {
                return Err(MessageBusError::new(
                    MessageBusErrorKind::Unreachable,
                    format!("no reachable endpoint in {:?}", endpoints),
                ));
            }
        }
        self.state.write().endpoints = Some(endpoints.to_vec());
        debug!(endpoints = ?endpoints, "In-memory message bus initialized");
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
        let mut state = self.state.write();
        Self::ensure_initialized(&state)?;

        let mut existing = Vec::new();
        for name in message_types {
            if state.topics.contains_key(name) {
                existing.push(name.clone());
                continue;
            }
            state.topics.insert(
                name.clone(),
                Topic {
                    partitions,
                    messages: Vec::new(),
                },
            );
            info!(message_type = %name, partitions, "Message type registered");
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
        let state = self.state.read();
        Self::ensure_initialized(&state)?;
        Ok(state.topics.keys().cloned().collect())
    }

    async fn deregister_message_types(
        &self,
        message_types: &[String],
    ) -> Result<(), MessageBusError> {
        let mut state = self.state.write();
        Self::ensure_initialized(&state)?;
        if let Some(missing) = message_types.iter().find(|n| !state.topics.contains_key(*n)) {
            return Err(unknown_topic(missing));
        }
        for name in message_types {
            state.topics.remove(name);
            info!(message_type = %name, "Message type deregistered");
        }
        Ok(())
    }

    async fn purge_message_type(&self, message_type: &str) -> Result<(), MessageBusError> {
        let mut state = self.state.write();
        Self::ensure_initialized(&state)?;
        let topic = state
            .topics
            .get_mut(message_type)
            .ok_or_else(|| unknown_topic(message_type))?;
        let dropped = topic.messages.len();
        topic.messages.clear();
        debug!(message_type, dropped, "Message type purged");
        Ok(())
    }
}
