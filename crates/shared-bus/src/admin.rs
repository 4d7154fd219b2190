//! # Message Bus Admin Port
//!
//! The interface setup phases use to manage message types.

use async_trait::async_trait;

use crate::error::MessageBusError;

/// Administrative access to the message bus.
///
/// Implementations must accept `init` more than once; phases re-initialize
/// the bus every time they run.
#[async_trait]
pub trait MessageBusAdmin: Send + Sync {
    /// Connect to the bus through the given endpoints.
    async fn init(&self, endpoints: &[String]) -> Result<(), MessageBusError>;

    /// Register message types with `partitions` partitions each.
    ///
    /// Types that do not exist yet are created even when some already exist;
    /// in that case the call reports `TopicAlreadyExists`.
    async fn register_message_types(
        &self,
        message_types: &[String],
        partitions: u32,
    ) -> Result<(), MessageBusError>;

    /// All registered message types.
    async fn list_message_types(&self) -> Result<Vec<String>, MessageBusError>;

    /// Remove message types from the bus.
    async fn deregister_message_types(&self, message_types: &[String])
        -> Result<(), MessageBusError>;

    /// Drop every message of a type while keeping the type registered.
    async fn purge_message_type(&self, message_type: &str) -> Result<(), MessageBusError>;
}
