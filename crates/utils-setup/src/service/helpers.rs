//! Steps shared by several phases.

use shared_bus::MessageBusAdmin;
use shared_conf::{ConfError, ConfUrl, KeyPath, Value};
use tracing::{debug, info, warn};

use crate::context::ConfigContext;
use crate::domain::{keys, node_records};
use crate::error::{SetupError, ValidationError};

/// Namespace the cluster node map is written to.
pub const CLUSTER_MAP_INDEX: &str = "cluster";

/// Turn a missing key into a validation error naming the template.
pub(crate) fn lookup_err(source_url: &ConfUrl) -> impl Fn(ConfError) -> SetupError + '_ {
    move |err| match err {
        ConfError::KeyNotFound { key } => ValidationError::MissingKey {
            key,
            source_url: source_url.to_string(),
        }
        .into(),
        other => other.into(),
    }
}

/// Fail unless this node's `hostname` and `name` are in the template.
pub(crate) fn validate_node_keys(
    ctx: &ConfigContext,
    index: &str,
    template: &ConfUrl,
) -> Result<(), SetupError> {
    let tree = ctx.store().tree(index)?;
    for field in ["hostname", "name"] {
        let key = keys::node_field(ctx.machine_id(), field);
        if !tree.contains(&KeyPath::parse(&key)?) {
            return Err(ValidationError::MissingKey {
                key,
                source_url: template.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Write `cluster>{name} = hostname` for every node of the template's node
/// map into the `cluster` namespace and save it.
pub(crate) fn copy_cluster_map(
    ctx: &mut ConfigContext,
    index: &str,
    template: &ConfUrl,
) -> Result<usize, SetupError> {
    let records = {
        let tree = ctx.store().tree(index)?;
        let nodes = tree
            .get_map(&KeyPath::parse(keys::NODE_MAP)?)
            .map_err(lookup_err(template))?;
        node_records(nodes)
    };

    let store = ctx.store_mut();
    store.load(CLUSTER_MAP_INDEX, template, true)?;
    let mut copied = 0;
    for record in &records {
        let key = match KeyPath::from_parts([CLUSTER_MAP_INDEX, record.name.as_str()]) {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    machine_id = %record.machine_id,
                    name = %record.name,
                    error = %e,
                    "Node name is not a usable key, skipping"
                );
                continue;
            }
        };
        store.set(CLUSTER_MAP_INDEX, &key, Value::String(record.hostname.clone()))?;
        debug!(machine_id = %record.machine_id, name = %record.name, hostname = %record.hostname, "Cluster map entry set");
        copied += 1;
    }
    store.save(CLUSTER_MAP_INDEX)?;
    info!(nodes = copied, "Cluster map updated");
    Ok(copied)
}

/// Endpoints of the configured message bus backend, read from the template
/// namespace.
pub(crate) fn bus_endpoints(
    ctx: &ConfigContext,
    index: &str,
    template: &ConfUrl,
) -> Result<Vec<String>, SetupError> {
    let tree = ctx.store().tree(index)?;
    let backend = tree
        .get_str(&KeyPath::parse(keys::MESSAGE_BUS_BACKEND)?)
        .map_err(lookup_err(template))?;
    let endpoints = tree
        .get_string_list(&KeyPath::parse(&keys::endpoints(backend))?)
        .map_err(lookup_err(template))?;
    debug!(backend, ?endpoints, "Message bus endpoints resolved");
    Ok(endpoints)
}

/// Initialize the bus with the template's endpoints.
pub(crate) async fn connect_message_bus(
    bus: &dyn MessageBusAdmin,
    endpoints: &[String],
    context: &str,
) -> Result<(), SetupError> {
    bus.init(endpoints)
        .await
        .map_err(|e| SetupError::message_bus(context, e))
}
