//! Cluster node records.

use serde_json::{Map, Value};
use tracing::warn;

/// Name and hostname of one cluster node, keyed by its machine id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub machine_id: String,
    pub name: String,
    pub hostname: String,
}

/// Extract node records from the `node` map of a cluster config.
///
/// Entries without a string `name` and `hostname` are skipped.
pub fn node_records(nodes: &Map<String, Value>) -> Vec<NodeRecord> {
    nodes
        .iter()
        .filter_map(|(machine_id, data)| {
            let field = |f: &str| data.get(f).and_then(Value::as_str).map(str::to_string);
            match (field("name"), field("hostname")) {
                (Some(name), Some(hostname)) => Some(NodeRecord {
                    machine_id: machine_id.clone(),
                    name,
                    hostname,
                }),
                _ => {
                    warn!(machine_id = %machine_id, "Node entry lacks name or hostname, skipping");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_records() {
        let nodes = json!({
            "m1": { "hostname": "h1", "name": "n1", "type": "storage_node" },
            "m2": { "hostname": "h2" },
            "m3": { "hostname": 7, "name": "n3" }
        });
        let records = node_records(nodes.as_object().unwrap());
        assert_eq!(
            records,
            vec![NodeRecord {
                machine_id: "m1".into(),
                name: "n1".into(),
                hostname: "h1".into(),
            }]
        );
    }
}
