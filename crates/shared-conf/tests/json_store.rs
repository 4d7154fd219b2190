//! # JSON Store Persistence Tests
//!
//! Exercises `JsonConfStore` against real files: save/reload, parent
//! directory creation and namespaces sharing one source.

use std::fs;

use shared_conf::{json, ConfStore, ConfUrl, JsonConfStore, KeyPath};

fn key(s: &str) -> KeyPath {
    KeyPath::parse(s).unwrap()
}

#[test]
fn test_save_creates_parents_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utils/conf/cortx.conf");
    let url = ConfUrl::json(&path);

    let mut store = JsonConfStore::new();
    store.load("cortx_conf", &url, false).unwrap();
    store
        .set("cortx_conf", &key("support>local_path"), json!("/var/log/cortx/support_bundle"))
        .unwrap();
    store.save("cortx_conf").unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["support"]["local_path"], "/var/log/cortx/support_bundle");

    let mut fresh = JsonConfStore::new();
    fresh.load("cortx_conf", &url, false).unwrap();
    assert_eq!(
        fresh
            .tree("cortx_conf")
            .unwrap()
            .get_str(&key("support>local_path"))
            .unwrap(),
        "/var/log/cortx/support_bundle"
    );
}

#[test]
fn test_namespaces_sharing_a_file_are_independent_until_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cluster.conf");
    fs::write(&path, r#"{"node": {"m1": {"hostname": "h1", "name": "n1"}}}"#).unwrap();
    let url = ConfUrl::json(&path);

    let mut store = JsonConfStore::new();
    store.load("config", &url, false).unwrap();
    store.load("cluster", &url, true).unwrap();

    store.set("cluster", &key("cluster>n1"), json!("h1")).unwrap();
    assert_eq!(store.get("config", &key("cluster>n1")).unwrap(), None);

    store.save("cluster").unwrap();
    store.load("config", &url, false).unwrap();
    assert_eq!(
        store.get("config", &key("cluster>n1")).unwrap(),
        Some(json!("h1"))
    );
    assert_eq!(
        store.get("config", &key("node>m1>hostname")).unwrap(),
        Some(json!("h1"))
    );
}
