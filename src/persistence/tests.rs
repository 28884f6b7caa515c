use super::sled_store::QueueStore;
use crate::broker::message::QueueMessage;

fn message(payload: &str) -> QueueMessage {
    QueueMessage {
        queue: "invoices".to_string(),
        routing_key: "invoice_created".to_string(),
        payload: payload.to_string(),
        published_at: 0,
    }
}

#[test]
fn test_append_then_pending_preserves_publish_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = QueueStore::open(dir.path().to_str().unwrap()).unwrap();

    store.append("invoices", &message("first")).unwrap();
    store.append("invoices", &message("second")).unwrap();

    let pending = store.pending("invoices").unwrap();
    let payloads: Vec<&str> = pending
        .iter()
        .map(|(_, msg)| msg.payload.as_str())
        .collect();
    assert_eq!(payloads, vec!["first", "second"]);
}

#[test]
fn test_remove_settles_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = QueueStore::open(dir.path().to_str().unwrap()).unwrap();

    let seq = store.append("invoices", &message("done")).unwrap();
    store.remove("invoices", seq).unwrap();
    assert!(store.pending("invoices").unwrap().is_empty());

    // Removing an already-settled sequence has no effect.
    store.remove("invoices", seq).unwrap();
}

#[test]
fn test_queues_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let store = QueueStore::open(dir.path().to_str().unwrap()).unwrap();

    store.append("invoices", &message("a")).unwrap();
    assert!(store.pending("other").unwrap().is_empty());
}
