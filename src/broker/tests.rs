use super::engine::{Broker, BrokerChannel, DEAD_LETTER_SUFFIX};
use super::message::QueueMessage;
use crate::persistence::QueueStore;
use crate::utils::error::{AckError, PublishError};

fn message(queue: &str, payload: &str) -> QueueMessage {
    QueueMessage {
        queue: queue.to_string(),
        routing_key: "invoice_created".to_string(),
        payload: payload.to_string(),
        published_at: 0,
    }
}

fn invoices_channel() -> BrokerChannel {
    let channel = BrokerChannel::new(Broker::new());
    channel.declare_queue("invoices", true).unwrap();
    channel
}

#[test]
fn test_declare_queue_is_idempotent() {
    let channel = invoices_channel();
    channel.declare_queue("invoices", true).unwrap();
    channel.publish(message("invoices", "a")).unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((1, 0)));
}

#[test]
fn test_publish_to_undeclared_queue_errors() {
    let channel = BrokerChannel::new(Broker::new());
    let err = channel.publish(message("nowhere", "a")).unwrap_err();
    assert!(matches!(err, PublishError::UnknownQueue(queue) if queue == "nowhere"));
}

#[test]
fn test_publish_before_consume_keeps_message_ready() {
    let channel = invoices_channel();
    channel.publish(message("invoices", "a")).unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((1, 0)));

    let mut consumer = channel.consume("invoices").unwrap();
    let delivery = consumer.try_next().expect("queued message not delivered");
    assert_eq!(delivery.message.payload, "a");
    assert!(!delivery.redelivered);
    assert_eq!(channel.queue_depth("invoices"), Some((0, 1)));
}

#[test]
fn test_deliveries_arrive_in_publish_order() {
    let channel = invoices_channel();
    let mut consumer = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "first")).unwrap();
    channel.publish(message("invoices", "second")).unwrap();

    assert_eq!(consumer.try_next().unwrap().message.payload, "first");
    assert_eq!(consumer.try_next().unwrap().message.payload, "second");
}

#[test]
fn test_ack_settles_delivery() {
    let channel = invoices_channel();
    let mut consumer = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "a")).unwrap();

    let delivery = consumer.try_next().unwrap();
    delivery.ack().unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((0, 0)));
}

#[test]
fn test_settling_twice_is_a_defined_error() {
    let channel = invoices_channel();
    let mut consumer = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "a")).unwrap();

    let delivery = consumer.try_next().unwrap();
    delivery.ack().unwrap();

    let double_ack = delivery.ack().unwrap_err();
    assert!(matches!(
        double_ack,
        AckError::UnknownDeliveryTag { tag, .. } if tag == delivery.delivery_tag
    ));
    let nack_after_ack = delivery.nack(true).unwrap_err();
    assert!(matches!(
        nack_after_ack,
        AckError::UnknownDeliveryTag { .. }
    ));
}

#[test]
fn test_nack_with_requeue_redelivers_with_flag() {
    let channel = invoices_channel();
    let mut consumer = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "a")).unwrap();

    let first = consumer.try_next().unwrap();
    assert!(!first.redelivered);
    first.nack(true).unwrap();

    let second = consumer.try_next().expect("nacked message not redelivered");
    assert_eq!(second.message.payload, "a");
    assert!(second.redelivered);
    assert_ne!(second.delivery_tag, first.delivery_tag);
}

#[test]
fn test_nack_without_requeue_dead_letters() {
    let channel = invoices_channel();
    let mut consumer = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "poison")).unwrap();

    consumer.try_next().unwrap().nack(false).unwrap();

    let dead_letter = format!("invoices{DEAD_LETTER_SUFFIX}");
    assert_eq!(channel.queue_depth("invoices"), Some((0, 0)));
    assert_eq!(channel.queue_depth(&dead_letter), Some((1, 0)));

    let mut dead_consumer = channel.consume(&dead_letter).unwrap();
    let delivery = dead_consumer.try_next().unwrap();
    assert_eq!(delivery.message.payload, "poison");
    assert_eq!(delivery.message.routing_key, "invoice_created");
}

#[test]
fn test_closed_consumer_requeues_unsettled_deliveries() {
    let channel = invoices_channel();
    let mut first = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "a")).unwrap();

    let delivery = first.try_next().unwrap();
    assert!(!delivery.redelivered);
    first.close();

    let mut second = channel.consume("invoices").unwrap();
    let redelivery = second.try_next().expect("orphaned delivery not requeued");
    assert_eq!(redelivery.message.payload, "a");
    assert!(redelivery.redelivered);
}

#[test]
fn test_dropped_consumer_is_pruned_on_dispatch() {
    let channel = invoices_channel();
    let consumer = channel.consume("invoices").unwrap();
    drop(consumer);

    // The send fails, the dead consumer is pruned, the message stays ready.
    channel.publish(message("invoices", "a")).unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((1, 0)));

    let mut replacement = channel.consume("invoices").unwrap();
    let delivery = replacement.try_next().unwrap();
    assert_eq!(delivery.message.payload, "a");
    assert!(!delivery.redelivered);
}

#[test]
fn test_two_consumers_never_share_a_delivery() {
    let channel = invoices_channel();
    let mut first = channel.consume("invoices").unwrap();
    let mut second = channel.consume("invoices").unwrap();
    channel.publish(message("invoices", "a")).unwrap();

    let claimed = first.try_next().is_some() as usize + second.try_next().is_some() as usize;
    assert_eq!(claimed, 1);
}

#[test]
fn test_durable_queue_recovers_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap().to_string();

    {
        let store = QueueStore::open(&path).unwrap();
        let channel = BrokerChannel::new(Broker::with_store(store));
        channel.declare_queue("invoices", true).unwrap();
        channel.publish(message("invoices", "survives")).unwrap();
    }

    let store = QueueStore::open(&path).unwrap();
    let channel = BrokerChannel::new(Broker::with_store(store));
    channel.declare_queue("invoices", true).unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((1, 0)));

    let mut consumer = channel.consume("invoices").unwrap();
    let delivery = consumer.try_next().expect("stored message not recovered");
    assert_eq!(delivery.message.payload, "survives");
    assert!(delivery.redelivered);
}

#[test]
fn test_ack_removes_message_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap().to_string();

    {
        let store = QueueStore::open(&path).unwrap();
        let channel = BrokerChannel::new(Broker::with_store(store));
        channel.declare_queue("invoices", true).unwrap();
        channel.publish(message("invoices", "done")).unwrap();
        let mut consumer = channel.consume("invoices").unwrap();
        consumer.try_next().unwrap().ack().unwrap();
    }

    let store = QueueStore::open(&path).unwrap();
    let channel = BrokerChannel::new(Broker::with_store(store));
    channel.declare_queue("invoices", true).unwrap();
    assert_eq!(channel.queue_depth("invoices"), Some((0, 0)));
}
