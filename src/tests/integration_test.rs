use std::time::Duration;

use serde_json::Value;

use crate::broker::engine::{Broker, BrokerChannel};
use crate::gateway::{Gateway, SERVICE_A, SERVICE_B};
use crate::invoice::record::Invoice;
use crate::invoice::workflow::{INVOICE_CREATED, INVOICE_QUEUE, InvoiceWorkflow, process_invoice};
use crate::queue::producer::QueueProducer;
use crate::rpc::router::RpcRouter;
use crate::transport::client::TransportClient;
use crate::transport::server::RpcServer;

async fn start_hello_backend(addr: &'static str, pattern: &'static str, text: &'static str, delay_ms: u64) {
    let mut server = RpcServer::new();
    server.register(pattern, move |_payload| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok::<_, String>(Value::String(text.to_string()))
    });
    tokio::spawn(async move {
        let _ = server.serve(addr).await;
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
}

async fn wait_for_depth(channel: &BrokerChannel, queue: &str, want: (usize, usize)) {
    for _ in 0..200 {
        if channel.queue_depth(queue) == Some(want) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "queue {queue} never reached depth {want:?}, last seen {:?}",
        channel.queue_depth(queue)
    );
}

/// Both messaging patterns, end to end: the gateway fans the greeting out to
/// two backends with skewed latency, then generates an invoice which a
/// worker consumes, processes and acknowledges.
#[tokio::test]
async fn integration_gateway_end_to_end() {
    start_hello_backend("127.0.0.1:49441", "helloA", "Hello from service A", 50).await;
    start_hello_backend("127.0.0.1:49442", "helloB", "Hello from service B", 5).await;

    let channel = BrokerChannel::new(Broker::new());
    channel.declare_queue(INVOICE_QUEUE, true).unwrap();
    let consumer = channel.consume(INVOICE_QUEUE).unwrap();
    tokio::spawn(consumer.run(|message, redelivered| {
        process_invoice(message, redelivered, Duration::from_millis(50))
    }));

    let mut router = RpcRouter::new();
    router.register(
        SERVICE_A,
        TransportClient::new("127.0.0.1:49441", Duration::from_secs(2)),
    );
    router.register(
        SERVICE_B,
        TransportClient::new("127.0.0.1:49442", Duration::from_secs(2)),
    );
    let workflow = InvoiceWorkflow::new(QueueProducer::new(channel.clone()));
    let gateway = Gateway::new(router, workflow);

    let greeting = gateway.hello().await.unwrap();
    assert_eq!(greeting, "Hello from service A <br/> Hello from service B");

    let receipt = gateway.generate_invoice("c42").unwrap();
    assert!(receipt.invoice_id.starts_with("INV-"));

    // The worker eventually processes and acks the invoice.
    wait_for_depth(&channel, INVOICE_QUEUE, (0, 0)).await;
}

/// The concrete delivery scenario: a fixed invoice is published, exactly one
/// consumer receives the delivery, the other never sees its tag, and after
/// the ack the queue is drained.
#[tokio::test]
async fn integration_single_delivery_per_tag() {
    let channel = BrokerChannel::new(Broker::new());
    channel.declare_queue(INVOICE_QUEUE, true).unwrap();
    let producer = QueueProducer::new(channel.clone());

    let mut first = channel.consume(INVOICE_QUEUE).unwrap();
    let mut second = channel.consume(INVOICE_QUEUE).unwrap();

    let invoice = Invoice {
        invoice_id: "INV-1000".to_string(),
        client_id: "c42".to_string(),
        amount: 500,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    producer
        .publish(INVOICE_QUEUE, INVOICE_CREATED, &invoice)
        .unwrap();

    let deliveries: Vec<_> = [first.try_next(), second.try_next()]
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(deliveries.len(), 1, "one delivery tag went to two consumers");

    let delivery = &deliveries[0];
    let decoded: Invoice = serde_json::from_str(&delivery.message.payload).unwrap();
    assert_eq!(decoded, invoice);

    delivery.ack().unwrap();
    assert_eq!(channel.queue_depth(INVOICE_QUEUE), Some((0, 0)));
}

/// At-least-once: a consumer that goes away after delivery but before ack
/// causes redelivery to the surviving consumer, never a silent drop.
#[tokio::test]
async fn integration_crashed_consumer_triggers_redelivery() {
    let channel = BrokerChannel::new(Broker::new());
    channel.declare_queue(INVOICE_QUEUE, true).unwrap();
    let producer = QueueProducer::new(channel.clone());

    let mut doomed = channel.consume(INVOICE_QUEUE).unwrap();
    producer
        .publish(INVOICE_QUEUE, INVOICE_CREATED, &Invoice::generate("c7"))
        .unwrap();

    let delivery = doomed.try_next().expect("first consumer got nothing");
    assert!(!delivery.redelivered);
    doomed.close();

    let mut survivor = channel.consume(INVOICE_QUEUE).unwrap();
    let redelivery = survivor
        .try_next()
        .expect("message was dropped instead of redelivered");
    assert!(redelivery.redelivered);
    assert_eq!(redelivery.message.payload, delivery.message.payload);

    redelivery.ack().unwrap();
    assert_eq!(channel.queue_depth(INVOICE_QUEUE), Some((0, 0)));
}
