use std::time::Duration;

use serde_json::Value;
use tracing::{error, info};

use relayq::broker::{Broker, BrokerChannel};
use relayq::config::load_config;
use relayq::gateway::{Gateway, SERVICE_A, SERVICE_B};
use relayq::invoice::{InvoiceWorkflow, process_invoice};
use relayq::persistence::QueueStore;
use relayq::queue::QueueProducer;
use relayq::rpc::RpcRouter;
use relayq::transport::{RpcServer, TransportClient};
use relayq::utils::logging;

#[tokio::main]
async fn main() {
    let config = load_config().expect("Failed to load configuration");
    logging::init("info");

    // Hello backends, the original service-a / service-b.
    let mut server_a = RpcServer::new();
    server_a.register("helloA", |_payload| async {
        Ok::<_, String>(Value::String("Hello from service A".to_string()))
    });
    let addr_a = config.gateway.service_a_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = server_a.serve(&addr_a).await {
            error!(error = %e, "service A stopped");
        }
    });

    let mut server_b = RpcServer::new();
    server_b.register("helloB", |_payload| async {
        Ok::<_, String>(Value::String("Hello from service B".to_string()))
    });
    let addr_b = config.gateway.service_b_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = server_b.serve(&addr_b).await {
            error!(error = %e, "service B stopped");
        }
    });

    // Broker, durable invoice queue, and the consuming worker.
    let broker = match &config.broker.data_dir {
        Some(dir) => {
            let store = QueueStore::open(dir).expect("Failed to open queue store");
            Broker::with_store(store)
        }
        None => Broker::new(),
    };
    let channel = BrokerChannel::new(broker);
    channel
        .declare_queue(&config.broker.queue, true)
        .expect("Failed to declare queue");
    let consumer = channel
        .consume(&config.broker.queue)
        .expect("Failed to attach consumer");
    info!(queue = %config.broker.queue, "worker listening on durable queue");

    let max_delay = Duration::from_millis(config.broker.max_processing_delay_ms);
    tokio::spawn(consumer.run(move |message, redelivered| {
        process_invoice(message, redelivered, max_delay)
    }));

    // Gateway wiring: one transport client per backend, mapped by name.
    let timeout = Duration::from_millis(config.gateway.request_timeout_ms);
    let mut router = RpcRouter::new();
    router.register(
        SERVICE_A,
        TransportClient::new(config.gateway.service_a_addr.clone(), timeout),
    );
    router.register(
        SERVICE_B,
        TransportClient::new(config.gateway.service_b_addr.clone(), timeout),
    );
    let workflow = InvoiceWorkflow::new(QueueProducer::new(channel.clone()));
    let gateway = Gateway::new(router, workflow);

    // Exercise both messaging patterns once, then keep serving the queue.
    tokio::time::sleep(Duration::from_millis(200)).await;
    match gateway.hello().await {
        Ok(greeting) => info!(%greeting, "hello fan-out answered"),
        Err(e) => error!(error = %e, "hello fan-out failed"),
    }
    match gateway.generate_invoice("demo-client") {
        Ok(receipt) => info!(invoice_id = %receipt.invoice_id, message = %receipt.message, "invoice accepted"),
        Err(e) => error!(error = %e, "invoice generation failed"),
    }

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    info!("shutting down");
}
