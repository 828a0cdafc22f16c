//! End-to-end tests against a local HTTP server

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{NetworkError, NotificationError};
use crate::{
    Comparison, HttpPageSource, Notifier, PageSource, PriceAlert, PriceWatcher,
    TerminationReason, WatchConfig, WatchState,
};

const COURSE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <title>Ingenieria inversa y cracking de software preventivo | Udemy</title>
  <meta property="og:type" content="udemy_com:course">
  <meta property="udemy_com:price" content="15,50">
</head>
<body><h1>Curso</h1></body>
</html>"#;

/// Serve every connection with the same status line and body
async fn serve(status: &'static str, body: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            counter.fetch_add(1, Ordering::SeqCst);

            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 {}\r\n\
                 Content-Type: text/html; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, hits)
}

/// An address nothing listens on
async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<PriceAlert>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotificationError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

fn config_for(addr: SocketAddr) -> WatchConfig {
    WatchConfig {
        url: format!("http://{}/course/", addr),
        threshold: 20.0,
        comparison: Comparison::AtOrBelow,
        request_timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn fetches_page_body() {
    let (addr, hits) = serve("200 OK", COURSE_PAGE).await;
    let config = config_for(addr);
    let source = HttpPageSource::from_config(&config).unwrap();

    let html = tokio_test::assert_ok!(source.fetch_page().await);
    assert!(html.contains("udemy_com:price"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(source.location(), config.url);
}

#[tokio::test]
async fn non_success_status_is_a_network_error() {
    let (addr, _) = serve("503 Service Unavailable", "down for maintenance").await;
    let source = HttpPageSource::from_config(&config_for(addr)).unwrap();

    match source.fetch_page().await {
        Err(NetworkError::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let addr = closed_port().await;
    let source = HttpPageSource::from_config(&config_for(addr)).unwrap();

    assert!(matches!(source.fetch_page().await, Err(NetworkError::Request(_))));
}

#[tokio::test]
async fn cheap_course_triggers_alert() {
    let (addr, _) = serve("200 OK", COURSE_PAGE).await;
    let config = config_for(addr);
    let source = HttpPageSource::from_config(&config).unwrap();
    let watcher = PriceWatcher::new(&config, source, RecordingNotifier::default()).unwrap();

    let reason = watcher.run(std::future::pending()).await;
    assert_eq!(reason, TerminationReason::Notified { price: 15.5 });

    let alerts = watcher_alerts(&watcher);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].price, 15.5);
    assert_eq!(alerts[0].title, "ALERT PRICE!");
    assert!(alerts[0].message.contains("15.5"));
    assert!(alerts[0].message.ends_with("-03:00"));
    assert_eq!(alerts[0].timeout, Duration::from_secs(600));
}

#[tokio::test]
async fn unreachable_page_keeps_polling() {
    let addr = closed_port().await;
    let config = config_for(addr);
    let source = HttpPageSource::from_config(&config).unwrap();
    let watcher = PriceWatcher::new(&config, source, RecordingNotifier::default()).unwrap();

    assert_eq!(watcher.poll_once().await, WatchState::Polling);
    assert!(watcher_alerts(&watcher).is_empty());
}

#[tokio::test]
async fn page_without_price_stops_the_run() {
    let (addr, hits) = serve("200 OK", "<html><head><title>Moved</title></head></html>").await;
    let config = config_for(addr);
    let source = HttpPageSource::from_config(&config).unwrap();
    let watcher = PriceWatcher::new(&config, source, RecordingNotifier::default()).unwrap();

    let reason = watcher.run(std::future::pending()).await;
    assert_eq!(reason, TerminationReason::ExtractionFailed);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(watcher_alerts(&watcher).is_empty());
}

fn watcher_alerts(watcher: &PriceWatcher<HttpPageSource, RecordingNotifier>) -> Vec<PriceAlert> {
    watcher.notifier().alerts.lock().unwrap().clone()
}
