//! End-to-end tests over a real socket.

use std::time::Duration;

use tokio::net::TcpListener;

use servo_kv::{HttpServer, MemoryStore, ServoConfig, Shutdown};

#[tokio::test]
async fn test_serve_and_shut_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServoConfig::default(), MemoryStore::new());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::new();
    let url = format!("http://{addr}/greeting");

    let created = client
        .post(&url)
        .header("X-Servo-Client", "abc")
        .header("Content-Type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    assert_eq!(created.headers()["x-servo-client"], "abc");
    assert!(created.headers().contains_key("x-request-id"));

    let read = client
        .get(&url)
        .header("X-Servo-Client", "abc")
        .send()
        .await
        .unwrap();
    assert_eq!(read.status(), 200);
    assert_eq!(read.text().await.unwrap(), "hello");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_peer_address_reaches_access_filter() {
    let mut config = ServoConfig::default();
    config.access.allow_ipaddr = Some("10.255.255.1".into());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(HttpServer::new(config, MemoryStore::new()).run(listener, shutdown.subscribe()));

    let denied = reqwest::get(format!("http://{addr}/k")).await.unwrap();
    assert_eq!(denied.status(), 403);
    assert_eq!(denied.text().await.unwrap(), "Client Access Denied");

    shutdown.trigger();
    let _ = handle.await;
}
