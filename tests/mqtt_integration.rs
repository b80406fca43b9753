// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

use std::time::Duration;

use homeguard_lib::{MqttTransport, MqttTransportConfig, Session, SessionConfig, Transport};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind before clients connect
    sleep(Duration::from_millis(500)).await;
}

fn short_timeout() -> MqttTransportConfig {
    MqttTransportConfig::default().connection_timeout(Duration::from_secs(2))
}

// ============================================================================
// MqttTransport Tests
// ============================================================================

mod mqtt_transport {
    use super::*;

    #[tokio::test]
    async fn connect_publish_disconnect() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let transport = MqttTransport::with_config(short_timeout());
        let result = transport
            .connect(&format!("tcp://127.0.0.1:{port}"), "android_it000001")
            .await;
        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
        assert!(transport.is_connected());
        assert_eq!(transport.client_id().as_deref(), Some("android_it000001"));

        transport.subscribe("pos_iot/sensor").await.unwrap();
        transport.publish("pos_iot/command", b"ARM").await.unwrap();

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
        assert!(transport.client_id().is_none());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let transport = MqttTransport::with_config(short_timeout());
        let result = transport
            .connect(&format!("127.0.0.1:{port}"), "android_it000002")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn publish_without_connection_fails() {
        let transport = MqttTransport::new();

        let result = transport.publish("pos_iot/command", b"ARM").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unreachable_broker_fails() {
        let transport = MqttTransport::with_config(short_timeout());

        let result = transport.connect("tcp://127.0.0.1:1", "android_it000003").await;

        assert!(result.is_err());
        assert!(!transport.is_connected());
    }
}

// ============================================================================
// Overlapping Connect Tests
// ============================================================================

mod overlapping_connects {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Starts a bare TCP broker that delays its CONNACK and counts open sockets.
    async fn start_counting_broker(connack_delay: Duration) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("tcp://{}", listener.local_addr().unwrap());
        let open = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&open);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let open = Arc::clone(&counter);
                open.fetch_add(1, Ordering::SeqCst);

                tokio::spawn(async move {
                    let mut buf = [0u8; 512];
                    if matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {
                        sleep(connack_delay).await;
                        // CONNACK: no session present, accepted
                        let _ = socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await;
                        while matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {}
                    }
                    open.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        (address, open)
    }

    #[tokio::test]
    async fn disconnect_closes_every_connection() {
        let (address, open) = start_counting_broker(Duration::from_millis(200)).await;
        let transport = MqttTransport::with_config(short_timeout());

        let (first, second) = tokio::join!(
            transport.connect(&address, "android_overlap1"),
            transport.connect(&address, "android_overlap2"),
        );
        assert!(first.is_ok(), "{:?}", first.err());
        assert!(second.is_ok(), "{:?}", second.err());
        assert!(transport.is_connected());

        transport.disconnect().await.unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(open.load(Ordering::SeqCst), 0);
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod session {
    use super::*;

    #[tokio::test]
    async fn start_reaches_connected() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let config = SessionConfig::default()
            .with_broker_address(format!("tcp://127.0.0.1:{port}"))
            .with_transport_config(short_timeout());
        let (session, initial) = Session::start(config);
        initial.await.unwrap();

        let state = session.current();
        assert!(state.connection_status().is_connected(), "{state:?}");
        assert_eq!(state.status_text(), "System online (MQTT)");

        session.dispatcher().toggle_light().await.unwrap();
        assert!(session.current().light_on());

        session.shutdown().await;
        assert!(!session.current().connection_status().is_connected());
    }

    #[tokio::test]
    async fn unreachable_broker_reports_failure() {
        let config = SessionConfig::default()
            .with_broker_address("tcp://127.0.0.1:1")
            .with_transport_config(short_timeout());
        let (session, initial) = Session::start(config);
        initial.await.unwrap();

        let state = session.current();
        assert!(state.connection_status().is_failed());
        assert!(state.status_text().starts_with("Connection failed: "));
    }

    #[tokio::test]
    async fn commands_while_disconnected_are_dropped() {
        let config = SessionConfig::default()
            .with_broker_address("tcp://127.0.0.1:1")
            .with_transport_config(short_timeout());
        let (session, initial) = Session::start(config);
        initial.await.unwrap();

        session.dispatcher().toggle_arm().await.unwrap();
        session.dispatcher().toggle_light().await.unwrap();

        let state = session.current();
        assert!(!state.armed());
        assert!(state.light_on());
    }

    #[tokio::test]
    async fn broker_change_reconnects() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let config = SessionConfig::default()
            .with_broker_address("tcp://127.0.0.1:1")
            .with_transport_config(short_timeout());
        let (session, initial) = Session::start(config);
        initial.await.unwrap();
        assert!(session.current().connection_status().is_failed());

        session
            .dispatcher()
            .set_broker_address(format!("tcp://127.0.0.1:{port}"))
            .await
            .unwrap();

        let state = session.current();
        assert!(state.connection_status().is_connected(), "{state:?}");
        assert_eq!(state.broker_address(), format!("tcp://127.0.0.1:{port}"));
    }
}
