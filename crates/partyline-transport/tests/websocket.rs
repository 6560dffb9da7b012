//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a `tokio-tungstenite` client to
//! check that frames, query strings and close state flow correctly.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;

    use partyline_transport::{
        Connection, Handshake, Transport, TransportError, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(url: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on an OS-assigned port and returns the transport and its address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    /// Accepts the next socket and finishes its upgrade.
    async fn upgrade_next(
        transport: &mut WebSocketTransport,
    ) -> partyline_transport::WebSocketConnection {
        transport
            .accept()
            .await
            .expect("should accept")
            .complete()
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move {
            upgrade_next(&mut transport).await
        });

        let mut client_ws = connect_client(&format!("ws://{addr}")).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);
        assert!(server_conn.is_open());
        assert_eq!(server_conn.query(), None);

        // JSON payloads go out as text frames.
        server_conn
            .send(br#"{"type":"hello"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"hello"}"#);

        client_ws
            .send(Message::text(r#"{"type":"chat"}"#.to_string()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"type":"chat"}"#);

        server_conn.close().await.expect("close should succeed");
        assert!(!server_conn.is_open());
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            upgrade_next(&mut transport).await
        });
        let mut client_ws = connect_client(&format!("ws://{addr}")).await;
        let server_conn = server_handle.await.unwrap();

        server_conn.send(&[0xff, 0x00, 0xfe]).await.unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00, 0xfe]);
    }

    #[tokio::test]
    async fn test_websocket_captures_query_string() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            upgrade_next(&mut transport).await
        });

        let _client_ws = connect_client(&format!(
            "ws://{addr}/?partyCode=ABCD&playerName=Ann"
        ))
        .await;
        let server_conn = server_handle.await.unwrap();

        assert_eq!(
            server_conn.query(),
            Some("partyCode=ABCD&playerName=Ann")
        );
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            upgrade_next(&mut transport).await
        });

        let mut client_ws = connect_client(&format!("ws://{addr}")).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
        assert!(!server_conn.is_open());
        assert!(server_conn.send(b"late").await.is_err());
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_a_silent_peer() {
        let (mut transport, addr) = bind_any().await;

        // Connects over TCP and never sends the upgrade request.
        let _idle = tokio::net::TcpStream::connect(addr.as_str()).await.unwrap();
        let idle_pending = transport.accept().await.expect("should accept");

        let client = tokio::spawn({
            let addr = addr.clone();
            async move { connect_client(&format!("ws://{addr}/?playerName=Ann")).await }
        });
        let pending = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must not block behind the idle peer")
            .expect("should accept");
        let conn = pending.complete().await.expect("handshake should succeed");

        assert_ne!(conn.id(), idle_pending.id());
        assert_eq!(conn.query(), Some("playerName=Ann"));
        let _client_ws = client.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_times_out_for_silent_peer() {
        let (transport, addr) = bind_any().await;
        let mut transport =
            transport.with_handshake_timeout(Duration::from_millis(50));

        let _idle = tokio::net::TcpStream::connect(addr.as_str()).await.unwrap();
        let pending = transport.accept().await.expect("should accept");

        let err = pending.complete().await.expect_err("peer never upgrades");
        assert!(matches!(err, TransportError::HandshakeTimeout(_)));
    }
}
