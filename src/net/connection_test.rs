use super::*;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

const SNAPSHOT_AB: &str = r#"{"type":"state","payload":{"a":{"username":"a","color":1,"mood":"happy","state":{"x":0,"y":0,"vx":0,"vy":0,"spd":0,"acc":0,"ang":0}},"b":{"username":"b","color":2,"mood":"sad","state":{"x":50,"y":0,"vx":0,"vy":0,"spd":0,"acc":0,"ang":0}}}}"#;

struct ServerReport {
    uri: String,
    received: Vec<serde_json::Value>,
    /// Whether the client answered our close frame.
    close_acknowledged: bool,
}

/// One-shot presence server: records the handshake URI, pushes the given
/// messages, collects client text until `quiet` passes without traffic, then
/// closes.
async fn spawn_server(push: Vec<String>, quiet: Duration) -> (u16, oneshot::Receiver<ServerReport>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let (report_tx, report_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let (uri_tx, uri_rx) = oneshot::channel::<String>();
        let mut ws = tokio_tungstenite::accept_hdr_async(tcp, move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let _ = uri_tx.send(req.uri().to_string());
            Ok(resp)
        })
        .await
        .expect("handshake");
        let uri = uri_rx.await.unwrap_or_default();

        for text in push {
            ws.send(Message::text(text)).await.expect("push");
        }

        let mut received = Vec::new();
        while let Ok(Some(Ok(message))) = timeout(quiet, ws.next()).await {
            if let Message::Text(text) = message {
                received.push(serde_json::from_str(text.as_str()).expect("client sent json"));
            }
        }

        let mut close_acknowledged = false;
        if ws.close(None).await.is_ok() {
            while let Ok(Some(Ok(message))) = timeout(quiet, ws.next()).await {
                if matches!(message, Message::Close(_)) {
                    close_acknowledged = true;
                }
            }
        }
        let _ = report_tx.send(ServerReport { uri, received, close_acknowledged });
    });

    (port, report_rx)
}

fn config_for(port: u16, name: &str) -> ClientConfig {
    let mut config = ClientConfig::new(name);
    config.host = "127.0.0.1".into();
    config.port = port;
    config
}

#[test]
fn status_labels_match_ready_states() {
    let labels: Vec<String> = [
        ConnectionStatus::Connecting,
        ConnectionStatus::Open,
        ConnectionStatus::Closing,
        ConnectionStatus::Closed,
        ConnectionStatus::Uninstantiated,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(labels, vec!["Connecting", "Open", "Closing", "Closed", "Uninstantiated"]);
    assert_eq!(ConnectionStatus::default(), ConnectionStatus::Uninstantiated);
}

#[test]
fn connection_queue_accepts_until_receiver_dropped() {
    let (connection, mut rx) = Connection::new("ws://localhost:9000/ws?username=a".into());
    assert_eq!(connection.url(), "ws://localhost:9000/ws?username=a");
    assert!(connection.send("one".into()));
    assert_eq!(rx.try_recv().ok().as_deref(), Some("one"));

    drop(rx);
    assert!(!connection.send("two".into()));
}

#[tokio::test]
async fn run_rejects_invalid_config_before_connecting() {
    let (_tx, rx) = mpsc::channel(1);
    let mut renders = 0;
    let result = run(&ClientConfig::new(""), SelfIdentity::Id("a".into()), rx, |_| renders += 1).await;
    assert!(matches!(result, Err(ClientError::Config(ConfigError::EmptyDisplayName))));
    assert_eq!(renders, 0);
}

#[tokio::test]
async fn run_reports_connect_failure_as_closed() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let (_tx, rx) = mpsc::channel(1);
    let mut statuses = Vec::new();
    let result = run(&config_for(port, "a"), SelfIdentity::Id("a".into()), rx, |m| statuses.push(m.status)).await;

    assert!(matches!(result, Err(ClientError::WsConnect(_))));
    assert_eq!(statuses, vec![ConnectionStatus::Connecting, ConnectionStatus::Closed]);
}

#[tokio::test]
async fn burst_of_samples_sends_one_throttled_update() {
    let (port, report) = spawn_server(Vec::new(), Duration::from_millis(400)).await;
    let (tx, rx) = mpsc::channel(8);
    tx.send(LocalSample::new(10.0, 20.0, 0)).await.expect("queue sample");
    tx.send(LocalSample::new(12.0, 21.0, 50)).await.expect("queue sample");

    let result = timeout(
        Duration::from_secs(5),
        run(&config_for(port, "alice"), SelfIdentity::DisplayName("alice".into()), rx, |_| {}),
    )
    .await
    .expect("session should end when the server closes");
    assert!(result.is_ok());

    let report = report.await.expect("server report");
    assert_eq!(report.uri, "/ws?username=alice");
    assert!(report.close_acknowledged);
    assert_eq!(
        report.received,
        vec![json!({ "type": "update_position", "payload": { "x": 12, "y": 21, "delta": 100 } })]
    );
    drop(tx);
}

#[tokio::test]
async fn inbound_snapshots_render_and_disconnect_clears() {
    let push = vec![
        "garbage".to_owned(),
        r#"{"type":"state","payload":{"a":{"username":"a"}}}"#.to_owned(),
        SNAPSHOT_AB.to_owned(),
    ];
    let (port, report) = spawn_server(push, Duration::from_millis(100)).await;
    let (_tx, rx) = mpsc::channel(1);
    let mut renders = Vec::new();

    let result = timeout(
        Duration::from_secs(5),
        run(&config_for(port, "a"), SelfIdentity::Id("a".into()), rx, |m| renders.push(m.clone())),
    )
    .await
    .expect("session should end when the server closes");
    assert!(result.is_ok());
    assert!(report.await.expect("server report").close_acknowledged);

    let statuses: Vec<ConnectionStatus> = renders.iter().map(|m| m.status).collect();
    assert_eq!(
        statuses,
        vec![ConnectionStatus::Connecting, ConnectionStatus::Open, ConnectionStatus::Open, ConnectionStatus::Closed]
    );

    let snapshot_render = &renders[2];
    assert_eq!(snapshot_render.remotes.len(), 1);
    let b = &snapshot_render.remotes[0];
    assert_eq!(b.id, "b");
    assert!((b.distance.expect("distance") - 50.0).abs() < f64::EPSILON);
    assert_eq!(b.mood.as_deref(), Some("sad"));

    let last = renders.last().expect("final render");
    assert!(last.local.is_none());
    assert!(last.remotes.is_empty());
}

#[tokio::test]
async fn closing_local_input_closes_the_connection() {
    let (port, report) = spawn_server(Vec::new(), Duration::from_secs(2)).await;
    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    let mut statuses = Vec::new();

    let result = timeout(
        Duration::from_secs(5),
        run(&config_for(port, "a"), SelfIdentity::Id("a".into()), rx, |m| statuses.push(m.status)),
    )
    .await
    .expect("session should end after local close");
    assert!(result.is_ok());
    let report = report.await.expect("server report");
    assert!(report.received.is_empty());

    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Open,
            ConnectionStatus::Closing,
            ConnectionStatus::Closed
        ]
    );
}

#[tokio::test]
async fn closing_local_input_sends_the_last_position_first() {
    let (port, report) = spawn_server(Vec::new(), Duration::from_secs(2)).await;
    let (tx, rx) = mpsc::channel(1);
    tx.send(LocalSample::new(10.0, 20.0, 0)).await.expect("queue sample");
    drop(tx);

    let result = timeout(
        Duration::from_secs(5),
        run(&config_for(port, "a"), SelfIdentity::Id("a".into()), rx, |_| {}),
    )
    .await
    .expect("session should end after local close");
    assert!(result.is_ok());

    let report = report.await.expect("server report");
    assert_eq!(
        report.received,
        vec![json!({ "type": "update_position", "payload": { "x": 10, "y": 20, "delta": 100 } })]
    );
}
