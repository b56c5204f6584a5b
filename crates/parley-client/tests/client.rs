//! The client library against a real server, over both transports.

use std::time::Duration;

use parley::prelude::*;
use parley_client::{parse_command, ClientConnection};

const STEP: Duration = Duration::from_secs(2);

async fn start<T>() -> String
where
    T: Transport<Error = TransportError>,
    T::Connection: Connection<Error = TransportError>,
{
    let server = ParleyServerBuilder::new()
        .bind("127.0.0.1:0")
        .build::<T>()
        .await
        .expect("server should bind");
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

async fn next(conn: &mut ClientConnection) -> Option<ServerMessage> {
    tokio::time::timeout(STEP, conn.recv())
        .await
        .expect("frame in time")
        .expect("recv should succeed")
}

/// Types `line` as a console user would and returns the server's answer.
async fn type_line(
    conn: &mut ClientConnection,
    line: &str,
    authenticated: bool,
) -> ServerMessage {
    let message = parse_command(line, authenticated).expect("valid command");
    conn.send(&message).await.unwrap();
    next(conn).await.expect("server should answer")
}

async fn login(conn: &mut ClientConnection, name: &str) {
    assert!(matches!(next(conn).await, Some(ServerMessage::Prompt { .. })));
    let reply = type_line(conn, name, false).await;
    assert_eq!(reply.text(), format!("Name set: {name}"));
}

#[tokio::test]
async fn test_client_tcp_chat_session() {
    let addr = start::<TcpTransport>().await;
    let mut ann = ClientConnection::connect_tcp(&addr).await.unwrap();
    let mut bob = ClientConnection::connect_tcp(&addr).await.unwrap();
    login(&mut ann, "ann").await;
    login(&mut bob, "bob").await;

    let reply = type_line(&mut ann, "send bob how are you", true).await;
    assert_eq!(reply, ServerMessage::Reply { text: "Message sent".into() });

    let mail = next(&mut bob).await.unwrap();
    assert_eq!(
        mail,
        ServerMessage::Mail {
            text: "User ann tells you: \"how are you\"".into()
        }
    );

    let list = type_line(&mut bob, "ls", true).await;
    assert_eq!(list.text(), "Online users:   ann,  bob");
}

#[tokio::test]
async fn test_client_ws_chat_session() {
    let addr = start::<WebSocketTransport>().await;
    let mut ann = ClientConnection::connect_ws(&addr).await.unwrap();
    let mut bob = ClientConnection::connect_ws(&format!("ws://{addr}"))
        .await
        .unwrap();
    login(&mut ann, "ann").await;
    login(&mut bob, "bob").await;

    let reply = type_line(&mut bob, "send ann hi", true).await;
    assert_eq!(reply.text(), "Message sent");
    assert_eq!(
        next(&mut ann).await.unwrap().text(),
        "User bob tells you: \"hi\""
    );
}

#[tokio::test]
async fn test_client_sees_close_after_disconnect() {
    let addr = start::<TcpTransport>().await;
    let mut conn = ClientConnection::connect_tcp(&addr).await.unwrap();
    login(&mut conn, "ann").await;

    let message = parse_command("disconnect", true).unwrap();
    conn.send(&message).await.unwrap();

    assert_eq!(next(&mut conn).await, None);
}

#[tokio::test]
async fn test_client_split_halves_work_independently() {
    let addr = start::<TcpTransport>().await;
    let mut ann = ClientConnection::connect_tcp(&addr).await.unwrap();
    login(&mut ann, "ann").await;

    let (mut sender, mut receiver) = ann.split();
    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        while seen.len() < 2 {
            match receiver.recv().await.unwrap() {
                Some(frame) => seen.push(frame),
                None => break,
            }
        }
        seen
    });

    sender
        .send(&parse_command("broad hello", true).unwrap())
        .await
        .unwrap();

    let seen = tokio::time::timeout(STEP, reader).await.unwrap().unwrap();
    assert!(seen.contains(&ServerMessage::Reply {
        text: "Broadcast sent".into()
    }));
    assert!(seen.contains(&ServerMessage::Mail {
        text: "User ann broadcast to everybody: \"hello\"".into()
    }));
}
