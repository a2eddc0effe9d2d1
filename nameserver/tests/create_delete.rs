//! Exercises the NM operation handlers end to end against a minimal mock
//! storage server, the way the teacher's shadow-fs tests stand up a fixture
//! in place of a real backing store.

use std::net::SocketAddr;

use dfs_common::{ErrorCode, MessageKind, Record};
use nameserver::ops;
use nameserver::state::NameServer;
use tokio::net::TcpListener;

/// A storage server stand-in that acknowledges every request with success,
/// just enough for NM-forwarding ops (`create`, `delete`) to proceed.
async fn spawn_mock_ss() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            tokio::spawn(async move {
                loop {
                    let request = match dfs_common::read_record(&mut socket).await {
                        Ok(r) => r,
                        Err(_) => return,
                    };
                    let response = Record::ok_response(format!("ok: {:?}", request.kind));
                    if dfs_common::write_record(&mut socket, &response).await.is_err() {
                        return;
                    }
                }
            });
        }
    });
    addr
}

async fn server_with_one_ss() -> (std::sync::Arc<NameServer>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let server = NameServer::new(dir.path().join("nm.checkpoint"), false).await.unwrap();
    let ss_addr = spawn_mock_ss().await;
    {
        let mut guard = server.state.lock().await;
        guard.registry.register(ss_addr.ip().to_string(), ss_addr.port(), ss_addr.port());
    }
    (server, dir)
}

#[tokio::test]
async fn create_then_view_then_delete() {
    let (server, _dir) = server_with_one_ss().await;

    let mut create = Record::new(MessageKind::Create);
    create.username = "alice".into();
    create.filename = "notes.txt".into();
    let response = ops::create(&server, &create).await;
    assert!(response.error_code.is_success());

    let mut view = Record::new(MessageKind::View);
    view.username = "alice".into();
    let response = ops::view(&server, &view).await;
    assert!(response.data_as_str().unwrap().contains("notes.txt"));

    let mut view_stranger = Record::new(MessageKind::View);
    view_stranger.username = "mallory".into();
    let response = ops::view(&server, &view_stranger).await;
    assert!(!response.data_as_str().unwrap().contains("notes.txt"));

    let mut delete = Record::new(MessageKind::Delete);
    delete.username = "alice".into();
    delete.filename = "notes.txt".into();
    let response = ops::delete(&server, &delete).await;
    assert!(response.error_code.is_success());

    let mut view_after = Record::new(MessageKind::View);
    view_after.username = "alice".into();
    view_after.flags = 1; // show-all
    let response = ops::view(&server, &view_after).await;
    assert!(!response.data_as_str().unwrap().contains("notes.txt"));
}

#[tokio::test]
async fn create_twice_is_rejected() {
    let (server, _dir) = server_with_one_ss().await;

    let mut create = Record::new(MessageKind::Create);
    create.username = "alice".into();
    create.filename = "dup.txt".into();
    assert!(ops::create(&server, &create).await.error_code.is_success());

    let mut again = Record::new(MessageKind::Create);
    again.username = "bob".into();
    again.filename = "dup.txt".into();
    let response = ops::create(&server, &again).await;
    assert_eq!(response.error_code, ErrorCode::FileExists);
}

#[tokio::test]
async fn only_the_owner_may_delete() {
    let (server, _dir) = server_with_one_ss().await;

    let mut create = Record::new(MessageKind::Create);
    create.username = "alice".into();
    create.filename = "secret.txt".into();
    ops::create(&server, &create).await;

    let mut delete = Record::new(MessageKind::Delete);
    delete.username = "mallory".into();
    delete.filename = "secret.txt".into();
    let response = ops::delete(&server, &delete).await;
    assert_eq!(response.error_code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn add_access_then_locate_grants_read() {
    let (server, _dir) = server_with_one_ss().await;

    let mut create = Record::new(MessageKind::Create);
    create.username = "alice".into();
    create.filename = "shared.txt".into();
    ops::create(&server, &create).await;

    let mut locate_before = Record::new(MessageKind::Read);
    locate_before.username = "bob".into();
    locate_before.filename = "shared.txt".into();
    let response = ops::locate(&server, &locate_before, false).await;
    assert_eq!(response.error_code, ErrorCode::Unauthorized);

    let mut grant = Record::new(MessageKind::AddAccess);
    grant.username = "alice".into();
    grant.filename = "shared.txt".into();
    grant.target_user = "bob".into();
    grant.flags = dfs_common::AccessRight::READ.bits() as i32;
    assert!(ops::add_access(&server, &grant).await.error_code.is_success());

    let mut locate_after = Record::new(MessageKind::Read);
    locate_after.username = "bob".into();
    locate_after.filename = "shared.txt".into();
    let response = ops::locate(&server, &locate_after, false).await;
    assert!(response.error_code.is_success());
    assert!(!response.ss_ip.is_empty());
}

#[tokio::test]
async fn exec_is_refused_unless_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let server = NameServer::new(dir.path().join("nm.checkpoint"), false).await.unwrap();

    let mut exec = Record::new(MessageKind::Exec);
    exec.username = "alice".into();
    exec.filename = "script.txt".into();
    let response = ops::exec(&server, &exec).await;
    assert_eq!(response.error_code, ErrorCode::Unauthorized);
}
