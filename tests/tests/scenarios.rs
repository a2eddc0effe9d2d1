//! End-to-end scenarios driving a real name server, a real storage
//! server, and [`dfs_client::DfsClient`] (well, `client::DfsClient`) all
//! in-process, mirroring the teacher's `tests/shadow_fs` convention of
//! exercising the whole stack over real sockets rather than mocks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use client::DfsClient;
use dfs_common::AccessRight;
use nameserver::state::NameServer;
use storageserver::locks::LockTable;
use storageserver::storage::Storage;
use tokio::net::TcpListener;

struct Harness {
    _nm_dir: tempfile::TempDir,
    _ss_dir: tempfile::TempDir,
    nm_addr: SocketAddr,
}

async fn spawn_harness() -> Harness {
    let nm_dir = tempfile::tempdir().unwrap();
    let nm = NameServer::new(nm_dir.path().join("nameserver.checkpoint"), false).await.unwrap();
    let nm_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let nm_addr = nm_listener.local_addr().unwrap();
    tokio::spawn(nameserver::server::serve_forever(nm_listener, Arc::clone(&nm)));

    let ss_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(ss_dir.path().join("root"), ss_dir.path().join("shadow")));
    std::fs::create_dir_all(ss_dir.path().join("root")).unwrap();
    let locks = Arc::new(LockTable::new());

    let client_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client_bind = client_listener.local_addr().unwrap();
    let nm_listener_for_ss = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let nm_bind = nm_listener_for_ss.local_addr().unwrap();

    let ss_index = storageserver::registration::register(nm_addr, "127.0.0.1", nm_bind.port(), client_bind.port(), &storage)
        .await
        .expect("storage server should register with the name server");
    assert!(ss_index >= 0);

    tokio::spawn(storageserver::server::serve_client_port(client_listener, Arc::clone(&storage), Arc::clone(&locks)));
    tokio::spawn(storageserver::server::serve_nm_port(nm_listener_for_ss, storage));

    Harness { _nm_dir: nm_dir, _ss_dir: ss_dir, nm_addr }
}

#[tokio::test]
async fn create_write_split_read_and_view() {
    let harness = spawn_harness().await;
    let dfs = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();

    dfs.create("letters.txt").await.unwrap();
    assert!(dfs.view(true, false).await.unwrap().contains("letters.txt"));

    let mut session = dfs.open_write_session("letters.txt", 0).await.unwrap();
    session.edit(0, "Hello world").await.unwrap();
    session.commit().await.unwrap();

    assert_eq!(dfs.read("letters.txt").await.unwrap(), b"Hello world");

    // Split the sentence by inserting a new one after "world".
    let mut session = dfs.open_write_session("letters.txt", 0).await.unwrap();
    session.edit(2, "there. How are you").await.unwrap();
    session.commit().await.unwrap();

    assert_eq!(
        String::from_utf8(dfs.read("letters.txt").await.unwrap()).unwrap(),
        "Hello world there. How are you"
    );
}

#[tokio::test]
async fn undo_restores_the_pre_write_content() {
    let harness = spawn_harness().await;
    let dfs = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    dfs.create("note.txt").await.unwrap();

    let mut session = dfs.open_write_session("note.txt", 0).await.unwrap();
    session.edit(0, "First draft.").await.unwrap();
    session.commit().await.unwrap();
    assert_eq!(dfs.read("note.txt").await.unwrap(), b"First draft.");

    dfs.undo("note.txt").await.unwrap();
    assert_eq!(dfs.read("note.txt").await.unwrap(), b"");
}

#[tokio::test]
async fn stream_tokenizes_on_whitespace() {
    let harness = spawn_harness().await;
    let dfs = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    dfs.create("poem.txt").await.unwrap();

    let mut session = dfs.open_write_session("poem.txt", 0).await.unwrap();
    session.edit(0, "roses are red violets").await.unwrap();
    session.commit().await.unwrap();

    let tokens = dfs.stream("poem.txt").await.unwrap();
    assert_eq!(tokens, vec!["roses", "are", "red", "violets"]);
}

#[tokio::test]
async fn delete_removes_the_file_from_view() {
    let harness = spawn_harness().await;
    let dfs = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    dfs.create("scratch.txt").await.unwrap();
    dfs.delete("scratch.txt").await.unwrap();
    assert!(!dfs.view(true, false).await.unwrap().contains("scratch.txt"));
}

#[tokio::test]
async fn access_control_gates_reads_from_other_users() {
    let harness = spawn_harness().await;
    let owner = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    let other = DfsClient::connect(harness.nm_addr, "bob").await.unwrap();

    owner.create("shared.txt").await.unwrap();
    assert!(other.read("shared.txt").await.is_err());

    owner.add_access("shared.txt", "bob", AccessRight::READ).await.unwrap();
    assert_eq!(other.read("shared.txt").await.unwrap(), b"");

    owner.rem_access("shared.txt", "bob").await.unwrap();
    assert!(other.read("shared.txt").await.is_err());
}

#[tokio::test]
async fn read_only_grantee_may_stream_and_undo_but_not_write() {
    let harness = spawn_harness().await;
    let owner = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    let reader = DfsClient::connect(harness.nm_addr, "bob").await.unwrap();

    owner.create("readonly.txt").await.unwrap();
    let mut session = owner.open_write_session("readonly.txt", 0).await.unwrap();
    session.edit(0, "one two three").await.unwrap();
    session.commit().await.unwrap();

    owner.add_access("readonly.txt", "bob", AccessRight::READ).await.unwrap();

    // READ rights are enough for STREAM and UNDO (spec §4.3: "check R for
    // read/stream/undo, W for write"), even though bob never gets WRITE.
    assert_eq!(reader.stream("readonly.txt").await.unwrap(), vec!["one", "two", "three"]);
    assert!(reader.open_write_session("readonly.txt", 0).await.is_err());
    reader.undo("readonly.txt").await.unwrap();
}

#[tokio::test]
async fn list_users_reports_connected_clients() {
    let harness = spawn_harness().await;
    let _alice = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    let _bob = DfsClient::connect(harness.nm_addr, "bob").await.unwrap();

    let listing = _alice.list_users().await.unwrap();
    assert!(listing.contains("alice"));
    assert!(listing.contains("bob"));
}

#[tokio::test]
async fn second_writer_is_locked_out_until_the_first_commits() {
    let harness = spawn_harness().await;
    let dfs = DfsClient::connect(harness.nm_addr, "alice").await.unwrap();
    dfs.create("contended.txt").await.unwrap();

    let mut first = dfs.open_write_session("contended.txt", 0).await.unwrap();

    let second_attempt = dfs.open_write_session("contended.txt", 0).await;
    assert!(second_attempt.is_err());

    first.edit(0, "done").await.unwrap();
    first.commit().await.unwrap();

    // Once released, a fresh session on the same sentence succeeds.
    tokio::time::sleep(Duration::from_millis(10)).await;
    dfs.open_write_session("contended.txt", 0).await.unwrap().commit().await.unwrap();
}
