//! NM operation handlers (spec §4.3). Each handler takes the already
//! decoded request [`Record`] and returns the single response record the
//! session loop sends back (spec §7: exactly one `RESPONSE` per request).

use std::sync::Arc;

use dfs_common::{AccessRight, ErrorCode, Record};

use crate::error::NmError;
use crate::metadata::FileRecord;
use crate::ss_link;
use crate::state::NameServer;

fn err_response(err: NmError) -> Record {
    Record::response(err.code(), err.to_string())
}

pub async fn register_client(server: &Arc<NameServer>, peer: std::net::SocketAddr, record: &Record) -> Record {
    server.sessions.register(peer, record.username.clone());
    Record::ok_response(format!("welcome, {}", record.username))
}

/// Parses the newline-joined inventory sent with `REGISTER_SS` and
/// materializes file records for previously unknown names with owner
/// `"system"` (spec §4.7).
///
/// `ss_port` carries the NM-facing port; `word_index` doubles as the
/// client-facing port for this message kind, the same way `flags` doubles
/// as view flags or a sentence index depending on the record's kind.
pub async fn register_ss(server: &Arc<NameServer>, record: &Record) -> Record {
    let inventory = String::from_utf8_lossy(&record.data);
    let mut guard = server.state.lock().await;
    let ss_index = guard.registry.register(record.ss_ip.clone(), record.ss_port, record.word_index as u16);

    for name in inventory.lines().filter(|l| !l.is_empty()) {
        if !guard.store.contains(name) {
            guard.store.insert(FileRecord::new(name, "system", ss_index));
        }
    }
    drop(guard);
    server.persist().await;

    let mut response = Record::ok_response(format!("registered storage server #{ss_index}"));
    response.word_index = ss_index as i32;
    response
}

pub async fn heartbeat(server: &Arc<NameServer>, record: &Record) -> Record {
    let mut guard = server.state.lock().await;
    let index = record.flags.max(0) as usize;
    guard.registry.touch_heartbeat(index);
    Record::ok_response("ack")
}

const VIEW_FLAG_ALL: i32 = 1 << 0;
const VIEW_FLAG_DETAILS: i32 = 1 << 1;

pub async fn view(server: &Arc<NameServer>, record: &Record) -> Record {
    let show_all = record.flags & VIEW_FLAG_ALL != 0;
    let details = record.flags & VIEW_FLAG_DETAILS != 0;
    let guard = server.state.lock().await;

    let mut lines = Vec::new();
    for file in guard.store.iter() {
        if !show_all && file.access.rights_of(&record.username) == AccessRight::NONE {
            continue;
        }
        if details {
            lines.push(format!(
                "--> {} (owner={}, words={}, chars={})",
                file.filename, file.owner(), file.word_count, file.char_count
            ));
        } else {
            lines.push(format!("--> {}", file.filename));
        }
    }

    Record::ok_response(lines.join("\n"))
}

pub async fn info(server: &Arc<NameServer>, record: &Record) -> Record {
    let (ss_index, word_count, char_count, owner, created, last_modified, last_accessed, access) = {
        let mut guard = server.state.lock().await;
        let file = match guard.store.find_mut(&record.filename) {
            Some(f) => f,
            None => return err_response(NmError::FileNotFound),
        };
        if file.access.rights_of(&record.username) == AccessRight::NONE {
            return err_response(NmError::Unauthorized);
        }
        file.touch_accessed();
        (
            file.ss_index,
            file.word_count,
            file.char_count,
            file.owner().to_owned(),
            file.created,
            file.last_modified,
            file.last_accessed,
            file.access.entries().to_vec(),
        )
    };

    // Stats refresh happens with the lock released (spec §5).
    let mut word_count = word_count;
    let mut char_count = char_count;
    let ss_descriptor = {
        let guard = server.state.lock().await;
        guard.registry.get(ss_index).cloned()
    };
    if let Some(ss) = ss_descriptor {
        if let Ok(stats) = ss_link::stat_file(&ss, &record.filename).await {
            word_count = stats.word_count;
            char_count = stats.char_count;
        }
    }

    let mut guard = server.state.lock().await;
    if let Some(file) = guard.store.find_mut(&record.filename) {
        file.word_count = word_count;
        file.char_count = char_count;
    }
    drop(guard);
    server.persist().await;

    // Mirrors the original INFO handler's layout (owner, timestamps, size,
    // then the full per-user access list) so a caller can see who else
    // holds access, not just their own rights (spec §4.3: "metadata +
    // access list + fresh stats").
    let access_list = access
        .iter()
        .map(|entry| format!("{}:{}", entry.username, if entry.rights.can_write() { "RW" } else { "R" }))
        .collect::<Vec<_>>()
        .join(", ");

    Record::ok_response(format!(
        "owner={owner} created={created} last_modified={last_modified} last_accessed={last_accessed} \
         words={word_count} chars={char_count} access=[{access_list}]"
    ))
}

pub async fn create(server: &Arc<NameServer>, record: &Record) -> Record {
    let ss_descriptor = {
        let mut guard = server.state.lock().await;
        if guard.store.contains(&record.filename) {
            return err_response(NmError::FileExists);
        }
        let ss_index = match guard.registry.first_active() {
            Some(i) => i,
            None => return err_response(NmError::NoStorageServer),
        };
        guard.registry.get(ss_index).cloned().map(|d| (ss_index, d))
    };

    let (ss_index, ss) = match ss_descriptor {
        Some(pair) => pair,
        None => return err_response(NmError::NoStorageServer),
    };

    if let Err(e) = ss_link::create_file(&ss, &record.filename).await {
        return err_response(NmError::SsCommFailed(e.to_string()));
    }

    let mut guard = server.state.lock().await;
    if guard.store.contains(&record.filename) {
        // Raced with a concurrent create of the same name; the SS copy is
        // simply left unused, matching the no-retry, no-rollback posture
        // the spec's SS selection policy already accepts.
        return err_response(NmError::FileExists);
    }
    guard.store.insert(FileRecord::new(&record.filename, &record.username, ss_index));
    drop(guard);
    server.persist().await;

    Record::ok_response(format!("created {}", record.filename))
}

pub async fn delete(server: &Arc<NameServer>, record: &Record) -> Record {
    let ss_descriptor = {
        let guard = server.state.lock().await;
        let file = match guard.store.iter().find(|f| f.filename == record.filename) {
            Some(f) => f,
            None => return err_response(NmError::FileNotFound),
        };
        if file.owner() != record.username {
            return err_response(NmError::Unauthorized);
        }
        guard.registry.get(file.ss_index).cloned()
    };

    let ss = match ss_descriptor {
        Some(ss) => ss,
        None => return err_response(NmError::ServerError("owning storage server is gone".into())),
    };

    if let Err(e) = ss_link::delete_file(&ss, &record.filename).await {
        return err_response(NmError::SsCommFailed(e.to_string()));
    }

    let mut guard = server.state.lock().await;
    guard.store.remove(&record.filename);
    drop(guard);
    server.persist().await;

    Record::ok_response(format!("deleted {}", record.filename))
}

pub async fn add_access(server: &Arc<NameServer>, record: &Record) -> Record {
    let rights = match AccessRight::from_bits(record.flags as u8) {
        Some(r) => r,
        None => return err_response(NmError::InvalidCommand),
    };

    let mut guard = server.state.lock().await;
    let file = match guard.store.find_mut(&record.filename) {
        Some(f) => f,
        None => return err_response(NmError::FileNotFound),
    };
    if file.owner() != record.username {
        return err_response(NmError::Unauthorized);
    }
    file.access.grant(record.target_user.clone(), rights);
    drop(guard);
    server.persist().await;

    Record::ok_response(format!("granted access to {}", record.target_user))
}

pub async fn rem_access(server: &Arc<NameServer>, record: &Record) -> Record {
    let mut guard = server.state.lock().await;
    let file = match guard.store.find_mut(&record.filename) {
        Some(f) => f,
        None => return err_response(NmError::FileNotFound),
    };
    if file.owner() != record.username {
        return err_response(NmError::Unauthorized);
    }
    match file.access.revoke(&record.target_user) {
        Ok(()) => {
            drop(guard);
            server.persist().await;
            Record::ok_response(format!("revoked access from {}", record.target_user))
        }
        Err(_) => err_response(NmError::InvalidCommand),
    }
}

/// Common path for READ/WRITE/STREAM/UNDO: look up `(ss_ip, ss_client_port)`
/// for the client to connect to directly (spec §4.3).
pub async fn locate(server: &Arc<NameServer>, record: &Record, need_write: bool) -> Record {
    let mut guard = server.state.lock().await;
    let file = match guard.store.find_mut(&record.filename) {
        Some(f) => f,
        None => return err_response(NmError::FileNotFound),
    };
    let rights = file.access.rights_of(&record.username);
    let authorized = if need_write { rights.can_write() } else { rights.can_read() };
    if !authorized {
        return err_response(NmError::Unauthorized);
    }
    file.touch_accessed();
    let ss_index = file.ss_index;

    let ss = match guard.registry.get(ss_index) {
        Some(ss) => ss,
        None => return err_response(NmError::ServerError("owning storage server is gone".into())),
    };

    let mut response = Record::ok_response("redirect");
    response.ss_ip = ss.ip.clone();
    response.ss_port = ss.client_facing_port;
    response
}

pub async fn exec(server: &Arc<NameServer>, record: &Record) -> Record {
    if !server.allow_exec {
        return Record::response(ErrorCode::Unauthorized, "exec is disabled on this server");
    }

    let ss_descriptor = {
        let mut guard = server.state.lock().await;
        let file = match guard.store.find_mut(&record.filename) {
            Some(f) => f,
            None => return err_response(NmError::FileNotFound),
        };
        if !file.access.rights_of(&record.username).can_read() {
            return err_response(NmError::Unauthorized);
        }
        guard.registry.get(file.ss_index).cloned()
    };

    let ss = match ss_descriptor {
        Some(ss) => ss,
        None => return err_response(NmError::ServerError("owning storage server is gone".into())),
    };

    let content = match ss_link::read_file(&ss, &record.filename).await {
        Ok(bytes) => bytes,
        Err(e) => return err_response(NmError::SsCommFailed(e.to_string())),
    };

    let command = String::from_utf8_lossy(&content).into_owned();
    let output = match tokio::process::Command::new("sh").arg("-c").arg(&command).output().await {
        Ok(output) => output,
        Err(e) => return err_response(NmError::ServerError(e.to_string())),
    };

    let mut response = Record::ok_response(String::new());
    response.data = output.stdout;
    response
}

pub async fn list_users(server: &Arc<NameServer>, _record: &Record) -> Record {
    let mut users = server.sessions.usernames();
    {
        let guard = server.state.lock().await;
        for file in guard.store.iter() {
            if !users.iter().any(|u| u == file.owner()) {
                users.push(file.owner().to_owned());
            }
            for entry in file.access.entries() {
                if !users.iter().any(|u| u == &entry.username) {
                    users.push(entry.username.clone());
                }
            }
        }
    }
    users.sort();
    users.dedup();

    Record::ok_response(users.join(", "))
}
