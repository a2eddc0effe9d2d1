//! Client library for the distributed file system: one async method per
//! operation in the command vocabulary (spec §6), plus the two-phase
//! locate-then-connect dance for read/write/stream/undo.

pub mod error;

use std::net::SocketAddr;

use dfs_common::{AccessRight, MessageKind, Record};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

pub use error::ClientError;

fn check_success(response: &Record) -> Result<(), ClientError> {
    if response.error_code.is_success() {
        Ok(())
    } else {
        Err(ClientError::Remote {
            code: response.error_code,
            message: response.data_as_str().unwrap_or("<invalid utf-8>").to_owned(),
        })
    }
}

fn message_of(response: Record) -> Result<String, ClientError> {
    check_success(&response)?;
    Ok(response.data_as_str().unwrap_or("").to_owned())
}

/// A session with the name server. Metadata-only operations (view, info,
/// create, delete, access control, exec, list-users) all ride this one
/// connection; read/write/stream/undo locate an SS and then open a fresh
/// connection directly to it.
pub struct DfsClient {
    nm_stream: Mutex<TcpStream>,
    username: String,
}

impl DfsClient {
    pub async fn connect(nm_addr: SocketAddr, username: impl Into<String>) -> Result<DfsClient, ClientError> {
        let username = username.into();
        let mut stream = TcpStream::connect(nm_addr).await?;

        let mut request = Record::new(MessageKind::RegisterClient);
        request.username = username.clone();
        dfs_common::write_record(&mut stream, &request).await?;
        let response = dfs_common::read_record(&mut stream).await?;
        check_success(&response)?;

        Ok(DfsClient { nm_stream: Mutex::new(stream), username })
    }

    async fn call_nm(&self, mut request: Record) -> Result<Record, ClientError> {
        request.username = self.username.clone();
        let mut stream = self.nm_stream.lock().await;
        dfs_common::write_record(&mut *stream, &request).await?;
        Ok(dfs_common::read_record(&mut *stream).await?)
    }

    pub async fn view(&self, show_all: bool, details: bool) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::View);
        request.flags = (show_all as i32) | ((details as i32) << 1);
        message_of(self.call_nm(request).await?)
    }

    pub async fn create(&self, filename: &str) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::Create);
        request.filename = filename.to_owned();
        message_of(self.call_nm(request).await?)
    }

    pub async fn delete(&self, filename: &str) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::Delete);
        request.filename = filename.to_owned();
        message_of(self.call_nm(request).await?)
    }

    pub async fn info(&self, filename: &str) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::Info);
        request.filename = filename.to_owned();
        message_of(self.call_nm(request).await?)
    }

    pub async fn add_access(&self, filename: &str, target_user: &str, rights: AccessRight) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::AddAccess);
        request.filename = filename.to_owned();
        request.target_user = target_user.to_owned();
        request.flags = rights.bits() as i32;
        message_of(self.call_nm(request).await?)
    }

    pub async fn rem_access(&self, filename: &str, target_user: &str) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::RemAccess);
        request.filename = filename.to_owned();
        request.target_user = target_user.to_owned();
        message_of(self.call_nm(request).await?)
    }

    pub async fn list_users(&self) -> Result<String, ClientError> {
        message_of(self.call_nm(Record::new(MessageKind::ListUsers)).await?)
    }

    pub async fn exec(&self, filename: &str) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::Exec);
        request.filename = filename.to_owned();
        message_of(self.call_nm(request).await?)
    }

    async fn locate(&self, kind: MessageKind, filename: &str) -> Result<SocketAddr, ClientError> {
        let mut request = Record::new(kind);
        request.filename = filename.to_owned();
        let response = self.call_nm(request).await?;
        check_success(&response)?;
        format!("{}:{}", response.ss_ip, response.ss_port).parse().map_err(|_| ClientError::InvalidSsAddress)
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let addr = self.locate(MessageKind::Read, filename).await?;
        let mut stream = TcpStream::connect(addr).await?;

        let mut request = Record::new(MessageKind::Read);
        request.username = self.username.clone();
        request.filename = filename.to_owned();
        dfs_common::write_record(&mut stream, &request).await?;

        let response = dfs_common::read_record(&mut stream).await?;
        check_success(&response)?;
        Ok(response.data)
    }

    pub async fn stream(&self, filename: &str) -> Result<Vec<String>, ClientError> {
        let addr = self.locate(MessageKind::Stream, filename).await?;
        let mut stream = TcpStream::connect(addr).await?;

        let mut request = Record::new(MessageKind::Stream);
        request.username = self.username.clone();
        request.filename = filename.to_owned();
        dfs_common::write_record(&mut stream, &request).await?;

        let mut tokens = Vec::new();
        loop {
            let response = dfs_common::read_record(&mut stream).await?;
            check_success(&response)?;
            let token = response.data_as_str().unwrap_or("").to_owned();
            if token == dfs_common::STREAM_STOP {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub async fn undo(&self, filename: &str) -> Result<String, ClientError> {
        let addr = self.locate(MessageKind::Undo, filename).await?;
        let mut stream = TcpStream::connect(addr).await?;

        let mut request = Record::new(MessageKind::Undo);
        request.username = self.username.clone();
        request.filename = filename.to_owned();
        dfs_common::write_record(&mut stream, &request).await?;
        message_of(dfs_common::read_record(&mut stream).await?)
    }

    /// Locates the owning SS and opens a write session on sentence
    /// `sentence_index` (§4.5). `sentence_index == word_count` of the
    /// current sentence list means "append a new sentence".
    pub async fn open_write_session(&self, filename: &str, sentence_index: i32) -> Result<WriteSession, ClientError> {
        let addr = self.locate(MessageKind::Write, filename).await?;
        let mut stream = TcpStream::connect(addr).await?;

        let mut request = Record::new(MessageKind::Write);
        request.username = self.username.clone();
        request.filename = filename.to_owned();
        request.word_index = sentence_index;
        dfs_common::write_record(&mut stream, &request).await?;

        let ack = dfs_common::read_record(&mut stream).await?;
        check_success(&ack)?;
        Ok(WriteSession { stream })
    }
}

/// A locked sentence under edit. Each [`WriteSession::edit`] call sends
/// one update; [`WriteSession::commit`] sends the `ETIRW` sentinel and
/// consumes the session.
pub struct WriteSession {
    stream: TcpStream,
}

impl WriteSession {
    pub async fn edit(&mut self, word_index: i32, content: &str) -> Result<(), ClientError> {
        let mut request = Record::new(MessageKind::Write);
        request.word_index = word_index;
        request.data = content.as_bytes().to_vec();
        dfs_common::write_record(&mut self.stream, &request).await?;
        check_success(&dfs_common::read_record(&mut self.stream).await?)
    }

    pub async fn commit(mut self) -> Result<String, ClientError> {
        let mut request = Record::new(MessageKind::Write);
        request.data = dfs_common::WRITE_SENTINEL.as_bytes().to_vec();
        dfs_common::write_record(&mut self.stream, &request).await?;
        message_of(dfs_common::read_record(&mut self.stream).await?)
    }
}
