//! A transport double that records requests and answers from a script.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::TransportError, proxy::Transport, request::CommandRequest};

type Respond = Box<dyn Fn(&CommandRequest) -> Result<Bytes, TransportError> + Send + Sync>;

/// Records every request and answers each with the same scripted outcome.
pub(crate) struct RecordingTransport {
    sent: Mutex<Vec<CommandRequest>>,
    respond: Respond,
}

impl RecordingTransport {
    /// Answer every request with `payload`.
    pub(crate) fn replying(payload: Vec<u8>) -> Self {
        let payload = Bytes::from(payload);
        Self {
            sent: Mutex::default(),
            respond: Box::new(move |_| Ok(payload.clone())),
        }
    }

    /// Fail every request with the error built by `error`.
    pub(crate) fn failing(error: fn() -> TransportError) -> Self {
        Self {
            sent: Mutex::default(),
            respond: Box::new(move |_| Err(error())),
        }
    }

    /// Requests received so far.
    pub(crate) fn sent(&self) -> Vec<CommandRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_request(&self, request: CommandRequest) -> Result<Bytes, TransportError> {
        let reply = (self.respond)(&request);
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        reply
    }
}
