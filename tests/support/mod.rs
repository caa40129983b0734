//! Shared helpers for integration tests.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use bytes::Bytes;
use obelisk_client::{Command, CommandRequest, Transport, TransportError};

/// Transport double answering each command from a fixed script.
///
/// Commands without a scripted reply fail with
/// [`TransportError::ConnectionLost`].
#[derive(Default)]
pub struct ScriptedTransport {
    replies: HashMap<Command, Bytes>,
    sent: Mutex<Vec<CommandRequest>>,
}

impl ScriptedTransport {
    /// Answer `command` with `payload`.
    #[must_use]
    pub fn reply(mut self, command: Command, payload: impl Into<Bytes>) -> Self {
        self.replies.insert(command, payload.into());
        self
    }

    /// Requests received so far, in order.
    pub fn sent(&self) -> Vec<CommandRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_request(&self, request: CommandRequest) -> Result<Bytes, TransportError> {
        let reply = self
            .replies
            .get(&request.command())
            .cloned()
            .ok_or(TransportError::ConnectionLost);
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        reply
    }
}
