//! Async entry points, one per Obelisk command.
//!
//! [`Proxy`] glues the request encoders and reply decoders to a caller
//! supplied [`Transport`]. Each call encodes its arguments, awaits a single
//! reply and decodes it, resolving exactly once to the typed value or an
//! [`ObeliskError`]. Prefix validation happens before the transport is
//! touched, so a rejected prefix never reaches the server.

use async_trait::async_trait;
use bitcoin::{Transaction, Txid, block::Header};
use bytes::Bytes;
use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    chain::{BinaryPrefix, PaymentAddress, SubscribeType},
    command::Command,
    error::{DecodeError, ObeliskError, TransportError},
    history::{HistoryRow, decode_history},
    legacy::{self, decode_expanded_history},
    reply::{
        TransactionIndex,
        decode_block_header,
        decode_empty,
        decode_height,
        decode_result_code,
        decode_transaction,
        decode_transaction_index,
        decode_validate,
    },
    request::{self, CommandRequest, HeaderLocator},
    stealth::{StealthRow, decode_stealth},
};

/// Delivers a request to an Obelisk server and returns the reply payload.
///
/// Implementations own correlation, retries and timeouts. The codec forwards
/// any [`TransportError`] to the caller unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the matching reply payload.
    async fn send_request(&self, request: CommandRequest) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send_request(&self, request: CommandRequest) -> Result<Bytes, TransportError> {
        (**self).send_request(request).await
    }
}

/// Which history command to issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HistoryVariant {
    /// `blockchain.fetch_history`: compact rows, reversed address hash.
    #[default]
    Current,
    /// `address.fetch_history`: expanded rows from servers before v3.
    Expanded,
    /// `address.fetch_history2`: compact rows, canonical address hash.
    Canonical,
}

impl HistoryVariant {
    /// Command issued for this variant.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::Current => Command::FetchHistory,
            Self::Expanded => Command::AddressFetchHistory,
            Self::Canonical => Command::AddressFetchHistory2,
        }
    }

    /// Build the history request for `address`.
    #[must_use]
    pub fn request(self, address: &PaymentAddress, from_height: u32) -> CommandRequest {
        match self {
            Self::Current => request::fetch_history(address, from_height),
            Self::Expanded => legacy::address_fetch_history(address, from_height),
            Self::Canonical => legacy::address_fetch_history2(address, from_height),
        }
    }

    /// Decode the reply to [`Self::request`].
    ///
    /// # Errors
    /// Returns the failure of the decoder matching the variant.
    pub fn decode(self, payload: &[u8]) -> Result<Vec<HistoryRow>, DecodeError> {
        match self {
            Self::Current | Self::Canonical => decode_history(payload),
            Self::Expanded => decode_expanded_history(payload),
        }
    }
}

/// Typed client over a [`Transport`].
#[derive(Debug, Clone)]
pub struct Proxy<T> {
    transport: T,
}

impl<T> Proxy<T> {
    /// Wrap `transport`.
    #[must_use]
    pub const fn new(transport: T) -> Self { Self { transport } }

    /// The wrapped transport.
    #[must_use]
    pub const fn transport(&self) -> &T { &self.transport }

    /// Unwrap the transport.
    #[must_use]
    pub fn into_inner(self) -> T { self.transport }
}

impl<T: Transport> Proxy<T> {
    async fn call<R>(
        &self,
        request: CommandRequest,
        decode: impl FnOnce(&[u8]) -> Result<R, DecodeError> + Send,
    ) -> Result<R, ObeliskError> {
        let command = request.command();
        debug!(%command, payload_len = request.payload().len(), "sending request");
        let payload = self.transport.send_request(request).await?;
        decode(&payload).map_err(|error| {
            warn!(%command, %error, reply_len = payload.len(), "malformed reply");
            ObeliskError::malformed(command, error)
        })
    }

    /// Broadcast `tx` to the network.
    ///
    /// # Errors
    /// Fails if the transport fails or the acknowledgement is not empty.
    pub async fn protocol_broadcast_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<(), ObeliskError> {
        self.call(request::broadcast_transaction(tx), decode_empty)
            .await
    }

    /// Validate `tx` against the memory pool, returning the indexes of inputs
    /// that spend unconfirmed outputs.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn transaction_pool_validate(
        &self,
        tx: &Transaction,
    ) -> Result<Vec<u32>, ObeliskError> {
        self.call(request::validate_transaction(tx), decode_validate)
            .await
    }

    /// Fetch an unconfirmed transaction from the memory pool.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn transaction_pool_fetch_transaction(
        &self,
        hash: &Txid,
    ) -> Result<Transaction, ObeliskError> {
        self.call(request::pool_fetch_transaction(hash), decode_transaction)
            .await
    }

    /// Fetch a confirmed transaction.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn blockchain_fetch_transaction(
        &self,
        hash: &Txid,
    ) -> Result<Transaction, ObeliskError> {
        self.call(request::fetch_transaction(hash), decode_transaction)
            .await
    }

    /// Fetch the height of the chain tip.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn blockchain_fetch_last_height(&self) -> Result<u32, ObeliskError> {
        self.call(request::fetch_last_height(), decode_height).await
    }

    /// Fetch a block header by height or hash.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn blockchain_fetch_block_header(
        &self,
        locator: HeaderLocator,
    ) -> Result<Header, ObeliskError> {
        self.call(request::fetch_block_header(locator), decode_block_header)
            .await
    }

    /// Fetch the block height and position of a confirmed transaction.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn blockchain_fetch_transaction_index(
        &self,
        hash: &Txid,
    ) -> Result<TransactionIndex, ObeliskError> {
        self.call(
            request::fetch_transaction_index(hash),
            decode_transaction_index,
        )
        .await
    }

    /// Fetch stealth rows under `prefix` from `from_height` onwards.
    ///
    /// # Errors
    /// Returns [`ObeliskError::PrefixTooLong`] without sending anything if the
    /// prefix exceeds 255 bits; otherwise fails if the transport fails or the
    /// reply is malformed.
    pub async fn blockchain_fetch_stealth(
        &self,
        prefix: &BinaryPrefix,
        from_height: u32,
    ) -> Result<Vec<StealthRow>, ObeliskError> {
        let request = request::fetch_stealth(prefix, from_height)?;
        self.call(request, decode_stealth).await
    }

    /// Fetch the history of `address` from `from_height` onwards.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn blockchain_fetch_history(
        &self,
        address: &PaymentAddress,
        from_height: u32,
    ) -> Result<Vec<HistoryRow>, ObeliskError> {
        self.fetch_history(HistoryVariant::Current, address, from_height)
            .await
    }

    /// Fetch history with the command older servers understand.
    ///
    /// Superseded by [`Self::blockchain_fetch_history`].
    ///
    /// # Errors
    /// Fails if the transport fails, the reply is malformed or a height does
    /// not fit 32 bits.
    pub async fn address_fetch_history(
        &self,
        address: &PaymentAddress,
        from_height: u32,
    ) -> Result<Vec<HistoryRow>, ObeliskError> {
        self.fetch_history(HistoryVariant::Expanded, address, from_height)
            .await
    }

    /// Fetch history keyed by the canonical address hash.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn address_fetch_history2(
        &self,
        address: &PaymentAddress,
        from_height: u32,
    ) -> Result<Vec<HistoryRow>, ObeliskError> {
        self.fetch_history(HistoryVariant::Canonical, address, from_height)
            .await
    }

    /// Fetch history with the command chosen by `variant`.
    ///
    /// # Errors
    /// Fails if the transport fails or the reply is malformed.
    pub async fn fetch_history(
        &self,
        variant: HistoryVariant,
        address: &PaymentAddress,
        from_height: u32,
    ) -> Result<Vec<HistoryRow>, ObeliskError> {
        self.call(variant.request(address, from_height), |payload| {
            variant.decode(payload)
        })
        .await
    }

    /// Subscribe to updates for addresses or stealth outputs under `prefix`.
    ///
    /// # Errors
    /// Returns [`ObeliskError::PrefixTooLong`] without sending anything if the
    /// prefix exceeds 255 bits; otherwise fails if the transport fails or the
    /// acknowledgement is not empty.
    pub async fn address_subscribe(
        &self,
        kind: SubscribeType,
        prefix: &BinaryPrefix,
    ) -> Result<(), ObeliskError> {
        let request = request::subscribe(kind, prefix)?;
        self.call(request, decode_empty).await
    }

    /// Subscribe to updates for a single payment address.
    ///
    /// # Errors
    /// Fails if the transport fails or the acknowledgement is not empty.
    pub async fn address_subscribe_payment(
        &self,
        address: &PaymentAddress,
    ) -> Result<(), ObeliskError> {
        self.call(request::subscribe_address(address), decode_empty)
            .await
    }

    /// Renew a subscription before it lapses.
    ///
    /// # Errors
    /// Returns [`ObeliskError::Rejected`] if the server answers with a
    /// non-zero result code, [`ObeliskError::PrefixTooLong`] without sending
    /// anything for an oversized prefix, or a transport or decode failure.
    pub async fn address_renew(
        &self,
        kind: SubscribeType,
        prefix: &BinaryPrefix,
    ) -> Result<(), ObeliskError> {
        let request = request::renew(kind, prefix)?;
        match self.call(request, decode_result_code).await? {
            0 => Ok(()),
            code => Err(ObeliskError::Rejected {
                command: Command::AddressRenew,
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::encode::serialize;
    use rstest::rstest;

    use super::*;
    use crate::{
        history::CompactHistoryRow,
        test_helpers::{
            RecordingTransport,
            point,
            sample_address,
            sample_transaction,
            tracing::capture_events,
        },
        wire::PayloadWriter,
    };

    #[tokio::test]
    async fn fetches_last_height() {
        let transport = RecordingTransport::replying(vec![0x10, 0x27, 0, 0]);
        let proxy = Proxy::new(&transport);
        assert_eq!(proxy.blockchain_fetch_last_height().await.expect("height"), 10_000);
        let sent = transport.sent();
        let [request] = sent.as_slice() else {
            panic!("expected one request, got {sent:?}");
        };
        assert_eq!(request.command(), Command::FetchLastHeight);
    }

    #[tokio::test]
    async fn fetches_a_transaction() {
        let tx = sample_transaction();
        let transport = RecordingTransport::replying(serialize(&tx));
        let proxy = Proxy::new(&transport);
        let fetched = proxy
            .blockchain_fetch_transaction(&tx.compute_txid())
            .await
            .expect("transaction");
        assert_eq!(fetched, tx);
    }

    #[tokio::test]
    async fn oversized_prefixes_never_reach_the_transport() {
        let transport = RecordingTransport::replying(Vec::new());
        let proxy = Proxy::new(&transport);
        let prefix = BinaryPrefix::new(256, &[0; 32]);

        let stealth = proxy.blockchain_fetch_stealth(&prefix, 0).await;
        assert!(matches!(stealth, Err(ObeliskError::PrefixTooLong { bits: 256 })));
        let subscribe = proxy.address_subscribe(SubscribeType::Stealth, &prefix).await;
        assert!(matches!(subscribe, Err(ObeliskError::PrefixTooLong { bits: 256 })));
        let renew = proxy.address_renew(SubscribeType::Address, &prefix).await;
        assert!(matches!(renew, Err(ObeliskError::PrefixTooLong { bits: 256 })));

        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn transport_failures_pass_through() {
        let transport = RecordingTransport::failing(|| TransportError::Timeout);
        let proxy = Proxy::new(&transport);
        let err = proxy
            .blockchain_fetch_last_height()
            .await
            .expect_err("transport fails");
        assert!(matches!(err, ObeliskError::Transport(TransportError::Timeout)));
    }

    #[rstest]
    #[case(vec![0, 0, 0, 0], true)]
    #[case(vec![3, 0, 0, 0], false)]
    #[tokio::test]
    async fn renewal_result_codes(#[case] reply: Vec<u8>, #[case] accepted: bool) {
        let transport = RecordingTransport::replying(reply);
        let proxy = Proxy::new(&transport);
        let prefix = BinaryPrefix::new(8, &[0xab]);
        let result = proxy.address_renew(SubscribeType::Stealth, &prefix).await;
        if accepted {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(ObeliskError::Rejected {
                    command: Command::AddressRenew,
                    code: 3
                })
            ));
        }
    }

    #[rstest]
    #[case(HistoryVariant::Current, Command::FetchHistory)]
    #[case(HistoryVariant::Expanded, Command::AddressFetchHistory)]
    #[case(HistoryVariant::Canonical, Command::AddressFetchHistory2)]
    #[tokio::test]
    async fn history_variants_pick_their_command(
        #[case] variant: HistoryVariant,
        #[case] command: Command,
    ) {
        let transport = RecordingTransport::replying(Vec::new());
        let proxy = Proxy::new(&transport);
        let rows = proxy
            .fetch_history(variant, &sample_address(), 0)
            .await
            .expect("empty history");
        assert!(rows.is_empty());
        let sent = transport.sent();
        assert_eq!(sent.first().map(CommandRequest::command), Some(command));
        assert_eq!(variant.command(), command);
    }

    #[tokio::test]
    async fn canonical_history_is_reconciled() {
        let output = point(0x31, 0);
        let mut writer = PayloadWriter::new();
        CompactHistoryRow::output(output, 5, 1_000).write(&mut writer);
        CompactHistoryRow::spend(point(0x32, 0), 6, crate::chain::point_checksum(&output))
            .write(&mut writer);
        let transport = RecordingTransport::replying(writer.finish().to_vec());
        let proxy = Proxy::new(&transport);
        let rows = proxy
            .address_fetch_history2(&sample_address(), 0)
            .await
            .expect("history");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|row| row.spend_height), Some(6));
    }

    #[test]
    fn malformed_replies_are_logged_and_reported() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let transport = RecordingTransport::replying(vec![1, 2, 3]);
        let proxy = Proxy::new(&transport);
        let (result, events) =
            capture_events(|| runtime.block_on(proxy.blockchain_fetch_last_height()));

        assert!(matches!(
            result,
            Err(ObeliskError::MalformedResponse {
                command: Command::FetchLastHeight,
                source: DecodeError::Truncated { .. },
            })
        ));
        let warning = events
            .iter()
            .find(|event| event.level == tracing::Level::WARN)
            .expect("warning logged");
        assert_eq!(warning.message.as_deref(), Some("malformed reply"));
        assert_eq!(warning.field("command"), Some("blockchain.fetch_last_height"));
        assert!(
            events
                .iter()
                .any(|event| event.level == tracing::Level::DEBUG
                    && event.field("payload_len") == Some("0"))
        );
    }
}
