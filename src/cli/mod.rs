//! The `obelisk-wire` tool.
//!
//! Encodes requests and decodes replies offline so payloads captured from a
//! server can be inspected without a connection. Binaries only need to call
//! [`run`].

mod args;

use std::{ffi::OsString, io::Write};

use anyhow::{Context, Result, anyhow};
use bitcoin::{Transaction, consensus::encode::deserialize};
use clap::Parser;
use ortho_config::OrthoConfig;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    chain::BinaryPrefix,
    command::Command,
    error::ObeliskError,
    reply::decode_reply,
    request::{self, CommandRequest, HeaderLocator},
};

pub use args::{BIN_NAME, ClientConfig, Cli, Commands, RequestCommand};

/// Parse process arguments, load configuration and execute the command.
///
/// # Errors
///
/// Returns any failure from configuration loading or from the command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_tracing(&config)?;
    let mut stdout = std::io::stdout().lock();
    run_with_cli(&cli, &config, &mut stdout)
}

/// Merge `.obelisk.toml`, `OBELISK_*` variables and the flags given in `cli`.
///
/// # Errors
///
/// Returns an error if a configuration source cannot be read or parsed.
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut args = vec![OsString::from(BIN_NAME)];
    if let Some(filter) = &cli.log_filter {
        args.push("--log-filter".into());
        args.push(filter.into());
    }
    if cli.pretty {
        args.push("--pretty".into());
    }
    ClientConfig::load_from_iter(args).context("failed to load configuration")
}

fn init_tracing(config: &ClientConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Execute an already parsed [`Cli`], writing JSON to `out`.
///
/// # Errors
///
/// Returns an error if an argument is malformed, a payload fails to decode
/// or `out` cannot be written.
pub fn run_with_cli(cli: &Cli, config: &ClientConfig, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Commands::Request(command) => {
            let request = build_request(command)?;
            debug!(command = %request.command(), payload_len = request.payload().len(), "encoded request");
            emit(out, config, &EncodedRequest::from(&request))
        }
        Commands::Decode { command, payload } => {
            let bytes = hex::decode(payload).context("reply payload is not valid hex")?;
            let reply = decode_reply(*command, &bytes)
                .map_err(|source| ObeliskError::malformed(*command, source))?;
            emit(out, config, &reply)
        }
        Commands::Commands => {
            let catalogue: Vec<_> = Command::ALL.into_iter().map(CommandInfo::from).collect();
            emit(out, config, &catalogue)
        }
    }
}

fn emit(out: &mut impl Write, config: &ClientConfig, value: &impl Serialize) -> Result<()> {
    if config.pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// A request as printed by `obelisk-wire request`.
#[derive(Debug, Serialize)]
struct EncodedRequest {
    command: Command,
    payload: String,
}

impl From<&CommandRequest> for EncodedRequest {
    fn from(request: &CommandRequest) -> Self {
        Self {
            command: request.command(),
            payload: hex::encode(request.payload()),
        }
    }
}

#[derive(Debug, Serialize)]
struct CommandInfo {
    name: Command,
    deprecated: bool,
    notification: bool,
}

impl From<Command> for CommandInfo {
    fn from(command: Command) -> Self {
        Self {
            name: command,
            deprecated: command.is_deprecated(),
            notification: command.is_notification(),
        }
    }
}

fn parse_transaction(text: &str) -> Result<Transaction> {
    let bytes = hex::decode(text).context("transaction is not valid hex")?;
    deserialize(&bytes).context("transaction does not decode")
}

fn parse_prefix(bits: usize, text: &str) -> Result<BinaryPrefix> {
    let bytes = hex::decode(text).context("prefix is not valid hex")?;
    Ok(BinaryPrefix::new(bits, &bytes))
}

fn build_request(command: &RequestCommand) -> Result<CommandRequest> {
    let request = match command {
        RequestCommand::BroadcastTransaction { transaction } => {
            request::broadcast_transaction(&parse_transaction(transaction)?)
        }
        RequestCommand::ValidateTransaction { transaction } => {
            request::validate_transaction(&parse_transaction(transaction)?)
        }
        RequestCommand::PoolFetchTransaction { hash } => request::pool_fetch_transaction(hash),
        RequestCommand::FetchTransaction { hash } => request::fetch_transaction(hash),
        RequestCommand::FetchLastHeight => request::fetch_last_height(),
        RequestCommand::FetchBlockHeader { height, hash } => {
            let locator = match (height, hash) {
                (Some(height), _) => HeaderLocator::Height(*height),
                (None, Some(hash)) => HeaderLocator::Hash(*hash),
                (None, None) => return Err(anyhow!("either --height or --hash is required")),
            };
            request::fetch_block_header(locator)
        }
        RequestCommand::FetchTransactionIndex { hash } => request::fetch_transaction_index(hash),
        RequestCommand::FetchStealth {
            bits,
            prefix,
            from_height,
        } => request::fetch_stealth(&parse_prefix(*bits, prefix)?, *from_height)?,
        RequestCommand::FetchHistory {
            address,
            from_height,
            variant,
        } => variant.request(address, *from_height),
        RequestCommand::Subscribe { kind, bits, prefix } => {
            request::subscribe(*kind, &parse_prefix(*bits, prefix)?)?
        }
        RequestCommand::SubscribeAddress { address } => request::subscribe_address(address),
        RequestCommand::Renew { kind, bits, prefix } => {
            request::renew(*kind, &parse_prefix(*bits, prefix)?)?
        }
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn run_args(args: &[&str]) -> Result<serde_json::Value> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run_with_cli(&cli, &ClientConfig::default(), &mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }

    #[test]
    fn prints_request_payload_as_hex() {
        let json = run_args(&["obelisk-wire", "request", "fetch-block-header", "--height", "100"])
            .expect("request");
        assert_eq!(
            json,
            serde_json::json!({
                "command": "blockchain.fetch_block_header",
                "payload": "64000000",
            })
        );
    }

    #[test]
    fn history_variant_selects_the_command() {
        let json = run_args(&[
            "obelisk-wire",
            "request",
            "fetch-history",
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
            "--variant",
            "canonical",
            "--from-height",
            "1",
        ])
        .expect("request");
        assert_eq!(json["command"], "address.fetch_history2");
        assert_eq!(
            json["payload"],
            "00751e76e8199196d454941c45d1b3a323f1433bd601000000"
        );
    }

    #[rstest]
    #[case("blockchain.fetch_last_height", "0a000000", serde_json::json!({ "kind": "height", "value": 10 }))]
    #[case("address.renew", "00000000", serde_json::json!({ "kind": "result_code", "value": 0 }))]
    #[case("protocol.broadcast_transaction", "", serde_json::json!({ "kind": "empty" }))]
    fn decodes_replies_to_json(
        #[case] command: &str,
        #[case] payload: &str,
        #[case] expected: serde_json::Value,
    ) {
        let json = run_args(&["obelisk-wire", "decode", command, payload]).expect("decode");
        assert_eq!(json, expected);
    }

    #[test]
    fn malformed_replies_are_reported() {
        let err = run_args(&["obelisk-wire", "decode", "blockchain.fetch_last_height", "0a00"])
            .expect_err("short reply");
        let malformed = err
            .downcast_ref::<ObeliskError>()
            .expect("decode error is preserved");
        assert!(matches!(
            malformed,
            ObeliskError::MalformedResponse {
                command: Command::FetchLastHeight,
                ..
            }
        ));
    }

    #[rstest]
    #[case("256", 256)]
    #[case("4000000000", 4_000_000_000)]
    #[case("18446744073709551615", usize::MAX)]
    fn oversized_prefixes_are_rejected(#[case] arg: &str, #[case] expected: usize) {
        let prefix = "00".repeat(32);
        let err = run_args(&["obelisk-wire", "request", "fetch-stealth", arg, &prefix])
            .expect_err("prefix too long");
        assert!(matches!(
            err.downcast_ref::<ObeliskError>(),
            Some(ObeliskError::PrefixTooLong { bits }) if *bits == expected
        ));
    }

    #[test]
    fn lists_the_command_catalogue() {
        let json = run_args(&["obelisk-wire", "commands"]).expect("catalogue");
        let entries = json.as_array().expect("array");
        assert_eq!(entries.len(), Command::ALL.len());
        assert!(entries.iter().any(|entry| {
            entry["name"] == "address.fetch_history" && entry["deprecated"] == true
        }));
    }

    #[test]
    fn pretty_output_spans_lines() {
        let cli = Cli::try_parse_from(["obelisk-wire", "request", "fetch-last-height"])
            .expect("parse");
        let config = ClientConfig {
            pretty: true,
            ..ClientConfig::default()
        };
        let mut out = Vec::new();
        run_with_cli(&cli, &config, &mut out).expect("request");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.lines().count() > 1);
    }
}
