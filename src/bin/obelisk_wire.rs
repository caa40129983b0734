//! Binary entry point for `obelisk-wire`.
//!
//! All behaviour lives in `obelisk_client::cli`; this wrapper only reports
//! the outcome.

use anyhow::Result;

fn main() -> Result<()> { obelisk_client::cli::run() }
