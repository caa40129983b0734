//! AFL target for the reply decoders.
//!
//! The first input byte selects a command from [`Command::ALL`]; the rest is
//! fed to that command's decoder. Decoders must reject bad input with an
//! error, so any panic here is a finding.

use obelisk_client::{Command, reply::decode_reply};

fn main() {
    afl::fuzz!(|data: &[u8]| {
        let Some((selector, payload)) = data.split_first() else {
            return;
        };
        let command = Command::ALL.iter().cycle().nth(usize::from(*selector));
        if let Some(command) = command {
            drop(decode_reply(*command, payload));
        }
    });
}
