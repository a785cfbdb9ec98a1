/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::io;

use clap::Parser;
use heron::{protocol, Cli, Engine, Mode, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // `--log` wins over `RUST_LOG`; stdout is reserved for engine output
    let filter = match cli.log.as_deref() {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = cli.config();

    let result = match cli.mode.unwrap_or(Mode::Repl) {
        Mode::Repl => Engine::new(config).run(),
        Mode::Serve => protocol::serve(io::stdin().lock(), io::stdout().lock(), config.depth),
    };

    if let Err(e) = result {
        tracing::error!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }
}
