/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::PathBuf;

use anyhow::Context;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::common::config::TracingConfig;

/// Installs a global `tracing` subscriber writing to the configured log file.
///
/// The library never calls this on its own; hosts embedding the core opt in. `RUST_LOG`
/// takes precedence over `TracingConfig::level` when set. The returned guard must be
/// held for as long as logs should be flushed.
///
/// # Errors
///
/// Fails when the log directory cannot be created, the level directive does not parse,
/// or a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> anyhow::Result<WorkerGuard> {
    let directory = expand_home(&config.log_directory);
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("could not create log directory {}", directory.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &directory, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid tracing level directive '{}'", config.level))?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(Level::TRACE)
        .compact()
        .with_line_number(true)
        .with_target(true)
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(guard)
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
