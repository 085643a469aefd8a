//! Configuration, logging setup and shared type aliases.
//!
//! # Key Re-exported Components:
//!
//! *   [`JunctionConfig`] and the process-wide [`CONFIG`]: Settings loaded from the
//!     XDG configuration directory, falling back to defaults.
//! *   [`init_tracing`]: Installs the file-based `tracing` subscriber described by the
//!     `[tracing]` configuration section.

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

// --- Public Re-exports ---
pub use config::{JunctionConfig, CONFIG};
pub use logging::init_tracing;

// --- Crate-Internal Re-exports ---
pub use types::*;

// --- Submodules ---

/// Defines common type aliases.
mod types;

/// Defines the configuration system.
pub mod config;
/// Defines the tracing subscriber setup.
mod logging;
