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

/// Errors raised while constructing messages, headers or events.
///
/// These are construction-time failures only; an instance that was built
/// successfully never produces one afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// A required argument was missing or blank.
    InvalidArgument(String),
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for MessageError {}

impl MessageError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MessageError::InvalidArgument(msg.into())
    }
}
