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

/// Errors raised while evaluating or configuring entry filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The entry could not be evaluated (for example a path that is not valid UTF-8).
    ///
    /// Callers must not treat this as either "accepted" or "rejected".
    Evaluation {
        /// Lossy rendering of the offending entry.
        entry: String,
        /// Why evaluation failed.
        reason: String,
    },
    /// A pattern or regular expression could not be compiled.
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why compilation failed.
        reason: String,
    },
}

impl FilterError {
    pub(crate) fn evaluation(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::Evaluation {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Evaluation { entry, reason } => {
                write!(f, "Failed to evaluate entry '{entry}': {reason}")
            }
            FilterError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{pattern}': {reason}")
            }
        }
    }
}

impl std::error::Error for FilterError {}
