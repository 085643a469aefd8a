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

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use crate::common::CONFIG;
use crate::filter::{AntPathMatcher, EntryListFilter, FilterError, PathEntry};

/// Admits entries whose path matches an Ant-style pattern.
///
/// `AntPatternEntryFilter::new("/data/**/*.txt")` accepts `/data/report.txt` and
/// `/data/sub/report.txt` but not `/data/report.csv`. Matching uses the full path
/// of the entry, so a pattern and a path must agree on whether they are absolute.
pub struct AntPatternEntryFilter<E> {
    pattern: String,
    matcher: Arc<AntPathMatcher>,
    _entry: PhantomData<fn(&E)>,
}

impl<E> AntPatternEntryFilter<E> {
    /// Creates a filter with a matcher configured from the global configuration.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self::with_matcher(pattern, Arc::new(AntPathMatcher::from_config(&CONFIG.filters)))
    }

    /// Creates a filter sharing an existing matcher (and its pattern cache).
    pub fn with_matcher(pattern: impl Into<String>, matcher: Arc<AntPathMatcher>) -> Self {
        Self {
            pattern: pattern.into(),
            matcher,
            _entry: PhantomData,
        }
    }

    /// The configured pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<E> Clone for AntPatternEntryFilter<E> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            matcher: Arc::clone(&self.matcher),
            _entry: PhantomData,
        }
    }
}

impl<E> fmt::Debug for AntPatternEntryFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AntPatternEntryFilter")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl<E: PathEntry> EntryListFilter<E> for AntPatternEntryFilter<E> {
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        let path = entry.entry_path()?;
        let accepted = self.matcher.matches(&self.pattern, &path)?;
        trace!(pattern = %self.pattern, path = %path, accepted, "Ant pattern evaluated");
        Ok(accepted)
    }

    fn name(&self) -> &'static str {
        "AntPatternEntryFilter"
    }
}

/// Admits entries whose final path segment (the file name) matches a regular
/// expression in full.
pub struct RegexPatternEntryFilter<E> {
    regex: Regex,
    separator: String,
    _entry: PhantomData<fn(&E)>,
}

impl<E> RegexPatternEntryFilter<E> {
    /// Compiles `pattern`; the expression must match the whole file name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] when `pattern` is not a valid regular
    /// expression.
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| FilterError::invalid_pattern(pattern, e.to_string()))?;
        let separator = if CONFIG.filters.path_separator.is_empty() {
            "/".to_string()
        } else {
            CONFIG.filters.path_separator.clone()
        };
        Ok(Self {
            regex,
            separator,
            _entry: PhantomData,
        })
    }
}

impl<E> Clone for RegexPatternEntryFilter<E> {
    fn clone(&self) -> Self {
        Self {
            regex: self.regex.clone(),
            separator: self.separator.clone(),
            _entry: PhantomData,
        }
    }
}

impl<E> fmt::Debug for RegexPatternEntryFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexPatternEntryFilter")
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

impl<E: PathEntry> EntryListFilter<E> for RegexPatternEntryFilter<E> {
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        let path = entry.entry_path()?;
        let file_name = path
            .trim_end_matches(self.separator.as_str())
            .rsplit(self.separator.as_str())
            .next()
            .unwrap_or_default();
        Ok(self.regex.is_match(file_name))
    }

    fn name(&self) -> &'static str {
        "RegexPatternEntryFilter"
    }
}
