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

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::common::config::FilterConfig;
use crate::filter::FilterError;

lazy_static! {
    /// `?`, `*` and `{name}` / `{name:regex}` placeholders within one path segment.
    static ref GLOB_PATTERN: Regex =
        Regex::new(r"\?|\*|\{((?:\{[^/]+?\}|[^/{}]|\\[{}])+?)\}").expect("static glob pattern");
}

const DEFAULT_VARIABLE_PATTERN: &str = "((?s).*)";

/// Ant-style path matcher.
///
/// * `?` matches exactly one character
/// * `*` matches zero or more characters within a segment
/// * `**` matches zero or more segments
/// * `{name}` matches within a segment and captures it as a template variable;
///   `{name:[a-z]+}` restricts the capture with a regular expression
///
/// Tokenized patterns and compiled segment matchers are cached. Once more than
/// the configured number of distinct patterns has been seen the caches are cleared
/// and caching stays off, which protects against unbounded growth when patterns are
/// built dynamically.
///
/// The matcher is safe to share between threads.
#[derive(Debug)]
pub struct AntPathMatcher {
    path_separator: String,
    case_sensitive: bool,
    trim_tokens: bool,
    cache_limit: usize,
    cache_patterns: AtomicBool,
    tokenized_pattern_cache: DashMap<String, Arc<[String]>>,
    segment_matcher_cache: DashMap<String, Arc<SegmentMatcher>>,
}

impl Default for AntPathMatcher {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl AntPathMatcher {
    /// Creates a matcher with the default `/` separator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matcher from the filter section of the configuration.
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        let path_separator = if config.path_separator.is_empty() {
            "/".to_string()
        } else {
            config.path_separator.clone()
        };
        Self {
            path_separator,
            case_sensitive: config.case_sensitive,
            trim_tokens: config.trim_tokens,
            cache_limit: config.pattern_cache_limit,
            cache_patterns: AtomicBool::new(true),
            tokenized_pattern_cache: DashMap::new(),
            segment_matcher_cache: DashMap::new(),
        }
    }

    /// Uses `separator` between path segments. An empty separator keeps `/`.
    #[must_use]
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if !separator.is_empty() {
            self.path_separator = separator;
        }
        self
    }

    /// Enables or disables case-sensitive matching.
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Enables or disables trimming of whitespace around tokens.
    #[must_use]
    pub fn with_trim_tokens(mut self, trim_tokens: bool) -> Self {
        self.trim_tokens = trim_tokens;
        self
    }

    /// The segment separator.
    #[must_use]
    pub fn path_separator(&self) -> &str {
        &self.path_separator
    }

    /// Whether `path` contains wildcard or template syntax.
    #[must_use]
    pub fn is_pattern(&self, path: &str) -> bool {
        let mut uri_var = false;
        for c in path.chars() {
            match c {
                '*' | '?' => return true,
                '{' => uri_var = true,
                '}' if uri_var => return true,
                _ => {}
            }
        }
        false
    }

    /// Whether `path` matches `pattern` in full.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] when a template variable carries a
    /// regular expression that does not compile.
    pub fn matches(&self, pattern: &str, path: &str) -> Result<bool, FilterError> {
        self.do_match(pattern, path, true, None)
    }

    /// Whether `pattern` could still match some extension of `path`.
    ///
    /// # Errors
    ///
    /// See [`AntPathMatcher::matches`].
    pub fn match_start(&self, pattern: &str, path: &str) -> Result<bool, FilterError> {
        self.do_match(pattern, path, false, None)
    }

    /// The part of `path` covered by the wildcard portion of `pattern`.
    ///
    /// Assumes `path` matches `pattern`. For `/docs/*` and `/docs/cvs/commit` this is
    /// `cvs/commit`; a pattern without wildcards yields an empty string.
    #[must_use]
    pub fn extract_path_within_pattern(&self, pattern: &str, path: &str) -> String {
        let pattern_parts = self.tokenize(pattern);
        let path_parts = self.tokenize(path);
        let mut builder = String::new();
        let mut path_started = false;

        let mut segment = 0;
        while segment < pattern_parts.len() {
            let pattern_part = &pattern_parts[segment];
            if pattern_part.contains('*') || pattern_part.contains('?') {
                while segment < path_parts.len() {
                    if path_started
                        || (segment == 0 && !pattern.starts_with(self.path_separator.as_str()))
                    {
                        builder.push_str(&self.path_separator);
                    }
                    builder.push_str(&path_parts[segment]);
                    path_started = true;
                    segment += 1;
                }
            }
            segment += 1;
        }
        builder
    }

    /// Captures the `{name}` template variables of `pattern` from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Evaluation`] when `path` does not match `pattern`, and
    /// [`FilterError::InvalidPattern`] when the pattern's regular expressions are invalid
    /// or contain capturing groups of their own.
    pub fn extract_uri_template_variables(
        &self,
        pattern: &str,
        path: &str,
    ) -> Result<HashMap<String, String>, FilterError> {
        let mut variables = HashMap::new();
        if self.do_match(pattern, path, true, Some(&mut variables))? {
            Ok(variables)
        } else {
            Err(FilterError::evaluation(
                path,
                format!("pattern \"{pattern}\" is not a match"),
            ))
        }
    }

    /// Combines two patterns into one, e.g. `/hotels/*` and `/booking` into
    /// `/hotels/booking`, or `/*.html` and `/hotel` into `/hotel.html`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] when both patterns name conflicting
    /// file extensions, such as `/*.html` and `/*.txt`.
    pub fn combine(&self, pattern1: &str, pattern2: &str) -> Result<String, FilterError> {
        let has_text = |s: &str| !s.trim().is_empty();
        match (has_text(pattern1), has_text(pattern2)) {
            (false, false) => return Ok(String::new()),
            (false, true) => return Ok(pattern2.to_string()),
            (true, false) => return Ok(pattern1.to_string()),
            (true, true) => {}
        }

        let pattern1_contains_uri_var = pattern1.contains('{');
        if pattern1 != pattern2 && !pattern1_contains_uri_var && self.matches(pattern1, pattern2)? {
            return Ok(pattern2.to_string());
        }

        let ends_on_wildcard = format!("{}*", self.path_separator);
        if pattern1.ends_with(&ends_on_wildcard) {
            return Ok(self.concat(
                &pattern1[..pattern1.len() - ends_on_wildcard.len()],
                pattern2,
            ));
        }

        let ends_on_double_wildcard = format!("{}**", self.path_separator);
        if pattern1.ends_with(&ends_on_double_wildcard) {
            return Ok(self.concat(pattern1, pattern2));
        }

        let Some(star_dot_pos1) = pattern1.find("*.") else {
            return Ok(self.concat(pattern1, pattern2));
        };
        if pattern1_contains_uri_var || self.path_separator == "." {
            return Ok(self.concat(pattern1, pattern2));
        }

        let ext1 = &pattern1[star_dot_pos1 + 1..];
        let (file2, ext2) = match pattern2.find('.') {
            Some(dot_pos2) => (&pattern2[..dot_pos2], &pattern2[dot_pos2..]),
            None => (pattern2, ""),
        };
        let ext1_all = ext1 == ".*" || ext1.is_empty();
        let ext2_all = ext2 == ".*" || ext2.is_empty();
        if !ext1_all && !ext2_all {
            return Err(FilterError::invalid_pattern(
                format!("{pattern1} + {pattern2}"),
                "cannot combine patterns with different extensions",
            ));
        }
        let ext = if ext1_all { ext2 } else { ext1 };
        Ok(format!("{file2}{ext}"))
    }

    fn concat(&self, path1: &str, path2: &str) -> String {
        let sep = self.path_separator.as_str();
        match (path1.ends_with(sep), path2.starts_with(sep)) {
            (true, true) => format!("{path1}{}", &path2[sep.len()..]),
            (true, false) | (false, true) => format!("{path1}{path2}"),
            (false, false) => format!("{path1}{sep}{path2}"),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn do_match(
        &self,
        pattern: &str,
        path: &str,
        full_match: bool,
        mut variables: Option<&mut HashMap<String, String>>,
    ) -> Result<bool, FilterError> {
        let sep = self.path_separator.as_str();
        if path.starts_with(sep) != pattern.starts_with(sep) {
            return Ok(false);
        }

        let patt_dirs = self.tokenize_pattern(pattern);
        let path_dirs = self.tokenize(path);
        trace!(pattern, path, "Matching path against pattern");

        let mut patt_idx_start: isize = 0;
        let mut patt_idx_end: isize = patt_dirs.len() as isize - 1;
        let mut path_idx_start: isize = 0;
        let mut path_idx_end: isize = path_dirs.len() as isize - 1;

        let patt = |i: isize| patt_dirs[i as usize].as_str();
        let dir = |i: isize| path_dirs[i as usize].as_str();

        // Match all elements up to the first **
        while patt_idx_start <= patt_idx_end && path_idx_start <= path_idx_end {
            let patt_dir = patt(patt_idx_start);
            if patt_dir == "**" {
                break;
            }
            if !self.match_strings(patt_dir, dir(path_idx_start), variables.as_deref_mut())? {
                return Ok(false);
            }
            patt_idx_start += 1;
            path_idx_start += 1;
        }

        if path_idx_start > path_idx_end {
            // Path is exhausted, only match if rest of pattern is * or **'s
            if patt_idx_start > patt_idx_end {
                return Ok(pattern.ends_with(sep) == path.ends_with(sep));
            }
            if !full_match {
                return Ok(true);
            }
            if patt_idx_start == patt_idx_end && patt(patt_idx_start) == "*" && path.ends_with(sep) {
                return Ok(true);
            }
            return Ok((patt_idx_start..=patt_idx_end).all(|i| patt(i) == "**"));
        } else if patt_idx_start > patt_idx_end {
            // Path not exhausted, but pattern is.
            return Ok(false);
        } else if !full_match && patt(patt_idx_start) == "**" {
            // Path start definitely matches due to "**" part in pattern.
            return Ok(true);
        }

        // up to last '**'
        while patt_idx_start <= patt_idx_end && path_idx_start <= path_idx_end {
            let patt_dir = patt(patt_idx_end);
            if patt_dir == "**" {
                break;
            }
            if !self.match_strings(patt_dir, dir(path_idx_end), variables.as_deref_mut())? {
                return Ok(false);
            }
            patt_idx_end -= 1;
            path_idx_end -= 1;
        }
        if path_idx_start > path_idx_end {
            return Ok((patt_idx_start..=patt_idx_end).all(|i| patt(i) == "**"));
        }

        while patt_idx_start != patt_idx_end && path_idx_start <= path_idx_end {
            let patt_idx_tmp = ((patt_idx_start + 1)..=patt_idx_end)
                .find(|&i| patt(i) == "**")
                .unwrap_or(-1);
            if patt_idx_tmp == patt_idx_start + 1 {
                // '**/**' situation, so skip one
                patt_idx_start += 1;
                continue;
            }
            // Find the pattern between patt_idx_start & patt_idx_tmp in the path
            // between path_idx_start & path_idx_end
            let pat_length = patt_idx_tmp - patt_idx_start - 1;
            let str_length = path_idx_end - path_idx_start + 1;
            let mut found_idx: isize = -1;

            'str_loop: for i in 0..=(str_length - pat_length) {
                for j in 0..pat_length {
                    let sub_pat = patt(patt_idx_start + j + 1);
                    let sub_str = dir(path_idx_start + i + j);
                    if !self.match_strings(sub_pat, sub_str, variables.as_deref_mut())? {
                        continue 'str_loop;
                    }
                }
                found_idx = path_idx_start + i;
                break;
            }

            if found_idx == -1 {
                return Ok(false);
            }

            patt_idx_start = patt_idx_tmp;
            path_idx_start = found_idx + pat_length;
        }

        Ok((patt_idx_start..=patt_idx_end).all(|i| patt(i) == "**"))
    }

    fn tokenize(&self, path: &str) -> Vec<String> {
        path.split(self.path_separator.as_str())
            .map(|token| if self.trim_tokens { token.trim() } else { token })
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn tokenize_pattern(&self, pattern: &str) -> Arc<[String]> {
        let caching = self.cache_patterns.load(Ordering::Relaxed);
        if caching {
            if let Some(tokens) = self.tokenized_pattern_cache.get(pattern) {
                return Arc::clone(tokens.value());
            }
        }
        let tokens: Arc<[String]> = self.tokenize(pattern).into();
        if caching {
            if self.tokenized_pattern_cache.len() >= self.cache_limit {
                self.deactivate_pattern_cache();
                return tokens;
            }
            self.tokenized_pattern_cache
                .insert(pattern.to_string(), Arc::clone(&tokens));
        }
        tokens
    }

    fn segment_matcher(&self, pattern: &str) -> Result<Arc<SegmentMatcher>, FilterError> {
        let caching = self.cache_patterns.load(Ordering::Relaxed);
        if caching {
            if let Some(matcher) = self.segment_matcher_cache.get(pattern) {
                return Ok(Arc::clone(matcher.value()));
            }
        }
        let matcher = Arc::new(SegmentMatcher::compile(pattern, self.case_sensitive)?);
        if caching {
            if self.segment_matcher_cache.len() >= self.cache_limit {
                self.deactivate_pattern_cache();
                return Ok(matcher);
            }
            self.segment_matcher_cache
                .insert(pattern.to_string(), Arc::clone(&matcher));
        }
        Ok(matcher)
    }

    fn deactivate_pattern_cache(&self) {
        debug!(limit = self.cache_limit, "Pattern cache limit reached, disabling cache");
        self.cache_patterns.store(false, Ordering::Relaxed);
        self.tokenized_pattern_cache.clear();
        self.segment_matcher_cache.clear();
    }

    fn match_strings(
        &self,
        pattern: &str,
        segment: &str,
        variables: Option<&mut HashMap<String, String>>,
    ) -> Result<bool, FilterError> {
        self.segment_matcher(pattern)?.matches(segment, variables)
    }
}

/// Matches one path segment against one pattern segment.
#[derive(Debug)]
struct SegmentMatcher {
    raw: String,
    case_sensitive: bool,
    kind: SegmentKind,
}

#[derive(Debug)]
enum SegmentKind {
    Exact,
    Glob {
        regex: Regex,
        variable_names: Vec<String>,
    },
}

impl SegmentMatcher {
    fn compile(pattern: &str, case_sensitive: bool) -> Result<Self, FilterError> {
        let mut regex_source = String::from("^(?:");
        let mut variable_names = Vec::new();
        let mut end = 0;
        for captures in GLOB_PATTERN.captures_iter(pattern) {
            let Some(found) = captures.get(0) else {
                continue;
            };
            regex_source.push_str(&regex::escape(&pattern[end..found.start()]));
            match found.as_str() {
                "?" => regex_source.push('.'),
                "*" => regex_source.push_str(".*"),
                placeholder => {
                    let inner = &placeholder[1..placeholder.len() - 1];
                    match inner.split_once(':') {
                        None => {
                            regex_source.push_str(DEFAULT_VARIABLE_PATTERN);
                            variable_names.push(inner.to_string());
                        }
                        Some((name, variable_pattern)) => {
                            regex_source.push('(');
                            regex_source.push_str(variable_pattern);
                            regex_source.push(')');
                            variable_names.push(name.to_string());
                        }
                    }
                }
            }
            end = found.end();
        }

        if end == 0 {
            return Ok(Self {
                raw: pattern.to_string(),
                case_sensitive,
                kind: SegmentKind::Exact,
            });
        }

        regex_source.push_str(&regex::escape(&pattern[end..]));
        regex_source.push_str(")$");
        let regex = RegexBuilder::new(&regex_source)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| FilterError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            raw: pattern.to_string(),
            case_sensitive,
            kind: SegmentKind::Glob {
                regex,
                variable_names,
            },
        })
    }

    fn matches(
        &self,
        segment: &str,
        variables: Option<&mut HashMap<String, String>>,
    ) -> Result<bool, FilterError> {
        match &self.kind {
            SegmentKind::Exact => Ok(if self.case_sensitive {
                self.raw == segment
            } else {
                self.raw.to_lowercase() == segment.to_lowercase()
            }),
            SegmentKind::Glob {
                regex,
                variable_names,
            } => {
                let Some(captures) = regex.captures(segment) else {
                    return Ok(false);
                };
                if let Some(variables) = variables {
                    if variable_names.len() != captures.len() - 1 {
                        return Err(FilterError::invalid_pattern(
                            &self.raw,
                            "the number of capturing groups does not match the number of \
                             template variables; use non-capturing groups in variable patterns",
                        ));
                    }
                    for (name, value) in variable_names.iter().zip(captures.iter().skip(1)) {
                        variables.insert(
                            name.clone(),
                            value.map(|m| m.as_str().to_string()).unwrap_or_default(),
                        );
                    }
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_segments_skip_regex_compilation() {
        let matcher = SegmentMatcher::compile("report.txt", true).unwrap();
        assert!(matches!(matcher.kind, SegmentKind::Exact));
        let glob = SegmentMatcher::compile("*.txt", true).unwrap();
        assert!(matches!(glob.kind, SegmentKind::Glob { .. }));
    }

    #[test]
    fn regex_metacharacters_in_literals_are_escaped() {
        let matcher = AntPathMatcher::new();
        assert!(matcher.matches("/a+b/*.txt", "/a+b/c.txt").unwrap());
        assert!(!matcher.matches("/a+b/*.txt", "/aab/c.txt").unwrap());
    }

    #[test]
    fn cache_switches_off_past_the_limit() {
        let config = FilterConfig {
            pattern_cache_limit: 2,
            ..FilterConfig::default()
        };
        let matcher = AntPathMatcher::from_config(&config);
        for i in 0..5 {
            let pattern = format!("/p{i}/*");
            assert!(matcher.matches(&pattern, &format!("/p{i}/x")).unwrap());
        }
        assert!(!matcher.cache_patterns.load(Ordering::Relaxed));
        assert!(matcher.tokenized_pattern_cache.is_empty());
    }
}
