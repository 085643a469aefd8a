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

#![forbid(unsafe_code)]

//! Test support for Junction.
//!
//! Provides the [`junction_test`](prelude::junction_test) attribute, which runs an
//! `async fn` test returning a `Result` on a dedicated multi-thread Tokio runtime and
//! surfaces panics from background tasks on the test thread.

/// Re-exports used by the code `#[junction_test]` expands to.
#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}

/// Commonly used test items.
pub mod prelude {
    pub use junction_test_macro::junction_test;
}
