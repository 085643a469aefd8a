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
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use junction_core::prelude::*;
use parking_lot::Mutex;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests, writing to `logs/junction_tests.txt`.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "junction_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("trace")
            .add_directive("junction_core::filter=trace".parse().unwrap())
            .add_directive("junction_core::event=trace".parse().unwrap())
            .add_directive("tokio=info".parse().unwrap())
            .add_directive(tracing_subscriber::filter::LevelFilter::TRACE.into());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Subscriber that records every event it receives.
#[derive(Clone, Default)]
pub struct RecordingSubscriber {
    pub events: Arc<Mutex<Vec<Arc<IntegrationEvent>>>>,
}

impl RecordingSubscriber {
    pub fn received(&self) -> Vec<Arc<IntegrationEvent>> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventSubscriber for RecordingSubscriber {
    async fn on_event(&self, event: Arc<IntegrationEvent>) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Publisher that keeps events in memory instead of distributing them.
#[derive(Clone, Default)]
pub struct CollectingPublisher {
    pub events: Arc<Mutex<Vec<IntegrationEvent>>>,
}

impl CollectingPublisher {
    pub fn published(&self) -> Vec<IntegrationEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher for CollectingPublisher {
    fn publish(&self, event: IntegrationEvent) -> usize {
        self.events.lock().push(event);
        1
    }
}

/// Entry whose path cannot be evaluated when it is `Broken`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TestEntry {
    Named(String),
    Broken,
}

impl PathEntry for TestEntry {
    fn entry_path(&self) -> Result<std::borrow::Cow<'_, str>, FilterError> {
        match self {
            TestEntry::Named(name) => Ok(name.as_str().into()),
            TestEntry::Broken => Err(probe_error()),
        }
    }
}

fn probe_error() -> FilterError {
    FilterError::Evaluation {
        entry: "<broken>".to_string(),
        reason: "entry vanished".to_string(),
    }
}

/// Counts how many times it has been invoked.
#[derive(Debug, Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
