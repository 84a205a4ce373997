//! Telemetry sinks for the allocation runtime.

use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_event_bus::{EventPublisher, EventRecord};
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use tokio::runtime::Handle;
use uuid::Uuid;

/// Builder for allocation telemetry sinks.
pub struct AllocationTelemetryBuilder {
    component: String,
    log_path: Option<PathBuf>,
    event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl AllocationTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            log_path: None,
            event_publisher: None,
        }
    }

    /// Sets the JSON-lines log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the event publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<AllocationTelemetry> {
        AllocationTelemetry::new(self.component, self.log_path, self.event_publisher)
    }
}

/// Telemetry handle shared across allocation components.
#[derive(Clone)]
pub struct AllocationTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for AllocationTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationTelemetry")
            .field("component", &self.inner.component)
            .finish()
    }
}

struct TelemetryInner {
    component: String,
    logger: Option<JsonLogger>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl AllocationTelemetry {
    fn new(
        component: impl Into<String>,
        log_path: Option<PathBuf>,
        publisher: Option<Arc<dyn EventPublisher>>,
    ) -> Result<Self> {
        let logger = if let Some(path) = log_path {
            Some(JsonLogger::new(path)?)
        } else {
            None
        };
        Ok(Self {
            inner: Arc::new(TelemetryInner {
                component: component.into(),
                logger,
                publisher,
            }),
        })
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder(component: impl Into<String>) -> AllocationTelemetryBuilder {
        AllocationTelemetryBuilder::new(component)
    }

    /// Logs structured metadata.
    pub fn log(&self, level: LogLevel, message: &str, fields: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let mut record = LogRecord::new(&self.inner.component, level, message);
            if let Some(object) = fields.as_object() {
                record.fields = object.clone();
            }
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Emits a lifecycle event on the bus.
    pub fn event(&self, kind: &str, payload: Value) -> Result<()> {
        if let Some(publisher) = &self.inner.publisher {
            let record = EventRecord {
                id: format!("evt-{}", Uuid::new_v4()),
                source: self.inner.component.clone(),
                kind: kind.into(),
                at: chrono::Utc::now().to_rfc3339(),
                payload,
            };
            if let Ok(handle) = Handle::try_current() {
                let publisher = Arc::clone(publisher);
                handle.spawn(async move {
                    if let Err(err) = publisher.publish(record).await {
                        tracing::warn!("telemetry event publish failed: {err:?}");
                    }
                });
            } else {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(publisher.publish(record))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_event_bus::MemoryEventBus;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_log_and_event() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("allocation.log.jsonl");
        let bus = Arc::new(MemoryEventBus::new(16));
        let telemetry = AllocationTelemetry::builder("allocation.tests")
            .log_path(&path)
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        telemetry
            .log(
                LogLevel::Info,
                "allocation.plan_ready",
                json!({ "resources": 4 }),
            )
            .unwrap();
        telemetry
            .event("allocation.plan_ready", json!({ "risk": "low" }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("allocation.plan_ready"));
        assert_eq!(bus.snapshot().len(), 1);
    }
}
