//! Trace sink для build pipeline.
//!
//! [`TracePolicy`] хранится в policy list как default policy kind'а `Trace`.
//! Если её нет, strategies ничего не форматируют.

use std::fmt;

use parking_lot::Mutex;

pub trait TracePolicy: Send + Sync {
    fn trace(&self, message: fmt::Arguments<'_>);
}

/// Пересылает сообщения в `tracing` (target `objectbuilder::trace`)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracePolicy;

impl TracePolicy for TracingTracePolicy {
    fn trace(&self, message: fmt::Arguments<'_>) {
        tracing::debug!(target: "objectbuilder::trace", "{}", message);
    }
}

/// Собирает сообщения в памяти
#[derive(Debug, Default)]
pub struct RecordingTracePolicy {
    messages: Mutex<Vec<String>>,
}

impl RecordingTracePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl TracePolicy for RecordingTracePolicy {
    fn trace(&self, message: fmt::Arguments<'_>) {
        self.messages.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_policy_keeps_order() {
        let policy = RecordingTracePolicy::new();
        policy.trace(format_args!("first {}", 1));
        policy.trace(format_args!("second"));

        assert_eq!(policy.messages(), vec!["first 1".to_string(), "second".to_string()]);

        policy.clear();
        assert!(policy.messages().is_empty());
    }
}
