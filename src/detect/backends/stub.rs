use std::collections::VecDeque;

use anyhow::{anyhow, Result};

use crate::detect::backend::{ExecutionTarget, InferenceEngine};
use crate::detect::blob::Blob;
use crate::detect::decode::RawOutput;

/// Scripted engine for tests and synthetic runs.
///
/// Queued outputs are returned one per `forward` call; once the queue is
/// drained the fallback output is returned (empty by default).
pub struct StubEngine {
    queue: VecDeque<RawOutput>,
    fallback: RawOutput,
    failure: Option<String>,
    calls: u64,
    last_blob_shape: Option<[usize; 4]>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::repeating(RawOutput::empty())
    }

    /// Return the same output on every call.
    pub fn repeating(output: RawOutput) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: output,
            failure: None,
            calls: 0,
            last_blob_shape: None,
        }
    }

    /// Fail every forward pass with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn push(&mut self, output: RawOutput) {
        self.queue.push_back(output);
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn last_blob_shape(&self) -> Option<[usize; 4]> {
        self.last_blob_shape
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn supports(&self, target: ExecutionTarget) -> bool {
        matches!(target, ExecutionTarget::Cpu)
    }

    fn forward(&mut self, blob: &Blob) -> Result<RawOutput> {
        self.calls += 1;
        self.last_blob_shape = Some(blob.shape);
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        Ok(self
            .queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> Blob {
        Blob {
            shape: [1, 3, 1, 1],
            data: vec![0.0; 3],
        }
    }

    #[test]
    fn stub_engine_drains_queue_then_falls_back() {
        let mut engine = StubEngine::new();
        let scripted = RawOutput::from_rows(&[[0.0, 15.0, 0.9, 0.0, 0.0, 1.0, 1.0]]);
        engine.push(scripted.clone());

        assert_eq!(engine.forward(&blob()).unwrap(), scripted);
        assert_eq!(engine.forward(&blob()).unwrap(), RawOutput::empty());
        assert_eq!(engine.calls(), 2);
        assert_eq!(engine.last_blob_shape(), Some([1, 3, 1, 1]));
    }

    #[test]
    fn stub_engine_is_cpu_only() {
        let engine = StubEngine::new();
        assert!(engine.supports(ExecutionTarget::Cpu));
        assert!(!engine.supports(ExecutionTarget::Accelerated));
    }
}
