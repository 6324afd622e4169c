use anyhow::Result;

use crate::detect::blob::Blob;
use crate::detect::decode::RawOutput;

/// Execution targets an engine can run on.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionTarget {
    Cpu,
    Accelerated,
}

/// Object-detection inference engine.
///
/// The engine is a black box: it receives a preprocessed blob and returns the
/// raw detection tensor. It must not keep the blob beyond the `forward` call.
/// Model loading happens before the first frame, so construction failures
/// never surface here.
pub trait InferenceEngine: Send {
    /// Engine identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the engine can execute on `target`.
    fn supports(&self, target: ExecutionTarget) -> bool;

    /// Run one blocking forward pass.
    fn forward(&mut self, blob: &Blob) -> Result<RawOutput>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports(&self, target: ExecutionTarget) -> bool {
        (**self).supports(target)
    }

    fn forward(&mut self, blob: &Blob) -> Result<RawOutput> {
        (**self).forward(blob)
    }

    fn warm_up(&mut self) -> Result<()> {
        (**self).warm_up()
    }
}
