#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::{ExecutionTarget, InferenceEngine};
use crate::detect::blob::Blob;
use crate::detect::decode::RawOutput;

/// Tract-based engine for ONNX exports of MobileNet-SSD.
///
/// The model must take a `[1, 3, size, size]` f32 blob and produce the SSD
/// detection-output tensor `[1, 1, N, 7]`. Runs on the CPU only.
pub struct TractEngine {
    model: TypedRunnableModel<TypedModel>,
    input_size: usize,
}

impl TractEngine {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn load<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let input_size = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, input_size, input_size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self { model, input_size })
    }

    fn build_input(&self, blob: &Blob) -> Result<Tensor> {
        let expected = [1, 3, self.input_size, self.input_size];
        if blob.shape != expected {
            return Err(anyhow!(
                "blob shape {:?} does not match model input {:?}",
                blob.shape,
                expected
            ));
        }
        let input = tract_ndarray::Array4::from_shape_vec(
            (1, 3, self.input_size, self.input_size),
            blob.data.clone(),
        )
        .context("blob data does not fill the model input")?;
        Ok(input.into_tensor())
    }
}

impl InferenceEngine for TractEngine {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn supports(&self, target: ExecutionTarget) -> bool {
        matches!(target, ExecutionTarget::Cpu)
    }

    fn forward(&mut self, blob: &Blob) -> Result<RawOutput> {
        let input = self.build_input(blob)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;

        Ok(RawOutput {
            shape: view.shape().to_vec(),
            data: view.iter().copied().collect(),
        })
    }
}
