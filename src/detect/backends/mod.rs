pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod tract;

use anyhow::Result;

pub use stub::StubEngine;

#[cfg(feature = "backend-tract")]
pub use tract::TractEngine;

use crate::config::MonitorConfig;
use crate::detect::backend::{ExecutionTarget, InferenceEngine};

/// Load the configured model. Failure here is fatal and happens before the
/// frame loop starts.
pub fn open_engine(config: &MonitorConfig) -> Result<Box<dyn InferenceEngine>> {
    #[cfg(feature = "backend-tract")]
    {
        log::info!("loading detector model from {}", config.model_path.display());
        let mut engine = TractEngine::load(&config.model_path, config.blob.size)?;
        engine.warm_up()?;
        check_execution_target(&engine, config);
        Ok(Box::new(engine))
    }
    #[cfg(not(feature = "backend-tract"))]
    {
        Err(anyhow::anyhow!(
            "model inference for {} requires the backend-tract feature",
            config.model_path.display()
        ))
    }
}

/// Warn when accelerated inference is requested but the engine can only run
/// on the CPU. Returns the target the engine will actually use.
pub fn check_execution_target<E: InferenceEngine + ?Sized>(
    engine: &E,
    config: &MonitorConfig,
) -> ExecutionTarget {
    if config.use_accelerated_inference {
        if engine.supports(ExecutionTarget::Accelerated) {
            log::info!("{}: using accelerated inference", engine.name());
            return ExecutionTarget::Accelerated;
        }
        log::warn!(
            "{}: accelerated inference requested but unsupported, running on CPU",
            engine.name()
        );
    }
    ExecutionTarget::Cpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerated_request_falls_back_to_cpu() {
        let config = MonitorConfig {
            use_accelerated_inference: true,
            ..MonitorConfig::default()
        };
        let engine = StubEngine::new();
        assert_eq!(check_execution_target(&engine, &config), ExecutionTarget::Cpu);
    }

    #[cfg(not(feature = "backend-tract"))]
    #[test]
    fn open_engine_requires_backend_feature() {
        let err = open_engine(&MonitorConfig::default()).err().unwrap();
        assert!(err.to_string().contains("backend-tract"));
    }
}
