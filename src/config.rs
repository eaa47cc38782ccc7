use crate::classifier::{ClassifierConfig, SelectionStrategy};
use crate::error::ClassifyError;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Largest accepted upload (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    FeatureSum,
    Uniform,
}

impl From<StrategyArg> for SelectionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::FeatureSum => SelectionStrategy::FeatureSum,
            StrategyArg::Uniform => SelectionStrategy::Uniform,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "hemavision", version, about = "Blood cell classification demo server")]
pub struct ServerArgs {
    #[arg(long, env = "HEMAVISION_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    #[arg(long, env = "HEMAVISION_STRATEGY", value_enum, default_value = "feature-sum")]
    pub strategy: StrategyArg,

    #[arg(long, env = "HEMAVISION_CONFIDENCE_MIN", help = "Primary confidence lower bound (%)")]
    pub confidence_min: Option<f64>,

    #[arg(long, env = "HEMAVISION_CONFIDENCE_MAX", help = "Primary confidence upper bound (%)")]
    pub confidence_max: Option<f64>,

    #[arg(long, env = "HEMAVISION_LATENCY_MS", default_value_t = 400)]
    pub latency_ms: u64,

    #[arg(long, env = "HEMAVISION_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerArgs {
    /// Build and validate the classifier settings, filling unset bounds from the strategy preset.
    pub fn classifier_config(&self) -> Result<ClassifierConfig, ClassifyError> {
        let strategy = SelectionStrategy::from(self.strategy);
        let (preset_min, preset_max) = strategy.default_confidence_range();
        let config = ClassifierConfig::for_strategy(strategy)
            .with_confidence_range(
                self.confidence_min.unwrap_or(preset_min),
                self.confidence_max.unwrap_or(preset_max),
            )
            .with_latency(Duration::from_millis(self.latency_ms));
        config.validate()?;
        Ok(config)
    }
}
