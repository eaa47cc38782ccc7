//! Mock blood cell classifier.
//!
//! Produces a plausible-looking classification without reading the image:
//! a primary label is picked (uniformly, or from a synthetic feature vector),
//! given a high confidence, and the remaining mass is spread over the other
//! labels before normalizing to 100%.

use crate::error::ClassifyError;
use crate::models::{
    CellType, CellTypeInfo, ClassificationResult, Prediction, CELL_TYPES, MODEL_VERSION,
    PROCESSING_TIME,
};
use ndarray::Array1;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, error, info};

/// Length of the synthetic feature vector (MobileNetV2 pooled output).
pub const FEATURE_DIM: usize = 1280;

/// Simulated model load plus feature extraction time.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(400);

const SHARE_FLOOR: f64 = 0.1;
const SECONDARY_BASE: f64 = 2.0;
const SECONDARY_SPREAD: f64 = 6.0;
const FEATURE_NOISE: f32 = 0.3;

/// How the primary label is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Uniform draw over the label table.
    Uniform,
    /// Index derived from the L1 norm of a noisy synthetic feature vector.
    #[default]
    FeatureSum,
}

impl SelectionStrategy {
    /// Primary confidence bounds `[min, max)` used when none are configured.
    pub fn default_confidence_range(self) -> (f64, f64) {
        match self {
            SelectionStrategy::Uniform => (75.0, 97.0),
            SelectionStrategy::FeatureSum => (85.0, 98.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub strategy: SelectionStrategy,
    /// Lower bound of the primary confidence, in percent.
    pub confidence_min: f64,
    /// Upper bound (exclusive unless equal to `confidence_min`).
    pub confidence_max: f64,
    /// Artificial delay before a result is produced. Zero skips the timer.
    pub latency: Duration,
}

impl ClassifierConfig {
    pub fn for_strategy(strategy: SelectionStrategy) -> Self {
        let (confidence_min, confidence_max) = strategy.default_confidence_range();
        Self {
            strategy,
            confidence_min,
            confidence_max,
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_confidence_range(mut self, min: f64, max: f64) -> Self {
        self.confidence_min = min;
        self.confidence_max = max;
        self
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let (min, max) = (self.confidence_min, self.confidence_max);
        if !min.is_finite() || !max.is_finite() {
            return Err(ClassifyError::InvalidConfig(
                "confidence bounds must be finite".to_string(),
            ));
        }
        if min <= 0.0 || max >= 100.0 {
            return Err(ClassifyError::InvalidConfig(format!(
                "confidence bounds must lie within (0, 100), got {min}..{max}"
            )));
        }
        if min > max {
            return Err(ClassifyError::InvalidConfig(format!(
                "confidence_min {min} exceeds confidence_max {max}"
            )));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::for_strategy(SelectionStrategy::default())
    }
}

/// Stateless classifier; every call is independent.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    config: ClassifierConfig,
}

impl MockClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[cfg(test)]
    pub(crate) fn unchecked(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify an encoded image after the configured latency.
    ///
    /// The bytes are accepted but never decoded.
    pub async fn classify(&self, image: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        debug!(bytes = image.len(), "starting blood cell classification");
        if !self.config.latency.is_zero() {
            actix_rt::time::sleep(self.config.latency).await;
        }

        let mut rng = rand::thread_rng();
        let result = self.classify_with(image, &mut rng).map_err(|e| {
            error!(error = %e, "classification error");
            match e {
                ClassifyError::ClassificationFailed(_) => e,
                other => ClassifyError::ClassificationFailed(other.to_string()),
            }
        })?;

        info!(
            predicted = %result.predicted_class,
            confidence = result.confidence,
            level = ?result.confidence_level(),
            "classification complete"
        );
        Ok(result)
    }

    /// Synchronous core of [`classify`](Self::classify), driven by the given RNG.
    pub fn classify_with<R: Rng + ?Sized>(
        &self,
        _image: &[u8],
        rng: &mut R,
    ) -> Result<ClassificationResult, ClassifyError> {
        let primary_idx = self.select_primary(rng);
        let primary = CELL_TYPES.get(primary_idx).ok_or_else(|| {
            ClassifyError::ClassificationFailed(format!("label index {primary_idx} not in table"))
        })?;
        let primary_confidence =
            draw_confidence(rng, self.config.confidence_min, self.config.confidence_max);
        debug!(
            primary = %primary.cell_type,
            primary_confidence,
            strategy = ?self.config.strategy,
            "primary label selected"
        );

        let mut shares = allocate_shares(primary_idx, primary_confidence, rng);
        normalize(&mut shares)?;

        let ranked = rank(shares);
        let (predicted_class, confidence) = ranked
            .first()
            .map(|top| (top.cell_type, top.confidence))
            .ok_or_else(|| ClassifyError::ClassificationFailed("empty prediction list".into()))?;
        let info = CellTypeInfo::lookup(predicted_class.name()).ok_or_else(|| {
            ClassifyError::ClassificationFailed(format!("no clinical entry for {predicted_class}"))
        })?;

        Ok(ClassificationResult {
            predicted_class,
            confidence,
            clinical_info: info.clinical_info.to_string(),
            normal_range: info.normal_range.to_string(),
            all_predictions: ranked,
            model_version: MODEL_VERSION.to_string(),
            processing_time: PROCESSING_TIME.to_string(),
        })
    }

    fn select_primary<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = CELL_TYPES.len();
        match self.config.strategy {
            SelectionStrategy::Uniform => rng.gen_range(0..n),
            SelectionStrategy::FeatureSum => feature_index(&extract_features(rng), n),
        }
    }
}

/// Synthetic feature vector: a fixed wave pattern plus per-call noise.
pub fn extract_features<R: Rng + ?Sized>(rng: &mut R) -> Array1<f32> {
    Array1::from_shape_fn(FEATURE_DIM, |i| {
        let x = i as f32;
        let base = (x * 0.1).sin() * (x * 0.05).cos();
        let noise = (rng.gen::<f32>() - 0.5) * FEATURE_NOISE;
        (base + noise).tanh()
    })
}

/// Map a feature vector onto a label index in `0..n`.
pub fn feature_index(features: &Array1<f32>, n: usize) -> usize {
    let l1: f64 = features.iter().map(|v| f64::from(v.abs())).sum();
    ((l1 * 1000.0) % n as f64).floor() as usize
}

fn draw_confidence<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Greedy split of `100 - primary_confidence` over the secondary labels.
///
/// Each secondary gets at least [`SHARE_FLOOR`]; whatever is left after the
/// last label is added to it. The result is not yet normalized.
fn allocate_shares<R: Rng + ?Sized>(
    primary_idx: usize,
    primary_confidence: f64,
    rng: &mut R,
) -> Vec<f64> {
    let n = CELL_TYPES.len();
    let mut shares = vec![0.0; n];
    if let Some(slot) = shares.get_mut(primary_idx) {
        *slot = primary_confidence;
    }

    let remaining = 100.0 - primary_confidence;
    let mut allocated = 0.0;
    let mut last_secondary = None;
    for (i, slot) in shares.iter_mut().enumerate() {
        if i == primary_idx {
            continue;
        }
        let share = if allocated < remaining - 1.0 {
            let reserve = (n - i - 1) as f64;
            let draw = SECONDARY_BASE + rng.gen::<f64>() * SECONDARY_SPREAD;
            (remaining - allocated - reserve).min(draw).max(SHARE_FLOOR)
        } else {
            SHARE_FLOOR
        };
        *slot = share;
        allocated += share;
        last_secondary = Some(i);
    }

    let leftover = remaining - allocated;
    if leftover > 0.0 {
        if let Some(last) = last_secondary {
            shares[last] += leftover;
        }
    }
    shares
}

fn normalize(shares: &mut [f64]) -> Result<(), ClassifyError> {
    let total: f64 = shares.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(ClassifyError::ClassificationFailed(format!(
            "cannot normalize distribution with total {total}"
        )));
    }
    for share in shares.iter_mut() {
        *share = *share / total * 100.0;
    }
    Ok(())
}

/// Round each share and order descending; equal confidences keep table order.
fn rank(shares: Vec<f64>) -> Vec<Prediction> {
    let mut ranked: Vec<Prediction> = CellType::ALL
        .iter()
        .zip(shares)
        .map(|(&cell_type, share)| Prediction {
            cell_type,
            confidence: round_tenth(share),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
