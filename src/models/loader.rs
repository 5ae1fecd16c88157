//! ONNX model loader

use crate::config::ModelsConfig;
use crate::error::ScoringError;
use crate::models::ProbabilityModel;
use crate::schema::FeatureSchema;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use tracing::{debug, info};

/// Loaded ONNX model with its training schema
pub struct LoadedModel {
    /// Model name ("treatment" or "control")
    name: String,
    /// ONNX Runtime session
    session: Session,
    /// Input name for the model
    input_name: String,
    /// Output name for probabilities
    output_name: String,
    /// Ordered feature names from the schema sidecar
    schema: FeatureSchema,
}

impl LoadedModel {
    fn run(&mut self, features: &[f32]) -> Result<f64, ScoringError> {
        use ort::value::Tensor;

        // Input tensor shape is [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec())).map_err(|e| {
            ScoringError::inference(&self.name, format!("failed to create input tensor: {}", e))
        })?;

        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| ScoringError::inference(&self.name, e))?;

        Self::extract_probability(&self.name, &self.output_name, &outputs)
    }

    /// Extract the positive-class probability from model output.
    /// Handles tensor outputs (XGBoost, RandomForest) and seq(map)
    /// outputs (CatBoost, LightGBM ONNX exports).
    fn extract_probability(
        name: &str,
        output_name: &str,
        outputs: &ort::session::SessionOutputs,
    ) -> Result<f64, ScoringError> {
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                return Self::positive_prob_from_tensor(name, &shape, data);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::extract_from_sequence_map(name, output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan all outputs, skipping the class-label output
        for (out_name, output) in outputs.iter() {
            if out_name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                debug!(model = %name, output = %out_name, "Extracted probability from fallback output");
                return Self::positive_prob_from_tensor(name, &shape, data);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::extract_from_sequence_map(name, &output) {
                    return Ok(prob);
                }
            }
        }

        Err(ScoringError::inference(
            name,
            "no probability output could be extracted",
        ))
    }

    /// Extract probability from seq(map(int64, float)) output
    fn extract_from_sequence_map(
        name: &str,
        output: &ort::value::DynValue,
    ) -> Result<f64, ScoringError> {
        let allocator = Allocator::default();

        let sequence = output.downcast_ref::<DynSequenceValueType>().map_err(|e| {
            ScoringError::inference(name, format!("failed to downcast to sequence: {}", e))
        })?;

        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| ScoringError::inference(name, e))?;

        // Batch size is 1, so the first map holds the class probabilities
        let map_value = maps
            .first()
            .ok_or_else(|| ScoringError::inference(name, "empty output sequence"))?;

        let kv_pairs = map_value
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| ScoringError::inference(name, e))?;

        // Class 1 carries the conversion probability
        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                return Ok(*prob as f64);
            }
        }
        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        Err(ScoringError::inference(
            name,
            "no class probability in output map",
        ))
    }

    /// Extract the positive-class probability from tensor data
    fn positive_prob_from_tensor(
        name: &str,
        shape: &ort::tensor::Shape,
        data: &[f32],
    ) -> Result<f64, ScoringError> {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes] - positive class is index 1
                return Ok(data[1] as f64);
            } else if num_classes == 1 {
                // [batch, 1] - single probability
                return Ok(data[0] as f64);
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return Ok(data[1] as f64);
            } else if num_classes == 1 {
                return Ok(data[0] as f64);
            }
        }

        data.last().map(|&v| v as f64).ok_or_else(|| {
            ScoringError::inference(name, "empty probability tensor")
        })
    }
}

impl ProbabilityModel for LoadedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_probability(&mut self, features: &[f32]) -> Result<f64, ScoringError> {
        self.run(features)
    }
}

/// Loader for the treatment/control model pair
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self, ScoringError> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self, ScoringError> {
        // Initialize ONNX Runtime
        ort::init()
            .commit()
            .map_err(|e| ScoringError::model_load("onnxruntime", e))?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX model and its schema sidecar
    /// (`<model>.schema.json` next to the artifact).
    pub fn load_model<P: AsRef<Path>>(
        &self,
        path: P,
        name: &str,
    ) -> Result<LoadedModel, ScoringError> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let schema = FeatureSchema::from_file(path.with_extension("schema.json"))?;

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(self.onnx_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                ScoringError::model_load(name, format!("{} ({})", e, path.display()))
            })?;

        // Get input/output names
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features = schema.len(),
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
            schema,
        })
    }

    /// Load the treatment and control models and check their schemas agree.
    ///
    /// Both arms must have been trained on the same column set; a mismatch
    /// would silently feed the control model misaligned features, so it is
    /// rejected at load time.
    pub fn load_pair(&self, config: &ModelsConfig) -> Result<ModelPair, ScoringError> {
        let dir = Path::new(&config.models_dir);
        let treatment = self.load_model(dir.join(&config.treatment_model), "treatment")?;
        let control = self.load_model(dir.join(&config.control_model), "control")?;

        if treatment.schema() != control.schema() {
            return Err(ScoringError::model_load(
                "control",
                "treatment and control model schemas differ",
            ));
        }

        info!(features = treatment.schema().len(), "Model pair loaded");

        Ok(ModelPair { treatment, control })
    }
}

/// The treatment and control models with their shared training schema
pub struct ModelPair {
    pub treatment: LoadedModel,
    pub control: LoadedModel,
}

impl ModelPair {
    /// The shared training schema (asserted equal at load time)
    pub fn schema(&self) -> &FeatureSchema {
        self.treatment.schema()
    }
}
