use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider,
                          CoreMLExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::Session,
    tensor::TensorElementType,
    value::{DynValue, Tensor},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, ModelSource, CROSS_MARK, X};
use crate::detection_runners::inference_backend::InferenceBackend;
use crate::error::DetectError;

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_name: String,
    input_dims: Option<Vec<i64>>,
    output_name: String,
    output_dtype: Option<TensorElementType>,
}

impl OrtEngine {
    /// Loads the model and creates a session. Any failure here is fatal for the detector.
    pub fn new(config: &ConfigOrt) -> Result<Self, DetectError> {
        Self::build(config).map_err(|e| DetectError::ModelLoad(format!("{:#}", e)))
    }

    fn build(config: &ConfigOrt) -> Result<Self> {
        if !config.ort_lib_path.is_empty() {
            let ort_init = ort::init_from(&config.ort_lib_path);
            match ort_init.commit() {
                Ok(_) => {},
                Err(e) => {
                    return Err(anyhow::anyhow!("Failed to commit ORT: {:?}", e));
                }
            };
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(&mut builder, device_id, config.trt_fp16_enable, config.trt_engine_cache_enable)
                    .unwrap_or_else(|err| {
                        log::warn!("{err}, Using cpu");
                        device = InferenceDevice::CPU;
                    })
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CoreML(_) => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let level = if config.optimize {
            GraphOptimizationLevel::Level3
        } else {
            GraphOptimizationLevel::Disable
        };
        let mut builder = builder
            .with_optimization_level(level)
            .map_err(|e| anyhow::anyhow!("Failed to set optimization level: {e}"))?;
        if let Some(n) = config.intra_threads {
            builder = builder
                .with_intra_threads(n)
                .map_err(|e| anyhow::anyhow!("Failed to set intra threads: {e}"))?;
        }

        let session = match &config.model {
            ModelSource::File(path) => builder
                .commit_from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load model {}: {e}", path))?,
            ModelSource::Memory(bytes) => builder
                .commit_from_memory(bytes)
                .map_err(|e| anyhow::anyhow!("Failed to load model from memory: {e}"))?,
        };

        let input = session.inputs.first()
            .ok_or_else(|| anyhow::anyhow!("Model declares no inputs"))?;
        let output = session.outputs.first()
            .ok_or_else(|| anyhow::anyhow!("Model declares no outputs"))?;
        let input_name = input.name.clone();
        let input_dims = input.input_type.tensor_shape().map(|shape| shape.to_vec());
        let output_name = output.name.clone();
        let output_dtype = output.output_type.tensor_type();

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} | Output: {} {:?}",
            device, input_name, input_dims, output_name, output_dtype,
        );

        Ok(Self {
            session,
            device,
            input_name,
            input_dims,
            output_name,
            output_dtype,
        })
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache");
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CoreMLExecutionProvider::default()
            .with_subgraphs(false);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CoreML initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn engine_run(&mut self, x: X) -> Result<X> {
        let input = Tensor::from_array(x.into_inner())?;
        let outputs = self.session.run(ort::inputs![self.input_name.as_str() => input])?;
        let y = Self::tensor_postprocess(&outputs[self.output_name.as_str()], self.output_dtype)?;
        Ok(X::from(y))
    }

    fn tensor_postprocess(x: &DynValue, dtype: Option<TensorElementType>) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + ort::tensor::PrimitiveTensorElementType,
        {
            let view = x.try_extract_array::<T>()?;
            Ok(view.mapv(map_fn))
        }
        match dtype {
            Some(TensorElementType::Float32) | None => _extract_and_convert::<f32>(x, |x| x),
            Some(TensorElementType::Float16) => _extract_and_convert::<f16>(x, f16::to_f32),
            Some(TensorElementType::Bfloat16) => _extract_and_convert::<bf16>(x, bf16::to_f32),
            Some(TensorElementType::Float64) => _extract_and_convert::<f64>(x, |x| x as f32),
            Some(other) => Err(anyhow::anyhow!("Unsupported ort output type: {:?}", other)),
        }
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl InferenceBackend for OrtEngine {
    fn input_dims(&self) -> Option<Vec<i64>> {
        self.input_dims.clone()
    }

    fn run(&mut self, x: X) -> crate::error::Result<X> {
        // Keep the runtime's message intact, the adapter parses shape mismatches out of it.
        self.engine_run(x).map_err(|e| DetectError::Inference(e.to_string()))
    }

    fn class_names(&self) -> Option<Vec<String>> {
        self.try_fetch("names")
            .and_then(|names| crate::data::ClassNames::from_metadata(&names))
            .map(|names| names.names().to_vec())
    }
}
