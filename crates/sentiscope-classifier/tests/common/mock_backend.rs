//! Mock inference backend for testing
//!
//! Returns one-hot logits for a configured class index so the classifier can
//! be exercised without model weights.

use candle_core::{Device, Tensor};
use sentiscope_classifier::{InferenceBackend, ATTENTION_MASK, INPUT_IDS};
use sentiscope_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub struct MockBackend {
    index: usize,
    classes: usize,
    outputs_nan: bool,
    call_count: AtomicU32,
    last_shape: Mutex<Option<Vec<usize>>>,
    device: Device,
}

impl MockBackend {
    /// Always predict `index` out of six classes
    pub fn new(index: usize) -> Self {
        Self {
            index,
            classes: 6,
            outputs_nan: false,
            call_count: AtomicU32::new(0),
            last_shape: Mutex::new(None),
            device: Device::Cpu,
        }
    }

    /// Emit a head with a different number of classes
    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = classes;
        self
    }

    /// Emit only NaN scores
    pub fn with_nan_output(mut self) -> Self {
        self.outputs_nan = true;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_shape(&self) -> Option<Vec<usize>> {
        self.last_shape.lock().unwrap().clone()
    }
}

impl InferenceBackend for MockBackend {
    fn predict(&self, inputs: &[(&str, Tensor)]) -> Result<BTreeMap<String, Tensor>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let names: Vec<&str> = inputs.iter().map(|(n, _)| *n).collect();
        if names != [INPUT_IDS, ATTENTION_MASK] {
            return Err(Error::config(format!("unexpected inputs {:?}", names)));
        }

        let (rows, _) = inputs[0].1.dims2().map_err(|e| Error::config(e.to_string()))?;
        *self.last_shape.lock().unwrap() = Some(inputs[0].1.dims().to_vec());

        let mut data = vec![0f32; rows * self.classes];
        if self.outputs_nan {
            data.iter_mut().for_each(|v| *v = f32::NAN);
        } else if self.index < self.classes {
            data[self.index] = 1.0;
        }

        let logits = Tensor::from_vec(data, (rows, self.classes), &self.device)
            .map_err(|e| Error::inference(e.to_string()))?;
        Ok(BTreeMap::from([("logits".to_string(), logits)]))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
