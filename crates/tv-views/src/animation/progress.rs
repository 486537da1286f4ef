use std::sync::Arc;

use parking_lot::RwLock;

use super::FrameCallback;

/// Shared progress slot written by an animation callback and read at render
#[derive(Debug, Clone, Default)]
pub struct ProgressCell {
    value: Arc<RwLock<f64>>,
}

impl ProgressCell {
    pub fn new(initial: f64) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> f64 {
        *self.value.read()
    }

    pub fn set(&self, value: f64) {
        *self.value.write() = value;
    }

    /// Frame callback storing each progress value into this cell
    pub fn setter(&self) -> FrameCallback {
        let cell = self.clone();
        Box::new(move |progress| cell.set(progress))
    }
}
