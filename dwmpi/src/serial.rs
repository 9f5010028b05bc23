use crate::Reducer;

/// Single-worker reducer: every collective is the identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialReducer;

impl SerialReducer {
    pub fn new() -> SerialReducer {
        SerialReducer
    }
}

impl Reducer for SerialReducer {
    fn sum(&self, local: f64) -> f64 {
        local
    }

    fn min(&self, local: f64) -> f64 {
        local
    }

    fn max(&self, local: f64) -> f64 {
        local
    }

    fn get_rank(&self) -> usize {
        0
    }

    fn get_size(&self) -> usize {
        1
    }
}
