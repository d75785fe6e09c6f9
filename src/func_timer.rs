use std::time::Instant;

/// Logs how long a scope took when it is dropped.
pub struct FunctionTimer {
    name: &'static str,
    start: Instant,
}

impl FunctionTimer {
     pub fn new(name: &'static str) -> Self {
        FunctionTimer {
            name,
            start: Instant::now(),
        }
    }
}

// This `Drop` implementation is called automatically when the `FunctionTimer` struct goes out of scope.
impl Drop for FunctionTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        log::debug!("{} took {:?}", self.name, duration);
    }
}
