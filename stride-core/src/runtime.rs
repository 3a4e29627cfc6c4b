use anyhow::{Result, anyhow};
use log::debug;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Runtime used to drive tracker calls that arrive from foreign threads.
/// Built on first use.
pub fn init_global_runtime_blocking() -> Result<&'static Runtime> {
    if let Some(rt) = GLOBAL_RUNTIME.get() {
        return Ok(rt);
    }

    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .max(2);
    debug!("Initializing global runtime with {} threads", threads);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()?;

    // A racing caller may have won; its runtime is kept and ours dropped.
    let _ = GLOBAL_RUNTIME.set(rt);
    GLOBAL_RUNTIME
        .get()
        .ok_or_else(|| anyhow!("global runtime unavailable"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_is_shared() {
        let a = init_global_runtime_blocking().unwrap() as *const Runtime;
        let b = init_global_runtime_blocking().unwrap() as *const Runtime;
        assert_eq!(a, b);
        assert_eq!(init_global_runtime_blocking().unwrap().block_on(async { 2 + 2 }), 4);
    }
}
