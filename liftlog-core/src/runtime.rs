use log::debug;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Runtime hosting stores opened from callers that do not run tokio
/// themselves (the mobile bindings).
pub fn init_global_runtime_blocking() -> &'static Runtime {
    GLOBAL_RUNTIME.get_or_init(|| {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        let threads = std::cmp::max(threads, 2);
        debug!("Initializing global runtime with {} threads", threads);
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name("liftlog-worker")
            .enable_all()
            .build()
            .expect("failed to build tokio runtime")
    })
}
