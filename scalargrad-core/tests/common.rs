use scalargrad_core::autograd::IdCounter;
use scalargrad_core::Graph;
use std::sync::Arc;

// Added allow(dead_code) because not every test crate uses every helper.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Graph with its own id counter, so ids in one test never depend on another.
#[allow(dead_code)]
pub fn isolated_graph() -> Graph {
    Graph::with_counter(Arc::new(IdCounter::new()))
}
