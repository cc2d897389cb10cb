pub mod factory;
pub mod ready_queue;
pub mod serial;
pub mod work_queue;
#[cfg(test)]
pub mod integration_tests;

pub use factory::ExecutorFactory;
pub use serial::SerialExecutor;
pub use work_queue::WorkQueueExecutor;
