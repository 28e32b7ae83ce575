pub mod controller;
pub mod loop_worker;
pub mod state;

pub use controller::StreamController;
pub use state::{StreamEvent, StreamReport, StreamStatus};
