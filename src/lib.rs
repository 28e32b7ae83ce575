pub mod backfill;
pub mod cli;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod shutdown;
pub mod signal;
pub mod stream;
pub mod utils;

pub use error::FeedError;
pub use gateway::{GatewayError, IngestionGateway};
pub use models::Reading;
pub use signal::SignalModel;
