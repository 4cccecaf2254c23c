pub mod alerts;
pub mod config;
pub mod constants;
pub mod error;
pub mod http_client;
pub mod mail;
pub mod notify;
pub mod prediction;
pub mod proximity;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod trend;
pub mod types;
pub mod upstream;
pub mod utils;

pub use error::{CycloneError, CycloneResult};
pub use service::CycloneService;
