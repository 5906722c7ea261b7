pub mod cli;
pub mod config;
pub mod filter;
pub mod hash;
pub mod ollama;
pub mod record;
pub mod scan;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use record::Record;
pub use store::RecordStore;
