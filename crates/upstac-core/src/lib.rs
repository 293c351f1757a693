pub mod config;
pub mod error;
pub mod flow;
pub mod intake;
pub mod io;
pub mod paths;
pub mod query;
pub mod request;
pub mod store;
pub mod types;
pub mod update;
pub mod user;

pub use error::{Result, UpstacError};
