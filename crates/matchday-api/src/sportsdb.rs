pub mod client;
pub mod error;
pub mod types;

pub use client::SportsDbClient;
pub use error::SportsDbError;
