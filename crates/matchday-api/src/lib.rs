pub mod dummyjson;
pub mod sportsdb;
pub mod traits;

#[cfg(test)]
mod test_server;
