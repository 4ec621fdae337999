pub mod azure;
pub mod base;
pub mod configs;
pub mod factory;
pub mod openai;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;
