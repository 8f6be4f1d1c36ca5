//! Integration tests for csql-client.

pub mod client_test;
pub mod fake_engine;
pub mod transport_test;
