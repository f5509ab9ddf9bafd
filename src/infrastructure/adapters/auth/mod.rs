//! Access Authorizer Adapters

mod fake_authorizer;
mod http_authorizer;

pub use fake_authorizer::FakeAccessAuthorizer;
pub use http_authorizer::{HttpAccessAuthorizer, HttpAccessAuthorizerConfig};
