// src/dialer/mod.rs
mod http;

pub use http::{DialError, HttpConnection, HttpDialer};

use async_trait::async_trait;
use std::sync::Arc;

/// Connection-establishment capability the pool is built over.
///
/// The pool treats `Conn` opaquely; it only dials once per address at
/// construction and clones handles out to callers. Deadlines and transport
/// details belong to the implementation.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Conn: Clone + Send + Sync + 'static;

    async fn dial(&self, address: &str) -> anyhow::Result<Self::Conn>;
}

#[async_trait]
impl<D: Dialer + ?Sized> Dialer for Arc<D> {
    type Conn = D::Conn;

    async fn dial(&self, address: &str) -> anyhow::Result<Self::Conn> {
        (**self).dial(address).await
    }
}
