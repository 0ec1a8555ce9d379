// src/pool/endpoint.rs
use chrono::{DateTime, Utc};

/// One upstream endpoint tracked by the pool.
///
/// `alive` is true only while `connection` is present. A dead endpoint may
/// keep a stale connection handle around; the pool never hands it out again
/// until a fresh one is installed via revival.
#[derive(Debug)]
pub(crate) struct Endpoint<C> {
    pub(crate) address: String,
    pub(crate) connection: Option<C>,
    pub(crate) alive: bool,
    pub(crate) last_error: Option<String>,
    pub(crate) last_transition: Option<DateTime<Utc>>,
}

impl<C> Endpoint<C> {
    pub(crate) fn connected(address: String, connection: C) -> Self {
        Self {
            address,
            connection: Some(connection),
            alive: true,
            last_error: None,
            last_transition: None,
        }
    }

    pub(crate) fn unreachable(address: String, cause: String) -> Self {
        Self {
            address,
            connection: None,
            alive: false,
            last_error: Some(cause),
            last_transition: Some(Utc::now()),
        }
    }

    pub(crate) fn usable(&self) -> bool {
        self.alive && self.connection.is_some()
    }

    pub(crate) fn status(&self) -> EndpointStatus {
        EndpointStatus {
            address: self.address.clone(),
            alive: self.alive,
            has_connection: self.connection.is_some(),
            last_error: self.last_error.clone(),
            last_transition: self.last_transition,
        }
    }
}

/// What a selection call hands back: the endpoint's address plus a clone of
/// its connection. Connection types are expected to be cheaply clonable
/// client objects.
#[derive(Debug, Clone)]
pub struct EndpointHandle<C> {
    address: String,
    connection: C,
}

impl<C> EndpointHandle<C> {
    pub(crate) fn new(address: String, connection: C) -> Self {
        Self {
            address,
            connection,
        }
    }

    /// Address of the endpoint this handle came from. Pass this back to
    /// `mark_dead` when a call through the connection fails.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }
}

/// Point-in-time view of one endpoint, for reporting.
#[derive(Debug, Clone)]
pub struct EndpointStatus {
    pub address: String,
    pub alive: bool,
    pub has_connection: bool,
    pub last_error: Option<String>,
    pub last_transition: Option<DateTime<Utc>>,
}
