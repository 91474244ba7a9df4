//! Read-only bulk listing of every pickup point, served on its own listener
//! for internal consumers. No token is required there.

pub mod handlers;
pub mod services;

use serde::Serialize;

use crate::pvz::dto::PvzResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PvzListResponse {
    pub pvzs: Vec<PvzResponse>,
}

pub use handlers::router;
