//! HTTP API for the carshare marketplace: routes, bearer-token auth, DTOs and OpenAPI docs.

pub mod auth;
pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
