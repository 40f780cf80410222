//! Serde request / response bodies for the HTTP API.

pub mod chat;
