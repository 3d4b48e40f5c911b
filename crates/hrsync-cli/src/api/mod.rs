//! API client module for communicating with the hrsync server

pub mod client;
pub mod endpoints;

pub use client::ApiClient;
