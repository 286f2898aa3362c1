//! Library crate for tracklink-back, exposing modules for binaries and integration tests.

pub mod catalog;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod rooms;
pub mod routes;
pub mod services;
pub mod state;
