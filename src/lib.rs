//! Coursely - A lightweight online course management service
//!
//! This library provides the core functionality for the Coursely service.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
