//! campus-market - A buy/sell marketplace service for college students
//!
//! This crate provides an HTTP service where students register, log in with a
//! bearer session token, post items for sale scoped to their college, list a
//! college's items, and mark items sold or available again.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod items;
pub mod models;
pub mod server;
pub mod telemetry;
