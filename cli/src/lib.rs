//! Deckhand Library
//!
//! Core modules for the deckhand project CLI.

pub mod app;
pub mod authn;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod local_dev;
pub mod logs;
pub mod models;
pub mod pipeline;
pub mod project;
pub mod status;
pub mod storage;
pub mod utils;
