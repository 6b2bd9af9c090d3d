//! Wire models for the deckhand platform API

pub mod models;
