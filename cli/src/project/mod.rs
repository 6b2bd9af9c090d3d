pub mod archive;
pub mod components;
pub mod config;
pub mod ignore;
