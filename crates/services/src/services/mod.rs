pub mod auth;
pub mod canvas;
pub mod config;
pub mod deploy;
pub mod graph;
pub mod move_code;
pub mod move_generator;
