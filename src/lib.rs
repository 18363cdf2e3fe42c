pub mod args;
pub mod clean;
pub mod cli;
pub mod config;
pub mod db;
pub mod export;
pub mod import;
pub mod ir;
pub mod operations;
pub mod pipeline;
pub mod sample;
mod terminal;
