pub mod catalog;
pub mod config;
pub mod error;
pub mod expand;
pub mod parse;
pub mod store;
pub mod validate;
pub mod wasm;
