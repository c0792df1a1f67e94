pub mod blob;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod hosted;
pub mod qr;
pub mod store;
pub mod web;

pub use config::Config;
pub use entity::{ContentType, Note};
pub use error::{PhyslinkError, Result};
pub use store::NoteStore;
