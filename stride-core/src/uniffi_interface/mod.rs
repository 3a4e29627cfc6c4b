//! Bindings for the mobile apps. Every call blocks on the global runtime so
//! foreign threads never need a tokio context of their own.

pub mod errors;
pub mod logging;
pub mod objects;
pub mod tracker;
