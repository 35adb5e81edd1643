//! Domain layer of Rainbow: the remembered pet, its conversation log, and the
//! deterministic pieces that prepare or replace a generated reply.

pub mod cache;
pub mod config;
pub mod conversation;
pub mod error;
pub mod keepsake;
pub mod persona;
pub mod prompt;
pub mod response;
pub mod safety;
pub mod subscription;
pub mod template;
pub mod weather;

pub use error::{RainbowError, Result};
