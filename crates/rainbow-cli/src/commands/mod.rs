pub mod chat;
pub mod companion;
pub mod persona;
pub mod subscription;
