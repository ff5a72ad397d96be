pub mod config;
pub mod dispatch;
pub mod events;
pub mod validate;
