pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod export;
pub mod navigation;
pub mod render;
pub mod session;
pub mod shell;
pub mod views;
