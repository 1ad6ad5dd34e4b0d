//! Infrastructure layer - Storage, credential and token implementations

pub mod auth;
pub mod category;
pub mod logging;
pub mod storage;
pub mod user;
