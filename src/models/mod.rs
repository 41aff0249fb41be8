// src/models/mod.rs
pub mod user;

pub use user::{UpdateUserResponse, UserProfile, UserUpdate};
