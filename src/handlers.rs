// src/handlers.rs

pub mod demo;
pub mod permissions;
pub mod roles;
pub mod users;
