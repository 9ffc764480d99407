// src/auth/mod.rs
pub mod jwt;
pub mod password;
