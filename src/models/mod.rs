// src/models/mod.rs
pub mod category;
pub mod discount;
pub mod feedback;
pub mod order;
pub mod picture;
pub mod product;
pub mod user;
