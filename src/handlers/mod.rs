// src/handlers/mod.rs
pub mod account;
pub mod category;
pub mod dashboard;
pub mod discount;
pub mod order;
pub mod product;
