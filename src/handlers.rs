// src/handlers.rs

pub mod crm;
pub mod inventory;
pub mod operations;
