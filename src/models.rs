// src/models.rs

pub mod crm;
pub mod inventory;
pub mod operations;
