// src/services.rs

pub mod crm_service;
pub mod inventory_service;
pub mod operation_service;
