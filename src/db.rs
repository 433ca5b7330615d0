// src/db.rs

pub mod crm_repo;
pub use crm_repo::{CrmRepository, CustomerStore};
pub mod inventory_repo;
pub use inventory_repo::{InventoryRepository, InventoryStore};
pub mod operations_repo;
pub use operations_repo::{OperationsRepository, OrderStore};
pub mod memory_repo;
pub use memory_repo::MemoryRepository;
