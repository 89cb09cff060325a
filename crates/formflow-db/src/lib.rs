//! # formflow-db
//!
//! Persistence seam for formflow. Defines how an entity exposes its identity
//! ([`Entity`], [`EntityId`]), the unit-of-work contract the form workflow
//! relies on ([`ObjectManager`]), and [`MemoryObjectManager`], an in-memory
//! unit of work.

pub mod entity;
pub mod manager;
pub mod memory;

pub use entity::{Entity, EntityId};
pub use manager::ObjectManager;
pub use memory::MemoryObjectManager;
