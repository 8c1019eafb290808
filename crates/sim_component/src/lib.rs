//! # sim_component
//!
//! The "C" in the simulation's ECS: what a component is, which bit of the
//! capability mask it occupies, and the records entities carry.
//!
//! This crate provides:
//!
//! - [`ComponentKind`] and [`AnyComponent`]: the append-only component
//!   registry and the tagged union stored on entities.
//! - [`Component`] trait: typed projection of a record out of the union.
//! - [`ComponentMask`]: capability bitset derived from the registry.
//! - [`EntityId`] / [`EntityAllocator`]: never-reused `u64` identifiers.
//! - [`QueryDescriptor`]: the required-components + required-tags predicate.
//! - [`data`]: the component records themselves, including the order stack.
//! - [`tags`]: well-known tag strings.

pub mod component;
pub mod data;
pub mod entity;
pub mod mask;
pub mod query;
pub mod tags;

pub use component::{AnyComponent, Component, ComponentKind, ComponentMut};
pub use entity::{EntityAllocator, EntityId};
pub use mask::ComponentMask;
pub use query::QueryDescriptor;
