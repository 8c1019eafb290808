//! Entity-store error types.
//!
//! Every variant here is an invariant violation in the calling code.
//! Expected absence (an id that was unregistered, a relation pointing at a
//! destroyed entity) is reported through `Option`, never through these.

use sim_component::{ComponentKind, EntityId};

/// Errors raised by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity is not registered.
    #[error("entity {0} not found")]
    MissingEntity(EntityId),

    /// A restored snapshot lists the same id twice.
    #[error("entity {0} listed twice")]
    DuplicateEntity(EntityId),

    /// The entity does not hold the component.
    #[error("component '{kind}' not found on {entity}")]
    MissingComponent {
        entity: EntityId,
        kind: ComponentKind,
    },

    /// The entity already holds the component.
    #[error("component '{kind}' already present on {entity}")]
    DuplicateComponent {
        entity: EntityId,
        kind: ComponentKind,
    },

    /// Making `commander` command `subordinate` would close a loop.
    #[error("{commander} cannot command {subordinate}: the command chain would become cyclic")]
    CyclicCommandChain {
        commander: EntityId,
        subordinate: EntityId,
    },
}

/// Result alias for entity-store operations.
pub type Result<T> = std::result::Result<T, EcsError>;
