//! Component records.
//!
//! Plain data owned by exactly one entity. Relations to other entities are
//! stored as [`EntityId`](crate::EntityId) fields and resolved through the
//! world when used.

mod combat;
mod drive;
mod economy;
mod identity;
mod orders;
mod spatial;

pub use combat::{Hitpoints, Weapon};
pub use drive::{CRUISE_DISTANCE, Drive, DriveMode, DriveState};
pub use economy::{
    Collectible, Commodity, Deployable, Dockable, Docks, Facility, Minable, Mining, ShipSize,
    Storage, StorageError,
};
pub use identity::{Commander, Faction, Name, Owner, Relation, Subordinates};
pub use orders::{
    Action, Order, OrderKind, OrderOrigin, OrderState, Orders, TradeOffer, TransferDirection,
};
pub use spatial::{Position, PositionMut, Sector, Teleport, Waypoint};
