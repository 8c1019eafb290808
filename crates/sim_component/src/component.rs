//! The component registry.
//!
//! Every component kind the simulation knows is listed exactly once in the
//! `component_registry!` invocation below, paired with the bit it occupies in
//! a [`ComponentMask`](crate::ComponentMask). That list is the single source
//! of truth for:
//!
//! - [`ComponentKind`]: the fieldless discriminant enum,
//! - [`AnyComponent`]: the tagged union actually stored on entities,
//! - the [`Component`] impl of every record type, plus [`ComponentMut`]
//!   for the kinds that may be edited in place.
//!
//! ## Append-only bits
//!
//! Bit positions are persisted implicitly through the capability masks that
//! systems and indices are built around. Bits must therefore stay dense and in
//! declaration order: a new kind goes at the end with the next free bit.
//! Reordering, removing or reusing a bit fails the compile-time check at the
//! bottom of the macro expansion.

use serde::{Deserialize, Serialize};

use crate::data::{
    Collectible, Commander, Deployable, Dockable, Docks, Drive, Facility, Faction, Hitpoints,
    Minable, Mining, Name, Orders, Owner, Position, Sector, Storage, Subordinates, Teleport,
    Waypoint, Weapon,
};

/// The core component trait.
///
/// Implemented (by the registry macro) for every record type that can be
/// attached to an entity. It links the Rust type to its [`ComponentKind`] and
/// projects it in and out of the [`AnyComponent`] union, which is what gives
/// the world its typed, checked accessors.
pub trait Component: Sized + Clone + 'static {
    /// The registry entry for this record type.
    const KIND: ComponentKind;

    /// The serialised name of this component (e.g. `"position"`).
    fn type_name() -> &'static str {
        Self::KIND.name()
    }

    /// Borrow this record out of a union, if the union holds this kind.
    fn from_any(any: &AnyComponent) -> Option<&Self>;

    /// Mutably borrow this record out of a union, if the union holds this kind.
    fn from_any_mut(any: &mut AnyComponent) -> Option<&mut Self>;

    /// Wrap this record into the union.
    fn into_any(self) -> AnyComponent;
}

/// Components whose contents may be edited in place through `&mut`.
///
/// Kinds marked `guarded` in the registry do not get this impl. A
/// [`Position`] carries the sector that sector indices bucket by, so live
/// positions are edited through a
/// [`PositionMut`](crate::data::PositionMut) view and moved between sectors
/// by the world only.
pub trait ComponentMut: Component {}

macro_rules! component_access {
    (guarded; $ty:ty) => {};
    (; $ty:ty) => {
        impl ComponentMut for $ty {}
    };
}

macro_rules! component_registry {
    ($( $bit:literal => $kind:ident($ty:ty) = $name:literal $($access:ident)? ),+ $(,)?) => {
        /// A component kind with a fixed bit in the capability mask.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        #[repr(u8)]
        pub enum ComponentKind {
            $(
                #[doc = concat!("`", $name, "`")]
                $kind = $bit,
            )+
        }

        impl ComponentKind {
            /// Every registered kind, in bit order.
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$kind),+];

            /// The bit this kind occupies in a [`ComponentMask`](crate::ComponentMask).
            #[must_use]
            pub const fn bit(self) -> u32 {
                self as u32
            }

            /// The serialised name of this kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$kind => $name,)+
                }
            }

            /// Looks a kind up by its serialised name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ComponentKind::$kind),)+
                    _ => None,
                }
            }
        }

        /// Component data as stored on an entity: a record tagged with its kind.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "name", rename_all = "camelCase")]
        pub enum AnyComponent {
            $(
                #[doc = concat!("`", $name, "` record")]
                $kind($ty),
            )+
        }

        impl AnyComponent {
            /// The registry entry of the record held by this union.
            #[must_use]
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(AnyComponent::$kind(_) => ComponentKind::$kind,)+
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn from_any(any: &AnyComponent) -> Option<&Self> {
                    match any {
                        AnyComponent::$kind(c) => Some(c),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn from_any_mut(any: &mut AnyComponent) -> Option<&mut Self> {
                    match any {
                        AnyComponent::$kind(c) => Some(c),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn into_any(self) -> AnyComponent {
                    AnyComponent::$kind(self)
                }
            }

            impl From<$ty> for AnyComponent {
                fn from(c: $ty) -> Self {
                    AnyComponent::$kind(c)
                }
            }

            component_access!($($access)?; $ty);
        )+

        const _: () = {
            let all = ComponentKind::ALL;
            assert!(all.len() <= 64, "component mask holds at most 64 kinds");
            let mut i = 0;
            while i < all.len() {
                assert!(
                    all[i] as usize == i,
                    "component bits are append-only: keep them dense and in declaration order"
                );
                i += 1;
            }
        };
    };
}

component_registry! {
    0 => Position(Position) = "position" guarded,
    1 => Name(Name) = "name",
    2 => Owner(Owner) = "owner",
    3 => Faction(Faction) = "faction",
    4 => Sector(Sector) = "sector",
    5 => Teleport(Teleport) = "teleport",
    6 => Drive(Drive) = "drive",
    7 => Orders(Orders) = "orders",
    8 => Storage(Storage) = "storage",
    9 => Mining(Mining) = "mining",
    10 => Minable(Minable) = "minable",
    11 => Docks(Docks) = "docks",
    12 => Dockable(Dockable) = "dockable",
    13 => Weapon(Weapon) = "weapon",
    14 => Hitpoints(Hitpoints) = "hitpoints",
    15 => Commander(Commander) = "commander",
    16 => Subordinates(Subordinates) = "subordinates",
    17 => Facility(Facility) = "facility",
    18 => Collectible(Collectible) = "collectible",
    19 => Waypoint(Waypoint) = "waypoint",
    20 => Deployable(Deployable) = "deployable",
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
