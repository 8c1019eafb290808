//! Capability masks.
//!
//! A [`ComponentMask`] is the OR of the registry bits of a set of component
//! kinds. Entities carry one describing exactly which components they hold;
//! indices carry one describing which components they require.

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;

/// A fixed-size bitset over [`ComponentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// The mask with no kinds set.
    pub const EMPTY: Self = Self(0);

    /// The mask with exactly the given kinds set.
    #[must_use]
    pub fn of(kinds: &[ComponentKind]) -> Self {
        kinds.iter().fold(Self::EMPTY, |mask, kind| mask.with(*kind))
    }

    /// The mask with a single kind set.
    #[must_use]
    pub const fn single(kind: ComponentKind) -> Self {
        Self(1 << kind.bit())
    }

    /// Returns a copy of this mask with `kind` set.
    #[must_use]
    pub const fn with(self, kind: ComponentKind) -> Self {
        Self(self.0 | 1 << kind.bit())
    }

    /// Returns a copy of this mask with `kind` cleared.
    #[must_use]
    pub const fn without(self, kind: ComponentKind) -> Self {
        Self(self.0 & !(1 << kind.bit()))
    }

    /// Sets `kind` in place.
    pub fn insert(&mut self, kind: ComponentKind) {
        *self = self.with(kind);
    }

    /// Clears `kind` in place.
    pub fn remove(&mut self, kind: ComponentKind) {
        *self = self.without(kind);
    }

    /// Whether `kind` is set.
    #[must_use]
    pub const fn has(self, kind: ComponentKind) -> bool {
        self.0 & (1 << kind.bit()) != 0
    }

    /// Whether every kind in `required` is also set here.
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Whether no kind is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits, bit `n` being the kind with registry bit `n`.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The kinds set in this mask, in bit order.
    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.has(*kind))
    }
}

impl std::ops::BitOr for ComponentMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ComponentMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl FromIterator<ComponentKind> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |mask, kind| mask.with(kind))
    }
}

impl From<ComponentKind> for ComponentMask {
    fn from(kind: ComponentKind) -> Self {
        Self::single(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_sets_each_bit() {
        let mask = ComponentMask::of(&[ComponentKind::Position, ComponentKind::Drive]);
        assert!(mask.has(ComponentKind::Position));
        assert!(mask.has(ComponentKind::Drive));
        assert!(!mask.has(ComponentKind::Orders));
        assert_eq!(
            mask.bits(),
            1 << ComponentKind::Position.bit() | 1 << ComponentKind::Drive.bit()
        );
    }

    #[test]
    fn test_contains_is_superset_check() {
        let entity = ComponentMask::of(&[
            ComponentKind::Position,
            ComponentKind::Drive,
            ComponentKind::Orders,
        ]);
        let required = ComponentMask::of(&[ComponentKind::Position, ComponentKind::Orders]);
        assert!(entity.contains(required));
        assert!(!required.contains(entity));
        assert!(entity.contains(ComponentMask::EMPTY));
    }

    #[test]
    fn test_insert_remove() {
        let mut mask = ComponentMask::EMPTY;
        mask.insert(ComponentKind::Weapon);
        assert!(mask.has(ComponentKind::Weapon));
        mask.remove(ComponentKind::Weapon);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_kinds_iterates_in_bit_order() {
        let mask: ComponentMask = [ComponentKind::Weapon, ComponentKind::Name]
            .into_iter()
            .collect();
        let kinds: Vec<_> = mask.kinds().collect();
        assert_eq!(kinds, vec![ComponentKind::Name, ComponentKind::Weapon]);
    }
}
