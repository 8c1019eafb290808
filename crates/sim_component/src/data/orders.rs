//! Orders and the actions they are planned into.
//!
//! An entity's [`Orders`] component is a stack of [`Order`]s; the front one
//! is active. Each order carries the [`Action`]s currently planned for it,
//! consumed front to back by the order executor.
//!
//! All mutation of the stack goes through the methods below so that the
//! auto-insertion and interruption rules hold no matter which system touches
//! it:
//!
//! - [`Orders::push_auto`] inserts an automatic order in front. The displaced
//!   order keeps its planned actions and resumes untouched once the
//!   automatic order is popped.
//! - [`Orders::push_front_interrupting`] inserts in front and marks the
//!   displaced order `interrupt`, so its stale actions are thrown away and
//!   re-planned when it becomes active again.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::data::economy::Commodity;
use crate::entity::EntityId;

/// Who issued an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderOrigin {
    /// Issued by the player or a faction-level AI.
    #[default]
    Manual,
    /// Inserted by a reactive system (e.g. spotting an enemy).
    Auto,
}

/// Which way cargo flows in a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferDirection {
    /// From the trade partner into the ordered entity.
    Buy,
    /// From the ordered entity into the trade partner.
    Sell,
}

/// Cargo to move once docked at a trade partner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// What to move.
    pub commodity: Commodity,
    /// How much.
    pub quantity: f32,
    /// Which way.
    pub direction: TransferDirection,
}

/// The intent of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrderKind {
    /// Fly to an entity.
    Move { target_id: EntityId },
    /// Dock at a partner and exchange cargo.
    Trade {
        target_id: EntityId,
        offer: TradeOffer,
    },
    /// Mine until the hold is full. Without a field, the nearest reachable
    /// one yielding `commodity` is picked.
    Mine {
        field_id: Option<EntityId>,
        commodity: Commodity,
    },
    /// Fly to an entity and dock.
    Dock { target_id: EntityId },
    /// Destroy an entity.
    ///
    /// Without `follow_outside_sector` the attack is abandoned as soon as the
    /// target leaves the sector it was in when the order was planned; with
    /// `max_distance` it is abandoned once the target gets further away.
    Attack {
        target_id: EntityId,
        follow_outside_sector: bool,
        max_distance: Option<f32>,
    },
    /// Fly between random points of a sector, engaging hostiles.
    Patrol { sector_id: EntityId },
    /// Like patrol, but anything not friendly is a target.
    Pillage { sector_id: EntityId },
    /// Stay with an entity and engage hostiles near it.
    Escort { target_id: EntityId },
    /// Stay with an entity.
    Follow { target_id: EntityId },
    /// Pick up a floating crate.
    Collect { target_id: EntityId },
    /// Stay put.
    Hold,
    /// Turn into a facility on the spot.
    Deploy,
}

impl OrderKind {
    /// The entity this order is about, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            OrderKind::Move { target_id }
            | OrderKind::Trade { target_id, .. }
            | OrderKind::Dock { target_id }
            | OrderKind::Attack { target_id, .. }
            | OrderKind::Escort { target_id }
            | OrderKind::Follow { target_id }
            | OrderKind::Collect { target_id } => Some(*target_id),
            OrderKind::Mine { field_id, .. } => *field_id,
            OrderKind::Patrol { .. }
            | OrderKind::Pillage { .. }
            | OrderKind::Hold
            | OrderKind::Deploy => None,
        }
    }

    /// Orders that never finish on their own: once their actions run out
    /// they are planned again instead of being popped.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            OrderKind::Patrol { .. }
                | OrderKind::Pillage { .. }
                | OrderKind::Escort { .. }
                | OrderKind::Follow { .. }
                | OrderKind::Hold
        )
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OrderKind::Move { .. } => "move",
            OrderKind::Trade { .. } => "trade",
            OrderKind::Mine { .. } => "mine",
            OrderKind::Dock { .. } => "dock",
            OrderKind::Attack { .. } => "attack",
            OrderKind::Patrol { .. } => "patrol",
            OrderKind::Pillage { .. } => "pillage",
            OrderKind::Escort { .. } => "escort",
            OrderKind::Follow { .. } => "follow",
            OrderKind::Collect { .. } => "collect",
            OrderKind::Hold => "hold",
            OrderKind::Deploy => "deploy",
        }
    }
}

/// One atomic step of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Fly to an entity. With `ignore_reached` the drive keeps station and
    /// the action never completes by arrival.
    Move {
        target_id: EntityId,
        ignore_reached: bool,
    },
    /// Engage an entity with the weapon.
    Attack { target_id: EntityId },
    /// Dock at an entity once in reach.
    Dock { target_id: EntityId },
    /// Mine a field until the hold is full.
    Mine { target_id: EntityId },
    /// Jump through a gate.
    Teleport { target_id: EntityId },
    /// Turn into a facility.
    DeployFacility,
    /// Pick up a crate.
    Collect { target_id: EntityId },
}

impl Action {
    /// The entity this action is about, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Action::Move { target_id, .. }
            | Action::Attack { target_id }
            | Action::Dock { target_id }
            | Action::Mine { target_id }
            | Action::Teleport { target_id }
            | Action::Collect { target_id } => Some(*target_id),
            Action::DeployFacility => None,
        }
    }
}

/// An order and its current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// The intent.
    pub kind: OrderKind,
    /// Who issued it.
    pub origin: OrderOrigin,
    /// Remaining planned steps, front first.
    pub actions: VecDeque<Action>,
    /// The plan is stale and must be rebuilt when this order is next active.
    pub interrupt: bool,
    /// Whether `actions` has been planned since the last invalidation.
    pub planned: bool,
    /// Sector the target was in when the plan was made.
    pub planned_sector: Option<EntityId>,
}

impl Order {
    /// A manual, unplanned order.
    #[must_use]
    pub fn new(kind: OrderKind) -> Self {
        Self {
            kind,
            origin: OrderOrigin::Manual,
            actions: VecDeque::new(),
            interrupt: false,
            planned: false,
            planned_sector: None,
        }
    }

    /// An automatic, unplanned order.
    #[must_use]
    pub fn auto(kind: OrderKind) -> Self {
        Self {
            origin: OrderOrigin::Auto,
            ..Self::new(kind)
        }
    }

    /// Throw the plan away so it is rebuilt on the next planning pass.
    pub fn invalidate(&mut self) {
        self.actions.clear();
        self.planned = false;
        self.planned_sector = None;
    }

    /// Install a fresh plan.
    pub fn set_plan(&mut self, actions: VecDeque<Action>, planned_sector: Option<EntityId>) {
        self.actions = actions;
        self.planned = true;
        self.planned_sector = planned_sector;
        self.interrupt = false;
    }
}

/// Where the active order stands in the execution state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    /// No orders.
    Idle,
    /// The active order needs (re)planning.
    Planning,
    /// The active order's front action is being driven.
    Executing,
    /// The active order ran out of actions.
    Completed,
}

/// The order stack component. Front is active.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Orders {
    value: VecDeque<Order>,
}

impl Orders {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack holding a single manual order.
    #[must_use]
    pub fn with(kind: OrderKind) -> Self {
        let mut orders = Self::new();
        orders.push(Order::new(kind));
        orders
    }

    /// Queue an order behind the existing ones.
    pub fn push(&mut self, order: Order) {
        self.value.push_back(order);
    }

    /// Make `order` the only one. Returns the orders it displaced, whose
    /// plans may still own entities the caller has to release.
    pub fn replace(&mut self, order: Order) -> Vec<Order> {
        let dropped = self.clear();
        self.value.push_back(order);
        dropped
    }

    /// Insert an automatic order ahead of the active one. The displaced
    /// order keeps its plan.
    pub fn push_auto(&mut self, kind: OrderKind) {
        self.value.push_front(Order::auto(kind));
    }

    /// Insert an order ahead of the active one and mark the displaced order
    /// for re-planning.
    pub fn push_front_interrupting(&mut self, order: Order) {
        self.mark_interrupt();
        self.value.push_front(order);
    }

    /// Mark the active order's plan stale.
    pub fn mark_interrupt(&mut self) {
        if let Some(front) = self.value.front_mut() {
            front.interrupt = true;
        }
    }

    /// Remove and return the active order.
    pub fn pop_front(&mut self) -> Option<Order> {
        self.value.pop_front()
    }

    /// Take every order out, front first.
    pub fn clear(&mut self) -> Vec<Order> {
        self.value.drain(..).collect()
    }

    /// The active order.
    #[must_use]
    pub fn front(&self) -> Option<&Order> {
        self.value.front()
    }

    /// The active order, mutably.
    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.value.front_mut()
    }

    /// Number of orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether there are no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Orders front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.value.iter()
    }

    /// State of the active order.
    #[must_use]
    pub fn state(&self) -> OrderState {
        match self.value.front() {
            None => OrderState::Idle,
            Some(order) if order.interrupt || !order.planned => OrderState::Planning,
            Some(order) if order.actions.is_empty() => OrderState::Completed,
            Some(_) => OrderState::Executing,
        }
    }
}
