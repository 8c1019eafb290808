//! Building blocks for populating a world.
//!
//! Everything here goes through the public store API, so factories raise the
//! same change events and keep indices current like any other mutation.

use rand::Rng;
use sim_component::data::{
    Collectible, Commodity, Deployable, Dockable, Docks, Drive, Facility, Faction, Hitpoints,
    Minable, Mining, Name, Order, OrderKind, Orders, Owner, Position, Sector, ShipSize, Storage,
    Teleport, TradeOffer, TransferDirection, Waypoint, Weapon,
};
use sim_component::{AnyComponent, EntityId, tags};
use sim_ecs::{EcsError, World};
use sim_math::{HexCoord, Vec2};

/// How far from a sector's centre its gates sit.
pub const GATE_DISTANCE: f32 = 12.0;

/// Faction standing that makes two factions enemies in the demo universe.
const WAR: f32 = -100.0;

/// A sector: a node of the galaxy graph.
pub fn sector(world: &mut World, name: &str, hex: HexCoord) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [Name::new(name).into(), Sector { hex }.into()],
        [tags::DISCOVERED],
    )
}

/// Connect two sectors with a pair of gates facing each other. Returns the
/// gate in `a` and the gate in `b`.
pub fn link_sectors(world: &mut World, a: EntityId, b: EntityId) -> Result<(EntityId, EntityId), EcsError> {
    let hex_a = world.require::<Sector>(a)?.hex;
    let hex_b = world.require::<Sector>(b)?.hex;
    let towards_b = (hex_b.to_world(1.0) - hex_a.to_world(1.0)).try_normalize().unwrap_or(Vec2::X);

    let gate_a = gate(world, a, towards_b * GATE_DISTANCE)?;
    let gate_b = gate(world, b, -towards_b * GATE_DISTANCE)?;
    world.require_mut::<Teleport>(gate_a)?.destination_id = Some(gate_b);
    world.require_mut::<Teleport>(gate_b)?.destination_id = Some(gate_a);
    Ok((gate_a, gate_b))
}

fn gate(world: &mut World, sector: EntityId, coord: Vec2) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [
            Name::new("Gate").into(),
            Position::new(coord, sector).into(),
            Teleport::default().into(),
        ],
        Vec::<String>::new(),
    )
}

/// A faction with neutral standing towards everyone.
pub fn faction(world: &mut World, name: &str, slug: &str) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [Name::new(name).into(), Faction::new(slug).into()],
        Vec::<String>::new(),
    )
}

/// Set both factions' standing towards each other.
pub fn set_relation(world: &mut World, a: EntityId, b: EntityId, value: f32) -> Result<(), EcsError> {
    world.require_mut::<Faction>(a)?.set_relation(b, value);
    world.require_mut::<Faction>(b)?.set_relation(a, value);
    Ok(())
}

/// Ship archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipClass {
    /// Small, fast, armed.
    Fighter,
    /// Mining equipment and a medium hold.
    Miner,
    /// Large hold, unarmed.
    Hauler,
    /// Carries a facility kit it can deploy.
    Builder,
}

impl ShipClass {
    fn name(self) -> &'static str {
        match self {
            ShipClass::Fighter => "Fighter",
            ShipClass::Miner => "Miner",
            ShipClass::Hauler => "Hauler",
            ShipClass::Builder => "Builder",
        }
    }

    fn role(self) -> &'static str {
        match self {
            ShipClass::Fighter => tags::ROLE_MILITARY,
            ShipClass::Miner => tags::ROLE_MINING,
            ShipClass::Hauler | ShipClass::Builder => tags::ROLE_CIVILIAN,
        }
    }

    fn parts(self) -> Vec<AnyComponent> {
        match self {
            ShipClass::Fighter => vec![
                Drive::new(2.0, 6.0, 1.0).into(),
                Weapon::new(4.0, 3.0, 1.0).into(),
                Hitpoints::full(40.0).into(),
                Dockable {
                    size: ShipSize::Small,
                    docked_in: None,
                }
                .into(),
            ],
            ShipClass::Miner => vec![
                Drive::new(1.0, 4.0, 2.0).into(),
                Mining::new(2.0, 2.0).into(),
                Storage::new(40.0).into(),
                Hitpoints::full(60.0).into(),
                Dockable::default().into(),
            ],
            ShipClass::Hauler => vec![
                Drive::new(1.0, 5.0, 3.0).into(),
                Storage::new(120.0).into(),
                Hitpoints::full(80.0).into(),
                Dockable {
                    size: ShipSize::Large,
                    docked_in: None,
                }
                .into(),
            ],
            ShipClass::Builder => vec![
                Drive::new(0.8, 3.0, 4.0).into(),
                Deployable { pads: 2, slots: 2 }.into(),
                Hitpoints::full(100.0).into(),
                Dockable {
                    size: ShipSize::Large,
                    docked_in: None,
                }
                .into(),
            ],
        }
    }
}

/// A ship of `class` owned by `owner` with an empty order stack.
pub fn ship(
    world: &mut World,
    class: ShipClass,
    owner: EntityId,
    sector: EntityId,
    coord: Vec2,
) -> Result<EntityId, EcsError> {
    let mut components: Vec<AnyComponent> = vec![
        Name::new(class.name()).into(),
        Owner { id: owner }.into(),
        Position::new(coord, sector).into(),
        Orders::new().into(),
    ];
    components.extend(class.parts());
    world.spawn_with(components, [tags::SHIP, class.role()])
}

/// A station with pads and a hold.
pub fn facility(
    world: &mut World,
    name: &str,
    owner: EntityId,
    sector: EntityId,
    coord: Vec2,
) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [
            Name::new(name).into(),
            Owner { id: owner }.into(),
            Position::new(coord, sector).into(),
            Docks::new(4).into(),
            Storage::new(1000.0).into(),
            Facility { slots: 4 }.into(),
            Hitpoints::full(500.0).into(),
        ],
        [tags::FACILITY],
    )
}

/// A field yielding `commodity` until `resources` run out.
pub fn asteroid_field(
    world: &mut World,
    sector: EntityId,
    coord: Vec2,
    commodity: Commodity,
    resources: f32,
) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [
            Name::new("Asteroid field").into(),
            Position::new(coord, sector).into(),
            Minable {
                commodity,
                resources,
            }
            .into(),
        ],
        Vec::<String>::new(),
    )
}

/// A floating crate.
pub fn collectible(
    world: &mut World,
    sector: EntityId,
    coord: Vec2,
    commodity: Commodity,
    quantity: f32,
) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [
            Position::new(coord, sector).into(),
            Collectible {
                commodity,
                quantity,
            }
            .into(),
        ],
        Vec::<String>::new(),
    )
}

/// A disposable move target.
pub fn waypoint(
    world: &mut World,
    sector: EntityId,
    coord: Vec2,
    owner: Option<EntityId>,
) -> Result<EntityId, EcsError> {
    world.spawn_with(
        [Position::new(coord, sector).into(), Waypoint { owner }.into()],
        Vec::<String>::new(),
    )
}

/// Handles into the universe built by [`demo_universe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoUniverse {
    /// Sectors, in a line: each linked to the next.
    pub sectors: Vec<EntityId>,
    /// The trading faction.
    pub traders: EntityId,
    /// The raiding faction, at war with the traders.
    pub pirates: EntityId,
    /// The traders' home station.
    pub station: EntityId,
}

fn scatter(rng: &mut impl Rng, radius: f32) -> Vec2 {
    Vec2::new(rng.gen_range(-radius..radius), rng.gen_range(-radius..radius))
}

/// A small four-sector universe with two warring factions, miners, haulers
/// and patrols. Placement is drawn from `rng`, so equal seeds build equal
/// worlds.
pub fn demo_universe(world: &mut World, rng: &mut impl Rng) -> Result<DemoUniverse, EcsError> {
    let sectors = vec![
        sector(world, "Alpha", HexCoord::ORIGIN)?,
        sector(world, "Beta", HexCoord::new(1, 0))?,
        sector(world, "Gamma", HexCoord::new(1, 1))?,
        sector(world, "Delta", HexCoord::new(2, 1))?,
    ];
    for pair in sectors.windows(2) {
        link_sectors(world, pair[0], pair[1])?;
    }
    let (alpha, beta, gamma, delta) = (sectors[0], sectors[1], sectors[2], sectors[3]);

    let traders = faction(world, "Traders Union", "TRD")?;
    let pirates = faction(world, "Free Raiders", "RDR")?;
    set_relation(world, traders, pirates, WAR)?;

    let station = facility(world, "Alpha Depot", traders, alpha, Vec2::new(2.0, 2.0))?;
    world
        .require_mut::<Storage>(station)?
        .add(Commodity::Water, 200.0);

    for (sector, commodity) in [(beta, Commodity::Ore), (gamma, Commodity::Ore), (delta, Commodity::Ice)] {
        let coord = scatter(rng, 8.0);
        asteroid_field(world, sector, coord, commodity, 500.0)?;
    }
    for _ in 0..3 {
        let coord = scatter(rng, 8.0);
        collectible(world, alpha, coord, Commodity::Metals, 5.0)?;
    }

    for _ in 0..2 {
        let coord = scatter(rng, 4.0);
        let miner = ship(world, ShipClass::Miner, traders, alpha, coord)?;
        world.require_mut::<Orders>(miner)?.push(Order::new(OrderKind::Mine {
            field_id: None,
            commodity: Commodity::Ore,
        }));
    }

    let coord = scatter(rng, 4.0);
    let hauler = ship(world, ShipClass::Hauler, traders, alpha, coord)?;
    world.require_mut::<Orders>(hauler)?.push(Order::new(OrderKind::Trade {
        target_id: station,
        offer: TradeOffer {
            commodity: Commodity::Water,
            quantity: 50.0,
            direction: TransferDirection::Buy,
        },
    }));

    let coord = scatter(rng, 4.0);
    let leader = ship(world, ShipClass::Fighter, traders, alpha, coord)?;
    world.require_mut::<Orders>(leader)?.push(Order::new(OrderKind::Patrol {
        sector_id: beta,
    }));
    let coord = scatter(rng, 4.0);
    let wingman = ship(world, ShipClass::Fighter, traders, alpha, coord)?;
    world.assign_commander(leader, wingman)?;
    world.require_mut::<Orders>(wingman)?.push(Order::new(OrderKind::Escort {
        target_id: leader,
    }));

    for _ in 0..2 {
        let coord = scatter(rng, 6.0);
        let raider = ship(world, ShipClass::Fighter, pirates, gamma, coord)?;
        world.require_mut::<Orders>(raider)?.push(Order::new(OrderKind::Pillage {
            sector_id: beta,
        }));
    }

    tracing::debug!(sectors = sectors.len(), entities = world.len(), "demo universe built");
    Ok(DemoUniverse {
        sectors,
        traders,
        pirates,
        station,
    })
}
