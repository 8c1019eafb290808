//! Inter-sector routing.
//!
//! Sectors are nodes, linked gate pairs are edges, every edge costs one
//! jump. The table holds a breadth-first tree from every sector, so a lookup
//! is a map access and a route is a walk back up the tree. Sectors in
//! different components simply have no entry for each other.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use sim_component::data::{Position, Sector, Teleport};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::World;

/// Shortest jump counts and routes between sectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    adjacency: BTreeMap<EntityId, BTreeSet<EntityId>>,
    /// Lowest-id gate in the first sector leading to the second.
    gates: BTreeMap<(EntityId, EntityId), EntityId>,
    /// source -> target -> (jumps, predecessor of target on the route)
    trees: BTreeMap<EntityId, BTreeMap<EntityId, (u32, EntityId)>>,
}

impl PathTable {
    /// Build from explicit nodes and undirected edges.
    pub fn build(
        sectors: impl IntoIterator<Item = EntityId>,
        links: impl IntoIterator<Item = (EntityId, EntityId)>,
    ) -> Self {
        let mut adjacency: BTreeMap<EntityId, BTreeSet<EntityId>> =
            sectors.into_iter().map(|s| (s, BTreeSet::new())).collect();
        for (a, b) in links {
            if a == b {
                continue;
            }
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        let trees = adjacency
            .keys()
            .map(|source| (*source, Self::bfs(&adjacency, *source)))
            .collect();
        Self {
            adjacency,
            gates: BTreeMap::new(),
            trees,
        }
    }

    /// Build from every `Sector` entity and every linked gate in the world.
    pub fn from_world(world: &World) -> Self {
        let sectors: Vec<EntityId> = world
            .query(&QueryDescriptor::of(&[ComponentKind::Sector]))
            .filter(|e| e.get::<Sector>().is_some())
            .map(|e| e.id())
            .collect();

        let mut links = Vec::new();
        let mut gates = BTreeMap::new();
        let query = QueryDescriptor::of(&[ComponentKind::Teleport, ComponentKind::Position]);
        for gate in world.query(&query) {
            let (Some(teleport), Some(position)) = (gate.get::<Teleport>(), gate.get::<Position>())
            else {
                continue;
            };
            let Some(destination) = teleport.destination_id else {
                tracing::warn!(entity = %gate.id(), "teleporter without destination");
                continue;
            };
            let Some(far_side) = world.component::<Position>(destination) else {
                tracing::warn!(entity = %gate.id(), destination = %destination, "teleporter destination has no position");
                continue;
            };
            let from = position.sector();
            let to = far_side.sector();
            if from == to {
                continue;
            }
            links.push((from, to));
            gates.entry((from, to)).or_insert(gate.id());
        }

        let mut table = Self::build(sectors, links);
        table.gates = gates;
        table
    }

    fn bfs(
        adjacency: &BTreeMap<EntityId, BTreeSet<EntityId>>,
        source: EntityId,
    ) -> BTreeMap<EntityId, (u32, EntityId)> {
        let mut tree = BTreeMap::from([(source, (0, source))]);
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            let jumps = tree[&node].0;
            for next in adjacency.get(&node).into_iter().flatten() {
                if !tree.contains_key(next) {
                    tree.insert(*next, (jumps + 1, node));
                    queue.push_back(*next);
                }
            }
        }
        tree
    }

    /// Jumps between two sectors, `None` if unreachable or unknown.
    pub fn distance(&self, from: EntityId, to: EntityId) -> Option<u32> {
        self.trees.get(&from)?.get(&to).map(|(jumps, _)| *jumps)
    }

    /// Sectors visited going from `from` to `to`, both ends included.
    pub fn route(&self, from: EntityId, to: EntityId) -> Option<Vec<EntityId>> {
        let tree = self.trees.get(&from)?;
        tree.get(&to)?;
        let mut route = vec![to];
        let mut cursor = to;
        while cursor != from {
            cursor = tree.get(&cursor)?.1;
            route.push(cursor);
        }
        route.reverse();
        Some(route)
    }

    /// The sector to jump to first when heading from `from` to `to`.
    pub fn next_hop(&self, from: EntityId, to: EntityId) -> Option<EntityId> {
        self.route(from, to)?.get(1).copied()
    }

    /// The gate in `from` that jumps to the adjacent sector `to`.
    pub fn gate(&self, from: EntityId, to: EntityId) -> Option<EntityId> {
        self.gates.get(&(from, to)).copied()
    }

    /// The closest of `candidates` to `from`, ties broken by lowest id.
    pub fn nearest(
        &self,
        from: EntityId,
        candidates: impl IntoIterator<Item = EntityId>,
    ) -> Option<(EntityId, u32)> {
        candidates
            .into_iter()
            .filter_map(|c| self.distance(from, c).map(|d| (c, d)))
            .min_by_key(|(c, d)| (*d, *c))
    }

    pub fn neighbours(&self, sector: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.adjacency.get(&sector).into_iter().flatten().copied()
    }

    pub fn sectors(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(n: u64) -> EntityId {
        EntityId(n)
    }

    #[test]
    fn test_disconnected_sector_is_unreachable() {
        let table = PathTable::build([s(1), s(2), s(3)], [(s(1), s(2))]);
        assert_eq!(table.distance(s(1), s(2)), Some(1));
        assert_eq!(table.distance(s(2), s(1)), Some(1));
        assert_eq!(table.distance(s(1), s(3)), None);
        assert_eq!(table.route(s(1), s(3)), None);
        assert_eq!(table.distance(s(3), s(3)), Some(0));
    }

    #[test]
    fn test_route_follows_shortest_path() {
        // 1 - 2 - 3 - 4, plus shortcut 1 - 4
        let table = PathTable::build(
            [s(1), s(2), s(3), s(4)],
            [(s(1), s(2)), (s(2), s(3)), (s(3), s(4)), (s(1), s(4))],
        );
        assert_eq!(table.distance(s(1), s(3)), Some(2));
        assert_eq!(table.route(s(1), s(4)), Some(vec![s(1), s(4)]));
        assert_eq!(table.next_hop(s(2), s(4)), Some(s(1)));
        assert_eq!(table.route(s(2), s(2)), Some(vec![s(2)]));
    }

    #[test]
    fn test_unknown_sector_is_a_miss() {
        let table = PathTable::build([s(1)], []);
        assert_eq!(table.distance(s(1), s(9)), None);
        assert_eq!(table.distance(s(9), s(1)), None);
        assert_eq!(table.next_hop(s(1), s(1)), None);
    }

    #[test]
    fn test_nearest_breaks_ties_by_id() {
        let table = PathTable::build(
            [s(1), s(2), s(3), s(4)],
            [(s(1), s(2)), (s(1), s(3)), (s(3), s(4))],
        );
        assert_eq!(table.nearest(s(1), [s(4), s(3), s(2)]), Some((s(2), 1)));
        assert_eq!(table.nearest(s(1), [s(9)]), None);
    }

    #[test]
    fn test_from_world_reads_gates() {
        use sim_math::{HexCoord, Vec2};

        let mut world = World::new();
        let a = world
            .spawn_with([Sector { hex: HexCoord::ORIGIN }.into()], Vec::<String>::new())
            .unwrap();
        let b = world
            .spawn_with([Sector { hex: HexCoord::new(1, 0) }.into()], Vec::<String>::new())
            .unwrap();
        let lonely = world
            .spawn_with([Sector { hex: HexCoord::new(5, 5) }.into()], Vec::<String>::new())
            .unwrap();
        let gate_a = world
            .spawn_with(
                [Position::new(Vec2::ZERO, a).into(), Teleport::default().into()],
                Vec::<String>::new(),
            )
            .unwrap();
        let gate_b = world
            .spawn_with(
                [
                    Position::new(Vec2::ZERO, b).into(),
                    Teleport { destination_id: Some(gate_a) }.into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap();
        world.component_mut::<Teleport>(gate_a).unwrap().destination_id = Some(gate_b);

        let table = PathTable::from_world(&world);
        assert_eq!(table.distance(a, b), Some(1));
        assert_eq!(table.gate(a, b), Some(gate_a));
        assert_eq!(table.gate(b, a), Some(gate_b));
        assert_eq!(table.distance(a, lonely), None);
    }
}
