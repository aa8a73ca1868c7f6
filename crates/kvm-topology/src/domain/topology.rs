//! Topology graph derived from cell occupancy.
//!
//! There is no separately mutable edge list.  A screen's neighbor in a
//! direction is whatever screen occupies the adjacent cell, so adjacency is
//! symmetric by construction: if B is A's right neighbor, A is B's left
//! neighbor.  There is no wrap-around and no diagonal adjacency.
//!
//! Single lookups go straight to the occupancy index.  Whole-graph answers
//! (the link list and connected components) are computed once per registry
//! state and cached until the next mutation.

use std::collections::{HashSet, VecDeque};

use super::grid::Direction;
use super::registry::ScreenRegistry;
use super::screen::ScreenId;

/// A directional link: `to` is `from`'s neighbor in `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub from: ScreenId,
    pub direction: Direction,
    pub to: ScreenId,
}

/// Memoized whole-graph data for one registry state.
#[derive(Debug, Clone)]
pub(crate) struct AdjacencyView {
    links: Vec<Link>,
    components: Vec<Vec<ScreenId>>,
}

impl AdjacencyView {
    fn build(registry: &ScreenRegistry) -> Self {
        let ordered = registry.iter_ordered();

        let mut links = Vec::new();
        for screen in &ordered {
            for direction in Direction::ALL {
                if let Some(to) = screen.cell.step(direction).and_then(|cell| registry.id_at(cell)) {
                    links.push(Link {
                        from: screen.id,
                        direction,
                        to,
                    });
                }
            }
        }

        // Breadth-first search from every not-yet-visited screen, in row-major
        // order so the component list is deterministic.
        let mut visited: HashSet<ScreenId> = HashSet::with_capacity(ordered.len());
        let mut components = Vec::new();
        for start in &ordered {
            if !visited.insert(start.id) {
                continue;
            }
            let mut component = vec![start.id];
            let mut queue = VecDeque::from([start.cell]);
            while let Some(cell) = queue.pop_front() {
                for direction in Direction::ALL {
                    let Some(next) = cell.step(direction) else {
                        continue;
                    };
                    if let Some(id) = registry.id_at(next) {
                        if visited.insert(id) {
                            component.push(id);
                            queue.push_back(next);
                        }
                    }
                }
            }
            component.sort_by_key(|id| {
                registry
                    .get(*id)
                    .map(|s| s.cell.row_major_key())
                    .unwrap_or_default()
            });
            components.push(component);
        }

        Self { links, components }
    }
}

/// Borrowed, read-only view of the adjacency between placed screens.
#[derive(Debug, Clone, Copy)]
pub struct Topology<'a> {
    registry: &'a ScreenRegistry,
}

impl<'a> Topology<'a> {
    pub(crate) fn new(registry: &'a ScreenRegistry) -> Self {
        Self { registry }
    }

    fn view(&self) -> &'a AdjacencyView {
        let registry = self.registry;
        registry
            .adjacency_cache()
            .get_or_init(|| AdjacencyView::build(registry))
    }

    /// Returns the screen adjacent to `id` in `direction`.
    ///
    /// `None` if the adjacent cell is vacant, lies off the edge of the plane,
    /// or `id` is not registered.
    pub fn neighbor_of(&self, id: ScreenId, direction: Direction) -> Option<ScreenId> {
        let cell = self.registry.get(id)?.cell;
        self.registry.id_at(cell.step(direction)?)
    }

    /// Returns all four neighbors of `id`, indexed in [`Direction::ALL`] order.
    pub fn neighbors(&self, id: ScreenId) -> [Option<ScreenId>; 4] {
        Direction::ALL.map(|direction| self.neighbor_of(id, direction))
    }

    /// Every directional link, ordered row-major by source screen and then by
    /// [`Direction::ALL`].  Each adjacent pair appears twice, once per side.
    pub fn links(&self) -> &'a [Link] {
        &self.view().links
    }

    /// Connected components, each sorted row-major.  Empty for an empty registry.
    pub fn components(&self) -> &'a [Vec<ScreenId>] {
        &self.view().components
    }

    /// `true` if every placed screen can be reached from every other one by
    /// moving between occupied neighboring cells.
    ///
    /// An empty registry and a single screen are both connected.
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
