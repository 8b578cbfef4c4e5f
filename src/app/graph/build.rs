use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Vec2, vec2};

use crate::util::{parse_hex_color, stable_pair};
use crate::world::World;

use super::super::{SimEdge, SimGraph, SimNode, ViewModel};
use super::apply_focus_scope;

const BASE_NODE_RADIUS: f32 = 18.0;
const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(156, 163, 175);
const DEFAULT_EDGE_WIDTH: f32 = 2.0;
/// New nodes without a saved position land within this range of the origin.
const PLACEMENT_JITTER: f32 = 100.0;

/// Derives the simulatable node/edge set from the world. Position seeding
/// priority per node: the persisted position map, then the position a prior
/// in-memory node with the same id already holds, then a deterministic jitter
/// point near the origin. Velocity carries over with the prior node; fresh
/// nodes start at rest. Relationships pointing at missing entities are
/// dropped without comment (stale data, not an error).
pub(in crate::app) fn build_sim_graph(
    world: &World,
    saved_positions: &HashMap<String, (f32, f32)>,
    prior: &SimGraph,
) -> SimGraph {
    let mut sim = SimGraph::default();

    for entity in &world.entities {
        let color = entity
            .color
            .as_deref()
            .and_then(parse_hex_color)
            .or_else(|| {
                entity
                    .category
                    .as_deref()
                    .and_then(|id| world.category(id))
                    .and_then(|category| parse_hex_color(&category.color))
            })
            .unwrap_or(DEFAULT_NODE_COLOR);

        let prior_node = prior
            .index_by_id
            .get(&entity.id)
            .and_then(|&index| prior.nodes.get(index));

        let pos = if let Some(&(x, y)) = saved_positions.get(&entity.id) {
            vec2(x, y)
        } else if let Some(prior_node) = prior_node {
            prior_node.pos
        } else {
            let (jx, jy) = stable_pair(&entity.id);
            vec2(jx, jy) * PLACEMENT_JITTER
        };
        let velocity = prior_node.map(|node| node.velocity).unwrap_or(Vec2::ZERO);

        sim.index_by_id.insert(entity.id.clone(), sim.nodes.len());
        sim.nodes.push(SimNode {
            id: entity.id.clone(),
            title: entity.title.clone(),
            note: entity.note.clone(),
            tags: entity.tags.clone(),
            pos,
            velocity,
            force: Vec2::ZERO,
            radius: BASE_NODE_RADIUS * entity.scale.unwrap_or(1.0).max(0.1),
            mass: 1.0,
            color,
            shape: entity.shape,
        });
    }

    for entity in &world.entities {
        let Some(&source) = sim.index_by_id.get(&entity.id) else {
            continue;
        };

        for relationship in &entity.relationships {
            let Some(&target) = sim.index_by_id.get(&relationship.target) else {
                continue;
            };

            sim.edges.push(SimEdge {
                source,
                target,
                label: relationship.label.clone(),
                style: relationship.style,
                color: relationship.color.as_deref().and_then(parse_hex_color),
                width: relationship.width.unwrap_or(DEFAULT_EDGE_WIDTH),
                index: 0,
                total: 1,
                is_self: source == target,
                inverse_exists: false,
            });
        }
    }

    assign_pair_groups(&mut sim.edges);
    sim.activate_all();
    sim
}

/// Groups edges by their unordered endpoint pair so A->B and B->A share a
/// group, then assigns each edge its fan-out rank and flags groups holding
/// both directions.
fn assign_pair_groups(edges: &mut [SimEdge]) {
    let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (edge_index, edge) in edges.iter().enumerate() {
        let key = (edge.source.min(edge.target), edge.source.max(edge.target));
        groups.entry(key).or_default().push(edge_index);
    }

    for members in groups.values() {
        let directions: HashSet<(usize, usize)> = members
            .iter()
            .map(|&edge_index| (edges[edge_index].source, edges[edge_index].target))
            .collect();
        let has_inverse = members.iter().any(|&edge_index| {
            let edge = &edges[edge_index];
            !edge.is_self && directions.contains(&(edge.target, edge.source))
        });

        for (rank, &edge_index) in members.iter().enumerate() {
            let edge = &mut edges[edge_index];
            edge.index = rank;
            edge.total = members.len();
            edge.inverse_exists = has_inverse;
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn rebuild_sim_graph(&mut self) {
        let prior = std::mem::take(&mut self.sim);
        let mut sim = build_sim_graph(&self.world, &self.saved_positions, &prior);

        if let Some(focus) = &self.focus
            && !sim.index_by_id.contains_key(focus)
        {
            self.focus = None;
        }
        apply_focus_scope(&mut sim, self.focus.as_deref());

        if let Some(selected) = &self.selected
            && !sim.index_by_id.contains_key(selected)
        {
            self.selected = None;
        }

        // Node indices from the previous build are meaningless now.
        self.hovered = None;
        self.drag = super::super::DragState::Idle;
        self.connect_source = None;

        self.sim = sim;
        self.graph_dirty = false;
    }
}
