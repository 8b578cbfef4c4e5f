use std::collections::HashSet;

use eframe::egui::Vec2;

use super::super::{SimGraph, ViewModel};

/// Restricts the active sets to the focal node's 1-hop ego network: the focal
/// node, every node sharing an edge with it, and every edge touching it. With
/// no focal node (or an unknown id) the full graph is active.
pub(in crate::app) fn apply_focus_scope(sim: &mut SimGraph, focal: Option<&str>) {
    let Some(focal_index) = focal.and_then(|id| sim.index_by_id.get(id).copied()) else {
        sim.activate_all();
        return;
    };

    let mut node_set = HashSet::new();
    node_set.insert(focal_index);

    sim.active_edges.clear();
    for (edge_index, edge) in sim.edges.iter().enumerate() {
        if edge.source == focal_index || edge.target == focal_index {
            sim.active_edges.push(edge_index);
            node_set.insert(edge.source);
            node_set.insert(edge.target);
        }
    }

    sim.active_nodes.clear();
    sim.active_nodes
        .extend((0..sim.nodes.len()).filter(|index| node_set.contains(index)));
    sim.active_mask.clear();
    sim.active_mask.resize(sim.nodes.len(), false);
    for &index in &sim.active_nodes {
        sim.active_mask[index] = true;
    }
}

impl ViewModel {
    /// Changes the focal node and rescopes the active sets. Nodes activated
    /// by entering focus have their velocity zeroed so forces accumulated
    /// while inactive cannot jolt the layout; leaving focus keeps velocities
    /// as they are.
    pub(in crate::app) fn set_focus(&mut self, focal: Option<String>) {
        if self.focus == focal {
            return;
        }

        let was_active = self.sim.active_mask.clone();
        self.focus = focal;
        apply_focus_scope(&mut self.sim, self.focus.as_deref());

        if self.focus.is_some() {
            for &index in &self.sim.active_nodes.clone() {
                if !was_active.get(index).copied().unwrap_or(false) {
                    self.sim.nodes[index].velocity = Vec2::ZERO;
                }
            }
        }
    }
}
