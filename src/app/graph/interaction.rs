use eframe::egui::{self, Rect, Response, Ui, Vec2};

use crate::world::LineStyle;

use super::super::render_utils::screen_to_world;
use super::super::{DragState, SimGraph, ViewModel};

/// Wheel zoom in wheel-delta convention: positive `delta_y` (scrolling down)
/// shrinks the scale by `delta_y * 0.001`, clamped to [0.1, 5]. Zoom is
/// anchored at the viewport center, not the pointer; pan is untouched.
pub(in crate::app) fn apply_wheel_zoom(zoom: f32, delta_y: f32) -> f32 {
    (zoom - delta_y * 0.001).clamp(0.1, 5.0)
}

/// Active nodes draw in order, so the reverse scan returns the topmost node
/// under the pointer. Strictly inside the disc counts; the rim does not.
pub(in crate::app) fn hit_test(sim: &SimGraph, world: Vec2) -> Option<usize> {
    sim.active_nodes.iter().rev().copied().find(|&index| {
        let node = &sim.nodes[index];
        (world - node.pos).length_sq() < node.radius * node.radius
    })
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        // egui reports scroll-up as positive, the inverse of wheel deltaY.
        self.zoom = apply_wheel_zoom(self.zoom, -scroll);
    }

    pub(in crate::app) fn handle_graph_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let pointer = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|input| input.pointer.hover_pos()));
        if let Some(pointer) = pointer {
            self.pointer_world = screen_to_world(rect, self.pan, self.zoom, pointer);
        }

        self.hovered = if response.hovered() || response.dragged() {
            pointer.and(hit_test(&self.sim, self.pointer_world))
        } else {
            None
        };

        if response.drag_started_by(egui::PointerButton::Primary) {
            let shift_held = ui.input(|input| input.modifiers.shift);
            self.drag = match self.hovered {
                Some(index) if shift_held => DragState::Connect(index),
                Some(index) => DragState::Node(index),
                None => DragState::Pan,
            };
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match self.drag {
                DragState::Node(index) => {
                    if let Some(node) = self.sim.nodes.get_mut(index) {
                        node.pos = self.pointer_world;
                        node.velocity = Vec2::ZERO;
                    }
                }
                // Raw screen delta: pan speed stays constant across zoom levels.
                DragState::Pan => self.pan += response.drag_delta(),
                _ => {}
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.drag_stopped() {
            if let DragState::Connect(source) = self.drag {
                match self.hovered {
                    Some(target) if target != source => self.commit_connection(source, target),
                    // Released over empty space or the source itself: silent no-op.
                    _ => {}
                }
            }
            self.drag = DragState::Idle;
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            if self.connect_armed {
                match (self.connect_source, self.hovered) {
                    (None, Some(index)) => self.connect_source = Some(index),
                    (Some(source), Some(target)) if target != source => {
                        self.commit_connection(source, target);
                        self.connect_armed = false;
                        self.connect_source = None;
                    }
                    // Clicking empty space drops the pending source but the
                    // toggle stays armed for another attempt.
                    (Some(_), None) => self.connect_source = None,
                    _ => {}
                }
            } else {
                let selected = self
                    .hovered
                    .and_then(|index| self.sim.nodes.get(index))
                    .map(|node| node.id.clone());
                self.set_selected(selected);
            }
        }

        if self.double_click_focus && response.double_clicked() {
            if let Some(index) = hit_test(&self.sim, self.pointer_world) {
                let id = self.sim.nodes[index].id.clone();
                self.sim.nodes[index].velocity = Vec2::ZERO;
                let pos = self.sim.nodes[index].pos;
                self.zoom = 1.0;
                self.pan = -pos * self.zoom;
                self.set_focus(Some(id));
            }
        }
    }

    /// Creates the relationship for a completed connect gesture with the
    /// currently typed label (default "Connected") and a solid stroke.
    pub(in crate::app) fn commit_connection(&mut self, source: usize, target: usize) {
        if source == target {
            return;
        }
        let (Some(source_node), Some(target_node)) =
            (self.sim.nodes.get(source), self.sim.nodes.get(target))
        else {
            return;
        };
        let source_id = source_node.id.clone();
        let target_id = target_node.id.clone();

        let trimmed = self.relationship_label.trim();
        let label = if trimmed.is_empty() {
            "Connected".to_owned()
        } else {
            trimmed.to_owned()
        };

        if self
            .world
            .create_relationship(&source_id, &target_id, &label, LineStyle::Solid)
        {
            self.world_dirty = true;
            self.graph_dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::sim_with_nodes;
    use eframe::egui::vec2;

    #[test]
    fn wheel_zoom_matches_the_documented_arithmetic() {
        // deltaY = 500 takes 0.5 off the scale before clamping.
        assert!((apply_wheel_zoom(0.8, 500.0) - 0.3).abs() < 1e-6);
        assert!((apply_wheel_zoom(1.0, -250.0) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn wheel_zoom_clamps_to_the_scale_range() {
        assert_eq!(apply_wheel_zoom(0.15, 500.0), 0.1);
        assert_eq!(apply_wheel_zoom(4.9, -5000.0), 5.0);
    }

    #[test]
    fn hit_test_picks_the_topmost_node_and_only_inside_the_disc() {
        // Two overlapping discs; the later-drawn node wins the tie.
        let sim = sim_with_nodes(&[("under", 0.0, 0.0), ("over", 10.0, 0.0)]);
        assert_eq!(hit_test(&sim, vec2(5.0, 0.0)), Some(1));
        assert_eq!(hit_test(&sim, vec2(-10.0, 0.0)), Some(0));
        // Outside both radii (18): no hit. Exactly on the rim: no hit.
        assert_eq!(hit_test(&sim, vec2(100.0, 100.0)), None);
        assert_eq!(hit_test(&sim, vec2(-18.0, 0.0)), None);
    }

    #[test]
    fn hit_test_ignores_inactive_nodes() {
        let mut sim = sim_with_nodes(&[("a", 0.0, 0.0), ("b", 100.0, 0.0)]);
        super::super::apply_focus_scope(&mut sim, Some("a"));
        assert_eq!(hit_test(&sim, vec2(100.0, 0.0)), None);
        assert_eq!(hit_test(&sim, vec2(0.0, 0.0)), Some(0));
    }
}
