use std::collections::HashSet;

use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::world::{LineStyle, NodeShape};

use super::super::physics::step_physics;
use super::super::render_utils::{
    circle_points, circle_visible, darken, draw_background, flatten_quad, quad_end_tangent,
    quad_point, with_opacity, world_to_screen,
};
use super::super::{DragState, PhysicsConfig, SimGraph, ViewModel};

const DEFAULT_EDGE_COLOR: Color32 = Color32::from_gray(128);
const HOVER_STROKE_COLOR: Color32 = Color32::from_rgb(125, 211, 252);
const FOCUS_RING_COLOR: Color32 = Color32::from_rgb(245, 158, 11);
const DIM_OPACITY: f32 = 0.2;
/// Perpendicular fan-out step between parallel edges, in world units.
const PARALLEL_EDGE_SPACING: f32 = 40.0;
/// Curve offset for a lone edge whose inverse also exists, so A->B and B->A
/// bow away from each other instead of overlapping.
const INVERSE_EDGE_OFFSET: f32 = 30.0;
const ARROW_SIZE: f32 = 9.0;

/// Nodes passing the search and tag filters; `None` when no filter is active.
/// Non-matching nodes are dimmed, never hidden, so spatial context survives.
fn filter_matches(sim: &SimGraph, search: &str, tag: &str) -> Option<HashSet<usize>> {
    let search = search.trim();
    let tag = tag.trim();
    if search.is_empty() && tag.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default();
    Some(
        sim.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let search_ok = search.is_empty()
                    || matcher.fuzzy_match(&node.title, search).is_some()
                    || matcher
                        .fuzzy_match(&node.title.to_ascii_lowercase(), &search.to_ascii_lowercase())
                        .is_some();
                let tag_ok =
                    tag.is_empty() || node.tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
                (search_ok && tag_ok).then_some(index)
            })
            .collect(),
    )
}

fn stroke_polyline(painter: &egui::Painter, points: Vec<Pos2>, style: LineStyle, stroke: Stroke) {
    match style {
        LineStyle::Solid => {
            painter.add(Shape::line(points, stroke));
        }
        LineStyle::Dashed => {
            painter.extend(Shape::dashed_line(&points, stroke, 8.0, 5.0));
        }
        LineStyle::Dotted => {
            painter.extend(Shape::dashed_line(&points, stroke, 1.5, 4.0));
        }
    }
}

fn draw_arrowhead(painter: &egui::Painter, tip: Pos2, direction: Vec2, color: Color32) {
    let perp = vec2(-direction.y, direction.x);
    let base = tip - direction * ARROW_SIZE;
    let left = base + perp * (ARROW_SIZE * 0.45);
    let right = base - perp * (ARROW_SIZE * 0.45);
    painter.add(Shape::convex_polygon(
        vec![tip, left, right],
        color,
        Stroke::NONE,
    ));
}

fn shape_points(shape: NodeShape, center: Pos2, radius: f32) -> Vec<Pos2> {
    match shape {
        NodeShape::Circle => circle_points(center, radius, 32),
        NodeShape::Square => {
            let half = radius * 0.85;
            vec![
                center + vec2(-half, -half),
                center + vec2(half, -half),
                center + vec2(half, half),
                center + vec2(-half, half),
            ]
        }
        NodeShape::Diamond => vec![
            center + vec2(0.0, -radius),
            center + vec2(radius, 0.0),
            center + vec2(0.0, radius),
            center + vec2(-radius, 0.0),
        ],
        NodeShape::Hexagon => (0..6)
            .map(|step| {
                let angle = std::f32::consts::FRAC_PI_2 + (step as f32 / 6.0) * std::f32::consts::TAU;
                center + vec2(radius * angle.cos(), radius * angle.sin())
            })
            .collect(),
    }
}

fn draw_node_shape(
    painter: &egui::Painter,
    shape: NodeShape,
    center: Pos2,
    radius: f32,
    fill: Color32,
    stroke: Stroke,
) {
    match shape {
        NodeShape::Circle => {
            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, stroke);
        }
        other => {
            let points = shape_points(other, center, radius);
            painter.add(Shape::convex_polygon(points.clone(), fill, Stroke::NONE));
            painter.add(Shape::closed_line(points, stroke));
        }
    }
}

fn draw_node_shadow(painter: &egui::Painter, shape: NodeShape, center: Pos2, radius: f32, opacity: f32) {
    let shadow = Color32::from_black_alpha((70.0 * opacity) as u8);
    let offset = center + vec2(2.0, 3.0);
    match shape {
        NodeShape::Circle => {
            painter.circle_filled(offset, radius, shadow);
        }
        other => {
            painter.add(Shape::convex_polygon(
                shape_points(other, offset, radius),
                shadow,
                Stroke::NONE,
            ));
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_sim_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, &response);
        self.handle_graph_input(ui, rect, &response);
        // A committed connect gesture dirties the graph mid-frame; rebuild so
        // this frame already draws the new edge.
        if self.graph_dirty {
            self.rebuild_sim_graph();
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let focal_index = self
            .focus
            .as_deref()
            .and_then(|id| self.sim.index_by_id.get(id).copied());
        let pinned = match self.drag {
            DragState::Node(index) => Some(index),
            _ => None,
        };

        let config = PhysicsConfig {
            repulsion: self.repulsion,
            link_distance: self.link_distance,
            focused: self.focus.is_some(),
        };
        let mut physics_moving = false;
        if self.live_physics {
            physics_moving = step_physics(&mut self.sim, config, pinned, focal_index);
        }
        if physics_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        if self.hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let matches = filter_matches(&self.sim, &self.search, &self.tag_filter);
        let connect_source = match self.drag {
            DragState::Connect(source) => Some(source),
            _ => self.connect_source,
        };
        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| self.sim.index_by_id.get(id).copied());
        let hovered_index = self.hovered;

        let sim = &self.sim;
        let node_screen = |index: usize| world_to_screen(rect, pan, zoom, sim.nodes[index].pos);

        for &edge_index in &sim.active_edges {
            let edge = &sim.edges[edge_index];
            let source = &sim.nodes[edge.source];
            let target = &sim.nodes[edge.target];

            let endpoints_match = matches
                .as_ref()
                .is_none_or(|set| set.contains(&edge.source) && set.contains(&edge.target));
            let opacity = if endpoints_match { 1.0 } else { DIM_OPACITY };
            let color = with_opacity(edge.color.unwrap_or(DEFAULT_EDGE_COLOR), opacity);
            let stroke = Stroke::new(edge.width, color);
            let endpoint_active = hovered_index == Some(edge.source)
                || hovered_index == Some(edge.target)
                || selected_index == Some(edge.source)
                || selected_index == Some(edge.target);
            let show_label = !edge.label.is_empty() && endpoints_match && (zoom > 0.8 || endpoint_active);

            if edge.is_self {
                // Decorative arc by the node; its size tracks the node, not
                // any notion of edge length.
                let center = node_screen(edge.source);
                let radius = source.radius * zoom;
                let loop_center = center + vec2(radius * 0.9, -radius * 0.9);
                let loop_radius = (radius * 0.7).max(6.0);
                if circle_visible(rect, loop_center, loop_radius) {
                    stroke_polyline(
                        &painter,
                        circle_points(loop_center, loop_radius, 24),
                        edge.style,
                        stroke,
                    );
                    if show_label {
                        painter.text(
                            loop_center - vec2(0.0, loop_radius + 4.0),
                            Align2::CENTER_BOTTOM,
                            &edge.label,
                            FontId::proportional(10.5),
                            with_opacity(Color32::from_gray(200), opacity),
                        );
                    }
                }
                continue;
            }

            let axis = target.pos - source.pos;
            let length = axis.length();
            if length <= f32::EPSILON {
                continue;
            }

            let start = node_screen(edge.source);
            let end = node_screen(edge.target);
            if !circle_visible(rect, start, 4.0)
                && !circle_visible(rect, end, 4.0)
                && !rect.expand(60.0).contains(start + (end - start) * 0.5)
            {
                continue;
            }

            let offset = if edge.total > 1 {
                (edge.index as f32 - (edge.total as f32 - 1.0) / 2.0) * PARALLEL_EDGE_SPACING
            } else if edge.inverse_exists {
                INVERSE_EDGE_OFFSET
            } else {
                0.0
            };

            let (control, tangent) = if offset != 0.0 {
                let perp = vec2(-axis.y, axis.x) / length;
                let control_world = source.pos + axis * 0.5 + perp * offset;
                let control = world_to_screen(rect, pan, zoom, control_world);
                (Some(control), quad_end_tangent(control, end))
            } else {
                (None, (end - start).normalized())
            };

            match control {
                None => stroke_polyline(&painter, vec![start, end], edge.style, stroke),
                Some(control) if edge.style == LineStyle::Solid => {
                    painter.add(QuadraticBezierShape::from_points_stroke(
                        [start, control, end],
                        false,
                        Color32::TRANSPARENT,
                        stroke,
                    ));
                }
                Some(control) => {
                    stroke_polyline(
                        &painter,
                        flatten_quad(start, control, end, 24),
                        edge.style,
                        stroke,
                    );
                }
            }

            // Arrow geometry lives in screen space so its size is constant
            // across zoom levels; only the rim inset tracks the node.
            let tip = end - tangent * (target.radius * zoom + 2.0);
            draw_arrowhead(&painter, tip, tangent, color);

            if show_label {
                let mid = control
                    .map(|control| quad_point(start, control, end, 0.5))
                    .unwrap_or_else(|| start + (end - start) * 0.5);
                painter.text(
                    mid - vec2(0.0, 6.0),
                    Align2::CENTER_BOTTOM,
                    &edge.label,
                    FontId::proportional(10.5),
                    with_opacity(Color32::from_gray(200), opacity),
                );
            }
        }

        if let Some(source) = connect_source.filter(|&source| source < sim.nodes.len()) {
            let start = node_screen(source);
            let end = match hovered_index {
                Some(target) if target != source => node_screen(target),
                _ => world_to_screen(rect, pan, zoom, self.pointer_world),
            };
            painter.extend(Shape::dashed_line(
                &[start, end],
                Stroke::new(1.5, FOCUS_RING_COLOR),
                6.0,
                4.0,
            ));
            let label = if self.relationship_label.trim().is_empty() {
                "Connected"
            } else {
                self.relationship_label.trim()
            };
            painter.text(
                start + (end - start) * 0.5 - vec2(0.0, 8.0),
                Align2::CENTER_BOTTOM,
                label,
                FontId::proportional(11.0),
                FOCUS_RING_COLOR,
            );
        }

        for &index in &sim.active_nodes {
            let node = &sim.nodes[index];
            let center = node_screen(index);
            let radius = node.radius * zoom;
            if !circle_visible(rect, center, radius + 4.0) {
                continue;
            }

            let node_matches = matches.as_ref().is_none_or(|set| set.contains(&index));
            let opacity = if node_matches { 1.0 } else { DIM_OPACITY };
            let is_selected = selected_index == Some(index);
            let is_connect_source = connect_source == Some(index);
            let is_hovered = hovered_index == Some(index);

            let fill = with_opacity(node.color, opacity);
            let stroke = if is_selected || is_connect_source {
                Stroke::new(3.0, with_opacity(Color32::WHITE, opacity))
            } else if is_hovered {
                Stroke::new(2.0, HOVER_STROKE_COLOR)
            } else {
                Stroke::new(1.5, with_opacity(darken(node.color, 0.45), opacity))
            };

            draw_node_shadow(&painter, node.shape, center, radius, opacity);
            draw_node_shape(&painter, node.shape, center, radius, fill, stroke);
        }

        for &index in &sim.active_nodes {
            let node = &sim.nodes[index];
            let center = node_screen(index);
            let radius = node.radius * zoom;
            if !circle_visible(rect, center, radius + 60.0) {
                continue;
            }

            let node_matches = matches.as_ref().is_none_or(|set| set.contains(&index));
            let opacity = if node_matches { 1.0 } else { DIM_OPACITY };
            let always_labeled = hovered_index == Some(index)
                || selected_index == Some(index)
                || focal_index == Some(index);

            let show_title = !self.adaptive_text || zoom > 0.8 || always_labeled;
            if show_title {
                painter.text(
                    center + vec2(0.0, radius + 6.0),
                    Align2::CENTER_TOP,
                    &node.title,
                    FontId::proportional(13.0),
                    with_opacity(Color32::from_gray(235), opacity),
                );
            }

            if let Some(note) = &node.note {
                let show_note = !self.adaptive_text || zoom > 0.6 || always_labeled;
                if show_title && show_note {
                    painter.text(
                        center + vec2(0.0, radius + 23.0),
                        Align2::CENTER_TOP,
                        note,
                        FontId::proportional(10.5),
                        with_opacity(Color32::from_gray(165), opacity),
                    );
                }
            }
        }

        if let Some(focal) = focal_index {
            let center = node_screen(focal);
            let radius = sim.nodes[focal].radius * zoom + 6.0;
            painter.extend(Shape::dashed_line(
                &circle_points(center, radius, 48),
                Stroke::new(2.0, FOCUS_RING_COLOR),
                6.0,
                4.0,
            ));
        }
    }
}
