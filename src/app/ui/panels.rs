use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2, vec2};

use crate::world::{ViewState, World};

use super::super::{DragState, SimGraph, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(world: World, view_state: ViewState) -> Self {
        Self {
            world,
            world_dirty: false,
            saved_positions: view_state.node_positions,
            sim: SimGraph::default(),
            graph_dirty: true,
            selected: None,
            focus: None,
            hovered: None,
            drag: DragState::Idle,
            connect_armed: false,
            connect_source: None,
            pointer_world: Vec2::ZERO,
            pan: vec2(view_state.pan_x, view_state.pan_y),
            zoom: view_state.zoom.clamp(0.1, 5.0),
            search: String::new(),
            tag_filter: String::new(),
            relationship_label: String::new(),
            live_physics: true,
            repulsion: 800.0,
            link_distance: 150.0,
            adaptive_text: true,
            double_click_focus: true,
            title_draft: String::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        world_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_sim_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("loreweave");
                    ui.separator();
                    ui.label(format!("world: {}", world_path.display()));
                    ui.label(format!("entities: {}", self.world.entity_count()));
                    ui.label(format!(
                        "relationships: {}",
                        self.world.relationship_count()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload world"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(focus) = &self.focus {
                            ui.label(format!(
                                "focused: {} ({} in view)",
                                focus,
                                self.sim.active_nodes.len()
                            ));
                        } else {
                            ui.label(format!(
                                "in view: {} nodes / {} edges",
                                self.sim.active_nodes.len(),
                                self.sim.active_edges.len()
                            ));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading world...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        self.title_draft = self
            .selected
            .as_deref()
            .and_then(|id| self.world.entity(id))
            .map(|entity| entity.title.clone())
            .unwrap_or_default();
    }
}
