use eframe::egui::{self, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (title or note)")
            .on_hover_text("Fuzzy-match entities; everything else dims in the graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to dim non-matching nodes, then click one to select it.");

        ui.label("Tag filter");
        ui.text_edit_singleline(&mut self.tag_filter)
            .on_hover_text("Exact tag, case-insensitive. Combines with the search box.");

        self.draw_search_results(ui);

        ui.separator();

        let connect_toggle = ui
            .checkbox(&mut self.connect_armed, "Connect mode")
            .on_hover_text(
                "Click a source node, then a target, to create a relationship. \
                 Shift-dragging between nodes works without arming this.",
            );
        if connect_toggle.changed() && !self.connect_armed {
            self.connect_source = None;
        }
        if self.connect_armed {
            match self.connect_source {
                Some(index) => {
                    let source = self
                        .sim
                        .nodes
                        .get(index)
                        .map(|node| node.title.as_str())
                        .unwrap_or("?");
                    ui.small(format!("source: {source} — click a target"));
                }
                None => {
                    ui.small("click a node to pick the source");
                }
            }
        }

        ui.label("Relationship label");
        ui.text_edit_singleline(&mut self.relationship_label)
            .on_hover_text("Label for newly created relationships. Empty means \"Connected\".");

        ui.separator();

        ui.add(
            egui::Slider::new(&mut self.repulsion, 100.0..=3000.0)
                .step_by(50.0)
                .text("Repulsion"),
        )
        .on_hover_text("How strongly nodes push away from each other.");

        ui.add(
            egui::Slider::new(&mut self.link_distance, 50.0..=400.0)
                .step_by(10.0)
                .text("Link distance"),
        )
        .on_hover_text("Rest length the edge springs pull toward.");

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Continuously simulate layout forces while viewing the graph.");

        ui.checkbox(&mut self.adaptive_text, "Adaptive labels")
            .on_hover_text("Hide titles and notes when zoomed out instead of always drawing them.");

        ui.checkbox(&mut self.double_click_focus, "Double-click to focus")
            .on_hover_text("Double-clicking a node centers it and scopes the graph to its neighbors.");

        ui.separator();

        match self.focus.clone() {
            Some(focus) => {
                let title = self
                    .world
                    .entity(&focus)
                    .map(|entity| entity.title.clone())
                    .unwrap_or(focus);
                ui.label(format!("Focused on: {title}"));
                if ui.button("Clear focus").clicked() {
                    self.set_focus(None);
                }
            }
            None => {
                ui.label("No focus — showing the whole world.");
            }
        }
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches: Vec<(i64, usize)> = self
            .sim
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                matcher
                    .fuzzy_match(&node.title, query)
                    .map(|score| (score, index))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        matches.truncate(20);

        let mut selected_id = None;

        ui.add_space(4.0);
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(160.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (_, index) in &matches {
                    let node = &self.sim.nodes[*index];
                    let is_selected = self.selected.as_deref() == Some(node.id.as_str());
                    if ui.selectable_label(is_selected, node.title.as_str()).clicked() {
                        selected_id = Some(node.id.clone());
                    }
                }
                if matches.is_empty() {
                    ui.small("no matching entities");
                }
            });

        if let Some(id) = selected_id {
            self.set_selected(Some(id));
        }
    }
}
