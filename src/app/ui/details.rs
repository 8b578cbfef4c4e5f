use eframe::egui::{RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a node from the graph or the search results.");
            return;
        };

        let Some(entity) = self.world.entity(&selected_id) else {
            ui.label("Selected entity no longer exists in the world.");
            return;
        };

        let category_name = entity
            .category
            .as_deref()
            .map(|id| {
                self.world
                    .category(id)
                    .map(|category| category.name.clone())
                    .unwrap_or_else(|| id.to_owned())
            });
        let tags = entity.tags.clone();
        let note = entity.note.clone();
        // (relationship target id, target title if the target still exists, label)
        let relationships: Vec<(String, Option<String>, String)> = entity
            .relationships
            .iter()
            .map(|relationship| {
                let title = self
                    .world
                    .entity(&relationship.target)
                    .map(|target| target.title.clone());
                (relationship.target.clone(), title, relationship.label.clone())
            })
            .collect();

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.title_draft)
                .on_hover_text("Edit the entity title, then apply.");
            if ui.button("Rename").clicked() {
                let trimmed = self.title_draft.trim();
                if !trimmed.is_empty() {
                    let trimmed = trimmed.to_owned();
                    if let Some(entity) = self.world.entity_mut(&selected_id) {
                        entity.title = trimmed;
                        self.world_dirty = true;
                        self.graph_dirty = true;
                    }
                }
            }
        });
        ui.small(selected_id.as_str());
        ui.add_space(6.0);

        if let Some(category) = category_name {
            ui.label(format!("Category: {category}"));
        }
        if !tags.is_empty() {
            ui.label(format!("Tags: {}", tags.join(", ")));
        }
        if let Some(note) = note {
            ui.label(note);
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if self.focus.as_deref() == Some(selected_id.as_str()) {
                if ui.button("Clear focus").clicked() {
                    self.set_focus(None);
                }
            } else if ui.button("Focus").clicked() {
                self.set_focus(Some(selected_id.clone()));
            }

            if ui.button("Delete entity").clicked() {
                self.world.delete_entity(&selected_id);
                self.world_dirty = true;
                self.graph_dirty = true;
                self.set_selected(None);
            }
        });

        if self.selected.is_none() {
            return;
        }

        ui.separator();
        ui.label(RichText::new("Relationships").strong());
        if relationships.is_empty() {
            ui.label("No outgoing relationships.");
        } else {
            let mut jump_to = None;
            for (target_id, target_title, label) in &relationships {
                let target = target_title.as_deref().unwrap_or("(missing entity)");
                let row = format!("{label} \u{2192} {target}");
                if target_title.is_some() {
                    if ui.link(row).on_hover_text(target_id.as_str()).clicked() {
                        jump_to = Some(target_id.clone());
                    }
                } else {
                    ui.label(row);
                }
            }
            if let Some(id) = jump_to {
                self.set_selected(Some(id));
            }
        }
    }
}
