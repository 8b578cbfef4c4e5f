use serde::{Deserialize, Serialize};

/// How a relationship line is stroked in the graph view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Closed set of node silhouettes an entity can pick as a visual override.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Hexagon,
}

/// A typed, directed link owned by its source entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub target: String,
    pub label: String,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// The full world-building vault: every entity with its embedded outgoing
/// relationships, plus the category palette.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl World {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.entities
            .iter()
            .map(|entity| entity.relationships.len())
            .sum()
    }

    /// Appends a relationship from `source` to `target`. Self-links and
    /// unknown endpoints are silently refused, matching the connect gesture's
    /// no-op contract.
    pub fn create_relationship(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
        style: LineStyle,
    ) -> bool {
        if source == target || self.entity(target).is_none() {
            return false;
        }

        let Some(entity) = self.entity_mut(source) else {
            return false;
        };

        let id = format!("rel-{}-{}-{}", source, target, entity.relationships.len());
        entity.relationships.push(Relationship {
            id,
            target: target.to_owned(),
            label: label.to_owned(),
            style,
            color: None,
            width: None,
        });
        true
    }

    /// Removes an entity along with every relationship pointing at it.
    pub fn delete_entity(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.id != id);
        if self.entities.len() == before {
            return false;
        }

        for entity in &mut self.entities {
            entity
                .relationships
                .retain(|relationship| relationship.target != id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> World {
        World {
            entities: vec![
                Entity {
                    id: "aria".into(),
                    title: "Aria".into(),
                    category: Some("characters".into()),
                    tags: vec!["protagonist".into()],
                    note: None,
                    color: None,
                    scale: None,
                    shape: NodeShape::Circle,
                    relationships: vec![Relationship {
                        id: "r1".into(),
                        target: "ravenhold".into(),
                        label: "lives in".into(),
                        style: LineStyle::Solid,
                        color: None,
                        width: None,
                    }],
                },
                Entity {
                    id: "ravenhold".into(),
                    title: "Ravenhold".into(),
                    category: Some("locations".into()),
                    tags: Vec::new(),
                    note: None,
                    color: None,
                    scale: None,
                    shape: NodeShape::Square,
                    relationships: Vec::new(),
                },
            ],
            categories: vec![Category {
                id: "characters".into(),
                name: "Characters".into(),
                color: "#8b5cf6".into(),
            }],
        }
    }

    #[test]
    fn create_relationship_refuses_self_links_and_unknown_targets() {
        let mut world = sample_world();
        assert!(!world.create_relationship("aria", "aria", "knows", LineStyle::Solid));
        assert!(!world.create_relationship("aria", "missing", "knows", LineStyle::Solid));
        assert!(!world.create_relationship("missing", "aria", "knows", LineStyle::Solid));
        assert_eq!(world.relationship_count(), 1);

        assert!(world.create_relationship("ravenhold", "aria", "houses", LineStyle::Dashed));
        assert_eq!(world.relationship_count(), 2);
        let created = &world.entity("ravenhold").unwrap().relationships[0];
        assert_eq!(created.target, "aria");
        assert_eq!(created.style, LineStyle::Dashed);
    }

    #[test]
    fn delete_entity_cascades_to_inbound_relationships() {
        let mut world = sample_world();
        assert!(world.delete_entity("ravenhold"));
        assert!(world.entity("ravenhold").is_none());
        assert!(world.entity("aria").unwrap().relationships.is_empty());
        assert!(!world.delete_entity("ravenhold"));
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let raw = r#"{
            "entities": [
                {"id": "a", "title": "A"},
                {"id": "b", "title": "B", "relationships": [{"id": "r", "target": "a", "label": "knows"}]}
            ]
        }"#;
        let world: World = serde_json::from_str(raw).unwrap();
        assert_eq!(world.entity_count(), 2);
        assert!(world.categories.is_empty());
        let entity = world.entity("a").unwrap();
        assert_eq!(entity.shape, NodeShape::Circle);
        assert!(entity.tags.is_empty());
        let relationship = &world.entity("b").unwrap().relationships[0];
        assert_eq!(relationship.style, LineStyle::Solid);
        assert!(relationship.width.is_none());
    }
}
