use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::World;

/// Reads the world file. A path that does not exist yet is a fresh vault and
/// yields an empty world; a file that exists but does not parse is an error.
pub fn load_world(path: &Path) -> Result<World> {
    if !path.exists() {
        return Ok(World::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read world file {}", path.display()))?;
    let world = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse world file {}", path.display()))?;
    Ok(world)
}

pub fn save_world(path: &Path, world: &World) -> Result<()> {
    let raw = serde_json::to_string_pretty(world).context("failed to serialize world")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write world file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_world_file_starts_empty() {
        let world = load_world(Path::new("/nonexistent/loreweave-test-world.json")).unwrap();
        assert_eq!(world.entity_count(), 0);
        assert!(world.categories.is_empty());
    }

    #[test]
    fn world_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("loreweave-load-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.json");

        let mut world = World::default();
        world.entities.push(super::super::Entity {
            id: "a".into(),
            title: "A".into(),
            category: None,
            tags: Vec::new(),
            note: None,
            color: None,
            scale: None,
            shape: super::super::NodeShape::Hexagon,
            relationships: Vec::new(),
        });

        save_world(&path, &world).unwrap();
        let restored = load_world(&path).unwrap();
        assert_eq!(restored.entity_count(), 1);
        assert_eq!(
            restored.entity("a").unwrap().shape,
            super::super::NodeShape::Hexagon
        );
    }

    #[test]
    fn malformed_world_file_is_an_error() {
        let dir = std::env::temp_dir().join("loreweave-load-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_world(&path).is_err());
    }
}
