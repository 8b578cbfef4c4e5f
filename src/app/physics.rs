use eframe::egui::Vec2;

use super::{PhysicsConfig, SimGraph};

/// Pairs further apart than 500 world units exert no repulsion. This is a
/// performance cutoff, not a physical law; distant pairs barely matter to the
/// layout anyway.
const REPULSION_CUTOFF_SQ: f32 = 250_000.0;
const SPRING_CONSTANT: f32 = 0.05;
const CENTER_PULL: f32 = 0.01;
const FORCE_STEP: f32 = 0.1;
/// Below this squared speed a node snaps to rest instead of jittering forever.
const SLEEP_SPEED_SQ: f32 = 0.0025;

/// Advances the active set by one tick: accumulate forces, then integrate.
/// The grabbed node and the focal node are skipped by integration; the focal
/// node is additionally hard-locked at zero velocity. Returns whether any
/// node is still moving so the caller can keep requesting repaints.
pub(in crate::app) fn step_physics(
    sim: &mut SimGraph,
    config: PhysicsConfig,
    pinned: Option<usize>,
    focal: Option<usize>,
) -> bool {
    for &index in &sim.active_nodes {
        sim.nodes[index].force = Vec2::ZERO;
    }

    let repulsion = if config.focused {
        config.repulsion * 0.8
    } else {
        config.repulsion
    };

    for a_slot in 0..sim.active_nodes.len() {
        let a = sim.active_nodes[a_slot];
        for b_slot in (a_slot + 1)..sim.active_nodes.len() {
            let b = sim.active_nodes[b_slot];
            let delta = sim.nodes[a].pos - sim.nodes[b].pos;
            let distance_sq = delta.length_sq();
            // Coincident pairs are degenerate; the cutoff bounds the O(n^2) pass.
            if distance_sq <= 0.0 || distance_sq > REPULSION_CUTOFF_SQ {
                continue;
            }

            let distance = distance_sq.sqrt();
            let push = (delta / distance) * (repulsion / distance);
            sim.nodes[a].force += push;
            sim.nodes[b].force -= push;
        }
    }

    for &edge_index in &sim.active_edges {
        let edge = &sim.edges[edge_index];
        if edge.is_self {
            continue;
        }
        let (source, target) = (edge.source, edge.target);
        if !sim.active_mask.get(source).copied().unwrap_or(false)
            || !sim.active_mask.get(target).copied().unwrap_or(false)
        {
            continue;
        }

        let delta = sim.nodes[target].pos - sim.nodes[source].pos;
        let distance = delta.length();
        if distance <= 0.0 {
            continue;
        }

        let pull = (delta / distance) * ((distance - config.link_distance) * SPRING_CONSTANT);
        sim.nodes[source].force += pull;
        sim.nodes[target].force -= pull;
    }

    if !config.focused {
        for &index in &sim.active_nodes {
            let gravity = sim.nodes[index].pos * CENTER_PULL;
            sim.nodes[index].force -= gravity;
        }
    }

    let friction = if config.focused { 0.85 } else { 0.9 };
    let max_speed: f32 = if config.focused { 5.0 } else { 10.0 };
    let max_speed_sq = max_speed * max_speed;
    let mut any_motion = false;

    for &index in &sim.active_nodes {
        if Some(index) == pinned {
            continue;
        }
        if Some(index) == focal {
            sim.nodes[index].velocity = Vec2::ZERO;
            continue;
        }

        let node = &mut sim.nodes[index];
        let mut velocity = (node.velocity + node.force * (FORCE_STEP / node.mass)) * friction;
        let speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= max_speed / speed_sq.sqrt();
        }
        if velocity.length_sq() < SLEEP_SPEED_SQ {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.pos += velocity;
        if velocity != Vec2::ZERO {
            any_motion = true;
        }
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{sim_with_edges, sim_with_nodes};
    use eframe::egui::vec2;

    fn unfocused(repulsion: f32, link_distance: f32) -> PhysicsConfig {
        PhysicsConfig {
            repulsion,
            link_distance,
            focused: false,
        }
    }

    #[test]
    fn gravity_alone_pulls_nodes_toward_the_origin() {
        let mut sim = sim_with_nodes(&[("a", 100.0, 50.0), ("b", -300.0, 0.0)]);
        let config = unfocused(0.0, 150.0);

        let start_a = sim.nodes[0].pos.length();
        let start_b = sim.nodes[1].pos.length();
        for _ in 0..200 {
            step_physics(&mut sim, config, None, None);
        }

        assert!(sim.nodes[0].pos.length() < start_a * 0.5);
        assert!(sim.nodes[1].pos.length() < start_b * 0.5);
    }

    #[test]
    fn velocity_never_exceeds_the_clamp_after_integration() {
        // Two nearly coincident nodes with a huge repulsion constant.
        let mut sim = sim_with_nodes(&[("a", 0.0, 0.0), ("b", 0.5, 0.0)]);
        let config = unfocused(1_000_000.0, 150.0);
        step_physics(&mut sim, config, None, None);
        for node in &sim.nodes {
            assert!(node.velocity.length() <= 10.0 + 1e-4);
        }

        let mut sim = sim_with_nodes(&[("a", 0.0, 0.0), ("b", 0.5, 0.0)]);
        let focused = PhysicsConfig {
            repulsion: 1_000_000.0,
            link_distance: 150.0,
            focused: true,
        };
        step_physics(&mut sim, focused, None, None);
        // Node a is focal in a typical focus scenario; here neither is locked,
        // so both obey the tighter focused clamp.
        for node in &sim.nodes {
            assert!(node.velocity.length() <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn spring_and_repulsion_scenario_is_deterministic() {
        // A at the origin, B at (100, 0), one edge A->B, repulsion 800,
        // ideal link distance 150. Repulsion pushes A by 800/100 = 8 to the
        // left; the spring is 50 short of rest so it pushes apart by
        // (100 - 150) * 0.05 = -2.5 along the axis; gravity only affects B.
        let mut sim = sim_with_edges(
            &[("a", 0.0, 0.0), ("b", 100.0, 0.0)],
            &[("a", "b", "knows")],
        );
        step_physics(&mut sim, unfocused(800.0, 150.0), None, None);

        // force on A: -8 (repulsion) - 2.5 (spring) = -10.5
        // velocity: -10.5 * 0.1 * 0.9 = -0.945
        assert!((sim.nodes[0].velocity.x - (-0.945)).abs() < 1e-4);
        assert_eq!(sim.nodes[0].velocity.y, 0.0);
        assert!((sim.nodes[0].pos.x - (-0.945)).abs() < 1e-4);

        // force on B: +8 + 2.5 - 1.0 (gravity) = 9.5 -> velocity 0.855
        assert!((sim.nodes[1].velocity.x - 0.855).abs() < 1e-4);
        assert!((sim.nodes[1].pos.x - 100.855).abs() < 1e-4);
    }

    #[test]
    fn repulsion_cutoff_ignores_distant_pairs() {
        let mut sim = sim_with_nodes(&[("a", 0.0, 0.0), ("b", 501.0, 0.0)]);
        let mut config = unfocused(800.0, 150.0);
        config.focused = true; // disable gravity so repulsion is the only force
        step_physics(&mut sim, config, None, None);
        assert_eq!(sim.nodes[0].velocity, Vec2::ZERO);
        assert_eq!(sim.nodes[1].velocity, Vec2::ZERO);
    }

    #[test]
    fn coincident_pairs_are_skipped() {
        let mut sim = sim_with_nodes(&[("a", 10.0, 10.0), ("b", 10.0, 10.0)]);
        step_physics(&mut sim, unfocused(800.0, 150.0), None, None);
        // Only gravity applies; both drift identically instead of exploding.
        assert_eq!(sim.nodes[0].velocity, sim.nodes[1].velocity);
        assert!(sim.nodes[0].velocity.length().is_finite());
    }

    #[test]
    fn pinned_node_is_left_where_the_pointer_put_it() {
        let mut sim = sim_with_nodes(&[("a", 30.0, 0.0), ("b", 60.0, 0.0)]);
        sim.nodes[0].velocity = vec2(3.0, 3.0);
        let before = sim.nodes[0].pos;
        step_physics(&mut sim, unfocused(800.0, 150.0), Some(0), None);
        assert_eq!(sim.nodes[0].pos, before);
        assert_eq!(sim.nodes[0].velocity, vec2(3.0, 3.0));
        assert_ne!(sim.nodes[1].pos, vec2(60.0, 0.0));
    }

    #[test]
    fn focal_node_is_hard_locked_with_zero_velocity() {
        let mut sim = sim_with_nodes(&[("a", 30.0, 0.0), ("b", 60.0, 0.0)]);
        sim.nodes[0].velocity = vec2(4.0, -4.0);
        let before = sim.nodes[0].pos;
        let config = PhysicsConfig {
            repulsion: 800.0,
            link_distance: 150.0,
            focused: true,
        };
        step_physics(&mut sim, config, None, Some(0));
        assert_eq!(sim.nodes[0].pos, before);
        assert_eq!(sim.nodes[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn slow_nodes_settle_to_rest() {
        let mut sim = sim_with_nodes(&[("a", 0.1, 0.0)]);
        sim.nodes[0].velocity = vec2(0.03, 0.0);
        let config = PhysicsConfig {
            repulsion: 0.0,
            link_distance: 150.0,
            focused: true, // no gravity, no neighbors: only damping acts
        };
        let moving = step_physics(&mut sim, config, None, None);
        assert!(!moving);
        assert_eq!(sim.nodes[0].velocity, Vec2::ZERO);
    }
}
