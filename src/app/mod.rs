use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Color32, Context, Vec2};

use crate::world::{
    self, LineStyle, NodeShape, ViewState, World, load_world, load_view_state,
};

mod graph;
mod physics;
mod render_utils;
mod ui;

pub struct LoreweaveApp {
    world_path: PathBuf,
    view_state_path: PathBuf,
    state: AppState,
    reload_rx: Option<Receiver<Result<World, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<World, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    world: World,
    world_dirty: bool,
    saved_positions: HashMap<String, (f32, f32)>,
    sim: SimGraph,
    graph_dirty: bool,
    selected: Option<String>,
    focus: Option<String>,
    hovered: Option<usize>,
    drag: DragState,
    connect_armed: bool,
    connect_source: Option<usize>,
    pointer_world: Vec2,
    pan: Vec2,
    zoom: f32,
    search: String,
    tag_filter: String,
    relationship_label: String,
    live_physics: bool,
    repulsion: f32,
    link_distance: f32,
    adaptive_text: bool,
    double_click_focus: bool,
    title_draft: String,
}

/// One entity lifted into simulation space. Rebuilt whenever the world
/// changes; position and velocity carry over by id so the layout does not
/// jump on rebuilds.
struct SimNode {
    id: String,
    title: String,
    note: Option<String>,
    tags: Vec<String>,
    pos: Vec2,
    velocity: Vec2,
    force: Vec2,
    radius: f32,
    mass: f32,
    color: Color32,
    shape: NodeShape,
}

/// One relationship lifted into simulation space, with the layout metadata
/// for fanning out parallel edges between the same endpoint pair.
struct SimEdge {
    source: usize,
    target: usize,
    label: String,
    style: LineStyle,
    color: Option<Color32>,
    width: f32,
    /// Rank of this edge within its unordered endpoint pair-group.
    index: usize,
    /// Size of that pair-group. Always > `index`.
    total: usize,
    is_self: bool,
    /// True when the pair-group also holds an edge in the other direction,
    /// which forces a curve even for an otherwise lone edge.
    inverse_exists: bool,
}

#[derive(Default)]
struct SimGraph {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    index_by_id: HashMap<String, usize>,
    active_nodes: Vec<usize>,
    active_edges: Vec<usize>,
    active_mask: Vec<bool>,
}

impl SimGraph {
    fn activate_all(&mut self) {
        self.active_nodes.clear();
        self.active_nodes.extend(0..self.nodes.len());
        self.active_edges.clear();
        self.active_edges.extend(0..self.edges.len());
        self.active_mask.clear();
        self.active_mask.resize(self.nodes.len(), true);
    }

    fn position_snapshot(&self) -> HashMap<String, (f32, f32)> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), (node.pos.x, node.pos.y)))
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Pan,
    Node(usize),
    /// A connect gesture started by modifier-pressing on the source node.
    Connect(usize),
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    repulsion: f32,
    link_distance: f32,
    focused: bool,
}

#[cfg(test)]
pub(in crate::app) mod test_support {
    use super::{SimEdge, SimGraph, SimNode};
    use crate::world::{LineStyle, NodeShape};
    use eframe::egui::{Color32, Vec2, vec2};

    pub(in crate::app) fn make_node(id: &str, x: f32, y: f32) -> SimNode {
        SimNode {
            id: id.to_owned(),
            title: id.to_owned(),
            note: None,
            tags: Vec::new(),
            pos: vec2(x, y),
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            radius: 18.0,
            mass: 1.0,
            color: Color32::GRAY,
            shape: NodeShape::Circle,
        }
    }

    pub(in crate::app) fn sim_with_nodes(nodes: &[(&str, f32, f32)]) -> SimGraph {
        let mut sim = SimGraph::default();
        for (id, x, y) in nodes {
            sim.index_by_id.insert((*id).to_owned(), sim.nodes.len());
            sim.nodes.push(make_node(id, *x, *y));
        }
        sim.activate_all();
        sim
    }

    pub(in crate::app) fn sim_with_edges(
        nodes: &[(&str, f32, f32)],
        edges: &[(&str, &str, &str)],
    ) -> SimGraph {
        let mut sim = sim_with_nodes(nodes);
        for (source, target, label) in edges {
            let source = sim.index_by_id[*source];
            let target = sim.index_by_id[*target];
            sim.edges.push(SimEdge {
                source,
                target,
                label: (*label).to_owned(),
                style: LineStyle::Solid,
                color: None,
                width: 2.0,
                index: 0,
                total: 1,
                is_self: source == target,
                inverse_exists: false,
            });
        }
        sim.activate_all();
        sim
    }
}

impl LoreweaveApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        world_path: PathBuf,
        view_state_path: PathBuf,
    ) -> Self {
        let state = Self::start_load(world_path.clone());
        Self {
            world_path,
            view_state_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(world_path: PathBuf) -> Receiver<Result<World, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_world(&world_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(world_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(world_path),
        }
    }

    fn make_view_model(&self, loaded: World) -> Box<ViewModel> {
        let view_state = load_view_state(&self.view_state_path);
        Box::new(ViewModel::new(loaded, view_state))
    }
}

impl eframe::App for LoreweaveApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => AppState::Ready(self.make_view_model(loaded)),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading world...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load world file");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.world_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.world_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.world_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(loaded) => AppState::Ready(self.make_view_model(loaded)),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let AppState::Ready(model) = &self.state else {
            return;
        };

        let snapshot = ViewState {
            pan_x: model.pan.x,
            pan_y: model.pan.y,
            zoom: model.zoom,
            node_positions: model.sim.position_snapshot(),
        };
        if let Err(error) = world::save_view_state(&self.view_state_path, &snapshot) {
            eprintln!("loreweave: {error:#}");
        }

        if model.world_dirty {
            if let Err(error) = world::save_world(&self.world_path, &model.world) {
                eprintln!("loreweave: {error:#}");
            }
        }
    }
}
