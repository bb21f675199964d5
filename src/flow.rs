//! Flow control and the editor frame loop.
//!
//! [`EditorApp`] is what a host embeds. It owns the editor state, the gesture
//! controller and an async runtime for the external collaborators. The host
//! forwards UI commands and pointer events as they happen and calls
//! [`EditorApp::frame`] once per rendered frame to get the [`Render`] to draw.
//!
//! # User-facing types
//!
//! - [`EditorApp`] is the headless editor
//! - [`Command`] is the UI command surface (add, duplicate, delete, edit mode, ...)
//! - [`PointerEvent`] is pointer input on instances and handles
//! - [`Out<S, E>`] is the output type for async work and context configuration
//!
//! # Lifecycle
//!
//! Each frame follows this pattern:
//! 1. Drain results of collaborator futures that finished since the last frame
//! 2. Apply them (geometry lands in the cache, recommendations are stored, suggested
//!    instances are added)
//! 3. Build the render description from committed state plus the active gesture
//!
//! Pointer events and commands are handled immediately when they arrive. No call
//! ever waits on a collaborator.

use std::{fmt::Debug, pin::Pin, sync::Arc};

use cgmath::Vector3;
use instant::Instant;
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use uuid::Uuid;

use crate::{
    context::{Context, EditorConfig},
    data_structures::{
        instance::{InstanceId, ModelInstance, NewInstance, Pose, Property},
        model::ModelCatalog,
        room::{DimensionsPatch, Room},
        scene_graph::SceneSnapshot,
    },
    error::{GestureRejected, LoadFailure},
    gesture::{DragFrame, Feedback, GestureOutcome, Handle, TransformGestureController, TransformMode},
    persistence::InteriorScene,
    pick::{Ray, pick_instance},
    recommend::{CatalogRecommender, Recommendation, RecommendationService},
    render::{BLOCKED_OPACITY, HandleGizmo, Highlight, Instanced, Render},
    resources::{AssetRepository, GeometryCache, ModelRepository},
    snap::SnapAxis,
    store::{InstanceStore, InstanceView},
};

/// A deferred state change produced by a future.
pub type Mutation<S> = Box<dyn FnOnce(&mut S) + Send>;

///
/// Output of every operation that starts async work.
///
/// `Out::FutEvent` resolves futures of events. The events are queued and handled at the start of
/// the next frame.
///
/// `Out::FutFn` resolves futures of state mutations, which are applied at the start of the next
/// frame with no further action required.
///
/// `Out::Configure` modifies the Context right away, for instance to switch snapping off.
///
/// `Empty` is used when no eventing/futures need to be handled.
///
pub enum Out<S, E> {
    FutEvent(Vec<Box<dyn Future<Output = E> + Send>>),
    FutFn(Vec<Box<dyn Future<Output = Mutation<S>> + Send>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// What resolved futures send back to the frame loop.
pub enum FlowEvent<S, E> {
    Custom(E),
    Mut(Mutation<S>),
}

impl<S, E: Debug> Debug for FlowEvent<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEvent::Custom(event) => f.debug_tuple("Custom").field(event).finish(),
            FlowEvent::Mut(_) => f.write_str("Mut"),
        }
    }
}

/// Results of the recommendation collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Recommendations(Vec<Recommendation>),
    PositionSuggested {
        model_id: String,
        position: Vector3<f32>,
    },
}

/// Everything a frame reads: committed instances, the room, the catalog and
/// what the collaborators delivered so far.
#[derive(Debug)]
pub struct EditorState {
    pub store: InstanceStore,
    pub room: Room,
    pub catalog: ModelCatalog,
    pub geometry: GeometryCache,
    pub recommendations: Vec<Recommendation>,
    pub current_scene: Option<InteriorScene>,
}

impl EditorState {
    pub fn new(config: &EditorConfig, catalog: ModelCatalog) -> Self {
        Self {
            store: InstanceStore::with_duplicate_offset(config.duplicate_offset),
            room: config.room.clone(),
            catalog,
            geometry: GeometryCache::new(),
            recommendations: Vec::new(),
            current_scene: None,
        }
    }

    /// Occupied space right now: the walls and every visible instance with geometry.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(&self.room, self.store.list(), |instance| {
            self.geometry.is_loaded(&instance.model_id)
        })
    }

    /// Whether `instance` is drawn this frame, and so has handles and can be picked.
    pub fn is_drawn(&self, instance: &ModelInstance) -> bool {
        instance.is_visible && self.geometry.is_loaded(&instance.model_id)
    }

    fn scene(&self) -> InteriorScene {
        let name = self
            .current_scene
            .as_ref()
            .map_or_else(|| "untitled".to_string(), |scene| scene.name.clone());
        InteriorScene::capture(&self.store, &self.room, name, None)
    }
}

/// The UI command surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a fully specified instance.
    AddInstance(NewInstance),
    /// Add an instance of a catalog model at the spawn position.
    AddFromCatalog { model_id: String },
    Duplicate(InstanceId),
    Delete(InstanceId),
    Select(Option<InstanceId>),
    SetEditMode(TransformMode),
    SetProperty(InstanceId, Property),
    UpdateRoom(DimensionsPatch),
    SetSnapping(bool),
    RequestRecommendations { area: String },
    PlaceSuggested { model_id: String },
    SaveScene {
        name: String,
        description: Option<String>,
    },
    LoadScene(InteriorScene),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Done,
    Instance(InstanceId),
    Scene(Uuid),
    /// The command referred to something that does not exist.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed on a transform handle of `target`.
    Down { target: InstanceId, handle: Handle },
    /// Pose currently read from the handle, once per frame while held.
    Drag(Pose),
    Up,
    /// Click outside of any handle.
    Click(Ray),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerReply {
    Ignored,
    Started,
    Rejected(GestureRejected),
    Feedback(Feedback),
    Finished(GestureOutcome),
    Selected(Option<InstanceId>),
}

pub struct EditorApp {
    ctx: Context,
    state: EditorState,
    controller: TransformGestureController,
    repository: Arc<dyn ModelRepository>,
    recommender: Arc<dyn RecommendationService>,
    async_runtime: Runtime,
    sender: UnboundedSender<FlowEvent<EditorState, EditorEvent>>,
    receiver: UnboundedReceiver<FlowEvent<EditorState, EditorEvent>>,
    last_time: Instant,
    last_outcome: Option<GestureOutcome>,
}

impl EditorApp {
    /// Must not be called from within an async context: the app owns its runtime.
    pub fn new(
        config: EditorConfig,
        catalog: ModelCatalog,
        repository: Arc<dyn ModelRepository>,
        recommender: Arc<dyn RecommendationService>,
    ) -> anyhow::Result<Self> {
        if let Err(e) = env_logger::try_init() {
            log::debug!("Could not initialize logger: {}", e);
        }

        let async_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (sender, receiver) = unbounded_channel();
        let controller = TransformGestureController::new(config.snap, config.collision);
        let state = EditorState::new(&config, catalog);
        Ok(Self {
            ctx: Context::new(config),
            state,
            controller,
            repository,
            recommender,
            async_runtime,
            sender,
            receiver,
            last_time: Instant::now(),
            last_outcome: None,
        })
    }

    /// Models from `config.asset_root` and the built-in catalog recommender.
    pub fn with_assets(config: EditorConfig, catalog: ModelCatalog) -> anyhow::Result<Self> {
        let repository = Arc::new(AssetRepository::new(config.asset_root.clone()));
        Self::new(config, catalog, repository, Arc::new(CatalogRecommender::default()))
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn controller(&self) -> &TransformGestureController {
        &self.controller
    }

    /// The outcome of the most recently finished gesture.
    pub fn last_outcome(&self) -> Option<GestureOutcome> {
        self.last_outcome
    }

    pub fn apply(&mut self, command: Command) -> Reply {
        match command {
            Command::AddInstance(new) => {
                let model_id = new.model_id.clone();
                let id = self.state.store.add(new);
                self.request_geometry(&model_id);
                Reply::Instance(id)
            }
            Command::AddFromCatalog { model_id } => self
                .add_from_catalog(&model_id, None)
                .map_or(Reply::Ignored, Reply::Instance),
            Command::Duplicate(id) => self
                .state
                .store
                .duplicate(id)
                .map_or(Reply::Ignored, Reply::Instance),
            Command::Delete(id) => done_or_ignored(self.state.store.remove(id)),
            Command::Select(id) => {
                self.state.store.select(id);
                Reply::Done
            }
            Command::SetEditMode(mode) => {
                self.controller.set_mode(mode);
                Reply::Done
            }
            Command::SetProperty(id, property) => {
                let model_id = match &property {
                    Property::ModelId(model_id) => Some(model_id.clone()),
                    _ => None,
                };
                let updated = self.state.store.update_property(id, property);
                if let (true, Some(model_id)) = (updated, model_id) {
                    self.request_geometry(&model_id);
                }
                done_or_ignored(updated)
            }
            Command::UpdateRoom(patch) => {
                self.state.room.update_dimensions(patch);
                Reply::Done
            }
            Command::SetSnapping(enabled) => {
                self.handle(Out::Configure(Box::new(move |ctx: &mut Context| {
                    ctx.config.snap.enabled = enabled
                })));
                Reply::Done
            }
            Command::RequestRecommendations { area } => {
                let scene = self.state.scene();
                let fut = self
                    .recommender
                    .get_recommendations(&scene, &area, self.state.catalog.models());
                self.handle(Out::FutEvent(vec![Box::new(async move {
                    EditorEvent::Recommendations(fut.await)
                })]));
                Reply::Done
            }
            Command::PlaceSuggested { model_id } => {
                if self.state.catalog.get(&model_id).is_none() {
                    log::debug!("suggestion for unknown model {} ignored", model_id);
                    return Reply::Ignored;
                }
                let scene = self.state.scene();
                let fut = self.recommender.suggest_position(&scene, &model_id);
                self.handle(Out::FutEvent(vec![Box::new(async move {
                    EditorEvent::PositionSuggested {
                        model_id,
                        position: fut.await,
                    }
                })]));
                Reply::Done
            }
            Command::SaveScene { name, description } => {
                let scene =
                    InteriorScene::capture(&self.state.store, &self.state.room, name, description);
                let id = scene.id;
                log::info!("saved scene `{}` ({})", scene.name, id);
                self.state.current_scene = Some(scene);
                Reply::Scene(id)
            }
            Command::LoadScene(mut scene) => {
                self.controller.abandon();
                scene.restore(&mut self.state.store, &mut self.state.room);
                let id = scene.id;
                let model_ids: Vec<String> =
                    scene.instances.iter().map(|i| i.model_id.clone()).collect();
                self.state.current_scene = Some(scene);
                model_ids.iter().for_each(|model_id| self.request_geometry(model_id));
                Reply::Scene(id)
            }
        }
    }

    pub fn pointer(&mut self, event: PointerEvent) -> PointerReply {
        match event {
            PointerEvent::Down { target, handle } => {
                let undrawn = self
                    .state
                    .store
                    .instance(target)
                    .is_some_and(|instance| !self.state.is_drawn(instance));
                if undrawn && self.controller.session().is_none() {
                    return PointerReply::Rejected(GestureRejected::NotRendered(target));
                }
                match self.controller.begin(&self.state.store, target, handle) {
                    Ok(()) => PointerReply::Started,
                    Err(rejected) => PointerReply::Rejected(rejected),
                }
            }
            PointerEvent::Drag(pose) => {
                let snapshot = self.state.snapshot();
                match self.controller.drag(&mut self.state.store, &snapshot, pose) {
                    DragFrame::Idle => PointerReply::Ignored,
                    DragFrame::Dragging(feedback) => PointerReply::Feedback(feedback),
                    DragFrame::Ended(outcome) => self.finished(outcome),
                }
            }
            PointerEvent::Up => {
                let snapshot = self.state.snapshot();
                match self.controller.release(&mut self.state.store, &snapshot) {
                    Some(outcome) => self.finished(outcome),
                    None => PointerReply::Ignored,
                }
            }
            PointerEvent::Click(ray) => {
                if self.controller.is_dragging() {
                    return PointerReply::Ignored;
                }
                let picked = pick_instance(&ray, self.state.store.list(), &self.state.geometry)
                    .map(|pick| pick.id);
                self.state.store.select(picked);
                PointerReply::Selected(picked)
            }
        }
    }

    /// Advance one frame and describe what to draw.
    pub fn frame(&mut self) -> Render<'_> {
        self.ctx.delta = self.last_time.elapsed();
        self.last_time = Instant::now();
        self.ctx.frame += 1;

        while let Ok(event) = self.receiver.try_recv() {
            match event {
                FlowEvent::Custom(event) => self.on_custom_event(event),
                FlowEvent::Mut(mutation) => mutation(&mut self.state),
            }
        }

        self.render()
    }

    fn finished(&mut self, outcome: GestureOutcome) -> PointerReply {
        self.last_outcome = Some(outcome);
        PointerReply::Finished(outcome)
    }

    fn on_custom_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::Recommendations(recommendations) => {
                log::debug!("received {} recommendation groups", recommendations.len());
                self.state.recommendations = recommendations;
            }
            EditorEvent::PositionSuggested { model_id, position } => {
                if self.add_from_catalog(&model_id, Some(position)).is_none() {
                    log::warn!("Warning! Suggested position for {} was not used", model_id);
                }
            }
        }
    }

    fn add_from_catalog(
        &mut self,
        model_id: &str,
        position: Option<Vector3<f32>>,
    ) -> Option<InstanceId> {
        let Some(model) = self.state.catalog.get(model_id) else {
            log::debug!("model {} is not in the catalog", model_id);
            return None;
        };
        let name = format!("{} {}", model.name, self.state.store.count_of(model_id) + 1);
        let mut new = NewInstance::new(model_id, name)
            .at(position.unwrap_or(self.ctx.config.spawn_position));
        new.scale = model.default_scale;
        let id = self.state.store.add(new);
        self.request_geometry(model_id);
        Some(id)
    }

    fn request_geometry(&mut self, model_id: &str) {
        if !self.state.geometry.request(model_id) {
            return;
        }
        let Some(model) = self.state.catalog.get(model_id) else {
            self.state
                .geometry
                .insert(model_id, Err(LoadFailure::UnknownModel(model_id.to_string())));
            return;
        };
        let fut = self.repository.resolve(&model.model_path);
        let model_id = model_id.to_string();
        self.handle(Out::FutFn(vec![Box::new(async move {
            let result = fut.await;
            Box::new(move |state: &mut EditorState| state.geometry.insert(&model_id, result))
                as Mutation<EditorState>
        })]));
    }

    fn handle(&mut self, out: Out<EditorState, EditorEvent>) {
        handle_flow_output(&self.async_runtime, &mut self.ctx, self.sender.clone(), out);
        self.controller.set_snap(self.ctx.config.snap);
        self.controller.set_policy(self.ctx.config.collision);
    }

    fn render(&self) -> Render<'_> {
        let store = &self.state.store;
        let selected = store.selected();
        let session = self.controller.session();
        let mut opaque = Vec::new();
        let mut renders = Vec::new();

        for instance in store.list() {
            if !self.state.is_drawn(instance) {
                continue;
            }
            let pose = match session {
                Some(session) if session.target == instance.id => session.candidate,
                _ => instance.pose(),
            };
            let highlight = self.controller.highlight(instance.id, selected);
            let (opacity, translucent) = match highlight {
                Highlight::Blocked => (BLOCKED_OPACITY, true),
                _ => (1.0, false),
            };
            let instanced = Instanced {
                id: instance.id,
                model_id: &instance.model_id,
                raw: pose.to_raw(highlight, opacity),
                highlight,
            };
            if translucent {
                renders.push(Render::Transparent(instanced));
            } else {
                opaque.push(instanced);
            }

            if selected == Some(instance.id) && !instance.is_locked {
                renders.push(Render::Handles(HandleGizmo {
                    target: instance.id,
                    position: pose.position,
                    handles: self.controller.handles(),
                    snap: session
                        .filter(|s| s.target == instance.id)
                        .map_or(SnapAxis::None, |s| s.feedback().snap),
                }));
            }
        }

        if !opaque.is_empty() {
            renders.insert(0, Render::Defaults(opaque));
        }
        match renders.len() {
            0 => Render::None,
            _ => Render::Composed(renders),
        }
    }
}

fn done_or_ignored(found: bool) -> Reply {
    if found { Reply::Done } else { Reply::Ignored }
}

fn handle_flow_output<S: 'static, E: Send + 'static>(
    async_runtime: &Runtime,
    ctx: &mut Context,
    sender: UnboundedSender<FlowEvent<S, E>>,
    out: Out<S, E>,
) {
    match out {
        // Queue the events for the next frame
        Out::FutEvent(futures) => {
            let fut =
                async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            async_runtime.spawn(async move {
                for event in fut.await {
                    if sender.send(FlowEvent::Custom(event)).is_err() {
                        log::warn!("Editor was dropped before all events could be processed.");
                    }
                }
            });
        }
        // Queue the mutations for the next frame
        Out::FutFn(futures) => {
            let fut =
                async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            async_runtime.spawn(async move {
                for mutation in fut.await {
                    if sender.send(FlowEvent::Mut(mutation)).is_err() {
                        log::warn!("Editor was dropped before all mutations could be applied.");
                    }
                }
            });
        }
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}
