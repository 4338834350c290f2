//! App bootstrap and the render loop
//!
//! Rendering is single-flight: a request that arrives while a pass is
//! running only marks a follow-up as pending, and that follow-up runs on
//! the next frame. Bursts of updates during a pass collapse into one extra
//! pass.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use twig_dom::{Document, DomEvent, NodeId};
use twig_vdom::VNode;

use crate::error::AppError;
use crate::frame::FrameQueue;
use crate::render::{Mount, RenderOptions};
use crate::store::{State, Store};

/// Document shared between the app and its host
pub type SharedDocument = Rc<RefCell<Document>>;

/// Pure view function
pub type View = Rc<dyn Fn(&State) -> VNode>;

/// What to mount and where
pub struct AppConfig {
    view: View,
    initial_state: Value,
    store: Option<Store>,
    root: Option<NodeId>,
    frames: FrameQueue,
    options: RenderOptions,
}

impl AppConfig {
    pub fn new(view: impl Fn(&State) -> VNode + 'static) -> Self {
        Self {
            view: Rc::new(view),
            initial_state: Value::Object(State::new()),
            store: None,
            root: None,
            frames: FrameQueue::new(),
            options: RenderOptions::default(),
        }
    }

    /// Initial state; must be a JSON object
    pub fn initial_state(mut self, state: impl Into<Value>) -> Self {
        self.initial_state = state.into();
        self
    }

    /// Drive an existing store, so handlers built before mounting can
    /// capture it. The initial state is merged into it.
    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// Mount root, `<body>` when unset
    pub fn root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    /// Frame queue driven by the host
    pub fn frames(mut self, frames: FrameQueue) -> Self {
        self.frames = frames;
        self
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("initial_state", &self.initial_state)
            .field("root", &self.root)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Driver {
    document: SharedDocument,
    store: Store,
    view: View,
    mount: RefCell<Mount>,
    frames: FrameQueue,
    is_rendering: Cell<bool>,
    pending_render: Cell<bool>,
    frame_requested: Cell<bool>,
    render_count: Cell<usize>,
}

impl Driver {
    fn request_render(self: &Rc<Self>) {
        if self.is_rendering.get() {
            self.pending_render.set(true);
            return;
        }
        self.render_pass();
    }

    fn render_pass(self: &Rc<Self>) {
        self.is_rendering.set(true);

        let state = self.store.get_state();
        let vnode = (self.view)(&state);

        match self.document.try_borrow_mut() {
            Ok(mut document) => {
                let result = self.mount.borrow_mut().render(document.tree_mut(), vnode);
                match result {
                    Ok(()) => {
                        let count = self.render_count.get() + 1;
                        self.render_count.set(count);
                        tracing::debug!("render pass {} committed", count);
                    }
                    Err(err) => {
                        tracing::error!("render pass failed, remounting on the next pass: {}", err);
                    }
                }
            }
            Err(_) => {
                tracing::warn!("document is borrowed, deferring render to the next frame");
                self.pending_render.set(true);
            }
        }

        self.is_rendering.set(false);
        if self.pending_render.replace(false) {
            self.schedule_frame();
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        if self.frame_requested.replace(true) {
            return;
        }
        let driver = Rc::downgrade(self);
        self.frames.request(move || {
            if let Some(driver) = driver.upgrade() {
                driver.frame_requested.set(false);
                driver.request_render();
            }
        });
    }
}

/// Handle to a mounted app
#[derive(Clone)]
pub struct App {
    driver: Rc<Driver>,
}

/// Mount `config.view` into `document` and render once
pub fn create_app(document: SharedDocument, config: AppConfig) -> Result<App, AppError> {
    let initial = match config.initial_state {
        Value::Object(map) => map,
        other => return Err(AppError::InvalidState(other.to_string())),
    };

    let mount = {
        let mut doc = document.try_borrow_mut().map_err(|_| AppError::DocumentBusy)?;
        let root = config.root.unwrap_or_else(|| doc.body());
        let tree = doc.tree();
        if !tree.is_element(root) || !tree.contains(tree.root(), root) {
            return Err(AppError::InvalidRoot(root));
        }
        Mount::new(doc.tree_mut(), root, config.options)
    };

    let store = match config.store {
        Some(store) => {
            if !initial.is_empty() {
                store.set_state(initial);
            }
            store
        }
        None => Store::new(initial),
    };
    let driver = Rc::new(Driver {
        document,
        store: store.clone(),
        view: config.view,
        mount: RefCell::new(mount),
        frames: config.frames,
        is_rendering: Cell::new(false),
        pending_render: Cell::new(false),
        frame_requested: Cell::new(false),
        render_count: Cell::new(0),
    });

    let weak = Rc::downgrade(&driver);
    store.subscribe(move || {
        if let Some(driver) = weak.upgrade() {
            driver.request_render();
        }
    });

    driver.request_render();
    Ok(App { driver })
}

impl App {
    pub fn store(&self) -> &Store {
        &self.driver.store
    }

    pub fn get_state(&self) -> Rc<State> {
        self.driver.store.get_state()
    }

    pub fn set_state(&self, partial: impl Into<Value>) {
        self.driver.store.set_state(partial);
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.driver.store.subscribe(listener);
    }

    /// Deliver a platform event through the delegation registry
    ///
    /// Returns true if a handler ran. A handler that prevents the default
    /// marks `event`, so the host can skip its default action.
    pub fn dispatch(&self, event: &mut DomEvent) -> bool {
        let resolved = {
            let (Ok(document), Ok(mount)) =
                (self.driver.document.try_borrow(), self.driver.mount.try_borrow())
            else {
                tracing::warn!("'{}' dropped: dispatched during a render pass", event.event_type);
                return false;
            };
            mount.registry().resolve(document.tree(), event)
        };

        match resolved {
            Some(dispatch) => {
                dispatch.invoke();
                dispatch.forward_default(event);
                true
            }
            None => false,
        }
    }

    /// Tick one animation frame
    pub fn run_frame(&self) -> usize {
        self.driver.frames.run_frame()
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.driver.frames
    }

    /// Committed render passes so far
    pub fn render_count(&self) -> usize {
        self.driver.render_count.get()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.driver.document
    }

    /// Mount root element
    pub fn root(&self) -> NodeId {
        self.driver.mount.borrow().root()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("store", &self.driver.store)
            .field("render_count", &self.render_count())
            .finish_non_exhaustive()
    }
}
