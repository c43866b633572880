use crate::bridge::{Generation, MapSource};
use crate::core::geo::GeoBoundary;
use crossbeam_channel::{unbounded, Receiver, Sender};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Events emitted by the projection towards the UI shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionEvent {
    /// The viewport moved. `old` is `None` when the change came from the
    /// renderer rather than a local mutation.
    BoundsChanged {
        old: Option<GeoBoundary>,
        new: GeoBoundary,
    },
    /// A source switch was requested; carries the source actually in use
    SourceChanged { source: MapSource },
    /// The renderer finished loading and its bounds were adopted
    RendererReady { generation: Generation },
}

impl ProjectionEvent {
    /// Short name, handy for logging and filtering
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectionEvent::BoundsChanged { .. } => "bounds_changed",
            ProjectionEvent::SourceChanged { .. } => "source_changed",
            ProjectionEvent::RendererReady { .. } => "renderer_ready",
        }
    }
}

/// Handle returned by [`EventDispatcher::on`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Event listener callback type
pub type EventCallback = Arc<dyn Fn(&ProjectionEvent) + Send + Sync>;

/// Fan-out of projection events to callbacks and channel subscribers.
///
/// Listeners are invoked on whichever thread emitted the event, after the
/// registry lock has been released, so a listener may query the projection
/// or register further listeners.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Mutex<FxHashMap<ListenerId, EventCallback>>,
    subscribers: Mutex<Vec<Sender<ProjectionEvent>>>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ProjectionEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().insert(id, Arc::new(callback));
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners.lock().remove(&id).is_some()
    }

    /// Open a channel that receives every subsequent event
    pub fn subscribe(&self) -> Receiver<ProjectionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn emit(&self, event: ProjectionEvent) {
        log::debug!("emitting {}", event.kind());

        let mut callbacks: Vec<(ListenerId, EventCallback)> = self
            .listeners
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();
        callbacks.sort_by_key(|(id, _)| *id);

        for (_, callback) in callbacks {
            callback(&event);
        }

        // Receivers that went away are dropped from the list.
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.lock().len())
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}
