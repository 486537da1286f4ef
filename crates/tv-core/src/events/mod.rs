//! Typed publish/subscribe for dashboard notifications
//!
//! Subscribers register per event type and are called synchronously, in
//! subscription order, on the publishing thread. A handler must not publish
//! on the same bus.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::trace;

type Subscribers = AHashMap<TypeId, Vec<Box<dyn EventHandler>>>;

/// Dashboard-wide event bus
///
/// Widgets never talk to each other through it; it only reports lifecycle and
/// hover changes to whoever hosts the dashboard.
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common dashboard events
pub mod events {
    use std::any::Any;

    use super::Event;
    use crate::state::WidgetId;

    /// A widget passed validation and joined the dashboard
    #[derive(Debug, Clone)]
    pub struct WidgetMounted {
        pub widget_id: WidgetId,
        pub widget_type: String,
    }

    /// A widget was torn down; its animations and timers are cancelled
    #[derive(Debug, Clone)]
    pub struct WidgetUnmounted {
        pub widget_id: WidgetId,
    }

    /// Hovered entity of a widget changed
    #[derive(Debug, Clone)]
    pub struct HoverChanged {
        pub widget_id: WidgetId,
        pub entity_id: Option<String>,
        pub value: Option<f64>,
    }

    /// Widget construction failed validation
    #[derive(Debug, Clone)]
    pub struct WidgetRejected {
        pub widget_type: String,
        pub error: String,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        WidgetMounted,
        WidgetUnmounted,
        HoverChanged,
        WidgetRejected
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Call `handler` for every future `E`
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        self.subscribers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(handler);
    }

    /// Deliver `event` to the subscribers of its type; a no-op without any
    pub fn publish<E: Event>(&self, event: E) {
        let mut subscribers = self.subscribers.lock();
        let Some(handlers) = subscribers.get_mut(&TypeId::of::<E>()) else {
            return;
        };
        trace!("Publishing {} to {} handlers", type_name::<E>(), handlers.len());
        for handler in handlers.iter_mut() {
            handler.handle(&event);
        }
    }

    /// Number of handlers registered for `E`
    pub fn handler_count<E: Event>(&self) -> usize {
        self.subscribers
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Drop every handler for `E`
    pub fn unsubscribe_all<E: Event>(&self) -> usize {
        self.subscribers
            .lock()
            .remove(&TypeId::of::<E>())
            .map_or(0, |handlers| handlers.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Closure adapter behind [`handler_from_fn`]
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
