use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EngineEvent, EventHandler};

/// Records every event into a shared list the host can drain
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler feeding this log, for [`crate::event::EventBus::subscribe`]
    pub fn handler(&self) -> Box<dyn EventHandler> {
        Box::new(self.clone())
    }

    pub fn drain(&self) -> Vec<EngineEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    /// Alert messages received so far
    pub fn alerts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EngineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
