use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{EventError, Result};
use crate::event::Event;
use crate::types::EventId;

/// Conjunto de eventos vivos indexado por id.
///
/// Inserción, borrado y la pasada de comparación comparten el mismo lock:
/// una pasada en curso termina antes o empieza después de cualquier borrado.
/// Nunca se mantiene el lock durante una espera bloqueante.
#[derive(Default)]
pub struct EventRegistry {
    events: Mutex<HashMap<EventId, Arc<Event>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventId, Arc<Event>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, event: Arc<Event>) -> Result<()> {
        let mut events = self.lock();
        if events.contains_key(&event.id()) {
            // Los ids son únicos; una colisión sólo puede venir de un contador agotado
            return Err(EventError::OutOfMemory);
        }
        events
            .try_reserve(1)
            .map_err(|_| EventError::OutOfMemory)?;
        events.insert(event.id(), event);
        Ok(())
    }

    pub fn remove(&self, id: EventId) -> Option<Arc<Event>> {
        self.lock().remove(&id)
    }

    pub fn find(&self, id: EventId) -> Option<Arc<Event>> {
        self.lock().get(&id).cloned()
    }

    /// Busca el evento y ejecuta `f` sin soltar el lock del registro
    pub fn find_with<R>(&self, id: EventId, f: impl FnOnce(&Arc<Event>) -> R) -> Option<R> {
        self.lock().get(&id).map(f)
    }

    /// Recorre todos los eventos vivos bajo el lock del registro
    pub fn for_each(&self, mut f: impl FnMut(&Arc<Event>)) {
        for event in self.lock().values() {
            f(event);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.lock().keys().copied().collect();
        ids.sort();
        ids
    }
}
