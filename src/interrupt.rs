use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::event::Event;

/// Manejador de cancelación externa para las llamadas bloqueantes.
///
/// Equivale a una señal entregada al proceso bloqueado: `fire` despierta la
/// llamada en curso (si la hay) y la hace devolver `Interrupted`. Queda
/// activada hasta `reset`, así que una llamada posterior con el mismo
/// manejador tampoco se bloquea. Los clones comparten estado: varias
/// llamadas armadas con el mismo manejador se despiertan todas.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<InterruptInner>,
}

#[derive(Default)]
struct InterruptInner {
    fired: AtomicBool,
    /// Un elemento por llamada bloqueada; puede repetir evento
    armed: Mutex<Vec<Arc<Event>>>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.inner.fired.store(true, Ordering::SeqCst);
        let targets = self
            .inner
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        // wake_all toma el mutex del evento: el bloqueado o todavía no comprobó
        // `fired` (y lo verá) o ya está dentro de wait (y recibe el notify)
        for event in targets {
            event.wake_all();
        }
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.inner.fired.store(false, Ordering::SeqCst);
    }

    /// Asocia el manejador al evento mientras dure el guard
    pub(crate) fn arm(&self, event: &Arc<Event>) -> ArmGuard<'_> {
        self.inner
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(event));
        ArmGuard {
            interrupt: self,
            event: Arc::clone(event),
        }
    }

    #[cfg(test)]
    fn armed_count(&self) -> usize {
        self.inner
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub(crate) struct ArmGuard<'a> {
    interrupt: &'a Interrupt,
    event: Arc<Event>,
}

impl Drop for ArmGuard<'_> {
    fn drop(&mut self) {
        let mut armed = self
            .interrupt
            .inner
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Quita una sola entrada: otra llamada puede seguir armada en el mismo evento
        if let Some(pos) = armed.iter().position(|e| Arc::ptr_eq(e, &self.event)) {
            armed.swap_remove(pos);
        }
    }
}
