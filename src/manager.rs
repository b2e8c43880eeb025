//! Gestor del ciclo de vida de eventos de movimiento.
//!
//! Orquesta create / wait / signal / destroy sobre el buffer de muestras y
//! el registro. Hay tres niveles de sincronización independientes:
//!
//! - el mutex del buffer (push + snapshot),
//! - el mutex del registro (inserción, borrado y pasada de comparación),
//! - el mutex + condvar de cada evento (estado, waiters, generación).
//!
//! Orden de locks: registro -> evento. Nadie toma el lock del registro
//! teniendo el de un evento, y nadie se bloquea con el lock del registro.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, trace, warn};

use crate::delta;
use crate::error::{EventError, Result};
use crate::event::Event;
use crate::interrupt::Interrupt;
use crate::reference::{Credentials, ReferenceStore};
use crate::registry::EventRegistry;
use crate::sample_buffer::SampleBuffer;
use crate::types::{Delta, DestroyOutcome, EventId, MotionSpec, Sample, WaitOutcome};

pub struct MotionEventManager {
    buffer: Mutex<SampleBuffer>,
    registry: EventRegistry,
    last_event_id: AtomicU32,
    reference: ReferenceStore,
}

impl MotionEventManager {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(SampleBuffer::new()),
            registry: EventRegistry::new(),
            last_event_id: AtomicU32::new(0),
            reference: ReferenceStore::new(),
        }
    }

    /// Publica la orientación de referencia (sólo root)
    pub fn set_reference(&self, caller: &Credentials, sample: Sample) -> Result<()> {
        self.reference.set(caller, sample)
    }

    pub fn reference(&self) -> Sample {
        self.reference.get()
    }

    /// Registra un nuevo patrón de movimiento. `freq` se limita a WINDOW
    /// sin avisar al llamador.
    pub fn create_event(&self, spec: MotionSpec) -> Result<EventId> {
        let id = self
            .last_event_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| EventId(last + 1))
            .map_err(|_| EventError::OutOfMemory)?;

        let spec = spec.clamped();
        self.registry.insert(Arc::new(Event::new(id, spec)))?;
        debug!("Evento {} creado: {:?}", id, spec);
        Ok(id)
    }

    pub fn wait_event(&self, id: EventId) -> Result<WaitOutcome> {
        self.wait_event_interruptible(id, &Interrupt::new())
    }

    /// Bloquea hasta que el evento se dispare, sea destruido o llegue `interrupt`
    pub fn wait_event_interruptible(
        &self,
        id: EventId,
        interrupt: &Interrupt,
    ) -> Result<WaitOutcome> {
        // El waiter se cuenta con el lock del registro tomado: un destroy
        // concurrente o lo ve en el contador o nosotros no encontramos el evento
        let ticket = self
            .registry
            .find_with(id, |event| event.register_waiter())
            .ok_or(EventError::NotFound(id))?;

        let outcome = ticket.wait(interrupt);
        trace!("Waiter del evento {} despertó: {:?}", id, outcome);
        Ok(outcome)
    }

    /// Añade una muestra y reevalúa todos los eventos contra la ventana actual
    pub fn submit_sample(&self, sample: Sample) -> Result<()> {
        let window = {
            let mut buffer = self
                .buffer
                .lock()
                .map_err(|_| EventError::Io("buffer de muestras envenenado".to_string()))?;
            buffer.push(sample);
            let window = buffer.snapshot();
            if window.len() > buffer.capacity() {
                return Err(EventError::Io(format!(
                    "snapshot de {} muestras excede la capacidad {}",
                    window.len(),
                    buffer.capacity()
                )));
            }
            window
        };

        let deltas = delta::compute(&window);

        self.registry.for_each(|event| {
            let matched = delta::matches(&deltas, event.spec());
            if matched {
                trace!("Evento {} disparado", event.id());
            }
            event.apply_match(matched);
        });
        Ok(())
    }

    pub fn destroy_event(&self, id: EventId) -> Result<DestroyOutcome> {
        self.destroy_event_interruptible(id, &Interrupt::new())
    }

    /// Desregistra el evento, lo marca como retirado, despierta a sus waiters y
    /// espera a que todos salgan. Si la espera se interrumpe el evento queda
    /// fuera del registro y retirado, sin forma de volver a destruirlo.
    pub fn destroy_event_interruptible(
        &self,
        id: EventId,
        interrupt: &Interrupt,
    ) -> Result<DestroyOutcome> {
        let event = self.registry.remove(id).ok_or(EventError::NotFound(id))?;

        let outcome = event.retire_and_drain(interrupt);
        match outcome {
            DestroyOutcome::Released => debug!("Evento {} destruido", id),
            DestroyOutcome::Interrupted => warn!(
                "Destrucción del evento {} interrumpida con {} waiters pendientes; queda huérfano",
                id,
                event.waiters()
            ),
        }
        Ok(outcome)
    }

    /// Referencia al evento vivo con ese id
    pub fn lookup(&self, id: EventId) -> Option<Arc<Event>> {
        self.registry.find(id)
    }

    pub fn event_ids(&self) -> Vec<EventId> {
        self.registry.ids()
    }

    pub fn event_count(&self) -> usize {
        self.registry.len()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Ventana actual en CSV
    pub fn window_csv(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_csv()
    }

    /// Deltas de la ventana actual
    pub fn current_deltas(&self) -> Vec<Delta> {
        let window = self
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        delta::compute(&window)
    }
}

impl Default for MotionEventManager {
    fn default() -> Self {
        Self::new()
    }
}
