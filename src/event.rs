use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::interrupt::Interrupt;
use crate::types::{DestroyOutcome, EventId, MotionSpec, TriggerState, WaitOutcome};

/// Estado mutable de un evento, protegido por el mutex del propio evento
#[derive(Debug)]
struct EventSync {
    state: TriggerState,
    /// Procesos bloqueados en wait (estado Pending) o que aún no han
    /// despertado tras un disparo o destrucción
    waiters: usize,
    /// Se incrementa en cada pasada que dispara el evento; permite que un
    /// waiter ya bloqueado vea el disparo aunque el estado vuelva a Pending
    /// antes de que recupere el lock
    generation: u64,
}

/// Evento de movimiento registrado
#[derive(Debug)]
pub struct Event {
    id: EventId,
    spec: MotionSpec,
    sync: Mutex<EventSync>,
    cond: Condvar,
}

impl Event {
    /// `spec` ya debe venir con freq limitada a WINDOW
    pub(crate) fn new(id: EventId, spec: MotionSpec) -> Self {
        Self {
            id,
            spec,
            sync: Mutex::new(EventSync {
                state: TriggerState::Pending,
                waiters: 0,
                generation: 0,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn spec(&self) -> &MotionSpec {
        &self.spec
    }

    pub fn state(&self) -> TriggerState {
        self.lock().state
    }

    pub fn waiters(&self) -> usize {
        self.lock().waiters
    }

    // El contador de waiters debe actualizarse en todos los caminos de salida,
    // así que un mutex envenenado no detiene la contabilidad.
    fn lock(&self) -> MutexGuard<'_, EventSync> {
        self.sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Aplica el resultado de una pasada de comparación.
    /// Un evento retirado nunca vuelve a Pending ni a Triggered.
    pub(crate) fn apply_match(&self, matched: bool) {
        let mut sync = self.lock();
        match (sync.state, matched) {
            (TriggerState::Retired, _) => {}
            (_, true) => {
                sync.state = TriggerState::Triggered;
                sync.generation = sync.generation.wrapping_add(1);
                self.cond.notify_all();
            }
            (_, false) => sync.state = TriggerState::Pending,
        }
    }

    /// Despierta a todos los bloqueados para que reevalúen su condición
    pub(crate) fn wake_all(&self) {
        let _sync = self.lock();
        self.cond.notify_all();
    }

    /// Registra un waiter más. El ticket devuelto descuenta al waiter cuando
    /// se suelta, pase lo que pase dentro de la espera.
    pub(crate) fn register_waiter(self: &Arc<Self>) -> WaitTicket {
        self.lock().waiters += 1;
        WaitTicket {
            event: Arc::clone(self),
        }
    }

    /// Marca el evento como retirado, despierta a los waiters y espera a que
    /// todos hayan salido. Debe llamarse después de sacarlo del registro.
    pub(crate) fn retire_and_drain(self: &Arc<Self>, interrupt: &Interrupt) -> DestroyOutcome {
        let _armed = interrupt.arm(self);

        let mut sync = self.lock();
        sync.state = TriggerState::Retired;
        self.cond.notify_all();

        // El último waiter en salir nos despierta
        while sync.waiters > 0 && !interrupt.is_fired() {
            sync = self.cond.wait(sync).unwrap_or_else(PoisonError::into_inner);
        }

        if sync.waiters == 0 {
            DestroyOutcome::Released
        } else {
            DestroyOutcome::Interrupted
        }
    }
}

/// Un waiter registrado sobre un evento
pub(crate) struct WaitTicket {
    event: Arc<Event>,
}

impl WaitTicket {
    /// Bloquea hasta que el evento se dispare, se retire o llegue una interrupción.
    /// Si el evento ya está disparado al entrar, vuelve de inmediato.
    pub(crate) fn wait(self, interrupt: &Interrupt) -> WaitOutcome {
        let _armed = interrupt.arm(&self.event);

        let mut sync = self.event.lock();
        if sync.state == TriggerState::Triggered {
            return WaitOutcome::Triggered;
        }

        let start = sync.generation;
        while sync.state != TriggerState::Retired
            && sync.generation == start
            && !interrupt.is_fired()
        {
            sync = self
                .event
                .cond
                .wait(sync)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if sync.state == TriggerState::Retired {
            WaitOutcome::Retired
        } else if sync.generation != start {
            WaitOutcome::Triggered
        } else {
            WaitOutcome::Interrupted
        }
    }
}

impl Drop for WaitTicket {
    fn drop(&mut self) {
        let mut sync = self.event.lock();
        sync.waiters = sync.waiters.saturating_sub(1);
        if sync.waiters == 0 {
            // Puede haber un destroy esperando el drenado
            self.event.cond.notify_all();
        }
    }
}
