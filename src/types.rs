use std::fmt;

use serde::Deserialize;

/// Número de muestras recientes que se consideran al evaluar un evento
pub const WINDOW: usize = 20;

/// Capacidad del buffer circular: WINDOW + 1 muestras dan WINDOW deltas
pub const BUFFER_CAPACITY: usize = WINDOW + 1;

/// Factor de ruido; el umbral real es NOISE_FACTOR * 100
pub const NOISE_FACTOR: u32 = 2;

/// Suma mínima de deltas por eje para considerar un paso como movimiento real
pub const NOISE_THRESHOLD: u32 = NOISE_FACTOR * 100;

/// Lectura cruda del acelerómetro en los tres ejes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Sample {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Patrón de movimiento registrado por un evento: umbral por eje y
/// número mínimo de deltas que deben superarlo dentro de la ventana
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MotionSpec {
    pub dlt_x: u32,
    pub dlt_y: u32,
    pub dlt_z: u32,
    pub freq: u32,
}

impl MotionSpec {
    pub fn new(dlt_x: u32, dlt_y: u32, dlt_z: u32, freq: u32) -> Self {
        Self {
            dlt_x,
            dlt_y,
            dlt_z,
            freq,
        }
    }

    /// Devuelve una copia con `freq` limitada a WINDOW
    pub fn clamped(self) -> Self {
        Self {
            freq: self.freq.min(WINDOW as u32),
            ..self
        }
    }
}

/// Cambio entre dos muestras consecutivas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    pub dlt_x: u32,
    pub dlt_y: u32,
    pub dlt_z: u32,
    /// true si la suma de los tres ejes supera NOISE_THRESHOLD
    pub noise: bool,
}

impl Delta {
    /// Suma de los tres ejes (saturada para no desbordar con lecturas extremas)
    pub fn total(&self) -> u32 {
        self.dlt_x
            .saturating_add(self.dlt_y)
            .saturating_add(self.dlt_z)
    }
}

/// Identificador único de evento. Se asigna de forma creciente y nunca se reutiliza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estado de disparo de un evento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// La ventana actual no coincide con el patrón
    Pending,
    /// La ventana actual coincide con el patrón
    Triggered,
    /// Evento destruido; estado terminal
    Retired,
}

/// Resultado de bloquearse sobre un evento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Triggered,
    Retired,
    Interrupted,
}

impl WaitOutcome {
    /// Código estilo syscall: 0 si se detectó el movimiento, -EAGAIN en otro caso
    pub fn errno(&self) -> i32 {
        match self {
            WaitOutcome::Triggered => 0,
            WaitOutcome::Retired | WaitOutcome::Interrupted => -libc_errno::EAGAIN,
        }
    }
}

/// Resultado de destruir un evento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// Todos los waiters salieron y el evento fue liberado
    Released,
    /// La espera de drenado fue interrumpida; el evento ya no es alcanzable
    Interrupted,
}

impl DestroyOutcome {
    pub fn errno(&self) -> i32 {
        match self {
            DestroyOutcome::Released => 0,
            DestroyOutcome::Interrupted => -libc_errno::EAGAIN,
        }
    }
}

/// Valores de errno de Linux usados por la interfaz tipo syscall
pub(crate) mod libc_errno {
    pub const EIO: i32 = 5;
    pub const EAGAIN: i32 = 11;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const EINVAL: i32 = 22;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_threshold_value() {
        assert_eq!(NOISE_THRESHOLD, 200);
        assert_eq!(BUFFER_CAPACITY, 21);
    }

    #[test]
    fn test_clamp_freq() {
        assert_eq!(MotionSpec::new(1, 2, 3, 500).clamped().freq, WINDOW as u32);
        assert_eq!(MotionSpec::new(1, 2, 3, 7).clamped().freq, 7);
        // Los umbrales no cambian
        let spec = MotionSpec::new(400, 10, 0, 99).clamped();
        assert_eq!((spec.dlt_x, spec.dlt_y, spec.dlt_z), (400, 10, 0));
    }

    #[test]
    fn test_outcome_errno() {
        assert_eq!(WaitOutcome::Triggered.errno(), 0);
        assert_eq!(WaitOutcome::Retired.errno(), -11);
        assert_eq!(DestroyOutcome::Interrupted.errno(), -11);
        assert_eq!(DestroyOutcome::Released.errno(), 0);
    }
}
