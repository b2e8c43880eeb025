use std::collections::VecDeque;

use crate::types::{Sample, BUFFER_CAPACITY};

/// Buffer circular FIFO con las últimas BUFFER_CAPACITY muestras.
/// No es Sync por sí mismo: el gestor lo protege con su propio Mutex,
/// independiente del lock del registro.
pub struct SampleBuffer {
    buffer: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }

    /// Crea un buffer con otra capacidad (útil en pruebas)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Añade una muestra; si el buffer está lleno descarta la más antigua primero
    pub fn push(&mut self, sample: Sample) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);
    }

    /// Copia del contenido actual, de la más antigua a la más reciente
    pub fn snapshot(&self) -> Vec<Sample> {
        self.buffer.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Exporta la ventana a CSV con el mismo formato que lee csv_loader: x,y,z
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("x,y,z\n");
        for sample in &self.buffer {
            csv.push_str(&format!("{},{},{}\n", sample.x, sample.y, sample.z));
        }
        csv
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_empty_initially() {
        let buffer = SampleBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.capacity(), 21);
    }

    #[test]
    fn test_partial_fill_keeps_everything() {
        let mut buffer = SampleBuffer::new();
        for i in 0..5 {
            buffer.push(Sample::new(i, 0, 0));
        }
        let snap = buffer.snapshot();
        assert_eq!(snap.len(), 5);
        assert_eq!(snap[0].x, 0);
        assert_eq!(snap[4].x, 4);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_sliding_window_after_22_pushes() {
        let mut buffer = SampleBuffer::new();

        // 22 muestras en un buffer de 21
        for i in 0..22 {
            buffer.push(Sample::new(i, -i, 0));
        }

        let snap = buffer.snapshot();
        assert_eq!(snap.len(), 21);
        assert_eq!(snap[0].x, 1); // la primera muestra fue descartada
        assert_eq!(snap[20].x, 21);
        assert!(snap.windows(2).all(|w| w[0].x + 1 == w[1].x));
    }

    #[test]
    fn test_first_sample_evicted_after_window_plus_two() {
        let mut buffer = SampleBuffer::new();
        let first = Sample::new(-999, -999, -999);
        buffer.push(first);
        for i in 0..(BUFFER_CAPACITY as i32 + 1) {
            buffer.push(Sample::new(i, i, i));
        }
        assert!(!buffer.snapshot().contains(&first));
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut buffer = SampleBuffer::new();
        buffer.push(Sample::new(1, 2, 3));
        let _ = buffer.snapshot();
        let _ = buffer.snapshot();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_to_csv() {
        let mut buffer = SampleBuffer::with_capacity(2);
        buffer.push(Sample::new(1, 2, 3));
        buffer.push(Sample::new(4, 5, 6));
        buffer.push(Sample::new(7, 8, 9));
        assert_eq!(buffer.to_csv(), "x,y,z\n4,5,6\n7,8,9\n");
    }
}
