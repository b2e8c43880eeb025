use std::sync::{Mutex, PoisonError};

use crate::error::{EventError, Result};
use crate::types::Sample;

pub const ROOT_UID: u32 = 0;

/// Identidad del llamador que escribe la orientación de referencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub uid: u32,
}

impl Credentials {
    pub fn root() -> Self {
        Self { uid: ROOT_UID }
    }

    pub fn user(uid: u32) -> Self {
        Self { uid }
    }

    pub fn is_privileged(&self) -> bool {
        self.uid == ROOT_UID
    }
}

/// Última lectura de orientación publicada por el daemon del sensor
#[derive(Debug, Default)]
pub struct ReferenceStore {
    value: Mutex<Sample>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sólo root puede escribir
    pub fn set(&self, caller: &Credentials, sample: Sample) -> Result<()> {
        if !caller.is_privileged() {
            return Err(EventError::PermissionDenied);
        }
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = sample;
        Ok(())
    }

    pub fn get(&self) -> Sample {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_can_set() {
        let store = ReferenceStore::new();
        store.set(&Credentials::root(), Sample::new(1, -2, 3)).unwrap();
        assert_eq!(store.get(), Sample::new(1, -2, 3));
    }

    #[test]
    fn test_unprivileged_rejected() {
        let store = ReferenceStore::new();
        let err = store
            .set(&Credentials::user(1000), Sample::new(9, 9, 9))
            .unwrap_err();
        assert_eq!(err, EventError::PermissionDenied);
        assert_eq!(store.get(), Sample::default());
    }
}
