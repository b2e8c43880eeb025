use thiserror::Error;

use crate::types::{libc_errno, EventId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Argumento inválido: {0}")]
    InvalidArgument(String),

    #[error("Permiso denegado: se requiere un llamador privilegiado")]
    PermissionDenied,

    #[error("Evento {0} no encontrado")]
    NotFound(EventId),

    #[error("Sin memoria para registrar el evento")]
    OutOfMemory,

    #[error("Error de E/S en el buffer de muestras: {0}")]
    Io(String),
}

impl EventError {
    /// Código negativo que devolvería la interfaz tipo syscall.
    /// Un id desconocido se reporta como -EINVAL, igual que el kernel.
    pub fn errno(&self) -> i32 {
        match self {
            EventError::InvalidArgument(_) | EventError::NotFound(_) => -libc_errno::EINVAL,
            EventError::PermissionDenied => -libc_errno::EACCES,
            EventError::OutOfMemory => -libc_errno::ENOMEM,
            EventError::Io(_) => -libc_errno::EIO,
        }
    }
}

pub type Result<T> = std::result::Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(EventError::NotFound(EventId(3)).errno(), -22);
        assert_eq!(EventError::PermissionDenied.errno(), -13);
        assert_eq!(EventError::OutOfMemory.errno(), -12);
        assert_eq!(EventError::Io("peek".into()).errno(), -5);
    }

    #[test]
    fn test_display_includes_id() {
        let msg = EventError::NotFound(EventId(42)).to_string();
        assert!(msg.contains("42"));
    }
}
