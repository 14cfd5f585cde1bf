//! Cancelación cooperativa del pipeline.
use tokio::sync::watch;

/// Handle del invocador para pedir la cancelación.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

/// Lado observador, entregado al runner y a cada paso.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationHandle {
    pub fn new() -> (Self, CancellationSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationSignal { receiver })
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal { receiver: self.sender.subscribe() }
    }
}

impl CancellationSignal {
    /// Señal que nunca se activa.
    pub fn never() -> Self {
        let (handle, signal) = CancellationHandle::new();
        // con el sender cerrado el valor queda en `false`
        drop(handle);
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Espera hasta que se pida la cancelación. Si el handle desaparece sin
    /// cancelar, nunca retorna.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|c| *c).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_observed_by_all_signals() {
        let (handle, mut signal) = CancellationHandle::new();
        let other = handle.signal();
        assert!(!signal.is_cancelled());
        handle.cancel();
        signal.cancelled().await;
        assert!(other.is_cancelled());
    }

    #[test]
    fn never_signal_stays_clear() {
        assert!(!CancellationSignal::never().is_cancelled());
    }
}
