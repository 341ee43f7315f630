use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    time::Duration,
};

/// Sending half of a channel whose receiver can refuse data while it is not ready.
#[derive(Debug, Clone)]
pub struct SafeSender<T> {
    sender: Sender<T>,
    ready: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct SafeReceiver<T> {
    receiver: Receiver<T>,
    ready: Arc<AtomicBool>,
}

pub fn channel<T>() -> (SafeSender<T>, SafeReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    let ready = Arc::new(AtomicBool::new(false));
    (
        SafeSender {
            sender: tx,
            ready: ready.clone(),
        },
        SafeReceiver {
            receiver: rx,
            ready,
        },
    )
}

impl<T> SafeSender<T> {
    pub fn send(&self, value: T) -> Result<(), SafeSendError<T>> {
        if self.is_ready() {
            self.sender.send(value).map_err(SafeSendError::from)
        } else {
            Err(SafeSendError::NotReady(value))
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

impl<T> SafeReceiver<T> {
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

#[derive(Debug)]
pub enum SafeSendError<T> {
    SendError(mpsc::SendError<T>),
    NotReady(T),
}

impl<T> From<mpsc::SendError<T>> for SafeSendError<T> {
    fn from(err: mpsc::SendError<T>) -> Self {
        SafeSendError::SendError(err)
    }
}
