//! The single "latest outcome" notification.
//!
//! One owner holds a [`NotificationSlot`]. Components never touch it
//! directly; they hold a [`Dispatcher`] and send it messages, which the
//! owner applies with [`NotificationSlot::pump`].

use std::sync::mpsc::{channel, Receiver, Sender};

use castgrid_protocol::{Notification, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeAction {
    Show { severity: Severity, message: String },
    /// Close the banner, keeping its last severity and message
    Close,
}

/// Sending half handed to components.
#[derive(Debug, Clone)]
pub struct Dispatcher(Sender<NoticeAction>);

impl Dispatcher {
    pub fn show(&self, severity: Severity, message: &str) {
        self.send(NoticeAction::Show {
            severity,
            message: message.to_string(),
        });
    }

    pub fn close(&self) {
        self.send(NoticeAction::Close);
    }

    fn send(&self, action: NoticeAction) {
        // A dropped slot just means nobody is listening anymore
        if self.0.send(action).is_err() {
            tracing::trace!("notification slot dropped");
        }
    }
}

#[derive(Debug)]
pub struct NotificationSlot {
    current: Notification,
    tx: Sender<NoticeAction>,
    rx: Receiver<NoticeAction>,
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSlot {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            current: Notification::default(),
            tx,
            rx,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher(self.tx.clone())
    }

    /// Apply every pending message in send order and return the result.
    pub fn pump(&mut self) -> &Notification {
        while let Ok(action) = self.rx.try_recv() {
            match action {
                NoticeAction::Show { severity, message } => {
                    self.current = Notification::shown(severity, message);
                }
                NoticeAction::Close => self.current.open = false,
            }
        }
        &self.current
    }

    pub fn current(&self) -> &Notification {
        &self.current
    }

    /// User dismissal.
    pub fn dismiss(&mut self) {
        self.pump();
        self.current.open = false;
    }
}
