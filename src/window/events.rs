use async_channel::{Receiver, Sender};
use lectern_core::{Location, WindowId};

/// Notifications published to the UI and persistence collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// Pane states, weights or order changed.
    LayoutChanged,
    ActiveWindowChanged { window_id: WindowId },
    /// Panes were added, closed, minimised, restored or maximised.
    NumberOfWindowsChanged,
    /// A pane's synchronisation or pin flag changed.
    WindowChanged { window_id: WindowId },
    /// Scroll a pane to a location already loaded in its view.
    ScrollRequest { window_id: WindowId, location: Location },
}

/// Sending half of the window event channel. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    tx: Sender<WindowEvent>,
}

impl EventBus {
    pub fn new() -> (Self, Receiver<WindowEvent>) {
        let (tx, rx) = async_channel::unbounded();
        (Self { tx }, rx)
    }

    pub fn publish(&self, event: WindowEvent) {
        log::debug!("Publishing {:?}", event);
        if let Err(e) = self.tx.try_send(event) {
            // Receiver dropped: nobody is listening any more.
            log::debug!("Window event dropped: {}", e);
        }
    }
}
