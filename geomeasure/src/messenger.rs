//! Notification channel from the tools to the host application.

use maybe_sync::{MaybeSend, MaybeSync};

/// Messenger is used to notify the host application that the visible state of the scene has changed.
pub trait Messenger: MaybeSend + MaybeSync {
    /// Requests the host to redraw the scene on the next frame.
    fn request_redraw(&self);
}
