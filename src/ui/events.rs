//! Application event handling.
//!
//! Applies finished background requests to the mounted view.

use crate::app::{App, AppEvent};

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Delivered(delivery) => app.apply_delivery(delivery),
        AppEvent::TaskPanicked {
            task,
            ticket,
            error,
        } => app.task_panicked(task, ticket, &error),
    }
}
