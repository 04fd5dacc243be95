use std::sync::{Arc, Mutex};

use crate::StatusListener;

/// The window (or terminal) the lifecycle coordinator drives.
///
/// Window operations return `Err` with a readable reason; dialogs are
/// best-effort and never fail the caller.
pub(crate) trait ShellSurface: StatusListener {
    /// Replace the splash content with the backend web UI.
    fn load_backend_ui(&self, url: &str) -> Result<(), String>;

    /// Replace the splash content with the static failure view.
    fn load_failure_view(&self) -> Result<(), String>;

    /// Blocking error notification; returns once dismissed.
    fn alert_error(&self, title: &str, message: &str);

    /// Non-blocking error notification.
    fn notify_error(&self, title: &str, message: &str);
}

/// Holds the surface for as long as its window exists. Errors raised after
/// the window is gone are dropped.
#[derive(Default)]
pub(crate) struct SurfaceSlot {
    surface: Mutex<Option<Arc<dyn ShellSurface>>>,
}

impl SurfaceSlot {
    pub(crate) fn set(&self, surface: Arc<dyn ShellSurface>) {
        match self.surface.lock() {
            Ok(mut guard) => *guard = Some(surface),
            Err(poisoned) => *poisoned.into_inner() = Some(surface),
        }
    }

    #[cfg_attr(not(feature = "desktop"), allow(dead_code))]
    pub(crate) fn clear(&self) {
        match self.surface.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<dyn ShellSurface>> {
        match self.surface.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for SurfaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceSlot")
            .field("present", &self.get().is_some())
            .finish()
    }
}
