use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Handle to the rotation input of the host camera.
///
/// The host reads [`CameraController::is_rotation_enabled`] before applying rotation gestures. Tools that need the
/// pointer for themselves take a [`RotationLock`] for as long as they need it.
#[derive(Debug, Clone)]
pub struct CameraController {
    rotation_enabled: Arc<AtomicBool>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            rotation_enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl CameraController {
    /// Returns true if the camera can be rotated by the user.
    pub fn is_rotation_enabled(&self) -> bool {
        self.rotation_enabled.load(Ordering::Acquire)
    }

    /// Enables or disables camera rotation.
    pub fn set_rotation_enabled(&self, enabled: bool) {
        self.rotation_enabled.store(enabled, Ordering::Release);
    }

    /// Disables camera rotation until the returned guard is dropped. The guard restores the state the rotation was
    /// in when the lock was taken.
    pub fn lock_rotation(&self) -> RotationLock {
        let previous = self.rotation_enabled.swap(false, Ordering::AcqRel);
        RotationLock {
            rotation_enabled: self.rotation_enabled.clone(),
            previous,
        }
    }
}

/// Guard returned by [`CameraController::lock_rotation`].
#[derive(Debug)]
pub struct RotationLock {
    rotation_enabled: Arc<AtomicBool>,
    previous: bool,
}

impl Drop for RotationLock {
    fn drop(&mut self) {
        self.rotation_enabled.store(self.previous, Ordering::Release);
    }
}

/// Style of the pointer cursor over the scene.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum CursorStyle {
    /// Cursor is chosen by the host.
    #[default]
    Auto,
    /// Plain arrow cursor.
    Default,
    /// Hand cursor.
    Pointer,
}

/// Handle to the cursor style of the scene.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    style: Arc<RwLock<CursorStyle>>,
}

impl Cursor {
    /// Current cursor style.
    pub fn style(&self) -> CursorStyle {
        *self.style.read()
    }

    /// Sets the cursor style.
    pub fn set_style(&self, style: CursorStyle) {
        *self.style.write() = style;
    }

    /// Sets the cursor style until the returned guard is dropped.
    pub fn override_style(&self, style: CursorStyle) -> CursorOverride {
        let previous = std::mem::replace(&mut *self.style.write(), style);
        CursorOverride {
            style: self.style.clone(),
            previous,
        }
    }
}

/// Guard returned by [`Cursor::override_style`].
#[derive(Debug)]
pub struct CursorOverride {
    style: Arc<RwLock<CursorStyle>>,
    previous: CursorStyle,
}

impl Drop for CursorOverride {
    fn drop(&mut self) {
        *self.style.write() = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_lock_restores_previous_state() {
        let camera = CameraController::default();
        assert!(camera.is_rotation_enabled());

        let lock = camera.lock_rotation();
        assert!(!camera.is_rotation_enabled());
        drop(lock);
        assert!(camera.is_rotation_enabled());

        camera.set_rotation_enabled(false);
        let lock = camera.lock_rotation();
        drop(lock);
        assert!(!camera.is_rotation_enabled());
    }

    #[test]
    fn cursor_override_restores_style() {
        let cursor = Cursor::default();
        cursor.set_style(CursorStyle::Pointer);

        let guard = cursor.override_style(CursorStyle::Default);
        assert_eq!(cursor.clone().style(), CursorStyle::Default);
        drop(guard);

        assert_eq!(cursor.style(), CursorStyle::Pointer);
    }
}
