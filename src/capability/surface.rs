use crate::{
    error::{NotifyError, SurfaceError},
    runtime::input::ButtonHandle,
};

/// The floating trigger button owned by the presentation layer.
pub trait TriggerSurface: Send {
    fn register_trigger_surface(
        &mut self,
        size: u16,
        on_press: ButtonHandle,
    ) -> Result<(), SurfaceError>;
    fn unregister_trigger_surface(&mut self);
}

pub trait NotificationSink: Send {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Headless surface: keeps the handle so a caller can still press it.
#[derive(Default)]
pub struct DetachedSurface {
    handle: Option<ButtonHandle>,
    size: Option<u16>,
}

impl DetachedSurface {
    pub fn size(&self) -> Option<u16> {
        self.size
    }

    pub fn press(&self) -> bool {
        self.handle.as_ref().is_some_and(ButtonHandle::press)
    }
}

impl TriggerSurface for DetachedSurface {
    fn register_trigger_surface(
        &mut self,
        size: u16,
        on_press: ButtonHandle,
    ) -> Result<(), SurfaceError> {
        self.size = Some(size);
        self.handle = Some(on_press);
        Ok(())
    }

    fn unregister_trigger_surface(&mut self) {
        self.size = None;
        self.handle = None;
    }
}

pub struct SilentNotifications;

impl NotificationSink for SilentNotifications {
    fn notify(&mut self, title: &str, _message: &str) -> Result<(), NotifyError> {
        log::debug!("notification suppressed: {title}");
        Ok(())
    }
}
