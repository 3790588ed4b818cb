use std::{convert, fmt};

/// Window class registered by R's GraphApp graphics device. Matched exactly, case included.
pub const PLOT_WINDOW_CLASS: &str = "GraphApp";

/// Capacity in UTF-16 units of the buffer used to read a window's class name. Longer names are
/// truncated which is fine as they can't match anyway.
pub const CLASS_NAME_CAPACITY: usize = 100;

/// Size (width, height) used when the host has no valid client area yet
pub const FALLBACK_SIZE: (i32, i32) = (200, 300);

/// Base of the private window message range
pub const WM_USER: u32 = 0x0400;

/// Message posted to the host window, with no parameters, each time a plot window was embedded
pub const PLOT_ACTIVATED_MESSAGE: u32 = WM_USER + 100;

/// Plain child window style i.e. `WS_CHILD` with every decoration bit dropped
pub const CHILD_WINDOW_STYLE: u32 = 0x4000_0000;

/// Cleared extended style
pub const NO_EXTENDED_STYLE: u32 = 0;

/// CBT hook code announcing that a window is about to be activated i.e. `HCBT_ACTIVATE`
pub const CBT_ACTIVATE: i32 = 5;

/// WindowHandle is an opaque, non owning reference to a native window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    /// Check if this is the null handle
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

// Implement format! support
impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<isize> for WindowHandle {
    fn from(val: isize) -> Self {
        WindowHandle(val)
    }
}

// Accept both hex `0x1f04` and decimal handles as printed by spy tools
impl convert::TryFrom<&str> for WindowHandle {
    type Error = std::num::ParseIntError;

    fn try_from(val: &str) -> Result<Self, Self::Error> {
        let val = val.trim();
        match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
            Some(hex) => isize::from_str_radix(hex, 16).map(WindowHandle),
            None => val.parse::<isize>().map(WindowHandle),
        }
    }
}

#[cfg(windows)]
impl From<windows::Win32::Foundation::HWND> for WindowHandle {
    fn from(val: windows::Win32::Foundation::HWND) -> Self {
        WindowHandle(val.0 as isize)
    }
}

#[cfg(windows)]
impl From<WindowHandle> for windows::Win32::Foundation::HWND {
    fn from(val: WindowHandle) -> Self {
        windows::Win32::Foundation::HWND(val.0 as *mut core::ffi::c_void)
    }
}

/// Rect describes a window area the way the platform reports it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Size to give an embedded plot so that it fills this client area. A negative width means
    /// the host isn't laid out yet in which case the fixed fallback size is used.
    pub fn fill_size(&self) -> (i32, i32) {
        if self.width() < 0 {
            FALLBACK_SIZE
        } else {
            (self.width(), self.height())
        }
    }
}

/// HookEvent carries the raw values the platform passes to an activation hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookEvent {
    pub code: i32,
    pub wparam: usize,
    pub lparam: isize,
}

impl HookEvent {
    pub fn new(code: i32, wparam: usize, lparam: isize) -> Self {
        Self { code, wparam, lparam }
    }

    /// Build the event announcing the activation of the given window
    pub fn activate(win: WindowHandle) -> Self {
        Self::new(CBT_ACTIVATE, win.0 as usize, 0)
    }

    /// Window about to be activated if this is an activation event
    pub fn activating(&self) -> Option<WindowHandle> {
        match self.code {
            CBT_ACTIVATE => Some(WindowHandle(self.wparam as isize)),
            _ => None,
        }
    }
}

/// InstallOutcome reports what an install request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
    InvalidHost,
    RegistrationFailed,
}

// Implement format! support
impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// ActivationOutcome reports how a single activation event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    NotActivation,
    Reentrant,
    Inactive,
    ClassMismatch,
    AlreadyEmbedded,
    Embedded { width: i32, height: i32 },
}

// Implement format! support
impl fmt::Display for ActivationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActivationOutcome::Embedded { width, height } => write!(f, "embedded {}x{}", width, height),
            _ => write!(f, "{}", format!("{:?}", self).to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_code() {
        assert_eq!(PLOT_ACTIVATED_MESSAGE, 0x0464);
    }

    #[test]
    fn test_fill_size() {
        assert_eq!(Rect::new(0, 0, 640, 480).fill_size(), (640, 480));
        assert_eq!(Rect::new(0, 0, -1, 77).fill_size(), (200, 300));
        assert_eq!(Rect::new(0, 0, 0, 0).fill_size(), (0, 0));
    }

    #[test]
    fn test_handle_parsing() {
        assert_eq!(WindowHandle::try_from("0x1F04").unwrap(), WindowHandle(0x1f04));
        assert_eq!(WindowHandle::try_from(" 7940 ").unwrap(), WindowHandle(7940));
        assert!(WindowHandle::try_from("plot").is_err());
        assert!(WindowHandle::NULL.is_null());
        assert_eq!(WindowHandle(0x1f04).to_string(), "0x00001f04");
    }

    #[test]
    fn test_hook_event() {
        let win = WindowHandle(42);
        assert_eq!(HookEvent::activate(win).activating(), Some(win));
        assert_eq!(HookEvent::new(3, 42, 0).activating(), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(InstallOutcome::AlreadyInstalled.to_string(), "alreadyinstalled");
        assert_eq!(ActivationOutcome::ClassMismatch.to_string(), "classmismatch");
        assert_eq!(ActivationOutcome::Embedded { width: 640, height: 480 }.to_string(), "embedded 640x480");
    }
}
