//! `WindowPlatform` is the seam between the embedding logic and the native windowing system. The
//! embedder only ever talks to windows through it which keeps the matching and reparenting rules
//! independent of Win32 and lets them be exercised against a recording fake.
use std::fmt;

use crate::{HookEvent, PlotHostResult, Rect, WindowHandle};

/// Native window queries and mutations needed to embed a plot window
pub trait WindowPlatform {
    /// Handle to an installed activation hook
    type Hook: Copy + fmt::Debug;

    /// Check if the handle refers to an existing window
    fn is_window(&self, win: WindowHandle) -> bool;

    /// Get the registered class name of the window, truncated to `capacity` UTF-16 units
    fn class_name(&self, win: WindowHandle, capacity: usize) -> PlotHostResult<String>;

    /// Get the parent of the window, `None` for a top-level window
    fn parent(&self, win: WindowHandle) -> PlotHostResult<Option<WindowHandle>>;

    /// Get the client area of the window
    fn client_rect(&self, win: WindowHandle) -> PlotHostResult<Rect>;

    /// Replace the window style bits
    fn set_style(&self, win: WindowHandle, style: u32) -> PlotHostResult<()>;

    /// Replace the extended window style bits
    fn set_ex_style(&self, win: WindowHandle, style: u32) -> PlotHostResult<()>;

    /// Remove the menu bar of the window if any
    fn remove_menu(&self, win: WindowHandle) -> PlotHostResult<()>;

    /// Clear the title text of the window
    fn clear_title(&self, win: WindowHandle) -> PlotHostResult<()>;

    /// Reassign the parent of the window
    fn set_parent(&self, win: WindowHandle, parent: WindowHandle) -> PlotHostResult<()>;

    /// Move and resize the window, bring it to the top, show it and recalculate its frame
    fn place(&self, win: WindowHandle, x: i32, y: i32, w: i32, h: i32) -> PlotHostResult<()>;

    /// Post a parameter-less message to the window's queue without waiting on it
    fn post_message(&self, win: WindowHandle, msg: u32) -> PlotHostResult<()>;

    /// Register the activation hook for the calling thread
    fn install_activation_hook(&self) -> PlotHostResult<Self::Hook>;

    /// Unregister a hook previously returned by `install_activation_hook`
    fn remove_activation_hook(&self, hook: Self::Hook) -> PlotHostResult<()>;

    /// Hand the event on to the rest of the hook chain and return its result
    fn forward(&self, hook: Option<Self::Hook>, event: &HookEvent) -> isize;
}
