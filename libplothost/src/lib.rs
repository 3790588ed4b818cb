//! `libplothost` embeds the plot windows of R's GraphApp graphics device into a host window. It
//! hooks window activation on the host's UI thread and each time a `GraphApp` window is about to be
//! activated it strips the window of its decorations, reparents it into the host, sizes it to fill
//! the host's client area and posts `PLOT_ACTIVATED_MESSAGE` to the host.
//!
//! The host listens for `PLOT_ACTIVATED_MESSAGE` (`WM_USER + 100`, no parameters) on its own
//! message loop to learn that a plot was embedded, e.g. to trigger a layout pass.
//!
//! The matching and reparenting rules live in `PlotEmbedder` which acts through the
//! `WindowPlatform` seam. On Windows `install` and `uninstall` drive a process wide embedder backed
//! by `Win32Platform`.
mod embedder;
mod error;
mod model;
pub mod platform;
#[cfg(windows)]
pub mod win32;
pub use embedder::{EmbedOpt, PlotEmbedder};
pub use error::*;
pub use model::*;
#[cfg(windows)]
pub use win32::{install, install_with, is_installed, uninstall, Win32Platform};

/// All essential symbols in a simple consumable form
///
/// ### Examples
/// ```
/// use libplothost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::platform::WindowPlatform;
    pub use crate::*;
}
