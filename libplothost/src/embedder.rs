//! `PlotEmbedder` watches window activations on the installing thread and moves any R GraphApp
//! plot window into the host window it was installed with. The plot loses its caption, borders and
//! menu, becomes a child of the host filling its client area, and the host is told about it with a
//! posted `PLOT_ACTIVATED_MESSAGE`.
//!
//! The embedder is a caller owned context; nothing here is global. Every activation event is
//! forwarded to the rest of the hook chain whatever happened to it.
use std::cell::Cell;

use tracing::{debug, trace, warn};

use crate::{
    platform::WindowPlatform, ActivationOutcome, HookEvent, InstallOutcome, PlotHostError, PlotHostResult,
    WindowHandle, CHILD_WINDOW_STYLE, CLASS_NAME_CAPACITY, NO_EXTENDED_STYLE, PLOT_ACTIVATED_MESSAGE,
    PLOT_WINDOW_CLASS,
};

/// Embed options provide an ergonomic way to configure the embedder
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOpt {
    class: String,
    message: u32,
    strict: bool,
}

impl Default for EmbedOpt {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbedOpt {
    /// Create new embed options matching R's `GraphApp` windows and posting `PLOT_ACTIVATED_MESSAGE`
    ///
    /// ### Examples
    /// ```
    /// use libplothost::prelude::*;
    /// let opts = EmbedOpt::new();
    /// ```
    pub fn new() -> Self {
        Self {
            class: PLOT_WINDOW_CLASS.to_owned(),
            message: PLOT_ACTIVATED_MESSAGE,
            strict: false,
        }
    }

    /// Set the window class that identifies a plot window. Matched exactly, case included.
    ///
    /// ### Arguments
    /// * `class` - registered class name of the windows to embed
    ///
    /// ### Examples
    /// ```
    /// use libplothost::prelude::*;
    /// let opts = EmbedOpt::new().class("GraphApp");
    /// ```
    pub fn class<T: Into<String>>(mut self, class: T) -> Self {
        self.class = class.into();
        self
    }

    /// Set the message posted to the host after a plot was embedded
    ///
    /// ### Arguments
    /// * `message` - message code the host listens for
    ///
    /// ### Examples
    /// ```
    /// use libplothost::prelude::*;
    /// let opts = EmbedOpt::new().message(WM_USER + 100);
    /// ```
    pub fn message(mut self, message: u32) -> Self {
        self.message = message;
        self
    }

    /// Report a failed hook registration as an error rather than as an install outcome
    ///
    /// ### Arguments
    /// * `strict` - when true `install` returns `PlotHostError::HookRegistration` on failure
    ///
    /// ### Examples
    /// ```
    /// use libplothost::prelude::*;
    /// let opts = EmbedOpt::new().strict(true);
    /// ```
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Get the window class that identifies a plot window
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Get the message posted to the host
    pub fn notify_message(&self) -> u32 {
        self.message
    }

    /// Check if registration failures are errors
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

// Host and hook only ever exist together
#[derive(Debug, Clone, Copy)]
struct Installation<H> {
    host: WindowHandle,
    hook: H,
}

/// Clears the processing flag when the activation handling goes out of scope
struct ProcessingGuard<'a>(&'a Cell<bool>);

impl<'a> ProcessingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(ProcessingGuard(flag))
        }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Plot embedder bound to a windowing platform
pub struct PlotEmbedder<P: WindowPlatform> {
    platform: P,
    opts: EmbedOpt,
    installed: Option<Installation<P::Hook>>,
    processing: Cell<bool>,
}

impl<P: WindowPlatform> PlotEmbedder<P> {
    /// Create a new uninstalled embedder
    ///
    /// ### Arguments
    /// * `platform` - windowing platform to act through
    /// * `opts` - embed options
    pub fn new(platform: P, opts: EmbedOpt) -> Self {
        Self {
            platform,
            opts,
            installed: None,
            processing: Cell::new(false),
        }
    }

    /// Get the platform the embedder acts through
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Get the embed options
    pub fn opts(&self) -> &EmbedOpt {
        &self.opts
    }

    /// Get the host window plots are embedded into while installed
    pub fn host(&self) -> Option<WindowHandle> {
        self.installed.map(|x| x.host)
    }

    /// Get the activation hook while installed
    pub fn hook(&self) -> Option<P::Hook> {
        self.installed.map(|x| x.hook)
    }

    /// Check if the embedder is installed
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Start embedding plot windows into the given host window by hooking activations on the
    /// calling thread. Installing an installed embedder or using an invalid host does nothing.
    ///
    /// ### Arguments
    /// * `host` - window that plot windows will be reparented into
    pub fn install(&mut self, host: WindowHandle) -> PlotHostResult<InstallOutcome> {
        if let Some(installed) = self.installed {
            debug!("install: already installed, host: {}, hook: {:?}", installed.host, installed.hook);
            return Ok(InstallOutcome::AlreadyInstalled);
        }
        if host.is_null() || !self.platform.is_window(host) {
            debug!("install: invalid host: {}", host);
            return Ok(InstallOutcome::InvalidHost);
        }

        match self.platform.install_activation_hook() {
            Ok(hook) => {
                self.installed = Some(Installation { host, hook });
                debug!("install: host: {}, hook: {:?}, class: {}", host, hook, self.opts.class_name());
                Ok(InstallOutcome::Installed)
            },
            Err(err) if self.opts.is_strict() => Err(PlotHostError::HookRegistration(err.to_string()).into()),
            Err(err) => {
                warn!("install: activation hook registration failed: {}", err);
                Ok(InstallOutcome::RegistrationFailed)
            },
        }
    }

    /// Stop embedding and release the activation hook. Returns true if anything was installed.
    pub fn uninstall(&mut self) -> bool {
        match self.installed.take() {
            Some(installed) => {
                if let Err(err) = self.platform.remove_activation_hook(installed.hook) {
                    warn!("uninstall: hook: {:?}, {}", installed.hook, err);
                }
                debug!("uninstall: host: {}, hook: {:?}", installed.host, installed.hook);
                true
            },
            None => false,
        }
    }

    /// Handle a hook event and forward it to the rest of the hook chain, returning the chain's
    /// result. This is the body of the activation hook procedure.
    ///
    /// ### Arguments
    /// * `event` - raw hook event as delivered by the platform
    pub fn on_activating(&self, event: &HookEvent) -> isize {
        let outcome = self.process(event);
        if outcome != ActivationOutcome::NotActivation {
            trace!("on_activating: win: {:#x}, outcome: {}", event.wparam, outcome);
        }
        self.platform.forward(self.hook(), event)
    }

    /// Match the activating window and embed it if it is a plot window not embedded yet
    ///
    /// ### Arguments
    /// * `event` - raw hook event as delivered by the platform
    pub fn process(&self, event: &HookEvent) -> ActivationOutcome {
        let win = match event.activating() {
            Some(win) => win,
            None => return ActivationOutcome::NotActivation,
        };
        let _guard = match ProcessingGuard::enter(&self.processing) {
            Some(guard) => guard,
            None => return ActivationOutcome::Reentrant,
        };
        let host = match self.host() {
            Some(host) => host,
            None => return ActivationOutcome::Inactive,
        };

        match self.platform.class_name(win, CLASS_NAME_CAPACITY) {
            Ok(class) if class == self.opts.class_name() => (),
            Ok(_) => return ActivationOutcome::ClassMismatch,
            Err(err) => {
                debug!("process: win: {}, {}", win, err);
                return ActivationOutcome::ClassMismatch;
            },
        }
        if let Ok(Some(parent)) = self.platform.parent(win) {
            if parent == host {
                return ActivationOutcome::AlreadyEmbedded;
            }
        }

        let (width, height) = self.embed(win, host);
        ActivationOutcome::Embedded { width, height }
    }

    // Turn the window into a child of the host filling its client area then tell the host
    fn embed(&self, win: WindowHandle, host: WindowHandle) -> (i32, i32) {
        skip_failure("set_style", self.platform.set_style(win, CHILD_WINDOW_STYLE));
        skip_failure("set_ex_style", self.platform.set_ex_style(win, NO_EXTENDED_STYLE));
        skip_failure("remove_menu", self.platform.remove_menu(win));
        skip_failure("clear_title", self.platform.clear_title(win));
        skip_failure("set_parent", self.platform.set_parent(win, host));

        let (w, h) = match self.platform.client_rect(host) {
            Ok(rect) => rect.fill_size(),
            Err(err) => {
                debug!("embed: host: {}, {}", host, err);
                crate::FALLBACK_SIZE
            },
        };
        skip_failure("place", self.platform.place(win, 0, 0, w, h));
        skip_failure("post_message", self.platform.post_message(host, self.opts.notify_message()));

        debug!("embed: win: {}, host: {}, w: {}, h: {}", win, host, w, h);
        (w, h)
    }
}

impl<P: WindowPlatform> Drop for PlotEmbedder<P> {
    fn drop(&mut self) {
        self.uninstall();
    }
}

fn skip_failure(step: &str, result: PlotHostResult<()>) {
    if let Err(err) = result {
        debug!("embed: {} failed: {}", step, err);
    }
}
