//! Win32 backend for the plot embedder. `Win32Platform` maps the platform seam onto user32 calls
//! and the free functions `install` / `uninstall` keep a single embedder per process, living in the
//! thread local storage of the thread that installed it, where the `WH_CBT` hook procedure can
//! reach it.
//!
//! The hook is thread scoped so only windows activated on the installing thread are seen. In
//! practice that is the UI thread hosting both R's graphics device and the host window.
use std::{
    cell::RefCell,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, trace, warn};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        System::Threading::GetCurrentThreadId,
        UI::WindowsAndMessaging::{
            CallNextHookEx, GetClientRect, GetParent, IsWindow, PostMessageW, RealGetWindowClassW, SetMenu,
            SetParent, SetWindowLongW, SetWindowPos, SetWindowTextW, SetWindowsHookExW, UnhookWindowsHookEx,
            GWL_EXSTYLE, GWL_STYLE, HHOOK, HMENU, HWND_TOP, SWP_FRAMECHANGED, SWP_SHOWWINDOW, WH_CBT,
        },
    },
};

use crate::{
    platform::WindowPlatform, EmbedOpt, HookEvent, InstallOutcome, PlotEmbedder, PlotHostError, PlotHostResult,
    Rect, WindowHandle,
};

thread_local! {
    static EMBEDDER: RefCell<Option<ThreadEmbedder>> = const { RefCell::new(None) };
}

// One embedder per process
static INSTALLED: AtomicBool = AtomicBool::new(false);

// Embedder held by the installing thread. Releases the process wide claim however it goes away,
// including the thread exiting without calling `uninstall`.
struct ThreadEmbedder(PlotEmbedder<Win32Platform>);

impl Drop for ThreadEmbedder {
    fn drop(&mut self) {
        self.0.uninstall();
        INSTALLED.store(false, Ordering::SeqCst);
    }
}

/// Windowing platform backed by user32
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Platform;

impl WindowPlatform for Win32Platform {
    type Hook = HHOOK;

    fn is_window(&self, win: WindowHandle) -> bool {
        unsafe { IsWindow(HWND::from(win)) }.as_bool()
    }

    fn class_name(&self, win: WindowHandle, capacity: usize) -> PlotHostResult<String> {
        let mut buf = vec![0u16; capacity];
        let len = unsafe { RealGetWindowClassW(HWND::from(win), &mut buf) } as usize;
        if len == 0 {
            return Err(PlotHostError::WindowQuery("class_name".to_owned()).into());
        }
        let class = String::from_utf16(&buf[..len.min(buf.len())])?;
        trace!("class_name: id: {}, class: {}", win, class);
        Ok(class)
    }

    fn parent(&self, win: WindowHandle) -> PlotHostResult<Option<WindowHandle>> {
        // A top-level window reports a null parent which surfaces as an error
        let parent = unsafe { GetParent(HWND::from(win)) }.ok().map(WindowHandle::from).filter(|x| !x.is_null());
        trace!("parent: id: {}, parent: {:?}", win, parent);
        Ok(parent)
    }

    fn client_rect(&self, win: WindowHandle) -> PlotHostResult<Rect> {
        let mut rc = RECT::default();
        unsafe { GetClientRect(HWND::from(win), &mut rc) }?;
        debug!("client_rect: id: {}, l: {}, t: {}, r: {}, b: {}", win, rc.left, rc.top, rc.right, rc.bottom);
        Ok(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn set_style(&self, win: WindowHandle, style: u32) -> PlotHostResult<()> {
        let prev = unsafe { SetWindowLongW(HWND::from(win), GWL_STYLE, style as i32) };
        trace!("set_style: id: {}, style: {:#x}, prev: {:#x}", win, style, prev);
        Ok(())
    }

    fn set_ex_style(&self, win: WindowHandle, style: u32) -> PlotHostResult<()> {
        let prev = unsafe { SetWindowLongW(HWND::from(win), GWL_EXSTYLE, style as i32) };
        trace!("set_ex_style: id: {}, style: {:#x}, prev: {:#x}", win, style, prev);
        Ok(())
    }

    fn remove_menu(&self, win: WindowHandle) -> PlotHostResult<()> {
        unsafe { SetMenu(HWND::from(win), HMENU::default()) }?;
        Ok(())
    }

    fn clear_title(&self, win: WindowHandle) -> PlotHostResult<()> {
        unsafe { SetWindowTextW(HWND::from(win), PCWSTR::null()) }?;
        Ok(())
    }

    fn set_parent(&self, win: WindowHandle, parent: WindowHandle) -> PlotHostResult<()> {
        unsafe { SetParent(HWND::from(win), HWND::from(parent)) }?;
        Ok(())
    }

    fn place(&self, win: WindowHandle, x: i32, y: i32, w: i32, h: i32) -> PlotHostResult<()> {
        unsafe { SetWindowPos(HWND::from(win), HWND_TOP, x, y, w, h, SWP_SHOWWINDOW | SWP_FRAMECHANGED) }?;
        Ok(())
    }

    fn post_message(&self, win: WindowHandle, msg: u32) -> PlotHostResult<()> {
        unsafe { PostMessageW(HWND::from(win), msg, WPARAM(0), LPARAM(0)) }?;
        Ok(())
    }

    fn install_activation_hook(&self) -> PlotHostResult<HHOOK> {
        let hook = unsafe { SetWindowsHookExW(WH_CBT, Some(cbt_proc), HINSTANCE::default(), GetCurrentThreadId()) }?;
        Ok(hook)
    }

    fn remove_activation_hook(&self, hook: HHOOK) -> PlotHostResult<()> {
        unsafe { UnhookWindowsHookEx(hook) }.map_err(|err| PlotHostError::HookRemoval(err.to_string()))?;
        Ok(())
    }

    fn forward(&self, hook: Option<HHOOK>, event: &HookEvent) -> isize {
        unsafe { CallNextHookEx(hook.unwrap_or_default(), event.code, WPARAM(event.wparam), LPARAM(event.lparam)) }.0
    }
}

/// Start embedding R plot windows activated on the calling thread into the given host window.
/// Does nothing if an embedder is already installed anywhere in the process or the host isn't a
/// window.
///
/// ### Arguments
/// * `host` - window that plot windows will be reparented into
///
/// ### Examples
/// ```ignore
/// use libplothost::prelude::*;
/// libplothost::install(WindowHandle(0x1f04)).unwrap();
/// ```
pub fn install(host: WindowHandle) -> PlotHostResult<InstallOutcome> {
    install_with(host, EmbedOpt::new())
}

/// Start embedding with the given options, see `install`
///
/// ### Arguments
/// * `host` - window that plot windows will be reparented into
/// * `opts` - embed options
pub fn install_with(host: WindowHandle, opts: EmbedOpt) -> PlotHostResult<InstallOutcome> {
    if INSTALLED.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
        debug!("install: already installed, host: {}", host);
        return Ok(InstallOutcome::AlreadyInstalled);
    }

    let result = EMBEDDER.with(|slot| -> PlotHostResult<InstallOutcome> {
        let mut embedder = PlotEmbedder::new(Win32Platform, opts);
        let outcome = embedder.install(host)?;
        if outcome == InstallOutcome::Installed {
            let mut slot = slot
                .try_borrow_mut()
                .map_err(|_| PlotHostError::HookRegistration("embedder slot is busy".to_owned()))?;
            *slot = Some(ThreadEmbedder(embedder));
        }
        Ok(outcome)
    });
    if !matches!(result, Ok(InstallOutcome::Installed)) {
        INSTALLED.store(false, Ordering::SeqCst);
    }
    result
}

/// Stop embedding and release the activation hook. Returns true if a hook was removed. Safe to
/// call when nothing is installed.
pub fn uninstall() -> bool {
    EMBEDDER.with(|slot| match slot.try_borrow_mut() {
        Ok(mut slot) => match slot.take() {
            Some(mut embedder) => embedder.0.uninstall(),
            None => {
                if INSTALLED.load(Ordering::SeqCst) {
                    warn!("uninstall: embedder belongs to another thread");
                }
                false
            },
        },
        Err(_) => {
            warn!("uninstall: ignored while an activation is being processed");
            false
        },
    })
}

/// Check if an embedder is installed in this process
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

// WH_CBT hook procedure dispatching into this thread's embedder
unsafe extern "system" fn cbt_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let event = HookEvent::new(code, wparam.0, lparam.0);
    let handled = EMBEDDER
        .try_with(|slot| {
            let slot = slot.try_borrow().ok()?;
            slot.as_ref().map(|embedder| embedder.0.on_activating(&event))
        })
        .ok()
        .flatten();
    LRESULT(handled.unwrap_or_else(|| Win32Platform.forward(None, &event)))
}

#[cfg(all(test, windows))]
mod tests {
    use std::{sync::Mutex, thread};

    use windows::{
        core::w,
        Win32::UI::WindowsAndMessaging::{CreateWindowExW, DestroyWindow, HWND_MESSAGE, WINDOW_EX_STYLE, WINDOW_STYLE},
    };

    use super::*;
    use crate::PLOT_WINDOW_CLASS;

    // The install flag is process wide so these tests must not overlap
    static SERIAL: Mutex<()> = Mutex::new(());

    fn serial() -> std::sync::MutexGuard<'static, ()> {
        SERIAL.lock().unwrap_or_else(|err| err.into_inner())
    }

    // Message-only window standing in for the host
    fn message_window() -> WindowHandle {
        unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("STATIC"),
                w!("plothost test host"),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                HMENU::default(),
                HINSTANCE::default(),
                None,
            )
        }
        .map(WindowHandle::from)
        .unwrap()
    }

    fn destroy(win: WindowHandle) {
        let _ = unsafe { DestroyWindow(HWND::from(win)) };
    }

    #[test]
    fn test_invalid_host_releases_claim() {
        let _serial = serial();
        assert_eq!(install(WindowHandle::NULL).unwrap(), InstallOutcome::InvalidHost);
        assert!(!is_installed());
        let outcome = install_with(WindowHandle(0x7fff_fff0), EmbedOpt::new().strict(true)).unwrap();
        assert_eq!(outcome, InstallOutcome::InvalidHost);
        assert!(!is_installed());
    }

    #[test]
    fn test_single_embedder_per_process() {
        let _serial = serial();
        let host = message_window();
        assert_eq!(install(host).unwrap(), InstallOutcome::Installed);
        assert!(is_installed());
        assert_eq!(install(host).unwrap(), InstallOutcome::AlreadyInstalled);

        let other = thread::spawn(|| {
            let host = message_window();
            let outcome = install(host).unwrap();
            let removed = uninstall();
            destroy(host);
            (outcome, removed)
        })
        .join()
        .unwrap();
        assert_eq!(other, (InstallOutcome::AlreadyInstalled, false));
        assert!(is_installed());

        assert!(uninstall());
        assert!(!is_installed());
        assert!(!uninstall());
        assert_eq!(install(host).unwrap(), InstallOutcome::Installed);
        assert!(uninstall());
        destroy(host);
    }

    #[test]
    fn test_thread_exit_releases_claim() {
        let _serial = serial();
        let outcome = thread::spawn(|| install(message_window()).unwrap()).join().unwrap();
        assert_eq!(outcome, InstallOutcome::Installed);
        assert!(!is_installed());

        let host = message_window();
        assert_eq!(install(host).unwrap(), InstallOutcome::Installed);
        assert!(uninstall());
        destroy(host);
    }

    #[test]
    fn test_uninstall_while_processing_is_ignored() {
        let _serial = serial();
        let host = message_window();
        assert_eq!(install(host).unwrap(), InstallOutcome::Installed);
        EMBEDDER.with(|slot| {
            let _busy = slot.borrow();
            assert!(!uninstall());
        });
        assert!(is_installed());
        assert!(uninstall());
        destroy(host);
    }

    #[test]
    fn test_hook_proc_without_embedder_forwards() {
        let _serial = serial();
        let result = unsafe { cbt_proc(3, WPARAM(0), LPARAM(0)) };
        assert_eq!(result.0, 0);
        assert!(!is_installed());
    }

    #[test]
    fn test_hook_removal_failure() {
        let err = Win32Platform.remove_activation_hook(HHOOK::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<PlotHostError>(), Some(PlotHostError::HookRemoval(_))));
    }

    #[test]
    fn test_class_name_of_host() {
        let _serial = serial();
        let host = message_window();
        assert!(Win32Platform.is_window(host));
        let class = Win32Platform.class_name(host, crate::CLASS_NAME_CAPACITY).unwrap();
        assert_eq!(class, "Static");
        assert_ne!(class, PLOT_WINDOW_CLASS);
        destroy(host);
    }
}
