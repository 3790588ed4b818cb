//! Demo host window. Installs the embedder into a plain top-level window, keeps the embedded plot
//! sized to the host and logs every `PLOT_ACTIVATED_MESSAGE` the host receives.
use core::ffi::c_void;

use libplothost::{EmbedOpt, InstallOutcome, PlotHostResult, WindowHandle, PLOT_ACTIVATED_MESSAGE};
use tracing::{debug, info, warn};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, GetWindow, LoadCursorW,
            PostQuitMessage, RegisterClassW, SetWindowPos, TranslateMessage, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT,
            GW_CHILD, HMENU, HWND_TOP, IDC_ARROW, MSG, SWP_NOACTIVATE, SWP_NOZORDER, WINDOW_EX_STYLE, WM_DESTROY,
            WM_SIZE, WNDCLASSW, WS_CLIPCHILDREN, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
        },
    },
};

const HOST_CLASS: PCWSTR = w!("PlotHostDemo");

/// Open the host window, embed plots into it and pump messages until it is closed
///
/// ### Arguments
/// * `opts` - embed options
/// * `spawn_plot` - create a stand-in plot window once the host is up
pub fn run(opts: EmbedOpt, spawn_plot: bool) -> PlotHostResult<()> {
    let plot_class = opts.class_name().to_owned();
    unsafe {
        let instance: HINSTANCE = GetModuleHandleW(PCWSTR::null())?.into();
        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(host_proc),
            hInstance: instance,
            hCursor: LoadCursorW(HINSTANCE::default(), IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 as isize + 1) as *mut c_void),
            lpszClassName: HOST_CLASS,
            ..Default::default()
        };
        RegisterClassW(&wc);

        let host = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            HOST_CLASS,
            w!("plothost"),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN | WS_VISIBLE,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            800,
            600,
            HWND::default(),
            HMENU::default(),
            instance,
            None,
        )?;

        match libplothost::install_with(WindowHandle::from(host), opts)? {
            InstallOutcome::Installed => info!("run: embedding plots into host: {}", WindowHandle::from(host)),
            outcome => warn!("run: embedder not installed: {}", outcome),
        }
        if spawn_plot {
            spawn_plot_window(instance, &plot_class)?;
        }

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, HWND::default(), 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    libplothost::uninstall();
    Ok(())
}

// Stand-in for R's graphics device: a decorated top-level window of the plot class. Showing it
// activates it which is what the embedder reacts to.
unsafe fn spawn_plot_window(instance: HINSTANCE, class: &str) -> PlotHostResult<()> {
    let class: Vec<u16> = class.encode_utf16().chain(Some(0)).collect();
    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(plot_proc),
        hInstance: instance,
        hbrBackground: HBRUSH((COLOR_WINDOW.0 as isize + 1) as *mut c_void),
        lpszClassName: PCWSTR(class.as_ptr()),
        ..Default::default()
    };
    RegisterClassW(&wc);

    let plot = CreateWindowExW(
        WINDOW_EX_STYLE::default(),
        PCWSTR(class.as_ptr()),
        w!("R Graphics: Device 2 (ACTIVE)"),
        WS_OVERLAPPEDWINDOW | WS_VISIBLE,
        CW_USEDEFAULT,
        CW_USEDEFAULT,
        480,
        480,
        HWND::default(),
        HMENU::default(),
        instance,
        None,
    )?;
    debug!("spawn_plot_window: id: {}", WindowHandle::from(plot));
    Ok(())
}

unsafe extern "system" fn host_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        PLOT_ACTIVATED_MESSAGE => {
            info!("host_proc: plot embedded into host: {}", WindowHandle::from(hwnd));
            LRESULT(0)
        },
        WM_SIZE => {
            // Keep the embedded plot filling the client area
            if let Ok(child) = GetWindow(hwnd, GW_CHILD) {
                let (w, h) = ((lparam.0 & 0xffff) as i32, ((lparam.0 >> 16) & 0xffff) as i32);
                let _ = SetWindowPos(child, HWND_TOP, 0, 0, w, h, SWP_NOZORDER | SWP_NOACTIVATE);
                debug!("host_proc: resized plot: {}, w: {}, h: {}", WindowHandle::from(child), w, h);
            }
            LRESULT(0)
        },
        WM_DESTROY => {
            libplothost::uninstall();
            PostQuitMessage(0);
            LRESULT(0)
        },
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe extern "system" fn plot_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}
