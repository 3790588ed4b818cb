//! `plothost` embeds R's GraphApp plot windows into a host window by hooking window activation on
//! the host's UI thread. The binary is a companion to `libplothost` for trying the embedding out and
//! for inspecting the windows involved.
//!
//! ## Command line examples
//!
//! ### Run a demo host
//! Open a host window and embed any plot window activated on its thread. `--spawn-plot` creates a
//! stand-in `GraphApp` window so the embedding can be watched without R.
//! ```bash
//! plothost host --spawn-plot
//! ```
//!
//! ### Inspect a window
//! Print the class, parent and client size of a window and whether it would be embedded.
//! ```bash
//! plothost info 0x1f04
//! ```
//!
//! ### Show the protocol constants
//! ```bash
//! plothost constants
//! ```
use clap::{crate_description, crate_version, Arg, ArgAction, ArgMatches, Command};
use gory::*;
use libplothost::{FALLBACK_SIZE, PLOT_ACTIVATED_MESSAGE, PLOT_WINDOW_CLASS};
use witcher::prelude::*;

#[cfg(windows)]
mod demo;

fn cli() -> Command {
    Command::new("plothost")
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .version(crate_version!())
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("host")
                .visible_alias("h")
                .about("Open a host window and embed plot windows into it")
                .arg(class_arg())
                .arg(
                    Arg::new("spawn-plot")
                        .long("spawn-plot")
                        .action(ArgAction::SetTrue)
                        .help("Create a stand-in plot window once the host is up"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail if the activation hook can't be registered"),
                ),
        )
        .subcommand(
            Command::new("info")
                .visible_alias("i")
                .about("Show how a window would be treated")
                .arg(Arg::new("HWND").required(true).help("Window handle in hex (0x...) or decimal"))
                .arg(class_arg()),
        )
        .subcommand(Command::new("constants").visible_alias("c").about("Show the embedding constants"))
}

fn class_arg() -> Arg {
    Arg::new("class")
        .long("class")
        .value_name("CLASS")
        .default_value(PLOT_WINDOW_CLASS)
        .help("Window class identifying a plot window")
}

// Always present as `class_arg` carries a default value
#[cfg(windows)]
fn plot_class(sub: &ArgMatches) -> &str {
    sub.get_one::<String>("class").map(String::as_str).unwrap_or_default()
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("debug"));

    let result = match matches.subcommand() {
        Some(("host", sub)) => host(sub),
        Some(("info", sub)) => info(sub),
        Some(("constants", _)) => {
            constants();
            Ok(())
        },
        _ => unreachable!(),
    };
    if let Err(err) = result {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();
}

fn constants() {
    println!("Plot window class:   {}", PLOT_WINDOW_CLASS.cyan());
    println!("Activated message:   {} (WM_USER + 100)", format!("{:#06x}", PLOT_ACTIVATED_MESSAGE).as_str().cyan());
    println!("Fallback size:       {}", format!("{}x{}", FALLBACK_SIZE.0, FALLBACK_SIZE.1).as_str().cyan());
}

#[cfg(windows)]
fn host(sub: &ArgMatches) -> Result<()> {
    let opts = libplothost::EmbedOpt::new().class(plot_class(sub)).strict(sub.get_flag("strict"));
    demo::run(opts, sub.get_flag("spawn-plot")).wrap("failed to run the demo host")
}

#[cfg(windows)]
fn info(sub: &ArgMatches) -> Result<()> {
    use libplothost::{platform::WindowPlatform, PlotHostError, Win32Platform, WindowHandle, CLASS_NAME_CAPACITY};

    let raw = sub.get_one::<String>("HWND").map(String::as_str).unwrap_or_default();
    let win = WindowHandle::try_from(raw).wrap("invalid window handle")?;
    let platform = Win32Platform;
    if !platform.is_window(win) {
        return Err(PlotHostError::InvalidHostWindow(win.0)).wrap("not a window");
    }
    let class = platform.class_name(win, CLASS_NAME_CAPACITY).wrap("failed to query the window class")?;
    let parent = platform.parent(win).wrap("failed to query the window parent")?;
    let rect = platform.client_rect(win).wrap("failed to query the client area")?;

    println!("Window:        {}", win);
    println!("Class:         {}", class);
    println!("Parent:        {}", parent.map(|x| x.to_string()).unwrap_or_else(|| "none".to_owned()));
    println!("Client area:   {}x{}", rect.width(), rect.height());
    if class == plot_class(sub) {
        println!("Plot window:   {}", "yes".green());
    } else {
        println!("Plot window:   {}", "no".red());
    }
    Ok(())
}

#[cfg(not(windows))]
fn host(_: &ArgMatches) -> Result<()> {
    unsupported()
}

#[cfg(not(windows))]
fn info(_: &ArgMatches) -> Result<()> {
    unsupported()
}

#[cfg(not(windows))]
fn unsupported() -> Result<()> {
    Err(libplothost::PlotHostError::Unsupported).wrap("plot windows can't be embedded here")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli() {
        cli().debug_assert();
    }

    #[test]
    fn test_class_defaults() {
        for cmd in ["host", "info"] {
            let mut args = vec!["plothost", cmd];
            if cmd == "info" {
                args.push("0x1f04");
            }
            let matches = cli().try_get_matches_from(args).unwrap();
            let (_, sub) = matches.subcommand().unwrap();
            assert_eq!(sub.get_one::<String>("class").map(String::as_str), Some(PLOT_WINDOW_CLASS));
        }
    }

    #[test]
    fn test_info_class_option() {
        let matches = cli().try_get_matches_from(["plothost", "info", "0x1f04", "--class", "Rgui"]).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "info");
        assert_eq!(sub.get_one::<String>("HWND").map(String::as_str), Some("0x1f04"));
        assert_eq!(sub.get_one::<String>("class").map(String::as_str), Some("Rgui"));
    }
}
