#![warn(clippy::all)]

use clap::Parser;
use color_eyre::eyre;
use shade::DATA_DIR;
use shade::config::ShadeConfig;
use shade::space::SpaceMask;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, about, version = version::LONG_VERSION)]
struct Opts {
    /// Path to a configuration file (default: $SHADE_CONFIG_HOME/shade.json)
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    subcmd: Option<SubCommand>,
}

#[derive(Parser)]
enum SubCommand {
    /// List on-screen windows and the Spaces they belong to
    Windows(Windows),
    /// List the Spaces of every display
    Spaces(Spaces),
    /// Print the id of the active Space
    ActiveSpace,
    /// Print the desktop overview
    Overview,
    /// Check the accessibility permission
    Permissions(Permissions),
    /// Print the JSON schema of the configuration file
    #[cfg(feature = "schemars")]
    Schema,
    /// Show the desktop overview while the trigger modifier is held (default)
    Watch,
}

#[derive(Parser)]
struct Windows {
    /// Print JSON instead of one line per window
    #[clap(long)]
    json: bool,
    /// Override the configured Space selection mask
    #[clap(long, value_enum)]
    mask: Option<SpaceMask>,
}

#[derive(Parser)]
struct Spaces {
    /// Print a JSON snapshot of Spaces and windows
    #[clap(long)]
    json: bool,
}

#[derive(Parser)]
struct Permissions {
    /// Ask the system to prompt for the permission if it has not been granted
    #[clap(long)]
    prompt: bool,
    /// Open the accessibility pane of System Settings
    #[clap(long)]
    open_settings: bool,
}

fn setup(config: &ShadeConfig, default_filter: &str) -> eyre::Result<Option<WorkerGuard>> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        unsafe {
            std::env::set_var("RUST_LIB_BACKTRACE", "1");
        }
    }

    color_eyre::install()?;

    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", default_filter);
        }
    }

    let guard = if config.log_to_file {
        std::fs::create_dir_all(&*DATA_DIR)?;
        let appender = tracing_appender::rolling::never(&*DATA_DIR, "shade.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt::Subscriber::builder()
                .with_env_filter(EnvFilter::from_default_env())
                .with_ansi(false)
                .with_writer(writer)
                .finish(),
        )?;

        Some(guard)
    } else {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt::Subscriber::builder()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .finish(),
        )?;

        None
    };

    // https://github.com/tokio-rs/tracing/blob/master/examples/examples/panic_hook.rs
    // Set a panic hook that records the panic as a `tracing` event at the
    // `ERROR` verbosity level.
    std::panic::set_hook(Box::new(|panic| {
        panic.location().map_or_else(
            || {
                tracing::error!(message = %panic);
            },
            |location| {
                tracing::error!(
                    message = %panic,
                    panic.file = location.file(),
                    panic.line = location.line(),
                    panic.column = location.column(),
                );
            },
        );
    }));

    Ok(guard)
}

fn main() -> eyre::Result<()> {
    let opts = Opts::parse();

    let config_path = opts.config.unwrap_or_else(ShadeConfig::default_path);
    let (config, notices) = ShadeConfig::load(&config_path)?;

    let subcmd = opts.subcmd.unwrap_or(SubCommand::Watch);
    let default_filter = if matches!(subcmd, SubCommand::Watch) {
        "info"
    } else {
        "warn"
    };

    let _guard = setup(&config, default_filter)?;
    for notice in &notices {
        notice.log();
    }

    #[cfg(feature = "schemars")]
    if matches!(subcmd, SubCommand::Schema) {
        let schema = schemars::schema_for!(ShadeConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    run(subcmd, config)
}

#[cfg(not(target_os = "macos"))]
fn run(_subcmd: SubCommand, _config: ShadeConfig) -> eyre::Result<()> {
    eyre::bail!("shade queries the macOS window server and only runs on macOS")
}

#[cfg(target_os = "macos")]
fn run(subcmd: SubCommand, config: ShadeConfig) -> eyre::Result<()> {
    use shade::accessibility::AccessibilityApi;
    use shade::overview::DesktopOverview;
    use shade::window_manager::WindowManager;
    use shade::window_server::SkylightWindowServer;
    use shade::window_server::WindowServer;
    use std::io::IsTerminal;

    let server = SkylightWindowServer::new();

    match subcmd {
        SubCommand::Windows(args) => {
            let mut wm = WindowManager::new(&config);
            if let Some(mask) = args.mask {
                wm.space_mask = mask;
            }

            wm.enumerate_windows(&server);

            if args.json {
                println!("{}", serde_json::to_string_pretty(&wm.windows)?);
            } else {
                for window in &wm.windows {
                    println!("{window}");
                }
            }
        }
        SubCommand::Spaces(args) => {
            let mut wm = WindowManager::new(&config);
            wm.enumerate_windows(&server);
            let snapshot = wm.snapshot(&server)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                for space in &snapshot.spaces {
                    println!(
                        "{} {} {} ({} windows) [{}]",
                        snapshot.marker(space.id),
                        space.id,
                        space.name,
                        space.window_count,
                        space.display
                    );
                }
            }
        }
        SubCommand::ActiveSpace => {
            println!("{}", server.active_space());
        }
        SubCommand::Overview => {
            let mut wm = WindowManager::new(&config);
            wm.enumerate_windows(&server);
            let snapshot = wm.snapshot(&server)?;

            let colour = std::io::stdout().is_terminal();
            for line in DesktopOverview::new(&snapshot.spaces, Some(snapshot.active_space)).lines()
            {
                println!("{}", line.styled(colour));
            }
        }
        SubCommand::Permissions(args) => {
            let trusted = if args.prompt {
                AccessibilityApi::request_trust()
            } else {
                AccessibilityApi::is_process_trusted()
            };

            if trusted {
                println!("accessibility permission is granted");
            } else {
                println!("accessibility permission is not granted");
            }

            if args.open_settings {
                AccessibilityApi::open_system_settings()?;
            }
        }
        #[cfg(feature = "schemars")]
        SubCommand::Schema => {}
        SubCommand::Watch => watch::run(server, config)?,
    }

    Ok(())
}

#[cfg(target_os = "macos")]
mod watch {
    use color_eyre::eyre;
    use color_eyre::eyre::OptionExt;
    use crossbeam_channel::Receiver;
    use objc2::MainThreadMarker;
    use objc2::rc::autoreleasepool;
    use objc2_core_foundation::CFRunLoop;
    use objc2_core_foundation::kCFRunLoopDefaultMode;
    use shade::accessibility::AccessibilityApi;
    use shade::accessibility::PermissionMonitor;
    use shade::config::ShadeConfig;
    use shade::core_graphics::CoreGraphicsApi;
    use shade::key_monitor::KeyMonitor;
    use shade::modifier;
    use shade::modifier::ModifierTransition;
    use shade::overlay::OverlayWindow;
    use shade::overview::DesktopOverview;
    use shade::window_manager::WindowManager;
    use shade::window_server::SkylightWindowServer;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::mpsc;
    use std::time::Duration;

    fn quit_on_ctrlc() -> Arc<AtomicBool> {
        let quit_ctrlc = Arc::new(AtomicBool::new(false));
        let quit_thread = quit_ctrlc.clone();

        std::thread::spawn(move || {
            let (ctrlc_sender, ctrlc_receiver) = mpsc::channel();
            ctrlc::set_handler(move || {
                ctrlc_sender
                    .send(())
                    .expect("could not send signal on ctrl-c channel");
            })
            .expect("could not set ctrl-c handler");

            ctrlc_receiver
                .recv()
                .expect("could not receive signal on ctrl-c channel");

            tracing::info!("ctrl-c signal received");
            quit_ctrlc.store(true, Ordering::Relaxed);
        });

        quit_thread
    }

    fn log_permission(granted: bool) {
        if granted {
            tracing::info!("accessibility permission granted");
        } else {
            tracing::warn!(
                "shade needs to be added as a trusted accessibility process to observe modifier keys"
            );
        }
    }

    /// Blocks until the accessibility permission is granted, returning false
    /// if asked to quit first
    fn wait_for_permission(changes: &Receiver<bool>, quit: &AtomicBool) -> bool {
        if AccessibilityApi::request_trust() {
            return true;
        }

        if let Err(error) = AccessibilityApi::open_system_settings() {
            tracing::warn!("{error}");
        }

        loop {
            if quit.load(Ordering::Relaxed) {
                return false;
            }

            if let Ok(granted) = changes.recv_timeout(Duration::from_millis(500)) {
                log_permission(granted);
                if granted {
                    return true;
                }
            }
        }
    }

    fn show_overview(
        wm: &mut WindowManager,
        server: &SkylightWindowServer,
        overlay: Option<&OverlayWindow>,
    ) {
        wm.enumerate_windows(server);

        let snapshot = match wm.snapshot(server) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!("could not read spaces: {error}");
                return;
            }
        };

        let lines = DesktopOverview::new(&snapshot.spaces, Some(snapshot.active_space)).lines();
        for line in &lines {
            tracing::info!("{}", line.text);
        }

        if let Some(overlay) = overlay {
            overlay.set_lines(&lines);
            overlay.show();
        }
    }

    pub fn run(server: SkylightWindowServer, config: ShadeConfig) -> eyre::Result<()> {
        let mtm = MainThreadMarker::new().ok_or_eyre("shade must run on the main thread")?;
        let quit = quit_on_ctrlc();

        let (_permission_monitor, permission_changes) =
            PermissionMonitor::spawn(config.permission_poll_interval(), || {
                AccessibilityApi::is_process_trusted()
            });

        if !wait_for_permission(&permission_changes, &quit) {
            return Ok(());
        }

        tracing::info!(
            "display size for main display is: {}",
            CoreGraphicsApi::main_display_bounds()
        );
        tracing::info!(
            "window server connection {:?}, active space {}",
            server.connection(),
            shade::space::SpaceApi::active_space(server.connection())
        );

        let run_loop = CFRunLoop::current().ok_or_eyre("couldn't get CFRunLoop::current")?;
        let _key_monitor = KeyMonitor::init(&run_loop, config.trigger_modifier)
            .ok_or_eyre("could not create an event tap for modifier keys")?;

        let overlay = if config.overlay {
            Some(OverlayWindow::new(mtm)?)
        } else {
            None
        };

        let transitions = modifier::event_rx();
        let mut wm = WindowManager::new(&config);

        tracing::info!(
            "hold {} to show the desktop overview",
            config.trigger_modifier
        );

        loop {
            if quit.load(Ordering::Relaxed) {
                tracing::info!("stopping CFRunLoop");
                break;
            }

            // this gets our event tap callbacks firing
            autoreleasepool(|_| unsafe { CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, 0.1, false) });

            for granted in permission_changes.try_iter() {
                log_permission(granted);
            }

            for transition in transitions.try_iter() {
                match transition {
                    ModifierTransition::Pressed => show_overview(&mut wm, &server, overlay.as_ref()),
                    ModifierTransition::Released => {
                        if let Some(overlay) = &overlay {
                            overlay.hide();
                        }
                    }
                }
            }
        }

        if let Some(overlay) = overlay {
            overlay.close();
        }

        Ok(())
    }
}
