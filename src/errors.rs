use color_eyre::Result;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture},
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tracing::error;

/// Put the terminal back into cooked mode
///
/// Safe to call more than once. Failures are ignored because this also runs
/// while panicking.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        std::io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
}

/// Install the color-eyre report handlers and a panic hook that restores the
/// terminal before reporting
///
/// Debug builds print a full backtrace with better-panic; release builds write
/// a crash report with human-panic.
pub fn init() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Please report it along with {}",
            crate::logging::LOG_FILE.as_str()
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let metadata = metadata!();
            let file_path = handle_dump(&metadata, panic_info);
            if let Err(e) = print_msg(file_path, &metadata) {
                eprintln!("failed to print crash report: {e}");
            }
            eprintln!("{}", panic_hook.panic_report(panic_info));
        }
        let report = panic_hook.panic_report(panic_info).to_string();
        error!("Error: {}", plain_text(&report));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(1);
    }));
    Ok(())
}

/// Report text without colour escapes, for the log file
fn plain_text(report: &str) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes::strip(report)).into_owned()
}
