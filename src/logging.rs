use log::{Level, LevelFilter, SetLoggerError};

// Progress lines stay hidden unless asked for; `-v` only adds the summary on stdout
fn level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Plain, human-readable lines on stderr; stdout stays free for the
/// delivery summary.
pub fn init(debug: bool) -> Result<(), SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| match record.level() {
            Level::Warn => out.finish(format_args!("Warning: {}", message)),
            _ => out.finish(format_args!("{}", message)),
        })
        .level(level(debug))
        .chain(std::io::stderr())
        .apply()
}
