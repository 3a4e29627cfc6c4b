use chrono::Local;
use log::LevelFilter;
use std::io::Write;
use std::str::FromStr;

/// sqlx logs every statement at info, which drowns the app's own output.
/// It only follows the requested level when tracing.
fn sqlx_level(level: LevelFilter) -> LevelFilter {
    match level {
        LevelFilter::Trace => LevelFilter::Trace,
        other => other.min(LevelFilter::Warn),
    }
}

fn install(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {} - {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stdout)
        .filter_level(level)
        .filter_module("sqlx", sqlx_level(level));

    // Only the first call installs the logger; later calls adjust the level.
    let _ = builder.try_init();

    log::set_max_level(level);
}

pub(crate) fn parse_level(level: &str) -> Option<LevelFilter> {
    if level.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    LevelFilter::from_str(level.trim()).ok()
}

#[uniffi::export]
pub fn set_debug_log_level() {
    install(LevelFilter::Trace);
}

/// Returns false for an unknown level name.
#[uniffi::export]
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(lvl) => {
            install(lvl);
            true
        }
        None => false,
    }
}
