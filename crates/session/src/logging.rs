//! Session logging. Every line goes to `tracing` under the `giffos::session`
//! target and is also sent to the shell as [`SessionEvent::Log`], so the
//! desktop window and the CLI shell see the same messages as the log file.

use crate::events::{LogLevel, SessionEvent};
use tokio::sync::mpsc::Sender;

pub async fn emit_log(tx: &Sender<SessionEvent>, level: LogLevel, message: String) {
    match level {
        LogLevel::Trace => tracing::trace!(target: "giffos::session", "{}", message),
        LogLevel::Debug => tracing::debug!(target: "giffos::session", "{}", message),
        LogLevel::Info => tracing::info!(target: "giffos::session", "{}", message),
        LogLevel::Warn => tracing::warn!(target: "giffos::session", "{}", message),
        LogLevel::Error => tracing::error!(target: "giffos::session", "{}", message),
    }

    // A closed receiver means the shell is gone; the tracing line is enough.
    let _ = tx.send(SessionEvent::Log { level, message }).await;
}

#[macro_export]
macro_rules! session_log {
    ($tx:expr, $level:ident, $($arg:tt)*) => {
        $crate::logging::emit_log($tx, $crate::events::LogLevel::$level, format!($($arg)*)).await
    };
}

#[macro_export]
macro_rules! log_debug {
    ($tx:expr, $($arg:tt)*) => { $crate::session_log!($tx, Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($tx:expr, $($arg:tt)*) => { $crate::session_log!($tx, Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($tx:expr, $($arg:tt)*) => { $crate::session_log!($tx, Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($tx:expr, $($arg:tt)*) => { $crate::session_log!($tx, Error, $($arg)*) };
}
