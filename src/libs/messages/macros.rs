//! Output macros for user-facing messages.
//!
//! Every macro takes a [`Message`](crate::libs::messages::Message) (or anything
//! implementing `Display`) and routes it either to the terminal or, when debug
//! mode is on, through `tracing` so it interleaves with the structured logs.
//!
//! Debug mode is enabled by setting `TIMEBILL_DEBUG` or `RUST_LOG`.

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Whether output should go through `tracing`. Cached after the first call.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("TIMEBILL_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[macro_export]
macro_rules! msg_print {
    ($msg:expr, true) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n{}\n", message);
        } else {
            println!("\n{}\n", message);
        }
    }};
    ($msg:expr) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", message);
        } else {
            println!("{}", message);
        }
    }};
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", message);
        } else {
            println!("✅ {}", message);
        }
    }};
}

/// Errors go to stderr outside debug mode.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", message);
        } else {
            eprintln!("❌ {}", message);
        }
    }};
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", message);
        } else {
            println!("⚠️ {}", message);
        }
    }};
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {{
        let message = $msg;
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", message);
        } else {
            println!("ℹ️ {}", message);
        }
    }};
}

/// Silent unless debug mode is on.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            let message = $msg;
            tracing::debug!("🔍 {}", message);
        }
    };
}

/// Builds an `anyhow::Error` from a message. The prefix is added by
/// [`msg_error!`] when the error reaches `main`.
#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("{}", $msg)
    };
}

/// Returns early with an `anyhow::Error` built from a message.
#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("{}", $msg)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn caller_bindings_keep_their_names() {
        // `tracing` brings `display` and `debug` helpers into scope inside its macros.
        let display = String::from("report.csv");
        let debug = 3;
        crate::msg_info!(format!("{} {}", display, debug));
        crate::msg_warning!(display.clone());
        crate::msg_error!(display.as_str());
        crate::msg_success!(debug);
        crate::msg_print!(display, true);
        crate::msg_debug!(debug);
    }
}
