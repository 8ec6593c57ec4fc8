#![doc(test(attr(deny(warnings))))]

//! Wealth Core provides the recurrence, pricing, ledger-sync, and forecasting
//! primitives behind a single-user personal finance tracker. The UI layer is
//! expected to call into [`reporting`], [`sync`], and [`simulation`] and never
//! the other way around.

pub mod config;
pub mod domain;
pub mod errors;
pub mod money;
pub mod reporting;
pub mod schedule;
pub mod simulation;
pub mod storage;
pub mod sync;

use std::sync::Once;

pub use errors::{CoreError, Result};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("wealth_core=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Wealth Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
