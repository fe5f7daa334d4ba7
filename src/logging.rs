use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Hosts that already install their own subscriber can skip this; calling it
/// more than once is harmless because a second registration is ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notabene=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
