use thiserror::Error;

/// Fatal startup failures. Anything that happens after setup is either
/// swallowed by the X error handler or handled locally by the event
/// handlers; only these abort the process.
#[derive(Debug, Error)]
pub enum DeckwmError {
    #[error("cannot open display")]
    DisplayOpen,
    #[error("another window manager is already running")]
    OtherWmRunning,
    #[error("cannot load font '{0}'")]
    FontLoad(String),
    #[error("cannot allocate color")]
    ColorAlloc,
}
