//! Terminal size detection.

/// Fallback size when the terminal cannot be queried (pipes, CI).
pub const DEFAULT_TERMINAL_SIZE: (u16, u16) = (80, 24);

/// Query the terminal size as `(columns, rows)`.
pub fn detect_terminal_size() -> (u16, u16) {
    match crossterm::terminal::size() {
        Ok((width, height)) if width > 0 && height > 0 => (width, height),
        Ok(_) => DEFAULT_TERMINAL_SIZE,
        Err(err) => {
            tracing::debug!("terminal size unavailable: {}", err);
            DEFAULT_TERMINAL_SIZE
        }
    }
}
