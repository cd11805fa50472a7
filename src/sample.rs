//! Local pointer sampling.
//!
//! DESIGN
//! ======
//! Positions are expressed relative to the viewport centre so every
//! participant shares the same origin regardless of window size. Samples are
//! ephemeral: only the latest one matters, and it is handed straight to the
//! throttle.

#[cfg(test)]
#[path = "sample_test.rs"]
mod sample_test;

/// Viewport dimensions in screen pixels. The centre is the shared origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Screen-space position of the shared origin.
    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// One pointer observation relative to the viewport centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalSample {
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the Unix epoch when the pointer event was observed.
    pub timestamp_ms: i64,
}

impl LocalSample {
    #[must_use]
    pub fn new(x: f64, y: f64, timestamp_ms: i64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Copy of this sample with any non-finite coordinate replaced by `0.0`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self { x: finite_or_zero(self.x), y: finite_or_zero(self.y), timestamp_ms: self.timestamp_ms }
    }
}

/// Converts raw pointer positions into origin-relative samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sampler {
    viewport: Viewport,
}

impl Sampler {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Sample a pointer event given in viewport pixels (top-left origin).
    #[must_use]
    pub fn sample(&self, client_x: f64, client_y: f64, timestamp_ms: i64) -> LocalSample {
        let (cx, cy) = self.viewport.center();
        LocalSample::new(client_x - cx, client_y - cy, timestamp_ms)
    }
}

/// Parse one textual pointer event: two numbers separated by whitespace or a comma.
///
/// Returns `None` for blank lines and anything that is not exactly two numbers.
#[must_use]
pub fn parse_pointer_line(line: &str) -> Option<(f64, f64)> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
