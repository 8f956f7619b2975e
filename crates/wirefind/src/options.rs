//! Knobs for an inference run.

/// Options for [`crate::SerializerFinder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinderOptions {
    apply_defaults: bool,
    pass_fuel: Option<u32>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            apply_defaults: true,
            pass_fuel: Some(Self::DEFAULT_PASS_FUEL),
        }
    }
}

impl FinderOptions {
    pub const DEFAULT_PASS_FUEL: u32 = 256;

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nodes still unresolved at the first fixed point fall back
    /// to registry defaults (constants) and operator defaults (boolean and
    /// numeric results).
    pub fn apply_defaults(mut self, enabled: bool) -> Self {
        self.apply_defaults = enabled;
        self
    }

    /// Maximum number of passes; `None` removes the limit.
    pub fn pass_fuel(mut self, limit: Option<u32>) -> Self {
        self.pass_fuel = limit;
        self
    }

    pub fn defaults_enabled(&self) -> bool {
        self.apply_defaults
    }

    pub fn fuel(&self) -> Option<u32> {
        self.pass_fuel
    }
}
