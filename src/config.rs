/// Timing and scenario configuration
use std::time::Duration;

/// Pacing of the typewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TyperConfig {
    /// Pause after each revealed character. `.` waits six times as long.
    pub char_delay: Duration,
    /// Pause before a line starts, except for the first line and in skip mode
    pub line_delay: Duration,
    /// Commit lines instantly instead of typing them
    pub skip_mode: bool,
}

impl TyperConfig {
    pub const DOT_FACTOR: u32 = 6;
    pub const SETTLE_FACTOR: u32 = 4;

    pub fn new(char_delay: Duration, line_delay: Duration) -> Self {
        TyperConfig {
            char_delay,
            line_delay,
            skip_mode: false,
        }
    }

    pub fn with_skip_mode(mut self, skip_mode: bool) -> Self {
        self.skip_mode = skip_mode;
        self
    }

    /// Delay that follows revealing `ch`
    pub fn delay_after(&self, ch: char) -> Duration {
        if ch == '.' {
            self.char_delay * Self::DOT_FACTOR
        } else {
            self.char_delay
        }
    }

    /// Pause after the last character of a line
    pub fn settle_delay(&self) -> Duration {
        self.char_delay * Self::SETTLE_FACTOR
    }
}

impl Default for TyperConfig {
    fn default() -> Self {
        TyperConfig::new(Duration::from_millis(50), Duration::from_millis(400))
    }
}

/// Options for a scenario run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub typer: TyperConfig,
    /// Number of declines that unlocks "yes"
    pub unlock_threshold: u32,
    /// Start with "yes" already unlocked
    pub unlocked_initially: bool,
    /// Resolve image placeholders (off for the text-only variant)
    pub images_enabled: bool,
    /// Allow the skip toggle (off for the variant without skip)
    pub skip_enabled: bool,
    /// Name echoed in the decline input line
    pub who: String,
}

impl ScenarioConfig {
    pub fn new() -> Self {
        ScenarioConfig {
            typer: TyperConfig::default(),
            unlock_threshold: 10,
            unlocked_initially: false,
            images_enabled: true,
            skip_enabled: true,
            who: "polita".to_string(),
        }
    }

    pub fn with_typer(mut self, typer: TyperConfig) -> Self {
        self.typer = typer;
        self
    }

    /// Set the unlock threshold. Zero is treated as one.
    pub fn with_unlock_threshold(mut self, threshold: u32) -> Self {
        self.unlock_threshold = threshold.max(1);
        self
    }

    pub fn with_unlocked_initially(mut self, unlocked: bool) -> Self {
        self.unlocked_initially = unlocked;
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    pub fn with_skip_enabled(mut self, enabled: bool) -> Self {
        self.skip_enabled = enabled;
        self
    }

    pub fn with_who(mut self, who: impl Into<String>) -> Self {
        self.who = who.into();
        self
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_settle_delays() {
        let config = TyperConfig::new(Duration::from_millis(10), Duration::ZERO);
        assert_eq!(config.delay_after('a'), Duration::from_millis(10));
        assert_eq!(config.delay_after('.'), Duration::from_millis(60));
        assert_eq!(config.settle_delay(), Duration::from_millis(40));
    }

    #[test]
    fn test_threshold_never_zero() {
        let config = ScenarioConfig::new().with_unlock_threshold(0);
        assert_eq!(config.unlock_threshold, 1);
    }
}
