//! Reply reader configuration.

/// Default buffer size for reading.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default maximum line text length.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024; // 1 MB

/// Reply reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Size of the chunk requested from the transport per read.
    pub buffer_size: usize,
    /// Maximum decoded text length of a single line.
    pub max_line_length: usize,
}

impl ReaderConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::new()
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Builder for reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfigBuilder {
    buffer_size: usize,
    max_line_length: usize,
}

impl ReaderConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Sets the read buffer size.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the maximum line text length.
    #[must_use]
    pub const fn max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Builds the configuration.
    ///
    /// A zero buffer size is raised to one byte.
    #[must_use]
    pub const fn build(self) -> ReaderConfig {
        ReaderConfig {
            buffer_size: if self.buffer_size == 0 { 1 } else { self.buffer_size },
            max_line_length: self.max_line_length,
        }
    }
}

impl Default for ReaderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.max_line_length, 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = ReaderConfig::builder()
            .buffer_size(16)
            .max_line_length(512)
            .build();
        assert_eq!(config.buffer_size, 16);
        assert_eq!(config.max_line_length, 512);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(ReaderConfigBuilder::default().build(), ReaderConfig::default());
    }

    #[test]
    fn test_zero_buffer_clamped() {
        let config = ReaderConfig::builder().buffer_size(0).build();
        assert_eq!(config.buffer_size, 1);
    }
}
