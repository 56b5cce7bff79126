//! Decoder configuration.

/// Configuration for response decoding.
///
/// Controls how much of a body is buffered and whether resolved column
/// types are cached between responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest body, in bytes, that reader-based decoding will buffer.
    ///
    /// `None` buffers bodies of any size. Default: 256MB.
    pub max_body_bytes: Option<usize>,

    /// Number of resolved column types kept between responses.
    ///
    /// Zero disables the descriptor cache. Default: 256.
    pub descriptor_cache_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: Some(256 * 1024 * 1024), // 256MB
            descriptor_cache_capacity: 256,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with the given body limit.
    #[must_use]
    pub fn with_max_body_bytes(limit: usize) -> Self {
        Self {
            max_body_bytes: Some(limit),
            ..Default::default()
        }
    }

    /// Set or clear the body limit.
    #[must_use]
    pub const fn max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Set the descriptor cache capacity; zero disables caching.
    #[must_use]
    pub const fn descriptor_cache_capacity(mut self, capacity: usize) -> Self {
        self.descriptor_cache_capacity = capacity;
        self
    }

    /// Configuration for one-off decoding: no cache, small body limit.
    #[must_use]
    pub const fn small() -> Self {
        Self {
            max_body_bytes: Some(16 * 1024 * 1024), // 16MB
            descriptor_cache_capacity: 0,
        }
    }

    /// Configuration for long-running clients decoding large results.
    #[must_use]
    pub const fn large() -> Self {
        Self {
            max_body_bytes: Some(1024 * 1024 * 1024), // 1GB
            descriptor_cache_capacity: 4096,
        }
    }

    /// No body limit and no cache.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_body_bytes: None,
            descriptor_cache_capacity: 0,
        }
    }
}
