//! Configuration types for remote document conversion.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The backend address and shared secret are supplied
//! once, here, and never change for the lifetime of a
//! [`crate::convert::Converter`].

use crate::error::Doc2MdError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Default backend base URL, including the `/api/v1/async` prefix.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1/async";

/// Configuration for a conversion client.
///
/// # Example
/// ```rust
/// use doc2md::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .base_url("https://convert.example.com/api/v1/async")
///     .secret_key("change-me")
///     .poll_interval(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the async conversion API. Default: [`DEFAULT_BASE_URL`].
    ///
    /// Endpoint paths (`/upload-url`, `/task/{id}`, …) are appended to it and
    /// the full path component is what gets signed.
    pub base_url: String,

    /// Shared HMAC secret. Required.
    pub secret_key: String,

    /// Delay between status checks. Default: 2 s.
    pub poll_interval: Duration,

    /// Give up after this many status checks. Default: 900 (30 min at 2 s).
    pub max_poll_attempts: u32,

    /// Optional wall-clock ceiling on the polling phase.
    pub poll_timeout: Option<Duration>,

    /// Timeout for each signed API call and for the artifact fetch. Default: 30 s.
    pub request_timeout: Duration,

    /// Timeout for the direct upload to object storage. Default: 300 s.
    ///
    /// Kept separate from `request_timeout` because it scales with file size.
    pub transfer_timeout: Duration,

    /// Pause between the storage upload and task registration. Default: 1 s.
    ///
    /// Object storage may acknowledge a PUT slightly before the object is
    /// visible to the conversion worker.
    pub settle_delay: Duration,

    /// Largest file the client will attempt to upload. Default: 100 MiB.
    pub max_file_size: u64,

    /// Ask the backend to extract embedded images. Default: false.
    pub extract_images: bool,

    /// Optional user identifier forwarded at task registration.
    pub user_id: Option<String>,

    /// Receives workflow events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: String::new(),
            poll_interval: Duration::from_millis(2000),
            max_poll_attempts: 900,
            poll_timeout: None,
            request_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(300),
            settle_delay: Duration::from_millis(1000),
            max_file_size: 100 * 1024 * 1024,
            extract_images: false,
            user_id: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("poll_timeout", &self.poll_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .field("settle_delay", &self.settle_delay)
            .field("max_file_size", &self.max_file_size)
            .field("extract_images", &self.extract_images)
            .field("user_id", &self.user_id)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.config.secret_key = key.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.max_poll_attempts = n.max(1);
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn transfer_timeout(mut self, timeout: Duration) -> Self {
        self.config.transfer_timeout = timeout;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn extract_images(mut self, v: bool) -> Self {
        self.config.extract_images = v;
        self
    }

    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.config.user_id = Some(id.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, Doc2MdError> {
        let c = &self.config;
        if c.secret_key.is_empty() {
            return Err(Doc2MdError::InvalidConfig(
                "secret key is required".into(),
            ));
        }
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            Doc2MdError::InvalidConfig(format!("base URL '{}' is invalid: {e}", c.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Doc2MdError::InvalidConfig(format!(
                "base URL must be an http(s) URL, got '{}'",
                c.base_url
            )));
        }
        if c.poll_interval.is_zero() {
            return Err(Doc2MdError::InvalidConfig(
                "poll interval must be greater than zero".into(),
            ));
        }
        if c.max_file_size == 0 {
            return Err(Doc2MdError::InvalidConfig(
                "max file size must be greater than zero".into(),
            ));
        }
        Ok(self.config)
    }
}
