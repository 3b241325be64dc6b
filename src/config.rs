use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use url::Url;

use crate::error::ApodError;

/// Where NASA publishes the daily picture.
pub const APOD_FEED_URL: &str = "https://apod.nasa.gov/apod.rss";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The feed to read the newest entry from.
    pub(crate) feed_url: Url,
    /// Directory the image is stored in. Must already exist.
    pub(crate) output_dir: PathBuf,
    /// `chrono` format string for the file name.
    pub(crate) date_format: String,
    /// Extension appended to the dated file name.
    pub(crate) file_extension: String,
    /// The user-agent used for requests.
    pub(crate) browser_user_agent: String,
    /// Timeout for requests.
    pub(crate) request_timeout: Duration,
    /// Whether to capture only 2XX responses or failures as well.
    pub(crate) http_success_only: bool,
}

impl Config {
    /// Default timeout for requests, including the image transfer.
    pub const DEFAULT_REQ_TIMEOUT_SEC: u64 = 30;

    /// Default file name pattern: `20240101`.
    pub const DEFAULT_DATE_FORMAT: &'static str = "%Y%m%d";

    /// Default user agent for `apod-wallpaper`.
    #[inline]
    pub(crate) fn user_agent() -> String {
        format!("apod-wallpaper/{}", env!("CARGO_PKG_VERSION"))
    }

    /// `<pictures>/NASA`, or `./NASA` if the platform knows no picture dir.
    pub fn default_output_dir() -> PathBuf {
        dirs::picture_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("NASA")
    }

    /// Convenience method to create a [`ConfigBuilder`]
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn http_success_only(&self) -> bool {
        self.http_success_only
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed_url: Url::parse(APOD_FEED_URL).expect("constant feed url is valid"),
            output_dir: Config::default_output_dir(),
            date_format: Config::DEFAULT_DATE_FORMAT.to_string(),
            file_extension: "jpg".to_string(),
            browser_user_agent: Config::user_agent(),
            request_timeout: Duration::from_secs(Config::DEFAULT_REQ_TIMEOUT_SEC),
            http_success_only: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    /// The feed to read the newest entry from.
    feed_url: Option<String>,
    /// Directory the image is stored in.
    output_dir: Option<PathBuf>,
    /// `chrono` format string for the file name.
    date_format: Option<String>,
    /// Extension appended to the dated file name.
    file_extension: Option<String>,
    /// The user-agent used for requests.
    browser_user_agent: Option<String>,
    /// Timeout for requests.
    request_timeout: Option<Duration>,
    /// Whether to capture only 2XX responses or failures as well.
    http_success_only: Option<bool>,
}

impl ConfigBuilder {
    pub fn feed_url<T: ToString>(mut self, feed_url: T) -> Self {
        self.feed_url = Some(feed_url.to_string());
        self
    }

    pub fn output_dir<T: AsRef<Path>>(mut self, output_dir: T) -> Self {
        self.output_dir = Some(output_dir.as_ref().to_path_buf());
        self
    }

    pub fn date_format<T: ToString>(mut self, date_format: T) -> Self {
        self.date_format = Some(date_format.to_string());
        self
    }

    pub fn file_extension<T: ToString>(mut self, file_extension: T) -> Self {
        self.file_extension = Some(file_extension.to_string());
        self
    }

    pub fn browser_user_agent<T: ToString>(mut self, browser_user_agent: T) -> Self {
        self.browser_user_agent = Some(browser_user_agent.to_string());
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = Some(request_timeout);
        self
    }

    pub fn http_success_only(mut self, http_success_only: bool) -> Self {
        self.http_success_only = Some(http_success_only);
        self
    }

    pub fn build(self) -> Result<Config, ApodError> {
        let defaults = Config::default();

        let feed_url = match self.feed_url {
            Some(url) => Url::parse(&url).map_err(|error| ApodError::malformed_url(url, error))?,
            None => defaults.feed_url,
        };
        if feed_url.cannot_be_a_base() {
            return Err(ApodError::InvalidConfig(format!(
                "feed url {} can not be a base url",
                feed_url
            )));
        }

        let file_extension = self
            .file_extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or(defaults.file_extension);
        if file_extension.is_empty() || file_extension.contains(std::path::is_separator) {
            return Err(ApodError::InvalidConfig(format!(
                "unusable file extension {:?}",
                file_extension
            )));
        }

        let date_format = self.date_format.unwrap_or(defaults.date_format);
        if date_format.is_empty()
            || date_format.contains(std::path::is_separator)
            || StrftimeItems::new(&date_format).any(|item| item == Item::Error)
        {
            return Err(ApodError::InvalidConfig(format!(
                "unusable date format {:?}",
                date_format
            )));
        }

        Ok(Config {
            feed_url,
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            date_format,
            file_extension,
            browser_user_agent: self
                .browser_user_agent
                .unwrap_or(defaults.browser_user_agent),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            http_success_only: self.http_success_only.unwrap_or(defaults.http_success_only),
        })
    }
}
