use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// All different error types this crate uses.
///
/// Every variant is terminal: a run stops at the first error it hits.
#[derive(Error, Debug)]
pub enum ApodError {
    /// Failed to retrieve the feed document.
    #[error("Failed to fetch feed {url}: {error}")]
    FeedFetch {
        /// The url of the feed.
        url: Url,
        #[source]
        error: TransferError,
    },
    /// The feed body is not a valid syndication document.
    #[error("Failed to parse feed {url}")]
    FeedParse {
        /// The url of the feed.
        url: Url,
        #[source]
        error: FeedError,
    },
    /// The feed parsed fine but lists no items.
    #[error("Feed {url} contains no items")]
    EmptyFeed {
        /// The url of the feed.
        url: Url,
    },
    /// The newest item lacks a field required to continue.
    #[error("Latest item of feed {url} has no {field}")]
    IncompleteEntry {
        /// The url of the feed.
        url: Url,
        /// Name of the missing field.
        field: &'static str,
    },
    /// Failed to retrieve the detail page of a feed item.
    #[error("Failed to fetch page {url}: {error}")]
    PageFetch {
        /// The url of the page.
        url: Url,
        #[source]
        error: TransferError,
    },
    /// Reached the end of the page without a single `<img src>`.
    #[error("Reached end of {url} without finding a single <img> tag with a src")]
    NoImageFound {
        /// The url of the page.
        url: Url,
    },
    /// A link or `src` value could not be parsed as url.
    #[error("Malformed url {input:?}")]
    MalformedUrl {
        /// The offending value.
        input: String,
        #[source]
        error: url::ParseError,
    },
    /// Failed to transfer the image body.
    #[error("Failed to download {url}: {error}")]
    Download {
        /// The url of the image.
        url: Url,
        #[source]
        error: TransferError,
    },
    /// Failed to open the destination file.
    #[error("Failed to write {}", path.display())]
    FileWrite {
        /// The destination path.
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    /// The host mechanism refused to change the background.
    #[error("Wallpaper command `{program}` failed: {reason}")]
    WallpaperSet {
        /// The program that was invoked.
        program: String,
        /// Exit status or spawn failure, plus captured stderr.
        reason: String,
    },
    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single http transfer failed.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Failed to get a response or to read its body.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Received a good non success Http response.
    #[error("Expected a 2xx Success but got: {0}")]
    NoHttpSuccess(StatusCode),
    /// Failed to write a received chunk to disk.
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a body could not be read as feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Looked like RSS but failed to parse.
    #[error("Invalid rss feed: {0}")]
    Rss(#[from] rss::Error),
    /// Neither RSS nor a valid Atom feed.
    #[error("Invalid atom feed: {0}")]
    Atom(#[from] atom_syndication::Error),
}

impl ApodError {
    pub(crate) fn malformed_url<T: ToString>(input: T, error: url::ParseError) -> Self {
        ApodError::MalformedUrl {
            input: input.to_string(),
            error,
        }
    }
}
