use std::path::PathBuf;

use chrono::Local;
use log::info;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use url::Url;

use crate::config::Config;
use crate::download::dated_file_name;
use crate::error::{ApodError, TransferError};
use crate::image::ImageReference;
use crate::wallpaper::WallpaperSetter;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde0", derive(serde::Serialize))]
pub struct Wallpaper {
    /// The image that was downloaded.
    pub image: ImageReference,
    /// Where the image was stored.
    pub path: PathBuf,
}

/// Fetches the picture of the day and hands it to a [`WallpaperSetter`].
#[derive(Debug, Clone)]
pub struct Apod {
    /// The [`reqwest::Client`] that drives requests.
    client: Client,
    /// Configuration for the run.
    pub(crate) config: Config,
}

impl Apod {
    /// Convenience method for creating a new [`ApodBuilder`]
    #[inline]
    pub fn builder() -> ApodBuilder {
        ApodBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole chain once: feed, page, download, wallpaper.
    ///
    /// The image is stored under today's local date. `setter` is called
    /// inline and blocks this task until it returns.
    pub async fn run<W: WallpaperSetter + ?Sized>(
        &self,
        setter: &W,
    ) -> Result<Wallpaper, ApodError> {
        let wallpaper = self.download_latest().await?;

        setter.set_wallpaper(&wallpaper.path)?;
        info!("Success!");

        Ok(wallpaper)
    }

    /// Everything [`Apod::run`] does except touching the desktop.
    pub async fn download_latest(&self) -> Result<Wallpaper, ApodError> {
        let entry = self.fetch_latest_entry(&self.config.feed_url).await?;
        info!("Latest entry: {:?}", entry.title);

        let image = self.locate_image(&entry.link, &entry.title).await?;

        let output_dir = tokio::fs::canonicalize(&self.config.output_dir)
            .await
            .map_err(|error| ApodError::FileWrite {
                path: self.config.output_dir.clone(),
                error,
            })?;
        let path = output_dir.join(dated_file_name(&self.config, Local::now().date_naive()));

        self.download_to(&image.url, &path).await?;
        info!("Stored {:?} at {}", image.name, path.display());

        Ok(Wallpaper { image, path })
    }

    /// A single GET, rejecting non 2xx responses if configured to.
    pub(crate) async fn get(&self, url: &Url) -> Result<Response, TransferError> {
        let resp = self.client.get(url.clone()).send().await?;

        if self.config.http_success_only && !resp.status().is_success() {
            return Err(TransferError::NoHttpSuccess(resp.status()));
        }

        Ok(resp)
    }
}

#[derive(Debug, Default)]
pub struct ApodBuilder {
    config: Option<Config>,
    client: Option<Client>,
}

impl ApodBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured client instead of building one from the config.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<Apod, ApodError> {
        let config = self.config.unwrap_or_default();

        let client = match self.client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::with_capacity(1);
                headers.insert(
                    USER_AGENT,
                    HeaderValue::from_str(&config.browser_user_agent).map_err(|_| {
                        ApodError::InvalidConfig(format!(
                            "invalid user agent {:?}",
                            config.browser_user_agent
                        ))
                    })?,
                );
                Client::builder()
                    .timeout(config.request_timeout)
                    .default_headers(headers)
                    .build()
                    .map_err(|error| {
                        ApodError::InvalidConfig(format!("failed to build http client: {}", error))
                    })?
            }
        };

        Ok(Apod { client, config })
    }
}
