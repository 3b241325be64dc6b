use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use futures::{pin_mut, StreamExt};
use log::{debug, info};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::apod::Apod;
use crate::config::Config;
use crate::error::{ApodError, TransferError};

/// `<date>.<ext>` for the configured layout.
pub fn dated_file_name(config: &Config, date: NaiveDate) -> String {
    format!(
        "{}.{}",
        date.format(config.date_format()),
        config.file_extension()
    )
}

/// `<output_dir>/<date>.<ext>` for the configured layout.
pub fn dated_path(config: &Config, date: NaiveDate) -> PathBuf {
    config.output_dir().join(dated_file_name(config, date))
}

impl Apod {
    /// The file the picture of `date` is stored in.
    pub fn destination(&self, date: NaiveDate) -> PathBuf {
        dated_path(&self.config, date)
    }

    /// Stream the body at `url` into `destination`.
    ///
    /// The file is created or truncated. On failure a partially written file
    /// stays behind.
    pub async fn download_to(&self, url: &Url, destination: &Path) -> Result<(), ApodError> {
        info!("Getting the input url reader for {}", url);
        let resp = self
            .get(url)
            .await
            .map_err(|error| download_error(url, error))?;

        info!("Creating the output file {}", destination.display());
        let mut file = File::create(destination)
            .await
            .map_err(|error| ApodError::FileWrite {
                path: destination.to_path_buf(),
                error,
            })?;

        info!("Copying the response body to the file");
        let mut written = 0u64;
        let body = resp.bytes_stream();
        pin_mut!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|error| download_error(url, error))?;
            file.write_all(&chunk)
                .await
                .map_err(|error| download_error(url, error))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|error| download_error(url, error))?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(())
    }
}

fn download_error<E: Into<TransferError>>(url: &Url, error: E) -> ApodError {
    ApodError::Download {
        url: url.clone(),
        error: error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_file_by_date() {
        let config = Config::builder()
            .output_dir("/home/astro/Pictures/NASA")
            .build()
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            dated_path(&config, date),
            PathBuf::from("/home/astro/Pictures/NASA/20240105.jpg")
        );
    }

    #[test]
    fn custom_layout() {
        let config = Config::builder()
            .output_dir("apod")
            .date_format("%Y-%m-%d")
            .file_extension("png")
            .build()
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(
            dated_path(&config, date),
            PathBuf::from("apod/2023-12-31.png")
        );
    }

    #[test]
    fn same_day_same_file() {
        let config = Config::builder().output_dir("/srv/apod").build().unwrap();
        let apod = Apod::builder().config(config).build().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(apod.destination(date), apod.destination(date));
        assert_eq!(apod.destination(date), PathBuf::from("/srv/apod/20240229.jpg"));
    }
}
