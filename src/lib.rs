//! Fetch NASA's Astronomy Picture of the Day and set it as desktop wallpaper.
//!
//! ```no_run
//! # async fn apod() -> Result<(), apod_wallpaper::ApodError> {
//! use apod_wallpaper::{Apod, Backend};
//!
//! let apod = Apod::builder().build()?;
//! let wallpaper = apod.run(&Backend::detect()?).await?;
//! println!("{} -> {}", wallpaper.image.name, wallpaper.path.display());
//! # Ok(())
//! # }
//! ```

pub use apod::{Apod, ApodBuilder, Wallpaper};
pub use config::{Config, ConfigBuilder, APOD_FEED_URL};
pub use error::{ApodError, FeedError, TransferError};
pub use feed::{Feed, FeedEntry};
pub use image::ImageReference;
pub use wallpaper::{Backend, WallpaperSetter};

pub mod apod;
pub mod config;
pub mod download;
mod error;
pub mod feed;
pub mod image;
pub mod wallpaper;

/// Rexported to scan custom documents.
pub use select;
