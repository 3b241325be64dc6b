use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use structopt::StructOpt;
use url::Url;

use apod_wallpaper::{Apod, Backend, Config, Wallpaper};

#[allow(missing_docs)]
#[derive(Debug, StructOpt)]
#[structopt(
    name = "apod-wallpaper",
    about = "Set NASA's Astronomy Picture of the Day as desktop wallpaper."
)]
#[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
struct App {
    #[structopt(long = "feed", help = "The feed to take the latest entry from.")]
    feed: Option<Url>,
    #[structopt(
        long = "output-dir",
        short = "o",
        help = "Existing directory the image is stored in.",
        parse(from_os_str)
    )]
    output_dir: Option<PathBuf>,
    #[structopt(long = "date-format", help = "strftime pattern of the file name.")]
    date_format: Option<String>,
    #[structopt(long = "extension", help = "Extension of the stored file.")]
    extension: Option<String>,
    #[structopt(long = "user-agent", help = "The user-agent used for requests.")]
    user_agent: Option<String>,
    #[structopt(long = "timeout", help = "Timeout for each request in seconds.")]
    timeout: Option<u64>,
    #[structopt(
        long = "success-only",
        help = "Whether to accept only 2XX responses or failures as well."
    )]
    http_success_only: Option<bool>,
    #[structopt(
        long = "backend",
        help = "How to set the wallpaper: auto (default), finder, gnome, feh or swww."
    )]
    backend: Option<String>,
    #[structopt(
        long = "command",
        help = "Custom wallpaper command, `{}` is replaced by the image path.",
        conflicts_with = "backend"
    )]
    command: Option<String>,
    #[structopt(long = "no-wallpaper", help = "Only download the image.")]
    no_wallpaper: bool,
    #[structopt(long = "json", help = "Print the result as json.")]
    json: bool,
}

impl App {
    async fn run(self) -> anyhow::Result<()> {
        let apod = Apod::builder()
            .config(self.as_config()?)
            .build()
            .context("Failed to set up http client")?;

        let wallpaper = if self.no_wallpaper {
            apod.download_latest().await?
        } else {
            let setter = self.setter()?;
            apod.run(&setter).await?
        };

        Self::write(&wallpaper, self.json)
    }

    fn as_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::builder();
        if let Some(feed) = &self.feed {
            config = config.feed_url(feed);
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.output_dir(output_dir);
        }
        if let Some(date_format) = &self.date_format {
            config = config.date_format(date_format);
        }
        if let Some(extension) = &self.extension {
            config = config.file_extension(extension);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.browser_user_agent(user_agent);
        }
        if let Some(timeout) = self.timeout {
            config = config.request_timeout(Duration::from_secs(timeout));
        }
        if let Some(http_success_only) = self.http_success_only {
            config = config.http_success_only(http_success_only);
        }

        Ok(config.build()?)
    }

    fn setter(&self) -> anyhow::Result<Backend> {
        if let Some(command) = &self.command {
            return Ok(Backend::Command(command.clone()));
        }
        let backend = match self.backend.as_deref() {
            None | Some("auto") => Backend::detect()?,
            Some(name) => name.parse()?,
        };
        Ok(backend)
    }

    /// Reports where the picture went.
    ///
    /// Prints the plain path, or the whole [`Wallpaper`] as json.
    fn write(wallpaper: &Wallpaper, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(wallpaper)?);
        } else {
            println!("{}", wallpaper.path.display());
        }
        Ok(())
    }
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logger();
    App::from_args().run().await
}
