use std::env;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use log::{debug, info};
use url::Url;

use crate::error::ApodError;

/// Anything that can turn an image file into the desktop background.
///
/// [`Apod::run`](crate::Apod::run) calls this directly on the task that
/// drives the run, so a blocking implementation (like [`Backend`], which waits
/// for its command to exit) stalls the runtime thread until it returns.
pub trait WallpaperSetter {
    /// Set the image at the absolute path `image` as wallpaper.
    fn set_wallpaper(&self, image: &Path) -> Result<(), ApodError>;
}

impl<'a, T: WallpaperSetter + ?Sized> WallpaperSetter for &'a T {
    fn set_wallpaper(&self, image: &Path) -> Result<(), ApodError> {
        (**self).set_wallpaper(image)
    }
}

/// The host mechanisms that are supported out of the box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// macOS, scripted through the Finder.
    Finder,
    /// GNOME and derivatives, through `gsettings`.
    Gnome,
    /// Plain X11 window managers, through `feh`.
    Feh,
    /// wlroots based Wayland compositors, through `swww`.
    Swww,
    /// A custom command line; `{}` is replaced by the image path.
    Command(String),
}

impl Backend {
    /// Pick a backend for the running host.
    pub fn detect() -> Result<Self, ApodError> {
        let desktop = env::var("XDG_CURRENT_DESKTOP").ok();
        let backend = Backend::detect_from(
            env::consts::OS,
            desktop.as_deref(),
            env::var_os("WAYLAND_DISPLAY").is_some(),
            env::var_os("DISPLAY").is_some(),
        );
        match backend {
            Some(backend) => {
                debug!("Detected wallpaper backend {}", backend);
                Ok(backend)
            }
            None => Err(ApodError::WallpaperSet {
                program: "<auto>".to_string(),
                reason: format!(
                    "no wallpaper mechanism known for {} (desktop: {})",
                    env::consts::OS,
                    desktop.as_deref().unwrap_or("none")
                ),
            }),
        }
    }

    pub(crate) fn detect_from(
        os: &str,
        desktop: Option<&str>,
        wayland: bool,
        x11: bool,
    ) -> Option<Self> {
        if os == "macos" {
            return Some(Backend::Finder);
        }
        if let Some(desktop) = desktop {
            let desktop = desktop.to_lowercase();
            if desktop
                .split(':')
                .any(|d| matches!(d, "gnome" | "unity" | "budgie" | "pantheon"))
            {
                return Some(Backend::Gnome);
            }
        }
        if wayland {
            return Some(Backend::Swww);
        }
        if x11 {
            return Some(Backend::Feh);
        }
        None
    }

    /// Every command line this backend runs, in order.
    pub fn command_lines(&self, image: &Path) -> Result<Vec<Vec<String>>, ApodError> {
        let path = image.display().to_string();
        let lines = match self {
            Backend::Finder => vec![vec![
                "osascript".to_string(),
                "-e".to_string(),
                format!(
                    "tell application \"Finder\" to set desktop picture to POSIX file \"{}\"",
                    path
                ),
            ]],
            Backend::Gnome => {
                let uri = Url::from_file_path(image)
                    .map_err(|_| ApodError::WallpaperSet {
                        program: "gsettings".to_string(),
                        reason: format!("{} is not an absolute path", path),
                    })?
                    .to_string();
                ["picture-uri", "picture-uri-dark"]
                    .iter()
                    .map(|key| {
                        vec![
                            "gsettings".to_string(),
                            "set".to_string(),
                            "org.gnome.desktop.background".to_string(),
                            key.to_string(),
                            uri.clone(),
                        ]
                    })
                    .collect()
            }
            Backend::Feh => vec![vec!["feh".to_string(), "--bg-fill".to_string(), path]],
            Backend::Swww => vec![vec!["swww".to_string(), "img".to_string(), path]],
            Backend::Command(template) => vec![expand_template(template, &path)],
        };
        Ok(lines)
    }
}

impl WallpaperSetter for Backend {
    fn set_wallpaper(&self, image: &Path) -> Result<(), ApodError> {
        info!("Setting the desktop background image with {}", self);
        for argv in self.command_lines(image)? {
            run(&argv)?;
        }
        Ok(())
    }
}

impl FromStr for Backend {
    type Err = ApodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finder" | "macos" | "osascript" => Ok(Backend::Finder),
            "gnome" | "gsettings" => Ok(Backend::Gnome),
            "feh" | "x11" => Ok(Backend::Feh),
            "swww" | "wayland" => Ok(Backend::Swww),
            other => Err(ApodError::InvalidConfig(format!(
                "unknown wallpaper backend {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Finder => f.write_str("finder"),
            Backend::Gnome => f.write_str("gnome"),
            Backend::Feh => f.write_str("feh"),
            Backend::Swww => f.write_str("swww"),
            Backend::Command(template) => write!(f, "`{}`", template),
        }
    }
}

/// Split `template` on whitespace and substitute `{}` with `path`.
///
/// The path becomes the last argument if the template has no `{}`.
pub(crate) fn expand_template(template: &str, path: &str) -> Vec<String> {
    if template.trim().is_empty() {
        return Vec::new();
    }
    let mut argv: Vec<String> = template
        .split_whitespace()
        .map(|arg| arg.replace("{}", path))
        .collect();
    if !template.contains("{}") {
        argv.push(path.to_string());
    }
    argv
}

fn run(argv: &[String]) -> Result<(), ApodError> {
    let (program, args) = argv.split_first().ok_or_else(|| ApodError::WallpaperSet {
        program: String::new(),
        reason: "empty command".to_string(),
    })?;
    debug!("Running {:?}", argv);

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|error| ApodError::WallpaperSet {
            program: program.clone(),
            reason: format!("failed to spawn: {}", error),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ApodError::WallpaperSet {
            program: program.clone(),
            reason: format!("{} {}", output.status, stderr.trim()),
        });
    }
    Ok(())
}
