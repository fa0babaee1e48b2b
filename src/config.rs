//! Application-level configuration loading, including the character image table.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_CATALOG_CONFIG_PATH";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_PUBLIC_DIR: &str = "public";
/// Largest accepted request body for item submissions (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Image returned for characters missing from the table.
pub const DEFAULT_CHARACTER_IMAGE: &str = "default.jpg";

/// Character image file names keyed by game title, then character name.
pub type CharacterImageTable = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    uploads_dir: PathBuf,
    public_dir: PathBuf,
    max_upload_bytes: usize,
    character_images: CharacterImageTable,
    default_character_image: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        games = app_config.character_images.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Replace the directory uploaded images are written to and served from.
    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = dir.into();
        self
    }

    /// Replace the request body limit for item submissions.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Replace the directory the browser client is served from.
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    /// Directory uploaded images are written to and served from.
    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    /// Directory holding the browser client.
    pub fn public_dir(&self) -> &PathBuf {
        &self.public_dir
    }

    /// Largest accepted body for item submissions.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Image configured for `character` in `title`, if any.
    pub fn character_image(&self, title: &str, character: &str) -> Option<&str> {
        self.character_images
            .get(title)
            .and_then(|characters| characters.get(character))
            .map(String::as_str)
    }

    /// Image returned when [`AppConfig::character_image`] finds nothing.
    pub fn default_character_image(&self) -> &str {
        &self.default_character_image
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            character_images: default_character_images(),
            default_character_image: DEFAULT_CHARACTER_IMAGE.to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every key is optional; missing keys keep their built-in default.
struct RawConfig {
    uploads_dir: Option<PathBuf>,
    public_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
    character_images: Option<CharacterImageTable>,
    default_character_image: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            uploads_dir: value.uploads_dir.unwrap_or(defaults.uploads_dir),
            public_dir: value.public_dir.unwrap_or(defaults.public_dir),
            max_upload_bytes: value.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            character_images: value.character_images.unwrap_or(defaults.character_images),
            default_character_image: value
                .default_character_image
                .unwrap_or(defaults.default_character_image),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in character images shipped with the binary.
fn default_character_images() -> CharacterImageTable {
    let table: &[(&str, &[(&str, &str)])] = &[
        (
            "Red Dead Redemption 2",
            &[
                ("Arthur Morgan", "arthur-morgan.jpg"),
                ("John Marston", "john-marston.jpg"),
            ],
        ),
        (
            "The Last of Us",
            &[
                ("Joel Miller", "joel-miller.jpg"),
                ("Ellie Williams", "ellie-image.jpg"),
            ],
        ),
        (
            "World of Warcraft",
            &[
                ("Arthas Menethil", "arthus-image.jpg"),
                ("Sylvanas Windrunner", "sylvanus-image.jpg"),
            ],
        ),
        (
            "Assassin's Creed Valhalla",
            &[("Eivor", "eivor.jpg"), ("Sigurd", "sigurd.jpg")],
        ),
        (
            "God of War",
            &[("Kratos", "kratos.jpg"), ("Atreus", "atreus.jpg")],
        ),
        (
            "The Witcher 3: Wild Hunt",
            &[("Geralt of Rivia", "geralt-rivia.jpg"), ("Ciri", "ciri.jpg")],
        ),
    ];

    table
        .iter()
        .map(|(title, characters)| {
            let characters = characters
                .iter()
                .map(|(name, image)| ((*name).to_owned(), (*image).to_owned()))
                .collect();
            ((*title).to_owned(), characters)
        })
        .collect()
}
