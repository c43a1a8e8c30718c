use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the collection lives on the catalog service and how politely to ask for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Pause between collection pages. Discogs allows 60 requests/minute.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// User-configurable paths for the catalog cache and downloaded covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default = "default_covers_dir")]
    pub covers_dir: PathBuf,
    /// Public path the covers are served under; stored in each item's `localCover`.
    #[serde(default = "default_covers_url_prefix")]
    pub covers_url_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Edge length of the square block sampled at each corner.
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,
    /// Per-channel tolerance; corners differing by more than `tolerance * 3`
    /// in summed channel distance are considered different.
    #[serde(default = "default_tolerance")]
    pub tolerance: u32,
}

/// Tunables for the record stack scene.
///
/// Units are scene units: one stack slot is `spacing` tall, the sleeve is
/// roughly two units square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub spacing: f32,
    pub min_offset: f32,
    pub wheel_sensitivity: f32,
    pub drag_sensitivity: f32,
    /// Resting tilt of sleeves in the stack (radians about x).
    pub lean_angle: f32,
    pub lerp_rate: f32,
    pub arrive_epsilon: f32,
    pub hover_lift: f32,
    pub lift_z: f32,
    pub center_z: f32,
    pub center_scale: f32,
    pub slide_out: f32,
    pub wave_amplitude: f32,
    pub wave_scale: f32,
    pub wave_sigma: f32,
    pub view_distance: f32,
    /// Velocity multiplier applied every tick after a drag is released.
    pub friction: f32,
    pub stop_velocity: f32,
    /// Fastest fling a released drag may carry, in scene units per second.
    pub max_velocity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spacing: 0.12,
            min_offset: 0.0,
            wheel_sensitivity: 0.01,
            drag_sensitivity: 0.12,
            lean_angle: 0.35,
            lerp_rate: 6.0,
            arrive_epsilon: 0.01,
            hover_lift: 0.3,
            lift_z: 1.5,
            center_z: 2.5,
            center_scale: 1.0,
            slide_out: 1.2,
            wave_amplitude: 0.25,
            wave_scale: 0.15,
            wave_sigma: 0.36,
            view_distance: 4.0,
            friction: 0.95,
            stop_velocity: 0.01,
            max_velocity: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Terminals narrower than this run the compact (mobile) sequence.
    #[serde(default = "default_compact_width")]
    pub compact_width: u16,
    /// Pixel-equivalent delta of one mouse wheel notch.
    #[serde(default = "default_wheel_notch")]
    pub wheel_notch: f32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            api_base: default_api_base(),
            per_page: default_per_page(),
            page_delay_ms: default_page_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
            covers_dir: default_covers_dir(),
            covers_url_prefix: default_covers_url_prefix(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            compact_width: default_compact_width(),
            wheel_notch: default_wheel_notch(),
        }
    }
}

fn default_username() -> String {
    "oggadog".to_string()
}

fn default_api_base() -> String {
    "https://api.discogs.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    concat!("records/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_cache_file() -> PathBuf {
    platform::data_dir().join("discogs-cache.json")
}

fn default_covers_dir() -> PathBuf {
    platform::data_dir().join("covers")
}

fn default_covers_url_prefix() -> String {
    "/records/covers".to_string()
}

fn default_sample_size() -> u32 {
    5
}

fn default_tolerance() -> u32 {
    20
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

fn default_fps() -> u32 {
    30
}

fn default_compact_width() -> u16 {
    80
}

fn default_wheel_notch() -> f32 {
    36.0
}

impl Config {
    /// Load the config from the platform config dir, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
