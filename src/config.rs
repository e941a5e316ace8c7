use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Moteur de stockage des tickets et des notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Base SQLite, via sea-orm
    Database { url: String },
    /// Un fichier JSON par table dans `directory`
    Files { directory: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Database {
            url: "sqlite://deskio.db?mode=rwc".to_string(),
        }
    }
}

/// Sources à importer au démarrage, avant d'accepter des requêtes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Dossier contenant les anciens `tickets.csv` et `ratings.csv`
    pub legacy_csv: Option<PathBuf>,
    /// Dossier d'un stockage fichiers JSON à recopier
    pub from_files: Option<PathBuf>,
}

/// Configuration de l'application
///
/// Le fichier est lu en JSON, ou en YAML si son extension est `.yaml`/`.yml`.
/// Tous les champs sont optionnels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub store: StoreConfig,
    pub log_level: String,
    /// Nombre d'échantillons de la moyenne mobile du dashboard
    pub trend_window: usize,
    pub migration: MigrationConfig,
    #[serde(skip)]
    filepath: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            store: StoreConfig::default(),
            log_level: "info".to_string(),
            trend_window: deskio_core::dashboard::TREND_WINDOW,
            migration: MigrationConfig::default(),
            filepath: None,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

impl Config {
    pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, String> {
        let filepath = filepath.as_ref();
        let str_config = match std::fs::read_to_string(filepath) {
            Ok(v) => v,
            Err(e) => return Err(format!("Unable to read file {}: {}", filepath.to_string_lossy(), e)),
        };
        let parsed = if is_yaml(filepath) {
            serde_yaml::from_str::<Config>(&str_config).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Config>(&str_config).map_err(|e| e.to_string())
        };
        let mut config = match parsed {
            Ok(v) => v,
            Err(e) => return Err(format!("Unable to parse {}: {}", filepath.to_string_lossy(), e)),
        };
        config.filepath = Some(filepath.to_path_buf());
        Ok(config)
    }
    /// Charge `filepath` s'il existe, sinon la configuration par défaut.
    pub fn load_or_default<P: AsRef<Path>>(filepath: P) -> Result<Self, String> {
        if filepath.as_ref().exists() {
            Self::load(filepath)
        } else {
            Ok(Self::default())
        }
    }
    /// Fichier d'où provient la configuration, `None` pour les valeurs par défaut.
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
