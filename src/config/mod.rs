use crate::errors::{AppError, AppResult};
use crate::storage::new_signing_secret;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub storage_dir: String,
    #[serde(default = "default_documents_bucket")]
    pub documents_bucket: String,
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: i64,
    /// Empty means the blob store keeps its own generated key.
    #[serde(default)]
    pub signing_secret: String,
    #[serde(default = "default_report_title")]
    pub report_title: String,
    #[serde(default = "default_currency_fields")]
    pub currency_fields: Vec<String>,
}

fn default_documents_bucket() -> String {
    "documents".to_string()
}
fn default_signed_url_ttl() -> i64 {
    3600
}
fn default_report_title() -> String {
    "Clients report".to_string()
}
fn default_currency_fields() -> Vec<String> {
    vec!["revenue".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            storage_dir: String::new(),
            documents_bucket: default_documents_bucket(),
            signed_url_ttl_secs: default_signed_url_ttl(),
            signing_secret: String::new(),
            report_title: default_report_title(),
            currency_fields: default_currency_fields(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rcrm")
        } else {
            let home = dirs::home_dir()
                .map(|h| h.to_string_lossy().to_string())
                .or_else(|| env::var("HOME").ok())
                .unwrap_or_else(|| ".".to_string());
            PathBuf::from(home).join(".rcrm")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rcrm.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rcrm.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Point the configuration at another database; blobs follow it unless
    /// an explicit storage directory was configured.
    pub fn with_database(mut self, db: &str) -> Self {
        self.database = db.to_string();
        self.storage_dir = String::new();
        self
    }

    /// Effective blob root: configured value, or `storage/` next to the database.
    pub fn storage_root(&self) -> PathBuf {
        if !self.storage_dir.trim().is_empty() {
            return PathBuf::from(&self.storage_dir);
        }

        let db = Path::new(&self.database);
        let stem = db
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "rcrm".to_string());

        db.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{stem}_storage"))
    }

    /// Initialize configuration file and database directory.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let mut config = Config::default().with_database(&db_path.to_string_lossy());
        config.signing_secret = new_signing_secret();

        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(format!("cannot serialize config: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
