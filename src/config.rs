// ============================================================================
// Configuration : arguments CLI + variables d'environnement
// ============================================================================
// CONCEPT RUST : clap derive
// - #[derive(Parser)] génère le parsing de la ligne de commande
// - #[arg(env = "...")] : une variable d'environnement sert de valeur
//   par défaut si l'option n'est pas passée
//
// Priorité : argument CLI > variable d'environnement > valeur par défaut
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Nom de l'application (répertoires de données, fichier de log)
pub const APP_NAME: &str = "lazyfolio";

/// Terminal dashboard for a stock-market / simulated-brokerage backend
#[derive(Debug, Clone, Parser)]
#[command(name = "lazyfolio", version)]
pub struct Config {
    /// Base URL of the backend API
    #[arg(long, env = "LAZYFOLIO_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Directory holding the session file
    #[arg(long, env = "LAZYFOLIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for the rolling log file (default: <data-dir>/logs)
    #[arg(long, env = "LAZYFOLIO_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Keep the session in memory only (nothing written to disk)
    #[arg(long)]
    pub no_persist: bool,
}

impl Config {
    /// Répertoire de données résolu
    ///
    /// - Linux/WSL : ~/.local/share/lazyfolio
    /// - macOS : ~/Library/Application Support/lazyfolio
    /// - Windows : C:\Users\<user>\AppData\Roaming\lazyfolio
    /// - Sans répertoire système connu : ./lazyfolio
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("logs"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
