// ============================================================================
// Session : état d'authentification de l'application
// ============================================================================
// Source de vérité unique pour "suis-je connecté ?"
//
// CONCEPTS RUST :
// 1. Trait objects : Box<dyn TokenStorage> pour changer de stockage
//    (fichier en production, mémoire dans les tests)
// 2. Interior mutability : Mutex pour muter via &self
//    (le store est partagé en Arc entre l'UI et le client HTTP)
// 3. Snapshots : on rend une copie de l'état, jamais une référence verrouillée
//
// PATTERN : Store injecté
// - Créé une seule fois dans main(), passé en Arc à qui en a besoin
// - Seul le store écrit dans le stockage durable
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================================
// Stockage durable du token
// ============================================================================

/// Stockage durable d'un seul token
///
/// CONCEPT RUST : Trait + Send + Sync
/// - Send + Sync : le store peut vivre derrière un Arc partagé entre threads
pub trait TokenStorage: Send + Sync {
    /// Lit le token persisté (None si absent)
    fn load(&self) -> Result<Option<String>>;

    /// Persiste le token (remplace l'ancien)
    fn save(&self, token: &str) -> Result<()>;

    /// Supprime le token persisté
    fn clear(&self) -> Result<()>;
}

/// Contenu du fichier de session
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// Stockage fichier : `<data_dir>/session.json`
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Nom du fichier de session dans le répertoire de données
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stockage dans un répertoire (le fichier s'appelle `session.json`)
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Échec de lecture de {}", self.path.display()))?;
        let file: SessionFile =
            serde_json::from_str(&raw).context("Fichier de session invalide")?;

        // Un token vide équivaut à pas de session
        Ok(Some(file.token).filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Échec de création de {}", parent.display()))?;
        }

        let raw = serde_json::to_string(&SessionFile {
            token: token.to_string(),
        })?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Échec d'écriture de {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            // Déjà absent : rien à faire
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Échec de suppression de {}", self.path.display())),
        }
    }
}

/// Stockage en mémoire (tests, option --no-persist)
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stockage pré-rempli (simule une session persistée au démarrage)
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    /// Lecture directe, utile pour vérifier l'état persisté dans les tests
    pub fn stored(&self) -> Option<String> {
        self.token.lock().map(|t| t.clone()).unwrap_or(None)
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("Stockage mémoire verrouillé"))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("Stockage mémoire verrouillé"))?;
        *slot = None;
        Ok(())
    }
}

// Permet de partager un stockage entre le store et le test qui l'inspecte
impl<S: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<()> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

// ============================================================================
// Structure : Session
// ============================================================================

/// Copie de l'état d'authentification à un instant donné
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token (None = déconnecté)
    pub token: Option<String>,

    /// Vrai tant que le stockage durable n'a pas été lu
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// État interne protégé par le Mutex
struct SessionState {
    session: Session,
    initialized: bool,
}

// ============================================================================
// Structure : SessionStore
// ============================================================================

/// Store de session : état en mémoire + stockage durable, toujours égaux
pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Crée le store en état "loading" (rien n'est lu avant initialize())
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            state: Mutex::new(SessionState {
                session: Session {
                    token: None,
                    loading: true,
                },
                initialized: false,
            }),
        }
    }

    /// Verrouille l'état
    ///
    /// CONCEPT RUST : Mutex empoisonné
    /// - Si un thread a paniqué en tenant le lock, lock() renvoie Err
    /// - L'état reste cohérent ici (affectations simples), on le récupère
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Lit le token persisté, une seule fois par durée de vie du store
    ///
    /// Un stockage illisible équivaut à "pas de session" : on démarre déconnecté
    pub fn initialize(&self) {
        let mut state = self.state();
        if state.initialized {
            debug!("Session already initialized, skipping");
            return;
        }

        let token = match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = ?e, "Failed to read persisted session, starting logged out");
                None
            }
        };

        info!(authenticated = token.is_some(), "Session initialized");
        state.session = Session {
            token,
            loading: false,
        };
        state.initialized = true;
    }

    /// Connecte l'utilisateur : stockage durable puis mémoire
    pub fn login(&self, token: &str) {
        let mut state = self.state();

        if let Err(e) = self.storage.save(token) {
            warn!(error = ?e, "Failed to persist session token");
        }

        state.session.token = Some(token.to_string());
        state.session.loading = false;
        state.initialized = true;
        info!("User logged in");
    }

    /// Déconnecte l'utilisateur : efface stockage durable et mémoire
    pub fn logout(&self) {
        let mut state = self.state();

        if let Err(e) = self.storage.clear() {
            warn!(error = ?e, "Failed to clear persisted session token");
        }

        state.session.token = None;
        info!("User logged out");
    }

    /// Copie de l'état courant
    pub fn snapshot(&self) -> Session {
        self.state().session.clone()
    }

    /// Token courant (lu au moment de l'envoi d'une requête)
    pub fn token(&self) -> Option<String> {
        self.state().session.token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state().session.loading
    }}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Stockage qui échoue toujours
    struct BrokenStorage;

    impl TokenStorage for BrokenStorage {
        fn load(&self) -> Result<Option<String>> {
            anyhow::bail!("disk unavailable")
        }
        fn save(&self, _token: &str) -> Result<()> {
            anyhow::bail!("disk unavailable")
        }
        fn clear(&self) -> Result<()> {
            anyhow::bail!("disk unavailable")
        }
    }

    #[test]
    fn test_loading_until_initialized() {
        let store = SessionStore::new(MemoryTokenStorage::with_token("persisted"));

        assert!(store.is_loading());
        assert!(!store.is_authenticated());

        store.initialize();

        assert!(!store.is_loading());
        assert_eq!(store.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_initialize_without_token() {
        let store = SessionStore::new(MemoryTokenStorage::new());
        store.initialize();

        let session = store.snapshot();
        assert!(!session.loading);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_initialize_reads_storage_once() {
        let storage = Arc::new(MemoryTokenStorage::with_token("first"));
        let store = SessionStore::new(storage.clone());

        store.initialize();
        storage.save("second").unwrap();
        store.initialize();

        assert_eq!(store.token().as_deref(), Some("first"));
    }

    #[test]
    fn test_login_then_logout_keeps_storage_in_sync() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = SessionStore::new(storage.clone());
        store.initialize();

        store.login("t");
        assert!(store.is_authenticated());
        assert_eq!(storage.stored().as_deref(), Some("t"));

        store.logout();
        assert!(!store.is_authenticated());
        assert_eq!(storage.stored(), None);
    }

    #[test]
    fn test_broken_storage_never_panics() {
        let store = SessionStore::new(BrokenStorage);

        store.initialize();
        assert!(!store.is_loading());
        assert!(!store.is_authenticated());

        // L'état mémoire change quand même
        store.login("t");
        assert!(store.is_authenticated());
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::in_dir(&dir.path().join("nested"));

        assert_eq!(storage.load().unwrap(), None);

        storage.save("abc").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));

        storage.clear().unwrap();
        assert!(!storage.path().exists());
        // Effacer deux fois n'est pas une erreur
        storage.clear().unwrap();
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::new(FileTokenStorage::in_dir(dir.path()));
        store.initialize();
        store.login("persisted-token");

        // Nouveau processus : nouveau store sur le même fichier
        let restarted = SessionStore::new(FileTokenStorage::in_dir(dir.path()));
        restarted.initialize();
        assert_eq!(restarted.token().as_deref(), Some("persisted-token"));
    }

    #[test]
    fn test_corrupted_file_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FileTokenStorage::FILE_NAME), "not json").unwrap();

        let store = SessionStore::new(FileTokenStorage::in_dir(dir.path()));
        store.initialize();

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }
}
