// ============================================================================
// Registre des listeners (pointeur, resize)
// ============================================================================
// Un widget monté s'abonne aux événements globaux dont il a besoin :
// - la barre de recherche écoute les clics (fermer le panneau si clic dehors)
// - la treemap écoute les resize (recalcul du layout)
//
// CONCEPT RUST : RAII (Resource Acquisition Is Initialization)
// - attach() retourne un ListenerHandle
// - Quand le handle est droppé (widget démonté), le listener est retiré
// - Impossible d'oublier le désabonnement : pas de fuite entre navigations
// ============================================================================

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::trace;

/// Type d'événement écouté
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerDown,
    Resize,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: Vec<(u64, ListenerKind, &'static str)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registre partagé (cloner le registre partage le même état)
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abonne `owner` à `kind` ; le listener vit aussi longtemps que le handle
    pub fn attach(&self, kind: ListenerKind, owner: &'static str) -> ListenerHandle {
        let mut registry = lock(&self.inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.active.push((id, kind, owner));
        trace!(id, ?kind, owner, "Listener attached");

        ListenerHandle {
            id,
            kind,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Nombre de listeners actifs pour `kind`
    pub fn count(&self, kind: ListenerKind) -> usize {
        lock(&self.inner)
            .active
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

/// Abonnement actif ; le drop le retire du registre
#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    kind: ListenerKind,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        // Registre déjà détruit (fin de programme) : rien à retirer
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = lock(&registry);
            registry.active.retain(|(id, _, _)| *id != self.id);
            trace!(id = self.id, kind = ?self.kind, "Listener detached");
        }
    }
}
