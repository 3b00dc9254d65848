// ============================================================================
// États d'une ressource : chargement, vide, erreur
// ============================================================================
// Chaque section d'une page dessine son propre état, indépendamment
// des autres sections
// ============================================================================

use ratatui::{layout::Rect, Frame};

use crate::fetch::ResourceView;
use crate::ui::chart::render_no_data;

/// Dessine l'état si la donnée n'est pas prête, sinon la retourne
///
/// CONCEPT RUST : Option comme "continuation"
/// - Some(data) : l'appelant dessine le contenu
/// - None : un message a déjà été dessiné dans `area`
pub fn ready_or_placeholder<'a, T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    view: ResourceView<'a, T>,
) -> Option<&'a T> {
    let message = match view {
        ResourceView::Ready(data) => return Some(data),
        ResourceView::Idle | ResourceView::Loading => "Loading...".to_string(),
        ResourceView::Empty => "No data available".to_string(),
        ResourceView::Failed(error) => error.to_string(),
    };
    render_no_data(frame, area, title, &message);
    None
}
