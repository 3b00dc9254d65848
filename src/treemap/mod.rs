// ============================================================================
// Treemap des secteurs du S&P 500
// ============================================================================
// Organisation :
// - hierarchy : données plates -> arbre racine/secteur/société
// - layout    : arbre -> rectangles (pur, sans dessin)
// - color     : variation -> couleur
// - ce module : règles d'étiquettes, tooltip, état monté (survol, clic, resize)
//
// Le dessin dans le terminal est fait par ui::treemap
// ============================================================================

pub mod color;
pub mod hierarchy;
pub mod layout;

pub use color::{color_for, Rgb};
pub use hierarchy::{build_hierarchy, TreemapNode};
pub use layout::{layout, Bounds, LayoutOptions, LeafRect, SectorRect, TreemapLayout};

use tracing::debug;

use crate::listeners::{ListenerHandle, ListenerKind, ListenerRegistry};
use crate::models::format::{billions_usd, signed_percent};
use crate::models::SectorCompany;
use crate::router::Route;

// ============================================================================
// Étiquettes
// ============================================================================

/// Seuils d'affichage des étiquettes d'une case
///
/// Chaque étiquette est évaluée indépendamment : une case peut afficher
/// son ticker sans afficher sa variation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPolicy {
    pub ticker_min_width: f64,
    pub ticker_min_height: f64,
    pub percent_min_width: f64,
    pub percent_min_height: f64,
}

impl LabelPolicy {
    pub fn pixels() -> Self {
        Self {
            ticker_min_width: 30.0,
            ticker_min_height: 20.0,
            percent_min_width: 40.0,
            percent_min_height: 50.0,
        }
    }

    pub fn cells() -> Self {
        Self {
            ticker_min_width: 4.0,
            ticker_min_height: 1.0,
            percent_min_width: 7.0,
            percent_min_height: 2.0,
        }
    }

    pub fn shows_ticker(&self, bounds: &Bounds) -> bool {
        bounds.width() > self.ticker_min_width && bounds.height() > self.ticker_min_height
    }

    pub fn shows_percent(&self, bounds: &Bounds) -> bool {
        bounds.width() > self.percent_min_width && bounds.height() > self.percent_min_height
    }
}

// ============================================================================
// Tooltip
// ============================================================================

/// Décalage du tooltip par rapport au pointeur (cellules)
pub const TOOLTIP_OFFSET: (f64, f64) = (2.0, 1.0);

/// Tooltip positionné (cellules de terminal, bordure comprise)
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub bounds: Bounds,
    pub lines: Vec<String>,
}

/// Lignes du tooltip d'une société
pub fn tooltip_lines(leaf: &LeafRect) -> Vec<String> {
    vec![
        leaf.ticker.clone(),
        format!("Change: {}", signed_percent(leaf.percent_change)),
        format!("Market Cap: {}", billions_usd(leaf.value)),
    ]
}

/// Positionne le tooltip au pointeur + décalage, sans sortir de `area`
pub fn tooltip(leaf: &LeafRect, pointer: (f64, f64), area: Bounds) -> Tooltip {
    let lines = tooltip_lines(leaf);
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64 + 2.0;
    let height = lines.len() as f64 + 2.0;

    let x = clamp_start(pointer.0 + TOOLTIP_OFFSET.0, width, area.x0, area.x1);
    let y = clamp_start(pointer.1 + TOOLTIP_OFFSET.1, height, area.y0, area.y1);

    Tooltip {
        bounds: Bounds::new(x, y, (x + width).min(area.x1), (y + height).min(area.y1)),
        lines,
    }
}

/// Ramène [start, start+size] dans [lo, hi] (priorité au bord bas/gauche)
fn clamp_start(start: f64, size: f64, lo: f64, hi: f64) -> f64 {
    start.min(hi - size).max(lo)
}

// ============================================================================
// Structure : SectorTreemap (état d'une treemap montée)
// ============================================================================

/// Treemap montée : données, layout en cache, survol
///
/// Les coordonnées reçues (souris) sont absolues ; `origin` est le coin
/// haut-gauche de la zone de dessin à la dernière frame
#[derive(Debug)]
pub struct SectorTreemap {
    root: Option<TreemapNode>,
    options: LayoutOptions,
    cached: Option<TreemapLayout>,
    origin: (u16, u16),
    hover: Option<(u16, u16)>,
    listener: Option<ListenerHandle>,
}

impl SectorTreemap {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            root: None,
            options,
            cached: None,
            origin: (0, 0),
            hover: None,
            listener: None,
        }
    }

    /// Abonnement au redimensionnement (un seul par montage)
    pub fn mount(&mut self, registry: &ListenerRegistry) {
        if self.listener.is_none() {
            self.listener = Some(registry.attach(ListenerKind::Resize, "treemap"));
        }
    }

    pub fn unmount(&mut self) {
        self.listener = None;
        self.hover = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Nouvelles données : le layout sera recalculé au prochain rendu
    pub fn set_data(&mut self, companies: &[SectorCompany]) {
        let root = build_hierarchy(companies);
        debug!(sectors = root.children.len(), total = root.value, "Treemap data set");
        self.root = Some(root);
        self.cached = None;
    }

    /// Redimensionnement : invalide le cache
    pub fn resized(&mut self) {
        self.cached = None;
    }

    /// Layout pour une zone donnée (recalculé si la taille ou les données ont changé)
    pub fn layout_for(&mut self, x: u16, y: u16, width: u16, height: u16) -> Option<&TreemapLayout> {
        self.origin = (x, y);
        let root = self.root.as_ref()?;

        let (w, h) = (width as f64, height as f64);
        let stale = match &self.cached {
            Some(cached) => cached.width != w || cached.height != h,
            None => true,
        };
        if stale {
            self.cached = Some(layout(root, w, h, &self.options));
        }
        self.cached.as_ref()
    }

    /// Position absolue -> locale, si dans la zone de la dernière frame
    fn to_local(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let cached = self.cached.as_ref()?;
        let x = column.checked_sub(self.origin.0)? as f64;
        let y = row.checked_sub(self.origin.1)? as f64;
        if x < cached.width && y < cached.height {
            Some((x, y))
        } else {
            None
        }
    }

    /// Case sous la position absolue (column, row)
    pub fn leaf_at(&self, column: u16, row: u16) -> Option<&LeafRect> {
        let (x, y) = self.to_local(column, row)?;
        self.cached.as_ref()?.hit_test(x, y)
    }

    pub fn hover(&mut self, column: u16, row: u16) {
        self.hover = self.to_local(column, row).map(|_| (column, row));
    }

    /// Tooltip de la case survolée, en coordonnées locales
    pub fn hovered_tooltip(&self) -> Option<Tooltip> {
        let (column, row) = self.hover?;
        let (x, y) = self.to_local(column, row)?;
        let cached = self.cached.as_ref()?;
        let leaf = cached.hit_test(x, y)?;
        Some(tooltip(leaf, (x, y), Bounds::new(0.0, 0.0, cached.width, cached.height)))
    }

    /// Clic : page de la société sous le pointeur
    pub fn click(&self, column: u16, row: u16) -> Option<Route> {
        self.leaf_at(column, row).map(|leaf| Route::stock(&leaf.ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(ticker: &str, value: f64, pct: f64, bounds: Bounds) -> LeafRect {
        LeafRect {
            ticker: ticker.to_string(),
            sector: "Tech".to_string(),
            value,
            percent_change: pct,
            bounds,
        }
    }

    #[test]
    fn test_tooltip_text() {
        let a = leaf("A", 1e8, 5.0, Bounds::default());
        assert_eq!(tooltip_lines(&a), ["A", "Change: +5.00%", "Market Cap: 0.10B USD"]);
    }

    #[test]
    fn test_tooltip_clamped_inside_area() {
        let a = leaf("A", 1e8, 5.0, Bounds::default());
        let area = Bounds::new(0.0, 0.0, 40.0, 10.0);

        let near_corner = tooltip(&a, (39.0, 9.0), area);
        assert!(near_corner.bounds.x1 <= 40.0 && near_corner.bounds.y1 <= 10.0);
        assert!(near_corner.bounds.x0 >= 0.0 && near_corner.bounds.y0 >= 0.0);

        let free = tooltip(&a, (1.0, 1.0), area);
        assert_eq!((free.bounds.x0, free.bounds.y0), (3.0, 2.0));
    }

    #[test]
    fn test_labels_independent() {
        let policy = LabelPolicy::pixels();
        let wide_short = Bounds::new(0.0, 0.0, 100.0, 30.0);
        assert!(policy.shows_ticker(&wide_short));
        assert!(!policy.shows_percent(&wide_short));

        let big = Bounds::new(0.0, 0.0, 100.0, 60.0);
        assert!(policy.shows_percent(&big));

        // Seuils stricts
        assert!(!policy.shows_ticker(&Bounds::new(0.0, 0.0, 30.0, 30.0)));
    }

    #[test]
    fn test_click_and_hover() {
        let mut map = SectorTreemap::new(LayoutOptions::exact());
        map.set_data(&[
            SectorCompany::new("A", "Tech", 100.0, 5.0),
            SectorCompany::new("B", "Tech", 300.0, -2.0),
        ]);
        let layout = map.layout_for(10, 5, 40, 20).cloned().unwrap();
        let b = layout.leaves.iter().find(|l| l.ticker == "B").unwrap().bounds;
        let column = 10 + ((b.x0 + b.x1) / 2.0) as u16;
        let row = 5 + ((b.y0 + b.y1) / 2.0) as u16;

        assert_eq!(map.click(column, row), Some(Route::stock("B")));
        assert_eq!(map.click(0, 0), None);

        map.hover(column, row);
        let tip = map.hovered_tooltip().unwrap();
        assert_eq!(tip.lines[0], "B");
    }

    #[test]
    fn test_relayout_on_resize_only() {
        let mut map = SectorTreemap::new(LayoutOptions::cells());
        assert!(map.layout_for(0, 0, 10, 10).is_none());

        map.set_data(&[SectorCompany::new("A", "Tech", 1.0, 0.0)]);
        let first = map.layout_for(0, 0, 30, 10).cloned();
        let again = map.layout_for(0, 0, 30, 10).cloned();
        assert_eq!(first, again);

        let resized = map.layout_for(0, 0, 50, 10).cloned().unwrap();
        assert_eq!(resized.width, 50.0);
    }

    #[test]
    fn test_resize_listener_per_mount() {
        let registry = ListenerRegistry::new();
        let mut map = SectorTreemap::new(LayoutOptions::cells());

        map.mount(&registry);
        map.mount(&registry);
        assert_eq!(registry.count(ListenerKind::Resize), 1);

        map.unmount();
        assert_eq!(registry.count(ListenerKind::Resize), 0);
    }
}
