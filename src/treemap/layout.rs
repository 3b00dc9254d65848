// ============================================================================
// Layout squarifié
// ============================================================================
// Découpage récursif d'un rectangle en cases dont l'aire est proportionnelle
// à la valeur de chaque nœud, en visant des cases proches du nombre d'or
// (rapport largeur/hauteur ~ 1.618).
//
// Algorithme (par nœud interne) :
// 1. Réduire la zone du padding externe (moins la moitié du padding interne)
// 2. Former des rangées : ajouter des enfants tant que le pire ratio de la
//    rangée s'améliore
// 3. Rangée horizontale si la zone restante est plus haute que large,
//    verticale sinon
// 4. Chaque enfant se réduit de la moitié du padding interne
//
// CONCEPT RUST : Fonction pure
// - Aucune I/O, aucun état : mêmes entrées -> même layout (testable)
// ============================================================================

use super::hierarchy::TreemapNode;

/// Ratio cible des cases
const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Rectangle en coordonnées flottantes (x0, y0) -> (x1, y1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Bord gauche/haut inclus, droit/bas exclu
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Réduit de `p` sur chaque côté ; un axe trop petit s'écrase sur son milieu
    fn shrink(&self, p: f64) -> Bounds {
        let (mut x0, mut x1) = (self.x0 + p, self.x1 - p);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        let (mut y0, mut y1) = (self.y0 + p, self.y1 - p);
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        Bounds { x0, y0, x1, y1 }
    }

    fn rounded(&self) -> Bounds {
        Bounds {
            x0: self.x0.round(),
            y0: self.y0.round(),
            x1: self.x1.round(),
            y1: self.y1.round(),
        }
    }
}

/// Paramètres du layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Marge intérieure de chaque nœud interne (autour de ses enfants)
    pub padding_outer: f64,
    /// Espace entre deux cases voisines
    pub padding_inner: f64,
    /// Arrondit les coordonnées finales à l'entier
    pub round: bool,
}

impl LayoutOptions {
    /// Surface en pixels
    pub fn pixels() -> Self {
        Self {
            padding_outer: 8.0,
            padding_inner: 1.0,
            round: true,
        }
    }

    /// Surface en cellules de terminal
    pub fn cells() -> Self {
        Self {
            padding_outer: 1.0,
            padding_inner: 0.0,
            round: true,
        }
    }

    /// Sans padding ni arrondi : aires exactement proportionnelles
    pub fn exact() -> Self {
        Self {
            padding_outer: 0.0,
            padding_inner: 0.0,
            round: false,
        }
    }
}

/// Rectangle d'un secteur
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRect {
    pub name: String,
    pub value: f64,
    pub bounds: Bounds,
}

/// Rectangle d'une société
#[derive(Debug, Clone, PartialEq)]
pub struct LeafRect {
    pub ticker: String,
    pub sector: String,
    pub value: f64,
    pub percent_change: f64,
    pub bounds: Bounds,
}

/// Résultat du layout : secteurs puis feuilles, dans l'ordre de l'arbre
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreemapLayout {
    pub width: f64,
    pub height: f64,
    pub sectors: Vec<SectorRect>,
    pub leaves: Vec<LeafRect>,
}

impl TreemapLayout {
    /// Première feuille contenant le point (x, y)
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&LeafRect> {
        self.leaves.iter().find(|leaf| leaf.bounds.contains(x, y))
    }
}

/// Positionne tout l'arbre dans un rectangle `width` x `height`
pub fn layout(root: &TreemapNode, width: f64, height: f64, options: &LayoutOptions) -> TreemapLayout {
    let mut out = TreemapLayout {
        width,
        height,
        ..TreemapLayout::default()
    };

    let area = Bounds::new(0.0, 0.0, width.max(0.0), height.max(0.0));
    place(root, area, 0.0, 0, None, options, &mut out);
    out
}

/// Positionne un nœud puis ses enfants (parcours en pré-ordre)
///
/// - `padding` : réduction propre au nœud (moitié du padding interne du parent)
/// - `sector` : nom du secteur parent pour les feuilles
fn place(
    node: &TreemapNode,
    area: Bounds,
    padding: f64,
    depth: usize,
    sector: Option<&str>,
    options: &LayoutOptions,
    out: &mut TreemapLayout,
) {
    let own = area.shrink(padding);
    let final_bounds = if options.round { own.rounded() } else { own };

    if node.is_leaf() {
        if depth > 0 {
            out.leaves.push(LeafRect {
                ticker: node.id.clone(),
                sector: sector.unwrap_or_default().to_string(),
                value: node.value,
                percent_change: node.percent_change.unwrap_or(0.0),
                bounds: final_bounds,
            });
        }
        return;
    }

    if depth == 1 {
        out.sectors.push(SectorRect {
            name: node.id.clone(),
            value: node.value,
            bounds: final_bounds,
        });
    }

    let half_inner = options.padding_inner / 2.0;
    let inner = own.shrink(options.padding_outer - half_inner);
    let values: Vec<f64> = node.children.iter().map(|c| c.value).collect();
    let cells = squarify(&values, inner);

    let child_sector = if depth == 1 { Some(node.id.as_str()) } else { sector };
    for (child, cell) in node.children.iter().zip(cells) {
        place(child, cell, half_inner, depth + 1, child_sector, options, out);
    }
}

/// Découpe `area` en une case par valeur, dans l'ordre des valeurs
///
/// Zone dégénérée (largeur ou hauteur nulle) ou somme nulle :
/// chaque case est réduite à un point/segment au coin de la zone
pub fn squarify(values: &[f64], area: Bounds) -> Vec<Bounds> {
    let n = values.len();
    let mut cells = vec![Bounds::new(area.x0, area.y0, area.x0, area.y0); n];

    let total: f64 = values.iter().sum();
    if n == 0 || total <= 0.0 || area.width() <= 0.0 || area.height() <= 0.0 {
        return cells;
    }

    let (mut x0, mut y0, x1, y1) = (area.x0, area.y0, area.x1, area.y1);
    let mut remaining = total;
    let mut i0 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Premier nœud non vide de la rangée
        let mut i1 = i0;
        let mut sum = values[i1];
        i1 += 1;
        while sum == 0.0 && i1 < n {
            sum = values[i1];
            i1 += 1;
        }

        let mut min_value = sum;
        let mut max_value = sum;
        let alpha = if dx > 0.0 && dy > 0.0 && remaining > 0.0 {
            (dy / dx).max(dx / dy) / (remaining * GOLDEN_RATIO)
        } else {
            f64::INFINITY
        };
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // Ajouter des nœuds tant que le ratio se maintient ou s'améliore
        while i1 < n {
            let value = values[i1];
            let candidate_sum = sum + value;
            let candidate_min = min_value.min(value);
            let candidate_max = max_value.max(value);
            beta = candidate_sum * candidate_sum * alpha;
            let ratio = (candidate_max / beta).max(beta / candidate_min);
            if ratio > min_ratio {
                break;
            }
            sum = candidate_sum;
            min_value = candidate_min;
            max_value = candidate_max;
            min_ratio = ratio;
            i1 += 1;
        }

        let row = i0..i1;
        if dx < dy {
            // Rangée horizontale en haut de la zone restante
            let row_y1 = if remaining > 0.0 { y0 + dy * sum / remaining } else { y1 };
            dice(values, &mut cells, row, sum, Bounds::new(x0, y0, x1, row_y1));
            y0 = row_y1;
        } else {
            // Colonne verticale à gauche de la zone restante
            let row_x1 = if remaining > 0.0 { x0 + dx * sum / remaining } else { x1 };
            slice(values, &mut cells, row, sum, Bounds::new(x0, y0, row_x1, y1));
            x0 = row_x1;
        }

        remaining -= sum;
        i0 = i1;
    }

    cells
}

/// Répartit une rangée le long de l'axe x
fn dice(values: &[f64], cells: &mut [Bounds], row: std::ops::Range<usize>, sum: f64, area: Bounds) {
    let k = if sum > 0.0 { area.width() / sum } else { 0.0 };
    let mut x = area.x0;
    for i in row {
        let next = x + values[i] * k;
        cells[i] = Bounds::new(x, area.y0, next, area.y1);
        x = next;
    }
}

/// Répartit une colonne le long de l'axe y
fn slice(values: &[f64], cells: &mut [Bounds], row: std::ops::Range<usize>, sum: f64, area: Bounds) {
    let k = if sum > 0.0 { area.height() / sum } else { 0.0 };
    let mut y = area.y0;
    for i in row {
        let next = y + values[i] * k;
        cells[i] = Bounds::new(area.x0, y, area.x1, next);
        y = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectorCompany;
    use crate::treemap::build_hierarchy;

    fn tech_pair() -> TreemapNode {
        build_hierarchy(&[
            SectorCompany::new("A", "Tech", 100.0, 5.0),
            SectorCompany::new("B", "Tech", 300.0, -2.0),
        ])
    }

    fn sample() -> TreemapNode {
        build_hierarchy(&[
            SectorCompany::new("AAPL", "Tech", 3000.0, 1.2),
            SectorCompany::new("MSFT", "Tech", 2800.0, -0.4),
            SectorCompany::new("XOM", "Energy", 400.0, 2.0),
            SectorCompany::new("CVX", "Energy", 300.0, -3.1),
            SectorCompany::new("JPM", "Financials", 500.0, 0.0),
            SectorCompany::new("BAC", "Financials", 250.0, 0.7),
            SectorCompany::new("NVDA", "Tech", 2500.0, 4.4),
        ])
    }

    #[test]
    fn test_areas_proportional_without_padding() {
        let result = layout(&tech_pair(), 200.0, 100.0, &LayoutOptions::exact());
        let total = 200.0 * 100.0;

        assert_eq!(result.sectors.len(), 1);
        assert!((result.sectors[0].bounds.area() - total).abs() < 1e-9);

        let a = result.leaves.iter().find(|l| l.ticker == "A").unwrap();
        let b = result.leaves.iter().find(|l| l.ticker == "B").unwrap();
        assert!((a.bounds.area() / total - 0.25).abs() < 1e-9);
        assert!((b.bounds.area() / total - 0.75).abs() < 1e-9);
        assert_eq!(a.sector, "Tech");
    }

    #[test]
    fn test_leaves_cover_area_exactly() {
        let result = layout(&sample(), 640.0, 360.0, &LayoutOptions::exact());
        let covered: f64 = result.leaves.iter().map(|l| l.bounds.area()).sum();
        assert!((covered - 640.0 * 360.0).abs() < 1e-6);

        // Chaque aire est proportionnelle à la capitalisation
        let total_value: f64 = result.leaves.iter().map(|l| l.value).sum();
        for leaf in &result.leaves {
            let expected = leaf.value / total_value * 640.0 * 360.0;
            assert!((leaf.bounds.area() - expected).abs() < 1e-6, "{}", leaf.ticker);
        }
    }

    #[test]
    fn test_leaves_inside_their_sector() {
        let result = layout(&sample(), 800.0, 500.0, &LayoutOptions::pixels());
        for leaf in &result.leaves {
            let sector = result.sectors.iter().find(|s| s.name == leaf.sector).unwrap();
            assert!(leaf.bounds.x0 >= sector.bounds.x0 && leaf.bounds.x1 <= sector.bounds.x1);
            assert!(leaf.bounds.y0 >= sector.bounds.y0 && leaf.bounds.y1 <= sector.bounds.y1);
        }
    }

    #[test]
    fn test_padding_leaves_outer_margin() {
        let result = layout(&sample(), 800.0, 500.0, &LayoutOptions::pixels());
        for sector in &result.sectors {
            // 8 - 0.5 (racine) + 0.5 (secteur) = 8 pixels du bord
            assert!(sector.bounds.x0 >= 8.0 && sector.bounds.y0 >= 8.0);
            assert!(sector.bounds.x1 <= 792.0 && sector.bounds.y1 <= 492.0);
        }
    }

    #[test]
    fn test_rounding_gives_integers() {
        let result = layout(&sample(), 97.0, 31.0, &LayoutOptions::cells());
        for leaf in &result.leaves {
            let b = leaf.bounds;
            for v in [b.x0, b.y0, b.x1, b.y1] {
                assert_eq!(v.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_same_input_same_layout() {
        let root = sample();
        let first = layout(&root, 120.0, 40.0, &LayoutOptions::cells());
        let second = layout(&root, 120.0, 40.0, &LayoutOptions::cells());
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_preserved() {
        let result = layout(&sample(), 300.0, 300.0, &LayoutOptions::exact());
        let tickers: Vec<&str> = result.leaves.iter().map(|l| l.ticker.as_str()).collect();
        assert_eq!(tickers, ["AAPL", "MSFT", "NVDA", "XOM", "CVX", "JPM", "BAC"]);
    }

    #[test]
    fn test_degenerate_area() {
        let result = layout(&sample(), 0.0, 40.0, &LayoutOptions::cells());
        assert_eq!(result.leaves.len(), 7);
        assert!(result.leaves.iter().all(|l| l.bounds.area() == 0.0));
    }

    #[test]
    fn test_hit_test() {
        let result = layout(&tech_pair(), 200.0, 100.0, &LayoutOptions::exact());
        let b = result.leaves.iter().find(|l| l.ticker == "B").unwrap().bounds;
        let (cx, cy) = ((b.x0 + b.x1) / 2.0, (b.y0 + b.y1) / 2.0);

        assert_eq!(result.hit_test(cx, cy).map(|l| l.ticker.as_str()), Some("B"));
        assert!(result.hit_test(-1.0, 5.0).is_none());
    }
}
