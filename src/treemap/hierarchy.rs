// ============================================================================
// Hiérarchie racine -> secteur -> société
// ============================================================================

use crate::models::SectorCompany;

/// Identifiant du nœud racine
pub const ROOT_ID: &str = "Root";

/// Nœud de l'arbre de la treemap
///
/// - Feuille : une société (value = capitalisation, percent_change présent)
/// - Nœud interne : value = somme des enfants, percent_change absent
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapNode {
    pub id: String,
    pub value: f64,
    pub percent_change: Option<f64>,
    pub children: Vec<TreemapNode>,
}

impl TreemapNode {
    pub fn leaf(id: &str, value: f64, percent_change: f64) -> Self {
        Self {
            id: id.to_string(),
            // Une capitalisation absente ou négative ne prend pas de place
            value: if value.is_finite() { value.max(0.0) } else { 0.0 },
            percent_change: Some(percent_change),
            children: Vec::new(),
        }
    }

    /// Nœud interne : sa valeur est la somme de ses enfants
    pub fn branch(id: &str, children: Vec<TreemapNode>) -> Self {
        let value = children.iter().map(|c| c.value).sum();
        Self {
            id: id.to_string(),
            value,
            percent_change: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Toutes les feuilles, parcours en profondeur
    pub fn leaves(&self) -> Vec<&TreemapNode> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children.iter().flat_map(|c| c.leaves()).collect()
    }
}

/// Groupe les sociétés par secteur (ordre de première apparition)
///
/// CONCEPT RUST : Vec<(String, Vec<_>)> plutôt que HashMap
/// - Une HashMap perdrait l'ordre d'apparition des secteurs
/// - Le nombre de secteurs est petit (11 pour le S&P 500) : recherche linéaire OK
pub fn build_hierarchy(companies: &[SectorCompany]) -> TreemapNode {
    let mut sectors: Vec<(String, Vec<TreemapNode>)> = Vec::new();

    for company in companies {
        let leaf = TreemapNode::leaf(&company.ticker, company.market_cap, company.change_percent);

        match sectors.iter_mut().find(|(name, _)| *name == company.sector) {
            Some((_, leaves)) => leaves.push(leaf),
            None => sectors.push((company.sector.clone(), vec![leaf])),
        }
    }

    let children = sectors
        .into_iter()
        .map(|(name, leaves)| TreemapNode::branch(&name, leaves))
        .collect();

    TreemapNode::branch(ROOT_ID, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_and_root_sums() {
        let companies = vec![
            SectorCompany::new("A", "Tech", 100.0, 5.0),
            SectorCompany::new("X", "Energy", 50.0, -1.0),
            SectorCompany::new("B", "Tech", 300.0, -2.0),
        ];
        let root = build_hierarchy(&companies);

        assert_eq!(root.id, ROOT_ID);
        assert_eq!(root.value, 450.0);

        // Ordre de première apparition : Tech puis Energy
        let names: Vec<&str> = root.children.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(names, ["Tech", "Energy"]);

        let tech = &root.children[0];
        assert_eq!(tech.value, 400.0);
        assert_eq!(tech.percent_change, None);
        assert_eq!(tech.children[0].percent_change, Some(5.0));

        for sector in &root.children {
            let sum: f64 = sector.children.iter().map(|l| l.value).sum();
            assert_eq!(sector.value, sum);
        }
        let all: f64 = root.leaves().iter().map(|l| l.value).sum();
        assert_eq!(root.value, all);
    }

    #[test]
    fn test_empty_input() {
        let root = build_hierarchy(&[]);
        assert_eq!(root.value, 0.0);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_negative_cap_counts_as_zero() {
        let root = build_hierarchy(&[SectorCompany::new("Z", "Tech", -5.0, 0.0)]);
        assert_eq!(root.value, 0.0);
    }
}
