// ============================================================================
// Formatage des nombres
// ============================================================================
// Petites fonctions pures partagées par la treemap, les tableaux et les
// statistiques. Toutes retournent une String prête à afficher.
// ============================================================================

/// Variation signée : "+5.00%", "-2.00%", "0.00%"
pub fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Capitalisation en milliards : "2.95B USD"
pub fn billions_usd(value: f64) -> String {
    format!("{:.2}B USD", value / 1e9)
}

/// Montant compact avec suffixe : "$2.95T", "$410.12B", "$12.00M", "$950.00"
pub fn compact_dollars(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${:.2}", value)
    }
}

/// Prix : "$185.23"
pub fn dollars(value: f64) -> String {
    format!("${:.2}", value)
}

/// Nombre avec séparateurs de milliers : "1,234,567"
///
/// CONCEPT RUST : Manipulation de chaînes par chunks
/// - On formate la partie entière, puis on insère une virgule tous les 3 chiffres
/// - Les décimales (s'il y en a) sont conservées sur 2 chiffres
pub fn thousands(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let integer = abs.trunc() as u64;
    let fraction = abs - abs.trunc();

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if fraction > 0.005 {
        let decimals = format!("{:.2}", fraction);
        // "0.25" -> ".25" (un arrondi à "1.00" est ignoré)
        if let Some(rest) = decimals.strip_prefix('0') {
            grouped.push_str(rest);
        }
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
