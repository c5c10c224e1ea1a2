// ============================================================================
// Structure : TickerStat
// ============================================================================
// Statistique simulée affichée sur la page (prix, market cap, holders...)
// Valeur bornée dans [min, max], modifiée uniquement par le Ticker
//
// CONCEPTS RUST :
// 1. Enums avec données : StatFormat et StatMotion portent leurs paramètres
// 2. #[serde(tag = "...")] : enums internally tagged dans le fichier TOML
// ============================================================================

use serde::{Deserialize, Serialize};

/// Identifiant des statistiques connues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatId {
    /// Prix du token
    Price,

    /// Capitalisation (en millions)
    MarketCap,

    /// Nombre de holders / inscrits à la waitlist
    Holders,

    /// Variation sur 24h en pourcentage
    Change24h,
}

/// Règle de formatage d'une statistique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatFormat {
    /// "$4.2M", "$0.0042"
    Currency {
        decimals: usize,
        #[serde(default)]
        suffix: String,
    },

    /// "1,234"
    Integer,

    /// "+2.35%"
    Percent { decimals: usize },
}

impl StatFormat {
    /// Formatte une valeur selon la règle
    pub fn apply(&self, value: f64) -> String {
        match self {
            StatFormat::Currency { decimals, suffix } => {
                format!("${:.*}{}", *decimals, value, suffix)
            }
            StatFormat::Integer => group_thousands(value.round().max(0.0) as u64),
            StatFormat::Percent { decimals } => format!("{:+.*}%", *decimals, value),
        }
    }
}

/// Sépare les milliers par des virgules (1234567 -> "1,234,567")
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Mouvement appliqué à chaque tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatMotion {
    /// Marche aléatoire : v + U(-delta, +delta), bornée
    Drift { delta: f64 },

    /// Croissance monotone : v + U{min_step..=max_step}, ne décroît jamais
    Growth { min_step: u32, max_step: u32 },
}

/// Statistique affichée par le ticker
#[derive(Debug, Clone)]
pub struct TickerStat {
    pub id: StatId,
    pub label: String,
    pub min: f64,
    pub max: f64,

    /// Valeur courante
    /// INVARIANT : min <= value <= max
    pub value: f64,

    pub format: StatFormat,
    pub motion: StatMotion,

    /// Slot d'affichage (None : la statistique n'est pas affichée)
    pub slot: Option<String>,
}

impl TickerStat {
    /// Crée une statistique, la valeur initiale est ramenée dans [min, max]
    pub fn new(
        id: StatId,
        label: impl Into<String>,
        (min, max): (f64, f64),
        seed: f64,
        format: StatFormat,
        motion: StatMotion,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            min,
            max,
            value: seed.clamp(min, max),
            format,
            motion,
            slot: None,
        }
    }

    /// Lie la statistique à un slot d'affichage
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Affecte une nouvelle valeur, bornée dans [min, max]
    pub fn set(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Valeur formatée pour l'affichage
    pub fn display(&self) -> String {
        self.format.apply(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1234), "1,234");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_formats() {
        let market_cap = StatFormat::Currency { decimals: 1, suffix: "M".to_string() };
        assert_eq!(market_cap.apply(4.2), "$4.2M");

        let price = StatFormat::Currency { decimals: 4, suffix: String::new() };
        assert_eq!(price.apply(0.0042), "$0.0042");

        assert_eq!(StatFormat::Integer.apply(1234.0), "1,234");
        assert_eq!(StatFormat::Percent { decimals: 2 }.apply(2.4), "+2.40%");
        assert_eq!(StatFormat::Percent { decimals: 2 }.apply(-1.5), "-1.50%");
    }

    #[test]
    fn test_seed_and_set_are_clamped() {
        let mut stat = TickerStat::new(
            StatId::MarketCap,
            "Market Cap",
            (3.5, 5.0),
            9.0,
            StatFormat::Integer,
            StatMotion::Drift { delta: 0.05 },
        );
        assert_eq!(stat.value, 5.0);

        stat.set(1.0);
        assert_eq!(stat.value, 3.5);
    }
}
