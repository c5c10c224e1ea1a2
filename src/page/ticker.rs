// ============================================================================
// Ticker : statistiques simulées
// ============================================================================
// À chaque tick, chaque statistique reçoit une perturbation aléatoire bornée
// puis sa valeur formatée est écrite dans son slot d'affichage.
//
// CONCEPTS RUST :
// 1. Générique sur R: Rng : en test on injecte un StdRng seedé (déterministe)
// 2. HashMap comme table de liaison slot -> valeur affichée
// ============================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace};

use crate::models::{StatId, StatMotion, TickerStat};

// ============================================================================
// DisplayBoard : projections en écriture seule
// ============================================================================

/// Valeur affichée dans un slot
#[derive(Debug, Clone)]
pub struct SlotValue {
    pub text: String,

    /// Dernière écriture (pour l'effet "pulse" au rendu)
    pub updated_at: Instant,
}

/// Slots d'affichage connus de la page
///
/// Seuls les slots déclarés au démarrage existent ; une écriture vers un
/// slot absent est ignorée.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    slots: HashMap<String, Option<SlotValue>>,
}

impl DisplayBoard {
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: slots.into_iter().map(|s| (s.into(), None)).collect(),
        }
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Écrit dans un slot, retourne false si le slot n'existe pas
    pub fn write(&mut self, slot: &str, text: String) -> bool {
        match self.slots.get_mut(slot) {
            Some(value) => {
                *value = Some(SlotValue {
                    text,
                    updated_at: Instant::now(),
                });
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot)?.as_ref().map(|v| v.text.as_str())
    }

    /// Le slot a-t-il été écrit il y a moins de `within` ?
    pub fn is_fresh(&self, slot: &str, within: Duration) -> bool {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|v| v.updated_at.elapsed() < within)
            .unwrap_or(false)
    }
}

// ============================================================================
// Structure : Ticker
// ============================================================================

/// Propriétaire exclusif des valeurs des statistiques
#[derive(Debug, Clone)]
pub struct Ticker {
    stats: Vec<TickerStat>,

    /// Nombre de ticks exécutés depuis le démarrage
    ticks: u64,
}

impl Ticker {
    pub fn new(stats: Vec<TickerStat>) -> Self {
        Self { stats, ticks: 0 }
    }

    pub fn stats(&self) -> &[TickerStat] {
        &self.stats
    }

    pub fn stat(&self, id: StatId) -> Option<&TickerStat> {
        self.stats.iter().find(|s| s.id == id)
    }

    pub fn value(&self, id: StatId) -> Option<f64> {
        self.stat(id).map(|s| s.value)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Un pas de simulation pour toutes les statistiques, puis projection
    pub fn tick<R: Rng>(&mut self, rng: &mut R, board: &mut DisplayBoard) {
        for stat in self.stats.iter_mut() {
            let next = match stat.motion {
                StatMotion::Drift { delta } if delta > 0.0 => {
                    stat.value + rng.gen_range(-delta..=delta)
                }
                StatMotion::Drift { .. } => stat.value,
                StatMotion::Growth { min_step, max_step } => {
                    let step = if max_step > min_step {
                        rng.gen_range(min_step..=max_step)
                    } else {
                        min_step
                    };
                    stat.value + f64::from(step)
                }
            };
            stat.set(next);
        }

        self.ticks += 1;
        trace!(tick = self.ticks, "Ticker stepped");
        self.project(board);
    }

    /// Incrémente une statistique de 1 (inscription réussie)
    pub fn bump(&mut self, id: StatId, board: &mut DisplayBoard) -> Option<f64> {
        let stat = self.stats.iter_mut().find(|s| s.id == id)?;
        stat.set(stat.value + 1.0);
        let value = stat.value;

        debug!(stat = ?id, value, "Stat bumped");
        self.project(board);
        Some(value)
    }

    /// Réécrit toutes les valeurs formatées dans leurs slots
    ///
    /// Les statistiques sans slot, ou dont le slot est absent, sont ignorées
    pub fn project(&self, board: &mut DisplayBoard) {
        for stat in &self.stats {
            if let Some(slot) = &stat.slot {
                if !board.write(slot, stat.display()) {
                    trace!(slot = %slot, "Display slot absent, skipped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatFormat;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ticker() -> Ticker {
        Ticker::new(vec![
            TickerStat::new(
                StatId::MarketCap,
                "Market Cap",
                (3.5, 5.0),
                4.2,
                StatFormat::Currency { decimals: 1, suffix: "M".to_string() },
                StatMotion::Drift { delta: 0.05 },
            )
            .with_slot("marketCap"),
            TickerStat::new(
                StatId::Holders,
                "Holders",
                (0.0, 1_000_000.0),
                1234.0,
                StatFormat::Integer,
                StatMotion::Growth { min_step: 1, max_step: 5 },
            )
            .with_slot("holders"),
            TickerStat::new(
                StatId::Price,
                "Price",
                (0.0030, 0.0060),
                0.0042,
                StatFormat::Currency { decimals: 4, suffix: String::new() },
                StatMotion::Drift { delta: 0.0004 },
            )
            .with_slot("tokenPrice"),
        ])
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut ticker = ticker();
        let mut board = DisplayBoard::new(["marketCap", "holders", "tokenPrice"]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut last_holders = ticker.value(StatId::Holders).unwrap();
        for _ in 0..5_000 {
            ticker.tick(&mut rng, &mut board);

            for stat in ticker.stats() {
                assert!(stat.value >= stat.min && stat.value <= stat.max, "{:?}", stat);
            }

            let holders = ticker.value(StatId::Holders).unwrap();
            assert!(holders > last_holders);
            assert!(holders - last_holders <= 5.0);
            last_holders = holders;
        }
        assert_eq!(ticker.ticks(), 5_000);
    }

    #[test]
    fn test_tick_writes_formatted_slots() {
        let mut ticker = ticker();
        let mut board = DisplayBoard::new(["marketCap", "holders", "tokenPrice"]);
        let mut rng = StdRng::seed_from_u64(1);

        ticker.tick(&mut rng, &mut board);

        let cap = board.get("marketCap").unwrap();
        assert!(cap.starts_with('$') && cap.ends_with('M'));
        assert!(board.get("holders").unwrap().contains(','));
        assert!(board.is_fresh("holders", Duration::from_secs(60)));
    }

    #[test]
    fn test_missing_slot_is_skipped() {
        let mut ticker = ticker();
        // Pas de slot "tokenPrice" dans cette page
        let mut board = DisplayBoard::new(["holders"]);
        let mut rng = StdRng::seed_from_u64(3);

        ticker.tick(&mut rng, &mut board);

        assert!(board.get("holders").is_some());
        assert!(board.get("tokenPrice").is_none());
        assert!(!board.has_slot("tokenPrice"));
    }

    #[test]
    fn test_bump_adds_exactly_one() {
        let mut ticker = ticker();
        let mut board = DisplayBoard::new(["holders"]);

        assert_eq!(ticker.bump(StatId::Holders, &mut board), Some(1235.0));
        assert_eq!(board.get("holders"), Some("1,235"));
        assert_eq!(ticker.bump(StatId::Change24h, &mut board), None);
    }

    #[test]
    fn test_project_does_not_change_values() {
        let ticker = ticker();
        let mut board = DisplayBoard::new(["marketCap"]);

        ticker.project(&mut board);

        assert_eq!(board.get("marketCap"), Some("$4.2M"));
        assert_eq!(ticker.value(StatId::MarketCap), Some(4.2));
    }
}
