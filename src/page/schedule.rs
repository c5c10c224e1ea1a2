// ============================================================================
// TickerTask : tâche planifiée du ticker
// ============================================================================
// Un thread worker avec son propre runtime tokio envoie un TickerPulse à
// intervalle fixe. L'event loop reçoit les pulses et appelle Ticker::tick :
// toutes les mutations d'état restent sur le thread principal.
//
// CONCEPTS RUST :
// 1. Thread + runtime tokio (comme le worker de chargement en arrière-plan)
// 2. tokio::select! : attendre le prochain tick OU l'annulation
// 3. oneshot : signal d'annulation envoyé une seule fois
// 4. Drop : arrêt garanti même si stop() n'est pas appelé
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Signal envoyé à chaque échéance du timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerPulse {
    /// Numéro de l'échéance (0 = immédiate au démarrage)
    pub seq: u64,
}

/// Tâche planifiée annulable
pub struct TickerTask {
    cancel: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TickerTask {
    /// Démarre la tâche : un pulse immédiat, puis un toutes les `period`
    pub fn start(period: Duration, pulses: mpsc::Sender<TickerPulse>) -> std::io::Result<Self> {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!(error = ?e, "Failed to create ticker runtime");
                        return;
                    }
                };

                runtime.block_on(async move {
                    // CONCEPT : tokio::time::interval
                    // - Le premier tick se termine immédiatement
                    // - Delay : pas de rafale de rattrapage après une pause
                    let mut interval = tokio::time::interval(period);
                    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    let mut seq = 0u64;

                    loop {
                        tokio::select! {
                            _ = &mut cancel_rx => {
                                debug!("Ticker task cancelled");
                                break;
                            }
                            _ = interval.tick() => {
                                if pulses.send(TickerPulse { seq }).is_err() {
                                    // Récepteur fermé : plus personne pour appliquer les ticks
                                    debug!("Pulse receiver dropped, ticker task exiting");
                                    break;
                                }
                                seq += 1;
                            }
                        }
                    }
                });
            })?;

        info!(?period, "Ticker task started");
        Ok(Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    /// Arrête la tâche et attend la fin du thread
    ///
    /// Les appels suivants n'ont aucun effet
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if handle.join().is_err() {
            error!("Ticker thread panicked");
        }
        info!("Ticker task stopped");
    }
}

impl Drop for TickerTask {
    fn drop(&mut self) {
        self.stop();
    }
}
