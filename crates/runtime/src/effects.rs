//! Effects - fire-and-forget notifications for the host
//!
//! Sounds, haptics and timer cues are published on a bounded broadcast
//! channel. Publishing never blocks: with no subscribers the effect is
//! dropped, and a subscriber that falls behind loses the oldest effects
//! (it sees `RecvError::Lagged` and can keep reading).

use tokio::sync::broadcast;
use tracing::trace;

use memory_match_core::GameState;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEffect {
    PlayFlipSound,
    PlayMatchSound,
    PlayMismatch,
    PlayWinSound,
    PlayLoseSound,
    PlayTheNutsSound,
    VibrateMatch,
    VibrateMismatch,
    VibrateHeat,
    VibrateWarning,
    VibrateTick,
    HeatShieldUsed,
    /// Current timer value in seconds
    TimerUpdate(i64),
    TimeGain(i64),
    TimeLoss(i64),
    EarnCurrency(i64),
    GameOver,
    GameWon(Box<GameState>),
}

/// Publishing half of the effect channel
#[derive(Debug, Clone)]
pub struct EffectSink {
    tx: broadcast::Sender<GameEffect>,
}

impl EffectSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, effect: GameEffect) {
        if self.tx.send(effect).is_err() {
            trace!("effect dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEffect> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let sink = EffectSink::new(4);
        sink.publish(GameEffect::PlayFlipSound);
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let sink = EffectSink::new(4);
        let mut rx = sink.subscribe();
        sink.publish(GameEffect::PlayFlipSound);
        sink.publish(GameEffect::TimerUpdate(3));
        assert_eq!(rx.try_recv().unwrap(), GameEffect::PlayFlipSound);
        assert_eq!(rx.try_recv().unwrap(), GameEffect::TimerUpdate(3));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_slow_subscriber_loses_oldest() {
        let sink = EffectSink::new(2);
        let mut rx = sink.subscribe();
        for i in 0..5 {
            sink.publish(GameEffect::TimerUpdate(i));
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(3))));
        assert_eq!(rx.try_recv().unwrap(), GameEffect::TimerUpdate(3));
        assert_eq!(rx.try_recv().unwrap(), GameEffect::TimerUpdate(4));
    }
}
