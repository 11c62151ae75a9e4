//! Bounded playback of utterances on the audio module.
//!
//! Each token is issued with `play()` and the loop then polls `is_busy()`
//! until the module reports idle, giving up after `max_wait_ms`. A module
//! that keeps timing out, or errors, is muted for the rest of the session
//! so that display and buzzer keep working.

use std::sync::Arc;

use scale_traits::{AudioPlayer, Clock};

use crate::config::AudioCfg;
use crate::error::ScaleError;
use crate::hw_error::map_hw_error;
use crate::speech::{Token, Utterance};
use crate::util::ms;

/// Result of speaking one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every token finished.
    Played,
    /// A token did not finish within the bounded wait; the rest was dropped.
    TimedOut,
    /// Nothing was played.
    Muted,
}

pub struct Voice {
    player: Box<dyn AudioPlayer>,
    clock: Arc<dyn Clock + Send + Sync>,
    cfg: AudioCfg,
    muted: bool,
    consecutive_timeouts: u32,
}

impl core::fmt::Debug for Voice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Voice")
            .field("muted", &self.muted)
            .field("consecutive_timeouts", &self.consecutive_timeouts)
            .finish()
    }
}

impl Voice {
    pub fn new(
        player: Box<dyn AudioPlayer>,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: AudioCfg,
    ) -> Self {
        Self {
            player,
            clock,
            cfg,
            muted: false,
            consecutive_timeouts: 0,
        }
    }

    /// Bring up the module. On failure the voice is muted and the error is
    /// returned for the caller to log; it is never fatal.
    pub fn init(&mut self) -> Result<(), ScaleError> {
        match self.player.init() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.mute();
                Err(ScaleError::AudioDeviceUnavailable(
                    map_hw_error(&*e).to_string(),
                ))
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn mute(&mut self) {
        if !self.muted {
            tracing::warn!("audio muted for the rest of the session");
        }
        self.muted = true;
    }

    /// Speak `utterance` token by token, each to completion.
    pub fn say(&mut self, utterance: Utterance) -> PlayOutcome {
        if self.muted {
            return PlayOutcome::Muted;
        }
        for token in utterance {
            match self.play_token(token) {
                Ok(true) => self.consecutive_timeouts = 0,
                Ok(false) => {
                    self.consecutive_timeouts = self.consecutive_timeouts.saturating_add(1);
                    tracing::warn!(
                        token = token.name(),
                        consecutive = self.consecutive_timeouts,
                        max_wait_ms = self.cfg.max_wait_ms,
                        "audio token did not finish in time"
                    );
                    if self.consecutive_timeouts >= u32::from(self.cfg.max_consecutive_timeouts) {
                        self.mute();
                    }
                    return PlayOutcome::TimedOut;
                }
                Err(e) => {
                    tracing::warn!(token = token.name(), error = %e, "audio playback failed");
                    self.mute();
                    return PlayOutcome::Muted;
                }
            }
        }
        PlayOutcome::Played
    }

    /// `Ok(true)` when the module went idle within the bound.
    fn play_token(&mut self, token: Token) -> Result<bool, ScaleError> {
        tracing::trace!(token = token.name(), track = token.track(), "play");
        self.player.play(token.track()).map_err(|e| map_hw_error(&*e))?;

        let poll = ms(self.cfg.poll_ms.max(1));
        let start = self.clock.now();
        loop {
            if !self.player.is_busy().map_err(|e| map_hw_error(&*e))? {
                return Ok(true);
            }
            if self.clock.ms_since(start) >= self.cfg.max_wait_ms {
                return Ok(false);
            }
            self.clock.sleep(poll);
        }
    }
}
