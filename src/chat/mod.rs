//! Chat orchestrator — the message list, canned replies and the toots that
//! go with them.
//!
//! Time is passed in by the host (`now_ms`, milliseconds since any fixed
//! epoch). Bot replies are deferred: they are queued with a due time and
//! released by [`Chat::poll`]. Queued replies are never cancelled, not even
//! by [`Chat::clear`], and each carries its own text and toot, so rapid
//! submissions may interleave but every reply lands exactly once.

pub mod derive;
pub mod reply;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::BotConfig;
use crate::dsp::engine::SynthEngine;
use crate::dsp::output::AudioOutput;
use crate::error::FartBotError;
use crate::preset::{TootPreset, find_preset};
use crate::toot::TootParams;

use self::derive::derive_params;
use self::reply::generate_reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One chat line. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Milliseconds, as supplied by the host clock.
    pub timestamp: u64,
}

/// A bot reply waiting for its due time.
#[derive(Debug)]
struct PendingReply {
    due_ms: u64,
    text: String,
    /// Toot played when the reply lands, if any.
    effect: Option<TootParams>,
}

pub struct Chat {
    config: BotConfig,
    messages: Vec<Message>,
    /// Sorted by due time; equal due times keep submission order.
    pending: Vec<PendingReply>,
    engine: SynthEngine,
    output: AudioOutput,
    rng: StdRng,
}

impl Chat {
    /// Start a chat with the greeting as its only message.
    pub fn new(config: BotConfig, output: AudioOutput, now_ms: u64) -> Self {
        let mut rng = config
            .seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_os_rng);
        let mut engine = SynthEngine::with_seed(rng.random());
        engine.set_enabled(config.sound_enabled);

        let greeting = Message {
            sender: Sender::Bot,
            text: config.greeting.clone(),
            timestamp: now_ms,
        };
        Chat {
            config,
            messages: vec![greeting],
            pending: Vec::new(),
            engine,
            output,
            rng,
        }
    }

    /// A chat whose audio is pulled by the host at `config.sample_rate`.
    pub fn offline(config: BotConfig, now_ms: u64) -> Self {
        let output = AudioOutput::offline(config.sample_rate).with_master_gain(config.master_gain);
        Self::new(config, output, now_ms)
    }

    /// A chat that plays through the default output device.
    #[cfg(feature = "playback")]
    pub fn with_default_device(config: BotConfig, now_ms: u64) -> Self {
        let output = AudioOutput::default_device().with_master_gain(config.master_gain);
        Self::new(config, output, now_ms)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn presets(&self) -> &[TootPreset] {
        &self.config.presets
    }

    pub fn output(&self) -> &AudioOutput {
        &self.output
    }

    /// Handle typed input. Whitespace-only input is ignored.
    ///
    /// The user's message is appended now; the bot's reply and its toot
    /// follow after the thinking delay.
    pub fn submit(&mut self, text: &str, now_ms: u64) {
        let value = text.trim();
        if value.is_empty() {
            return;
        }
        self.push(Sender::User, value.to_string(), now_ms);

        let reply = generate_reply(value, &mut self.rng);
        let params = derive_params(value);
        log::debug!("Submit {:?} -> {:?}", value, reply.category);
        self.defer(now_ms.saturating_add(self.config.thinking_delay_ms), reply.text, Some(params));
    }

    /// Press a toot key: the toot plays immediately, the reply follows.
    pub fn press_preset(&mut self, label: &str, now_ms: u64) -> Result<(), FartBotError> {
        let preset = find_preset(&self.config.presets, label)
            .cloned()
            .ok_or_else(|| FartBotError::UnknownPreset(label.to_string()))?;

        self.engine.play_effect(&mut self.output, &preset.params);
        self.push(Sender::User, format!("{}!", preset.label), now_ms);

        let reply = generate_reply(&preset.label, &mut self.rng);
        self.defer(now_ms.saturating_add(self.config.preset_reply_delay_ms), reply.text, None);
        Ok(())
    }

    /// Replace the whole history with a single bot line. No toot.
    pub fn clear(&mut self, now_ms: u64) {
        self.messages = vec![Message {
            sender: Sender::Bot,
            text: self.config.cleared_text.clone(),
            timestamp: now_ms,
        }];
    }

    /// Deliver every reply due at or before `now_ms`. Returns how many landed.
    pub fn poll(&mut self, now_ms: u64) -> usize {
        let due = self.pending.partition_point(|r| r.due_ms <= now_ms);
        let ready: Vec<PendingReply> = self.pending.drain(..due).collect();
        for reply in ready {
            if let Some(params) = &reply.effect {
                self.engine.play_effect(&mut self.output, params);
            }
            log::debug!("Reply due @ {}ms delivered", reply.due_ms);
            self.push(Sender::Bot, reply.text, reply.due_ms);
        }
        due
    }

    /// Earliest time a queued reply becomes due.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.first().map(|r| r.due_ms)
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Mute or unmute future toots; ones already playing finish normally.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.engine.set_enabled(enabled);
    }

    pub fn sound_enabled(&self) -> bool {
        self.engine.is_enabled()
    }

    /// Flip the sound switch and return the new state.
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = !self.sound_enabled();
        self.set_sound_enabled(enabled);
        enabled
    }

    /// Render the next `frames` samples of the shared context. Silence until
    /// the first toot opens it, or forever if it could not be opened.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        match self.output.existing() {
            Some(ctx) => ctx.render(frames),
            None => vec![0.0; frames],
        }
    }

    // Timestamps never go backwards, even when a late poll delivers a reply
    // that was due before the last user message.
    fn push(&mut self, sender: Sender, text: String, timestamp: u64) {
        let floor = self.messages.last().map_or(0, |m| m.timestamp);
        self.messages.push(Message {
            sender,
            text,
            timestamp: timestamp.max(floor),
        });
    }

    fn defer(&mut self, due_ms: u64, text: String, effect: Option<TootParams>) {
        let idx = self.pending.partition_point(|r| r.due_ms <= due_ms);
        self.pending.insert(idx, PendingReply { due_ms, text, effect });
    }
}
