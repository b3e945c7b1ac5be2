//! Replay command.
//!
//! Runs a recorded tick trace through aggregator, classifier, hysteresis
//! and admission on a virtual clock. Playback goes to an idle virtual sink
//! that is always connected and never busy.
//!
//! Trace format (YAML or JSON):
//!
//! ```yaml
//! tick_ms: 200          # optional, defaults to the configured tick
//! ticks:
//!   - repeat: 15        # silence for 3s
//!   - turn_starts: 1
//!     speakers: [0.06]  # loudness of each open stream, fresh
//!   - speakers:
//!       - { loudness: 0.06, age_ms: 300 }
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use serde::{Deserialize, Serialize};

use moodbox_autodj::{evaluate, AdmissionInput, CooldownLedger, Decision};
use moodbox_mood::{Mood, SessionMood, SpeakerLevel};
use moodbox_session::Config;

use super::{load_config, load_request, output_result};
use crate::Cli;

/// Replays a recorded tick trace and prints every confirmation and
/// admission decision.
#[derive(Args)]
pub struct ReplayCommand {
    /// Trace file (YAML or JSON)
    trace: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Trace {
    tick_ms: Option<u64>,
    ticks: Vec<TraceTick>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TraceTick {
    speakers: Vec<TraceSpeaker>,
    turn_starts: u32,
    repeat: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TraceSpeaker {
    Level(f32),
    Detailed {
        loudness: f32,
        #[serde(default)]
        age_ms: u64,
    },
}

impl TraceSpeaker {
    fn level(&self, now: Instant) -> SpeakerLevel {
        let (loudness, age_ms) = match *self {
            TraceSpeaker::Level(loudness) => (loudness, 0),
            TraceSpeaker::Detailed { loudness, age_ms } => (loudness, age_ms),
        };
        SpeakerLevel {
            loudness,
            last_frame_at: now.checked_sub(Duration::from_millis(age_ms)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum ReplayEvent {
    Confirmed {
        at_ms: u64,
        from: Mood,
        to: Mood,
        voice: f32,
        energy: f32,
        burst: f32,
    },
    Admission {
        at_ms: u64,
        mood: Mood,
        allowed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<&'static str>,
    },
}

impl ReplayCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = load_config(cli)?;
        let path = self.trace.to_string_lossy();
        let trace: Trace = load_request(&path)?;

        let (events, last) = replay(&config, &trace);
        if cli.json {
            return output_result(&events, cli.output.as_deref(), true);
        }

        for event in &events {
            match event {
                ReplayEvent::Confirmed {
                    at_ms,
                    from,
                    to,
                    voice,
                    energy,
                    burst,
                } => println!(
                    "{:>9.3}s  confirmed {} -> {} (voice {:.3}, energy {:.4}, burst {:.2})",
                    *at_ms as f64 / 1000.0,
                    from,
                    to,
                    voice,
                    energy,
                    burst
                ),
                ReplayEvent::Admission {
                    at_ms,
                    mood,
                    allowed,
                    reason,
                } => println!(
                    "{:>9.3}s  {} {}",
                    *at_ms as f64 / 1000.0,
                    mood,
                    if *allowed { "play" } else { reason.unwrap_or("deny") }
                ),
            }
        }
        println!("final mood: {}", last);
        Ok(())
    }
}

/// Runs `trace` and returns its events and the final confirmed mood.
///
/// Admission decisions are reported when they change, not on every retry.
pub(crate) fn replay(config: &Config, trace: &Trace) -> (Vec<ReplayEvent>, Mood) {
    let tick_ms = trace
        .tick_ms
        .unwrap_or(config.mood.aggregator.tick_ms)
        .max(1);
    let t0 = Instant::now();
    let mut mood = SessionMood::new(&config.mood, t0);
    let mut ledger = CooldownLedger::new();
    let mut pending: Option<Mood> = None;
    let mut last_decision: Option<Decision> = None;
    let mut events = Vec::new();
    let mut index: u64 = 0;

    for entry in &trace.ticks {
        for _ in 0..entry.repeat.unwrap_or(1) {
            let at_ms = index * tick_ms;
            let now = t0 + Duration::from_millis(at_ms);
            index += 1;

            for _ in 0..entry.turn_starts {
                mood.note_turn_start();
            }
            let out = mood.tick(now, entry.speakers.iter().map(|s| s.level(now)));

            if let Some(c) = out.transition {
                events.push(ReplayEvent::Confirmed {
                    at_ms,
                    from: c.from,
                    to: c.to,
                    voice: out.features.ema_voice,
                    energy: out.features.ema_energy,
                    burst: out.features.burst_per_sec,
                });
                pending = Some(c.to);
                last_decision = None;
            }

            let Some(target) = pending else {
                continue;
            };
            let input = AdmissionInput {
                mood: target,
                now,
                enabled: ledger.is_enabled(),
                connected: true,
                playing: false,
                last_voice_activity: mood.last_voice_activity(),
                last_global_play: ledger.last_global_play(),
                last_mood_play: ledger.last_mood_play(target),
                energy: out.features.ema_energy,
            };
            let decision = evaluate(&config.admission, &input);
            if last_decision != Some(decision) {
                let reason = match decision {
                    Decision::Allow => None,
                    Decision::Deny(r) => Some(r.as_str()),
                };
                events.push(ReplayEvent::Admission {
                    at_ms,
                    mood: target,
                    allowed: decision.is_allowed(),
                    reason,
                });
                last_decision = Some(decision);
            }
            match decision {
                Decision::Allow => {
                    ledger.record_play(target, now);
                    pending = None;
                }
                Decision::Deny(r) if r.is_transient() => {}
                Decision::Deny(_) => pending = None,
            }
        }
    }

    (events, mood.confirmed())
}
