//! Placeholder Rotator
//!
//! Cycles suggestion prompts through the empty input's placeholder while the
//! chat panel is closed. The sequencing is a pure state machine
//! ([`RotationState::step`]); a tokio task drives it and publishes frames on
//! a watch channel.
//!
//! Stopping aborts the task, so no pending timer can overwrite the static
//! placeholder afterwards.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What the placeholder shows right now
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaceholderFrame {
    /// Placeholder text
    pub text: String,
    /// Mid fade-out
    pub fading: bool,
}

impl PlaceholderFrame {
    fn shown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fading: false,
        }
    }
}

/// How prompts are cycled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RotatorStyle {
    /// Swap whole prompts on a fixed interval, fading out before each swap
    Fade {
        /// Time from one prompt appearing to the next
        #[serde(with = "millis")]
        interval: Duration,
        /// Fade-out window at the end of each interval
        #[serde(with = "millis")]
        fade: Duration,
    },
    /// Type each prompt forward, hold, delete it backward, pause, advance
    Typewriter {
        /// Delay per typed character
        #[serde(with = "millis")]
        type_delay: Duration,
        /// Delay per deleted character
        #[serde(with = "millis")]
        delete_delay: Duration,
        /// Pause with the full prompt shown
        #[serde(with = "millis")]
        hold: Duration,
        /// Pause with an empty placeholder before the next prompt
        #[serde(with = "millis")]
        gap: Duration,
    },
}

impl Default for RotatorStyle {
    fn default() -> Self {
        Self::Fade {
            interval: Duration::from_millis(3000),
            fade: Duration::from_millis(500),
        }
    }
}

impl RotatorStyle {
    /// Typewriter with the usual pacing
    pub fn typewriter() -> Self {
        Self::Typewriter {
            type_delay: Duration::from_millis(50),
            delete_delay: Duration::from_millis(30),
            hold: Duration::from_millis(2000),
            gap: Duration::from_millis(500),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Show,
    FadeOut,
    /// Showing the first n characters, typing forward
    Type(usize),
    /// Showing the first n characters, deleting backward
    Delete(usize),
}

/// Position in the prompt cycle
#[derive(Clone, Debug)]
pub struct RotationState {
    prompts: Vec<String>,
    index: usize,
    style: RotatorStyle,
    phase: Phase,
}

impl RotationState {
    /// Start at `start` (wrapped); `None` if there are no prompts
    pub fn new(prompts: Vec<String>, style: RotatorStyle, start: usize) -> Option<Self> {
        if prompts.is_empty() {
            return None;
        }
        let index = start % prompts.len();
        let phase = match style {
            RotatorStyle::Fade { .. } => Phase::Show,
            RotatorStyle::Typewriter { .. } => Phase::Type(1),
        };
        Some(Self {
            prompts,
            index,
            style,
            phase,
        })
    }

    /// Start at a random prompt
    pub fn random_start(prompts: Vec<String>, style: RotatorStyle) -> Option<Self> {
        let start = match prompts.len() {
            0 => 0,
            len => rand::thread_rng().gen_range(0..len),
        };
        Self::new(prompts, style, start)
    }

    /// Index of the prompt currently cycling
    pub fn index(&self) -> usize {
        self.index
    }

    fn current(&self) -> &str {
        &self.prompts[self.index]
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.prompts.len();
    }

    /// The frame to show now and how long to wait before the next step
    pub fn step(&mut self) -> (PlaceholderFrame, Duration) {
        match (self.style, self.phase) {
            (RotatorStyle::Fade { interval, fade }, Phase::Show) => {
                self.phase = Phase::FadeOut;
                (
                    PlaceholderFrame::shown(self.current()),
                    interval.saturating_sub(fade),
                )
            }
            (RotatorStyle::Fade { fade, .. }, _) => {
                let frame = PlaceholderFrame {
                    text: self.current().to_string(),
                    fading: true,
                };
                self.advance();
                self.phase = Phase::Show;
                (frame, fade)
            }
            (
                RotatorStyle::Typewriter {
                    type_delay, hold, ..
                },
                Phase::Type(n),
            ) => {
                let len = self.current().chars().count();
                let frame = PlaceholderFrame::shown(prefix(self.current(), n));
                if n >= len {
                    self.phase = Phase::Delete(len.saturating_sub(1));
                    (frame, hold)
                } else {
                    self.phase = Phase::Type(n + 1);
                    (frame, type_delay)
                }
            }
            (
                RotatorStyle::Typewriter {
                    delete_delay, gap, ..
                },
                Phase::Delete(n),
            ) => {
                let frame = PlaceholderFrame::shown(prefix(self.current(), n));
                if n == 0 {
                    self.advance();
                    self.phase = Phase::Type(1);
                    (frame, gap)
                } else {
                    self.phase = Phase::Delete(n - 1);
                    (frame, delete_delay)
                }
            }
            (RotatorStyle::Typewriter { .. }, Phase::Show | Phase::FadeOut) => {
                self.phase = Phase::Type(1);
                self.step()
            }
        }
    }
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

/// Drives a [`RotationState`] on a tokio task
pub struct PlaceholderRotator {
    prompts: Vec<String>,
    style: RotatorStyle,
    frames: Arc<watch::Sender<PlaceholderFrame>>,
    task: Option<JoinHandle<()>>,
}

impl PlaceholderRotator {
    /// Create a stopped rotator
    pub fn new(prompts: Vec<String>, style: RotatorStyle) -> Self {
        let (frames, _) = watch::channel(PlaceholderFrame::default());
        Self {
            prompts,
            style,
            frames: Arc::new(frames),
            task: None,
        }
    }

    /// Receive every frame the rotator publishes
    pub fn subscribe(&self) -> watch::Receiver<PlaceholderFrame> {
        self.frames.subscribe()
    }

    /// The frame most recently published
    pub fn current(&self) -> PlaceholderFrame {
        self.frames.borrow().clone()
    }

    /// Whether the rotation task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Begin rotating from a fresh random prompt
    ///
    /// No-op while already running or when there are no prompts.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let Some(mut state) = RotationState::random_start(self.prompts.clone(), self.style)
        else {
            return;
        };

        tracing::debug!(start = state.index(), "Placeholder rotation started");
        let frames = Arc::clone(&self.frames);
        self.task = Some(tokio::spawn(async move {
            // Deadlines accumulate so slow wakeups do not stretch the cycle
            let mut next = tokio::time::Instant::now();
            loop {
                let (frame, delay) = state.step();
                frames.send_replace(frame);
                next += delay;
                tokio::time::sleep_until(next).await;
            }
        }));
    }

    /// Stop rotating and show `static_text`
    pub fn stop(&mut self, static_text: &str) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Placeholder rotation stopped");
        }
        self.frames.send_replace(PlaceholderFrame::shown(static_text));
    }
}

impl Drop for PlaceholderRotator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
