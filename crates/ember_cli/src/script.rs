//! Scripted input for the headless player
//!
//! A script is a whitespace- or comma-separated list of steps:
//!
//! - `v`, `visual` / `t`, `text` / `n`, `next` / `p`, `previous`: send a signal
//! - `wait:<seconds>`: run the frame clock
//! - `key:<name>`: press a key, resolved through the key bindings
//!
//! Every signal step is followed by one frame so its effect is visible.

use anyhow::{Context, Result};
use ember_core::{KeyBindings, KeyCode, Signal};
use ember_scene::{AssetSource, SequenceController};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Signal(Signal),
    Key(KeyCode),
    Wait(f32),
}

pub fn parse(script: &str) -> Result<Vec<Step>> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(step: &str) -> Result<Step> {
    if let Some(seconds) = step.strip_prefix("wait:") {
        let seconds: f32 = seconds
            .parse()
            .with_context(|| format!("Invalid wait duration in '{}'", step))?;
        if !seconds.is_finite() || seconds < 0.0 {
            anyhow::bail!("Wait duration must be a non-negative number: '{}'", step);
        }
        return Ok(Step::Wait(seconds));
    }
    if let Some(name) = step.strip_prefix("key:") {
        let key = KeyCode::from_name(name).with_context(|| format!("Unknown key '{}'", name))?;
        return Ok(Step::Key(key));
    }
    Signal::from_name(step)
        .map(Step::Signal)
        .with_context(|| format!("Unknown script step '{}'", step))
}

/// Drives a sequence on a fixed frame clock
pub struct Player<A: AssetSource> {
    sequence: SequenceController<A>,
    bindings: KeyBindings,
    frame: f32,
    elapsed: f32,
}

impl<A: AssetSource> Player<A> {
    pub fn new(sequence: SequenceController<A>, bindings: KeyBindings, frame: f32) -> Self {
        Self {
            sequence,
            bindings,
            frame,
            elapsed: 0.0,
        }
    }

    pub fn sequence(&self) -> &SequenceController<A> {
        &self.sequence
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            match *step {
                Step::Signal(signal) => self.signal(signal)?,
                Step::Key(key) => match self.bindings.resolve(key) {
                    Some(signal) => self.signal(signal)?,
                    None => warn!(?key, "key not bound"),
                },
                Step::Wait(seconds) => self.wait(seconds)?,
            }
        }
        Ok(())
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        let accepted = self.sequence.on_signal(signal);
        info!(
            t = self.elapsed,
            ?signal,
            accepted,
            scene = self.sequence.current_id(),
            "signal"
        );
        self.frame_tick()
    }

    pub fn wait(&mut self, seconds: f32) -> Result<()> {
        let frames = (seconds / self.frame).ceil() as u64;
        for _ in 0..frames {
            self.frame_tick()?;
        }
        let orchestrator = self.sequence.orchestrator();
        debug!(
            t = self.elapsed,
            state = ?orchestrator.state(),
            active = orchestrator.is_scene_active(),
            nodes = orchestrator.stage().len(),
            "waited"
        );
        Ok(())
    }

    fn frame_tick(&mut self) -> Result<()> {
        self.elapsed += self.frame;
        self.sequence
            .tick(self.frame)
            .with_context(|| format!("Scene load failed at t={:.2}s", self.elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Size;
    use ember_scene::{MemoryAssets, SceneConfig, SceneOrchestrator};

    #[test]
    fn test_parse_steps() {
        let steps = parse("v wait:1.5, t key:Enter next").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Signal(Signal::AdvanceVisual),
                Step::Wait(1.5),
                Step::Signal(Signal::AdvanceText),
                Step::Key(KeyCode::ENTER),
                Step::Signal(Signal::NextScene),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse("v jump").is_err());
        assert!(parse("wait:soon").is_err());
        assert!(parse("wait:-1").is_err());
        assert!(parse("key:F13").is_err());
    }

    #[test]
    fn test_player_walks_sequence() {
        let scene = |id: &str| {
            SceneConfig::from_json(&format!(
                r#"{{ "id": "{id}", "image": {{ "path": "a.png" }} }}"#
            ))
            .unwrap()
        };
        let assets = MemoryAssets::new()
            .with_image("a.png", Size::new(100.0, 100.0))
            .with_scene(scene("one"))
            .with_scene(scene("two"));
        let orchestrator = SceneOrchestrator::new(assets, Size::new(640.0, 480.0));
        let mut sequence = SequenceController::new(orchestrator, vec!["one".into(), "two".into()]);
        sequence.start().unwrap();

        let mut player = Player::new(sequence, KeyBindings::default(), 1.0 / 60.0);
        player
            .run(&parse("key:Enter wait:2 key:N wait:0.1").unwrap())
            .unwrap();
        assert_eq!(player.sequence().current_id(), Some("two"));
        assert!(player.elapsed() > 2.0);
    }
}
