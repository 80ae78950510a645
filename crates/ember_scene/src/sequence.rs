//! Sequence controller
//!
//! Walks an ordered list of scene ids. Moving to another scene first asks the
//! orchestrator to complete the current one; the new scene loads on the first
//! tick after the old one has been torn down. Navigation requests arriving
//! while a move is pending are dropped.
//!
//! A scene that fails to load halts the sequence on that scene: `next` is
//! refused until `previous` (or `start`) succeeds in moving elsewhere.

use ember_core::{Signal, Size};
use tracing::{debug, info, warn};

use crate::assets::AssetSource;
use crate::error::{Result, SceneError};
use crate::orchestrator::SceneOrchestrator;

pub struct SequenceController<A: AssetSource> {
    orchestrator: SceneOrchestrator<A>,
    scenes: Vec<String>,
    cursor: Option<usize>,
    pending: Option<usize>,
    halted: bool,
}

impl<A: AssetSource> SequenceController<A> {
    pub fn new(orchestrator: SceneOrchestrator<A>, scenes: Vec<String>) -> Self {
        Self {
            orchestrator,
            scenes,
            cursor: None,
            pending: None,
            halted: false,
        }
    }

    /// Build a controller over the scenes of a novel
    pub fn from_novel(assets: A, surface: Size, novel_id: &str) -> Result<Self> {
        let novel = assets.load_novel(novel_id)?;
        info!(
            novel = %novel.id,
            title = novel.title.as_deref(),
            scenes = novel.scenes.len(),
            "novel loaded"
        );
        Ok(Self::new(SceneOrchestrator::new(assets, surface), novel.scenes))
    }

    pub fn orchestrator(&self) -> &SceneOrchestrator<A> {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut SceneOrchestrator<A> {
        &mut self.orchestrator
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Index of the scene shown (or last attempted)
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_id(&self) -> Option<&str> {
        self.cursor.and_then(|i| self.scenes.get(i)).map(String::as_str)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some() || self.orchestrator.is_transitioning()
    }

    /// Load the first scene
    pub fn start(&mut self) -> Result<()> {
        if self.scenes.is_empty() {
            warn!("sequence has no scenes");
            return Ok(());
        }
        if self.is_transitioning() {
            return Err(SceneError::Busy);
        }
        self.load(0)
    }

    /// Move to the next scene. Returns whether the request was accepted.
    pub fn next(&mut self) -> bool {
        if self.halted {
            warn!(cursor = ?self.cursor, "sequence halted, next refused");
            return false;
        }
        match self.cursor {
            Some(i) if i + 1 < self.scenes.len() => self.request(i + 1),
            _ => {
                debug!(cursor = ?self.cursor, "no next scene");
                false
            }
        }
    }

    /// Move to the previous scene. Returns whether the request was accepted.
    pub fn previous(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => {
                let accepted = self.request(i - 1);
                if accepted {
                    self.halted = false;
                }
                accepted
            }
            _ => {
                debug!(cursor = ?self.cursor, "no previous scene");
                false
            }
        }
    }

    /// Route a signal: scene navigation here, everything else to the
    /// orchestrator.
    pub fn on_signal(&mut self, signal: Signal) -> bool {
        match signal {
            Signal::NextScene => self.next(),
            Signal::PreviousScene => self.previous(),
            other => self.orchestrator.on_signal(other),
        }
    }

    fn request(&mut self, index: usize) -> bool {
        if self.is_transitioning() {
            debug!(target_index = index, "scene change dropped, transition in flight");
            return false;
        }
        self.pending = Some(index);
        self.orchestrator.complete_scene();
        true
    }

    /// Advance the orchestrator, then load a pending scene once the previous
    /// one is gone.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.orchestrator.tick(dt);
        self.poll()
    }

    /// Load a pending scene if the orchestrator has finished tearing down
    pub fn poll(&mut self) -> Result<()> {
        match self.pending {
            Some(index) if !self.orchestrator.is_transitioning() => {
                self.pending = None;
                self.load(index)
            }
            _ => Ok(()),
        }
    }

    fn load(&mut self, index: usize) -> Result<()> {
        let Some(id) = self.scenes.get(index).cloned() else {
            return Err(SceneError::Index {
                index,
                len: self.scenes.len(),
            });
        };
        self.cursor = Some(index);
        info!(cursor = index, scene = %id, "sequence moving");
        match self.orchestrator.load_scene_by_id(&id) {
            Ok(()) => {
                self.halted = false;
                Ok(())
            }
            Err(err) => {
                warn!(scene = %id, error = %err, "sequence halted");
                self.halted = true;
                Err(err)
            }
        }
    }
}
