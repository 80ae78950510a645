//! Text slide stack
//!
//! Lines of the current verse enter one per advance, alternately from the left
//! and the right, pushing the lines already shown up by one line height. A
//! rounded panel sits behind the visible lines. When a verse runs out the
//! visible lines fade away and the next verse starts on the same advance.

use ember_animation::{AnimationScheduler, Easing, Timeline, TimelineId, Tween};
use ember_core::{NodeId, NodeKind, Point, Property, Rect, Stage};
use tracing::{debug, warn};

use super::TextStrategy;
use crate::config::{SlideStackConfig, Verse};

pub const LINE_HEIGHT: f32 = 30.0;
const PANEL_PADDING: f32 = 20.0;
const PANEL_RADIUS: f32 = 10.0;
const PANEL_FILL: f32 = 0.7;
const PANEL_FADE: f32 = 0.3;
const CLEAR_DURATION: f32 = 0.5;
/// Rough advance width of one glyph at the text size lines are set in
const GLYPH_WIDTH: f32 = 12.0;

/// What one advance-text signal did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAdvance {
    /// A new line entered
    Shown,
    /// The verse ended; the next one starts once the clear finishes
    Clearing,
    /// A clear is still running; the advance was dropped
    Busy,
    /// Nothing left to show
    Exhausted,
}

#[derive(Clone, Copy, Debug)]
struct Nodes {
    panel: NodeId,
    lines: NodeId,
}

pub struct SlideStackAnimation {
    config: SlideStackConfig,
    verses: Vec<Verse>,
    verse: usize,
    line: usize,
    /// Visible lines, oldest first
    visible: Vec<NodeId>,
    nodes: Option<Nodes>,
    scheduler: AnimationScheduler,
    clearing: Option<TimelineId>,
    completed: bool,
}

impl SlideStackAnimation {
    pub fn new(config: SlideStackConfig) -> Self {
        Self {
            config,
            verses: Vec::new(),
            verse: 0,
            line: 0,
            visible: Vec::new(),
            nodes: None,
            scheduler: AnimationScheduler::new(),
            clearing: None,
            completed: false,
        }
    }

    pub fn config(&self) -> &SlideStackConfig {
        &self.config
    }

    /// Cursor as (verse index, line index)
    pub fn cursor(&self) -> (usize, usize) {
        (self.verse, self.line)
    }

    pub fn visible_lines(&self) -> &[NodeId] {
        &self.visible
    }

    /// Y offset of the visible line at `index` once the stack settles
    fn target_y(&self, index: usize) -> f32 {
        -LINE_HEIGHT * (self.visible.len() - index - 1) as f32
    }

    fn show_line(&mut self, nodes: Nodes, stage: &mut Stage) -> LineAdvance {
        let Some(content) = self
            .verses
            .get(self.verse)
            .and_then(|v| v.lines.get(self.line))
            .cloned()
        else {
            return LineAdvance::Exhausted;
        };

        // Snap the previous push so positions are settled.
        self.scheduler.finish_all(stage);

        let node = stage.add(nodes.lines, NodeKind::Text { content });
        let from_right = self.line % 2 == 1;
        let x = if from_right {
            self.config.slide_distance
        } else {
            -self.config.slide_distance
        };
        stage.set_position(node, Point::new(x, 0.0));
        stage.set(node, Property::Alpha, 0.0);
        self.visible.push(node);

        let mut tl = Timeline::new();
        let newest = self.visible.len() - 1;
        for (index, line) in self.visible.iter().enumerate().take(newest) {
            tl.to_at(
                Tween::new(*line, Property::Y, self.target_y(index), self.config.push_duration)
                    .ease(Easing::EaseInOutCubic),
                0.0,
            );
        }
        tl.to_at(
            Tween::new(node, Property::X, 0.0, self.config.slide_duration)
                .ease(Easing::EaseOutCubic),
            0.0,
        )
        .to_at(
            Tween::new(node, Property::Alpha, 1.0, self.config.slide_duration)
                .ease(Easing::EaseOutCubic),
            0.0,
        )
        .to_at(
            Tween::new(node, Property::Y, self.target_y(newest), self.config.push_duration)
                .ease(Easing::EaseInOutCubic),
            0.0,
        );
        self.update_panel(nodes, stage, &mut tl);
        self.scheduler.spawn(tl, stage);

        debug!(verse = self.verse, line = self.line, "line shown");
        self.line += 1;
        LineAdvance::Shown
    }

    /// Resize the panel around the visible lines, fading it in for the first
    /// line and out when nothing is left.
    fn update_panel(&self, nodes: Nodes, stage: &mut Stage, tl: &mut Timeline) {
        if self.visible.is_empty() {
            tl.to_at(
                Tween::new(nodes.panel, Property::Alpha, 0.0, PANEL_FADE)
                    .ease(Easing::EaseOutCubic),
                0.0,
            );
            return;
        }

        let widest = self
            .visible
            .iter()
            .filter_map(|id| match &stage.node(*id)?.kind {
                NodeKind::Text { content } => Some(content.chars().count() as f32 * GLYPH_WIDTH),
                _ => None,
            })
            .fold(0.0_f32, f32::max);
        let stacked = LINE_HEIGHT * self.visible.len() as f32;
        let rect = Rect::new(
            -widest / 2.0 - PANEL_PADDING,
            -stacked,
            widest + PANEL_PADDING * 2.0,
            stacked + PANEL_PADDING * 2.0,
        );
        if let Some(panel) = stage.node_mut(nodes.panel) {
            panel.kind = NodeKind::Panel {
                rect,
                corner_radius: PANEL_RADIUS,
                fill_alpha: PANEL_FILL,
            };
        }

        if self.visible.len() == 1 {
            stage.set(nodes.panel, Property::Alpha, 0.0);
            tl.to_at(
                Tween::new(nodes.panel, Property::Alpha, 1.0, PANEL_FADE)
                    .ease(Easing::EaseOutCubic),
                0.0,
            );
        }
    }

    /// Fade and slide every visible line away
    fn start_clear(&mut self, nodes: Nodes, stage: &mut Stage) {
        self.scheduler.finish_all(stage);
        let mut tl = Timeline::new();
        for line in &self.visible {
            let y = stage.get(*line, Property::Y).unwrap_or(0.0);
            tl.to_at(
                Tween::new(*line, Property::Alpha, 0.0, CLEAR_DURATION)
                    .ease(Easing::EaseInOutCubic),
                0.0,
            )
            .to_at(
                Tween::new(*line, Property::Y, y + LINE_HEIGHT, CLEAR_DURATION)
                    .ease(Easing::EaseInOutCubic),
                0.0,
            );
        }
        tl.to_at(
            Tween::new(nodes.panel, Property::Alpha, 0.0, CLEAR_DURATION)
                .ease(Easing::EaseInOutCubic),
            0.0,
        );
        self.clearing = Some(self.scheduler.spawn(tl, stage));
        debug!(verse = self.verse, lines = self.visible.len(), "verse clearing");
    }

    fn remove_visible(&mut self, stage: &mut Stage) {
        for line in self.visible.drain(..) {
            stage.remove(line);
        }
    }

    fn finish_clear(&mut self, nodes: Nodes, stage: &mut Stage) {
        self.clearing = None;
        self.remove_visible(stage);
        self.verse += 1;
        self.line = 0;
        self.show_line(nodes, stage);
    }
}

impl TextStrategy for SlideStackAnimation {
    fn name(&self) -> &'static str {
        "slidestack"
    }

    fn create_container(&mut self, layer: NodeId, stage: &mut Stage) {
        let surface = stage.surface();
        let root = stage.add_container(layer);
        stage.set_position(
            root,
            Point::new(surface.width / 2.0, surface.height - self.config.bottom_padding),
        );
        let panel = stage.add(
            root,
            NodeKind::Panel {
                rect: Rect::ZERO,
                corner_radius: PANEL_RADIUS,
                fill_alpha: PANEL_FILL,
            },
        );
        stage.set(panel, Property::Alpha, 0.0);
        let lines = stage.add_container(root);
        self.nodes = Some(Nodes { panel, lines });
    }

    fn set_verses(&mut self, verses: Vec<Verse>, stage: &mut Stage) {
        self.scheduler.cancel_all();
        self.clearing = None;
        self.remove_visible(stage);
        if let Some(nodes) = self.nodes {
            stage.set(nodes.panel, Property::Alpha, 0.0);
        }
        self.verses = verses;
        self.verse = 0;
        self.line = 0;
        self.completed = false;
    }

    fn advance_line(&mut self, stage: &mut Stage) -> LineAdvance {
        let Some(nodes) = self.nodes else {
            warn!("advance before the text container exists");
            return LineAdvance::Exhausted;
        };
        if self.completed {
            return LineAdvance::Exhausted;
        }
        if self.clearing.is_some() {
            return LineAdvance::Busy;
        }
        let Some(verse) = self.verses.get(self.verse) else {
            return LineAdvance::Exhausted;
        };
        if self.line < verse.lines.len() {
            return self.show_line(nodes, stage);
        }
        if self.verse + 1 < self.verses.len() {
            if self.visible.is_empty() {
                self.verse += 1;
                self.line = 0;
                return self.show_line(nodes, stage);
            }
            self.start_clear(nodes, stage);
            return LineAdvance::Clearing;
        }
        LineAdvance::Exhausted
    }

    fn has_more_content(&self) -> bool {
        if self.completed {
            return false;
        }
        if self.clearing.is_some() {
            return true;
        }
        match self.verses.get(self.verse) {
            Some(verse) => {
                self.line < verse.lines.len()
                    || self.verses[self.verse + 1..]
                        .iter()
                        .any(|v| !v.lines.is_empty())
            }
            None => false,
        }
    }

    fn tick(&mut self, dt: f32, stage: &mut Stage) {
        self.scheduler.tick(dt, stage);
        if let (Some(id), Some(nodes)) = (self.clearing, self.nodes) {
            if !self.scheduler.is_running(id) {
                self.finish_clear(nodes, stage);
            }
        }
    }

    fn is_active(&self) -> bool {
        self.clearing.is_some() || self.scheduler.has_active_animations()
    }

    fn complete(&mut self, stage: &mut Stage) {
        self.scheduler.cancel_all();
        self.clearing = None;
        self.remove_visible(stage);
        if let Some(nodes) = self.nodes {
            stage.set(nodes.panel, Property::Alpha, 0.0);
        }
        self.verse = self.verses.len();
        self.line = 0;
        self.completed = true;
        debug!("text track completed");
    }

    fn is_complete(&self) -> bool {
        self.completed || (!self.has_more_content() && !self.is_active())
    }
}
