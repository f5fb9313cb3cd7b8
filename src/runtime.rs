//! Animation runtime: the playback context for every group open in a session.
//!
//! Each active group is drawn as a sprite with its own position, scale,
//! frame rate and loop flag. Global controls (fps, scale, loop) are applied to
//! the focused sprite only, so sprites may run at different settings. A
//! session-wide gate pauses and resumes all of them together.
//!
//! Time is supplied by the caller through [`Runtime::tick`]; the runtime never
//! reads a clock, which keeps playback deterministic.

use std::collections::HashMap;
use std::time::Duration;

use image::{Pixel, Rgba, RgbaImage};

use crate::editor::PointerButton;
use crate::group::{AnimationGroup, GroupId};
use crate::view::Point;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

/// Scale change per wheel notch.
pub const SCALE_STEP: f64 = 0.1;

/// Playback defaults and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub fps: u32,
    pub scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub looping: bool,
    /// View size in pixels (width, height).
    pub view: (u32, u32),
    pub background: Rgba<u8>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            fps: 12,
            scale: 2.0,
            min_scale: 0.1,
            max_scale: 20.0,
            looping: true,
            view: (800, 600),
            background: Rgba([0x18, 0x18, 0x1b, 255]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    Stopped,
    #[default]
    Playing,
    Paused,
}

/// Render state of one active group.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Center of the sprite in view coordinates.
    pub position: Point,
    pub scale: f64,
    pub frame_rate: u32,
    pub looping: bool,
    pub state: PlayState,
    frame: usize,
    elapsed: Duration,
    frame_count: usize,
    frame_size: (u32, u32),
}

impl Sprite {
    /// Index of the frame currently shown.
    pub fn frame(&self) -> usize {
        self.frame
    }

    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.clamp(MIN_FPS, MAX_FPS) as f64)
    }

    /// On-screen size after scaling, at least one pixel per side.
    pub fn display_size(&self) -> (u32, u32) {
        let (w, h) = self.frame_size;
        (
            ((w as f64 * self.scale).round() as u32).max(1),
            ((h as f64 * self.scale).round() as u32).max(1),
        )
    }

    fn contains(&self, point: Point) -> bool {
        let (w, h) = self.display_size();
        let (half_w, half_h) = (w as f64 / 2.0, h as f64 / 2.0);
        (point.x - self.position.x).abs() <= half_w && (point.y - self.position.y).abs() <= half_h
    }

    fn advance(&mut self) {
        if self.frame + 1 < self.frame_count {
            self.frame += 1;
        } else if self.looping {
            self.frame = 0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    id: GroupId,
    /// Sprite center minus pointer position at grab time.
    offset: Point,
}

/// Playback context. One per session; holds no global state.
#[derive(Debug, Clone)]
pub struct Runtime {
    settings: PlaybackSettings,
    sprites: HashMap<GroupId, Sprite>,
    /// Activation order, which is also drawing order (last on top).
    order: Vec<GroupId>,
    focused: Option<GroupId>,
    global_playing: bool,
    drag: Option<Drag>,
}

impl Runtime {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            sprites: HashMap::new(),
            order: Vec::new(),
            focused: None,
            global_playing: true,
            drag: None,
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    fn view_center(&self) -> Point {
        let (w, h) = self.settings.view;
        Point::new(w as f64 / 2.0, h as f64 / 2.0)
    }

    /// Start playing a group. The new sprite is centered, uses the default
    /// scale and rate, and becomes focused.
    ///
    /// Returns `false` if the group was already active or has no frames.
    pub fn activate(&mut self, group: &AnimationGroup) -> bool {
        if self.sprites.contains_key(&group.id) {
            return false;
        }
        let Some(frame_size) = group.frames().frame_size() else {
            return false;
        };

        let sprite = Sprite {
            position: self.view_center(),
            scale: self.settings.scale.clamp(self.settings.min_scale, self.settings.max_scale),
            frame_rate: self.settings.fps.clamp(MIN_FPS, MAX_FPS),
            looping: self.settings.looping,
            state: if self.global_playing { PlayState::Playing } else { PlayState::Paused },
            frame: 0,
            elapsed: Duration::ZERO,
            frame_count: group.frame_count(),
            frame_size,
        };
        tracing::debug!(id = %group.id, frames = sprite.frame_count, "activated sprite");
        self.sprites.insert(group.id.clone(), sprite);
        self.order.push(group.id.clone());
        self.focused = Some(group.id.clone());
        true
    }

    /// Drop a group's sprite. It receives no further ticks.
    pub fn deactivate(&mut self, id: &GroupId) -> bool {
        if self.sprites.remove(id).is_none() {
            return false;
        }
        self.order.retain(|other| other != id);
        if self.focused.as_ref() == Some(id) {
            self.focused = self.order.last().cloned();
        }
        if self.drag.as_ref().is_some_and(|d| &d.id == id) {
            self.drag = None;
        }
        tracing::debug!(%id, "deactivated sprite");
        true
    }

    /// Pick up a group's new frame list after it was re-sliced.
    pub fn sync(&mut self, group: &AnimationGroup) {
        if let Some(sprite) = self.sprites.get_mut(&group.id) {
            sprite.frame_count = group.frame_count();
            sprite.frame_size = group.frames().frame_size().unwrap_or((0, 0));
            sprite.frame = 0;
            sprite.elapsed = Duration::ZERO;
        }
    }

    pub fn is_active(&self, id: &GroupId) -> bool {
        self.sprites.contains_key(id)
    }

    /// Active group ids in drawing order.
    pub fn active(&self) -> &[GroupId] {
        &self.order
    }

    pub fn sprite(&self, id: &GroupId) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    pub fn focused(&self) -> Option<&GroupId> {
        self.focused.as_ref()
    }

    pub fn focus(&mut self, id: &GroupId) -> bool {
        if self.sprites.contains_key(id) {
            self.focused = Some(id.clone());
            true
        } else {
            false
        }
    }

    fn focused_sprite_mut(&mut self) -> Option<&mut Sprite> {
        let id = self.focused.as_ref()?;
        self.sprites.get_mut(id)
    }

    pub fn is_playing(&self) -> bool {
        self.global_playing
    }

    /// Open or close the session-wide gate. Stopped sprites stay stopped.
    pub fn set_global_playing(&mut self, playing: bool) {
        self.global_playing = playing;
        for sprite in self.sprites.values_mut() {
            sprite.state = match (sprite.state, playing) {
                (PlayState::Stopped, _) => PlayState::Stopped,
                (_, true) => PlayState::Playing,
                (_, false) => PlayState::Paused,
            };
        }
    }

    /// Start (or resume) one sprite.
    pub fn play(&mut self, id: &GroupId) {
        let gate = self.global_playing;
        if let Some(sprite) = self.sprites.get_mut(id) {
            sprite.state = if gate { PlayState::Playing } else { PlayState::Paused };
        }
    }

    /// Stop one sprite and rewind it to the first frame.
    pub fn stop(&mut self, id: &GroupId) {
        if let Some(sprite) = self.sprites.get_mut(id) {
            sprite.state = PlayState::Stopped;
            sprite.frame = 0;
            sprite.elapsed = Duration::ZERO;
        }
    }

    /// Set the focused sprite's frame rate, clamped to 1..=60.
    pub fn set_fps(&mut self, fps: u32) {
        if let Some(sprite) = self.focused_sprite_mut() {
            sprite.frame_rate = fps.clamp(MIN_FPS, MAX_FPS);
        }
    }

    /// Set the focused sprite's scale, clamped to the configured range.
    pub fn set_scale(&mut self, scale: f64) {
        let (min, max) = (self.settings.min_scale, self.settings.max_scale);
        if let Some(sprite) = self.focused_sprite_mut() {
            sprite.scale = scale.clamp(min, max);
        }
    }

    pub fn set_loop(&mut self, looping: bool) {
        if let Some(sprite) = self.focused_sprite_mut() {
            sprite.looping = looping;
        }
    }

    /// Wheel over the view: grow (scroll up) or shrink the focused sprite by
    /// one step, rounded to one decimal.
    pub fn wheel(&mut self, delta_y: f64) {
        let (min, max) = (self.settings.min_scale, self.settings.max_scale);
        if let Some(sprite) = self.focused_sprite_mut() {
            let step = if delta_y > 0.0 { -SCALE_STEP } else { SCALE_STEP };
            let scale = ((sprite.scale + step) * 10.0).round() / 10.0;
            sprite.scale = scale.clamp(min, max);
        }
    }

    /// Topmost sprite under `point`.
    pub fn hit_test(&self, point: Point) -> Option<&GroupId> {
        self.order
            .iter()
            .rev()
            .find(|id| self.sprites.get(*id).is_some_and(|s| s.contains(point)))
    }

    /// Pointer pressed on the view. Primary grabs and focuses the sprite under
    /// the pointer; secondary recenters it. Returns the sprite hit.
    pub fn pointer_down(&mut self, point: Point, button: PointerButton) -> Option<GroupId> {
        let id = self.hit_test(point)?.clone();
        match button {
            PointerButton::Primary => {
                let position = self.sprites.get(&id)?.position;
                self.focused = Some(id.clone());
                self.drag = Some(Drag {
                    id: id.clone(),
                    offset: Point::new(position.x - point.x, position.y - point.y),
                });
            }
            PointerButton::Secondary => self.recenter(&id),
        }
        Some(id)
    }

    pub fn pointer_move(&mut self, point: Point) {
        let Some(drag) = &self.drag else {
            return;
        };
        if let Some(sprite) = self.sprites.get_mut(&drag.id) {
            sprite.position = Point::new(point.x + drag.offset.x, point.y + drag.offset.y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Move a sprite back to the middle of the view.
    pub fn recenter(&mut self, id: &GroupId) {
        let center = self.view_center();
        if let Some(sprite) = self.sprites.get_mut(id) {
            sprite.position = center;
        }
    }

    /// Advance playing sprites by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        for sprite in self.sprites.values_mut() {
            if sprite.state != PlayState::Playing || sprite.frame_count == 0 {
                continue;
            }
            let interval = sprite.interval();
            sprite.elapsed += dt;
            while sprite.elapsed >= interval {
                sprite.elapsed -= interval;
                sprite.advance();
            }
        }
    }

    /// Compose every active sprite onto a view-sized image.
    ///
    /// Sprites are drawn in activation order, scaled nearest-neighbour and
    /// anchored at their center. Groups missing from `groups` are skipped.
    pub fn render(&self, groups: &[AnimationGroup]) -> RgbaImage {
        let (w, h) = self.settings.view;
        let mut view = RgbaImage::from_pixel(w.max(1), h.max(1), self.settings.background);

        for id in &self.order {
            let (Some(sprite), Some(group)) = (self.sprites.get(id), groups.iter().find(|g| &g.id == id)) else {
                continue;
            };
            let Some(handle) = group.frames().handles().get(sprite.frame) else {
                continue;
            };
            let (dw, dh) = sprite.display_size();
            let x = (sprite.position.x - dw as f64 / 2.0).round() as i64;
            let y = (sprite.position.y - dh as f64 / 2.0).round() as i64;
            draw_scaled(&mut view, handle.image(), x, y, (dw, dh));
        }
        view
    }
}

/// Blend `src`, stretched nearest-neighbour to `size` with its top-left at
/// `(x, y)`, onto `view`. Only the part of the sprite inside the view is
/// sampled, so cost is bounded by the view size at any scale.
fn draw_scaled(view: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, size: (u32, u32)) {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = (i64::from(size.0), i64::from(size.1));
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + dw).min(i64::from(view.width()));
    let y1 = (y + dh).min(i64::from(view.height()));

    for vy in y0..y1 {
        let sy = ((vy - y) * i64::from(sh) / dh).min(i64::from(sh) - 1) as u32;
        for vx in x0..x1 {
            let sx = ((vx - x) * i64::from(sw) / dw).min(i64::from(sw) - 1) as u32;
            view.get_pixel_mut(vx as u32, vy as u32).blend(src.get_pixel(sx, sy));
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(PlaybackSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameSet;

    fn group(name: &str, frames: usize, size: u32) -> AnimationGroup {
        let images = (0..frames)
            .map(|i| RgbaImage::from_pixel(size, size, Rgba([i as u8 * 10, 0, 0, 255])))
            .collect();
        AnimationGroup::new(GroupId::generate(name), name, FrameSet::from_images(images).unwrap(), None)
    }

    fn twelfth() -> Duration {
        Duration::from_secs_f64(1.0 / 12.0)
    }

    #[test]
    fn test_new_sprite_defaults() {
        let mut rt = Runtime::default();
        let g = group("walk", 6, 32);
        assert!(rt.activate(&g));
        assert!(!rt.activate(&g));

        let sprite = rt.sprite(&g.id).unwrap();
        assert_eq!(sprite.position, Point::new(400.0, 300.0));
        assert_eq!(sprite.scale, 2.0);
        assert_eq!(sprite.frame_rate, 12);
        assert_eq!(sprite.state, PlayState::Playing);
        assert_eq!(rt.focused(), Some(&g.id));
    }

    #[test]
    fn test_activation_respects_closed_gate() {
        let mut rt = Runtime::default();
        rt.set_global_playing(false);
        let g = group("idle", 2, 8);
        rt.activate(&g);
        assert_eq!(rt.sprite(&g.id).unwrap().state, PlayState::Paused);
        rt.tick(Duration::from_secs(1));
        assert_eq!(rt.sprite(&g.id).unwrap().frame(), 0);
    }

    #[test]
    fn test_twelve_fps_advances_each_twelfth() {
        let mut rt = Runtime::default();
        let g = group("walk", 6, 32);
        rt.activate(&g);
        let mut shown = Vec::new();
        for _ in 0..8 {
            rt.tick(twelfth());
            shown.push(rt.sprite(&g.id).unwrap().frame());
        }
        assert_eq!(shown, vec![1, 2, 3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn test_non_looping_holds_last_frame() {
        let mut rt = Runtime::default();
        let g = group("jump", 3, 8);
        rt.activate(&g);
        rt.set_loop(false);
        rt.tick(Duration::from_secs(2));
        assert_eq!(rt.sprite(&g.id).unwrap().frame(), 2);
    }

    #[test]
    fn test_controls_apply_to_focused_only() {
        let mut rt = Runtime::default();
        let a = group("a", 4, 8);
        let b = group("b", 4, 8);
        rt.activate(&a);
        rt.activate(&b);
        rt.set_fps(24);
        rt.set_scale(5.0);
        assert_eq!(rt.sprite(&b.id).unwrap().frame_rate, 24);
        assert_eq!(rt.sprite(&a.id).unwrap().frame_rate, 12);
        assert_eq!(rt.sprite(&a.id).unwrap().scale, 2.0);

        rt.set_fps(500);
        assert_eq!(rt.sprite(&b.id).unwrap().frame_rate, MAX_FPS);
        rt.set_fps(0);
        assert_eq!(rt.sprite(&b.id).unwrap().frame_rate, MIN_FPS);
    }

    #[test]
    fn test_wheel_steps_and_clamps_scale() {
        let mut rt = Runtime::default();
        let g = group("g", 1, 8);
        rt.activate(&g);
        rt.wheel(-1.0);
        rt.wheel(-1.0);
        rt.wheel(1.0);
        assert_eq!(rt.sprite(&g.id).unwrap().scale, 2.1);
        for _ in 0..300 {
            rt.wheel(-1.0);
        }
        assert_eq!(rt.sprite(&g.id).unwrap().scale, 20.0);
        for _ in 0..300 {
            rt.wheel(1.0);
        }
        assert_eq!(rt.sprite(&g.id).unwrap().scale, 0.1);
    }

    #[test]
    fn test_drag_topmost_sprite() {
        let mut rt = Runtime::default();
        let below = group("below", 1, 16);
        let above = group("above", 1, 16);
        rt.activate(&below);
        rt.activate(&above);
        rt.focus(&below.id);

        // Both sit at the center; the later one is on top.
        let hit = rt.pointer_down(Point::new(405.0, 300.0), PointerButton::Primary);
        assert_eq!(hit.as_ref(), Some(&above.id));
        assert_eq!(rt.focused(), Some(&above.id));

        rt.pointer_move(Point::new(505.0, 350.0));
        rt.pointer_up();
        rt.pointer_move(Point::new(0.0, 0.0));
        assert_eq!(rt.sprite(&above.id).unwrap().position, Point::new(500.0, 350.0));
        assert_eq!(rt.sprite(&below.id).unwrap().position, Point::new(400.0, 300.0));

        assert_eq!(rt.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary), None);
    }

    #[test]
    fn test_secondary_recenters() {
        let mut rt = Runtime::default();
        let g = group("g", 1, 10);
        rt.activate(&g);
        rt.pointer_down(Point::new(400.0, 300.0), PointerButton::Primary);
        rt.pointer_move(Point::new(100.0, 100.0));
        rt.pointer_up();
        rt.pointer_down(Point::new(100.0, 100.0), PointerButton::Secondary);
        assert_eq!(rt.sprite(&g.id).unwrap().position, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_deactivate_stops_ticks() {
        let mut rt = Runtime::default();
        let a = group("a", 2, 8);
        let b = group("b", 2, 8);
        rt.activate(&a);
        rt.activate(&b);
        assert!(rt.deactivate(&b.id));
        assert!(!rt.deactivate(&b.id));
        assert_eq!(rt.focused(), Some(&a.id));
        rt.tick(twelfth());
        assert!(rt.sprite(&b.id).is_none());
        assert_eq!(rt.active(), &[a.id.clone()]);
    }

    #[test]
    fn test_gate_keeps_stopped_sprites_stopped() {
        let mut rt = Runtime::default();
        let g = group("g", 3, 8);
        rt.activate(&g);
        rt.tick(twelfth());
        rt.stop(&g.id);
        assert_eq!(rt.sprite(&g.id).unwrap().frame(), 0);
        rt.set_global_playing(false);
        rt.set_global_playing(true);
        assert_eq!(rt.sprite(&g.id).unwrap().state, PlayState::Stopped);
        rt.play(&g.id);
        assert_eq!(rt.sprite(&g.id).unwrap().state, PlayState::Playing);
    }

    #[test]
    fn test_render_draws_current_frame_scaled() {
        let settings = PlaybackSettings { view: (40, 40), background: Rgba([0, 0, 0, 255]), ..PlaybackSettings::default() };
        let mut rt = Runtime::new(settings);
        let g = group("g", 2, 4);
        rt.activate(&g);
        rt.tick(twelfth());

        let view = rt.render(std::slice::from_ref(&g));
        assert_eq!(view.dimensions(), (40, 40));
        // 4x4 frame at scale 2 covers 16..24 around the center.
        assert_eq!(*view.get_pixel(16, 16), Rgba([10, 0, 0, 255]));
        assert_eq!(*view.get_pixel(23, 23), Rgba([10, 0, 0, 255]));
        assert_eq!(*view.get_pixel(15, 15), Rgba([0, 0, 0, 255]));
        assert_eq!(*view.get_pixel(24, 24), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_render_large_frame_at_max_scale_samples_visible_part() {
        let settings = PlaybackSettings { view: (80, 60), max_scale: 20.0, ..PlaybackSettings::default() };
        let mut rt = Runtime::new(settings);
        // Left half red, right half blue.
        let frame = RgbaImage::from_fn(1024, 1024, |x, _| {
            if x < 512 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let g = AnimationGroup::new(GroupId::generate("big"), "big", FrameSet::from_images(vec![frame]).unwrap(), None);
        rt.activate(&g);
        rt.set_scale(20.0);
        assert_eq!(rt.sprite(&g.id).unwrap().display_size(), (20480, 20480));

        let view = rt.render(std::slice::from_ref(&g));
        assert_eq!(view.dimensions(), (80, 60));
        // The sprite is centered on (40, 30): its vertical midline splits the view.
        assert_eq!(*view.get_pixel(39, 30), Rgba([255, 0, 0, 255]));
        assert_eq!(*view.get_pixel(40, 30), Rgba([0, 0, 255, 255]));
        assert_eq!(*view.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*view.get_pixel(79, 59), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_render_blends_translucent_pixels_and_clips_offscreen() {
        let settings = PlaybackSettings { view: (10, 10), background: Rgba([0, 0, 0, 255]), ..PlaybackSettings::default() };
        let mut rt = Runtime::new(settings);
        let g = AnimationGroup::new(
            GroupId::generate("ghost"),
            "ghost",
            FrameSet::from_images(vec![RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]))]).unwrap(),
            None,
        );
        rt.activate(&g);
        rt.pointer_down(Point::new(5.0, 5.0), PointerButton::Primary);
        rt.pointer_move(Point::new(-50.0, -50.0));
        rt.pointer_up();

        let view = rt.render(std::slice::from_ref(&g));
        assert!(view.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }
}
