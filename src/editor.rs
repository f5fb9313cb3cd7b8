//! Pixel editor session: turns discrete [`Command`] values into canvas edits.
//!
//! Pointer input is in screen units and goes through the view transform.
//! A pointer-down starts a gesture, pointer-moves continue it and the
//! pointer-up ends it; history is recorded once per finished gesture.

use image::Rgba;

use crate::canvas::{CanvasError, PaintOutcome, RasterCanvas, Tool};
use crate::color::{opaque, parse_color};
use crate::view::{Point, ViewTransform};

/// Starting entries of the recent-colors list.
pub const DEFAULT_RECENT_COLORS: [&str; 6] = ["#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#ffffff", "#000000"];

/// Default recent-colors capacity.
pub const DEFAULT_RECENT_CAP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Right button; paints as the eraser whatever the active tool is.
    Secondary,
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PointerDown { at: Point, button: PointerButton },
    PointerMove { at: Point },
    PointerUp,
    Wheel { delta_y: f64 },
    /// Hold (true) or release (false) the pan modifier.
    SetPanning(bool),
    SetTool(Tool),
    SetColor(Rgba<u8>),
    Undo,
    Reset,
    Copy,
    Paste,
    Resize(u32),
    Save,
    Close,
    OpenImport,
}

/// Requests the editor hands back to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Save,
    Close,
    OpenImport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Pan { last: Point },
    Draw { tool: Tool, dirty: bool },
    Move { start: Point },
}

/// Editor configuration.
#[derive(Debug, Clone)]
pub struct EditorSettings {
    pub grid_size: u32,
    pub history_cap: usize,
    pub recent_cap: usize,
    pub color: Rgba<u8>,
    pub display_size: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: 32,
            history_cap: crate::canvas::DEFAULT_HISTORY_CAP,
            recent_cap: DEFAULT_RECENT_CAP,
            color: Rgba([0x3b, 0x82, 0xf6, 255]),
            display_size: 512.0,
        }
    }
}

/// An open drawing session.
#[derive(Debug, Clone)]
pub struct Editor {
    canvas: RasterCanvas,
    view: ViewTransform,
    tool: Tool,
    color: Rgba<u8>,
    recent_colors: Vec<Rgba<u8>>,
    recent_cap: usize,
    panning: bool,
    gesture: Option<Gesture>,
}

impl Editor {
    pub fn new(settings: &EditorSettings) -> Result<Self, CanvasError> {
        let recent_cap = settings.recent_cap.max(1);
        let recent_colors = DEFAULT_RECENT_COLORS
            .iter()
            .filter_map(|c| parse_color(c).ok())
            .take(recent_cap)
            .collect();
        Ok(Self {
            canvas: RasterCanvas::new(settings.grid_size, settings.history_cap)?,
            view: ViewTransform::new(settings.display_size),
            tool: Tool::Pen,
            color: opaque(settings.color),
            recent_colors,
            recent_cap,
            panning: false,
            gesture: None,
        })
    }

    pub fn canvas(&self) -> &RasterCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut RasterCanvas {
        &mut self.canvas
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    /// Recently used pen colors, newest first.
    pub fn recent_colors(&self) -> &[Rgba<u8>] {
        &self.recent_colors
    }

    fn remember_color(&mut self, color: Rgba<u8>) {
        if self.recent_colors.first() == Some(&color) {
            return;
        }
        self.recent_colors.retain(|c| *c != color);
        self.recent_colors.insert(0, color);
        self.recent_colors.truncate(self.recent_cap);
    }

    /// Apply one command. Returns an effect the host must act on, if any.
    pub fn apply(&mut self, command: Command) -> Result<Option<Effect>, CanvasError> {
        match command {
            Command::PointerDown { at, button } => self.pointer_down(at, button),
            Command::PointerMove { at } => self.pointer_move(at),
            Command::PointerUp => self.pointer_up(),
            Command::Wheel { delta_y } => self.view.wheel(delta_y),
            Command::SetPanning(on) => self.panning = on,
            Command::SetTool(tool) => self.tool = tool,
            Command::SetColor(color) => self.color = opaque(color),
            Command::Undo => {
                self.finish_gesture();
                self.canvas.undo();
            }
            Command::Reset => {
                self.finish_gesture();
                self.canvas.reset();
            }
            Command::Copy => self.canvas.copy(),
            Command::Paste => {
                self.finish_gesture();
                self.canvas.paste();
            }
            Command::Resize(size) => {
                self.finish_gesture();
                self.canvas.resize(size)?;
            }
            Command::Save => return Ok(Some(Effect::Save)),
            Command::Close => return Ok(Some(Effect::Close)),
            Command::OpenImport => return Ok(Some(Effect::OpenImport)),
        }
        Ok(None)
    }

    fn pointer_down(&mut self, at: Point, button: PointerButton) {
        // A down without an up (lost pointer capture) ends the old gesture first.
        self.finish_gesture();

        if self.panning {
            self.gesture = Some(Gesture::Pan { last: at });
            return;
        }

        if self.tool == Tool::Move && button == PointerButton::Primary {
            self.canvas.begin_move();
            self.gesture = Some(Gesture::Move { start: at });
            return;
        }

        let tool = match button {
            PointerButton::Secondary => Tool::Eraser,
            PointerButton::Primary => self.tool,
        };
        let dirty = self.paint_at(at, tool);
        self.gesture = Some(Gesture::Draw { tool, dirty });
    }

    fn pointer_move(&mut self, at: Point) {
        match self.gesture {
            Some(Gesture::Pan { last }) => {
                self.view.pan_by(at.x - last.x, at.y - last.y);
                self.gesture = Some(Gesture::Pan { last: at });
            }
            Some(Gesture::Move { start }) => {
                let (dx, dy) = self.view.drag_offset(start, at, self.canvas.grid_size());
                self.canvas.move_to(dx, dy);
            }
            Some(Gesture::Draw { tool: tool @ (Tool::Pen | Tool::Eraser), dirty }) => {
                let changed = self.paint_at(at, tool);
                self.gesture = Some(Gesture::Draw { tool, dirty: dirty || changed });
            }
            _ => {}
        }
    }

    fn pointer_up(&mut self) {
        self.finish_gesture();
    }

    fn finish_gesture(&mut self) {
        match self.gesture.take() {
            Some(Gesture::Move { .. }) => {
                self.canvas.end_move();
            }
            Some(Gesture::Draw { tool: Tool::Eyedropper, .. }) => {
                self.tool = Tool::Pen;
            }
            Some(Gesture::Draw { dirty: true, .. }) => self.canvas.commit(),
            _ => {}
        }
    }

    /// Paint at a screen point. Returns whether pixels changed.
    fn paint_at(&mut self, at: Point, tool: Tool) -> bool {
        let (x, y) = self.view.screen_to_pixel(at, self.canvas.grid_size());
        match self.canvas.paint(x, y, tool, self.color) {
            PaintOutcome::Changed => {
                if tool == Tool::Pen {
                    self.remember_color(self.color);
                }
                true
            }
            PaintOutcome::Picked(color) => {
                self.color = opaque(color);
                false
            }
            PaintOutcome::Unchanged => false,
        }
    }

    /// Screen point at the center of canvas pixel `(x, y)` under the current view.
    pub fn pixel_center(&self, x: i64, y: i64) -> Point {
        self.view.pixel_to_screen(x, y, self.canvas.grid_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TRANSPARENT;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0x3b, 0x82, 0xf6, 255]);

    fn editor(size: u32) -> Editor {
        Editor::new(&EditorSettings { grid_size: size, ..EditorSettings::default() }).unwrap()
    }

    fn click(e: &mut Editor, x: i64, y: i64, button: PointerButton) {
        let at = e.pixel_center(x, y);
        e.apply(Command::PointerDown { at, button }).unwrap();
        e.apply(Command::PointerUp).unwrap();
    }

    fn drag(e: &mut Editor, from: (i64, i64), to: &[(i64, i64)]) {
        let at = e.pixel_center(from.0, from.1);
        e.apply(Command::PointerDown { at, button: PointerButton::Primary }).unwrap();
        for &(x, y) in to {
            let at = e.pixel_center(x, y);
            e.apply(Command::PointerMove { at }).unwrap();
        }
        e.apply(Command::PointerUp).unwrap();
    }

    #[test]
    fn test_stroke_commits_once() {
        let mut e = editor(8);
        e.apply(Command::SetColor(RED)).unwrap();
        drag(&mut e, (0, 0), &[(1, 0), (2, 0), (3, 0)]);
        assert_eq!(e.canvas().history_len(), 2);
        for x in 0..4 {
            assert_eq!(*e.canvas().buffer().get_pixel(x, 0), RED);
        }
        e.apply(Command::Undo).unwrap();
        assert!(e.canvas().buffer().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_failed_resize_keeps_open_stroke() {
        let mut e = editor(8);
        e.apply(Command::SetColor(RED)).unwrap();
        let at = e.pixel_center(2, 3);
        e.apply(Command::PointerDown { at, button: PointerButton::Primary }).unwrap();

        assert_eq!(e.apply(Command::Resize(0)), Err(CanvasError::InvalidSize(0)));
        assert_eq!(e.canvas().grid_size(), 8);
        assert_eq!(*e.canvas().buffer().get_pixel(2, 3), RED);
        assert_eq!(e.canvas().history_len(), 2);

        e.apply(Command::Undo).unwrap();
        assert!(e.canvas().buffer().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_resize_during_move_drops_move_state() {
        let mut e = editor(4);
        click(&mut e, 0, 0, PointerButton::Primary);
        e.apply(Command::SetTool(Tool::Move)).unwrap();
        let at = e.pixel_center(0, 0);
        e.apply(Command::PointerDown { at, button: PointerButton::Primary }).unwrap();
        let to = e.pixel_center(1, 1);
        e.apply(Command::PointerMove { at: to }).unwrap();

        e.apply(Command::Resize(6)).unwrap();
        assert_eq!(e.canvas().grid_size(), 6);
        assert_eq!(e.canvas().history_len(), 1);
        // Later pointer traffic belongs to no gesture.
        e.apply(Command::PointerMove { at: to }).unwrap();
        e.apply(Command::PointerUp).unwrap();
        assert!(e.canvas().buffer().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_noop_click_does_not_commit() {
        let mut e = editor(8);
        click(&mut e, 0, 0, PointerButton::Secondary);
        assert_eq!(e.canvas().history_len(), 1);
    }

    #[test]
    fn test_secondary_button_erases() {
        let mut e = editor(4);
        click(&mut e, 1, 1, PointerButton::Primary);
        click(&mut e, 1, 1, PointerButton::Secondary);
        assert_eq!(*e.canvas().buffer().get_pixel(1, 1), TRANSPARENT);
        assert_eq!(e.tool(), Tool::Pen);
    }

    #[test]
    fn test_bucket_scenario() {
        let mut e = editor(16);
        e.apply(Command::SetTool(Tool::Bucket)).unwrap();
        e.apply(Command::SetColor(BLUE)).unwrap();
        click(&mut e, 8, 8, PointerButton::Primary);
        assert!(e.canvas().buffer().pixels().all(|p| *p == BLUE));
        assert_eq!(e.canvas().history_len(), 2);
    }

    #[test]
    fn test_eyedropper_is_one_shot() {
        let mut e = editor(4);
        e.apply(Command::SetColor(RED)).unwrap();
        click(&mut e, 0, 0, PointerButton::Primary);
        e.apply(Command::SetColor(BLUE)).unwrap();

        e.apply(Command::SetTool(Tool::Eyedropper)).unwrap();
        click(&mut e, 0, 0, PointerButton::Primary);
        assert_eq!(e.color(), RED);
        assert_eq!(e.tool(), Tool::Pen);
        assert_eq!(e.canvas().history_len(), 2);
    }

    #[test]
    fn test_eyedropper_ignores_transparent_pixel() {
        let mut e = editor(4);
        e.apply(Command::SetTool(Tool::Eyedropper)).unwrap();
        click(&mut e, 3, 3, PointerButton::Primary);
        assert_eq!(e.color(), BLUE);
        assert_eq!(e.tool(), Tool::Pen);
    }

    #[test]
    fn test_move_gesture_translates_from_start() {
        let mut e = editor(8);
        e.apply(Command::SetColor(RED)).unwrap();
        click(&mut e, 2, 2, PointerButton::Primary);
        e.apply(Command::SetTool(Tool::Move)).unwrap();
        drag(&mut e, (0, 0), &[(1, 0), (2, 1), (3, 1)]);
        assert_eq!(*e.canvas().buffer().get_pixel(5, 3), RED);
        assert_eq!(e.canvas().buffer().pixels().filter(|p| p.0[3] != 0).count(), 1);
        assert_eq!(e.canvas().history_len(), 3);
        e.apply(Command::Undo).unwrap();
        assert_eq!(*e.canvas().buffer().get_pixel(2, 2), RED);
    }

    #[test]
    fn test_panning_moves_view_not_pixels() {
        let mut e = editor(8);
        e.apply(Command::SetPanning(true)).unwrap();
        e.apply(Command::PointerDown { at: Point::new(10.0, 10.0), button: PointerButton::Primary }).unwrap();
        e.apply(Command::PointerMove { at: Point::new(40.0, 30.0) }).unwrap();
        e.apply(Command::PointerUp).unwrap();
        e.apply(Command::SetPanning(false)).unwrap();
        assert_eq!(e.view().pan, Point::new(30.0, 20.0));
        assert!(e.canvas().buffer().pixels().all(|p| p.0[3] == 0));
        assert_eq!(e.canvas().history_len(), 1);
    }

    #[test]
    fn test_pointer_mapping_follows_zoom() {
        let mut e = editor(8);
        e.apply(Command::Wheel { delta_y: -1.0 }).unwrap();
        assert!((e.view().zoom - 1.1).abs() < 1e-9);
        e.apply(Command::SetColor(RED)).unwrap();
        click(&mut e, 7, 7, PointerButton::Primary);
        assert_eq!(*e.canvas().buffer().get_pixel(7, 7), RED);
    }

    #[test]
    fn test_recent_colors_most_recent_first() {
        let mut e = Editor::new(&EditorSettings { grid_size: 8, recent_cap: 3, ..EditorSettings::default() }).unwrap();
        assert_eq!(e.recent_colors().len(), 3);
        let green = Rgba([0x10, 0xb9, 0x81, 255]);
        for (i, color) in [RED, green, RED].into_iter().enumerate() {
            e.apply(Command::SetColor(color)).unwrap();
            click(&mut e, i as i64, 0, PointerButton::Primary);
        }
        assert_eq!(e.recent_colors(), &[RED, green, BLUE]);
    }

    #[test]
    fn test_host_effects() {
        let mut e = editor(4);
        assert_eq!(e.apply(Command::Save).unwrap(), Some(Effect::Save));
        assert_eq!(e.apply(Command::Close).unwrap(), Some(Effect::Close));
        assert_eq!(e.apply(Command::OpenImport).unwrap(), Some(Effect::OpenImport));
        assert_eq!(e.apply(Command::Copy).unwrap(), None);
    }

    #[test]
    fn test_resize_command() {
        let mut e = editor(4);
        click(&mut e, 0, 0, PointerButton::Primary);
        e.apply(Command::Resize(12)).unwrap();
        assert_eq!(e.canvas().grid_size(), 12);
        assert_eq!(e.canvas().history_len(), 1);
        assert!(e.apply(Command::Resize(0)).is_err());
    }
}
