//! Line-oriented text form of editor commands, used by `pxs draw`.
//!
//! ```text
//! # blue dot, then fill the rest red
//! color #3b82f6
//! paint 4 4
//! tool bucket
//! color red
//! paint 0 0
//! key ctrl+s
//! ```
//!
//! `down`/`move` take screen coordinates and go through the view transform
//! like real pointer input. `paint` and `drag` take canvas pixel
//! coordinates and are expanded to pointer events at pixel centers.

use image::Rgba;
use thiserror::Error;

use crate::canvas::{CanvasError, Tool};
use crate::color::parse_color;
use crate::editor::{Command, Editor, Effect, PointerButton};
use crate::keymap::{command_for, parse_chord};
use crate::view::Point;

/// Error type for script parsing and execution.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: {source}")]
    Canvas {
        line: usize,
        #[source]
        source: CanvasError,
    },
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A command sent to the editor as is.
    Command(Command),
    /// Pointer down and up at the center of a canvas pixel.
    Paint { x: i64, y: i64, button: PointerButton },
    /// Pointer down at one pixel center, move to another, release.
    Drag { from: (i64, i64), to: (i64, i64) },
    /// A key press without a binding; kept so scripts may carry extra keys.
    Unbound(String),
}

/// A parsed script: steps paired with their 1-based line numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<(usize, Step)>,
}

fn parse_err(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::Parse { line, message: message.into() }
}

fn number<T: std::str::FromStr>(line: usize, word: Option<&str>, what: &str) -> Result<T, ScriptError> {
    let word = word.ok_or_else(|| parse_err(line, format!("missing {}", what)))?;
    word.parse().map_err(|_| parse_err(line, format!("invalid {} '{}'", what, word)))
}

fn button(line: usize, word: Option<&str>) -> Result<PointerButton, ScriptError> {
    match word {
        None | Some("primary") | Some("left") => Ok(PointerButton::Primary),
        Some("secondary") | Some("right") => Ok(PointerButton::Secondary),
        Some(other) => Err(parse_err(line, format!("unknown button '{}'", other))),
    }
}

/// Parse one non-blank, non-comment line.
pub fn parse_line(text: &str, line: usize) -> Result<Step, ScriptError> {
    let mut words = text.split_whitespace();
    let Some(op) = words.next() else {
        return Err(parse_err(line, "empty line"));
    };

    let step = match op.to_ascii_lowercase().as_str() {
        "tool" => {
            let name = words.next().ok_or_else(|| parse_err(line, "missing tool name"))?;
            let tool = Tool::from_name(name).ok_or_else(|| parse_err(line, format!("unknown tool '{}'", name)))?;
            Step::Command(Command::SetTool(tool))
        }
        "color" => {
            // Colors such as `rgb(1, 2, 3)` contain spaces.
            let rest = text.trim_start()[op.len()..].trim();
            if rest.is_empty() {
                return Err(parse_err(line, "missing color"));
            }
            let color: Rgba<u8> = parse_color(rest).map_err(|e| parse_err(line, e.to_string()))?;
            return Ok(Step::Command(Command::SetColor(color)));
        }
        "down" => {
            let x = number(line, words.next(), "x")?;
            let y = number(line, words.next(), "y")?;
            let button = button(line, words.next())?;
            Step::Command(Command::PointerDown { at: Point::new(x, y), button })
        }
        "move" => {
            let x = number(line, words.next(), "x")?;
            let y = number(line, words.next(), "y")?;
            Step::Command(Command::PointerMove { at: Point::new(x, y) })
        }
        "up" => Step::Command(Command::PointerUp),
        "wheel" => Step::Command(Command::Wheel { delta_y: number(line, words.next(), "delta")? }),
        "resize" => Step::Command(Command::Resize(number(line, words.next(), "size")?)),
        "paint" => {
            let x = number(line, words.next(), "x")?;
            let y = number(line, words.next(), "y")?;
            let button = button(line, words.next())?;
            Step::Paint { x, y, button }
        }
        "drag" => {
            let from = (number(line, words.next(), "x0")?, number(line, words.next(), "y0")?);
            let to = (number(line, words.next(), "x1")?, number(line, words.next(), "y1")?);
            Step::Drag { from, to }
        }
        "key" | "keyup" => {
            let pressed = op.eq_ignore_ascii_case("key");
            let text = words.next().ok_or_else(|| parse_err(line, "missing key"))?;
            let chord = parse_chord(text).ok_or_else(|| parse_err(line, format!("invalid key '{}'", text)))?;
            match command_for(chord, pressed) {
                Some(command) => Step::Command(command),
                None => Step::Unbound(chord.to_string()),
            }
        }
        other => return Err(parse_err(line, format!("unknown command '{}'", other))),
    };

    if let Some(extra) = words.next() {
        return Err(parse_err(line, format!("unexpected argument '{}'", extra)));
    }
    Ok(step)
}

/// Parse a whole script. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Script, ScriptError> {
    let mut steps = Vec::new();
    for (index, text) in source.lines().enumerate() {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        steps.push((index + 1, parse_line(trimmed, index + 1)?));
    }
    Ok(Script { steps })
}

fn apply(editor: &mut Editor, line: usize, command: Command) -> Result<Option<Effect>, ScriptError> {
    editor.apply(command).map_err(|source| ScriptError::Canvas { line, source })
}

/// Run `script` against `editor`.
///
/// `on_effect` is called for every effect with the editor as it is at that
/// point; returning `false` stops the run. Returns the number of steps run.
pub fn run<F>(editor: &mut Editor, script: &Script, mut on_effect: F) -> Result<usize, ScriptError>
where
    F: FnMut(&Editor, Effect) -> bool,
{
    for (done, (line, step)) in script.steps.iter().enumerate() {
        let line = *line;
        let effect = match step {
            Step::Command(command) => apply(editor, line, command.clone())?,
            Step::Paint { x, y, button } => {
                let at = editor.pixel_center(*x, *y);
                apply(editor, line, Command::PointerDown { at, button: *button })?;
                apply(editor, line, Command::PointerUp)?
            }
            Step::Drag { from, to } => {
                let start = editor.pixel_center(from.0, from.1);
                let end = editor.pixel_center(to.0, to.1);
                apply(editor, line, Command::PointerDown { at: start, button: PointerButton::Primary })?;
                apply(editor, line, Command::PointerMove { at: end })?;
                apply(editor, line, Command::PointerUp)?
            }
            Step::Unbound(key) => {
                tracing::debug!(line, key = %key, "key has no binding");
                None
            }
        };

        if let Some(effect) = effect {
            if !on_effect(editor, effect) {
                return Ok(done + 1);
            }
        }
    }
    Ok(script.steps.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorSettings;

    fn editor(size: u32) -> Editor {
        Editor::new(&EditorSettings { grid_size: size, ..EditorSettings::default() }).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        let script = parse_script(
            "# comment\n\
             tool bucket\n\
             color rgb(255, 0, 0)\n\
             \n\
             down 10.5 20 secondary\n\
             move 11 21\n\
             up\n\
             wheel -1\n\
             key ctrl+z\n\
             keyup space\n\
             resize 16\n",
        )
        .unwrap();
        let steps: Vec<_> = script.steps.iter().map(|(_, s)| s.clone()).collect();
        assert_eq!(
            steps,
            vec![
                Step::Command(Command::SetTool(Tool::Bucket)),
                Step::Command(Command::SetColor(Rgba([255, 0, 0, 255]))),
                Step::Command(Command::PointerDown { at: Point::new(10.5, 20.0), button: PointerButton::Secondary }),
                Step::Command(Command::PointerMove { at: Point::new(11.0, 21.0) }),
                Step::Command(Command::PointerUp),
                Step::Command(Command::Wheel { delta_y: -1.0 }),
                Step::Command(Command::Undo),
                Step::Command(Command::SetPanning(false)),
                Step::Command(Command::Resize(16)),
            ]
        );
        assert_eq!(script.steps[0].0, 2);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_script("tool pen\n\ntool lasso\n").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 3, .. }));
        assert!(err.to_string().contains("lasso"));

        assert!(parse_script("paint 1").is_err());
        assert!(parse_script("paint 1 2 3").is_err());
        assert!(parse_script("color").is_err());
        assert!(parse_script("color notacolor").is_err());
        assert!(parse_script("jump 1 2").is_err());
    }

    #[test]
    fn test_unbound_key_is_kept() {
        let script = parse_script("key ctrl+k").unwrap();
        assert_eq!(script.steps[0].1, Step::Unbound("ctrl+k".to_string()));
    }

    #[test]
    fn test_run_paint_and_fill() {
        let mut e = editor(16);
        let script = parse_script("color #ff0000\npaint 0 0\ntool bucket\ncolor #3b82f6\npaint 8 8\n").unwrap();
        let steps = run(&mut e, &script, |_, _| true).unwrap();
        assert_eq!(steps, 5);
        let buffer = e.canvas().buffer();
        assert_eq!(*buffer.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(buffer.pixels().filter(|p| **p == Rgba([0x3b, 0x82, 0xf6, 255])).count(), 255);
    }

    #[test]
    fn test_run_drag_with_move_tool() {
        let mut e = editor(8);
        let script = parse_script("paint 1 1\ntool move\ndrag 0 0 2 3\n").unwrap();
        run(&mut e, &script, |_, _| true).unwrap();
        assert_eq!(e.canvas().buffer().get_pixel(3, 4).0[3], 255);
        assert_eq!(e.canvas().buffer().get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn test_close_stops_run() {
        let mut e = editor(4);
        let script = parse_script("paint 0 0\nkey ctrl+s\nkey ctrl+x\npaint 1 1\n").unwrap();
        let mut seen = Vec::new();
        let steps = run(&mut e, &script, |_, effect| {
            seen.push(effect);
            effect != Effect::Close
        })
        .unwrap();
        assert_eq!(steps, 3);
        assert_eq!(seen, vec![Effect::Save, Effect::Close]);
        assert_eq!(e.canvas().buffer().get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn test_resize_error_reports_line() {
        let mut e = editor(4);
        let script = parse_script("paint 0 0\nresize 0\n").unwrap();
        let err = run(&mut e, &script, |_, _| true).unwrap_err();
        assert!(matches!(err, ScriptError::Canvas { line: 2, source: CanvasError::InvalidSize(0) }));
    }
}
