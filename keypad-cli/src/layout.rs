//! Render the keypad layout: a text grid for the terminal and an HTML/SVG
//! drawing with legends, codes and matrix positions.
//!
//! Both show the pad as seen from the front. The matrix is wired
//! column-major, so face row `r` is matrix column `r`.

use keypad_core::layout::{code_at, legend};
use keypad_core::{COLS, ROWS};

/// Key unit size in SVG pixels.
const U: f64 = 64.0;
/// Gap between keys.
const GAP: f64 = 6.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 6.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

/// Key code at a position on the face of the pad.
fn face_code(face_row: usize, face_col: usize) -> Option<u8> {
    code_at(face_col, face_row)
}

/// The 4x4 grid, one cell per key: legend and code.
pub fn render_text() -> String {
    let mut text = String::new();
    let rule = format!("+{}\n", "--------+".repeat(ROWS));

    text.push_str(&rule);
    for face_row in 0..COLS {
        text.push('|');
        for face_col in 0..ROWS {
            let cell = match face_code(face_row, face_col) {
                Some(code) => format!(" {} = {:2} ", legend(code).unwrap_or('?'), code),
                None => " ".repeat(8),
            };
            text.push_str(&cell);
            text.push('|');
        }
        text.push('\n');
        text.push_str(&rule);
    }
    text
}

fn render_keys() -> String {
    let mut svg = String::new();

    for face_row in 0..COLS {
        for face_col in 0..ROWS {
            let Some(code) = face_code(face_row, face_col) else {
                continue;
            };
            let x = MARGIN + face_col as f64 * S;
            let y = MARGIN + face_row as f64 * S;
            let label = legend(code).unwrap_or('?');
            // Letter column gets its own colour, like on the physical pad.
            let class = if label.is_ascii_alphabetic() {
                "key letter"
            } else {
                "key"
            };

            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="{class}"/>"#
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label">{}</text>"#,
                x + U / 2.0,
                y + U / 2.0 - 4.0,
                html_escape(&label.to_string()),
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="code">{code} ({face_col},{face_row})</text>"#,
                x + U / 2.0,
                y + U - 10.0,
            ));
        }
    }
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let width = 2.0 * MARGIN + ROWS as f64 * S - GAP;
    let height = 2.0 * MARGIN + COLS as f64 * S - GAP;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Keypad Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key.letter {{
    fill: #2d1b4e;
    stroke: #e94560;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 22px;
    text-anchor: middle;
    dominant-baseline: middle;
  }}
  .code {{
    fill: #8892b0;
    font-size: 10px;
    text-anchor: middle;
  }}
</style>
</head>
<body>
<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    html.push_str(&render_keys());
    html.push_str("\n</svg>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_grid_rows() {
        let text = render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 * COLS + 1);
        assert_eq!(lines[1], "| 1 =  1 | 2 =  2 | 3 =  3 | A =  4 |");
        assert_eq!(lines[7], "| * = 13 | 0 = 14 | # = 15 | D = 16 |");
    }

    #[test]
    fn test_html_has_every_key() {
        let html = generate_html();
        assert_eq!(html.matches("<rect").count(), ROWS * COLS);
        assert_eq!(html.matches("key letter").count(), 4);
        // Matrix position of '#': row 2, column 3.
        assert!(html.contains(">15 (2,3)<"));
    }
}
