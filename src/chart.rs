//! SVG pie chart of a playlist's top genres.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::path::Path;

use log::debug;
use uuid::Uuid;

use crate::clients::errors::Result;
use crate::genres::TopGenres;

const SIZE: f64 = 640.0;
const RADIUS: f64 = 220.0;
const CENTER_X: f64 = SIZE / 2.0;
const CENTER_Y: f64 = SIZE / 2.0 + 20.0;
// degrees, measured counter-clockwise from 3 o'clock
const START_ANGLE: f64 = 140.0;
const SPOTIFY_GREEN: &str = "#1DB954";
const SPOTIFY_BLACK: &str = "#191414";
const COLORS: [&str; 2] = [SPOTIFY_GREEN, SPOTIFY_BLACK];

/// Escapes text for use inside XML/HTML content and attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn point(angle_deg: f64, radius: f64) -> (f64, f64) {
    let rad = angle_deg * PI / 180.0;
    // SVG y grows downwards
    (CENTER_X + radius * rad.cos(), CENTER_Y - radius * rad.sin())
}

/// Renders the ranked genres as a standalone SVG document.
///
/// Wedges start at 140 degrees and run counter-clockwise in rank order. An empty
/// table still yields a valid document with a notice instead of wedges.
pub fn render_pie_chart(top: &TopGenres, playlist_name: &str) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}" font-family="Helvetica, Arial, sans-serif">"#
    );
    let _ = write!(
        svg,
        r#"<text x="{CENTER_X}" y="40" text-anchor="middle" font-size="22" fill="white">Top Genres in {}</text>"#,
        escape_markup(playlist_name)
    );

    let total = f64::from(top.total());
    if top.is_empty() || total == 0.0 {
        let _ = write!(
            svg,
            r#"<text x="{CENTER_X}" y="{CENTER_Y}" text-anchor="middle" font-size="18" fill="white">No genres found</text>"#
        );
        svg.push_str("</svg>");
        return svg;
    }

    let mut start = START_ANGLE;
    for (i, entry) in top.iter().enumerate() {
        let share = f64::from(entry.count) / total;
        let sweep = share * 360.0;
        let end = start + sweep;
        let color = COLORS[i % COLORS.len()];

        if top.len() == 1 {
            let _ = write!(
                svg,
                r#"<circle cx="{CENTER_X}" cy="{CENTER_Y}" r="{RADIUS}" fill="{color}"/>"#
            );
        } else {
            let (x1, y1) = point(start, RADIUS);
            let (x2, y2) = point(end, RADIUS);
            let large_arc = u8::from(sweep > 180.0);
            // sweep-flag 0 draws counter-clockwise on screen
            let _ = write!(
                svg,
                r#"<path d="M {CENTER_X:.2} {CENTER_Y:.2} L {x1:.2} {y1:.2} A {RADIUS} {RADIUS} 0 {large_arc} 0 {x2:.2} {y2:.2} Z" fill="{color}" stroke="white" stroke-width="1"/>"#
            );
        }

        let mid = start + sweep / 2.0;
        let (px, py) = point(mid, RADIUS * 0.6);
        let _ = write!(
            svg,
            r#"<text x="{px:.2}" y="{py:.2}" text-anchor="middle" font-size="13" fill="white">{:.1}%</text>"#,
            share * 100.0
        );

        let (lx, ly) = point(mid, RADIUS * 1.1);
        let anchor = if mid.to_radians().cos() >= 0.0 {
            "start"
        } else {
            "end"
        };
        let _ = write!(
            svg,
            r#"<text x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}" font-size="14" fill="white">{}</text>"#,
            escape_markup(&entry.genre)
        );

        start = end;
    }

    svg.push_str("</svg>");
    svg
}

/// Writes the chart under `dir` with a random file name and returns that name.
pub async fn save_chart(dir: &Path, top: &TopGenres, playlist_name: &str) -> Result<String> {
    tokio::fs::create_dir_all(dir).await?;
    let file_name = format!("{}.svg", Uuid::new_v4());
    let path = dir.join(&file_name);
    tokio::fs::write(&path, render_pie_chart(top, playlist_name)).await?;
    debug!("Saved genre chart to {path:?}");
    Ok(file_name)
}
