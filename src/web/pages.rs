use std::fmt::Write as _;

use crate::analyzer::Analysis;
use crate::chart::escape_markup;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: Helvetica, Arial, sans-serif; background: #191414; color: #ffffff; margin: 0; }}
        .container {{ max-width: 760px; margin: 0 auto; padding: 2rem; text-align: center; }}
        a.button, button {{ background: #1DB954; color: #ffffff; border: none; border-radius: 2rem; padding: 0.7rem 1.6rem; font-size: 1rem; text-decoration: none; cursor: pointer; }}
        input {{ padding: 0.6rem; font-size: 1rem; border-radius: 0.4rem; border: none; width: 60%; }}
        .error {{ color: #f85149; }}
        table {{ margin: 1.5rem auto; border-collapse: collapse; }}
        td, th {{ padding: 0.3rem 1rem; border-bottom: 1px solid #333333; }}
    </style>
</head>
<body>
<div class="container">
{body}
</div>
</body>
</html>"#,
        title = escape_markup(title),
    )
}

/// Landing page.
pub fn index() -> String {
    layout(
        "Playlist Genres",
        r#"<h1>Playlist Genres</h1>
<p>See which genres dominate one of your Spotify playlists.</p>
<a class="button" href="/login">Log in with Spotify</a>"#,
    )
}

/// Playlist name form, with an optional error above it.
pub fn analyze(error_message: Option<&str>) -> String {
    let mut body = String::from("<h1>Analyze a playlist</h1>\n");
    if let Some(message) = error_message {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_markup(message));
    }
    body.push_str(
        r#"<form method="post" action="/analyze">
    <input type="text" name="playlist_name" placeholder="Playlist name" required>
    <button type="submit">Analyze</button>
</form>
<p><a href="/logout">Log out</a></p>"#,
    );
    layout("Analyze a playlist", &body)
}

/// Chart and ranked table of an analysis.
pub fn show_genres(analysis: &Analysis) -> String {
    let name = escape_markup(&analysis.playlist_name);
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Top Genres in {name}</h1>");
    let _ = writeln!(
        body,
        r#"<img src="/images/{}" alt="Top genres in {name}">"#,
        escape_markup(&analysis.image_file)
    );

    if analysis.top.is_empty() {
        body.push_str("<p>No genres found for this playlist.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>#</th><th>Genre</th><th>Tracks</th></tr>\n");
        for (rank, entry) in analysis.top.iter().enumerate() {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                rank + 1,
                escape_markup(&entry.genre),
                entry.count
            );
        }
        body.push_str("</table>\n");
    }
    body.push_str(r#"<p><a class="button" href="/analyze">Analyze another playlist</a></p>"#);
    layout(&format!("Top Genres in {}", analysis.playlist_name), &body)
}
