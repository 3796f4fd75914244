//! Printable HTML export of a storyboard.
//!
//! Produces one standalone document: a grid of shot cards, each showing the
//! generated image (or a placeholder), the shot number, duration, title, and
//! camera angle, framed at the project's aspect ratio. The document triggers
//! `window.print()` when it opens. Pure string building, no I/O.

use std::fmt::Write;

use crate::store::{Project, Shot, Storyboard};

/// Escapes text for interpolation into HTML content and attributes.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_shot_card(html: &mut String, shot: &Shot) {
    html.push_str("    <article class=\"shot\">\n");
    match &shot.image_url {
        Some(url) => {
            let _ = writeln!(
                html,
                "      <img class=\"frame\" src=\"{}\" alt=\"Shot {}\">",
                escape_html(url),
                shot.number
            );
        }
        None => {
            html.push_str("      <div class=\"frame placeholder\">No image</div>\n");
        }
    }
    let _ = writeln!(
        html,
        "      <header><span class=\"number\">{}</span><span class=\"duration\">{:.1}s</span></header>",
        shot.number, shot.duration
    );
    let _ = writeln!(html, "      <p class=\"title\">{}</p>", escape_html(&shot.title));
    if let Some(angle) = shot.camera_angle {
        let _ = writeln!(html, "      <p class=\"angle\">{}</p>", escape_html(angle.label()));
    }
    html.push_str("    </article>\n");
}

/// Renders the storyboard as a standalone printable document.
pub fn render_storyboard_html(project: &Project, storyboard: &Storyboard) -> String {
    let title = format!("{} — {}", project.name, storyboard.name);
    let ratio = project.aspect_ratio;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&title));
    html.push_str("<style>\n");
    html.push_str(
        "  body { font-family: system-ui, sans-serif; margin: 2rem; }\n  \
         h1 { font-size: 1.4rem; }\n  \
         .grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }\n  \
         .shot { break-inside: avoid; border: 1px solid #ccc; border-radius: 6px; padding: 0.5rem; }\n",
    );
    let _ = writeln!(
        html,
        "  .frame {{ width: 100%; aspect-ratio: {}; object-fit: cover; background: #eee; }}",
        ratio.css_value()
    );
    html.push_str(
        "  .placeholder { display: flex; align-items: center; justify-content: center; color: #888; }\n  \
         header { display: flex; justify-content: space-between; font-weight: 600; margin-top: 0.4rem; }\n  \
         .title { margin: 0.2rem 0; }\n  \
         .angle { margin: 0; color: #555; font-size: 0.85rem; }\n  \
         @media print { body { margin: 0.5rem; } }\n",
    );
    html.push_str("</style>\n</head>\n<body onload=\"window.print()\">\n");
    let _ = writeln!(html, "  <h1>{}</h1>", escape_html(&title));
    let _ = writeln!(
        html,
        "  <p class=\"meta\">{} shots · {:.1}s · {}</p>",
        storyboard.shots.len(),
        storyboard.total_duration(),
        ratio
    );
    html.push_str("  <section class=\"grid\">\n");
    for shot in &storyboard.shots {
        push_shot_card(&mut html, shot);
    }
    html.push_str("  </section>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AspectRatio, CameraAngle, Shot, Storyboard};

    fn sample_project() -> Project {
        let board = Storyboard::new("Opening")
            .with_shot(
                Shot::new(1)
                    .with_title("City at dawn")
                    .with_duration(3.5)
                    .with_image_url("https://img.example/dawn.png"),
            )
            .with_shot(
                Shot::new(2)
                    .with_title("Hero <enters> & waves")
                    .with_camera_angle(CameraAngle::CloseUp),
            );
        let active = board.id.clone();
        Project {
            id: "p".to_string(),
            name: "Demo".to_string(),
            storyboards: vec![board],
            active_storyboard_id: active,
            aspect_ratio: AspectRatio::Square,
        }
    }

    #[test]
    fn test_export_contains_all_shot_fields() {
        let project = sample_project();
        let board = project.active_storyboard().unwrap();
        let html = render_storyboard_html(&project, board);

        assert!(html.contains("<title>Demo — Opening</title>"));
        assert!(html.contains("https://img.example/dawn.png"));
        assert!(html.contains("City at dawn"));
        assert!(html.contains("3.5s"));
        assert!(html.contains("2.0s"));
        assert!(html.contains("Close-Up"));
        assert!(html.contains("aspect-ratio: 1 / 1"));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn test_export_escapes_markup_in_titles() {
        let project = sample_project();
        let board = project.active_storyboard().unwrap();
        let html = render_storyboard_html(&project, board);
        assert!(html.contains("Hero &lt;enters&gt; &amp; waves"));
        assert!(!html.contains("<enters>"));
    }

    #[test]
    fn test_export_uses_placeholder_without_image() {
        let project = sample_project();
        let board = project.active_storyboard().unwrap();
        let html = render_storyboard_html(&project, board);
        assert!(html.contains("placeholder\">No image"));
    }
}
