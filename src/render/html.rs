//! Markdown to HTML conversion and the styled page template.

use crate::config::{FontFace, RenderSettings};
use chrono::NaiveDate;
use pulldown_cmark::{html, Event, Options, Parser};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Convert Markdown to an HTML fragment.
///
/// Tables, footnotes and strikethrough are enabled, and single newlines are
/// kept as line breaks.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Absolute `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("file://{}", absolute.display()))
}

/// A registered font: CSS family name plus file URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRef {
    pub family: String,
    pub url: String,
}

/// Asset references injected into the page. Missing files are left out so the
/// converter never chases a dead link.
#[derive(Debug, Clone, Default)]
pub struct AssetRefs {
    pub logo_url: Option<String>,
    pub logo_alt: String,
    pub fonts: Vec<FontRef>,
    pub body_family: String,
    pub title_family: String,
    pub section_family: String,
    pub accent_family: String,
}

impl AssetRefs {
    /// Locate the configured logo and fonts under `assets_dir`.
    pub fn resolve(settings: &RenderSettings, assets_dir: &Path) -> Self {
        let existing = |file: &str| -> Option<PathBuf> {
            let path = assets_dir.join(file);
            if path.is_file() {
                Some(path)
            } else {
                warn!("Asset not found, leaving it out: {}", path.display());
                None
            }
        };

        let font_ref = |face: &FontFace| {
            existing(&face.file).map(|path| FontRef {
                family: face.family.clone(),
                url: file_url(&path),
            })
        };

        let fonts = settings.fonts.faces().into_iter().filter_map(font_ref).collect();

        Self {
            logo_url: existing(&settings.logo_file).map(|p| file_url(&p)),
            logo_alt: settings.logo_alt.clone(),
            fonts,
            body_family: settings.fonts.body.family.clone(),
            title_family: settings.fonts.title.family.clone(),
            section_family: settings.fonts.section.family.clone(),
            accent_family: settings.fonts.accent.family.clone(),
        }
    }

    fn font_face_css(&self) -> String {
        self.fonts
            .iter()
            .map(|f| {
                format!(
                    "        @font-face {{\n            font-family: '{}';\n            src: url('{}') format('opentype');\n        }}\n",
                    f.family, f.url
                )
            })
            .collect()
    }
}

/// Format a date the way it appears in headers and file names.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Wrap a rendered guide in the full styled HTML page.
pub fn build_document(
    body_html: &str,
    title: &str,
    date: Option<NaiveDate>,
    assets: &AssetRefs,
) -> String {
    let logo = match &assets.logo_url {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" style="max-height: 80px; display: block;">"#,
            escape_html(url),
            escape_html(&assets.logo_alt)
        ),
        None => String::new(),
    };
    let date_str = date.map(format_date).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
{font_faces}
        @page {{
            size: letter;
            margin: 1in;
        }}

        body {{
            font-family: '{body_font}', Arial, sans-serif;
            font-weight: 800;
            font-size: 11pt;
            line-height: 1.6;
            color: #333;
        }}
        h1 {{
            font-family: '{title_font}', sans-serif;
            font-size: 20pt;
            font-weight: normal;
            margin-top: 0.5em;
            margin-bottom: 0.3em;
            color: #1a1a1a;
        }}
        h2 {{
            font-family: '{section_font}', sans-serif;
            font-size: 16pt;
            font-weight: normal;
            margin-top: 0.8em;
            margin-bottom: 0.3em;
            color: #2a2a2a;
        }}
        h3 {{
            font-family: '{accent_font}', sans-serif;
            font-size: 13pt;
            font-weight: normal;
            margin-top: 0.6em;
            margin-bottom: 0.2em;
            color: #3a3a3a;
        }}
        p {{
            margin-top: 0.3em;
            margin-bottom: 0.5em;
        }}
        ul, ol {{
            margin-top: 0.3em;
            margin-bottom: 0.5em;
            padding-left: 1.5em;
        }}
        li {{
            margin-bottom: 0.3em;
        }}
        hr {{
            border: none;
            border-top: 1px solid #ccc;
            margin: 1em 0;
        }}
        strong {{
            font-family: '{accent_font}', sans-serif;
            font-weight: 700;
        }}
        blockquote {{
            border-left: 3px solid #ccc;
            padding-left: 1em;
            margin-left: 0;
            font-style: italic;
            color: #555;
        }}
        table {{
            border-collapse: collapse;
        }}
        th, td {{
            border: 1px solid #ccc;
            padding: 0.3em 0.6em;
        }}
    </style>
</head>
<body>
    <table style="width: 100%; margin-bottom: 20px; border-collapse: collapse;">
        <tr>
            <td style="width: 50%; vertical-align: top; padding: 0; border: none;">
                {logo}
            </td>
            <td style="width: 50%; vertical-align: top; text-align: right; padding: 0; border: none;">
                <em style="white-space: nowrap;">{date}</em>
            </td>
        </tr>
    </table>
    <hr>
{body}
</body>
</html>"#,
        title = escape_html(title),
        font_faces = assets.font_face_css(),
        body_font = escape_html(&assets.body_family),
        title_font = escape_html(&assets.title_family),
        section_font = escape_html(&assets.section_family),
        accent_font = escape_html(&assets.accent_family),
        logo = logo,
        date = escape_html(&date_str),
        body = body_html,
    )
}
