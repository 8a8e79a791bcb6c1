//! # Rendering
//!
//! Turns a `CmdResult` into the text a command prints. The command picks a
//! [`View`]; in JSON mode the view is ignored and the whole result is
//! serialized, so scripts see the same data whatever the command.
//!
//! Messages always come last in terminal mode, after the records they talk
//! about.

use super::styles;
use std::fmt::Write as _;
use typeshelfapp::commands::{CmdMessage, CmdResult};
use typeshelfapp::model::{FontRecord, FontStyle, TemplateRecord};
use typeshelfapp::registry::TemplateStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Terminal,
    Json,
}

/// What part of a result a command wants shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Messages,
    FontList,
    FontDetail,
    TemplateList,
    TemplateDetail,
    /// The raw template document, nothing else.
    TemplateContent,
    Paths,
    Categories,
    Statistics,
}

pub fn render(result: &CmdResult, view: View, mode: OutputMode) -> serde_json::Result<String> {
    if mode == OutputMode::Json {
        let mut out = serde_json::to_string_pretty(result)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    match view {
        View::Messages => {}
        View::FontList => result.fonts.iter().for_each(|f| font_line(&mut out, f)),
        View::FontDetail => result.fonts.iter().for_each(|f| font_detail(&mut out, f)),
        View::TemplateList => result
            .templates
            .iter()
            .for_each(|t| template_line(&mut out, t)),
        View::TemplateDetail => {
            for template in &result.templates {
                template_detail(&mut out, template);
            }
            for path in &result.paths {
                field(&mut out, "File", &styles::path().apply_to(path.display()).to_string());
            }
        }
        View::TemplateContent => {
            // Piped straight into other tools; no messages, no styling.
            for template in &result.templates {
                out.push_str(&template.content);
                if !template.content.ends_with('\n') {
                    out.push('\n');
                }
            }
            return Ok(out);
        }
        View::Paths => {
            for path in &result.paths {
                let _ = writeln!(out, "{}", path.display());
            }
        }
        View::Categories => {
            for category in &result.categories {
                let _ = writeln!(out, "{}", category);
            }
        }
        View::Statistics => {
            if let Some(stats) = &result.statistics {
                statistics(&mut out, stats);
            }
        }
    }

    for message in &result.messages {
        message_line(&mut out, message);
    }
    Ok(out)
}

fn font_line(out: &mut String, font: &FontRecord) {
    let declared: Vec<&str> = font
        .declared_paths()
        .into_iter()
        .map(|(style, _)| style.label())
        .collect();
    let _ = writeln!(
        out,
        "{}  {}",
        styles::name().apply_to(&font.name),
        styles::muted().apply_to(declared.join(", "))
    );
}

fn font_detail(out: &mut String, font: &FontRecord) {
    let _ = writeln!(out, "{}", styles::name().apply_to(&font.name));
    for style in FontStyle::ALL {
        if let Some(path) = font.declared_path(style) {
            field(out, style.label(), &styles::path().apply_to(path).to_string());
        }
    }
    field(out, "Encoding", &font.pdf_encoding);
    field(out, "Embedded", if font.pdf_embedded { "yes" } else { "no" });
}

fn template_line(out: &mut String, template: &TemplateRecord) {
    let category = template
        .category
        .as_deref()
        .map(|c| format!("  [{}]", c))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{}{}  {}",
        styles::name().apply_to(&template.name),
        styles::muted().apply_to(category),
        styles::muted().apply_to(template.updated_at.format("%Y-%m-%d %H:%M"))
    );
}

fn template_detail(out: &mut String, template: &TemplateRecord) {
    let _ = writeln!(out, "{}", styles::name().apply_to(&template.name));
    if let Some(description) = &template.description {
        field(out, "Description", description);
    }
    if let Some(category) = &template.category {
        field(out, "Category", category);
    }
    field(out, "Created", &template.created_at.to_rfc3339());
    field(out, "Updated", &template.updated_at.to_rfc3339());
    field(out, "Size", &format!("{} bytes", template.content.len()));
}

fn statistics(out: &mut String, stats: &TemplateStatistics) {
    field(out, "Templates", &stats.total_templates.to_string());
    field(out, "Categories", &stats.categories.to_string());
    for (category, count) in &stats.category_counts {
        let _ = writeln!(out, "    {}  {}", category, styles::muted().apply_to(count));
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "  {} {}",
        styles::label().apply_to(format!("{:<12}", format!("{}:", label))),
        value
    );
}

fn message_line(out: &mut String, message: &CmdMessage) {
    let _ = writeln!(
        out,
        "{}",
        styles::message(&message.level).apply_to(&message.content)
    );
}
