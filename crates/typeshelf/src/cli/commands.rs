//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Reads files named on the command line
//!
//! Everything else is a call into [`ShelfApi`] followed by rendering.

use super::render::{self, OutputMode, View};
use super::setup::{parse_cli, Commands, FontCommands, TemplateCommands};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typeshelfapp::api::ShelfApi;
use typeshelfapp::commands::fonts::RegisterFontRequest;
use typeshelfapp::commands::templates::{SaveTemplateRequest, UpdateTemplateRequest};
use typeshelfapp::commands::CmdResult;
use typeshelfapp::init::{initialize, SqliteBackend};

const LOG_ENV: &str = "TYPESHELF_LOG";

pub fn run() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let ctx = initialize(cli.data_dir.as_deref())?;
    debug!(data_dir = %ctx.config.data_dir().display(), "shelf opened");
    let startup = ctx.api.startup()?;

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Terminal
    };

    let (result, view) = match cli.command {
        Commands::Doctor => (startup, View::Messages),
        Commands::Font { action } => handle_font(&ctx.api, action)?,
        Commands::Template { action } => handle_template(&ctx.api, action)?,
    };

    print!("{}", render::render(&result, view, mode)?);
    Ok(())
}

/// `TYPESHELF_LOG` wins; otherwise the verbosity flag picks the level.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_font(api: &ShelfApi<SqliteBackend>, action: FontCommands) -> Result<(CmdResult, View)> {
    let handled = match action {
        FontCommands::List => (api.list_fonts()?, View::FontList),
        FontCommands::Show { name } => (api.get_font(&name)?, View::FontDetail),
        FontCommands::Add {
            name,
            normal,
            bold,
            italic,
            bold_italic,
            encoding,
            not_embedded,
            copy,
        } => {
            let mut request = RegisterFontRequest::new(name, normal);
            request.bold_path = bold;
            request.italic_path = italic;
            request.bold_italic_path = bold_italic;
            request.pdf_encoding = encoding;
            request.pdf_embedded = not_embedded.then_some(false);
            request.copy_to_store = copy;
            (api.register_font(request)?, View::Messages)
        }
        FontCommands::Remove { name } => (api.remove_font(&name)?, View::Messages),
        FontCommands::Clear { purge_files } => (api.clear_fonts(purge_files)?, View::Messages),
        FontCommands::Path { name, style } => (api.font_path(&name, &style)?, View::Paths),
    };
    Ok(handled)
}

fn handle_template(
    api: &ShelfApi<SqliteBackend>,
    action: TemplateCommands,
) -> Result<(CmdResult, View)> {
    let handled = match action {
        TemplateCommands::List { category } => {
            let result = match category {
                Some(category) => api.templates_by_category(&category)?,
                None => api.list_templates()?,
            };
            (result, View::TemplateList)
        }
        TemplateCommands::Show { name, content } => {
            let view = if content {
                View::TemplateContent
            } else {
                View::TemplateDetail
            };
            (api.get_template(&name)?, view)
        }
        TemplateCommands::Add {
            file,
            name,
            description,
            category,
            replace,
        } => {
            let name = match name {
                Some(name) => name,
                None => file_stem(&file)?,
            };
            let mut request = SaveTemplateRequest::new(name, read_document(&file)?);
            request.description = description;
            request.category = category;
            let result = if replace {
                api.save_template(request)?
            } else {
                api.create_template(request)?
            };
            (result, View::Messages)
        }
        TemplateCommands::Update {
            name,
            file,
            description,
            category,
        } => {
            let mut request = UpdateTemplateRequest::new(read_document(&file)?);
            request.description = description;
            request.category = category;
            (api.update_template(&name, request)?, View::Messages)
        }
        TemplateCommands::Remove { name } => (api.delete_template(&name)?, View::Messages),
        TemplateCommands::Categories => (api.template_categories()?, View::Categories),
        TemplateCommands::Stats => (api.template_statistics()?, View::Statistics),
        TemplateCommands::Reload => (api.reload_templates()?, View::Messages),
        TemplateCommands::Clear => (api.clear_templates()?, View::Messages),
    };
    Ok(handled)
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a template name from {}", path.display()))
}
