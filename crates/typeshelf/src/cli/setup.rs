use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "typeshelf",
    bin_name = "typeshelf",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Font and report-template registry for a reporting service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (database, templates, fonts). Overrides TYPESHELF_DATA_DIR
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage registered fonts
    #[command(display_order = 1)]
    Font {
        #[command(subcommand)]
        action: FontCommands,
    },

    /// Manage report templates
    #[command(alias = "tpl", display_order = 2)]
    Template {
        #[command(subcommand)]
        action: TemplateCommands,
    },

    /// Reconcile the registries with their files and report what changed
    #[command(display_order = 3)]
    Doctor,
}

#[derive(Subcommand, Debug)]
pub enum FontCommands {
    /// List registered fonts
    #[command(alias = "ls")]
    List,

    /// Show one font
    Show { name: String },

    /// Register a font, or replace the font with the same name
    Add {
        name: String,

        /// Regular-weight font file (.ttf, .otf or .ttc)
        #[arg(long, value_name = "PATH")]
        normal: String,

        #[arg(long, value_name = "PATH")]
        bold: Option<String>,

        #[arg(long, value_name = "PATH")]
        italic: Option<String>,

        #[arg(long, value_name = "PATH")]
        bold_italic: Option<String>,

        /// PDF encoding (default Identity-H)
        #[arg(long)]
        encoding: Option<String>,

        /// Do not embed the font in generated PDFs
        #[arg(long)]
        not_embedded: bool,

        /// Copy the files into the shelf's font store first
        #[arg(long)]
        copy: bool,
    },

    /// Remove a font
    #[command(alias = "rm")]
    Remove { name: String },

    /// Remove every font
    Clear {
        /// Also delete font files copied into the store
        #[arg(long)]
        purge_files: bool,
    },

    /// Print the file used for a style (falls back to the normal file)
    Path {
        name: String,

        /// normal, bold, italic or bold-italic
        #[arg(long, default_value = "normal")]
        style: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List templates
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one template
    Show {
        name: String,

        /// Print only the template document
        #[arg(long)]
        content: bool,
    },

    /// Add a template from a file
    Add {
        file: PathBuf,

        /// Template name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Replace an existing template with the same name
        #[arg(long)]
        replace: bool,
    },

    /// Replace an existing template's document and metadata
    Update {
        name: String,
        file: PathBuf,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a template and its files
    #[command(alias = "rm")]
    Remove { name: String },

    /// List categories in use
    Categories,

    /// Show template counts
    Stats,

    /// Rebuild the cache and template files from the database
    Reload,

    /// Remove every template
    Clear,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_font_add_with_all_styles() {
        let cli = Cli::try_parse_from([
            "typeshelf",
            "font",
            "add",
            "Acme",
            "--normal",
            "/f/a.ttf",
            "--bold-italic",
            "/f/abi.ttf",
            "--not-embedded",
        ])
        .unwrap();

        match cli.command {
            Commands::Font {
                action:
                    FontCommands::Add {
                        name,
                        normal,
                        bold,
                        bold_italic,
                        not_embedded,
                        copy,
                        ..
                    },
            } => {
                assert_eq!(name, "Acme");
                assert_eq!(normal, "/f/a.ttf");
                assert_eq!(bold, None);
                assert_eq!(bold_italic.as_deref(), Some("/f/abi.ttf"));
                assert!(not_embedded);
                assert!(!copy);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli =
            Cli::try_parse_from(["typeshelf", "template", "ls", "--json", "-vv", "--data-dir", "/d"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/d")));
    }

    #[test]
    fn font_add_requires_normal_file() {
        assert!(Cli::try_parse_from(["typeshelf", "font", "add", "Acme"]).is_err());
    }

    #[test]
    fn path_style_defaults_to_normal() {
        let cli = Cli::try_parse_from(["typeshelf", "font", "path", "Acme"]).unwrap();
        match cli.command {
            Commands::Font {
                action: FontCommands::Path { style, .. },
            } => assert_eq!(style, "normal"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
