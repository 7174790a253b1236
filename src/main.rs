use clap::{Parser, Subcommand};
use gitcms::commands::*;
use gitcms::core::{
    config::AppConfig,
    error::{GitCmsError, Result},
    print_error, print_warning,
    workspace::CollectionPatch,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitcms")]
#[command(about = "Keep a content repository's CMS configuration in sync")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile cached, remote and scanned settings and show the result
    Open,
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Confirm the working settings and write the configuration document
    Setup {
        /// Site generator (astro, next, hugo, jekyll, gatsby, eleventy, other)
        #[arg(long = "project-type")]
        project_type: Option<String>,
        /// Directory holding posts
        #[arg(long)]
        posts: Option<String>,
        /// Directory holding images
        #[arg(long)]
        images: Option<String>,
        /// Production URL of the site
        #[arg(long)]
        domain: Option<String>,
    },
    /// Manage content collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Store a frontmatter template from a JSON file
    Template {
        /// JSON file with the template
        file: PathBuf,
        /// Attach the template to this collection instead of the shared settings
        #[arg(long)]
        collection: Option<String>,
    },
    /// Print the configuration document
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration document and commit it
    Import {
        file: PathBuf,
    },
    /// Remove the configuration document and cached settings
    DeleteConfig {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage the local settings cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show or set the interface language
    Language {
        code: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show every settings field
    Show,
    /// Set one field
    Set {
        key: String,
        value: String,
        /// Only update the local cache, do not commit
        #[arg(long)]
        local: bool,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List collections, marking the active one
    List,
    /// Create a collection
    Add {
        name: String,
        #[arg(long)]
        posts: String,
        #[arg(long)]
        images: String,
    },
    /// Rename or move a collection
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        posts: Option<String>,
        #[arg(long)]
        images: Option<String>,
    },
    /// Delete a collection
    Remove {
        id: String,
    },
    /// Make a collection active
    Use {
        id: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove cached settings for the current repository
    Clear,
}

fn configure_logging(debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else {
        AppConfig::load_or_create()
            .map(|config| config.log_level)
            .unwrap_or_else(|_| "info".to_string())
    };
    env::set_var("RUST_LOG", level);
    env_logger::init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Open => execute_open(),
        Commands::Settings { action } => match action {
            SettingsAction::Show => execute_settings_show(),
            SettingsAction::Set { key, value, local } => execute_settings_set(&key, &value, local),
        },
        Commands::Setup {
            project_type,
            posts,
            images,
            domain,
        } => execute_setup(SetupArgs {
            project_type,
            posts_path: posts,
            images_path: images,
            domain_url: domain,
        }),
        Commands::Collection { action } => match action {
            CollectionAction::List => execute_collection_list(),
            CollectionAction::Add {
                name,
                posts,
                images,
            } => execute_collection_add(&name, &posts, &images),
            CollectionAction::Update {
                id,
                name,
                posts,
                images,
            } => execute_collection_update(
                &id,
                CollectionPatch {
                    name,
                    posts_path: posts,
                    images_path: images,
                    ..Default::default()
                },
            ),
            CollectionAction::Remove { id } => execute_collection_remove(&id),
            CollectionAction::Use { id } => execute_collection_use(&id),
        },
        Commands::Template { file, collection } => execute_template(collection.as_deref(), &file),
        Commands::Export { output } => execute_export(output.as_deref()),
        Commands::Import { file } => execute_import(&file),
        Commands::DeleteConfig { yes } => execute_delete_config(yes),
        Commands::Cache { action } => match action {
            CacheAction::Clear => execute_cache_clear(),
        },
        Commands::Language { code } => execute_language(code.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.debug);

    if let Err(e) = run(cli.command) {
        match e {
            GitCmsError::NotInGitRepo => print_error("Not in a git repository"),
            // Already reported with usage
            GitCmsError::UnknownField(_) => {}
            // Nothing was written, the user can retry
            other if other.is_actionable() => print_warning(&other.to_string()),
            other => print_error(&other.to_string()),
        }
        std::process::exit(1);
    }
}
