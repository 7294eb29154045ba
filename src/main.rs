//! ConfigCore - config file editor host with plugin packages.
//!
//! Opens a config document and hosts plugin editors from the local package
//! store, the working directory's `plugins` folder and `*_plugin.json` files.

#![allow(clippy::single_match_else)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use configcore::app::AppOptions;
use configcore::plugin::{EditorComponent, HostedPlugin, PackageBuilder, WidgetSpec};
use configcore::{tui, App, Config, CORE_VERSION};

/// Config file editor host with compatibility-gated plugin packages
#[derive(Parser)]
#[command(name = "configcore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config document to edit
    #[arg(short, long, global = true)]
    document: Option<PathBuf>,

    /// Local package store directory
    #[arg(long, global = true, env = "CONFIGCORE_STORE")]
    store: Option<PathBuf>,

    /// Access token for the package catalog
    #[arg(long, global = true, env = "CONFIGCORE_GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file (defaults to .configcore.toml or the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> AppOptions {
        AppOptions {
            document: self.document.clone(),
            store_dir: self.store.clone(),
            token: self.token.clone(),
            config_path: self.config.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the editor host (default)
    Run,

    /// Load all plugins and print what was hosted
    Plugins,

    /// Press a widget of a hosted plugin
    Activate {
        /// Plugin name or tab index
        plugin: String,

        /// Widget index within the editor
        widget: usize,

        /// Save the document afterwards
        #[arg(short, long)]
        save: bool,
    },

    /// Manage packages
    Packages {
        #[command(subcommand)]
        operation: PackageOperation,
    },

    /// Export a package from a builder description
    Export {
        /// Builder description (TOML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Directory the package folder is created in
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Replace an existing package folder
        #[arg(short, long)]
        force: bool,
    },

    /// Preview the editor a builder description produces
    Preview {
        /// Builder description (TOML)
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum PackageOperation {
    /// List packages offered by the remote catalog
    #[cfg(feature = "remote")]
    Remote,

    /// List installed packages
    List,

    /// Install a package from the catalog
    #[cfg(feature = "remote")]
    Install {
        /// Package name
        name: String,

        /// Branch to install from
        #[arg(short, long)]
        branch: Option<String>,

        /// Install even if the package declares it is incompatible
        #[arg(short, long)]
        force: bool,
    },

    /// Update an installed package (reinstall from the catalog)
    #[cfg(feature = "remote")]
    Update {
        /// Package name
        name: String,

        /// Branch to install from
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Uninstall a package
    Uninstall {
        /// Package name
        name: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the install path of a package
    Path {
        /// Package name
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let options = cli.options();

    match cli.command {
        None | Some(Commands::Run) => cmd_run(options)?,
        Some(Commands::Plugins) => cmd_plugins(options)?,
        Some(Commands::Activate { plugin, widget, save }) => {
            cmd_activate(options, &plugin, widget, save)?;
        }
        Some(Commands::Packages { operation }) => cmd_packages(options, operation)?,
        Some(Commands::Export { spec, out, force }) => cmd_export(&spec, &out, force)?,
        Some(Commands::Preview { spec }) => cmd_preview(&spec)?,
        Some(Commands::Config { path }) => cmd_config(&options, path)?,
        Some(Commands::Completions { shell }) => cmd_completions(shell),
    }

    Ok(())
}

/// Run the interactive TUI.
fn cmd_run(options: AppOptions) -> Result<()> {
    let app = App::new(options)?;
    tui::run_tui(app)
}

/// Load plugins and print the outcome.
fn cmd_plugins(options: AppOptions) -> Result<()> {
    let mut app = App::new(options)?;
    let report = app.reload();

    match app.document_path() {
        Some(path) => println!("Document: {}", path.display()),
        None => println!("Document: (none)"),
    }
    println!("Core version: {CORE_VERSION}\n");

    if app.session.plugins().is_empty() {
        println!("No plugins loaded.");
        println!("\nInstall packages with:");
        println!("  configcore packages install <name>");
    }

    for (index, plugin) in app.session.plugins().iter().enumerate() {
        let root = plugin.root();
        match plugin {
            HostedPlugin::Active(active) => {
                println!("  [{index}] {} ({}, {})", plugin.title(), root.origin, root.path.display());
                for (widget_index, widget) in active.editor().widgets().iter().enumerate() {
                    println!("        {widget_index}: {}", describe_widget(widget));
                }
            }
            HostedPlugin::Disabled { .. } => {
                println!("  [{index}] {} [incompatible] ({})", plugin.title(), root.path.display());
            }
        }
    }

    for failure in &report.failures {
        println!("  ✗ {}: {}", failure.path.display(), failure.error);
    }

    println!("\n{report}");
    Ok(())
}

fn describe_widget(widget: &WidgetSpec) -> String {
    match widget {
        WidgetSpec::Button { label, action } => format!("button '{label}' -> {}", action.describe()),
        other => format!("{} '{}'", other.kind(), other.display_text()),
    }
}

/// Press a widget from the command line.
fn cmd_activate(options: AppOptions, plugin: &str, widget: usize, save: bool) -> Result<()> {
    let mut app = App::new(options)?;
    app.reload();

    let outcome = app.activate(plugin, widget)?;
    println!("{outcome}");

    if save {
        if app.is_modified() {
            match app.save_document()? {
                Some(backup) => println!("Saved (backup: {})", backup.display()),
                None => println!("Saved"),
            }
        } else {
            println!("No changes to save");
        }
    } else if app.is_modified() {
        println!("Document modified but not saved (use --save)");
    }

    Ok(())
}

/// Handle package commands.
fn cmd_packages(options: AppOptions, operation: PackageOperation) -> Result<()> {
    let app = App::new(options)?;

    match operation {
        #[cfg(feature = "remote")]
        PackageOperation::Remote => {
            println!("Fetching package catalog...\n");
            let packages = app.remote_packages()?;
            let installed = app.store.list();

            if packages.is_empty() {
                println!("The catalog has no packages.");
                return Ok(());
            }

            for package in &packages {
                let version = package.version().map(|v| format!(" v{v}")).unwrap_or_default();
                let compat =
                    if package.is_compatible(CORE_VERSION) { "" } else { " [incompatible]" };
                let marker = if installed.contains(&package.name) { " [installed]" } else { "" };
                println!("  {}{version}{marker}{compat}", package.name);
                if let Some(description) = package.description() {
                    println!("      {description}");
                }
            }
            println!("\nTotal: {} package(s)", packages.len());
        }

        PackageOperation::List => {
            let packages = app.installed_packages();
            if packages.is_empty() {
                println!("No packages installed in {}", app.store.root().display());
                return Ok(());
            }

            println!("Installed packages ({}):\n", app.store.root().display());
            for package in &packages {
                let version =
                    package.manifest.version().map(|v| format!(" v{v}")).unwrap_or_default();
                let compat = if package.compatible { "✓" } else { "✗ incompatible" };
                println!("  {}{version} [{compat}]", package.name);
            }
            println!("\nTotal: {} package(s)", packages.len());
        }

        #[cfg(feature = "remote")]
        PackageOperation::Install { name, branch, force } => {
            println!("Installing '{name}'...");
            let path = app.install(&name, branch.as_deref(), force)?;
            println!("Installed to {}", path.display());
        }

        #[cfg(feature = "remote")]
        PackageOperation::Update { name, branch } => {
            if !app.store.contains(&name) {
                anyhow::bail!("Package '{name}' is not installed");
            }
            println!("Updating '{name}'...");
            let path = app.install(&name, branch.as_deref(), false)?;
            println!("Updated {}", path.display());
        }

        PackageOperation::Uninstall { name, yes } => {
            if !yes {
                print!("Uninstall package '{name}'? [y/N] ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            app.uninstall(&name)?;
            println!("Uninstalled package: {name}");
        }

        PackageOperation::Path { name } => {
            println!("{}", app.store.path_of(&name)?.display());
        }
    }

    Ok(())
}

/// Export a package.
fn cmd_export(spec: &Path, out: &Path, force: bool) -> Result<()> {
    let builder = PackageBuilder::from_toml_file(spec)?;
    let dir = builder.export(out, force)?;
    println!("Exported '{}' to {}", builder.name, dir.display());
    Ok(())
}

/// Print the editor a builder description produces.
fn cmd_preview(spec: &Path) -> Result<()> {
    let builder = PackageBuilder::from_toml_file(spec)?;
    let editor = builder.preview();

    println!(
        "{} (v{}, requires core {})\n",
        editor.title(),
        builder.version,
        builder.min_core_version
    );
    if editor.widgets().is_empty() {
        println!("  (no widgets)");
    }
    for (index, widget) in editor.widgets().iter().enumerate() {
        println!("  {index}: {}", describe_widget(widget));
    }
    Ok(())
}

/// Show configuration.
fn cmd_config(options: &AppOptions, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.join("config.toml").display());
        }
        return Ok(());
    }

    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    if let Some(ref store) = options.store_dir {
        config.plugins.store_dir = Some(store.clone());
    }
    // Never echo the token
    config.remote.token = None;

    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "configcore", &mut io::stdout());
}
