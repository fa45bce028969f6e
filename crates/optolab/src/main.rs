mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use optolab_core::acquisition::{CameraDriver, NoCameraDriver, SimulatedCameraDriver};
use optolab_core::event::AppEvent;
use optolab_core::kernel::constants::{API_VERSION, DEFAULT_MANIFEST_PATH};
use optolab_core::kernel::{AppOptions, Application};
use optolab_core::plugin_system::{ApplicationManifest, LoadPolicy, ModuleLoader, PluginRegistry};

// --- Module plugins, registered statically ---
use camera_live::CameraLivePlugin;
use images_module::ImagesPlugin;

/// optolab: machine vision lab application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Application manifest to read
    #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
    manifest: PathBuf,

    /// Override the manifest's module load policy
    #[arg(long, value_enum)]
    load_policy: Option<PolicyArg>,

    /// Run without any camera instead of the simulated one
    #[arg(long)]
    no_camera: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List declared modules and whether they can be selected
    Modules,
    /// Start a console session
    Run {
        /// Modules to select in order, then quit (comma separated)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Eager,
    Lazy,
}

impl From<PolicyArg> for LoadPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Eager => LoadPolicy::Eager,
            PolicyArg::Lazy => LoadPolicy::Lazy,
        }
    }
}

fn build_registry() -> Result<PluginRegistry, String> {
    let mut registry = PluginRegistry::new(API_VERSION).map_err(|e| e.to_string())?;
    registry
        .register_plugin(Arc::new(CameraLivePlugin))
        .map_err(|e| format!("Failed to register {}: {}", CameraLivePlugin::CONTROLLER_KEY, e))?;
    registry
        .register_plugin(Arc::new(ImagesPlugin))
        .map_err(|e| format!("Failed to register {}: {}", ImagesPlugin::CONTROLLER_KEY, e))?;
    info!("Registered module plugins: {}", registry.names().join(", "));
    Ok(registry)
}

fn list_modules(manifest_path: &Path, registry: PluginRegistry) -> Result<(), String> {
    let manifest = ApplicationManifest::load(manifest_path).map_err(|e| e.to_string())?;
    println!("{}", manifest.window_title());
    let loader = ModuleLoader::new(Arc::new(manifest), Arc::new(registry));
    for (name, status) in loader.check_report() {
        match status {
            Ok(()) => println!("  {:<20} available", name),
            Err(e) => println!("  {:<20} unavailable: {}", name, e),
        }
    }
    Ok(())
}

async fn run_session(args: &CliArgs, registry: PluginRegistry, select: Vec<String>) -> Result<(), String> {
    let camera_driver: Arc<dyn CameraDriver> = if args.no_camera {
        Arc::new(NoCameraDriver)
    } else {
        Arc::new(SimulatedCameraDriver::default())
    };
    let options = AppOptions {
        load_policy: args.load_policy.map(LoadPolicy::from),
        camera_driver,
        ui_provider: Some(Box::new(cli::ConsoleUiProvider::new())),
    };

    let mut app = Application::new(&args.manifest, registry, options).map_err(|e| e.to_string())?;
    app.start().map_err(|e| e.to_string())?;

    if select.is_empty() {
        println!("{}", cli::USAGE);
        tokio::spawn(cli::read_commands(app.events()));
    } else {
        // Scripted clicks go through the menu buttons, so disabled entries stay inert
        for name in &select {
            if let Err(e) = app.manager().window().click(name) {
                eprintln!("Cannot select '{}': {}", name, e);
            }
        }
        app.events().send(AppEvent::Shutdown).map_err(|e| e.to_string())?;
    }

    app.run().await.map_err(|e| e.to_string())?;
    info!("Session ended");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.command {
        Some(Commands::Modules) => list_modules(&args.manifest, registry),
        Some(Commands::Run { select }) => run_session(&args, registry, select.clone()).await,
        None => run_session(&args, registry, Vec::new()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
