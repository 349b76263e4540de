//! Subcommands of the `modwire` binary and their output.
use std::process::ExitCode;

use clap::Subcommand;
use log::info;
use modwire_core::module_system::version::compare_str;
use modwire_core::module_system::{ModuleCatalog, NoticeLevel, VersionsMode};
use modwire_core::{InstallOptions, KernelError, ModuleManager, ModuleSystemError};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two versions, e.g. `compare 1.2.0 '>=' 110`
    Compare {
        current: String,
        operator: String,
        required: String,
    },
    #[command(flatten)]
    Registry(RegistryCommand),
}

/// Commands that open the module registry
#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// List known modules with their version and install state
    List {},
    /// Show a module's metadata
    Info {
        /// Module class name
        class: String,
    },
    /// Install a module, chasing its dependencies
    Install {
        /// Module class name
        class: String,
        /// Install even when requirements remain unmet
        #[arg(long)]
        force: bool,
        /// Do not install missing required modules
        #[arg(long)]
        no_deps: bool,
    },
    /// Uninstall a module and the modules it installed
    Uninstall {
        /// Module class name
        class: String,
    },
    /// Modules a module requires
    Requires {
        /// Module class name
        class: String,
        /// Only requirements that are not yet satisfied
        #[arg(long)]
        missing: bool,
    },
    /// Installed modules that require a module
    RequiredBy {
        /// Module class name
        class: String,
    },
    /// Failed dependencies of an installed module
    Errors {
        /// Module class name
        class: String,
    },
}

/// Runs one registry-backed command against `manager`.
pub fn run(manager: &mut ModuleManager, command: RegistryCommand) -> Result<(), KernelError> {
    match command {
        RegistryCommand::List {} => list(manager),
        RegistryCommand::Info { class } => show_info(manager, &class)?,
        RegistryCommand::Install { class, force, no_deps } => {
            let options = InstallOptions {
                dependencies: !no_deps,
                force,
                ..InstallOptions::default()
            };
            manager.install(&class, options)?;
            println!("Installed {}", class);
        }
        RegistryCommand::Uninstall { class } => {
            if let Some(block) = manager.uninstall_blocker(&class) {
                return Err(KernelError::Other(format!("Unable to uninstall '{}': {}", class, block)));
            }
            if manager.uninstall(&class)? {
                println!("Uninstalled {}", class);
            }
        }
        RegistryCommand::Requires { class, missing } => {
            known(manager, &class)?;
            let labels = manager.requires(&class, missing, VersionsMode::WhenSpecific);
            print_list(&labels, "No requirements");
        }
        RegistryCommand::RequiredBy { class } => {
            known(manager, &class)?;
            let classes = manager.required_by(&class, false, false);
            print_list(&classes, "Not required by any installed module");
        }
        RegistryCommand::Errors { class } => {
            known(manager, &class)?;
            let errors = manager.dependency_errors(&class);
            print_list(&errors, "No dependency errors");
        }
    }
    Ok(())
}

/// Prints `true` or `false`; the exit code follows the answer.
pub fn compare(current: &str, operator: &str, required: &str) -> ExitCode {
    let result = compare_str(current, required, operator);
    info!("{} {} {} => {}", current, operator, required, result);
    println!("{}", result);
    if result { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Drains the manager's notices to the terminal.
/// Returns `false` when any of them was an error.
pub fn print_notices(manager: &mut ModuleManager) -> bool {
    let mut ok = true;
    for notice in manager.notices_mut().take() {
        match notice.level {
            NoticeLevel::Error => {
                ok = false;
                eprintln!("{}", notice);
            }
            NoticeLevel::Warning => eprintln!("{}", notice),
            _ => println!("{}", notice),
        }
    }
    ok
}

fn list(manager: &ModuleManager) {
    let classes = manager.catalog().module_classes();
    if classes.is_empty() {
        println!("No modules found.");
        return;
    }
    for class in classes {
        let version = manager
            .module_info(&class)
            .map(|info| info.version.formatted())
            .unwrap_or_else(|| "?".to_string());
        let state = if manager.is_installed(&class) {
            "installed"
        } else if manager.is_installable(&class, false) {
            "installable"
        } else {
            "unavailable"
        };
        let flags = manager.module_flags(&class).map(|f| f.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<10} {:<12} {}", class, version, state, flags);
    }
}

fn show_info(manager: &ModuleManager, class: &str) -> Result<(), ModuleSystemError> {
    let info = manager
        .module_info(class)
        .ok_or_else(|| ModuleSystemError::UnknownModule(class.to_string()))?;
    println!("Class:     {}", class);
    println!("Title:     {}", info.title);
    if !info.summary.is_empty() {
        println!("Summary:   {}", info.summary);
    }
    println!("Version:   {}", info.version.formatted());
    println!("Installed: {}", if manager.is_installed(class) { "yes" } else { "no" });
    if !info.requires.is_empty() {
        let labels: Vec<String> = info.requires.iter().map(|edge| edge.label()).collect();
        println!("Requires:  {}", labels.join(", "));
    }
    if !info.installs.is_empty() {
        println!("Installs:  {}", info.installs.join(", "));
    }
    for (name, title) in &info.permissions {
        println!("Permission: {} ({})", name, title);
    }
    if info.permanent {
        println!("Permanent: yes");
    }
    Ok(())
}

fn known(manager: &ModuleManager, class: &str) -> Result<(), ModuleSystemError> {
    if manager.module_info(class).is_none() {
        return Err(ModuleSystemError::UnknownModule(class.to_string()));
    }
    Ok(())
}

fn print_list(items: &[String], empty: &str) {
    if items.is_empty() {
        println!("{}", empty);
    }
    for item in items {
        println!("  {}", item);
    }
}
