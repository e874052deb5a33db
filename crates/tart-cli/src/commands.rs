// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations for `tartctl`.
//!
//! Each function prints its own output; errors bubble up to `main`.

use anyhow::{Context, Result, bail};
use schemars::schema_for;
use std::io::BufRead;
use std::path::Path;
use tart_client::{LoginOptions, Password, Readiness, RunOptions, Tart, TartConfig};
use tart_config::{ConfigWarning, load_config, merge_configs, validate_config};
use tracing::info;

use crate::args::{self, Commands, ConfigCommand, RunArgs};
use crate::format;

/// Load the config file (if any) with environment overrides applied.
pub fn load(path: Option<&Path>) -> Result<TartConfig> {
    load_config(path).with_context(|| match path {
        Some(p) => format!("load config '{}'", p.display()),
        None => "load config".to_string(),
    })
}

/// Layer command-line flags over the loaded config. Flags left unset keep
/// the loaded values.
pub fn with_cli_overrides(config: TartConfig, registry: Option<String>) -> TartConfig {
    let flags = TartConfig {
        binary: None,
        home: None,
        registry,
        log_level: None,
    };
    merge_configs(config, flags)
}

/// JSON schema of [`TartConfig`].
pub fn schema_json() -> Result<String> {
    let value = serde_json::to_value(schema_for!(TartConfig))?;
    serde_json::to_string_pretty(&value).context("serialize schema")
}

/// Validate `config`, returning its warnings.
pub fn check_config(config: &TartConfig) -> Result<Vec<ConfigWarning>> {
    validate_config(config).context("invalid configuration")
}

/// Read a password from the first line of `reader`.
pub fn read_password(reader: impl BufRead) -> Result<Password> {
    let line = reader
        .lines()
        .next()
        .transpose()
        .context("read password from stdin")?
        .unwrap_or_default();
    let secret = line.trim_end_matches(['\r', '\n']);
    if secret.is_empty() {
        bail!("no password on stdin");
    }
    Ok(Password::new(secret))
}

/// Run the config subcommands, which need no tart executable.
pub fn config_command(cmd: &ConfigCommand, config: &TartConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Check => {
            let warnings = check_config(config)?;
            for w in &warnings {
                eprintln!("warning: {w}");
            }
            println!("config ok");
        }
        ConfigCommand::Schema => println!("{}", schema_json()?),
    }
    Ok(())
}

/// Execute a VM or registry command against `tart`.
pub async fn dispatch(tart: &Tart, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::List { source } => {
            let vms = tart.list(&args::list_options(source)).await?;
            if json {
                println!("{}", format::json(&vms)?);
            } else {
                print!("{}", format::vm_table(&vms));
            }
        }
        Commands::State { name } => {
            let Some(vm) = tart.state(&name).await? else {
                bail!("VM {name} does not exist");
            };
            if json {
                println!("{}", format::json(&vm)?);
            } else {
                println!("{}", format::vm_line(&vm));
            }
        }
        Commands::Exists { name } => println!("{}", tart.exists(&name).await?),
        Commands::Create {
            name,
            from_ipsw,
            linux,
            disk_size,
        } => {
            tart.create(&name, &args::create_options(from_ipsw, linux, disk_size))
                .await?;
            info!(target: "tart.cli", vm = %name, "created");
        }
        Commands::Clone {
            source,
            new_name,
            insecure,
            concurrency,
        } => {
            tart.clone_vm(&source, &new_name, &args::clone_options(insecure, concurrency))
                .await?;
        }
        Commands::Run(run_args) => run(tart, run_args, json).await?,
        Commands::Set {
            name,
            cpu,
            memory,
            display,
            random_mac,
        } => {
            tart.set(&name, &args::set_options(cpu, memory, display, random_mac))
                .await?;
        }
        Commands::Get { name, format } => {
            println!("{}", tart.get(&name, format.map(Into::into)).await?);
        }
        Commands::Rename { old_name, new_name } => tart.rename(&old_name, &new_name).await?,
        Commands::Import { path, name } => tart.import(&path, &name).await?,
        Commands::Export { name, path } => tart.export(&name, path.as_deref()).await?,
        Commands::Suspend { name } => tart.suspend(&name).await?,
        Commands::Stop { name, timeout } => tart.stop(&name, timeout).await?,
        Commands::Delete { name } => tart.delete(&name).await?,
        Commands::Prune {
            entries,
            older_than,
            space_budget,
        } => {
            tart.prune(&args::prune_options(entries, older_than, space_budget))
                .await?;
        }
        Commands::Login {
            username,
            password_stdin,
            insecure,
            no_validate,
        } => {
            let password = if password_stdin {
                Some(read_password(std::io::stdin().lock())?)
            } else {
                None
            };
            let opts = LoginOptions {
                username,
                password,
                insecure,
                no_validate,
            };
            tart.login(&opts).await?;
        }
        Commands::Logout => tart.logout().await?,
        Commands::Push {
            name,
            remote_names,
            insecure,
            concurrency,
            chunk_size,
            populate_cache,
        } => {
            let opts = args::push_options(
                remote_names,
                insecure,
                concurrency,
                chunk_size,
                populate_cache,
            );
            tart.push(&name, &opts).await?;
        }
        Commands::Pull {
            name,
            insecure,
            concurrency,
        } => {
            tart.pull(&name, &args::pull_options(insecure, concurrency))
                .await?;
        }
        Commands::Ip {
            name,
            wait,
            resolver,
        } => {
            println!("{}", tart.ip(&name, &args::ip_options(wait, resolver)).await?);
        }
        Commands::Config(cmd) => bail!("`config {cmd:?}` is handled before connecting to tart"),
    }
    Ok(())
}

async fn run(tart: &Tart, run_args: RunArgs, json: bool) -> Result<()> {
    let name = run_args.name.clone();
    let attach = run_args.attach;
    let opts = RunOptions::from(run_args);

    match tart.run(&name, &opts).await? {
        Readiness::Ready(vm) => {
            let pid = vm.pid();
            if json {
                println!("{}", serde_json::json!({ "name": name, "pid": pid, "ready": true }));
            } else {
                match pid {
                    Some(pid) => println!("{name} is up (pid {pid})"),
                    None => println!("{name} is up"),
                }
            }
            if attach {
                let exit = vm.wait().await?;
                eprintln!("{name} exited with {exit}");
            }
        }
        Readiness::Exited(result) => {
            print!("{}", String::from_utf8_lossy(&result.stdout));
            bail!("{name} exited before reporting readiness");
        }
    }
    Ok(())
}
