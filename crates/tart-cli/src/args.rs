// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line definitions for `tartctl`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tart_client::{
    CloneOptions, ConfigFormat, CreateOptions, DirMount, Display, IpOptions, IpResolver,
    ListOptions, PruneEntries, PruneOptions, PullOptions, PushOptions, RunOptions, SetOptions,
    VmSource,
};

#[derive(Parser, Debug)]
#[command(name = "tartctl", version, about = "Manage tart virtual machines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Registry host for login and logout; overrides the config file.
    #[arg(long, global = true)]
    pub registry: Option<String>,
}

#[allow(clippy::large_enum_variant)]
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List local VMs and cached images.
    List {
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },

    /// Print a VM's state.
    State { name: String },

    /// Print whether a VM exists.
    Exists { name: String },

    /// Create a VM.
    Create {
        name: String,
        /// Install macOS from this IPSW (path, URL or `latest`).
        #[arg(long)]
        from_ipsw: Option<String>,
        /// Create an empty Linux VM.
        #[arg(long)]
        linux: bool,
        /// Disk size in GB.
        #[arg(long)]
        disk_size: Option<u32>,
    },

    /// Clone a local VM or remote image.
    Clone {
        source: String,
        new_name: String,
        #[arg(long)]
        insecure: bool,
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Start a VM and return once it is up.
    Run(RunArgs),

    /// Change a VM's hardware settings.
    Set {
        name: String,
        #[arg(long)]
        cpu: Option<u32>,
        /// Memory in MB.
        #[arg(long)]
        memory: Option<u64>,
        /// Display resolution as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_display)]
        display: Option<Display>,
        #[arg(long)]
        random_mac: bool,
    },

    /// Print a VM's configuration.
    Get {
        name: String,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Rename a local VM.
    Rename { old_name: String, new_name: String },

    /// Import a VM from a .tvm archive.
    Import { path: String, name: String },

    /// Export a VM to a .tvm archive.
    Export { name: String, path: Option<String> },

    /// Suspend a running VM.
    Suspend { name: String },

    /// Stop a running VM.
    Stop {
        name: String,
        /// Seconds to wait for a graceful shutdown.
        #[arg(long)]
        timeout: Option<u32>,
    },

    /// Delete a VM.
    Delete { name: String },

    /// Prune caches or VMs.
    Prune {
        #[arg(long, value_enum)]
        entries: Option<EntriesArg>,
        /// Remove entries not accessed for this many days.
        #[arg(long)]
        older_than: Option<u32>,
        /// Keep removing least recently used entries until under this many GB.
        #[arg(long)]
        space_budget: Option<u32>,
    },

    /// Log in to the registry.
    Login {
        #[arg(long)]
        username: Option<String>,
        /// Read the password from stdin.
        #[arg(long)]
        password_stdin: bool,
        #[arg(long)]
        insecure: bool,
        #[arg(long)]
        no_validate: bool,
    },

    /// Log out of the registry.
    Logout,

    /// Push a VM to one or more remote references.
    Push {
        name: String,
        #[arg(required = true)]
        remote_names: Vec<String>,
        #[arg(long)]
        insecure: bool,
        #[arg(long)]
        concurrency: Option<u32>,
        /// Layer chunk size in MB.
        #[arg(long)]
        chunk_size: Option<u32>,
        #[arg(long)]
        populate_cache: bool,
    },

    /// Pull a remote image.
    Pull {
        name: String,
        #[arg(long)]
        insecure: bool,
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Print a VM's IP address.
    Ip {
        name: String,
        /// Seconds to wait for an address.
        #[arg(long)]
        wait: Option<u32>,
        #[arg(long, value_enum)]
        resolver: Option<ResolverArg>,
    },

    /// Inspect the client configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration and print warnings.
    Check,
    /// Print the JSON schema of the config file.
    Schema,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    pub name: String,

    /// Wait for the VM process to exit instead of returning once it is up.
    #[arg(long)]
    pub attach: bool,

    #[arg(long)]
    pub no_graphics: bool,
    #[arg(long)]
    pub serial: bool,
    #[arg(long)]
    pub serial_path: Option<String>,
    #[arg(long)]
    pub no_audio: bool,
    #[arg(long)]
    pub no_clipboard: bool,
    #[arg(long)]
    pub recovery: bool,
    #[arg(long)]
    pub vnc: bool,
    #[arg(long)]
    pub vnc_experimental: bool,
    /// Additional disk image; repeatable.
    #[arg(long)]
    pub disk: Vec<String>,
    #[arg(long)]
    pub rosetta: Option<String>,
    /// Shared directory as `[name:]path[:ro,tag=TAG,sync=MODE]`; repeatable.
    #[arg(long)]
    pub dir: Vec<DirMount>,
    #[arg(long)]
    pub net_bridged: Option<String>,
    #[arg(long)]
    pub net_softnet: bool,
    #[arg(long)]
    pub net_softnet_allow: Option<String>,
    #[arg(long)]
    pub net_host: bool,
    #[arg(long)]
    pub root_disk_opts: Option<String>,
    #[arg(long)]
    pub suspendable: bool,
    #[arg(long)]
    pub capture_system_keys: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(a: RunArgs) -> Self {
        RunOptions {
            no_graphics: a.no_graphics,
            serial: a.serial,
            serial_path: a.serial_path,
            no_audio: a.no_audio,
            no_clipboard: a.no_clipboard,
            recovery: a.recovery,
            vnc: a.vnc,
            vnc_experimental: a.vnc_experimental,
            disk: a.disk,
            rosetta: a.rosetta,
            dir: a.dir,
            net_bridged: a.net_bridged,
            net_softnet: a.net_softnet,
            net_softnet_allow: a.net_softnet_allow,
            net_host: a.net_host,
            root_disk_opts: a.root_disk_opts,
            suspendable: a.suspendable,
            capture_system_keys: a.capture_system_keys,
        }
    }
}

// ---------------------------------------------------------------------------
// Value enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Local,
    Remote,
}

impl From<SourceArg> for VmSource {
    fn from(v: SourceArg) -> Self {
        match v {
            SourceArg::Local => VmSource::Local,
            SourceArg::Remote => VmSource::Remote,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ConfigFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Text => ConfigFormat::Text,
            FormatArg::Json => ConfigFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EntriesArg {
    Caches,
    Vms,
}

impl From<EntriesArg> for PruneEntries {
    fn from(v: EntriesArg) -> Self {
        match v {
            EntriesArg::Caches => PruneEntries::Caches,
            EntriesArg::Vms => PruneEntries::Vms,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResolverArg {
    Dhcp,
    Arp,
}

impl From<ResolverArg> for IpResolver {
    fn from(v: ResolverArg) -> Self {
        match v {
            ResolverArg::Dhcp => IpResolver::Dhcp,
            ResolverArg::Arp => IpResolver::Arp,
        }
    }
}

// ---------------------------------------------------------------------------
// Option builders
// ---------------------------------------------------------------------------

pub fn list_options(source: Option<SourceArg>) -> ListOptions {
    ListOptions {
        source: source.map(Into::into),
    }
}

pub fn create_options(
    from_ipsw: Option<String>,
    linux: bool,
    disk_size: Option<u32>,
) -> CreateOptions {
    CreateOptions {
        from_ipsw,
        linux,
        disk_size,
    }
}

pub fn clone_options(insecure: bool, concurrency: Option<u32>) -> CloneOptions {
    CloneOptions {
        insecure,
        concurrency,
    }
}

pub fn set_options(
    cpu: Option<u32>,
    memory: Option<u64>,
    display: Option<Display>,
    random_mac: bool,
) -> SetOptions {
    SetOptions {
        cpu,
        memory,
        display,
        random_mac,
    }
}

pub fn prune_options(
    entries: Option<EntriesArg>,
    older_than: Option<u32>,
    space_budget: Option<u32>,
) -> PruneOptions {
    PruneOptions {
        entries: entries.map(Into::into),
        older_than,
        space_budget,
    }
}

pub fn push_options(
    remote_names: Vec<String>,
    insecure: bool,
    concurrency: Option<u32>,
    chunk_size: Option<u32>,
    populate_cache: bool,
) -> PushOptions {
    PushOptions {
        remote_names,
        insecure,
        concurrency,
        chunk_size,
        populate_cache,
    }
}

pub fn pull_options(insecure: bool, concurrency: Option<u32>) -> PullOptions {
    PullOptions {
        insecure,
        concurrency,
    }
}

pub fn ip_options(wait: Option<u32>, resolver: Option<ResolverArg>) -> IpOptions {
    IpOptions {
        wait,
        resolver: resolver.map(Into::into),
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_display(s: &str) -> Result<Display, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid display width `{w}`"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid display height `{h}`"))?;
    Ok(Display { width, height })
}
