// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`Tart`] client: one method per tart operation.

use std::sync::Arc;

use tart_args::{
    CloneOptions, ConfigFormat, CreateOptions, IpOptions, ListOptions, LoginOptions,
    PruneOptions, PullOptions, PushOptions, RunOptions, SetOptions,
};
use tart_config::{TartConfig, TartEnv, validate_config};
use tart_error::{TartError, TartResult};
use tart_exec::{ExecutionResult, Executor, Invocation, ProcessRunner, READY_MARKER, Readiness};
use tracing::{debug, info, warn};

use crate::vm_state::{VmState, VmStatus, decode_list, decode_text};

/// Async client for the tart CLI.
///
/// Cheap to clone; clones share the executor and the resolved environment.
/// Every failure is wrapped with the operation name and its target.
#[derive(Debug, Clone)]
pub struct Tart {
    executor: Arc<dyn Executor>,
    env: Arc<TartEnv>,
    registry: Option<String>,
}

impl Tart {
    /// Locate the tart executable and resolve its home directory.
    ///
    /// # Errors
    ///
    /// [`TartError::PreconditionFailed`] if the configuration is invalid,
    /// the executable is not on `PATH`, or the home directory cannot be
    /// determined or created.
    pub fn new(config: &TartConfig) -> TartResult<Self> {
        let warnings = validate_config(config)
            .map_err(|e| TartError::precondition(format!("invalid configuration: {e}")))?;
        for w in &warnings {
            warn!(target: "tart.config", "{w}");
        }

        let program = tart_which::which(config.binary())
            .ok_or_else(|| TartError::precondition("tart command not found in PATH"))?;
        let env = TartEnv::resolve(config).map_err(|e| TartError::precondition(e.to_string()))?;
        debug!(target: "tart.client", program = %program.display(), "using tart executable");

        let mut tart = Self::with_executor(Arc::new(ProcessRunner::new(program)), env);
        tart.registry = config.registry.clone();
        Ok(tart)
    }

    /// Build a client around any [`Executor`].
    pub fn with_executor(executor: Arc<dyn Executor>, env: TartEnv) -> Self {
        Self {
            executor,
            env: Arc::new(env),
            registry: None,
        }
    }

    /// Registry host used by [`login`](Self::login) and
    /// [`logout`](Self::logout).
    #[must_use]
    pub fn with_registry(mut self, host: impl Into<String>) -> Self {
        self.registry = Some(host.into());
        self
    }

    /// The resolved environment.
    pub fn env(&self) -> &TartEnv {
        &self.env
    }

    /// The configured registry host.
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    // -- plumbing ----------------------------------------------------------

    fn invocation(&self, args: Vec<String>) -> TartResult<Invocation> {
        self.env
            .check()
            .map_err(|e| TartError::precondition(e.to_string()))?;
        Ok(Invocation::new(args).envs(self.env.overlay()))
    }

    async fn capture(&self, invocation: Invocation) -> TartResult<ExecutionResult> {
        self.executor.capture(&invocation).await
    }

    async fn exec(&self, args: Vec<String>) -> TartResult<ExecutionResult> {
        let invocation = self.invocation(args)?;
        self.capture(invocation).await
    }

    async fn find(&self, name: &str) -> TartResult<Option<VmState>> {
        let out = self.exec(tart_args::list(&ListOptions::default())).await?;
        Ok(decode_list(&out)?.into_iter().find(|vm| vm.name == name))
    }

    async fn ensure_absent(&self, name: &str) -> TartResult<()> {
        match self.find(name).await? {
            Some(_) => Err(TartError::precondition(format!(
                "VM with name {name} already exists"
            ))),
            None => Ok(()),
        }
    }

    fn registry_host(&self) -> TartResult<&str> {
        self.registry
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TartError::precondition("no registry host configured"))
    }

    // -- queries -----------------------------------------------------------

    /// All VMs, optionally restricted to one source.
    pub async fn list(&self, opts: &ListOptions) -> TartResult<Vec<VmState>> {
        async { decode_list(&self.exec(tart_args::list(opts)).await?) }
            .await
            .map_err(|e| e.context("list", None))
    }

    /// The descriptor of `name`, or `None` if no such VM exists.
    pub async fn state(&self, name: &str) -> TartResult<Option<VmState>> {
        self.find(name)
            .await
            .map_err(|e| e.context("state", Some(name)))
    }

    /// Whether a VM called `name` exists.
    pub async fn exists(&self, name: &str) -> TartResult<bool> {
        Ok(self.state(name).await?.is_some())
    }

    async fn has_status(&self, name: &str, status: VmStatus) -> TartResult<bool> {
        Ok(self
            .state(name)
            .await?
            .is_some_and(|vm| vm.state == status))
    }

    /// Whether `name` is running. A missing VM is not running.
    pub async fn is_running(&self, name: &str) -> TartResult<bool> {
        self.has_status(name, VmStatus::Running).await
    }

    /// Whether `name` is stopped.
    pub async fn is_stopped(&self, name: &str) -> TartResult<bool> {
        self.has_status(name, VmStatus::Stopped).await
    }

    /// Whether `name` is suspended.
    pub async fn is_suspended(&self, name: &str) -> TartResult<bool> {
        self.has_status(name, VmStatus::Suspended).await
    }

    /// The VM's IP address, trimmed.
    pub async fn ip(&self, name: &str, opts: &IpOptions) -> TartResult<String> {
        async { decode_text(&self.exec(tart_args::ip(name, opts)).await?) }
            .await
            .map_err(|e| e.context("ip", Some(name)))
    }

    /// The VM's configuration as printed by `tart get`, trimmed.
    pub async fn get(&self, name: &str, format: Option<ConfigFormat>) -> TartResult<String> {
        async { decode_text(&self.exec(tart_args::get(name, format)).await?) }
            .await
            .map_err(|e| e.context("get", Some(name)))
    }

    // -- lifecycle ---------------------------------------------------------

    /// Create a VM. Fails before spawning if `name` is taken.
    pub async fn create(&self, name: &str, opts: &CreateOptions) -> TartResult<()> {
        async {
            self.ensure_absent(name).await?;
            self.exec(tart_args::create(name, opts)).await?;
            Ok::<(), TartError>(())
        }
        .await
        .map_err(|e| e.context("create", Some(name)))
    }

    /// Clone `source` (local or remote) into `new_name`. Fails before
    /// spawning if `new_name` is taken.
    pub async fn clone_vm(
        &self,
        source: &str,
        new_name: &str,
        opts: &CloneOptions,
    ) -> TartResult<()> {
        async {
            self.ensure_absent(new_name).await?;
            self.exec(tart_args::clone(source, new_name, opts)).await?;
            Ok::<(), TartError>(())
        }
        .await
        .map_err(|e| e.context("clone", Some(new_name)))
    }

    /// Import a `.tvm` archive as `name`. Fails before spawning if `name`
    /// is taken.
    pub async fn import(&self, path: &str, name: &str) -> TartResult<()> {
        async {
            self.ensure_absent(name).await?;
            self.exec(tart_args::import(path, name)).await?;
            Ok::<(), TartError>(())
        }
        .await
        .map_err(|e| e.context("import", Some(name)))
    }

    /// Start `name` and return once it reports readiness.
    ///
    /// The VM must exist and must not already be running. On
    /// [`Readiness::Ready`] the VM keeps running after this returns; stop it
    /// with [`stop`](Self::stop) or by signalling the returned pid.
    pub async fn run(&self, name: &str, opts: &RunOptions) -> TartResult<Readiness> {
        async {
            match self.find(name).await? {
                None => {
                    return Err(TartError::precondition(format!(
                        "VM with name {name} does not exist"
                    )));
                }
                Some(vm) if vm.state == VmStatus::Running => {
                    return Err(TartError::precondition("VM is already running"));
                }
                Some(_) => {}
            }

            let invocation = self.invocation(tart_args::run(name, opts))?;
            let readiness = self.executor.watch(&invocation, READY_MARKER).await?;
            match &readiness {
                Readiness::Ready(vm) => {
                    info!(target: "tart.client", vm = name, pid = ?vm.pid(), "VM is up");
                }
                Readiness::Exited(_) => {
                    warn!(target: "tart.client", vm = name, "VM exited before reporting readiness");
                }
            }
            Ok(readiness)
        }
        .await
        .map_err(|e| e.context("run", Some(name)))
    }

    /// Change CPU, memory, display or MAC address.
    pub async fn set(&self, name: &str, opts: &SetOptions) -> TartResult<()> {
        self.exec(tart_args::set(name, opts))
            .await
            .map(drop)
            .map_err(|e| e.context("set", Some(name)))
    }

    /// Rename a local VM.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> TartResult<()> {
        self.exec(tart_args::rename(old_name, new_name))
            .await
            .map(drop)
            .map_err(|e| e.context("rename", Some(old_name)))
    }

    /// Export `name` to a `.tvm` archive; tart picks the path when `None`.
    pub async fn export(&self, name: &str, path: Option<&str>) -> TartResult<()> {
        self.exec(tart_args::export(name, path))
            .await
            .map(drop)
            .map_err(|e| e.context("export", Some(name)))
    }

    /// Suspend a running VM.
    pub async fn suspend(&self, name: &str) -> TartResult<()> {
        self.exec(tart_args::suspend(name))
            .await
            .map(drop)
            .map_err(|e| e.context("suspend", Some(name)))
    }

    /// Stop a VM, waiting up to `timeout_secs` for a graceful shutdown.
    pub async fn stop(&self, name: &str, timeout_secs: Option<u32>) -> TartResult<()> {
        self.exec(tart_args::stop(name, timeout_secs))
            .await
            .map(drop)
            .map_err(|e| e.context("stop", Some(name)))
    }

    /// Delete a VM.
    pub async fn delete(&self, name: &str) -> TartResult<()> {
        self.exec(tart_args::delete(name))
            .await
            .map(drop)
            .map_err(|e| e.context("delete", Some(name)))
    }

    /// Prune caches or VMs.
    pub async fn prune(&self, opts: &PruneOptions) -> TartResult<()> {
        self.exec(tart_args::prune(opts))
            .await
            .map(drop)
            .map_err(|e| e.context("prune", None))
    }

    // -- registry ----------------------------------------------------------

    /// Log in to the configured registry. A password, when given, is
    /// written to tart's stdin and never appears in the argument list.
    pub async fn login(&self, opts: &LoginOptions) -> TartResult<()> {
        let host = self.registry.as_deref();
        async {
            let host = self.registry_host()?;
            let mut invocation = self.invocation(tart_args::login(host, opts))?;
            if let Some(payload) = opts.stdin_payload() {
                invocation = invocation.stdin(payload);
            }
            self.capture(invocation).await?;
            Ok::<(), TartError>(())
        }
        .await
        .map_err(|e| e.context("login", host))
    }

    /// Log out of the configured registry.
    pub async fn logout(&self) -> TartResult<()> {
        let host = self.registry.as_deref();
        async {
            let host = self.registry_host()?;
            self.exec(tart_args::logout(host)).await?;
            Ok::<(), TartError>(())
        }
        .await
        .map_err(|e| e.context("logout", host))
    }

    /// Push a local VM to one or more remote references.
    pub async fn push(&self, name: &str, opts: &PushOptions) -> TartResult<()> {
        self.exec(tart_args::push(name, opts))
            .await
            .map(drop)
            .map_err(|e| e.context("push", Some(name)))
    }

    /// Pull a remote image into the OCI cache.
    pub async fn pull(&self, name: &str, opts: &PullOptions) -> TartResult<()> {
        self.exec(tart_args::pull(name, opts))
            .await
            .map(drop)
            .map_err(|e| e.context("pull", Some(name)))
    }
}
