//! The docker CLI flag table.
//!
//! [`FlagRegistry::builtin`] is the single source of truth for which docker
//! flags translate to Compose and where they land. Short aliases share the
//! rule of their long form.
//!
//! The registry also knows which flags are switches, so the invocation
//! parser can tell `-d nginx` (a switch and an image) from `-p 80:80` (a flag
//! and its value).

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::warn;
use runcompose_core::rule::{FlagRule, Transform};

/// Flags that never consume the following word as their value.
const SWITCHES: [&str; 16] = [
    "i",
    "interactive",
    "t",
    "tty",
    "d",
    "detach",
    "rm",
    "init",
    "help",
    "privileged",
    "P",
    "publish-all",
    "no-healthcheck",
    "oom-kill-disable",
    "read-only",
    "sig-proxy",
];

/// An immutable lookup table from flag name to [`FlagRule`].
///
/// Names are stored without leading dashes. Cloning is cheap: rules are
/// shared behind [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    rules: HashMap<String, Arc<FlagRule>>,
    switches: HashSet<String>,
}

impl FlagRegistry {
    /// Returns the registry holding every supported docker flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use runcompose_parser::FlagRegistry;
    ///
    /// let registry = FlagRegistry::builtin();
    /// assert_eq!(registry.get("p").map(|rule| rule.path()), Some("ports"));
    /// assert!(registry.is_switch("rm"));
    /// ```
    pub fn builtin() -> Self {
        use Transform::*;

        FlagRegistryBuilder::new()
            .add_flag("add-host", Array, "extra_hosts")
            .add_flag("blkio-weight", Int, "blkio_config/weight")
            .add_flag("blkio-weight-device", DeviceWeight, "blkio_config/weight_device")
            .add_flag("cap-add", Array, "cap_add")
            .add_flag("cap-drop", Array, "cap_drop")
            .add_flag("cgroup-parent", Value, "cgroup_parent")
            .add_flag("cgroupns", Value, "cgroup")
            .add_flag("cpu-period", Value, "cpu_period")
            .add_flag("cpu-quota", Value, "cpu_quota")
            .add_flag("cpu-rt-period", Value, "cpu_rt_period")
            .add_flag("cpu-rt-runtime", Value, "cpu_rt_runtime")
            .add_flag("cpu-shares", Int, "cpu_shares")
            .add_flag("cpus", Float, "deploy/resources/limits/cpus")
            .add_flag("cpuset-cpus", Value, "cpuset")
            .add_inert("detach")
            .add_flag("device", Array, "devices")
            .add_flag("device-cgroup-rule", Array, "device_cgroup_rules")
            .add_flag("device-read-bps", DeviceRate, "blkio_config/device_read_bps")
            .add_flag("device-read-iops", DeviceRate, "blkio_config/device_read_iops")
            .add_flag("device-write-bps", DeviceRate, "blkio_config/device_write_bps")
            .add_flag("device-write-iops", DeviceRate, "blkio_config/device_write_iops")
            .add_flag("dns", Array, "dns")
            .add_flag("dns-opt", Array, "dns_opt")
            .add_flag("dns-search", Array, "dns_search")
            .add_flag("domainname", Value, "domainname")
            .add_flag("entrypoint", Array, "entrypoint")
            .add_flag("env", Envs, "environment")
            .add_flag("env-file", Array, "env_file")
            .add_flag("expose", Array, "expose")
            .add_flag("gpus", Gpus, "deploy")
            .add_flag("group-add", Array, "group_add")
            .add_flag("health-cmd", Value, "healthcheck/test")
            .add_flag("health-interval", Value, "healthcheck/interval")
            .add_flag("health-retries", Value, "healthcheck/retries")
            .add_flag("health-start-period", Value, "healthcheck/start_period")
            .add_flag("health-start-interval", Value, "healthcheck/start_interval")
            .add_flag("health-timeout", Value, "healthcheck/timeout")
            .add_flag("hostname", Value, "hostname")
            .add_flag("init", Switch, "init")
            .add_flag("interactive", Switch, "stdin_open")
            .add_flag("ip", Value, "networks/{network}/ipv4_address")
            .add_flag("ip6", Value, "networks/{network}/ipv6_address")
            .add_flag("ipc", Value, "ipc")
            .add_flag("isolation", Value, "isolation")
            .add_flag("label", Array, "labels")
            .add_flag("link", Array, "links")
            .add_flag("link-local-ip", Array, "networks/{network}/link_local_ips")
            .add_flag("log-driver", Value, "logging/driver")
            .add_flag("log-opt", Map, "logging/options")
            .add_flag("mac-address", Value, "mac_address")
            .add_flag("memory", Value, "deploy/resources/limits/memory")
            .add_flag("memory-reservation", Value, "deploy/resources/reservations/memory")
            .add_flag("memory-swap", Value, "memswap_limit")
            .add_flag("memory-swappiness", Value, "mem_swappiness")
            .add_flag("mount", MapArray, "volumes")
            .add_flag("name", Value, "container_name")
            .add_flag("network", Networks, "network_mode")
            .add_flag("network-alias", Array, "networks/{network}/aliases")
            .add_flag("no-healthcheck", Switch, "healthcheck/disable")
            .add_flag("oom-kill-disable", Switch, "oom_kill_disable")
            .add_flag("oom-score-adj", Value, "oom_score_adj")
            .add_flag("pid", Value, "pid")
            .add_flag("pids-limit", Int, "deploy/resources/limits/pids")
            .add_flag("platform", Value, "platform")
            .add_flag("privileged", Switch, "privileged")
            .add_flag("publish", Array, "ports")
            .add_flag("pull", Value, "pull_policy")
            .add_flag("read-only", Switch, "read_only")
            .add_flag("restart", Value, "restart")
            .add_inert("rm")
            .add_flag("runtime", Value, "runtime")
            .add_flag("security-opt", Array, "security_opt")
            .add_flag("shm-size", Value, "shm_size")
            .add_flag("stop-signal", Value, "stop_signal")
            .add_flag("stop-timeout", Value, "stop_grace_period")
            .add_flag("storage-opt", Map, "storage_opt")
            .add_flag("sysctl", Array, "sysctls")
            .add_flag("tmpfs", Value, "tmpfs")
            .add_flag("tty", Switch, "tty")
            .add_flag("ulimit", Ulimits, "ulimits")
            .add_flag("user", Value, "user")
            .add_flag("userns", Value, "userns_mode")
            .add_flag("uts", Value, "uts")
            .add_flag("volume", Array, "volumes")
            .add_flag("volumes-from", Array, "volumes_from")
            .add_flag("workdir", Value, "working_dir")
            // Aliases
            .add_alias("net", "network")
            .add_alias("c", "cpu-shares")
            .add_alias("d", "detach")
            .add_alias("e", "env")
            .add_alias("h", "hostname")
            .add_alias("i", "interactive")
            .add_alias("l", "label")
            .add_alias("m", "memory")
            .add_alias("p", "publish")
            .add_alias("t", "tty")
            .add_alias("u", "user")
            .add_alias("v", "volume")
            .add_alias("w", "workdir")
            .add_switches(SWITCHES)
            .build()
    }

    /// Look up the rule for a flag name given without dashes.
    pub fn get(&self, name: &str) -> Option<&FlagRule> {
        self.rules.get(name).map(Arc::as_ref)
    }

    /// Returns `true` if the flag never takes a separate value word.
    pub fn is_switch(&self, name: &str) -> bool {
        self.switches.contains(name)
    }

    /// Returns the number of registered names, aliases included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no flag is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builder for a [`FlagRegistry`].
///
/// # Example
///
/// ```
/// use runcompose_core::rule::Transform;
/// use runcompose_parser::FlagRegistryBuilder;
///
/// let registry = FlagRegistryBuilder::new()
///     .add_flag("publish", Transform::Array, "ports")
///     .add_alias("p", "publish")
///     .add_switches(["rm"])
///     .build();
///
/// assert_eq!(registry.get("p"), registry.get("publish"));
/// ```
#[derive(Debug, Default)]
pub struct FlagRegistryBuilder {
    rules: HashMap<String, Arc<FlagRule>>,
    switches: HashSet<String>,
}

impl FlagRegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag that transforms its value into `path`.
    pub fn add_flag(mut self, name: &str, transform: Transform, path: &'static str) -> Self {
        self.rules
            .insert(name.to_string(), Arc::new(FlagRule::new(transform, path)));
        self
    }

    /// Register a flag that is recognized but produces nothing.
    pub fn add_inert(mut self, name: &str) -> Self {
        self.rules
            .insert(name.to_string(), Arc::new(FlagRule::inert()));
        self
    }

    /// Make `alias` share the rule of the already registered `name`.
    pub fn add_alias(mut self, alias: &str, name: &str) -> Self {
        match self.rules.get(name) {
            Some(rule) => {
                let rule = Arc::clone(rule);
                self.rules.insert(alias.to_string(), rule);
            }
            None => warn!(alias = alias, name = name; "Alias refers to an unregistered flag"),
        }
        self
    }

    /// Declare flags that never consume a separate value word.
    pub fn add_switches<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        self.switches
            .extend(names.into_iter().map(str::to_string));
        self
    }

    /// Consume the builder and return the registry.
    pub fn build(self) -> FlagRegistry {
        FlagRegistry {
            rules: self.rules,
            switches: self.switches,
        }
    }
}
