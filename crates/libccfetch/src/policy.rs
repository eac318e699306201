use crate::{
    command::CcaseCommand,
    config::FetchConfig,
    error::{FetchError, Result},
};

/// Gate consulted before any command that talks to the server.
pub trait NetworkPolicy: Send + Sync {
    /// Fail with [`FetchError::NetworkAccess`] when `command` may not reach `host`.
    fn check(&self, command: &CcaseCommand, host: &str, url: &str) -> Result<()>;
}

/// Permits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowNetwork;

impl NetworkPolicy for AllowNetwork {
    fn check(&self, _command: &CcaseCommand, _host: &str, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// Refuses every network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNetwork;

impl NetworkPolicy for NoNetwork {
    fn check(&self, command: &CcaseCommand, _host: &str, url: &str) -> Result<()> {
        Err(FetchError::NetworkAccess {
            command: command.to_string(),
            url: url.to_string(),
        })
    }
}

/// Permits only the listed hosts.
#[derive(Debug, Clone)]
pub struct HostAllowList {
    /// Host names that may be contacted.
    hosts: Vec<String>,
}

impl HostAllowList {
    /// Allow exactly `hosts`.
    pub fn new(hosts: Vec<String>) -> Self {
        Self { hosts }
    }
}

impl NetworkPolicy for HostAllowList {
    fn check(&self, command: &CcaseCommand, host: &str, url: &str) -> Result<()> {
        if self.hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host)) {
            return Ok(());
        }
        Err(FetchError::NetworkAccess {
            command: command.to_string(),
            url: url.to_string(),
        })
    }
}

/// Choose the policy described by `config`.
pub fn from_config(config: &FetchConfig) -> Box<dyn NetworkPolicy> {
    if config.no_network {
        Box::new(NoNetwork)
    } else if !config.allowed_hosts.is_empty() {
        Box::new(HostAllowList::new(config.allowed_hosts.clone()))
    } else {
        Box::new(AllowNetwork)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::command::Verb;

    use super::*;

    /// A minimal command for policy checks.
    fn mkview() -> CcaseCommand {
        CcaseCommand {
            verb: Verb::MkView,
            program: PathBuf::from("rcleartool"),
            args: vec!["mkview".into()],
        }
    }

    #[test]
    fn no_network_names_command_and_url() {
        let err = NoNetwork
            .check(&mkview(), "cc.example.org", "ccrc://cc.example.org/ccrc")
            .unwrap_err();
        assert!(matches!(err, FetchError::NetworkAccess { .. }));
        let text = err.to_string();
        assert!(text.contains("rcleartool mkview"));
        assert!(text.contains("ccrc://cc.example.org/ccrc"));
    }

    #[test]
    fn allow_list_matches_host_case_insensitively() {
        let policy = HostAllowList::new(vec!["CC.example.org".to_string()]);
        assert!(policy.check(&mkview(), "cc.example.org", "u").is_ok());
        assert!(policy.check(&mkview(), "other.example.org", "u").is_err());
    }

    #[test]
    fn config_selects_policy() {
        let denied = FetchConfig {
            no_network: true,
            allowed_hosts: vec!["cc.example.org".to_string()],
            ..FetchConfig::default()
        };
        assert!(
            from_config(&denied)
                .check(&mkview(), "cc.example.org", "u")
                .is_err()
        );

        let open = FetchConfig::default();
        assert!(from_config(&open).check(&mkview(), "anywhere", "u").is_ok());
    }
}
