//! Configuration for shop service module

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `AUTOSHOP_DATABASE_URL`
pub const ENV_PREFIX: &str = "AUTOSHOP_";

/// What deleting a task does to a linked invoice that is already paid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDeletePolicy {
    /// Keep the invoice header, drop its line items
    #[default]
    StripLineItems,
    /// Refuse the deletion with a conflict
    RejectIfPaid,
}

/// Shop service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Connection pool size; one keeps a single writer
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Log every SQL statement through sqlx
    #[serde(default)]
    pub sqlx_logging: bool,

    #[serde(default)]
    pub task_delete_policy: TaskDeletePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            sqlx_logging: false,
            task_delete_policy: TaskDeletePolicy::default(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file if given, then `AUTOSHOP_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}

fn default_database_url() -> String {
    "sqlite://autoshop.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.database_url, "sqlite://autoshop.db?mode=rwc");
        assert_eq!(cfg.max_connections, 1);
        assert!(!cfg.sqlx_logging);
        assert_eq!(cfg.task_delete_policy, TaskDeletePolicy::StripLineItems);
    }

    #[test]
    fn test_yaml_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shop.yaml",
                "database_url: sqlite://shop.db?mode=rwc\ntask_delete_policy: reject_if_paid\n",
            )?;
            jail.set_env("AUTOSHOP_MAX_CONNECTIONS", "4");

            let cfg: Config = Config::figment(Some(Path::new("shop.yaml"))).extract()?;
            assert_eq!(cfg.database_url, "sqlite://shop.db?mode=rwc");
            assert_eq!(cfg.max_connections, 4);
            assert_eq!(cfg.task_delete_policy, TaskDeletePolicy::RejectIfPaid);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("shop.yaml", "retention_days: 30\n")?;
            let result = Config::figment(Some(Path::new("shop.yaml"))).extract::<Config>();
            assert!(result.is_err());
            Ok(())
        });
    }
}
