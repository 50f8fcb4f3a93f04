//! CLI argument structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::RuleGroupIdentifier;

/// Mutate single rules in remotely stored rule groups
#[derive(Parser, Debug)]
#[command(name = "rgmut")]
#[command(about = "rgmut - Pause, delete, rename and move alert rules safely", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (YAML or TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Coordinates of the rule group to mutate
#[derive(Args, Debug, Clone, PartialEq)]
pub struct GroupArgs {
    /// Rule source name
    #[arg(long, default_value = "grafana")]
    pub source: String,

    /// Namespace (folder) holding the group
    #[arg(short = 'n', long)]
    pub namespace: String,

    /// Rule group name
    #[arg(short = 'g', long)]
    pub group: String,
}

impl GroupArgs {
    pub fn identifier(&self) -> RuleGroupIdentifier {
        RuleGroupIdentifier::new(&self.source, &self.namespace, &self.group)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Pause evaluation of one or more rules
    Pause {
        #[command(flatten)]
        target: GroupArgs,

        /// Rule uid (repeatable)
        #[arg(long = "uid", required = true)]
        uids: Vec<String>,
    },

    /// Resume evaluation of one or more rules
    Resume {
        #[command(flatten)]
        target: GroupArgs,

        /// Rule uid (repeatable)
        #[arg(long = "uid", required = true)]
        uids: Vec<String>,
    },

    /// Delete a rule; deleting the last rule deletes the group
    DeleteRule {
        #[command(flatten)]
        target: GroupArgs,

        /// Rule uid
        #[arg(long)]
        uid: String,
    },

    /// Change the evaluation interval of a group
    SetInterval {
        #[command(flatten)]
        target: GroupArgs,

        /// New interval (e.g. 1m, 5m)
        #[arg(long)]
        interval: String,
    },

    /// Rename a group within its namespace
    Rename {
        #[command(flatten)]
        target: GroupArgs,

        /// New group name
        #[arg(long)]
        to: String,

        /// New interval
        #[arg(long)]
        interval: Option<String>,
    },

    /// Move a group to another namespace
    Move {
        #[command(flatten)]
        target: GroupArgs,

        /// Destination namespace
        #[arg(long)]
        to_namespace: String,

        /// Destination group name (defaults to the current name)
        #[arg(long)]
        to_group: Option<String>,

        /// New interval
        #[arg(long)]
        interval: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pause_with_repeated_uids() {
        let cli = Cli::try_parse_from([
            "rgmut", "pause", "-n", "ops", "-g", "g1", "--uid", "r1", "--uid", "r2",
        ])
        .unwrap();

        match cli.command {
            Commands::Pause { target, uids } => {
                assert_eq!(target.source, "grafana");
                assert_eq!(target.identifier().to_string(), "grafana/ops/g1");
                assert_eq!(uids, vec!["r1", "r2"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_move_with_global_flags() {
        let cli = Cli::try_parse_from([
            "rgmut",
            "move",
            "--source",
            "mimir",
            "--namespace",
            "ops",
            "--group",
            "g1",
            "--to-namespace",
            "infra",
            "-vv",
            "--config",
            "rgmut.toml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("rgmut.toml")));
        assert!(matches!(
            cli.command,
            Commands::Move { ref to_namespace, to_group: None, .. } if to_namespace == "infra"
        ));
    }

    #[test]
    fn test_delete_rule_requires_uid() {
        let result = Cli::try_parse_from(["rgmut", "delete-rule", "-n", "ops", "-g", "g1"]);
        assert!(result.is_err());
    }
}
