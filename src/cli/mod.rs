//! CLI module for access key administration
//!
//! Provides subcommands:
//! - `list`: print stored access keys
//! - `create`: fill in and submit a new access key
//! - `edit`: change an existing access key

pub mod form;
pub mod list;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::domain::access_key::{from_canonical_bytes, AccessKey};

/// Access key admin - create and edit server access keys
#[derive(Parser)]
#[command(name = "access-key-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store file, overriding the configured path
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List access keys
    List {
        /// Only keys of this server
        #[arg(long)]
        server: Option<i64>,
    },

    /// Create a new access key
    Create {
        /// Server the key belongs to (defaults to the configured server)
        #[arg(long)]
        server: Option<i64>,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Edit an existing access key
    Edit {
        /// Id of the key to edit
        id: i64,

        #[command(flatten)]
        form: FormArgs,
    },
}

/// Field values, applied to the draft in order
#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// Display name, at most 64 characters
    #[arg(long)]
    pub name: Option<String>,

    /// Data limit magnitude in the selected unit; empty removes the limit
    #[arg(long, value_name = "NUMBER")]
    pub data_limit: Option<String>,

    /// Unit of the data limit: Bytes, KB, MB or GB
    #[arg(long, value_name = "UNIT")]
    pub unit: Option<String>,

    /// Expiration as an RFC 3339 timestamp
    #[arg(long, value_name = "RFC3339", conflicts_with = "no_expiry")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Remove the expiration
    #[arg(long)]
    pub no_expiry: bool,
}

/// Access key as printed by the CLI
#[derive(Debug, Serialize)]
pub struct AccessKeyView {
    pub id: i64,
    pub server_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit_bytes: Option<u128>,
    /// Same limit in the largest unit that holds it exactly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit_normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&AccessKey> for AccessKeyView {
    fn from(key: &AccessKey) -> Self {
        let quota = key.quota();

        Self {
            id: key.id().value(),
            server_id: key.server_id().value(),
            name: key.name().to_string(),
            data_limit: quota.map(|q| q.to_string()),
            data_limit_bytes: quota.map(|q| q.to_bytes()),
            data_limit_normalized: quota
                .and_then(|q| from_canonical_bytes(q.to_bytes()).ok())
                .map(|q| q.to_string()),
            expires_at: key.expires_at(),
            expired: key.is_expired(),
            updated_at: key.updated_at(),
        }
    }
}
