//! Configuration for the listform CLI
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, Subcommand};
use listform::{DisplayMode, FormConfig};
use listform_client::ListStoreConfig;
use std::path::PathBuf;

/// Listform - drive a list-item form session from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "listform")]
#[command(about = "Load, inspect and save records through the list-item form engine")]
pub struct Args {
    /// Absolute URL of the site hosting the lists
    #[arg(long, env = "SITE_URL")]
    pub site_url: Option<String>,

    /// Bearer token for the site's REST API
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Title of the list holding the records
    #[arg(long, env = "RECORD_LIST", default_value = "VDMDemo")]
    pub record_list: String,

    /// Title of the document type list
    #[arg(long, env = "DOC_TYPE_LIST", default_value = "DocumentType")]
    pub doc_type_list: String,

    /// Title of the document sub-type list
    #[arg(long, env = "DOC_SUBTYPE_LIST", default_value = "DocumentSubType")]
    pub doc_subtype_list: String,

    /// Entity-type marker for writes (derived from RECORD_LIST when unset)
    #[arg(long, env = "ENTITY_TYPE")]
    pub entity_type: Option<String>,

    /// Let the store filter users and sub-types
    #[arg(long, env = "SERVER_SIDE_FILTER", default_value = "false")]
    pub server_side_filter: bool,

    /// Site time zone in minutes east of UTC (e.g. 780 for UTC+13)
    #[arg(long, env = "SITE_UTC_OFFSET_MINUTES", default_value = "0", allow_hyphen_values = true)]
    pub site_utc_offset_minutes: i32,

    /// Request timeout in milliseconds (unset: no timeout)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the form layout as JSON
    Layout,

    /// Open a session and print its state as JSON
    Show {
        /// Display mode (new, edit, view, disabled)
        #[arg(long, default_value = "view")]
        mode: DisplayMode,

        /// Item id of the record
        #[arg(long)]
        item_id: Option<u64>,
    },

    /// Print the sub-types selectable under a document type
    SubTypes {
        /// Document type key
        #[arg(long)]
        doc_type: String,
    },

    /// Apply a record JSON file to a session and submit it
    Save {
        /// Display mode (new or edit)
        #[arg(long, default_value = "new")]
        mode: DisplayMode,

        /// Item id to update (edit mode)
        #[arg(long)]
        item_id: Option<u64>,

        /// Path to the record JSON
        #[arg(long)]
        record: PathBuf,
    },
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.command, Command::Layout) && self.site_url.is_none() {
            return Err("SITE_URL is required".to_string());
        }

        if let Command::Save { mode, item_id, .. } = &self.command {
            if !mode.is_writable() {
                return Err(format!("cannot save in {} mode", mode));
            }
            if *mode == DisplayMode::Edit && item_id.is_none() {
                return Err("--item-id is required in edit mode".to_string());
            }
        }

        self.form_config().validate()
    }

    pub fn store_config(&self) -> ListStoreConfig {
        ListStoreConfig {
            site_url: self.site_url.clone().unwrap_or_default(),
            access_token: self.access_token.clone(),
            timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn form_config(&self) -> FormConfig {
        FormConfig {
            record_list: self.record_list.clone(),
            document_type_list: self.doc_type_list.clone(),
            document_sub_type_list: self.doc_subtype_list.clone(),
            entity_type: self.entity_type.clone(),
            server_side_filter: self.server_side_filter,
            site_utc_offset_minutes: self.site_utc_offset_minutes,
        }
    }
}
