use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use crate::domain::types::{RecordId, SortDir};

/// Command-line arguments for the blogdesk binary.
#[derive(Debug, Parser)]
#[command(
    name = "blogdesk",
    version,
    about = "Admin client for a blog's posts and comments API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "BLOGDESK_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Override the request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS", global = true)]
    pub api_timeout_seconds: Option<u64>,

    /// Act as this user when saving posts and comments.
    #[arg(long = "user-id", value_name = "ID", global = true)]
    pub user_id: Option<RecordId>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Manage posts.
    #[command(subcommand)]
    Posts(PostsCmd),
    /// Manage comments.
    #[command(subcommand)]
    Comments(CommentsCmd),
}

/// Filter, sort and paging flags shared by the list commands.
#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    /// Free-text search.
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    #[arg(long = "sort-by", value_name = "FIELD")]
    pub sort_by: Option<String>,

    /// asc|desc
    #[arg(long = "sort-dir", value_name = "DIR")]
    pub sort_dir: Option<SortDir>,

    /// Requested page; bounded to the last page once the total is known.
    #[arg(long, value_name = "PAGE")]
    pub page: Option<NonZeroU32>,

    #[arg(long = "rows-per-page", value_name = "COUNT")]
    pub rows_per_page: Option<NonZeroU32>,

    /// Comma-separated columns to keep in the output.
    #[arg(long, value_name = "COLUMNS", value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum PostsCmd {
    /// List posts.
    List(ListArgs),
    /// Show a post together with its comments.
    Show {
        #[arg(value_name = "ID")]
        id: RecordId,
        #[command(flatten)]
        comments: ListArgs,
    },
    /// Create a post.
    Create {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Update a post; omitted fields keep their stored value.
    Update {
        #[arg(value_name = "ID")]
        id: RecordId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post.
    Delete {
        #[arg(value_name = "ID")]
        id: RecordId,
        /// Confirm the deletion; without it nothing is sent.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CommentsCmd {
    /// List comments, optionally for one post.
    List {
        #[arg(long = "post-id", value_name = "ID")]
        post_id: Option<RecordId>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show a comment.
    Show {
        #[arg(value_name = "ID")]
        id: RecordId,
    },
    /// Create a comment.
    Create {
        #[arg(long = "post-id", value_name = "ID")]
        post_id: Option<RecordId>,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Update a comment.
    Update {
        #[arg(value_name = "ID")]
        id: RecordId,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a comment.
    Delete {
        #[arg(value_name = "ID")]
        id: RecordId,
        /// Confirm the deletion; without it nothing is sent.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        yes: bool,
    },
}
