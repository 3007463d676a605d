use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use flagdeck_core::audit::AuditAction;
use flagdeck_core::config::EnvironmentProfile;
use flagdeck_core::export::ExportFormat;
use flagdeck_core::filter::{QuickFilter, SortBy};
use flagdeck_core::models::{FlagEnvironment, Platform, PlatformFilter};

#[derive(Parser)]
#[command(name = "flagdeck")]
#[command(about = "Administer feature flags from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Environment profile (defaults from FLAGDECK_PROFILE or the API host)
    #[arg(long, global = true, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List flags grouped by category
    #[command(alias = "ls")]
    List {
        /// Platform tab to show
        #[arg(long, value_enum, default_value_t = PlatformArg::All)]
        platform: PlatformArg,
        /// Quick filter
        #[arg(long, value_enum)]
        filter: Option<QuickFilterArg>,
        /// Case-insensitive search over name and description
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order within each category
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
    },
    /// Show flag totals and platform counts
    Stats,
    /// Show one flag in detail
    Show {
        /// Flag id or full name
        flag: String,
    },
    /// Toggle one or more flags
    Toggle {
        /// Flag ids or full names
        #[arg(required = true)]
        flags: Vec<String>,
    },
    /// Enable the given flags, skipping those already enabled
    Enable {
        /// Flag ids or full names
        #[arg(required = true)]
        flags: Vec<String>,
    },
    /// Disable the given flags, skipping those already disabled
    Disable {
        /// Flag ids or full names
        #[arg(required = true)]
        flags: Vec<String>,
    },
    /// Create a new flag
    #[command(alias = "new")]
    Create {
        /// Dot-delimited flag name, e.g. ui.dark-mode
        name: String,
        /// Flag description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Target environment
        #[arg(long, value_enum, default_value_t = EnvironmentArg::All)]
        environment: EnvironmentArg,
        /// Rollout percentage (0-100)
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
        rollout: u8,
        /// Create the flag disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Update flag fields
    Update {
        /// Flag id or full name
        flag: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New target environment
        #[arg(long, value_enum)]
        environment: Option<EnvironmentArg>,
        /// New rollout percentage (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        rollout: Option<u8>,
    },
    /// Delete a flag
    Delete {
        /// Flag id or full name
        flag: String,
    },
    /// Show, filter, export or clear the local audit log
    Audit {
        /// Only entries with this action
        #[arg(long, value_enum)]
        action: Option<AuditActionArg>,
        /// Only entries for this flag (full or display name)
        #[arg(long, value_name = "NAME")]
        flag: Option<String>,
        /// Export format
        #[arg(long, value_enum)]
        format: Option<ExportFormatArg>,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Remove all entries
        #[arg(long, conflicts_with_all = ["action", "flag", "format", "output"])]
        clear: bool,
    },
    /// Probe API health
    Health {
        /// Keep probing on an interval until interrupted
        #[arg(long)]
        watch: bool,
        /// Probe interval for --watch (defaults to the profile setting)
        #[arg(long, value_name = "MS", requires = "watch")]
        interval_ms: Option<u64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProfileArg {
    Development,
    Production,
}

impl From<ProfileArg> for EnvironmentProfile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Development => Self::Development,
            ProfileArg::Production => Self::Production,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PlatformArg {
    All,
    Frontend,
    Mobile,
    Shared,
}

impl From<PlatformArg> for PlatformFilter {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::All => Self::All,
            PlatformArg::Frontend => Self::Only(Platform::Frontend),
            PlatformArg::Mobile => Self::Only(Platform::Mobile),
            PlatformArg::Shared => Self::Only(Platform::Shared),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum QuickFilterArg {
    Enabled,
    Disabled,
    Production,
    Development,
}

impl From<QuickFilterArg> for QuickFilter {
    fn from(value: QuickFilterArg) -> Self {
        match value {
            QuickFilterArg::Enabled => Self::Enabled,
            QuickFilterArg::Disabled => Self::Disabled,
            QuickFilterArg::Production => Self::Production,
            QuickFilterArg::Development => Self::Development,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    Name,
    Updated,
    Status,
    Environment,
}

impl From<SortArg> for SortBy {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Name => Self::Name,
            SortArg::Updated => Self::Updated,
            SortArg::Status => Self::Status,
            SortArg::Environment => Self::Environment,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EnvironmentArg {
    All,
    Production,
    Development,
}

impl From<EnvironmentArg> for FlagEnvironment {
    fn from(value: EnvironmentArg) -> Self {
        match value {
            EnvironmentArg::All => Self::All,
            EnvironmentArg::Production => Self::Production,
            EnvironmentArg::Development => Self::Development,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum AuditActionArg {
    Enabled,
    Disabled,
    Created,
    Updated,
    Deleted,
}

impl From<AuditActionArg> for AuditAction {
    fn from(value: AuditActionArg) -> Self {
        match value {
            AuditActionArg::Enabled => Self::Enabled,
            AuditActionArg::Disabled => Self::Disabled,
            AuditActionArg::Created => Self::Created,
            AuditActionArg::Updated => Self::Updated,
            AuditActionArg::Deleted => Self::Deleted,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(value: ExportFormatArg) -> Self {
        match value {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
