use crate::models::deletion::DeletionStatus;
use crate::models::field::FieldType;
use crate::models::template::ReportFormat;
use crate::models::user::Role;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rcrm
/// Client records, documents and reports on a local SQLite store
#[derive(Parser)]
#[command(
    name = "rcrm",
    version = env!("CARGO_PKG_VERSION"),
    about = "A small CRM on the command line: clients, documents, deletion approvals and PDF/Excel reports",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use")]
        editor: Option<String>,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Sign in as an existing user
    Login { email: String },

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage users (administrators only, except the very first user)
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Manage the form field catalog
    Field {
        #[command(subcommand)]
        action: FieldCmd,
    },

    /// Create, edit, list and import clients
    Client {
        #[command(subcommand)]
        action: ClientCmd,
    },

    /// Client documents (upload, download, signed links)
    Doc {
        #[command(subcommand)]
        action: DocCmd,
    },

    /// Approval-gated deletion of clients and documents
    Deletion {
        #[command(subcommand)]
        action: DeletionCmd,
    },

    /// Show aggregate metrics
    Dashboard {
        #[arg(long, default_value_t = 6, help = "Months shown in the creation histogram")]
        months: usize,

        #[arg(long = "by", help = "Select/radio field to show a value distribution for")]
        by: Option<String>,
    },

    /// Build and export reports
    Report {
        #[command(subcommand)]
        action: ReportCmd,
    },

    /// Saved report templates
    Template {
        #[command(subcommand)]
        action: TemplateCmd,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    /// Create a user
    Add {
        email: String,
        name: String,

        #[arg(long, value_enum, default_value = "user")]
        role: Role,
    },
    /// List users
    List,
    /// Delete a user and everything they own
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum FieldCmd {
    /// List catalog fields
    List,
    /// Add a field to the catalog
    Add {
        id: String,
        label: String,

        #[arg(long = "type", value_enum)]
        kind: FieldType,

        #[arg(long)]
        required: bool,

        #[arg(
            long = "option",
            value_delimiter = ',',
            help = "Allowed values (select/radio), comma separated or repeated"
        )]
        options: Vec<String>,
    },
    /// Remove a field no client uses yet
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum ClientCmd {
    /// Create a client
    Add {
        #[arg(
            long = "set",
            short = 's',
            value_name = "FIELD=VALUE",
            help = "Field value; repeat for each field"
        )]
        values: Vec<String>,
    },
    /// Change values of an existing client (empty value clears a field)
    Edit {
        id: i64,

        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
        values: Vec<String>,
    },
    /// Show one client with its documents
    Show { id: i64 },
    /// List clients
    List {
        #[arg(long, help = "Newest first")]
        newest: bool,
    },
    /// Delete a client directly (administrators only)
    Del { id: i64 },
    /// Import clients from a CSV file (header row: field ids or labels)
    Import { file: String },
}

#[derive(Subcommand)]
pub enum DocCmd {
    /// Attach a file to a client
    Upload { client: i64, file: String },
    /// List the documents of a client
    List { client: i64 },
    /// Download a document
    Get {
        id: i64,

        #[arg(long, value_name = "PATH")]
        out: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Issue a time-limited read link
    Url { id: i64 },
    /// Download through a signed link
    Fetch {
        url: String,

        #[arg(long, value_name = "PATH")]
        out: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Delete a document directly (administrators only)
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum DeletionCmd {
    /// Ask an administrator to delete a client or a document
    Request {
        #[arg(long, conflicts_with = "document", required_unless_present = "document")]
        client: Option<i64>,

        #[arg(long)]
        document: Option<i64>,

        #[arg(long)]
        reason: String,
    },
    /// List deletion requests
    List {
        #[arg(long, value_enum)]
        status: Option<DeletionStatus>,
    },
    /// Approve a pending request and delete its target
    Approve { id: i64 },
    /// Reject a pending request
    Reject { id: i64 },
}

#[derive(Subcommand)]
pub enum ReportCmd {
    /// Build a report and write it as PDF or Excel
    Run {
        #[arg(
            long = "field",
            short = 'F',
            value_delimiter = ',',
            conflicts_with = "template",
            help = "Field ids in column order, comma separated or repeated"
        )]
        fields: Vec<String>,

        #[arg(
            long = "formula",
            value_name = "NAME=OP:A,B",
            conflicts_with = "template",
            help = "Derived column, e.g. total=sum:revenue,cost"
        )]
        formulas: Vec<String>,

        #[arg(long, value_enum)]
        format: Option<ReportFormat>,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Creation date filter: YYYY, YYYY-MM, YYYY-MM-DD or FROM:TO"
        )]
        range: Option<String>,

        #[arg(long, help = "Start from a saved template")]
        template: Option<i64>,

        #[arg(long = "save-as", help = "Also save the selection as a template")]
        save_as: Option<String>,

        #[arg(long, value_name = "PATH", help = "Output file or directory")]
        out: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,

        #[arg(long, help = "Print the table instead of writing a file")]
        preview: bool,
    },
    /// Write a header-only Excel template for bulk import
    Template {
        #[arg(long, value_name = "PATH")]
        out: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
    /// List the fields a report can select
    ListFields,
}

#[derive(Subcommand)]
pub enum TemplateCmd {
    /// List saved templates
    List,
    /// Show one template
    Show { id: i64 },
    /// Delete a template
    Del { id: i64 },
}
