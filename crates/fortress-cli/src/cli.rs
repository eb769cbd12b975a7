use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use fortress_core::VERSION;

/// Fortress - nested notes with a PIN-gated vault for secure notes
#[derive(Parser)]
#[command(name = "fortress")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "FORTRESS_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Path to the note store (overrides the config)
    #[arg(short, long, global = true, env = "FORTRESS_STORE", value_name = "PATH")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and create an empty note store
    Init(InitArgs),

    /// Create, list, show, edit, and delete notes
    #[command(subcommand)]
    Note(NoteSubcommand),

    /// Manage the folder tree
    #[command(subcommand)]
    Folder(FolderSubcommand),

    /// Set or check the vault PIN
    #[command(subcommand)]
    Pin(PinSubcommand),

    /// Start an interactive session with its own vault lock
    Session,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Where to create the note store
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Store a freshly generated vault secret in the config
    #[arg(long)]
    pub generate_secret: bool,

    /// Refuse the built-in demo secret and default PIN
    #[arg(long)]
    pub no_insecure_defaults: bool,

    /// Lock an interactive session after this many idle seconds (0 = never)
    #[arg(long, value_name = "SECONDS")]
    pub idle_lock: Option<u64>,
}

#[derive(Subcommand)]
pub enum NoteSubcommand {
    /// Create a note
    New(NoteNewArgs),

    /// List notes, most recently updated first
    List(NoteListArgs),

    /// Show a note (secure notes ask for the PIN)
    Show(NoteShowArgs),

    /// Edit a note
    Edit(NoteEditArgs),

    /// Delete a note
    Delete(NoteDeleteArgs),
}

/// Arguments for `note new`
#[derive(Args)]
pub struct NoteNewArgs {
    /// Note type (general, secure, todo, reminder)
    #[arg(short = 't', long = "type", default_value = "general")]
    pub note_type: String,

    /// Note title
    #[arg(long)]
    pub title: Option<String>,

    /// Note body (otherwise read from stdin when piped)
    #[arg(long)]
    pub body: Option<String>,

    /// Folder ID (full UUID or prefix)
    #[arg(long, value_name = "ID")]
    pub folder: Option<String>,
}

/// Arguments for `note list`
#[derive(Args)]
pub struct NoteListArgs {
    /// Only notes in this folder (full UUID or prefix)
    #[arg(long, value_name = "ID", conflicts_with = "inbox")]
    pub folder: Option<String>,

    /// Only notes without a folder
    #[arg(long)]
    pub inbox: bool,

    /// Filter by note type
    #[arg(short = 't', long = "type")]
    pub note_type: Option<String>,

    /// Filter by title text
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for `note show`
#[derive(Args)]
pub struct NoteShowArgs {
    /// Note ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `note edit`
#[derive(Args)]
pub struct NoteEditArgs {
    /// Note ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body
    #[arg(long)]
    pub body: Option<String>,

    /// Change the note type
    #[arg(short = 't', long = "type")]
    pub note_type: Option<String>,

    /// Move to a folder (full UUID or prefix)
    #[arg(long, value_name = "ID", conflicts_with = "inbox")]
    pub folder: Option<String>,

    /// Move to the inbox
    #[arg(long)]
    pub inbox: bool,

    /// Mark or unmark as favourite
    #[arg(long, value_name = "BOOL")]
    pub favorite: Option<bool>,
}

/// Arguments for `note delete`
#[derive(Args)]
pub struct NoteDeleteArgs {
    /// Note ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum FolderSubcommand {
    /// Create a folder
    New {
        /// Folder name
        #[arg(value_name = "NAME")]
        name: String,

        /// Parent folder ID (full UUID or prefix)
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },

    /// List folders as a tree
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a folder
    Rename {
        /// Folder ID (full UUID or prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// New name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Delete a folder and its subfolders (notes move to the inbox)
    Delete {
        /// Folder ID (full UUID or prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum PinSubcommand {
    /// Change the vault PIN
    Set,

    /// Check a PIN without unlocking anything
    Check,
}
