use crate::commands::Command;
use clap::{ArgAction, Args, Parser, Subcommand};

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "chaindb")]
#[command(about = "CLI to interact with ChainDB", version)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure the ChainDB host
    Config {
        /// ChainDB host (e.g., http://localhost:2818)
        #[arg(long)]
        host: Option<String>,

        /// Print the configured host and exit
        #[arg(long, conflicts_with = "host")]
        show: bool,
    },

    /// Database-related commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Table-related commands
    #[command(subcommand)]
    Table(TableCommands),
}

#[derive(Args, Debug)]
pub struct Login {
    /// Database name
    #[arg(short, long)]
    pub name: String,

    /// Username
    #[arg(short, long)]
    pub user: String,

    /// Password
    #[arg(short, long)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create a new database
    Create(Login),

    /// Connect to an existing database
    Connect(Login),

    /// Change database password
    ChangePassword {
        /// Database name
        #[arg(short, long)]
        name: String,

        /// Username
        #[arg(short, long)]
        user: String,

        /// Current password
        #[arg(short, long)]
        old_password: String,

        /// New password
        #[arg(short = 'p', long)]
        new_password: String,
    },
}

#[derive(Args, Debug)]
pub struct Search {
    /// Search criteria in JSON format
    #[arg(short, long)]
    pub criteria: String,

    /// Record limit
    #[arg(short, long, default_value = "10")]
    pub limit: String,

    /// Search from newest to oldest
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub reverse: bool,
}

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// List all tables
    List,

    /// Get current table data (the last record stored in the table)
    Get { table: String },

    /// Get a specific record from table by document ID
    GetById {
        table: String,

        /// Document ID to fetch
        #[arg(long)]
        doc_id: String,
    },

    /// Update a specific record in table by document ID
    Update {
        table: String,

        /// Data in JSON format
        #[arg(short, long)]
        data: String,

        /// Document ID of the record to update
        #[arg(long)]
        doc_id: String,
    },

    /// Persist new data to table
    Persist {
        table: String,

        /// Data in JSON format
        #[arg(short, long)]
        data: String,
    },

    /// Get table history
    History {
        table: String,

        /// Record limit
        #[arg(short, long, default_value = "10")]
        limit: String,
    },

    /// Search records with simple criteria
    Find {
        table: String,

        #[command(flatten)]
        search: Search,
    },

    /// Search records with advanced criteria
    FindAdvanced {
        table: String,

        #[command(flatten)]
        search: Search,
    },
}

impl From<DbCommands> for Command {
    fn from(cmd: DbCommands) -> Self {
        match cmd {
            DbCommands::Create(Login {
                name,
                user,
                password,
            }) => Command::CreateDatabase {
                name,
                user,
                password,
            },
            DbCommands::Connect(Login {
                name,
                user,
                password,
            }) => Command::Connect {
                name,
                user,
                password,
            },
            DbCommands::ChangePassword {
                name,
                user,
                old_password,
                new_password,
            } => Command::ChangePassword {
                name,
                user,
                old_password,
                new_password,
            },
        }
    }
}

impl From<TableCommands> for Command {
    fn from(cmd: TableCommands) -> Self {
        match cmd {
            TableCommands::List => Command::ListTables,
            TableCommands::Get { table } => Command::GetTable { table },
            TableCommands::GetById { table, doc_id } => Command::GetById { table, doc_id },
            TableCommands::Update {
                table,
                data,
                doc_id,
            } => Command::Update {
                table,
                data,
                doc_id,
            },
            TableCommands::Persist { table, data } => Command::Persist { table, data },
            TableCommands::History { table, limit } => Command::History { table, limit },
            TableCommands::Find { table, search } => Command::Find {
                table,
                criteria: search.criteria,
                limit: search.limit,
                reverse: search.reverse,
            },
            TableCommands::FindAdvanced { table, search } => Command::FindAdvanced {
                table,
                criteria: search.criteria,
                limit: search.limit,
                reverse: search.reverse,
            },
        }
    }
}
