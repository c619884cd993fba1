use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "monthbook")]
#[command(about = "Monthly household ledger with wallet and savings balances", long_about = None)]
pub struct Cli {
    /// Override monthbook home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "MONTHBOOK_HOME", global = true)]
    pub home: Option<std::path::PathBuf>,

    /// Period to work on (YYYY-MM). Defaults to the current month.
    #[arg(long, global = true)]
    pub month: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Income(IncomeArgs),
    Expense(ExpenseArgs),
    Lend(LendArgs),

    /// Move money from the wallet into savings.
    Transfer { amount: String },
    /// Add to savings without touching the wallet.
    Save { amount: String },

    Balance,
    Summary,
    List {
        #[arg(value_enum)]
        log: Option<LogArg>,
        #[arg(long, value_enum, default_value_t = FormatArg::Table)]
        format: FormatArg,
    },
    Statement {
        #[arg(long, value_enum, default_value_t = FormatArg::Table)]
        format: FormatArg,
    },
    Periods,

    /// Remove every entry and balance of the period.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogArg {
    Income,
    Expenses,
    Lending,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Table,
    Tsv,
}

#[derive(Debug, Args)]
pub struct IncomeArgs {
    #[command(subcommand)]
    pub cmd: IncomeCmd,
}

#[derive(Debug, Subcommand)]
pub enum IncomeCmd {
    Add {
        amount: String,
        currency: String,
        #[arg(long)]
        source: String,
        /// Entry date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
        #[arg(long, short = 'm', alias = "note")]
        notes: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, short = 'm', alias = "note")]
        notes: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    pub cmd: ExpenseCmd,
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCmd {
    Add {
        amount: String,
        currency: String,
        #[arg(long)]
        category: String,
        /// wallet or bank.
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, short = 'm', alias = "note")]
        notes: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, short = 'm', alias = "note")]
        notes: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct LendArgs {
    #[command(subcommand)]
    pub cmd: LendCmd,
}

#[derive(Debug, Subcommand)]
pub enum LendCmd {
    Add {
        amount: String,
        currency: String,
        /// Counterparty name.
        #[arg(long)]
        name: String,
        /// Record money borrowed from the counterparty instead of lent to them.
        #[arg(long)]
        borrow: bool,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        /// lend or borrow.
        #[arg(long)]
        direction: Option<String>,
        /// pending or settled.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark an entry as settled.
    Settle {
        id: String,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    Show,
    SetPrimary { currency: String },
    /// Default expense method (wallet or bank).
    SetMethod { method: String },
}
