//! AgenticSuccession CLI — `asx` command.
//!
//! Drives a locally persisted chain: accounts sign calls with their `.ask`
//! key, each call is submitted atomically and the resulting state is saved
//! back to `state.json`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use agentic_succession::registry::{RegistryState, WaitPeriod};
use agentic_succession::storage::{
    load_account, load_state, read_account_address, save_account, save_state,
};
use agentic_succession::time::format_duration;
use agentic_succession::{
    Address, Call, CallOutcome, Chain, SignedCall, Signer, TokenId, MAX_INHERITED_TOKENS,
};

const PASSPHRASE_ENV: &str = "ASX_PASSPHRASE";

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --home")?;
    Ok(PathBuf::from(home).join(".agentic").join("succession"))
}

fn state_path(home: &Path) -> PathBuf {
    home.join("state.json")
}

fn accounts_dir(home: &Path) -> PathBuf {
    home.join("accounts")
}

fn account_path(home: &Path, name: &str) -> PathBuf {
    accounts_dir(home).join(format!("{name}.ask"))
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

// ── Formatting and parsing helpers ────────────────────────────────────────────

fn secs_to_datetime(secs: u64) -> String {
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{secs}s"))
}

/// Parse a duration like "181d", "12h", "1d6h" or "30m" into seconds.
/// A bare number is read as days.
fn parse_duration_secs(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n * 86_400);
    }

    let mut total: u64 = 0;
    let mut current = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
            continue;
        }
        let val: u64 = current
            .parse()
            .map_err(|_| anyhow!("invalid duration: {s}"))?;
        current.clear();
        total += match ch {
            'd' => val * 86_400,
            'h' => val * 3600,
            'm' => val * 60,
            's' => val,
            _ => bail!("unknown duration unit '{ch}' in '{s}'"),
        };
    }
    if !current.is_empty() {
        bail!("duration '{s}' is missing a unit (d/h/m/s)");
    }
    if total == 0 {
        bail!("duration must be > 0");
    }
    Ok(total)
}

/// Resolve an account name or a `0x` address.
fn resolve_address(home: &Path, value: &str) -> Result<Address> {
    if value.starts_with("0x") {
        return value
            .parse()
            .with_context(|| format!("invalid address '{value}'"));
    }
    read_account_address(&account_path(home, value))
        .with_context(|| format!("unknown account '{value}'"))
}

fn print_outcome(outcome: &CallOutcome) {
    match outcome {
        CallOutcome::Done => println!("ok"),
        CallOutcome::Minted(id) => println!("Minted authority token {id}"),
        CallOutcome::Deployed(address) => println!("Deployed {address}"),
        CallOutcome::Succession(report) => {
            println!(
                "Succession {} -> {}: {} transferred",
                report.from,
                report.to,
                report.transferred.len()
            );
            if report.is_partial() {
                println!(
                    "  warning: {} token(s) skipped; free capacity and execute again",
                    report.skipped.len()
                );
            }
        }
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// AgenticSuccession CLI — succession-controlled authority for agents.
#[derive(Parser, Debug)]
#[command(
    name = "asx",
    about = "AgenticSuccession CLI",
    version,
    long_about = "asx — AgenticSuccession CLI\n\nMint authority tokens, name successors, check in,\nand execute succession on a locally persisted chain."
)]
struct Cli {
    /// State directory (default: ~/.agentic/succession)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Account that signs the call
    #[arg(long = "as", global = true, default_value = "default")]
    account: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new chain governed by the --as account
    Init,

    /// Manage local accounts
    Account {
        #[command(subcommand)]
        subcommand: AccountCommands,
    },

    /// Inspect or move the chain clock
    Time {
        #[command(subcommand)]
        subcommand: TimeCommands,
    },

    /// Authority token operations
    Token {
        #[command(subcommand)]
        subcommand: TokenCommands,
    },

    /// Governance operations
    Governance {
        #[command(subcommand)]
        subcommand: GovernanceCommands,
    },

    /// Factory operations
    Factory {
        #[command(subcommand)]
        subcommand: FactoryCommands,
    },

    /// Succession registry operations
    Registry {
        #[command(subcommand)]
        subcommand: RegistryCommands,
    },

    /// Print the event log
    Events {
        /// Show only the last N events
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum AccountCommands {
    /// Generate a new account key
    New {
        /// Account name
        name: String,
    },
    /// List local accounts
    List,
}

#[derive(Subcommand, Debug)]
enum TimeCommands {
    /// Show the chain clock
    Show,
    /// Advance the chain clock (e.g. 181d, 12h)
    Advance { duration: String },
}

#[derive(Subcommand, Debug)]
enum TokenCommands {
    /// Mint your original authority token
    Mint,
    /// Burn an inherited token you own
    Burn { token_id: String },
    /// Show the tokens an account owns
    Show {
        /// Account name or address (default: --as)
        holder: Option<String>,
    },
    /// Show who controls a holder's resources
    Controller { holder: String },
}

#[derive(Subcommand, Debug)]
enum GovernanceCommands {
    /// Add a factory to the trusted list
    TrustFactory {
        factory: String,
        /// Remove instead of add
        #[arg(long)]
        revoke: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FactoryCommands {
    /// Create a new factory
    Create,
    /// Deploy your succession registry
    DeployRegistry { factory: String },
    /// Deploy a linked resource
    DeployResource { factory: String },
}

#[derive(Subcommand, Debug)]
enum RegistryCommands {
    /// Name a successor and a wait period (short = 180d, long = 365d)
    Configure {
        successor: String,
        #[arg(long, default_value = "short")]
        wait: String,
    },
    /// Replace the successor (resets the inactivity clock)
    UpdateSuccessor { successor: String },
    /// Prove activity
    CheckIn,
    /// Claim a holder's authority as their successor
    Execute {
        /// The original holder whose registry to execute
        holder: String,
    },
    /// Show a holder's registry
    Status {
        /// Account name or address (default: --as)
        holder: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let home = match cli.home {
        Some(home) => Ok(home),
        None => default_home(),
    };
    let result = home.and_then(|home| run(&home, &cli.account, cli.verbose, cli.command));

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(home: &Path, account: &str, verbose: bool, command: Commands) -> Result<()> {
    match command {
        Commands::Init => cmd_init(home, account),
        Commands::Account { subcommand } => match subcommand {
            AccountCommands::New { name } => cmd_account_new(home, &name, verbose),
            AccountCommands::List => cmd_account_list(home),
        },
        Commands::Time { subcommand } => match subcommand {
            TimeCommands::Show => cmd_time_show(home),
            TimeCommands::Advance { duration } => cmd_time_advance(home, &duration),
        },
        Commands::Token { subcommand } => match subcommand {
            TokenCommands::Mint => submit(home, account, Call::Mint),
            TokenCommands::Burn { token_id } => {
                let token_id: TokenId = token_id
                    .parse()
                    .with_context(|| format!("invalid token id '{token_id}'"))?;
                submit(home, account, Call::Burn { token_id })
            }
            TokenCommands::Show { holder } => {
                cmd_token_show(home, holder.as_deref().unwrap_or(account))
            }
            TokenCommands::Controller { holder } => cmd_token_controller(home, &holder),
        },
        Commands::Governance { subcommand } => match subcommand {
            GovernanceCommands::TrustFactory { factory, revoke } => {
                let factory = resolve_address(home, &factory)?;
                submit(
                    home,
                    account,
                    Call::SetTrustedFactory {
                        factory,
                        trusted: !revoke,
                    },
                )
            }
        },
        Commands::Factory { subcommand } => match subcommand {
            FactoryCommands::Create => submit(home, account, Call::CreateFactory),
            FactoryCommands::DeployRegistry { factory } => {
                let factory = resolve_address(home, &factory)?;
                submit(home, account, Call::DeployRegistry { factory })
            }
            FactoryCommands::DeployResource { factory } => {
                let factory = resolve_address(home, &factory)?;
                submit(home, account, Call::DeployResource { factory })
            }
        },
        Commands::Registry { subcommand } => match subcommand {
            RegistryCommands::Configure { successor, wait } => {
                let registry = own_registry(home, account)?;
                let successor = resolve_address(home, &successor)?;
                let wait_period: WaitPeriod = wait.parse()?;
                submit(
                    home,
                    account,
                    Call::Configure {
                        registry,
                        successor,
                        wait_period,
                    },
                )
            }
            RegistryCommands::UpdateSuccessor { successor } => {
                let registry = own_registry(home, account)?;
                let successor = resolve_address(home, &successor)?;
                submit(
                    home,
                    account,
                    Call::UpdateSuccessor {
                        registry,
                        successor,
                    },
                )
            }
            RegistryCommands::CheckIn => {
                let registry = own_registry(home, account)?;
                submit(home, account, Call::CheckIn { registry })
            }
            RegistryCommands::Execute { holder } => {
                let registry = own_registry(home, &holder)?;
                submit(home, account, Call::ExecuteSuccession { registry })
            }
            RegistryCommands::Status { holder } => {
                cmd_registry_status(home, holder.as_deref().unwrap_or(account))
            }
        },
        Commands::Events { limit } => cmd_events(home, limit),
    }
}

// ── Chain helpers ─────────────────────────────────────────────────────────────

fn open_chain(home: &Path) -> Result<Chain> {
    let path = state_path(home);
    if !path.exists() {
        bail!("no chain at {} (run `asx init` first)", home.display());
    }
    let state = load_state(&path).context("failed to load chain state")?;
    Ok(Chain::from_state(state))
}

fn store_chain(home: &Path, chain: &Chain) -> Result<()> {
    let path = state_path(home);
    save_state(chain.state(), &path).context("failed to save chain state")?;
    log::debug!("chain state saved to {}", path.display());
    Ok(())
}

fn load_signer(home: &Path, account: &str) -> Result<Signer> {
    let path = account_path(home, account);
    let passphrase = read_passphrase(&format!("Passphrase for '{account}': "))?;
    load_account(&path, &passphrase).with_context(|| format!("failed to open account '{account}'"))
}

/// The registry owned by `holder` (a name or address).
fn own_registry(home: &Path, holder: &str) -> Result<Address> {
    let chain = open_chain(home)?;
    let address = resolve_address(home, holder)?;
    chain
        .registry_of(address)
        .map(|r| r.address())
        .ok_or_else(|| anyhow!("'{holder}' has no registry (run `asx factory deploy-registry`)"))
}

/// Sign `call` as `account`, submit it and persist the result.
fn submit(home: &Path, account: &str, call: Call) -> Result<()> {
    let mut chain = open_chain(home)?;
    let signer = load_signer(home, account)?;
    let nonce = chain.nonce(signer.address());
    log::debug!("submitting {} as {account} (nonce {nonce})", call.name());
    let signed = SignedCall::sign(&signer, nonce, call)?;

    let result = chain.submit(&signed);
    // The nonce is consumed even when the call fails.
    store_chain(home, &chain)?;
    let outcome = result?;
    print_outcome(&outcome);
    Ok(())
}

// ── Command implementations ───────────────────────────────────────────────────

/// `asx init`
fn cmd_init(home: &Path, account: &str) -> Result<()> {
    let path = state_path(home);
    if path.exists() {
        bail!("a chain already exists at {}", path.display());
    }
    let governance = resolve_address(home, account)?;
    let chain = Chain::new(governance);
    store_chain(home, &chain)?;
    println!("Created chain governed by '{account}' ({governance})");
    println!("  Token: {}", chain.token().address());
    Ok(())
}

/// `asx account new NAME`
fn cmd_account_new(home: &Path, name: &str, verbose: bool) -> Result<()> {
    let path = account_path(home, name);
    if path.exists() {
        bail!("account '{name}' already exists at {}", path.display());
    }
    let passphrase = read_passphrase("Enter passphrase for new account: ")?;
    if passphrase.is_empty() {
        bail!("passphrase cannot be empty");
    }

    let signer = Signer::generate(Some(name.to_string()));
    save_account(&signer, &path, &passphrase).context("failed to save account")?;

    println!("Created account '{name}'");
    println!("  Address: {}", signer.address());
    if verbose {
        println!("  Key:     {}", signer.public_key_base64());
        println!("  File:    {}", path.display());
    }
    Ok(())
}

/// `asx account list`
fn cmd_account_list(home: &Path) -> Result<()> {
    let dir = accounts_dir(home);
    if !dir.exists() {
        println!("No accounts found in {}", dir.display());
        return Ok(());
    }

    let mut entries: Vec<(String, PathBuf)> = std::fs::read_dir(&dir)
        .context("failed to read accounts directory")?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension().is_some_and(|x| x == "ask") {
                let stem = path.file_stem()?.to_string_lossy().into_owned();
                Some((stem, path))
            } else {
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    println!("{:<20} ADDRESS", "NAME");
    println!("{}", "-".repeat(64));
    for (name, path) in &entries {
        match read_account_address(path) {
            Ok(address) => println!("{name:<20} {address}"),
            Err(e) => println!("{name:<20} (failed to read: {e})"),
        }
    }
    Ok(())
}

/// `asx time show`
fn cmd_time_show(home: &Path) -> Result<()> {
    let chain = open_chain(home)?;
    println!("{} ({})", secs_to_datetime(chain.now()), chain.now());
    Ok(())
}

/// `asx time advance DURATION`
fn cmd_time_advance(home: &Path, duration: &str) -> Result<()> {
    let secs = parse_duration_secs(duration)?;
    let mut chain = open_chain(home)?;
    chain.advance(secs);
    store_chain(home, &chain)?;
    println!(
        "Advanced {} to {}",
        format_duration(secs),
        secs_to_datetime(chain.now())
    );
    Ok(())
}

/// `asx token show [HOLDER]`
fn cmd_token_show(home: &Path, holder: &str) -> Result<()> {
    let chain = open_chain(home)?;
    let address = resolve_address(home, holder)?;
    let token = chain.token();

    println!("Holder:   {address}");
    match token.original_token_id(address) {
        Some(id) => println!("Original: {id}"),
        None => println!("Original: (never minted)"),
    }
    let owned = token.owned_tokens(address);
    let listed: Vec<String> = owned.iter().map(ToString::to_string).collect();
    println!(
        "Owned:    {}/{} [{}]",
        owned.len(),
        MAX_INHERITED_TOKENS,
        listed.join(", ")
    );
    Ok(())
}

/// `asx token controller HOLDER`
fn cmd_token_controller(home: &Path, holder: &str) -> Result<()> {
    let chain = open_chain(home)?;
    let address = resolve_address(home, holder)?;
    let controller = chain.current_controller(address);
    if controller.is_zero() {
        println!("{address} has no controller");
    } else if controller == address {
        println!("{address} controls its own resources");
    } else {
        println!("{address} is controlled by {controller}");
    }
    Ok(())
}

/// `asx registry status [HOLDER]`
fn cmd_registry_status(home: &Path, holder: &str) -> Result<()> {
    let chain = open_chain(home)?;
    let address = resolve_address(home, holder)?;
    let registry = chain
        .registry_of(address)
        .ok_or_else(|| anyhow!("'{holder}' has no registry"))?;
    let now = chain.now();

    println!("Registry:  {}", registry.address());
    println!("Owner:     {}", registry.owner());
    match registry.policy() {
        None => println!("Policy:    (not configured)"),
        Some(policy) => {
            println!("Successor: {}", policy.successor);
            println!("Wait:      {}", policy.wait_period);
            println!("Activity:  {}", secs_to_datetime(policy.last_activity));
        }
    }
    match registry.state(now) {
        RegistryState::Uninitialized => println!("State:     uninitialized"),
        RegistryState::Unconfigured => println!("State:     unconfigured"),
        RegistryState::Active { claimable_at } => println!(
            "State:     active, claimable {} (in {})",
            secs_to_datetime(claimable_at),
            format_duration(claimable_at.saturating_sub(now))
        ),
        RegistryState::Claimable => println!("State:     claimable"),
    }
    Ok(())
}

/// `asx events [--limit N]`
fn cmd_events(home: &Path, limit: Option<usize>) -> Result<()> {
    let chain = open_chain(home)?;
    let events = chain.events();
    let skip = limit.map_or(0, |n| events.len().saturating_sub(n));
    for record in &events[skip..] {
        let body = serde_json::to_string(&record.event)?;
        println!(
            "#{:<5} {} {:<24} {body}",
            record.sequence,
            secs_to_datetime(record.timestamp),
            record.event.as_tag()
        );
    }
    Ok(())
}
