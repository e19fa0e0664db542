use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, ExpenseCmd, MoneyCents, Summary};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "tripsplit_admin")]
#[command(about = "Admin utilities for tripsplit (bootstrap users, trips and expenses)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tripsplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Trip(Trip),
    Expense(Expense),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    display_name: Option<String>,
}

#[derive(Args, Debug)]
struct Trip {
    #[command(subcommand)]
    command: TripCommand,
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    /// Create a trip; the owner joins it right away.
    Create(TripCreateArgs),
    /// Register a user for expense splitting on a trip.
    Join(TripJoinArgs),
    /// Print expenses, balances and settlement payments.
    Summary(TripSummaryArgs),
}

#[derive(Args, Debug)]
struct TripCreateArgs {
    /// Owner id or handle.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct TripJoinArgs {
    #[arg(long)]
    trip: String,
    /// User id or handle.
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug)]
struct TripSummaryArgs {
    #[arg(long)]
    trip: String,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    trip: String,
    /// User recording the expense.
    #[arg(long)]
    user: String,
    #[arg(long)]
    name: String,
    /// Amount in major units, e.g. `12.50`.
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
    #[arg(long)]
    category: Option<String>,
    /// Who paid. Defaults to `--user`.
    #[arg(long)]
    payer: Option<String>,
    /// Custom share as `user=amount`. Repeat for each user; omit for an
    /// equal split.
    #[arg(long = "share", value_parser = parse_share)]
    shares: Vec<(String, MoneyCents)>,
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn parse_share(raw: &str) -> Result<(String, MoneyCents), String> {
    let (user, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected user=amount, got: {raw}"))?;
    if user.trim().is_empty() {
        return Err(format!("missing user in: {raw}"));
    }
    Ok((user.trim().to_string(), parse_amount(amount)?))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            eprintln!("Password must not be empty.");
            continue;
        }
        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        eprintln!("Passwords do not match. Try again.");
    }

    Err("too many attempts".into())
}

fn print_summary(summary: &Summary) {
    println!("{} ({})", summary.trip_name, summary.trip_id);
    println!("total: {}", summary.total_expense);

    println!("\nexpenses:");
    for expense in &summary.expenses {
        println!(
            "  {} {:<24} {:>12}  paid by {}",
            expense.date.format("%Y-%m-%d"),
            expense.name,
            expense.amount,
            expense.payer_id
        );
    }

    println!("\nbalances:");
    for balance in &summary.balances {
        println!(
            "  {:<24} paid {:>12}  owes {:>12}  net {:>12}",
            balance.display_name, balance.income, balance.outcome, balance.net_balance
        );
        for tx in &balance.transactions {
            println!("    -> pays {} to {}", tx.amount, tx.to_user_id);
        }
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let user = engine
                .new_user(&args.username, args.display_name.as_deref(), &password)
                .await?;
            println!("created user: {} ({})", user.username, user.id);
        }
        Command::Trip(Trip {
            command: TripCommand::Create(args),
        }) => {
            let owner = engine.resolve_user(&args.owner).await?;
            let trip = engine.new_trip(&args.name, &owner.id).await?;
            println!("created trip: {} ({})", trip.name, trip.id);
        }
        Command::Trip(Trip {
            command: TripCommand::Join(args),
        }) => {
            let row = engine.add_participant(&args.trip, &args.user).await?;
            println!("user {} joined trip {}", row.user_id, row.trip_id);
        }
        Command::Trip(Trip {
            command: TripCommand::Summary(args),
        }) => {
            let summary = engine.summary(&args.trip).await?;
            print_summary(&summary);
        }
        Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) => {
            let mut cmd = ExpenseCmd::new(args.trip, args.user, args.name, args.amount, Utc::now());
            if let Some(category) = args.category {
                cmd = cmd.category(category);
            }
            if let Some(payer) = args.payer {
                cmd = cmd.payer(payer);
            }
            if !args.shares.is_empty() {
                cmd = cmd.custom_amounts(args.shares);
            }
            let expense = engine.add_expense(cmd).await?;
            println!("recorded expense: {} {} ({})", expense.name, expense.amount, expense.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_share_arguments() {
        let (user, amount) = parse_share("alice=12.50").unwrap();
        assert_eq!(user, "alice");
        assert_eq!(amount, MoneyCents::new(1250));

        assert!(parse_share("alice").is_err());
        assert!(parse_share("=3").is_err());
        assert!(parse_share("bob=abc").is_err());
    }

    #[test]
    fn cli_accepts_repeated_shares() {
        let cli = Cli::try_parse_from([
            "tripsplit_admin",
            "expense",
            "add",
            "--trip",
            "t1",
            "--user",
            "alice",
            "--name",
            "Dinner",
            "--amount",
            "90",
            "--share",
            "alice=60",
            "--share",
            "bob=30",
        ])
        .unwrap();
        let Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) = cli.command
        else {
            panic!("expected expense add");
        };
        assert_eq!(args.amount, MoneyCents::new(9000));
        assert_eq!(args.shares.len(), 2);
        assert!(args.payer.is_none());
    }
}
