use chrono::Local;
use clap::Parser;
use fino::db::connection::establish_connection;
use fino::db::store::{SqliteStore, Store};
use fino::error::Result;
use fino::models::transaction::{Transaction, TransactionType};
use fino::operations::add::create_transaction;
use fino::operations::analysis::{build_analysis, describe_limit, run_analysis};
use fino::operations::balance::{compute_balance, monthly_report};
use fino::operations::category::sorted_category_totals;
use fino::operations::limit::limit_status;
use fino::operations::remove::parse_transaction_id;
use fino::operations::search::{filter_by_month, filter_by_search_term};
use fino::operations::sort::sort_by_date_descending;
use fino::session::Session;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fino")]
#[command(about = "Track income and expenses per user")]
struct Cli {
    /// SQLite file holding every user's data (also read from `FINO_DB`).
    #[arg(long, env = "FINO_DB", default_value = "financial_app.db")]
    db: PathBuf,

    /// Log level for diagnostics on stderr (also read from `FINO_LOG`).
    #[arg(long, env = "FINO_LOG", default_value = "warn")]
    log_level: String,
}

pub enum UserCommands {
    Login,
    Logout,
    Add,
    Remove,
    Clear,
    List,
    Search,
    Categories,
    Limit,
    Summary,
    Report,
    Analysis,
    Import,
    Help,
    Exit,
    Unknown,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("fino={}", cli.log_level)))
        .with_writer(io::stderr)
        .init();

    let conn = match establish_connection(&cli.db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to open database '{}': {}", cli.db.display(), e);
            std::process::exit(1);
        }
    };
    let mut session = Session::new(SqliteStore::new(conn));

    println!("Welcome to the finance tracker! Type 'help' for the list of commands.");

    loop {
        let prompt = session.current_user().unwrap_or("guest").to_string();
        println!("[{}] Please enter a command:", prompt);

        let input = match read_user_input() {
            Ok(cmd) => cmd,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => "exit".to_string(),
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input.as_str(), ""),
        };
        if head.is_empty() {
            continue;
        }

        let outcome = match check_for_command(head) {
            UserCommands::Exit => {
                if let Err(e) = session.logout() {
                    println!("Error saving data: {}", e);
                }
                println!("Exiting the application.");
                break;
            }
            UserCommands::Login => login(&mut session),
            UserCommands::Logout => session.logout().map(|_| println!("Logged out.")),
            UserCommands::Add => add(&mut session),
            UserCommands::Remove => remove(&mut session, rest),
            UserCommands::Clear => clear(&mut session),
            UserCommands::List => list(&session, rest, ""),
            UserCommands::Search => list(&session, "", rest),
            UserCommands::Categories => categories(&session),
            UserCommands::Limit => limit(&mut session, rest),
            UserCommands::Summary => summary(&session, rest),
            UserCommands::Report => report(&session),
            UserCommands::Analysis => analysis(&session, rest),
            UserCommands::Import => import(&mut session, rest),
            UserCommands::Help => {
                print_help();
                Ok(())
            }
            UserCommands::Unknown => {
                println!("No valid command found. Type 'help' for the list of commands.");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("Error: {}", e);
        }
    }
}

fn login<S: Store>(session: &mut Session<S>) -> Result<()> {
    println!("Username:");
    let username = read_user_input()?;
    println!("Password:");
    let password = read_user_input()?;
    session.login(&username, &password)?;
    println!(
        "Logged in as {} ({} transactions).",
        username.trim(),
        session.transactions().len()
    );
    Ok(())
}

fn add<S: Store>(session: &mut Session<S>) -> Result<()> {
    if session.current_user().is_none() {
        println!("Please log in to add transactions.");
        return Ok(());
    }
    if !session.categories().is_empty() {
        println!("Known categories: {}", session.categories().join(", "));
    }
    println!("Please enter transaction details in the format:");
    println!("date(YYYY-MM-DD), amount, type(income/expense), category");
    let details = read_user_input()?;
    let new = create_transaction(&details)?;
    let outcome = session.add_transaction(new)?;
    println!("Transaction {} added successfully!", outcome.transaction.id);
    if let Some(notice) = outcome.limit_notice {
        println!("!! {}", notice);
    }
    Ok(())
}

fn remove<S: Store>(session: &mut Session<S>, arg: &str) -> Result<()> {
    if session.current_user().is_none() {
        println!("Please log in first.");
        return Ok(());
    }
    let raw = if arg.is_empty() {
        println!("Provide the transaction ID to remove:");
        read_user_input()?
    } else {
        arg.to_string()
    };
    let id = parse_transaction_id(&raw)?;
    session.delete_transaction(id)?;
    println!("Transaction removed successfully.");
    Ok(())
}

fn clear<S: Store>(session: &mut Session<S>) -> Result<()> {
    if session.current_user().is_none() {
        println!("Please log in first.");
        return Ok(());
    }
    println!("Delete all transactions? (y/n)");
    if read_user_input()?.eq_ignore_ascii_case("y") {
        let removed = session.clear_all()?;
        println!("Removed {} transactions.", removed);
    }
    Ok(())
}

fn list<S: Store>(session: &Session<S>, month: &str, term: &str) -> Result<()> {
    if session.current_user().is_none() {
        println!("Log in to see your transactions.");
        return Ok(());
    }
    let in_month = filter_by_month(session.transactions(), Some(month));
    let matching = filter_by_search_term(in_month, term);
    let sorted = sort_by_date_descending(matching);

    if sorted.is_empty() {
        println!("No transactions.");
        return Ok(());
    }
    for transaction in &sorted {
        print_transaction(transaction);
    }
    let balance = compute_balance(sorted);
    println!(
        "Income: {}  Expense: {}  Balance: {}",
        balance.income, balance.expense, balance.balance
    );
    Ok(())
}

fn categories<S: Store>(session: &Session<S>) -> Result<()> {
    for transaction_type in [TransactionType::Expense, TransactionType::Income] {
        println!("{} by category:", transaction_type);
        let totals = sorted_category_totals(session.transactions(), transaction_type);
        if totals.is_empty() {
            println!("  No data");
        }
        for (category, sum) in totals {
            println!("  {:15} {:>12}", category, sum);
        }
    }
    Ok(())
}

fn limit<S: Store>(session: &mut Session<S>, arg: &str) -> Result<()> {
    if !arg.is_empty() {
        let limit = session.set_expense_limit(arg)?;
        println!("Expense limit set to {}.", limit);
    }
    let expense = compute_balance(session.transactions()).expense;
    let status = limit_status(expense, session.expense_limit());
    println!("{}", describe_limit(expense, session.expense_limit(), &status));
    Ok(())
}

fn summary<S: Store>(session: &Session<S>, month: &str) -> Result<()> {
    let balance = compute_balance(filter_by_month(session.transactions(), Some(month)));
    println!("Income:  {}", balance.income);
    println!("Expense: {}", balance.expense);
    println!("Balance: {}", balance.balance);
    Ok(())
}

fn report<S: Store>(session: &Session<S>) -> Result<()> {
    match monthly_report(session.transactions(), Local::now().date_naive()) {
        Some(report) => {
            println!("Income:  {}", report.income);
            println!("Expense: {}", report.expense);
            println!("Balance: {}", report.balance);
        }
        None => println!("No data for the current month."),
    }
    Ok(())
}

fn analysis<S: Store>(session: &Session<S>, arg: &str) -> Result<()> {
    if session.current_user().is_none() {
        println!("Please log in first.");
        return Ok(());
    }
    let chart_type = if arg.is_empty() {
        TransactionType::Expense
    } else {
        match TransactionType::parse(arg) {
            Some(t) => t,
            None => {
                println!("Chart type must be 'income' or 'expense'.");
                return Ok(());
            }
        }
    };
    let data = build_analysis(
        session.transactions(),
        session.expense_limit(),
        chart_type,
        Local::now().date_naive(),
    );
    run_analysis(&data)
}

fn import<S: Store>(session: &mut Session<S>, arg: &str) -> Result<()> {
    if session.current_user().is_none() {
        println!("Please log in first.");
        return Ok(());
    }
    let path = if arg.is_empty() {
        println!("Please enter the file path to import from (date,amount,type,category):");
        read_user_input()?
    } else {
        arg.to_string()
    };
    let count = session.import_csv(Path::new(&path))?;
    println!("Successfully imported {} transactions.", count);
    Ok(())
}

fn print_transaction(transaction: &Transaction) {
    let sign = match transaction.transaction_type {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    println!(
        "{:>14}  {}  {:15} {}{}",
        transaction.id,
        transaction.date_string(),
        transaction.category,
        sign,
        transaction.amount
    );
}

fn print_help() {
    println!(
        "Commands:
  login                    sign in (switches user if already signed in)
  logout                   save and sign out
  add                      add a transaction
  remove [id]              delete a transaction by id
  clear                    delete all transactions
  list [YYYY-MM]           list transactions, newest first
  search <term>            list transactions matching a category or amount
  categories               totals per category
  limit [amount]           show or set the expense limit (0 removes it)
  summary [YYYY-MM]        balance, optionally for one month
  report                   balance for the current month
  analysis [income|expense] charts and totals
  import [path]            import transactions from a CSV file
  exit                     save and quit"
    );
}

fn read_user_input() -> io::Result<String> {
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
    }
    Ok(input.trim().to_string())
}

fn check_for_command(input: &str) -> UserCommands {
    match input.to_lowercase().as_str() {
        "login" => UserCommands::Login,
        "logout" => UserCommands::Logout,
        "add" => UserCommands::Add,
        "remove" => UserCommands::Remove,
        "clear" => UserCommands::Clear,
        "list" | "print" => UserCommands::List,
        "search" => UserCommands::Search,
        "categories" => UserCommands::Categories,
        "limit" => UserCommands::Limit,
        "summary" => UserCommands::Summary,
        "report" => UserCommands::Report,
        "analysis" => UserCommands::Analysis,
        "import" => UserCommands::Import,
        "help" => UserCommands::Help,
        "exit" | "quit" => UserCommands::Exit,
        _ => UserCommands::Unknown,
    }
}
