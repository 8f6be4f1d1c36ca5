//! csql - a client for the CSQL engine.

mod cli;
mod logging;
mod repl;

use cli::{Cli, Command};
use csql_client::client::CsqlClient;
use csql_client::config::Config;
use csql_client::decode::{self, format_row, Row};
use csql_client::error::{CsqlError, Result};
use csql_client::workload::{self, StressOptions};
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::{error, info};

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Could not load .env: {e}");
        }
    }

    let cli = Cli::parse_args();

    logging::init(logging::LogTarget::for_command(&cli.command()));

    if let Err(e) = run(&cli) {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let engine = cli.resolve_engine(&config)?;
    info!("Engine: {}", engine.display_string());

    let client = CsqlClient::connect(&engine)?;
    let runtime =
        Runtime::new().map_err(|e| CsqlError::internal(format!("tokio runtime: {e}")))?;

    match cli.command() {
        Command::Repl => repl::run(&runtime, &client),
        Command::Exec { sql, rows, json } => {
            let text = runtime.block_on(client.execute_query(&sql))?;
            if json {
                print_json(&decode::decode(&text))
            } else if rows {
                print_rows(&decode::decode(&text));
                Ok(())
            } else {
                print!("{text}");
                Ok(())
            }
        }
        Command::Users { json } => {
            let users = runtime.block_on(client.get_users())?;
            if json {
                return print_json(&users);
            }
            println!("id\tusername\temail");
            for user in users {
                println!("{}\t{}\t{}", user.id, user.username, user.email);
            }
            Ok(())
        }
        Command::Orders { json } => {
            let orders = runtime.block_on(client.get_user_orders())?;
            if json {
                return print_json(&orders);
            }
            println!("order_id\tusername\titem");
            for order in orders {
                println!("{}\t{}\t{}", order.order_id, order.username, order.order_item);
            }
            Ok(())
        }
        Command::Seed => {
            if runtime.block_on(workload::seed(&client))? {
                println!("Database initialized successfully!");
            } else {
                println!("Schema already present; nothing seeded.");
            }
            Ok(())
        }
        Command::Stress { count, concurrency } => {
            let report = runtime.block_on(workload::stress(
                &client,
                StressOptions { count, concurrency },
            ))?;
            print_json(&report)
        }
    }
}

fn print_rows(rows: &[Row]) {
    for row in rows {
        println!("{}", format_row(row));
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CsqlError::internal(format!("JSON encoding failed: {e}")))?;
    println!("{json}");
    Ok(())
}
