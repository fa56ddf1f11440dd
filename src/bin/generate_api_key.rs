//! CLI tool to generate API keys.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --name "Station 4 operator" --role operator --expires-in 365d

use std::env;

use enviroportal_lib::config::Config;
use enviroportal_lib::db::DbPool;
use enviroportal_lib::migration::{Migrator, MigratorTrait};
use enviroportal_lib::models::ApiKeyRole;
use enviroportal_lib::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut name: Option<String> = None;
    let mut role = "operator".to_string();
    let mut expires_in: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--name" | "-n" => {
                i += 1;
                if i < args.len() {
                    name = Some(args[i].clone());
                }
            }
            "--role" | "-r" => {
                i += 1;
                if i < args.len() {
                    role = args[i].clone();
                }
            }
            "--expires-in" | "-e" => {
                i += 1;
                if i < args.len() {
                    expires_in = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let name = match name {
        Some(n) => n,
        None => {
            eprintln!("Error: --name is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let role_enum = match ApiKeyRole::parse(&role) {
        Some(r) => r,
        None => {
            eprintln!(
                "Error: Invalid role '{}'. Must be: admin, reviewer, operator, viewer",
                role
            );
            std::process::exit(1);
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::connect(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(pool.connection(), None).await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    let (full_key, api_key) =
        match api_key::create_key(&pool, &name, role_enum, expires_in.as_deref()).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error generating key: {}", e);
                std::process::exit(1);
            }
        };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  ID:      {}", api_key.id);
    println!("  Name:    {}", api_key.name);
    println!("  Role:    {}", api_key.role);
    println!("  Prefix:  {}", api_key.key_prefix);
    if let Some(expires) = api_key.expires_at {
        println!("  Expires: {}", expires.to_rfc3339());
    } else {
        println!("  Expires: Never");
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("  Save this key! It cannot be retrieved later.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: generate-api-key --name <name> [--role <role>] [--expires-in <duration>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --name, -n        Name for the API key (required)");
    eprintln!("  --role, -r        Role: admin, reviewer, operator, viewer (default: operator)");
    eprintln!("  --expires-in, -e  Expiration: 30d, 365d, 1y, etc. (default: never)");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  generate-api-key --name \"Station 4 operator\" --role operator --expires-in 365d");
    eprintln!("  generate-api-key --name \"EIA reviewer\" --role reviewer");
    eprintln!();
}
