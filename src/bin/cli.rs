//! SquirrelDB CLI Client
//!
//! Command-line interface for a running SquirrelDB server.

use std::time::Duration;

use clap::{Parser, Subcommand};
use squirreldb::network::Client;
use squirreldb::Squirrel;

/// SquirrelDB CLI
#[derive(Parser, Debug)]
#[command(name = "squirreldb-cli")]
#[command(about = "CLI for the SquirrelDB REST service")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Read/write timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all squirrels
    List,

    /// Show one squirrel
    Get {
        /// Squirrel id
        id: String,
    },

    /// Create a squirrel
    Create {
        /// Squirrel name
        name: String,

        /// Squirrel size
        size: String,
    },

    /// Update a squirrel's name and size
    Update {
        /// Squirrel id
        id: String,

        /// New name
        name: String,

        /// New size
        size: String,
    },

    /// Delete a squirrel
    Delete {
        /// Squirrel id
        id: String,
    },
}

fn main() {
    let args = Args::parse();
    let client = Client::new(&args.server).with_timeout(Duration::from_millis(args.timeout_ms));

    let result = match args.command {
        Commands::List => client.list().map(|squirrels| {
            if squirrels.is_empty() {
                println!("(no squirrels)");
            }
            for squirrel in &squirrels {
                print_squirrel(squirrel);
            }
        }),
        Commands::Get { id } => client.get(&id).map(|found| match found {
            Some(squirrel) => print_squirrel(&squirrel),
            None => println!("404 Not Found"),
        }),
        Commands::Create { name, size } => {
            client.create(&name, &size).map(|()| println!("Created"))
        }
        Commands::Update { id, name, size } => client.update(&id, &name, &size).map(|updated| {
            println!("{}", if updated { "Updated" } else { "404 Not Found" })
        }),
        Commands::Delete { id } => client.delete(&id).map(|deleted| {
            println!("{}", if deleted { "Deleted" } else { "404 Not Found" })
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_squirrel(squirrel: &Squirrel) {
    println!("{:>4}  {:<20} {}", squirrel.id, squirrel.name, squirrel.size);
}
