use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use mashar_cli::admin::{self, NewSuperadmin};
use mashar_cli::seeder::{self, SeedConfig};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "mashar-cli")]
#[command(about = "Mashar CLI - Administrative tools for Mashar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a superadmin account
    CreateSuperadmin {
        /// Login name, usually an email address
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Branch code, created when missing
        #[arg(short = 'b', long)]
        branch: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake branches, staff and games
    Seed {
        /// Number of branches to create
        #[arg(short = 'b', long, default_value = "3")]
        branches: usize,

        /// Number of staff accounts per branch
        #[arg(short = 'u', long, default_value = "8")]
        users: usize,

        /// Number of games per branch
        #[arg(short = 'g', long, default_value = "4")]
        games: usize,
    },
    /// Clear all seeded data (keeps superadmins)
    ClearSeed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::CreateSuperadmin {
            username,
            name,
            branch,
            password,
        } => handle_create_superadmin(&pool, username, name, branch, password).await,
        Commands::Seed {
            branches,
            users,
            games,
        } => {
            let config = SeedConfig {
                branches,
                users_per_branch: users,
                games_per_branch: games,
            };
            seeder::seed_all(&pool, config).await
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn prompt(value: Option<String>, label: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(value) => Ok(value),
        None => Input::new().with_prompt(label).interact_text(),
    }
}

async fn handle_create_superadmin(
    pool: &PgPool,
    username: Option<String>,
    name: Option<String>,
    branch: Option<String>,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let username = prompt(username, "Username")?;
    let name = prompt(name, "Name")?;
    let branch = prompt(branch, "Branch code")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    admin::create_superadmin(
        pool,
        NewSuperadmin {
            username: &username,
            name: &name,
            branch: &branch,
            password: &password,
        },
    )
    .await?;

    println!("\n✅ Superadmin created successfully!");
    println!("   Username: {}", username);
    println!("   Branch: {}", branch);
    Ok(())
}
