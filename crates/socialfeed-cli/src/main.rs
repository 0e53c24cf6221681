use anyhow::Context;
use clap::{Parser, Subcommand};
use socialfeed_cli::seeder::{self, SeedConfig};
use socialfeed_db::{DatabaseConfig, init_db_pool};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "socialfeed-cli")]
#[command(about = "SocialFeed CLI - development data tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with fake users, posts, comments and follows
    Seed {
        /// Number of users to create
        #[arg(short = 'u', long, default_value = "20")]
        users: usize,

        /// Posts per user
        #[arg(short = 'p', long, default_value = "5")]
        posts: usize,

        /// Comments per post
        #[arg(short = 'c', long, default_value = "3")]
        comments: usize,

        /// Accounts each user follows
        #[arg(short = 'f', long, default_value = "5")]
        follows: usize,

        /// Password shared by every seeded account
        #[arg(long, default_value = "password123")]
        password: String,
    },
    /// Remove all users, posts, comments and follows (roles are kept)
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::Seed {
            users,
            posts,
            comments,
            follows,
            password,
        } => {
            let config = SeedConfig {
                users,
                posts_per_user: posts,
                comments_per_post: comments,
                follows_per_user: follows,
                password,
                ..SeedConfig::default()
            };
            let summary = seeder::seed_all(&pool, config).await?;
            println!(
                "✅ Seeded {} users, {} posts, {} comments, {} follows",
                summary.users, summary.posts, summary.comments, summary.follows
            );
        }
        Commands::Clear => {
            seeder::clear_all(&pool).await?;
            println!("✅ Cleared seeded data");
        }
    }

    Ok(())
}
