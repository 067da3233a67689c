//! CLI administration tool for hotel-listing.
//!
//! Issues and inspects bearer tokens, generates API keys and prints the
//! versioned route table without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue an administrator token
//! cargo run --bin admin -- token issue --subject alice --role Administrator
//!
//! # Check a token
//! cargo run --bin admin -- token verify eyJhbGciOi...
//!
//! # Generate an API key for API_KEYS
//! cargo run --bin admin -- api-key generate
//!
//! # Show the route table
//! cargo run --bin admin -- routes
//! ```
//!
//! # Environment Variables
//!
//! - `JWT_SECRET` (required for token commands): HS256 signing secret
//! - `JWT_ISSUER` (optional): issuer claim written into and required from tokens
//! - `JWT_LIFETIME_MINUTES` (optional): default lifetime of issued tokens

use hotel_listing::api::routes::version_groups;
use hotel_listing::application::services::{CatalogService, TokenValidator};
use hotel_listing::infrastructure::persistence::InMemoryCatalog;
use hotel_listing::pipeline::Access;
use hotel_listing::state::AppState;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing hotel-listing.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue and verify bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage API keys
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },

    /// Print the route table of every API version
    Routes,
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a signed token
    Issue {
        /// Token subject (user id or name)
        #[arg(short, long)]
        subject: Option<String>,

        /// Role granted to the subject; repeat for several roles
        #[arg(short, long = "role")]
        roles: Vec<String>,

        /// Token lifetime in minutes (defaults to JWT_LIFETIME_MINUTES, then 60)
        #[arg(short, long)]
        lifetime_minutes: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Validate a token and show its claims
    Verify {
        token: String,
    },
}

#[derive(Subcommand)]
enum ApiKeyAction {
    /// Generate a random API key
    Generate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::ApiKey { action } => match action {
            ApiKeyAction::Generate => generate_api_key(),
        },
        Commands::Routes => print_routes(),
    }

    Ok(())
}

fn token_validator() -> Result<TokenValidator> {
    let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let issuer = std::env::var("JWT_ISSUER")
        .ok()
        .filter(|v| !v.trim().is_empty());
    Ok(TokenValidator::new(&secret, issuer, 0))
}

fn handle_token_action(action: TokenAction) -> Result<()> {
    let validator = token_validator()?;

    match action {
        TokenAction::Issue {
            subject,
            roles,
            lifetime_minutes,
            yes,
        } => {
            let lifetime_minutes = match lifetime_minutes {
                Some(minutes) => minutes,
                None => std::env::var("JWT_LIFETIME_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            };
            issue_token(&validator, subject, roles, lifetime_minutes, yes)
        }
        TokenAction::Verify { token } => verify_token(&validator, &token),
    }
}

/// Issues a token after showing its claims.
///
/// The token is printed once; nothing is stored.
fn issue_token(
    validator: &TokenValidator,
    subject: Option<String>,
    roles: Vec<String>,
    lifetime_minutes: u64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Issue Bearer Token".bright_blue().bold());
    println!();

    let subject = match subject {
        Some(s) => s,
        None => Input::new().with_prompt("Subject").interact_text()?,
    };
    if lifetime_minutes == 0 {
        anyhow::bail!("Lifetime must be at least one minute");
    }

    println!("{}", "Token claims:".bright_white().bold());
    println!("  Subject:  {}", subject.cyan());
    println!(
        "  Roles:    {}",
        if roles.is_empty() {
            "(none)".bright_black()
        } else {
            roles.join(", ").cyan()
        }
    );
    println!(
        "  Lifetime: {} minutes",
        lifetime_minutes.to_string().cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Issue this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token = validator
        .issue(
            &subject,
            &roles,
            Duration::from_secs(lifetime_minutes * 60),
        )
        .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;

    println!();
    println!("{}", "✅ Token issued".green().bold());
    println!();
    println!("  {}", token.bright_yellow());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/v1/account/profile",
        token.bright_yellow()
    );
    println!();

    Ok(())
}

fn verify_token(validator: &TokenValidator, token: &str) -> Result<()> {
    println!("{}", "🔍 Verify Bearer Token".bright_blue().bold());
    println!();

    match validator.validate(token.trim()) {
        Ok(principal) => {
            let remaining = principal.expires_at - Utc::now();
            println!("  Status:   {}", "VALID".green().bold());
            println!("  Subject:  {}", principal.subject.cyan());
            println!(
                "  Roles:    {}",
                principal
                    .roles
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
                    .cyan()
            );
            println!(
                "  Expires:  {} ({} min left)",
                principal
                    .expires_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
                    .bright_black(),
                remaining.num_minutes()
            );
        }
        Err(e) => {
            println!("  Status:   {}", "INVALID".red().bold());
            println!("  Reason:   {} ({})", e.to_string().yellow(), e.kind());
        }
    }
    println!();

    Ok(())
}

/// Prints a new 48-character key to append to `API_KEYS`.
fn generate_api_key() {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let key: String = (0..48)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();

    println!("{}", "✨ Generated API key".green().bold());
    println!();
    println!("  {}", key.bright_yellow().bold());
    println!();
    println!(
        "Append it to {} and send it as the {} header.",
        "API_KEYS".bright_cyan(),
        "X-Api-Key".bright_cyan()
    );
    println!();
}

fn print_routes() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let service = CatalogService::new(catalog.clone(), catalog, Duration::from_secs(1));
    let groups = version_groups(AppState::new(Arc::new(service)));

    println!("{}", "📋 Routes".bright_blue().bold());

    for group in &groups {
        println!();
        println!("  {}", group.version.to_string().bright_white().bold());
        println!("  {}", "─".repeat(75).bright_black());
        for route in &group.routes {
            let access = match &route.access {
                Access::Public => "public".green(),
                Access::Protected(roles) if roles.is_empty() => "any token".yellow(),
                Access::Protected(roles) => roles.join("|").red(),
            };
            println!(
                "  {:<7} {:<40} {}",
                route.method.as_str().cyan(),
                format!("/api/{}{}", group.version, route.path),
                access
            );
        }
    }
    println!();
}
