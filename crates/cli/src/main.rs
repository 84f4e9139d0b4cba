//! jobgrid — command-line client for the JobGrid platform.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_client::applications::{ApplicationFilter, SubmitApplication};
use api_client::auth::LoginRequest;
use api_client::jobs::JobSearch;
use api_client::{ApiError, ServiceClients};
use clap::{Parser, Subcommand};
use common::Config;
use session::FileStore;

#[derive(Parser)]
#[command(
    name = "jobgrid",
    about = "Command-line client for the JobGrid job marketplace",
    version
)]
struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, env = "JOBGRID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Password (prefer the environment variable in scripts)
        #[arg(long, env = "JOBGRID_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Search job postings
    Jobs {
        /// Free-text search
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one job posting
    Job { job_id: u64 },
    /// Apply to a job posting
    Apply {
        job_id: u64,
        #[arg(long)]
        cover_letter: Option<String>,
        #[arg(long)]
        resume_id: Option<String>,
    },
    /// List submitted applications
    Applications {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show the signed-in user's profile
    Profile,
    /// Probe the configured services
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    tracing::debug!("auth service at {}", config.auth.base_url);
    let store = Arc::new(FileStore::new().context("opening credential store")?);
    let services = ServiceClients::new(&config, store).context("building service clients")?;

    match run(cli.command, &services).await {
        Err(err) if is_session_expired(&err) => {
            eprintln!("Session expired. Run `jobgrid login` to sign in again.");
            std::process::exit(1);
        }
        other => other,
    }
}

fn is_session_expired(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::SessionExpired(_)))
}

async fn run(command: Command, services: &ServiceClients) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let response = services
                .auth
                .login(&LoginRequest {
                    email,
                    password,
                    device_id: None,
                })
                .await?;
            println!(
                "Signed in as {} {} <{}>",
                response.user.first_name, response.user.last_name, response.user.email
            );
            println!("Session valid for {}s", response.expires_in);
        }
        Command::Logout => {
            services.auth.logout().await?;
            println!("Signed out.");
        }
        Command::Whoami => {
            let user = services.auth.current_user().await?;
            println!(
                "{} {} <{}> ({:?})",
                user.first_name, user.last_name, user.email, user.user_type
            );
        }
        Command::Jobs {
            query,
            location,
            page,
            limit,
        } => {
            let params = JobSearch {
                search: query,
                location,
                page: Some(page),
                limit: Some(limit),
                ..Default::default()
            };
            let results = services.jobs.search(&params).await?;
            println!(
                "{} jobs (page {} of {})",
                results.total, results.page, results.pages
            );
            for job in &results.jobs {
                println!(
                    "#{:<8} {:<40} {} [{}]",
                    job.id,
                    job.title,
                    job.company,
                    job.location.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Job { job_id } => {
            let details = services.jobs.details(job_id).await?;
            let job = &details.job;
            println!("#{} {} at {}", job.id, job.title, job.company);
            if let Some(location) = &job.location {
                println!("Location: {}", location);
            }
            if let Some(salary) = &job.salary {
                println!("Salary:   {}", salary);
            }
            if !job.skills.is_empty() {
                println!("Skills:   {}", job.skills.join(", "));
            }
            if let Some(count) = details.application_count {
                println!("{} applications so far", count);
            }
            if !details.similar_jobs.is_empty() {
                println!("Similar:");
                for similar in &details.similar_jobs {
                    println!("  #{} {} at {}", similar.id, similar.title, similar.company);
                }
            }
        }
        Command::Apply {
            job_id,
            cover_letter,
            resume_id,
        } => {
            let application = services
                .applications
                .submit(&SubmitApplication {
                    job_id,
                    resume_id,
                    cover_letter,
                })
                .await?;
            println!(
                "Application {} submitted (status {:?})",
                application.id, application.status
            );
        }
        Command::Applications { page } => {
            let filter = ApplicationFilter {
                page,
                ..Default::default()
            };
            let listing = services.applications.list(&filter).await?;
            println!("{} applications", listing.total);
            for application in &listing.applications {
                println!(
                    "{}  job #{}  {:?}  ({})",
                    application.id, application.job_id, application.status, application.applied_date
                );
            }
        }
        Command::Profile => {
            let profile = services.profile.get().await?;
            let name = [profile.first_name.as_deref(), profile.last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "{}",
                if name.is_empty() { "(no name set)" } else { name.as_str() }
            );
            if let Some(location) = &profile.location {
                println!("Location: {}", location);
            }
            if let Some(bio) = &profile.bio {
                println!("{}", bio);
            }
        }
        Command::Health => {
            for health in services.health().await {
                match &health.error {
                    None => println!("{:<14} healthy", health.service),
                    Some(error) => println!("{:<14} unhealthy: {}", health.service, error),
                }
            }
        }
    }
    Ok(())
}
