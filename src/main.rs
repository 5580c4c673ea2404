mod config;
mod db;
mod models;
mod reports;

use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::types::BigDecimal;
use tracing_subscriber::EnvFilter;

use crate::db::{Database, DbError};
use crate::models::{Client, Employee, Project};

#[derive(Parser, Debug)]
#[command(
    name = "workforce_manager",
    about = "Relational CRUD demos over the clients/employees/projects schema"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database tables if they do not exist
    Init,
    /// Insert the demo clients, employees, one project and one assignment
    Seed,
    /// Update a client's phone number
    UpdatePhone {
        /// National id of the client
        client: String,
        phone: String,
    },
    /// Raise the budget of every active project by 10%
    RaiseBudgets,
    /// Put a different manager in charge of a project
    ReassignManager {
        project: i32,
        /// National id of the new manager
        manager: String,
    },
    /// Delete clients that have no projects
    PruneClients,
    /// Delete finished projects whose budget is under the floor
    PruneProjects {
        #[arg(long, default_value = "10000")]
        budget_floor: BigDecimal,
    },
    /// Move assignments off projects finished more than five years ago onto
    /// the destination project, then delete those projects
    Consolidate { destination: i32 },
    /// Delete a client together with its projects and their assignments
    DeleteClient { client: String },
    /// Print the reporting queries
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;

    // Initialize database connection
    let db = db::init(&config).await?;

    match cli.command {
        Commands::Init => match db::schema::create_tables(db.get_pool()).await {
            Ok(()) => println!("Tables are ready."),
            Err(err) => report_failure("create the tables", &err),
        },
        Commands::Seed => seed(&db).await?,
        Commands::UpdatePhone { client, phone } => {
            match db.update_client_phone(&client, &phone).await {
                Ok(0) => println!("No client with id {client}."),
                Ok(_) => println!("Phone of client {client} updated to {phone}."),
                Err(err) => report_failure("update the client's phone", &err),
            }
        }
        Commands::RaiseBudgets => match db.raise_active_project_budgets().await {
            Ok(count) => println!("Raised the budget of {count} active project(s) by 10%."),
            Err(err) => report_failure("raise the budgets", &err),
        },
        Commands::ReassignManager { project, manager } => {
            match db.reassign_project_manager(project, &manager).await {
                Ok((project, manager)) => println!(
                    "Project '{}' is now managed by {}.",
                    project.title, manager.name
                ),
                Err(err) => report_failure("reassign the project manager", &err),
            }
        }
        Commands::PruneClients => match db.delete_clients_without_projects().await {
            Ok(count) => println!("Deleted {count} client(s) without projects."),
            Err(err) => report_failure("delete clients without projects", &err),
        },
        Commands::PruneProjects { budget_floor } => {
            match db.delete_stale_projects_below(&budget_floor).await {
                Ok(count) => println!(
                    "Deleted {count} finished project(s) with a budget under {budget_floor}."
                ),
                Err(err) => report_failure("delete old low-budget projects", &err),
            }
        }
        Commands::Consolidate { destination } => {
            match db.consolidate_obsolete_projects(destination).await {
                Ok((reassigned, deleted)) => {
                    println!("Moved {reassigned} assignment(s) to project {destination}.");
                    println!("Deleted {deleted} obsolete project(s).");
                }
                Err(err) => report_failure("consolidate obsolete projects", &err),
            }
        }
        Commands::DeleteClient { client } => match db.delete_client_cascade(&client).await {
            Ok((assignments, projects)) => {
                println!(
                    "Deleted client {client} with {projects} project(s) and {assignments} assignment(s)."
                );
            }
            Err(err) => report_failure("delete the client", &err),
        },
        Commands::Report => {
            if let Err(err) = run_reports(&db).await {
                report_failure("run the reports", &err);
            }
        }
    }

    Ok(())
}

/// Boundary for database failures: log, print a distinct diagnostic per
/// failure kind, and carry on.
fn report_failure(action: &str, err: &DbError) {
    tracing::error!(action, error = %err, "operation failed");
    match err {
        DbError::Integrity(_) => {
            println!("Integrity violation trying to {action}: {err}. No changes were kept.");
        }
        DbError::Unavailable(_) => {
            println!("Could not reach the database trying to {action}: {err}.");
        }
        DbError::NotFound { .. } => println!("Cannot {action}: {err}."),
        DbError::Database(_) => println!("Unexpected error trying to {action}: {err}."),
    }
}

/// Insert the demo rows: three clients, three employees, one project for the
/// first client led by the one manager, and one assignment on it.
async fn seed(db: &Database) -> Result<()> {
    let clients = vec![
        Client {
            national_id: "12345678A".to_string(),
            name: "Northwind Retail".to_string(),
            phone: Some("912345678".to_string()),
            email: "contact@northwind.example.com".to_string(),
        },
        Client {
            national_id: "B87654321".to_string(),
            name: "Beta Logistics".to_string(),
            phone: Some("934567890".to_string()),
            email: "info@beta-logistics.example.com".to_string(),
        },
        Client {
            national_id: "98765432B".to_string(),
            name: "Walk-in Customer".to_string(),
            phone: Some("600112233".to_string()),
            email: "customer@mail.example.com".to_string(),
        },
    ];
    match db.insert_clients(&clients).await {
        Ok(count) => println!("Inserted {count} clients."),
        Err(err) => report_failure("insert the demo clients", &err),
    }

    let employees = vec![
        Employee {
            national_id: "11111111X".to_string(),
            name: "Alice Vega".to_string(),
            is_manager: true,
            email: "alice.vega@workforce.example.com".to_string(),
        },
        Employee {
            national_id: "22222222Y".to_string(),
            name: "Ben Ortiz".to_string(),
            is_manager: false,
            email: "ben.ortiz@workforce.example.com".to_string(),
        },
        Employee {
            national_id: "33333333Z".to_string(),
            name: "Carla Reyes".to_string(),
            is_manager: false,
            email: "carla.reyes@workforce.example.com".to_string(),
        },
    ];
    match db.insert_employees(&employees).await {
        Ok(count) => println!("Inserted {count} employees."),
        Err(err) => report_failure("insert the demo employees", &err),
    }

    let project = Project {
        id: 0,
        title: "Corporate website revamp".to_string(),
        description: Some("New public site and online store for Northwind Retail.".to_string()),
        start_date: NaiveDate::from_str("2024-01-15")?,
        end_date: None,
        budget: BigDecimal::from_str("15000.00")?,
        client_id: "12345678A".to_string(),
        manager_id: "11111111X".to_string(),
    };
    match db.create_project(&project).await {
        Ok(id) => {
            println!("Project '{}' created with id {id}.", project.title);
            match db.create_assignment("22222222Y", id).await {
                Ok(()) => println!("Assigned employee 22222222Y to project {id}."),
                Err(err) => report_failure("assign the demo employee", &err),
            }
        }
        Err(err) => report_failure("insert the demo project", &err),
    }

    Ok(())
}

/// Fetch all four tables once and print the five in-memory reports.
async fn run_reports(db: &Database) -> Result<(), DbError> {
    let clients = db.list_clients().await?;
    let employees = db.list_employees().await?;
    let projects = db.list_projects().await?;
    let assignments = db.list_assignments().await?;

    println!("-- Total project budget per client --");
    for row in reports::budget_totals_by_client(&clients, &projects) {
        println!("{}: {}", row.client_name, row.total_budget);
    }

    println!("\n-- Employees per project --");
    for roster in reports::rosters_by_project(&projects, &employees, &assignments) {
        println!("{}:", roster.project_title);
        for member in roster.members {
            println!(
                "  {} (on {} project(s) overall)",
                member.employee_name, member.total_projects
            );
        }
    }

    println!("\n-- Highest-budget project per client --");
    for top in reports::top_project_by_client(&clients, &projects) {
        match top.project {
            Some((title, budget)) => println!("{}: '{}' ({})", top.client_name, title, budget),
            None => println!("{}: no projects", top.client_name),
        }
    }

    println!("\n-- Projects with manager and headcount --");
    for summary in reports::manager_summaries(&projects, &employees, &assignments) {
        println!(
            "{}: managed by {}, {} assigned",
            summary.project_title, summary.manager_name, summary.assigned
        );
    }

    println!("\n-- Longest project per client --");
    for longest in reports::longest_project_by_client(&clients, &projects, &assignments) {
        match longest.project {
            Some(project) => println!(
                "{}: '{}' ({} days, {} employee(s))",
                longest.client_name, project.title, project.duration_days, project.employee_count
            ),
            None => println!("{}: no finished projects", longest.client_name),
        }
    }

    Ok(())
}
