use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nesti_admin::api::analytics::AnalyticsApi;
use nesti_admin::api::categories::{
    self, CategoriesApi, CreateCategoryRequest, UpdateCategoryRequest,
};
use nesti_admin::api::events::{self, CreateEventRequest, EventsApi};
use nesti_admin::api::services::{CreateServiceRequest, Service, ServicesApi, UpdateServiceRequest};
use nesti_admin::api::users::UsersApi;
use nesti_admin::auth::{AuthContext, AuthState};
use nesti_admin::state::{ListState, RecordState};
use nesti_admin::{ApiClient, ApiConfig, Session, TokenStore};

#[derive(Parser, Debug)]
#[command(name = "nesti-admin")]
#[command(version, about = "Admin console for the Nesti community services directory", long_about = None)]
struct Cli {
    /// Backend API URL (overrides the environment-selected one)
    #[arg(long, env = "NESTI_API_URL")]
    api_url: Option<String>,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current session
    Whoami,

    /// Service listing management
    #[command(subcommand)]
    Services(ServicesCommands),

    /// Category management
    #[command(subcommand)]
    Categories(CategoriesCommands),

    /// Event management
    #[command(subcommand)]
    Events(EventsCommands),

    /// Registered users
    #[command(subcommand)]
    Users(UsersCommands),

    /// Service click analytics
    Analytics,
}

#[derive(Subcommand, Debug)]
enum ServicesCommands {
    /// List services, optionally filtered by name
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single service
    Show { id: i64 },
    /// Add a new service listing
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        location: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        short_description: String,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rating: Option<f64>,
    },
    /// Update fields of an existing service
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category_id: Option<i64>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        short_description: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rating: Option<f64>,
    },
    /// Delete a service
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum CategoriesCommands {
    /// List categories
    List,
    /// Add a new category
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update an existing category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a category
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum EventsCommands {
    /// List events
    List,
    /// Add a new event
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        short_description: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        event_for: Option<String>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
        /// Raw event JSON (alternate key conventions accepted)
        #[arg(long, conflicts_with_all = ["name", "start_time", "end_time"])]
        json: Option<String>,
    },
    /// Delete an event
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum UsersCommands {
    /// List registered users
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = cli.log_level.clone().unwrap_or_else(|| "warn".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ApiConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.clone());
    }

    let store = TokenStore::default_location()?;
    let session = Session::new();
    let client = ApiClient::new(config, store.clone(), session.clone())?;
    let auth = AuthContext::new(client.clone(), store, session);
    auth.initialize();

    run_command(&cli, &client, &auth).await
}

async fn run_command(cli: &Cli, client: &ApiClient, auth: &AuthContext) -> Result<()> {
    match &cli.command {
        Commands::Login { email, password } => cmd_login(auth, email, password).await,
        Commands::Logout => cmd_logout(auth),
        Commands::Whoami => cmd_whoami(auth),
        Commands::Services(ServicesCommands::List { search }) => {
            cmd_services_list(client, search.as_deref()).await
        }
        Commands::Services(ServicesCommands::Add {
            name,
            category_id,
            location,
            city,
            address,
            short_description,
            website,
            description,
            rating,
        }) => {
            let request = CreateServiceRequest {
                name: name.clone(),
                category_id: *category_id,
                location: location.clone(),
                city: city.clone(),
                address: address.clone(),
                short_description: short_description.clone(),
                rating: *rating,
                website: website.clone(),
                description: description.clone(),
            };
            cmd_services_add(client, &request).await
        }
        Commands::Services(ServicesCommands::Update {
            id,
            name,
            category_id,
            location,
            city,
            address,
            short_description,
            website,
            description,
            rating,
        }) => {
            let request = UpdateServiceRequest {
                name: name.clone(),
                category_id: *category_id,
                location: location.clone(),
                city: city.clone(),
                rating: *rating,
                address: address.clone(),
                website: website.clone(),
                description: description.clone(),
                short_description: short_description.clone(),
            };
            cmd_services_update(client, *id, &request).await
        }
        Commands::Services(ServicesCommands::Show { id }) => cmd_services_show(client, *id).await,
        Commands::Services(ServicesCommands::Delete { id }) => {
            cmd_services_delete(client, *id).await
        }
        Commands::Categories(CategoriesCommands::List) => cmd_categories_list(client).await,
        Commands::Categories(CategoriesCommands::Add { name, description }) => {
            let request = CreateCategoryRequest {
                name: name.clone(),
                description: description.clone(),
            };
            cmd_categories_add(client, &request).await
        }
        Commands::Categories(CategoriesCommands::Update {
            id,
            name,
            description,
        }) => {
            let request = UpdateCategoryRequest {
                name: name.clone(),
                description: description.clone(),
            };
            cmd_categories_update(client, *id, &request).await
        }
        Commands::Categories(CategoriesCommands::Delete { id }) => {
            cmd_categories_delete(client, *id).await
        }
        Commands::Events(EventsCommands::List) => cmd_events_list(client).await,
        Commands::Events(command @ EventsCommands::Add { .. }) => {
            cmd_events_add(client, command).await
        }
        Commands::Events(EventsCommands::Delete { id }) => cmd_events_delete(client, *id).await,
        Commands::Users(UsersCommands::List) => cmd_users_list(client).await,
        Commands::Analytics => cmd_analytics(client).await,
    }
}

async fn cmd_login(auth: &AuthContext, email: &str, password: &str) -> Result<()> {
    let user = auth.login(email, password).await?;
    match user.and_then(|u| u.name) {
        Some(name) => println!("Signed in as {}.", name),
        None => println!("Signed in."),
    }
    Ok(())
}

fn cmd_logout(auth: &AuthContext) -> Result<()> {
    auth.logout();
    println!("Signed out.");
    Ok(())
}

fn cmd_whoami(auth: &AuthContext) -> Result<()> {
    match auth.session().state() {
        AuthState::Authenticated { user } => {
            let user = user.unwrap_or_default();
            println!("Authenticated.");
            if let Some(name) = user.name {
                println!("Name:   {}", name);
            }
            if let Some(email) = user.email {
                println!("Email:  {}", email);
            }
        }
        _ => println!("Not signed in."),
    }
    Ok(())
}

async fn cmd_services_list(client: &ApiClient, search: Option<&str>) -> Result<()> {
    let api = ServicesApi::new(client.clone());
    let categories_api = CategoriesApi::new(client.clone());

    let mut services: ListState<Service> = ListState::default();
    services.load(api.list()).await;
    if let Some(error) = &services.fetch_error {
        println!("Failed to load services: {}", error);
        return Ok(());
    }

    // Category names are display-only; a failure here degrades to raw ids.
    let categories = categories_api.list().await.unwrap_or_default();

    let matches: Vec<&Service> = services
        .items
        .iter()
        .filter(|s| match search {
            Some(needle) => s.name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        })
        .collect();

    if matches.is_empty() {
        println!("No services found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6} {:<30} {:<16} {:<8} {}",
        "ID", "NAME", "CITY", "RATING", "CATEGORIES"
    );
    println!("{}", "-".repeat(90));
    for service in matches {
        println!(
            "{:<6} {:<30} {:<16} {:<8} {}",
            service.id,
            service.name,
            service.city.as_deref().unwrap_or("-"),
            service
                .rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string()),
            categories::category_names(&service.category_refs(), &categories),
        );
    }
    println!();
    Ok(())
}

async fn cmd_services_show(client: &ApiClient, id: i64) -> Result<()> {
    let api = ServicesApi::new(client.clone());
    let mut service: RecordState<Service> = RecordState::default();
    service.load(api.get(id)).await;
    if let Some(error) = &service.fetch_error {
        println!("Failed to load service: {}", error);
        return Ok(());
    }
    let Some(service) = &service.record else {
        println!("No service with id {}.", id);
        return Ok(());
    };

    println!("Name:        {}", service.name);
    if let Some(city) = &service.city {
        println!("City:        {}", city);
    }
    if let Some(address) = &service.address {
        println!("Address:     {}", address);
    }
    if let Some(website) = &service.website {
        println!("Website:     {}", website);
    }
    if let Some(rating) = service.rating {
        println!("Rating:      {:.1}", rating);
    }
    if let Some(description) = service
        .description
        .as_deref()
        .or(service.short_description.as_deref())
    {
        println!("Description: {}", description);
    }
    Ok(())
}

async fn cmd_services_add(client: &ApiClient, request: &CreateServiceRequest) -> Result<()> {
    let api = ServicesApi::new(client.clone());
    let service = api.create(request).await?;
    println!("Added service {} ({}).", service.name, service.id);
    Ok(())
}

async fn cmd_services_update(
    client: &ApiClient,
    id: i64,
    request: &UpdateServiceRequest,
) -> Result<()> {
    let api = ServicesApi::new(client.clone());
    let service = api.update(id, request).await?;
    println!("Updated service {} ({}).", service.name, service.id);
    Ok(())
}

async fn cmd_services_delete(client: &ApiClient, id: i64) -> Result<()> {
    let api = ServicesApi::new(client.clone());

    // Mirror the dashboard table: keep the loaded list and drop the row
    // locally after the delete instead of refetching.
    let mut services: ListState<Service> = ListState::default();
    services.load(api.list()).await;

    api.delete(id).await?;
    let removed = services.remove_where(|s| s.id == id);
    if removed > 0 {
        println!(
            "Deleted service {}. {} services remain.",
            id,
            services.items.len()
        );
    } else {
        println!("Deleted service {}.", id);
    }
    Ok(())
}

async fn cmd_categories_list(client: &ApiClient) -> Result<()> {
    let api = CategoriesApi::new(client.clone());
    let mut categories = ListState::default();
    categories.load(api.list()).await;
    if let Some(error) = &categories.fetch_error {
        println!("Failed to load categories: {}", error);
        return Ok(());
    }
    if categories.items.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    println!();
    println!("{:<6} {:<30} {}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for category in &categories.items {
        println!(
            "{:<6} {:<30} {}",
            category.id,
            category.name,
            category.description.as_deref().unwrap_or("-"),
        );
    }
    println!();
    Ok(())
}

async fn cmd_categories_add(client: &ApiClient, request: &CreateCategoryRequest) -> Result<()> {
    let api = CategoriesApi::new(client.clone());
    let category = api.create(request).await?;
    println!("Added category {} ({}).", category.name, category.id);
    Ok(())
}

async fn cmd_categories_update(
    client: &ApiClient,
    id: i64,
    request: &UpdateCategoryRequest,
) -> Result<()> {
    let api = CategoriesApi::new(client.clone());
    let category = api.update(id, request).await?;
    println!("Updated category {} ({}).", category.name, category.id);
    Ok(())
}

async fn cmd_categories_delete(client: &ApiClient, id: i64) -> Result<()> {
    let api = CategoriesApi::new(client.clone());
    api.delete(id).await?;
    println!("Deleted category {}.", id);
    Ok(())
}

async fn cmd_events_list(client: &ApiClient) -> Result<()> {
    let api = EventsApi::new(client.clone());
    let mut events = ListState::default();
    events.load(api.list()).await;
    if let Some(error) = &events.fetch_error {
        println!("Failed to load events: {}", error);
        return Ok(());
    }
    if events.items.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6} {:<34} {:<22} {:<18} {}",
        "ID", "NAME", "STARTS", "LOCATION", "ACTIVE"
    );
    println!("{}", "-".repeat(96));
    for event in &events.items {
        let starts = event
            .start_time
            .as_deref()
            .or(event.event_date_time.as_deref())
            .or(event.date.as_deref())
            .unwrap_or("-");
        println!(
            "{:<6} {:<34} {:<22} {:<18} {}",
            event.id,
            event.name,
            starts,
            event.location.as_deref().unwrap_or("-"),
            if event.is_active.unwrap_or(true) {
                "yes"
            } else {
                "no"
            },
        );
    }
    println!();
    Ok(())
}

async fn cmd_events_add(client: &ApiClient, command: &EventsCommands) -> Result<()> {
    let EventsCommands::Add {
        name,
        short_description,
        description,
        location,
        event_for,
        start_time,
        end_time,
        json,
    } = command
    else {
        unreachable!("dispatched only for Add");
    };

    let api = EventsApi::new(client.clone());
    let event = if let Some(json) = json {
        let payload: serde_json::Value = serde_json::from_str(json)?;
        api.create_from_payload(&payload).await?
    } else {
        let request = CreateEventRequest {
            name: name.clone().unwrap_or_default(),
            short_description: short_description.clone(),
            description: description.clone(),
            location: location.clone(),
            event_for: event_for.clone(),
            start_time: start_time.as_deref().and_then(events::to_rfc3339_utc),
            end_time: end_time.as_deref().and_then(events::to_rfc3339_utc),
            ..Default::default()
        };
        api.create(&request).await?
    };
    println!("Added event {} ({}).", event.name, event.id);
    Ok(())
}

async fn cmd_events_delete(client: &ApiClient, id: i64) -> Result<()> {
    let api = EventsApi::new(client.clone());
    api.delete(id).await?;
    println!("Deleted event {}.", id);
    Ok(())
}

async fn cmd_users_list(client: &ApiClient) -> Result<()> {
    let api = UsersApi::new(client.clone());
    let mut users = ListState::default();
    users.load(api.list()).await;
    if let Some(error) = &users.fetch_error {
        println!("Failed to load users: {}", error);
        return Ok(());
    }
    if users.items.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6} {:<24} {:<30} {:<8} {}",
        "ID", "NAME", "EMAIL", "ACTIVE", "LOCATION"
    );
    println!("{}", "-".repeat(90));
    for user in &users.items {
        println!(
            "{:<6} {:<24} {:<30} {:<8} {}",
            user.id,
            user.name,
            user.email.as_deref().unwrap_or("-"),
            user.is_active
                .map(|a| if a { "yes" } else { "no" })
                .unwrap_or("-"),
            user.profile
                .as_ref()
                .and_then(|p| p.location.as_deref())
                .unwrap_or("-"),
        );
    }
    println!();
    Ok(())
}

async fn cmd_analytics(client: &ApiClient) -> Result<()> {
    let api = AnalyticsApi::new(client.clone());
    let mut summary = ListState::default();
    summary.load(api.service_click_summary()).await;
    if let Some(error) = &summary.fetch_error {
        println!("Failed to load click summary: {}", error);
        return Ok(());
    }
    if summary.items.is_empty() {
        println!("No click data recorded.");
        return Ok(());
    }

    println!();
    println!(
        "{:<40} {:>16} {:>16}",
        "SERVICE", "ADVANTAGE", "WEBSITE VISITS"
    );
    println!("{}", "-".repeat(74));
    for row in &summary.items {
        println!(
            "{:<40} {:>16} {:>16}",
            row.service_name, row.advantage_clicks, row.website_visit_clicks,
        );
    }
    println!();
    Ok(())
}
