// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hercules command-line client
//!
//! Logs meals, weight and coaching from the terminal against the Hercules
//! API. The session is kept in a file between runs.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hercules_client::{
    config::Config,
    models::{BillingSelection, NewMeal, PaymentMethod, Role, WeightEntry},
    services::{
        access::{navigation, resolve, AccessDecision, View},
        auth::{LoginForm, SignupForm},
        workouts::{Catalog, SessionDraft, WorkoutLog},
        AuthorizedClient, CoachAssignmentWorkflow, CoachState, DaySummary, HistoryRange, MealDraft,
        WeightLog,
    },
    time_utils::{format_api_date, parse_api_date, today},
    AppContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hercules", version, about = "Hercules nutrition and training client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Override the API base URL
    #[arg(long, global = true, env = "HERCULES_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HERCULES_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup(SignupArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show what the current user gets when opening a route
    Access {
        /// Route path, e.g. /dashboard/admin
        path: String,
    },
    /// Day summary: meals, totals and remaining calories
    Meals {
        #[arg(long)]
        date: Option<String>,
    },
    #[command(subcommand)]
    Meal(MealCommand),
    #[command(subcommand)]
    Food(FoodCommand),
    #[command(subcommand)]
    Weight(WeightCommand),
    #[command(subcommand)]
    Coach(CoachCommand),
    #[command(subcommand)]
    Admin(AdminCommand),
    #[command(subcommand)]
    Billing(BillingCommand),
    #[command(subcommand)]
    Workouts(WorkoutsCommand),
}

#[derive(Args)]
struct SignupArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "HERCULES_PASSWORD", hide_env_values = true)]
    password: String,
    /// Repeat the password
    #[arg(long)]
    confirm: Option<String>,
    #[arg(long)]
    name: Option<String>,
    /// card, vipps or paypal
    #[arg(long)]
    payment_method: Option<PaymentMethod>,
    /// Token from the payment provider (required for card)
    #[arg(long)]
    payment_token: Option<String>,
}

#[derive(Subcommand)]
enum MealCommand {
    /// Log a meal made of products (`ID:GRAMS`) and recipes (`ID:PORTIONS`)
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "product", value_name = "ID:GRAMS")]
        products: Vec<String>,
        #[arg(long = "recipe", value_name = "ID:PORTIONS")]
        recipes: Vec<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum FoodCommand {
    Search { query: Option<String> },
    Barcode { barcode: String },
}

#[derive(Subcommand)]
enum WeightCommand {
    Get {
        #[arg(long)]
        date: Option<String>,
    },
    /// Save the weight for a day (overwrites)
    Set {
        weight: String,
        #[arg(long)]
        date: Option<String>,
    },
    History {
        /// 30d, 90d or 1y
        #[arg(long, default_value = "30d")]
        range: HistoryRange,
    },
}

#[derive(Subcommand)]
enum CoachCommand {
    Status,
    List,
    Show { id: String },
    Assign {
        id: String,
        #[arg(long)]
        weeks: u32,
    },
    End,
    /// Ask to become a coach
    Apply,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Pending coach applications
    Requests,
    Approve { user_id: String },
    SetRole { user_id: String, role: String },
}

#[derive(Subcommand)]
enum BillingCommand {
    Quote {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum WorkoutsCommand {
    Programs,
    /// Log a session to the local workout log
    Log {
        /// Program to follow; omit for a free session
        #[arg(long)]
        program: Option<String>,
        /// Day number for multi-day programs, starting at 1
        #[arg(long, requires = "program")]
        day: Option<usize>,
        /// Exercise id for a free session
        #[arg(long = "exercise", conflicts_with = "program")]
        exercises: Vec<String>,
        /// Reps per set for each exercise in order, e.g. 8,8,6
        #[arg(long = "reps")]
        reps: Vec<String>,
    },
    /// Show logged sessions, newest first
    History,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json)?;

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim().trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.api_url, "Starting Hercules client");

    let mut app = AppContext::new(config)?;

    if let Err(e) = run(&mut app, cli.command).await {
        let message = match e.downcast_ref::<hercules_client::error::ClientError>() {
            Some(client_err) => client_err.user_message(),
            None => format!("{:#}", e),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(app: &mut AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = app
                .session
                .login(&app.client, &LoginForm::new(&email, &password))
                .await?;
            println!("Logged in as {} ({})", user.email, user.role);
        }
        Command::Signup(args) => {
            app.restore_session().await?;
            let mut form = SignupForm::new(&args.email, &args.password);
            if let Some(confirm) = &args.confirm {
                form = form.with_confirmation(confirm);
            }
            if let Some(name) = &args.name {
                form = form.with_display_name(name);
            }
            if let Some(method) = args.payment_method {
                form = form.with_billing(BillingSelection {
                    payment_method: method,
                    payment_method_token: args.payment_token.clone(),
                });
                let quote = app.config.price_plan()?.quote(today());
                println!("First payment after the trial: {} kr", quote.first_payment);
            }
            let user = app.session.signup(&app.client, &form).await?;
            println!("Welcome, {}", user.email);
        }
        Command::Logout => {
            app.session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            app.restore_session().await?;
            match app.session.user() {
                Some(user) => {
                    println!("{} <{}> role={}", user.display_name, user.email, user.role);
                    if let Some(profile) = app.session.profile() {
                        if profile.coach_requested && !profile.coach_approved {
                            println!("Coach application pending");
                        }
                    }
                    for entry in navigation(Some(user.role)) {
                        println!("  {:<10} {}", entry.label, entry.path);
                    }
                }
                None => println!("Not logged in"),
            }
        }
        Command::Access { path } => {
            app.restore_session().await?;
            let Some(view) = View::from_path(&path) else {
                bail!("No such page: {}", path);
            };
            match resolve(app.session.role(), view) {
                AccessDecision::RenderView(view) => println!("render {}", view.path()),
                AccessDecision::RedirectToLogin => println!("redirect {}", View::Login.path()),
                AccessDecision::RedirectToDefault(view) => println!("redirect {}", view.path()),
            }
        }
        Command::Meals { date } => {
            let date = date_or_today(date.as_deref())?;
            let api = signed_in(app).await?;
            let meals = app.client.meals(api.access_token(), date).await?;
            let summary = DaySummary::compute(&meals, app.config.calorie_goal as f64, 0.0);

            println!("{}", format_api_date(date));
            for meal in &meals {
                let totals = meal.totals.rounded();
                println!(
                    "  [{}] {:<24} {:>6} kcal",
                    meal.id,
                    meal.name.as_deref().unwrap_or("Meal"),
                    totals.kcal
                );
            }
            let t = summary.totals.rounded();
            println!(
                "Total {} kcal, protein {} g, carbs {} g, fat {} g",
                t.kcal, t.protein, t.carbs, t.fat
            );
            println!(
                "Goal {} kcal, remaining {} kcal",
                summary.goal_kcal,
                summary.remaining_kcal.round()
            );
        }
        Command::Meal(MealCommand::Add {
            date,
            name,
            products,
            recipes,
        }) => {
            let date = date_or_today(date.as_deref())?;
            let api = signed_in(app).await?;
            let token = api.access_token();

            let mut draft = MealDraft::new();
            if !products.is_empty() {
                let catalog = app.client.food_products(token, None).await?;
                for spec in &products {
                    let (id, grams) = split_amount(spec)?;
                    let product = catalog
                        .iter()
                        .find(|p| p.id == id)
                        .with_context(|| format!("Unknown product {}", id))?;
                    draft.add_product(product.clone(), grams);
                }
            }
            if !recipes.is_empty() {
                let all = app.client.recipes(token).await?;
                for spec in &recipes {
                    let (id, portions) = split_amount(spec)?;
                    let recipe = all
                        .iter()
                        .find(|r| r.id == id)
                        .with_context(|| format!("Unknown recipe {}", id))?;
                    draft.add_recipe(recipe.clone(), portions);
                }
            }

            let preview = draft.totals().rounded();
            let meal = NewMeal {
                log_date: date,
                name,
                time_slot: None,
                entries: draft.entries(),
            }
            .normalized();
            app.client.create_meal(token, &meal).await?;
            println!("Saved meal ({} kcal)", preview.kcal);
        }
        Command::Meal(MealCommand::Delete { id }) => {
            let api = signed_in(app).await?;
            app.client.delete_meal(api.access_token(), &id).await?;
            println!("Deleted meal {}", id);
        }
        Command::Food(cmd) => {
            let api = signed_in(app).await?;
            let token = api.access_token();
            let products = match cmd {
                FoodCommand::Search { query } => {
                    app.client.food_products(token, query.as_deref()).await?
                }
                FoodCommand::Barcode { barcode } => {
                    match app.client.product_by_barcode(token, &barcode).await? {
                        Some(product) => vec![product],
                        None => {
                            println!("No product with barcode {}", barcode);
                            Vec::new()
                        }
                    }
                }
            };
            for p in products {
                println!(
                    "[{}] {} {} | per 100 g: {} kcal, P {} C {} F {}",
                    p.id,
                    p.name,
                    p.brand.as_deref().unwrap_or(""),
                    p.kcal_per_100,
                    p.protein_per_100,
                    p.carbs_per_100,
                    p.fat_per_100
                );
            }
        }
        Command::Weight(cmd) => {
            let api = signed_in(app).await?;
            let token = api.access_token();
            match cmd {
                WeightCommand::Get { date } => {
                    let date = date_or_today(date.as_deref())?;
                    match app.client.weight(token, date).await? {
                        Some(kg) => println!("{}: {} kg", format_api_date(date), kg),
                        None => println!("{}: no weight logged", format_api_date(date)),
                    }
                }
                WeightCommand::Set { weight, date } => {
                    let entry = WeightEntry {
                        date: date_or_today(date.as_deref())?,
                        weight_kg: hercules_client::services::parse_weight(&weight)?,
                    };
                    app.client.save_weight(token, &entry).await?;
                    println!("Saved {} kg for {}", entry.weight_kg, format_api_date(entry.date));
                }
                WeightCommand::History { range } => {
                    let (from, to) = range.bounds(today());
                    let log: WeightLog = app
                        .client
                        .weight_history(token, from, to)
                        .await?
                        .into_iter()
                        .collect();
                    for entry in log.range(from, to) {
                        println!("{}  {:.1} kg", format_api_date(entry.date), entry.weight_kg);
                    }
                    if let Some(change) = log.change(from, to) {
                        println!("Change: {:+.1} kg", change);
                    }
                }
            }
        }
        Command::Coach(cmd) => {
            let api = signed_in(app).await?;
            run_coach(CoachAssignmentWorkflow::new(api), cmd).await?;
        }
        Command::Admin(cmd) => {
            let api = signed_in(app).await?;
            let token = api.access_token();
            match cmd {
                AdminCommand::Requests => {
                    for req in app.client.coach_requests(token).await? {
                        println!(
                            "[{}] {} {}",
                            req.id,
                            req.email,
                            req.name.as_deref().unwrap_or("")
                        );
                    }
                }
                AdminCommand::Approve { user_id } => {
                    app.client.approve_coach_request(token, &user_id).await?;
                    println!("Approved {}", user_id);
                }
                AdminCommand::SetRole { user_id, role } => {
                    let role = Role::parse(&role)
                        .with_context(|| format!("Unknown role '{}'", role))?;
                    app.client.set_user_role(token, &user_id, role).await?;
                    println!("Set role of {} to {}", user_id, role);
                }
            }
        }
        Command::Billing(BillingCommand::Quote { date }) => {
            let date = date_or_today(date.as_deref())?;
            let quote = app.config.price_plan()?.quote(date);
            println!(
                "{} days left this month, current period {} kr{}",
                quote.days_left,
                quote.current_period_price,
                if quote.half_month_applied { " (half month)" } else { "" }
            );
            println!("Next month {} kr", quote.next_month_price);
            println!("First payment {} kr", quote.first_payment);
        }
        Command::Workouts(WorkoutsCommand::Programs) => {
            let catalog = Catalog::builtin();
            for program in catalog.programs() {
                println!("[{}] {} - {}", program.id, program.name, program.description);
                for pe in &program.exercises {
                    print_prescription(&catalog, pe);
                }
                for day in &program.days {
                    println!("  {}", day.label);
                    for pe in &day.exercises {
                        print_prescription(&catalog, pe);
                    }
                }
            }
        }
        Command::Workouts(WorkoutsCommand::Log {
            program,
            day,
            exercises,
            reps,
        }) => {
            let catalog = Catalog::builtin();
            let started_at = chrono::Local::now().naive_local();
            let mut draft = match (program.as_deref(), day) {
                (Some(id), Some(day)) => {
                    let index = day.checked_sub(1).context("Days start at 1")?;
                    SessionDraft::program_day(&catalog, id, index, started_at)?
                }
                (Some(id), None) => SessionDraft::program(&catalog, id, started_at)?,
                (None, _) => {
                    let mut draft = SessionDraft::free(started_at);
                    for id in &exercises {
                        draft.add_exercise(&catalog, id)?;
                    }
                    draft
                }
            };

            let rows: Vec<String> = draft.exercises().iter().map(|e| e.id.clone()).collect();
            if reps.len() > rows.len() {
                bail!("Got reps for {} exercises, session has {}", reps.len(), rows.len());
            }
            for (row, spec) in rows.iter().zip(&reps) {
                let sets = parse_reps(spec)?;
                draft.set_set_count(row, sets.len())?;
                for (i, n) in sets.into_iter().enumerate() {
                    draft.log_set(row, i, n)?;
                }
            }

            let path = app.config.workout_log_path();
            let mut log = WorkoutLog::load(&path)?;
            let saved = log.save(draft)?;
            println!("Saved {} ({} reps)", saved.id, saved.total_reps());
            log.persist(&path)?;
        }
        Command::Workouts(WorkoutsCommand::History) => {
            let catalog = Catalog::builtin();
            let log = WorkoutLog::load(&app.config.workout_log_path())?;
            if log.sessions().is_empty() {
                println!("No workouts logged");
            }
            for session in log.sessions() {
                println!(
                    "{}  {}  {} reps",
                    session.id,
                    session.started_at.format("%Y-%m-%d %H:%M"),
                    session.total_reps()
                );
                for row in &session.exercises {
                    let sets: Vec<String> = row.sets.iter().map(|s| s.reps.to_string()).collect();
                    println!("  {:<28} {}", catalog.exercise_name(&row.exercise_id), sets.join(", "));
                }
            }
        }
    }
    Ok(())
}

async fn run_coach(
    mut workflow: CoachAssignmentWorkflow<AuthorizedClient>,
    cmd: CoachCommand,
) -> anyhow::Result<()> {
    if !matches!(cmd, CoachCommand::Apply) {
        workflow.refresh().await;
        if let Some(message) = workflow.error() {
            eprintln!("Warning: {}", message);
        }
    }

    match cmd {
        CoachCommand::Status => match workflow.state() {
            CoachState::Assigned(rel) => println!(
                "Coach: {} <{}> until {}",
                rel.coach_name,
                rel.coach_email,
                rel.end_date.map(format_api_date).unwrap_or_else(|| "-".into())
            ),
            CoachState::AccessEnded(rel) => {
                println!("Access to {} has ended", rel.coach_name)
            }
            _ => println!("No coach"),
        },
        CoachCommand::List => {
            let coaches = workflow.browse().await?;
            for coach in coaches {
                println!("[{}] {} - {}", coach.id, coach.name, coach.specialties);
            }
        }
        CoachCommand::Show { id } => {
            workflow.browse().await?;
            let coach = workflow.select_coach(&id).await?;
            println!("{} <{}>", coach.name, coach.email);
            if !coach.description.is_empty() {
                println!("{}", coach.description);
            }
            let weeks: Vec<String> = coach
                .offered_program_lengths()
                .iter()
                .map(|w| format!("{} weeks", w))
                .collect();
            println!("Programs: {}", weeks.join(", "));
        }
        CoachCommand::Assign { id, weeks } => {
            if let CoachState::Assigned(rel) = workflow.state() {
                bail!("You already have a coach: {}", rel.coach_name);
            }
            workflow.browse().await?;
            workflow.select_coach(&id).await?;
            if let Err(e) = workflow.assign(weeks).await {
                return Err(workflow_error(&workflow, e));
            }
            if let CoachState::Assigned(rel) = workflow.state() {
                println!("Assigned {} for {} weeks", rel.coach_name, weeks);
            }
        }
        CoachCommand::End => {
            if let Err(e) = workflow.end_access().await {
                return Err(workflow_error(&workflow, e));
            }
            println!("Coach access ended. Your logs are kept.");
        }
        CoachCommand::Apply => {
            let api = workflow.api();
            api.inner().request_coach_role(api.access_token()).await?;
            println!("Coach application sent");
        }
    }
    Ok(())
}

/// Prefer the workflow's inline message, which knows whether the write
/// itself went through.
fn workflow_error(
    workflow: &CoachAssignmentWorkflow<AuthorizedClient>,
    err: hercules_client::error::ClientError,
) -> anyhow::Error {
    match workflow.error() {
        Some(message) => anyhow::anyhow!("{}", message),
        None => err.into(),
    }
}

fn print_prescription(catalog: &Catalog, pe: &hercules_client::models::ProgramExercise) {
    println!(
        "    {} {} x {}",
        catalog.exercise_name(&pe.exercise_id),
        pe.sets,
        pe.suggested_reps.as_deref().unwrap_or("-")
    );
}

/// Restore the session and return a client bound to it.
async fn signed_in(app: &mut AppContext) -> anyhow::Result<AuthorizedClient> {
    app.restore_session().await?;
    Ok(app.session.authorized(&app.client)?)
}

fn date_or_today(input: Option<&str>) -> anyhow::Result<NaiveDate> {
    Ok(match input {
        Some(raw) => parse_api_date(raw)?,
        None => today(),
    })
}

/// Split `ID:AMOUNT`. The amount accepts a comma decimal.
fn split_amount(spec: &str) -> anyhow::Result<(&str, f64)> {
    let (id, amount) = spec
        .rsplit_once(':')
        .with_context(|| format!("Expected ID:AMOUNT, got '{}'", spec))?;
    let amount: f64 = amount
        .trim()
        .replace(',', ".")
        .parse()
        .with_context(|| format!("Invalid amount in '{}'", spec))?;
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be positive in '{}'", spec);
    }
    let id = id.trim();
    if id.is_empty() {
        bail!("Missing ID in '{}'", spec);
    }
    Ok((id, amount))
}

/// Parse comma-separated reps per set, e.g. `8,8,6`.
fn parse_reps(spec: &str) -> anyhow::Result<Vec<u32>> {
    spec.split(',')
        .map(|n| {
            n.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid reps '{}' in '{}'", n.trim(), spec))
        })
        .collect()
}

/// Initialize logging to stderr, as JSON when requested.
fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("hercules_client=debug".parse()?)
        .add_directive("info".parse()?);

    if json {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true);
        tracing_subscriber::registry().with(filter).with(format).init();
    } else {
        let format = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        tracing_subscriber::registry().with(filter).with(format).init();
    }
    Ok(())
}
