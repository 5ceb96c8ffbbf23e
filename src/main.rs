use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use time::OffsetDateTime;

use nutriscan::config::ClientConfig;
use nutriscan::history::relative_age;
use nutriscan::profile::{biometrics, BiometricProfile, Metric, ProfileForm, ScoringMode};
use nutriscan::results::ScanResult;
use nutriscan::scan::{ImageRef, ScanMode};
use nutriscan::{AppState, ClientError};

/// Nutrition label and food photo scanner
#[derive(Parser, Debug)]
#[command(name = "nutriscan", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token
    Login(CredentialArgs),
    /// Create an account and sign in
    Register(CredentialArgs),
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Compute BMI locally
    Bmi {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
    },
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Upload 1-3 photos for scoring
    Scan {
        #[arg(long, default_value = "enhanced")]
        mode: ScanMode,
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// List past scans, or show one
    History { id: Option<String> },
}

#[derive(clap::Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "NUTRISCAN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    /// Update fields, e.g. `glucose=92 diabetes=true scoringMode=per-100g`.
    /// An empty value clears a metric.
    Set {
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "nutriscan=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    // Works offline, without opening the store.
    if let Command::Bmi { weight, height } = cli.command {
        print_bmi(weight, height);
        return Ok(());
    }

    let state = AppState::init(ClientConfig::from_env()?).await?;
    let outcome = run(&state, cli.command).await;
    if let Err(e) = &outcome {
        if let Some(ClientError::AuthRejected) = e.downcast_ref::<ClientError>() {
            eprintln!("Session expired. Run `nutriscan login` again.");
        }
    }
    outcome
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => {
            let session = state.session.login(&args.email, &args.password).await?;
            println!("Signed in as {}", session.user_email.unwrap_or_default());
        }
        Command::Register(args) => {
            let session = state.session.register(&args.email, &args.password).await?;
            println!("Registered {}", session.user_email.unwrap_or_default());
        }
        Command::Logout => {
            state.session.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match state.session.session().user_email {
            Some(email) => println!("{}", email),
            None if state.session.current_token().is_some() => println!("signed in"),
            None => println!("not signed in"),
        },
        Command::Bmi { weight, height } => print_bmi(weight, height),
        Command::Profile(ProfileCommand::Show) => {
            let user = state.profiles().fetch().await?;
            print_profile(&user.biometrics, &user.derived());
        }
        Command::Profile(ProfileCommand::Set { fields }) => {
            let current = state.profiles().fetch().await?;
            let mut form = ProfileForm::from_profile(&current.biometrics);
            for field in &fields {
                apply_field(&mut form, field)?;
            }
            let profile = form.parse()?;
            let user = state.profiles().update(&profile).await?;
            print_profile(&user.biometrics, &user.derived());
        }
        Command::Scan { mode, files } => {
            let scanner = state.scanner();
            scanner.select_mode(mode)?;
            for file in &files {
                scanner.add_image(ImageRef::from_path(file).await?)?;
            }
            let result = scanner.submit().await?;
            print_result(&result);
        }
        Command::History { id: Some(id) } => {
            let result = state.history().get(&id).await?;
            print_result(&result);
        }
        Command::History { id: None } => {
            let now = OffsetDateTime::now_utc();
            let scans = state.history().list().await?;
            if scans.is_empty() {
                println!("No scans yet");
            }
            for scan in scans {
                println!(
                    "{:>8}  {:<10} {:<6} {:<24} {}",
                    scan.id,
                    relative_age(scan.created_at, now),
                    scan.scan_type.as_deref().unwrap_or("-"),
                    scan.food_name.as_deref().unwrap_or("-"),
                    scan.overall_score
                        .map(|s| format!("{:.0}/100", s))
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
    }
    Ok(())
}

fn apply_field(form: &mut ProfileForm, field: &str) -> anyhow::Result<()> {
    let (key, value) = field
        .split_once('=')
        .with_context(|| format!("expected key=value, got {:?}", field))?;
    let flag = || -> anyhow::Result<bool> {
        value
            .parse::<bool>()
            .with_context(|| format!("{} expects true or false", key))
    };
    match key {
        "diabetes" => form.diabetes = flag()?,
        "high_cholesterol" => form.high_cholesterol = flag()?,
        "high_blood_pressure" => form.high_blood_pressure = flag()?,
        "scoringMode" | "scoring_mode" => {
            form.scoring_mode = Some(match value {
                "portion-aware" => ScoringMode::PortionAware,
                "per-100g" => ScoringMode::Per100g,
                other => bail!("unknown scoring mode {:?}", other),
            })
        }
        _ => match Metric::from_key(key) {
            Some(metric) => form.set(metric, value),
            None => bail!("unknown profile field {:?}", key),
        },
    }
    Ok(())
}

fn print_bmi(weight: f64, height: f64) {
    let bmi = biometrics::compute_bmi(Some(weight), Some(height));
    match bmi {
        Some(value) => println!("BMI {:.1} ({:?})", value, biometrics::categorize_bmi(bmi)),
        None => println!("BMI unknown"),
    }
}

fn print_profile(profile: &BiometricProfile, derived: &biometrics::DerivedMetrics) {
    match derived.bmi {
        Some(bmi) => println!("BMI        {:.1} ({:?})", bmi, derived.bmi_category),
        None => println!("BMI        unknown"),
    }
    println!("Healthy    {}", if derived.is_healthy { "yes" } else { "no" });
    for metric in Metric::ALL {
        if let Some(value) = profile.get(metric) {
            println!("{:<14} {} {}", metric.key(), value, metric.unit());
        }
    }
    for assessment in biometrics::assess(profile) {
        println!("  {:<14} {}", assessment.metric.key(), assessment.tier.label());
    }
}

fn print_result(result: &ScanResult) {
    if let Some(name) = &result.food_name {
        println!("{}", name);
    }
    let tier = result.tier();
    println!(
        "Score {:.0}/100  {} ({})",
        result.health_score.overall_score,
        tier.label(),
        tier.color_hex()
    );
    for bar in result.breakdown_view() {
        println!("  {:<9} {:>5.0}  {}", bar.label, bar.score, bar.tier.label());
    }
    for warning in &result.health_score.warnings {
        println!("! {}", warning);
    }
    for rec in &result.health_score.recommendations {
        println!("- {}", rec);
    }
    if let Some(advice) = &result.ai_advice {
        if !advice.explanation.is_empty() {
            println!("\n{}", advice.explanation);
        }
        for alt in &advice.healthy_alternatives {
            println!("  try: {}", alt);
        }
    }
    if let Some(disclaimer) = &result.disclaimer {
        println!("\n{}", disclaimer);
    }
}
