use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stytch_sdk::passwords::StrengthCheckRequest;
use stytch_sdk::{ClientConfig, ErrorKind, StytchClient};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stytch_sdk=info,stytch_check=info".into());

    let console_layer = fmt::layer().with_target(false).with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let password = std::env::args()
        .nth(1)
        .context("usage: stytch-check <password> [email]")?;
    let email = std::env::args().nth(2);

    let config = ClientConfig::from_env()?;
    let client = StytchClient::new(config)?;
    info!("Using {}", client.fetch_config().base_url);

    let check = match client
        .passwords
        .strength_check(&StrengthCheckRequest { email, password })
        .await
    {
        Ok(check) => check,
        Err(e) if e.kind() == ErrorKind::Api => {
            warn!("Stytch rejected the check: {}", e);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        request_id = %check.request_id,
        score = check.score,
        breached = check.breached_password,
        "Strength check complete"
    );
    println!(
        "valid_password={} score={}",
        check.valid_password, check.score
    );
    if !check.feedback.warning.is_empty() {
        println!("warning: {}", check.feedback.warning);
    }
    for suggestion in &check.feedback.suggestions {
        println!("suggestion: {}", suggestion);
    }

    Ok(())
}
