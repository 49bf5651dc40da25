use rseedream::{images, logger, SeedreamClient, SeedreamConfig, SubmitTarget};
use std::env;

/// Fills the form from `SEEDREAM_*` variables. Images are a comma separated
/// list of URLs, data URIs or local file paths.
fn fill_form_from_env(client: &mut SeedreamClient) -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(profile) = env::var("SEEDREAM_PROFILE") {
        client.use_profile(&profile)?;
    }

    let form = client.form_mut();
    form.set_prompt(env::var("SEEDREAM_PROMPT").unwrap_or_default());

    if let Ok(list) = env::var("SEEDREAM_IMAGES") {
        for reference in list.split(',').filter(|r| !r.trim().is_empty()) {
            form.add_image(images::resolve_reference(reference)?);
        }
    }

    if let Ok(orientation) = env::var("SEEDREAM_ORIENTATION") {
        form.set_orientation(orientation.parse()?);
    }
    if let Ok(long_side) = env::var("SEEDREAM_LONG_SIDE") {
        form.set_long_side(long_side);
    }
    if let Ok(ratio) = env::var("SEEDREAM_RATIO") {
        let size = form.select_ratio(&ratio)?;
        log::info!("📐 Ratio {} -> {}", ratio, size);
    } else if let Ok(size) = env::var("SEEDREAM_SIZE") {
        form.set_size(size);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = SeedreamConfig::from_env();
    logger::log_config_info(&config);

    let target: SubmitTarget = env::var("SEEDREAM_TARGET")
        .unwrap_or_else(|_| "v4".to_string())
        .parse()?;

    let mut client = SeedreamClient::new(config)?;
    fill_form_from_env(&mut client)?;
    log::debug!("Form: {:?}", client.form());

    let report = {
        let _timer = logger::timer(&format!("submit {}", target));
        client.submit(target).await
    };

    for (variant, outcome) in &report.outcomes {
        if outcome.is_success() {
            log::info!("✅ {} finished", variant.display_name());
        } else {
            log::error!("❌ {} failed", variant.display_name());
        }
    }

    if let Some(error) = client.error() {
        log::error!("❌ {}", error);
    }

    if client.gallery().is_empty() {
        log::warn!("No images generated");
    } else {
        log::info!("🖼️  Gallery (newest first):");
        for item in client.gallery() {
            println!("{}\t{}", item.tag.label(), item.url);
        }
    }

    if let Some(raw) = client.raw_response() {
        log::debug!("Raw response: {}", serde_json::to_string_pretty(raw)?);
    }

    if report.aggregate.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
