use clap::Parser;
use quote_builder::domain::model::{ControlKind, HiddenField};
use quote_builder::utils::error::ErrorCategory;
use quote_builder::utils::{logger, validation::Validate};
use quote_builder::{CliConfig, HeadlessPage, QuoteFormBinder, SiteConfig, SubmitOutcome};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting quote-builder");
    if config.verbose {
        tracing::debug!("Site file: {}", config.site.display());
    }

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 載入並驗證站點設定
    let site = match SiteConfig::from_file(&config.site).and_then(|site| {
        site.validate()?;
        Ok(site)
    }) {
        Ok(site) => site,
        Err(e) => {
            tracing::error!("❌ Site configuration failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(match e.category() {
                ErrorCategory::Configuration => 3,
                _ => 1,
            });
        }
    };

    let catalog = site.build_catalog()?;
    let store = site.build_store(&catalog);
    let page = if config.block_popups {
        HeadlessPage::new().blocking_popups()
    } else {
        HeadlessPage::new()
    };

    let mut binder = QuoteFormBinder::new(store, catalog, page, site.binder_settings())
        .with_validator(site.validator());
    binder.bind_all(ControlKind::Button);
    let mut binder = binder.with_pricing(site.build_pricing());

    for freq in &config.frequencies {
        match freq.resolve(binder.catalog()) {
            Some(key) => {
                if binder.on_frequency_change(&key, freq.frequency).is_none() {
                    tracing::warn!("{} has no {} price", freq.id, freq.frequency);
                }
            }
            None => tracing::warn!("No program package named {}", freq.id),
        }
    }

    for select in &config.selects {
        match select.resolve(binder.catalog()) {
            Some(key) => {
                binder.on_click(&key);
            }
            None => tracing::warn!("No catalog item matches {}:{}", select.group, select.id),
        }
    }

    let typed = config.form_values(site.form.collects_email);
    let values = binder.view().form_values(&typed);
    let selections = binder.view().hidden_field(HiddenField::Selections).to_string();

    let handoff = site.handoff()?;
    // The binder owns the view, so navigation is recorded on a copy of the page.
    let mut navigator = binder.view().clone();
    let outcome = binder.on_submit(&values, handoff.as_ref(), &mut navigator);

    if config.json {
        let document = serde_json::json!({
            "site": site.site.name,
            "selections": selections,
            "page": binder.view(),
            "navigation": {
                "opened": navigator.opened(),
                "navigated": navigator.navigated(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    match outcome {
        SubmitOutcome::Rejected { field, message } => {
            tracing::info!("Form rejected at {}", field);
            eprintln!("❌ {}", message);
            std::process::exit(2);
        }
        SubmitOutcome::HandoffFailed { message } => {
            eprintln!("❌ {}", message);
            std::process::exit(1);
        }
        SubmitOutcome::HandedOff(handoff) => {
            if !config.json {
                println!("✅ Selected items: {}", selections);
                match handoff.url() {
                    Some(url) => println!("📨 {}", url),
                    None => println!("📨 Native form post"),
                }
            }
        }
    }

    Ok(())
}
