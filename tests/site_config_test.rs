use quote_builder::config::cli::{FrequencyArg, SelectArg};
use quote_builder::domain::model::{ControlKind, Frequency, HandoffOutcome, HiddenField};
use quote_builder::utils::validation::Validate;
use quote_builder::{FormValues, HeadlessPage, ItemGroup, QuoteFormBinder, SiteConfig, SubmitOutcome};
use std::io::Write;
use tempfile::NamedTempFile;

fn example_site() -> SiteConfig {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/sites/prairie-lawn.toml");
    SiteConfig::from_file(path).unwrap()
}

fn binder_for(site: &SiteConfig) -> QuoteFormBinder<HeadlessPage> {
    let catalog = site.build_catalog().unwrap();
    let store = site.build_store(&catalog);
    let mut binder = QuoteFormBinder::new(store, catalog, HeadlessPage::new(), site.binder_settings())
        .with_validator(site.validator());
    binder.bind_all(ControlKind::Button);
    binder.with_pricing(site.build_pricing())
}

#[test]
fn example_site_is_valid() {
    let site = example_site();
    assert!(site.validate().is_ok());
    assert_eq!(site.build_catalog().unwrap().len(), 8);
}

#[test]
fn example_site_end_to_end() {
    let site = example_site();
    let mut binder = binder_for(&site);

    for arg in ["package:basic", "option:edging", "program-package:season-standard"] {
        let select: SelectArg = arg.parse().unwrap();
        let key = select.resolve(binder.catalog()).unwrap();
        binder.on_click(&key);
    }

    let freq: FrequencyArg = "season-standard=weekly".parse().unwrap();
    let key = freq.resolve(binder.catalog()).unwrap();
    assert_eq!(binder.view().price(&key), Some("$139"));
    binder.on_frequency_change(&key, freq.frequency);
    assert_eq!(binder.view().price(&key), Some("$107"));

    let joined = binder.view().hidden_field(HiddenField::Selections).to_string();
    assert_eq!(
        joined,
        "Basic Cut (Lawn Mowing), Edging & trimming, Season Program: Standard (Lawn Care Program)"
    );
    // Two services selected: selector keeps the first one it was set to.
    assert_eq!(binder.view().service(), "Lawn Mowing");

    let typed = FormValues {
        name: "Jane".to_string(),
        phone: "(306) 555-0100".to_string(),
        email: Some(String::new()),
        address: "123 Main St".to_string(),
        ..FormValues::default()
    };
    let values = binder.view().form_values(&typed);
    let handoff = site.handoff().unwrap();
    let mut navigator = HeadlessPage::new();
    let outcome = binder.on_submit(&values, handoff.as_ref(), &mut navigator);

    match outcome {
        SubmitOutcome::HandedOff(HandoffOutcome::OpenedNewContext { url }) => {
            assert!(url.starts_with("https://tally.so/r/w2xMe1?"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn mailto_site_hands_off_through_navigation() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[site]
name = "Snow Pros"

[form]
handoff = "mailto"
mailto_address = "quotes@snowpros.example"
mailto_subject = "Snow quote"
collects_email = false

[[packages]]
id = "plow"
label = "Driveway Plow"
service = "Snow Removal"
"#,
    )
    .unwrap();

    let site = SiteConfig::from_file(file.path()).unwrap();
    site.validate().unwrap();
    let mut binder = binder_for(&site);
    let key = site
        .build_catalog()
        .unwrap()
        .find(ItemGroup::Package, None, "plow")
        .unwrap()
        .key();
    binder.on_click(&key);

    let typed = FormValues {
        name: "Sam".to_string(),
        phone: "3065550100".to_string(),
        address: "Box 12, RR 1".to_string(),
        ..FormValues::default()
    };
    let values = binder.view().form_values(&typed);
    let mut navigator = HeadlessPage::new();
    let handoff = site.handoff().unwrap();
    let outcome = binder.on_submit(&values, handoff.as_ref(), &mut navigator);

    assert!(outcome.prevents_default());
    let link = &navigator.navigated()[0];
    assert!(link.starts_with("mailto:quotes@snowpros.example?subject=Snow%20quote"));
    assert!(link.contains("Driveway%20Plow%20%28Snow%20Removal%29"));
}

#[test]
fn semicolon_sites_join_with_semicolons() {
    let site = SiteConfig::from_toml_str(
        r#"
[site]
name = "Yard Works"

[selection]
separator = "semicolon"
decorate_service = false

[[options]]
id = "edging"
label = "Edging"

[[options]]
id = "aeration"
"#,
    )
    .unwrap();
    let mut binder = binder_for(&site);
    for id in ["edging", "aeration"] {
        let key = binder.catalog().find(ItemGroup::AddOn, None, id).unwrap().key();
        binder.on_click(&key);
    }
    assert_eq!(binder.view().hidden_field(HiddenField::Selections), "Edging; aeration");
}

#[test]
fn program_default_frequency_falls_back_to_first_priced() {
    let site = SiteConfig::from_toml_str(
        r#"
[site]
name = "Yard Works"

[[programs]]
id = "season"
label = "Season"
default_frequency = "weekly"

[[programs.packages]]
id = "lite"
[programs.packages.prices]
every-10-days = 99
"#,
    )
    .unwrap();
    let catalog = site.build_catalog().unwrap();
    let item = catalog.find(ItemGroup::ProgramPackage, None, "season-lite").unwrap();
    assert_eq!(item.frequency, Some(Frequency::EveryTenDays));
    assert_eq!(item.label, "Season: lite");
    assert_eq!(item.service_tag, None);
}

#[test]
fn program_without_service_leaves_selector_alone() {
    let site = SiteConfig::from_toml_str(
        r#"
[site]
name = "Yard Works"
default_service = "Lawn Mowing"

[[programs]]
id = "season"
label = "Season"

[[programs.packages]]
id = "lite"
[programs.packages.prices]
biweekly = 99
"#,
    )
    .unwrap();
    site.validate().unwrap();
    let mut binder = binder_for(&site);
    let key = binder
        .catalog()
        .find(ItemGroup::ProgramPackage, None, "season-lite")
        .unwrap()
        .key();
    binder.on_click(&key);

    assert_eq!(binder.view().hidden_field(HiddenField::Selections), "Season: lite");
    assert_eq!(binder.view().service(), "Lawn Mowing");
}
