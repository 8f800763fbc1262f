//! Listing and configuration commands

use crate::commands::{CatalogArgs, ConfigArgs, JourneysArgs};
use crate::error::{CliError, CliResult};
use sauceprobe::{shared_selectors, BuiltinJourney, Catalog, Persona, PolicyTable, SuiteConfig};
use serde_json::json;

/// Render the journey list
///
/// # Errors
///
/// Returns error if the config file cannot be loaded
pub fn journeys(args: &JourneysArgs) -> CliResult<String> {
    let mut out = String::from("Built-in journeys:\n");
    for journey in BuiltinJourney::ALL {
        out.push_str(&format!("  {:<12} {}\n", journey.name(), journey.description()));
    }
    if let Some(path) = &args.config {
        let suite = SuiteConfig::load(path)?;
        if !suite.journeys.is_empty() {
            out.push_str(&format!("\nFrom {}:\n", path.display()));
            for (name, steps) in &suite.journeys {
                out.push_str(&format!("  {name:<12} {} steps\n", steps.len()));
            }
        }
    }
    Ok(out)
}

/// Render the persona table
#[must_use]
pub fn personas() -> String {
    let table = PolicyTable::default();
    let mut out = format!(
        "{:<25} {:<12} {:<10} {:<12} {}\n",
        "PERSONA", "LOGIN", "ITEMS", "CART", "CHECKOUT"
    );
    for persona in Persona::KNOWN {
        // Known personas always have a policy
        let Ok(policy) = table.policy_for(&persona) else {
            continue;
        };
        out.push_str(&format!(
            "{:<25} {:<12} {:<10} {:<12} {}\n",
            persona.username(),
            format!("{:?}", policy.login),
            format!("{:?}", policy.quota),
            policy.cart.to_string(),
            format!("{:?}", policy.checkout),
        ));
    }
    out
}

/// Render the locator catalog
///
/// # Errors
///
/// Returns error for an unknown page name
pub fn catalog(args: &CatalogArgs) -> CliResult<String> {
    let catalog = Catalog::saucedemo();
    let pages: Vec<_> = catalog
        .pages()
        .into_iter()
        .filter(|p| args.page.as_deref().map_or(true, |name| p.page_name() == name))
        .collect();
    if pages.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "unknown page '{}'",
            args.page.as_deref().unwrap_or_default()
        )));
    }

    if args.json {
        let value: Vec<_> = pages
            .iter()
            .map(|page| {
                let locators: Vec<_> = page
                    .locators()
                    .into_iter()
                    .map(|loc| {
                        json!({
                            "name": loc.name(),
                            "kind": loc.selector().kind(),
                            "selector": loc.selector().expr(),
                        })
                    })
                    .collect();
                json!({
                    "page": page.page_name(),
                    "url": page.url_pattern(),
                    "locators": locators,
                })
            })
            .collect();
        return serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::report_generation(e.to_string()));
    }

    let mut out = String::new();
    for page in &pages {
        out.push_str(&format!("{} ({})\n", page.page_name(), display_url(page.url_pattern())));
        for loc in page.locators() {
            out.push_str(&format!(
                "  {:<22} {:<6} {}\n",
                loc.name(),
                loc.selector().kind(),
                loc.selector().expr()
            ));
        }
    }
    if args.page.is_none() {
        let shared = shared_selectors(&catalog);
        if !shared.is_empty() {
            out.push_str("\nShared across pages:\n");
            for selector in shared {
                out.push_str(&format!("  {selector}\n"));
            }
        }
    }
    Ok(out)
}

fn display_url(pattern: &str) -> &str {
    if pattern.is_empty() {
        "/"
    } else {
        pattern
    }
}

/// Print the default config, or validate a file
///
/// # Errors
///
/// Returns error if the file is missing or invalid
pub fn config(args: &ConfigArgs) -> CliResult<String> {
    match &args.check {
        Some(path) => {
            let suite = SuiteConfig::load(path)
                .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?;
            Ok(format!(
                "{} is valid ({} custom journeys)\n",
                path.display(),
                suite.journeys.len()
            ))
        }
        None => Ok(SuiteConfig::default().to_yaml()?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_journeys_lists_builtins() {
        let out = journeys(&JourneysArgs { config: None }).unwrap();
        for journey in BuiltinJourney::ALL {
            assert!(out.contains(journey.name()));
        }
    }

    #[test]
    fn test_journeys_includes_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        let suite = SuiteConfig::default().with_journey(
            "smoke",
            vec!["the user opens the storefront".to_string()],
        );
        std::fs::write(&path, suite.to_yaml().unwrap()).unwrap();
        let out = journeys(&JourneysArgs { config: Some(path) }).unwrap();
        assert!(out.contains("smoke"));
        assert!(out.contains("1 steps"));
    }

    #[test]
    fn test_personas_table() {
        let out = personas();
        assert_eq!(out.lines().count(), 5);
        assert!(out.contains("locked_out_user"));
        assert!(out.contains("at least 1"));
    }

    #[test]
    fn test_catalog_single_page() {
        let out = catalog(&CatalogArgs {
            page: Some("cart".to_string()),
            json: false,
        })
        .unwrap();
        assert!(out.starts_with("cart ("));
        assert!(!out.contains("Shared across pages"));
    }

    #[test]
    fn test_catalog_json() {
        let out = catalog(&CatalogArgs {
            page: None,
            json: true,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 5);
        assert_eq!(value[0]["page"], "login");
    }

    #[test]
    fn test_catalog_unknown_page() {
        let err = catalog(&CatalogArgs {
            page: Some("wishlist".to_string()),
            json: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("wishlist"));
    }

    #[test]
    fn test_config_default_roundtrips() {
        let yaml = config(&ConfigArgs { check: None }).unwrap();
        let suite = SuiteConfig::from_yaml(&yaml).unwrap();
        assert_eq!(suite, SuiteConfig::default());
    }

    #[test]
    fn test_config_check_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "base_url: file:///tmp\n").unwrap();
        let err = config(&ConfigArgs { check: Some(path) }).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }
}
