//! Module and variant selection.

use kover_gradle::Variants;

use crate::error::EngineError;

/// Restrict `all` to the selected `module` and `variant`.
///
/// An empty `module` keeps every module; an empty `variant` keeps every
/// variant. Modules match exactly, variants case-insensitively; matched
/// variants keep their original casing.
///
/// # Errors
/// Returns [`EngineError::ModuleNotFound`] if `module` is set but unknown, and
/// [`EngineError::VariantNotFound`] if no module has `variant`.
pub fn filter_variants(module: &str, variant: &str, all: &Variants) -> Result<Variants, EngineError> {
    let selected: Variants = if module.is_empty() {
        all.clone()
    } else {
        let Some(variants) = all.get(module) else {
            return Err(EngineError::ModuleNotFound {
                module: module.to_owned(),
            });
        };
        Variants::from([(module.to_owned(), variants.clone())])
    };

    if variant.is_empty() {
        return Ok(selected);
    }

    let wanted = variant.to_lowercase();
    let filtered: Variants = selected
        .into_iter()
        .filter_map(|(m, variants)| {
            let kept: Vec<String> = variants
                .into_iter()
                .filter(|v| v.to_lowercase() == wanted)
                .collect();
            (!kept.is_empty()).then_some((m, kept))
        })
        .collect();

    if filtered.is_empty() {
        return Err(EngineError::VariantNotFound {
            variant: variant.to_owned(),
        });
    }
    Ok(filtered)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn variants(entries: &[(&str, &[&str])]) -> Variants {
        entries
            .iter()
            .map(|(m, vs)| {
                (
                    (*m).to_owned(),
                    vs.iter().map(|v| (*v).to_owned()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_selectors_keep_everything() {
        let all = variants(&[("app", &["Debug", "Release"]), ("lib", &["Debug"])]);
        assert_eq!(filter_variants("", "", &all).unwrap(), all);
    }

    #[test]
    fn variant_match_is_case_insensitive_and_keeps_casing() {
        let all = variants(&[("app", &["debug", "release"])]);
        let filtered = filter_variants("", "Debug", &all).unwrap();
        assert_eq!(filtered, variants(&[("app", &["debug"])]));
    }

    #[test]
    fn variant_filter_drops_modules_without_match() {
        let all = variants(&[("app", &["Debug", "Staging"]), ("lib", &["Debug"])]);
        let filtered = filter_variants("", "staging", &all).unwrap();
        assert_eq!(filtered, variants(&[("app", &["Staging"])]));
    }

    #[test]
    fn module_restricts_to_single_entry() {
        let all = variants(&[("app", &["Debug"]), ("lib", &["Debug", "Release"])]);
        let filtered = filter_variants("lib", "", &all).unwrap();
        assert_eq!(filtered, variants(&[("lib", &["Debug", "Release"])]));
    }

    #[test]
    fn module_and_variant_combine() {
        let all = variants(&[("app", &["Debug"]), ("lib", &["Debug", "Release"])]);
        let filtered = filter_variants("lib", "RELEASE", &all).unwrap();
        assert_eq!(filtered, variants(&[("lib", &["Release"])]));
    }

    #[test]
    fn unknown_module_errors() {
        let all = variants(&[("app", &["Debug"])]);
        let err = filter_variants("wear", "", &all).unwrap_err();
        assert!(matches!(err, EngineError::ModuleNotFound { ref module } if module == "wear"));
    }

    #[test]
    fn module_match_is_case_sensitive() {
        let all = variants(&[("app", &["Debug"])]);
        assert!(matches!(
            filter_variants("App", "", &all),
            Err(EngineError::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn unknown_variant_errors() {
        let all = variants(&[("app", &["debug", "release"])]);
        let err = filter_variants("", "flavorX", &all).unwrap_err();
        assert_eq!(err.to_string(), "variant flavorX not found in any module");
    }

    #[test]
    fn variant_missing_in_selected_module_errors() {
        let all = variants(&[("app", &["Debug"]), ("lib", &["Release"])]);
        assert!(matches!(
            filter_variants("app", "release", &all),
            Err(EngineError::VariantNotFound { .. })
        ));
    }

    fn arb_variants() -> impl Strategy<Value = Variants> {
        proptest::collection::btree_map(
            "[a-z]{1,6}",
            proptest::collection::vec("(debug|Debug|release|Release|staging)", 1..4),
            1..4,
        )
    }

    proptest! {
        #[test]
        fn filter_is_idempotent(all in arb_variants(), pick_module in any::<bool>(), variant in "(|debug|RELEASE|Staging)") {
            let module = if pick_module {
                all.keys().next().cloned().unwrap_or_default()
            } else {
                String::new()
            };
            if let Ok(once) = filter_variants(&module, &variant, &all) {
                let twice = filter_variants(&module, &variant, &once).unwrap();
                prop_assert_eq!(twice, once);
            }
        }

        #[test]
        fn filter_ignores_variant_case(all in arb_variants(), variant in "(debug|release|staging)") {
            let lower = filter_variants("", &variant, &all).ok();
            let upper = filter_variants("", &variant.to_uppercase(), &all).ok();
            prop_assert_eq!(lower, upper);
        }

        #[test]
        fn filtered_is_subset(all in arb_variants(), variant in "(debug|release|staging)") {
            if let Ok(filtered) = filter_variants("", &variant, &all) {
                for (module, kept) in &filtered {
                    let original = all.get(module).unwrap();
                    prop_assert!(kept.iter().all(|v| original.contains(v)));
                }
            }
        }
    }
}
