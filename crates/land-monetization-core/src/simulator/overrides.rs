use serde_json::Value;

use super::{ScenarioKind, ScenarioParameters};
use crate::error::SimulationError;
use crate::SimResult;

impl ScenarioParameters {
    /// Rebuild a complete parameter record for `kind` from its defaults with
    /// `patch` laid over the top.
    ///
    /// Nested objects merge key by key, so a patch touching one field of a
    /// sub-record keeps the rest of it. `null` or an empty object yields the
    /// defaults unchanged.
    pub fn with_overrides(kind: ScenarioKind, patch: &Value) -> SimResult<Self> {
        let mut record = Self::defaults(kind).to_record()?;

        match patch {
            Value::Null => {}
            Value::Object(_) => deep_merge(&mut record, patch),
            other => {
                return Err(SimulationError::InvalidParameters(format!(
                    "{kind}: parameter overrides must be a JSON object, got {other}"
                )))
            }
        }

        Self::from_record(kind, record)
    }
}

/// Merge `patch` into `base` in place. Objects merge recursively; any other
/// patch value replaces the base value outright.
pub fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_val) in patch_map {
                match base_map.get_mut(key) {
                    Some(base_val) => deep_merge(base_val, patch_val),
                    None => {
                        base_map.insert(key.clone(), patch_val.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{LandSwapParams, LeaseholdCondoParams};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_empty_patch_yields_defaults() {
        for kind in ScenarioKind::ALL {
            let params = ScenarioParameters::with_overrides(kind, &json!({})).unwrap();
            assert_eq!(params, ScenarioParameters::defaults(kind));
            let params = ScenarioParameters::with_overrides(kind, &Value::Null).unwrap();
            assert_eq!(params, ScenarioParameters::defaults(kind));
        }
    }

    #[test]
    fn test_patch_overrides_only_named_fields() {
        let params = ScenarioParameters::with_overrides(
            ScenarioKind::LeaseholdCondo,
            &json!({ "lease_years": 50, "ground_rent_yield": "0.045" }),
        )
        .unwrap();

        let expected = LeaseholdCondoParams {
            lease_years: 50,
            ground_rent_yield: dec!(0.045),
            ..LeaseholdCondoParams::default()
        };
        assert_eq!(params, ScenarioParameters::LeaseholdCondo(expected));
    }

    #[test]
    fn test_patch_accepts_numeric_json() {
        let params = ScenarioParameters::with_overrides(
            ScenarioKind::LandSwap,
            &json!({ "far": 600, "sell_after_acquisition": true }),
        )
        .unwrap();

        match params {
            ScenarioParameters::LandSwap(p) => {
                assert_eq!(p.far, dec!(600));
                assert!(p.sell_after_acquisition);
                assert_eq!(p.efficiency, LandSwapParams::default().efficiency);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScenarioParameters::with_overrides(
            ScenarioKind::MasterLease,
            &json!({ "base_rent": 3000 }),
        )
        .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters(_)));
    }

    #[test]
    fn test_non_object_patch_rejected() {
        let err =
            ScenarioParameters::with_overrides(ScenarioKind::MasterLease, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters(_)));
    }

    #[test]
    fn test_deep_merge_keeps_untouched_nested_fields() {
        let mut base = json!({
            "financials": { "npv": 1, "irr": 2 },
            "summary": { "feasible": true },
        });
        deep_merge(&mut base, &json!({ "financials": { "npv": 5 } }));

        assert_eq!(
            base,
            json!({
                "financials": { "npv": 5, "irr": 2 },
                "summary": { "feasible": true },
            })
        );
    }

    #[test]
    fn test_deep_merge_replaces_scalars_and_arrays() {
        let mut base = json!({ "a": [1, 2, 3], "b": { "c": 1 } });
        deep_merge(&mut base, &json!({ "a": [9], "b": 7 }));
        assert_eq!(base, json!({ "a": [9], "b": 7 }));
    }
}
