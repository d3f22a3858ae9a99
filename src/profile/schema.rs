//! Required profile schema and completeness accounting
//!
//! The schema is a completeness-accounting contract, not a write-validation
//! contract: updates may create fields outside it, but only schema leaves
//! count toward the completeness score.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The fixed schema every complete application must fill in.
///
/// Scalar leaves default to null except where the application flow seeds a
/// starting state (stage, flags, payment). List leaves start empty.
pub fn required_schema() -> Value {
    json!({
        "personal_info": {
            "full_name": null,
            "phone_number": null,
            "email": null,
            "date_of_birth": null,
            "address": null
        },
        "academic_background": {
            "highest_qualification": null,
            "institution": null,
            "graduation_year": null,
            "percentage_cgpa": null,
            "field_of_study": null
        },
        "program_preferences": {
            "interested_programs": [],
            "preferred_start_date": null,
            "study_mode": null,
            "budget_range": null
        },
        "eligibility_status": {
            "programs_eligible_for": [],
            "documents_verified": false,
            "eligibility_checked": false
        },
        "application_status": {
            "current_stage": "data_collection",
            "documents_submitted": [],
            "payment_status": "pending"
        }
    })
}

/// Top-level section names of the required schema
pub fn section_names() -> Vec<String> {
    match required_schema() {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Completeness accounting over the required schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completeness {
    pub completeness_score: f64,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub missing_fields: Vec<String>,
}

/// Compute completeness of `profile` against the required schema.
///
/// A list leaf is complete iff non-empty; a scalar leaf is complete iff
/// non-null and not the empty string. Sections absent from the profile
/// count every leaf as missing. Keys starting with `_` are bookkeeping,
/// not data, and are never counted.
pub fn completeness(profile: &Value) -> Completeness {
    let mut acc = Completeness::default();
    let schema = required_schema();
    walk(&schema, profile, "", &mut acc);

    acc.completeness_score = if acc.total_fields > 0 {
        let score = acc.completed_fields as f64 / acc.total_fields as f64;
        (score * 100.0).round() / 100.0
    } else {
        0.0
    };

    acc
}

fn walk(required: &Value, actual: &Value, path: &str, acc: &mut Completeness) {
    let Value::Object(required_map) = required else {
        return;
    };

    for (key, expected) in required_map {
        if key.starts_with('_') {
            continue;
        }

        let current_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        let actual_value = actual.get(key);

        match expected {
            Value::Object(_) => {
                let sub = actual_value.filter(|v| v.is_object());
                // Absent sections recurse against an empty object, so every
                // leaf below them lands in missing_fields
                walk(expected, sub.unwrap_or(&Value::Null), &current_path, acc);
            }
            Value::Array(_) => {
                acc.total_fields += 1;
                match actual_value.and_then(Value::as_array) {
                    Some(items) if !items.is_empty() => acc.completed_fields += 1,
                    _ => acc.missing_fields.push(current_path),
                }
            }
            _ => {
                acc.total_fields += 1;
                let complete = match actual_value {
                    Some(Value::Null) | None => false,
                    Some(Value::String(s)) => !s.is_empty(),
                    Some(_) => true,
                };
                if complete {
                    acc.completed_fields += 1;
                } else {
                    acc.missing_fields.push(current_path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_five_sections() {
        let names = section_names();
        assert_eq!(names.len(), 5);
        for expected in [
            "personal_info",
            "academic_background",
            "program_preferences",
            "eligibility_status",
            "application_status",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_empty_profile_counts_seeded_defaults() {
        // Fresh schema copy: stage, flags and payment status are pre-seeded,
        // everything else is missing
        let profile = required_schema();
        let c = completeness(&profile);

        assert_eq!(c.total_fields, 20);
        assert_eq!(c.completed_fields, 4);
        assert_eq!(c.completeness_score, 0.2);
        assert!(c.missing_fields.contains(&"personal_info.full_name".to_string()));
        assert!(c
            .missing_fields
            .contains(&"program_preferences.interested_programs".to_string()));
    }

    #[test]
    fn test_absent_section_counts_all_leaves_missing() {
        let profile = json!({ "personal_info": { "full_name": "Jane Doe" } });
        let c = completeness(&profile);

        assert_eq!(c.total_fields, 20);
        assert_eq!(c.completed_fields, 1);
        assert!(c
            .missing_fields
            .contains(&"academic_background.institution".to_string()));
        assert!(c
            .missing_fields
            .contains(&"application_status.current_stage".to_string()));
    }

    #[test]
    fn test_list_complete_iff_non_empty() {
        let mut profile = required_schema();
        profile["program_preferences"]["interested_programs"] = json!(["MBA"]);
        let c = completeness(&profile);
        assert!(!c
            .missing_fields
            .contains(&"program_preferences.interested_programs".to_string()));
        assert!(c
            .missing_fields
            .contains(&"eligibility_status.programs_eligible_for".to_string()));
    }

    #[test]
    fn test_empty_string_is_not_complete() {
        let mut profile = required_schema();
        profile["personal_info"]["email"] = json!("");
        let c = completeness(&profile);
        assert!(c.missing_fields.contains(&"personal_info.email".to_string()));
    }

    #[test]
    fn test_false_boolean_is_complete() {
        // Matches the accounting rule: non-null, non-empty-string
        let profile = required_schema();
        let c = completeness(&profile);
        assert!(!c
            .missing_fields
            .contains(&"eligibility_status.documents_verified".to_string()));
    }

    #[test]
    fn test_metadata_keys_excluded() {
        let mut profile = required_schema();
        profile["_metadata"] = json!({"version": 3});
        let c = completeness(&profile);
        assert_eq!(c.total_fields, 20);
    }
}
