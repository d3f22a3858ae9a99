//! Profile command implementations

use crate::profile::{ProfileStore, ReadResult, UpdateResult};
use serde_json::Value;

/// Update one profile field from the command line.
///
/// The raw value string is parsed as JSON when possible so numbers,
/// booleans and lists survive; anything else is stored as a string.
pub fn cmd_profile_update(
    store: &ProfileStore,
    phone_number: &str,
    field_path: &str,
    raw_value: &str,
    agent_id: &str,
) -> UpdateResult {
    let value = serde_json::from_str::<Value>(raw_value)
        .unwrap_or_else(|_| Value::String(raw_value.to_string()));
    store.update(phone_number, field_path, value, agent_id)
}

/// Read a profile with completeness accounting
pub fn cmd_profile_show(store: &ProfileStore, phone_number: &str) -> ReadResult {
    store.read(phone_number)
}

/// Print an update result to console
pub fn print_update_result(result: &UpdateResult) {
    if result.success {
        println!("✓ Profile updated");
        println!(
            "  Completeness: {:.0}% ({}/{} fields)",
            result.completeness_score * 100.0,
            result.completed_fields,
            result.total_fields
        );
    } else {
        eprintln!(
            "✗ Update failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// Print a profile read result to console
pub fn print_profile(result: &ReadResult) {
    if !result.success {
        eprintln!(
            "✗ Read failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    if !result.user_exists {
        println!("No profile found for that phone number.");
        println!("Sections to collect: {}", result.missing_fields.join(", "));
        return;
    }

    if let Some(data) = &result.user_data {
        match serde_json::to_string_pretty(data) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", data),
        }
    }

    println!(
        "\nCompleteness: {:.0}% ({}/{} fields)",
        result.completeness_score * 100.0,
        result.completed_fields,
        result.total_fields
    );

    if !result.missing_fields.is_empty() {
        println!("Missing: {}", result.missing_fields.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_update_parses_json_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(
            dir.path().join("user_data.json"),
            Duration::from_secs(5),
        )
        .unwrap();

        cmd_profile_update(
            &store,
            "0123456789",
            "program_preferences.interested_programs",
            r#"["MBA", "MSc AI"]"#,
            "cli",
        );
        cmd_profile_update(
            &store,
            "0123456789",
            "academic_background.graduation_year",
            "2023",
            "cli",
        );
        cmd_profile_update(
            &store,
            "0123456789",
            "personal_info.full_name",
            "Jane Doe",
            "cli",
        );

        let profile = store.read("0123456789").user_data.unwrap();
        assert!(profile["program_preferences"]["interested_programs"].is_array());
        assert_eq!(profile["academic_background"]["graduation_year"], 2023);
        assert_eq!(profile["personal_info"]["full_name"], "Jane Doe");
    }
}
