use super::*;

fn filled_form() -> FormState {
    FormState {
        resource: "user".to_string(),
        description: "User management".to_string(),
        method: "get".to_string(),
        path: "/api/users".to_string(),
        ..FormState::default()
    }
}

#[test]
fn accepts_a_fully_populated_form() {
    assert!(validate_form(&filled_form()).is_empty());
}

#[test]
fn rejects_blank_and_whitespace_only_fields() {
    let form = FormState {
        resource: String::new(),
        description: "   ".to_string(),
        ..filled_form()
    };

    let errors = validate_form(&form);
    assert_eq!(
        errors.keys().cloned().collect::<Vec<_>>(),
        vec!["description", "resource"]
    );
    for message in errors.values() {
        assert_eq!(message, messages::FIELD_REQUIRED);
    }
}

#[test]
fn each_pass_reports_only_the_current_failures() {
    let mut form = FormState {
        resource: String::new(),
        ..filled_form()
    };
    assert_eq!(validate_form(&form).len(), 1);

    form.resource = "user".to_string();
    assert!(validate_form(&form).is_empty());
}

#[test]
fn not_empty_rule_trims_before_checking() {
    assert_eq!(
        NotEmpty.check("  \t "),
        Some(messages::FIELD_REQUIRED.to_string())
    );
    assert_eq!(NotEmpty.check("users"), None);
}
