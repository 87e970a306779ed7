//! Integration tests for the Tax Computation Engine HTTP API.
//!
//! This test suite covers:
//! - Slab tax, rebate and cess under both regimes
//! - Salary component formulas and assignment history
//! - Exemptions, deductions and cap warnings
//! - Surcharge with marginal relief
//! - Withholding projection
//! - Regime comparison
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use tax_engine::api::{AppState, create_router};
use tax_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_compute(regime: &str, input: Value) -> (StatusCode, Value) {
    post(
        create_router_for_test(),
        "/compute",
        json!({"regime": regime, "input": input}),
    )
    .await
}

fn catalogue() -> Value {
    json!([
        {"code": "BASIC", "name": "Basic salary", "kind": "earning", "value_kind": "fixed"},
        {"code": "HRA", "name": "House rent allowance", "kind": "earning",
         "value_kind": "formula", "formula": "BASIC * 0.4", "exemption_section": "10(13A)"},
        {"code": "SPECIAL", "name": "Special allowance", "kind": "earning", "value_kind": "variable"},
        {"code": "LTA", "name": "Leave travel allowance", "kind": "earning", "value_kind": "fixed"},
        {"code": "EPF", "name": "Employee provident fund", "kind": "deduction",
         "value_kind": "formula", "formula": "BASIC * 0.12", "exemption_section": "80C"}
    ])
}

/// An input paid once a year, so the resolved values are annual amounts.
fn annual_input(tax_year: &str, basic: &str) -> Value {
    json!({
        "tax_year": tax_year,
        "profile": {"employee_id": "emp_001", "age": 30, "residential_status": "resident"},
        "catalogue": catalogue(),
        "salary": {"source": "resolved", "values": {"BASIC": basic}},
        "pay_periods_per_year": 1,
        "withholding": {"remaining_periods": 1}
    })
}

/// A monthly input resolved from an assignment history.
fn monthly_input(lines: Value) -> Value {
    json!({
        "tax_year": "2024-25",
        "profile": {"employee_id": "emp_001", "age": 30},
        "catalogue": catalogue(),
        "salary": {
            "source": "assignments",
            "as_of": "2024-06-30",
            "history": {
                "employee_id": "emp_001",
                "assignments": [
                    {"employee_id": "emp_001", "effective_from": "2024-04-01", "lines": lines}
                ]
            }
        }
    })
}

fn assert_amount(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected a decimal string, got {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

fn assert_has_audit_step(result: &Value, rule_id: &str) {
    let steps = result["audit_trace"]["steps"].as_array().unwrap();
    assert!(
        steps.iter().any(|step| step["rule_id"] == rule_id),
        "Expected audit step '{}' not found",
        rule_id
    );
}

// =============================================================================
// SECTION 1: Slab tax, rebate and cess
// =============================================================================

#[tokio::test]
async fn test_new_regime_twelve_lakh_taxable() {
    // 12,50,000 less 50,000 standard deduction; 15,000 + 30,000 + 45,000 slab tax
    let (status, body) = post_compute("new", annual_input("2023-24", "1250000")).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["taxable_income"], "1200000");
    assert_amount(&result["tax_before_rebate"], "90000");
    assert_amount(&result["cess"], "3600");
    assert_amount(&result["total_tax"], "93600");
    // The slab starting at 12,00,000 is never entered
    assert_eq!(result["slab_breakdown"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_rebate_brings_tax_to_zero() {
    // 5,30,000 less 50,000 = 4,80,000 taxable; 11,500 slab tax, fully rebated
    let (status, body) = post_compute("old", annual_input("2024-25", "530000")).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["taxable_income"], "480000");
    assert_amount(&result["tax_before_rebate"], "11500");
    assert_amount(&result["rebate"], "11500");
    assert_amount(&result["total_tax"], "0");
    assert_amount(&result["monthly_tds"], "0");
}

#[tokio::test]
async fn test_senior_citizen_uses_higher_exemption_limit() {
    let mut input = annual_input("2024-25", "850000");
    input["profile"]["age"] = json!(65);
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::OK);
    // 8,00,000 taxable: 10,000 + 60,000 on the 60-79 table
    assert_amount(&body["result"]["tax_before_rebate"], "70000");
}

#[tokio::test]
async fn test_zero_income_owes_nothing() {
    let (status, body) = post_compute("new", annual_input("2024-25", "0")).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["taxable_income"], "0");
    assert_amount(&result["total_tax"], "0");
    assert_amount(&result["effective_rate"], "0");
}

// =============================================================================
// SECTION 2: Salary components
// =============================================================================

#[tokio::test]
async fn test_formula_component_resolved_from_basic() {
    let input = monthly_input(json!([
        {"code": "BASIC", "value": "50000"},
        {"code": "HRA"}
    ]));
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    let resolution = &result["audit_trace"]["steps"][0];
    assert_eq!(resolution["rule_id"], "component_resolution");
    assert_amount(&resolution["output"]["values"]["HRA"], "20000");
    assert_eq!(resolution["output"]["order"], json!(["BASIC", "HRA"]));
    assert_amount(&result["gross_income"], "840000");
}

#[tokio::test]
async fn test_per_employee_formula_override() {
    let input = monthly_input(json!([
        {"code": "BASIC", "value": "50000"},
        {"code": "HRA", "formula": "BASIC * 0.5"}
    ]));
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::OK);
    let resolution = &body["result"]["audit_trace"]["steps"][0];
    assert_amount(&resolution["output"]["values"]["HRA"], "25000");
    assert_eq!(resolution["output"]["overridden"], json!(["BASIC", "HRA"]));
}

#[tokio::test]
async fn test_cyclic_formulas_rejected_before_tax() {
    let mut input = monthly_input(json!([{"code": "BASIC", "value": "50000"}, {"code": "A"}]));
    input["catalogue"] = json!([
        {"code": "BASIC", "name": "Basic", "kind": "earning", "value_kind": "fixed"},
        {"code": "A", "name": "A", "kind": "earning", "value_kind": "formula", "formula": "B + 1"},
        {"code": "B", "name": "B", "kind": "earning", "value_kind": "formula", "formula": "A * 2"}
    ]);
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CYCLIC_DEPENDENCY");
    assert!(body["message"].as_str().unwrap().contains("A, B"));
}

#[tokio::test]
async fn test_unassigned_cyclic_formula_rejected() {
    let mut input = monthly_input(json!([{"code": "BASIC", "value": "50000"}, {"code": "HRA"}]));
    input["catalogue"] = json!([
        {"code": "BASIC", "name": "Basic", "kind": "earning", "value_kind": "fixed"},
        {"code": "HRA", "name": "HRA", "kind": "earning", "value_kind": "formula",
         "formula": "BASIC * 0.4"},
        {"code": "LOOP", "name": "Loop", "kind": "earning", "value_kind": "formula",
         "formula": "LOOP + 1"}
    ]);
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CYCLIC_DEPENDENCY");
    assert!(body["message"].as_str().unwrap().contains("LOOP"));
}

#[tokio::test]
async fn test_division_by_zero_rejected() {
    let mut input = monthly_input(json!([{"code": "BASIC", "value": "0"}, {"code": "RATIO"}]));
    input["catalogue"] = json!([
        {"code": "BASIC", "name": "Basic", "kind": "earning", "value_kind": "fixed"},
        {"code": "RATIO", "name": "Ratio", "kind": "earning", "value_kind": "formula",
         "formula": "1000 / BASIC"}
    ]);
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMULA");
}

#[tokio::test]
async fn test_unknown_component_rejected() {
    let input = monthly_input(json!([{"code": "BONUS", "value": "1000"}]));
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_COMPONENT");
}

// =============================================================================
// SECTION 3: Exemptions and deductions
// =============================================================================

#[tokio::test]
async fn test_old_regime_hra_exemption_and_epf_deduction() {
    let mut input = monthly_input(json!([
        {"code": "BASIC", "value": "50000"},
        {"code": "HRA"},
        {"code": "EPF"}
    ]));
    input["exemption_claims"] = json!({"house_rent": {"annual_rent_paid": "300000", "metro": true}});
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["total_exemptions"], "240000");
    assert_amount(&result["total_deductions"], "122000");
    assert_amount(&result["taxable_income"], "478000");
    assert_eq!(result["exemptions"][0]["section"], "10(13A)");
    assert_has_audit_step(result, "exemptions");
}

#[tokio::test]
async fn test_new_regime_ignores_old_regime_claims() {
    let mut input = annual_input("2024-25", "1500000");
    input["deduction_claims"] = json!({"80C": "150000", "80D": "25000", "80CCD(2)": "100000"});
    input["exemption_claims"] = json!({"allowances": {"lta": "30000"}});
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["total_exemptions"], "0");
    // 75,000 standard deduction + employer NPS
    assert_amount(&result["total_deductions"], "175000");
    let sections: Vec<&str> = result["deductions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["section"].as_str().unwrap())
        .collect();
    assert_eq!(sections, vec!["16(ia)", "80CCD(2)"]);
}

#[tokio::test]
async fn test_capped_claim_reports_warning() {
    let mut input = annual_input("2024-25", "1500000");
    input["deduction_claims"] = json!({"80C": "200000"});
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "CAP_EXCEEDED");
    // 50,000 standard + 1,50,000 capped 80C
    assert_amount(&result["total_deductions"], "200000");
}

#[tokio::test]
async fn test_combined_cap_across_sections() {
    let mut input = annual_input("2024-25", "1500000");
    input["deduction_claims"] = json!({"80C": "100000", "80CCC": "80000"});
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["total_deductions"], "200000");
    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]["message"]
            .as_str()
            .unwrap()
            .contains("80C+80CCC+80CCD(1)")
    );
}

// =============================================================================
// SECTION 4: Surcharge
// =============================================================================

#[tokio::test]
async fn test_surcharge_marginal_relief_above_fifty_lakh() {
    // Gross 50,85,000 selects the 10% tier; relief keeps the increase within 85,000
    let (status, body) = post_compute("new", annual_input("2024-25", "5085000")).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_amount(&result["taxable_income"], "5010000");
    assert_amount(&result["tax_before_rebate"], "1193000");
    assert_amount(&result["surcharge"], "59500");
    assert_amount(&result["marginal_relief"], "59800");
    // (11,93,000 + 59,500) * 4% = 50,100
    assert_amount(&result["cess"], "50100");
    assert_amount(&result["total_tax"], "1302600");
}

// =============================================================================
// SECTION 5: Withholding projection
// =============================================================================

#[tokio::test]
async fn test_projection_spreads_balance_over_remaining_months() {
    let mut input = annual_input("2024-25", "1800000");
    input["pay_periods_per_year"] = json!(12);
    input["salary"]["values"]["BASIC"] = json!("150000");
    input["withholding"] = json!({"remaining_periods": 9, "tds_already_withheld": "45000"});
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    let projection = &result["projection"];
    let schedule: Decimal = projection["schedule"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| Decimal::from_str(p.as_str().unwrap()).unwrap())
        .sum();
    let total = Decimal::from_str(result["total_tax"].as_str().unwrap()).unwrap();

    assert_eq!(projection["schedule"].as_array().unwrap().len(), 9);
    assert_eq!(schedule + Decimal::from(45000), total);
    assert_eq!(result["monthly_tds"], projection["per_period"]);
}

#[tokio::test]
async fn test_over_withholding_projects_zero() {
    let mut input = annual_input("2024-25", "900000");
    input["withholding"] = json!({"remaining_periods": 1, "tds_already_withheld": "500000"});
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::OK);
    let projection = &body["result"]["projection"];
    assert_amount(&projection["per_period"], "0");
    assert!(
        Decimal::from_str(projection["excess_withheld"].as_str().unwrap()).unwrap()
            > Decimal::ZERO
    );
}

// =============================================================================
// SECTION 6: Regime comparison
// =============================================================================

#[tokio::test]
async fn test_compare_recommends_cheaper_regime() {
    let (status, body) = post(
        create_router_for_test(),
        "/compare",
        json!({"input": annual_input("2024-25", "1250000")}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let comparison = &body["comparison"];
    assert_eq!(comparison["recommended"], "new");
    assert_amount(&comparison["old_regime"]["total_tax"], "179400");
    assert_amount(&comparison["new_regime"]["total_tax"], "79300");
    assert_amount(&comparison["savings"], "100100");
}

#[tokio::test]
async fn test_compare_tie_uses_requested_rule() {
    let (status, body) = post(
        create_router_for_test(),
        "/compare",
        json!({"input": annual_input("2024-25", "300000"), "tie_break": "prefer_old"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comparison"]["recommended"], "old");
    assert_amount(&body["comparison"]["savings"], "0");
}

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    let input = monthly_input(json!([
        {"code": "BASIC", "value": "90000"},
        {"code": "HRA"},
        {"code": "SPECIAL", "value": "12345.67"}
    ]));
    let (_, first) = post_compute("old", input.clone()).await;
    let (_, second) = post_compute("old", input).await;

    assert_eq!(first["result"], second["result"]);
    assert_ne!(first["calculation_id"], second["calculation_id"]);
}

// =============================================================================
// SECTION 7: Error cases
// =============================================================================

#[tokio::test]
async fn test_negative_deduction_rejected() {
    let mut input = annual_input("2024-25", "1000000");
    input["deduction_claims"] = json!({"80C": "-5000"});
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("deduction_claims.80C"));
}

#[tokio::test]
async fn test_unknown_section_rejected() {
    let mut input = annual_input("2024-25", "1000000");
    input["deduction_claims"] = json!({"80ZZ": "5000"});
    let (status, body) = post_compute("old", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_zero_remaining_periods_rejected() {
    let mut input = annual_input("2024-25", "1000000");
    input["withholding"] = json!({"remaining_periods": 0});
    let (status, body) = post_compute("new", input).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("withholding.remaining_periods")
    );
}

#[tokio::test]
async fn test_unknown_tax_year_rejected() {
    let (status, body) = post_compute("new", annual_input("2030-31", "1000000")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "TAX_YEAR_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_regime_rejected() {
    let (status, body) = post_compute("flat", annual_input("2024-25", "1000000")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_JSON");
}
