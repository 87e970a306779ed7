//! Salary component resolution.
//!
//! Turns a component catalogue plus an employee's assignment into a
//! code → value map for one pay period. Formula components depend on every
//! code they reference; values are computed in topological order, and a
//! cycle anywhere in the graph aborts resolution before any tax is computed.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentLine, AuditStep, ComponentCatalogue, EmployeeSalaryAssignment, SalaryComponent,
    SalarySource, ValueKind,
};

use super::formula::Formula;
use super::rounding::round_half_up;
use super::validation::MAX_AMOUNT;

/// Per-period component values and the order they were resolved in.
#[derive(Debug, Clone)]
pub struct ResolvedComponents {
    /// Resolved value of every component in the resolution set.
    pub values: BTreeMap<String, Decimal>,
    /// Codes in the order they were resolved.
    pub order: Vec<String>,
    /// The audit step recording the resolution.
    pub audit_step: AuditStep,
}

/// How a single component obtains its value.
#[derive(Debug, Clone)]
enum Source {
    Fixed { value: Decimal, overridden: bool },
    Formula { formula: Formula, overridden: bool },
}

/// Resolves an employee's assignment against the catalogue.
///
/// The resolution set is every code on the assignment plus every code those
/// formulas reach transitively. Fixed and variable components take the
/// assignment's value when one is given and the catalogue default
/// otherwise; formula components take the assignment's formula when one is
/// given and the catalogue formula otherwise.
///
/// # Errors
///
/// - `UnknownComponent` when an assignment line names a code not in the catalogue
/// - `InvalidInput` when an override does not fit the component's value kind
/// - `InvalidExpression` / `UnknownReference` for a bad formula
/// - `CyclicDependency` naming every code on or behind a cycle
/// - `DivisionByZero` when a formula divides by zero
///
/// # Example
///
/// ```
/// use tax_engine::calculation::resolve_components;
/// use tax_engine::models::{
///     AssignmentLine, ComponentCatalogue, ComponentKind, EmployeeSalaryAssignment,
///     SalaryComponent, ValueKind,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let catalogue = ComponentCatalogue::new(vec![
///     SalaryComponent {
///         code: "BASIC".into(), name: "Basic".into(), kind: ComponentKind::Earning,
///         value_kind: ValueKind::Fixed, taxable: true, exemption_section: None,
///         default_value: Decimal::from(50000), formula: None, tax_exemption_cap: None,
///     },
///     SalaryComponent {
///         code: "HRA".into(), name: "HRA".into(), kind: ComponentKind::Earning,
///         value_kind: ValueKind::Formula, taxable: true, exemption_section: None,
///         default_value: Decimal::ZERO, formula: Some("BASIC * 0.4".into()),
///         tax_exemption_cap: None,
///     },
/// ]).unwrap();
/// let assignment = EmployeeSalaryAssignment {
///     employee_id: "emp_001".into(),
///     effective_from: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
///     lines: vec![AssignmentLine { code: "HRA".into(), value: None, formula: None }],
/// };
///
/// let resolved = resolve_components(&catalogue, &assignment, 1).unwrap();
/// assert_eq!(resolved.values["HRA"], Decimal::from(20000));
/// assert_eq!(resolved.order, vec!["BASIC", "HRA"]);
/// ```
pub fn resolve_components(
    catalogue: &ComponentCatalogue,
    assignment: &EmployeeSalaryAssignment,
    step_number: u32,
) -> EngineResult<ResolvedComponents> {
    let mut lines: BTreeMap<&str, &AssignmentLine> = BTreeMap::new();
    for line in &assignment.lines {
        if lines.insert(line.code.as_str(), line).is_some() {
            return Err(EngineError::invalid_input(
                "assignment.lines",
                format!("component '{}' is assigned more than once", line.code),
            ));
        }
    }

    // Collect the resolution set, following formula references outwards.
    let mut sources: BTreeMap<String, Source> = BTreeMap::new();
    let mut pending: Vec<(String, Option<&AssignmentLine>)> = Vec::new();
    for (code, line) in &lines {
        catalogue.require(code)?;
        pending.push((code.to_string(), Some(*line)));
    }

    while let Some((code, line)) = pending.pop() {
        if sources.contains_key(&code) {
            continue;
        }
        let component = catalogue.require(&code)?;
        let source = component_source(component, line)?;
        if let Source::Formula { formula, .. } = &source {
            for reference in formula.references() {
                if catalogue.get(&reference).is_none() {
                    return Err(EngineError::UnknownReference {
                        reference,
                        expression: formula.source().to_string(),
                    });
                }
                if !sources.contains_key(&reference) {
                    let line = lines.get(reference.as_str()).copied();
                    pending.push((reference, line));
                }
            }
        }
        sources.insert(code, source);
    }

    let order = resolution_order(&sources)?;

    let mut values: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut overridden = Vec::new();
    for code in &order {
        let value = match &sources[code] {
            Source::Fixed {
                value,
                overridden: was_overridden,
            } => {
                if *was_overridden {
                    overridden.push(code.clone());
                }
                *value
            }
            Source::Formula {
                formula,
                overridden: was_overridden,
            } => {
                if *was_overridden {
                    overridden.push(code.clone());
                }
                let value = round_half_up(formula.evaluate(&values)?);
                if value < Decimal::ZERO {
                    return Err(EngineError::CalculationError {
                        message: format!(
                            "component '{}' evaluated to negative value {} from '{}'",
                            code,
                            value,
                            formula.source()
                        ),
                    });
                }
                if value > MAX_AMOUNT {
                    return Err(EngineError::CalculationError {
                        message: format!(
                            "component '{}' evaluated to {} from '{}', above the limit of {}",
                            code,
                            value,
                            formula.source(),
                            MAX_AMOUNT
                        ),
                    });
                }
                value
            }
        };
        values.insert(code.clone(), value);
    }

    debug!(
        employee_id = %assignment.employee_id,
        effective_from = %assignment.effective_from,
        components = order.len(),
        "Resolved salary components"
    );

    let assigned_codes: Vec<&str> = lines.keys().copied().collect();
    let audit_step = AuditStep {
        step_number,
        rule_id: "component_resolution".to_string(),
        rule_name: "Salary Component Resolution".to_string(),
        clause_ref: "salary_structure".to_string(),
        input: serde_json::json!({
            "employee_id": assignment.employee_id,
            "effective_from": assignment.effective_from.to_string(),
            "assigned_codes": assigned_codes,
        }),
        output: serde_json::json!({
            "values": decimal_strings(&values),
            "order": order,
            "overridden": overridden,
        }),
        reasoning: format!(
            "Resolved {} components in dependency order ({} per-employee overrides)",
            order.len(),
            overridden.len()
        ),
    };

    Ok(ResolvedComponents {
        values,
        order,
        audit_step,
    })
}

/// Produces the per-period component values for a computation input.
///
/// Pre-resolved values are checked against the catalogue and passed
/// through; an assignment history is resolved using the snapshot effective
/// on the `as_of` date.
pub fn resolve_salary(
    catalogue: &ComponentCatalogue,
    source: &SalarySource,
    employee_id: &str,
    step_number: u32,
) -> EngineResult<ResolvedComponents> {
    match source {
        SalarySource::Resolved { values } => {
            for (code, value) in values {
                catalogue.require(code)?;
                if *value < Decimal::ZERO {
                    return Err(EngineError::invalid_input(
                        format!("salary.values.{}", code),
                        "must not be negative",
                    ));
                }
            }
            let audit_step = AuditStep {
                step_number,
                rule_id: "component_resolution".to_string(),
                rule_name: "Salary Component Resolution".to_string(),
                clause_ref: "salary_structure".to_string(),
                input: serde_json::json!({ "source": "resolved", "components": values.len() }),
                output: serde_json::json!({ "values": decimal_strings(values) }),
                reasoning: "Used pre-resolved component values supplied by the caller".to_string(),
            };
            Ok(ResolvedComponents {
                values: values.clone(),
                order: values.keys().cloned().collect(),
                audit_step,
            })
        }
        SalarySource::Assignments { history, as_of } => {
            if history.employee_id() != employee_id {
                return Err(EngineError::invalid_input(
                    "salary.history.employee_id",
                    format!(
                        "history belongs to '{}', not '{}'",
                        history.employee_id(),
                        employee_id
                    ),
                ));
            }
            let assignment = history.effective_on(*as_of).ok_or_else(|| {
                EngineError::invalid_input(
                    "salary.as_of",
                    format!("no salary assignment is effective on {}", as_of),
                )
            })?;
            resolve_components(catalogue, assignment, step_number)
        }
    }
}

/// Checks that no formula in the catalogue depends on itself.
///
/// Covers every component, including those no assignment reaches, using
/// the catalogue's own formulas.
///
/// # Errors
///
/// - `InvalidExpression` when a catalogue formula does not parse
/// - `CyclicDependency` naming every code on or behind a cycle
pub fn ensure_acyclic(catalogue: &ComponentCatalogue) -> EngineResult<()> {
    let mut sources = BTreeMap::new();
    for component in catalogue.iter() {
        sources.insert(component.code.clone(), component_source(component, None)?);
    }
    resolution_order(&sources).map(|_| ())
}

/// Renders decimals as strings for audit output.
pub(crate) fn decimal_strings(values: &BTreeMap<String, Decimal>) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(code, value)| (code.clone(), value.to_string()))
        .collect()
}

fn component_source(
    component: &SalaryComponent,
    line: Option<&AssignmentLine>,
) -> EngineResult<Source> {
    let field = |name: &str| format!("assignment.lines.{}.{}", component.code, name);
    let (value, formula) = match line {
        Some(line) => (line.value, line.formula.as_deref()),
        None => (None, None),
    };

    match component.value_kind {
        ValueKind::Fixed | ValueKind::Variable => {
            if formula.is_some() {
                return Err(EngineError::invalid_input(
                    field("formula"),
                    "only formula components accept a formula override",
                ));
            }
            if let Some(value) = value {
                if value < Decimal::ZERO {
                    return Err(EngineError::invalid_input(field("value"), "must not be negative"));
                }
            }
            Ok(Source::Fixed {
                value: value.unwrap_or(component.default_value),
                overridden: value.is_some(),
            })
        }
        ValueKind::Formula => {
            if value.is_some() {
                return Err(EngineError::invalid_input(
                    field("value"),
                    "formula components are computed; override the formula instead",
                ));
            }
            let expression = match formula.or(component.formula.as_deref()) {
                Some(expression) => expression,
                None => {
                    return Err(EngineError::invalid_input(
                        field("formula"),
                        "formula component has no expression",
                    ));
                }
            };
            Ok(Source::Formula {
                formula: Formula::parse(expression)?,
                overridden: formula.is_some(),
            })
        }
    }
}

/// Orders codes so every component comes after the codes it references.
///
/// Kahn's algorithm: codes with no outstanding dependencies are released in
/// code order; whatever is never released lies on or behind a cycle.
fn resolution_order(sources: &BTreeMap<String, Source>) -> EngineResult<Vec<String>> {
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (code, source) in sources {
        let dependencies = match source {
            Source::Fixed { .. } => BTreeSet::new(),
            Source::Formula { formula, .. } => formula.references(),
        };
        let mut degree = 0;
        for dependency in dependencies {
            if let Some((key, _)) = sources.get_key_value(&dependency) {
                dependents.entry(key.as_str()).or_default().push(code.as_str());
                degree += 1;
            }
        }
        in_degree.insert(code.as_str(), degree);
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(code, _)| *code)
        .collect();
    let mut order = Vec::with_capacity(sources.len());

    while let Some(code) = ready.pop_first() {
        order.push(code.to_string());
        if let Some(children) = dependents.get(code) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }
    }

    if order.len() < sources.len() {
        let codes: Vec<String> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(code, _)| code.to_string())
            .collect();
        return Err(EngineError::CyclicDependency { codes });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentKind, SalaryAssignmentHistory};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed(code: &str, value: &str) -> SalaryComponent {
        SalaryComponent {
            code: code.to_string(),
            name: code.to_string(),
            kind: ComponentKind::Earning,
            value_kind: ValueKind::Fixed,
            taxable: true,
            exemption_section: None,
            default_value: dec(value),
            formula: None,
            tax_exemption_cap: None,
        }
    }

    fn variable(code: &str, value: &str) -> SalaryComponent {
        SalaryComponent {
            value_kind: ValueKind::Variable,
            ..fixed(code, value)
        }
    }

    fn formula(code: &str, expression: &str) -> SalaryComponent {
        SalaryComponent {
            value_kind: ValueKind::Formula,
            formula: Some(expression.to_string()),
            ..fixed(code, "0")
        }
    }

    fn line(code: &str) -> AssignmentLine {
        AssignmentLine {
            code: code.to_string(),
            value: None,
            formula: None,
        }
    }

    fn assignment(lines: Vec<AssignmentLine>) -> EmployeeSalaryAssignment {
        EmployeeSalaryAssignment {
            employee_id: "emp_001".to_string(),
            effective_from: date(2024, 4, 1),
            lines,
        }
    }

    fn catalogue(components: Vec<SalaryComponent>) -> ComponentCatalogue {
        ComponentCatalogue::new(components).unwrap()
    }

    #[test]
    fn test_hra_resolves_from_basic() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000"), formula("HRA", "BASIC * 0.4")]);
        let resolved =
            resolve_components(&catalogue, &assignment(vec![line("BASIC"), line("HRA")]), 1)
                .unwrap();

        assert_eq!(resolved.values["BASIC"], dec("50000"));
        assert_eq!(resolved.values["HRA"], dec("20000"));
        assert_eq!(resolved.order, vec!["BASIC", "HRA"]);
        assert_eq!(resolved.audit_step.rule_id, "component_resolution");
        assert_eq!(resolved.audit_step.step_number, 1);
    }

    #[test]
    fn test_chained_formulas_resolve_in_dependency_order() {
        let catalogue = catalogue(vec![
            fixed("BASIC", "40000"),
            formula("DA", "BASIC * 0.1"),
            formula("PF", "(BASIC + DA) * 0.12"),
            formula("A_SPECIAL", "PF + 1"),
        ]);
        let resolved = resolve_components(&catalogue, &assignment(vec![line("A_SPECIAL")]), 1)
            .unwrap();

        assert_eq!(resolved.values["DA"], dec("4000"));
        assert_eq!(resolved.values["PF"], dec("5280"));
        assert_eq!(resolved.values["A_SPECIAL"], dec("5281"));
        assert_eq!(resolved.order, vec!["BASIC", "DA", "PF", "A_SPECIAL"]);
    }

    #[test]
    fn test_variable_override_takes_precedence() {
        let catalogue = catalogue(vec![variable("BONUS", "1000"), fixed("BASIC", "50000")]);
        let mut bonus = line("BONUS");
        bonus.value = Some(dec("2500"));

        let resolved =
            resolve_components(&catalogue, &assignment(vec![bonus, line("BASIC")]), 1).unwrap();
        assert_eq!(resolved.values["BONUS"], dec("2500"));
        assert_eq!(resolved.values["BASIC"], dec("50000"));
        assert_eq!(resolved.audit_step.output["overridden"], serde_json::json!(["BONUS"]));
    }

    #[test]
    fn test_formula_override_takes_precedence() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000"), formula("HRA", "BASIC * 0.4")]);
        let mut hra = line("HRA");
        hra.formula = Some("BASIC * 0.5".to_string());

        let resolved = resolve_components(&catalogue, &assignment(vec![hra]), 1).unwrap();
        assert_eq!(resolved.values["HRA"], dec("25000"));
    }

    #[test]
    fn test_value_override_on_formula_component_rejected() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000"), formula("HRA", "BASIC * 0.4")]);
        let mut hra = line("HRA");
        hra.value = Some(dec("1"));

        match resolve_components(&catalogue, &assignment(vec![hra]), 1) {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "assignment.lines.HRA.value");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_formula_override_on_fixed_component_rejected() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000")]);
        let mut basic = line("BASIC");
        basic.formula = Some("1".to_string());

        assert!(matches!(
            resolve_components(&catalogue, &assignment(vec![basic]), 1),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000"), formula("SPECIAL", "SPECIAL + BASIC")]);

        match resolve_components(&catalogue, &assignment(vec![line("SPECIAL")]), 1) {
            Err(EngineError::CyclicDependency { codes }) => {
                assert_eq!(codes, vec!["SPECIAL".to_string()]);
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_transitive_cycle_reports_codes() {
        let catalogue = catalogue(vec![
            fixed("BASIC", "50000"),
            formula("A", "B + BASIC"),
            formula("B", "C * 2"),
            formula("C", "A / 2"),
            formula("D", "A + 1"),
        ]);

        match resolve_components(&catalogue, &assignment(vec![line("BASIC"), line("D")]), 1) {
            Err(EngineError::CyclicDependency { codes }) => {
                assert_eq!(codes, vec!["A", "B", "C", "D"]);
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_unreached_cycle_fails_catalogue_check() {
        let catalogue = catalogue(vec![
            fixed("BASIC", "50000"),
            formula("HRA", "BASIC * 0.4"),
            formula("LOOP", "LOOP + 1"),
        ]);

        // The assignment never reaches LOOP, so resolution alone succeeds.
        assert!(resolve_components(&catalogue, &assignment(vec![line("HRA")]), 1).is_ok());

        match ensure_acyclic(&catalogue) {
            Err(EngineError::CyclicDependency { codes }) => {
                assert_eq!(codes, vec!["LOOP".to_string()]);
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_acyclic_catalogue_passes_check() {
        let catalogue = catalogue(vec![
            fixed("BASIC", "50000"),
            formula("DA", "BASIC * 0.1"),
            formula("HRA", "(BASIC + DA) * 0.4"),
        ]);
        assert!(ensure_acyclic(&catalogue).is_ok());
    }

    #[test]
    fn test_unknown_assignment_code() {
        let catalogue = catalogue(vec![fixed("BASIC", "50000")]);
        assert_eq!(
            resolve_components(&catalogue, &assignment(vec![line("DA")]), 1).unwrap_err(),
            EngineError::UnknownComponent {
                code: "DA".to_string()
            }
        );
    }

    #[test]
    fn test_formula_referencing_unknown_code() {
        let catalogue = catalogue(vec![formula("HRA", "BASIC * 0.4")]);
        assert_eq!(
            resolve_components(&catalogue, &assignment(vec![line("HRA")]), 1).unwrap_err(),
            EngineError::UnknownReference {
                reference: "BASIC".to_string(),
                expression: "BASIC * 0.4".to_string(),
            }
        );
    }

    #[test]
    fn test_division_by_zero_surfaces_formula() {
        let catalogue = catalogue(vec![fixed("DAYS", "0"), formula("DAILY", "30000 / DAYS")]);
        assert_eq!(
            resolve_components(&catalogue, &assignment(vec![line("DAILY")]), 1).unwrap_err(),
            EngineError::DivisionByZero {
                expression: "30000 / DAYS".to_string()
            }
        );
    }

    #[test]
    fn test_negative_formula_result_rejected() {
        let catalogue = catalogue(vec![fixed("BASIC", "100"), formula("NET", "BASIC - 200")]);
        assert!(matches!(
            resolve_components(&catalogue, &assignment(vec![line("NET")]), 1),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_oversized_formula_result_rejected() {
        let catalogue = catalogue(vec![
            fixed("BASIC", "1000000000000000"),
            formula("BONUS", "BASIC * 1000"),
        ]);
        assert!(matches!(
            resolve_components(&catalogue, &assignment(vec![line("BONUS")]), 1),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_duplicate_assignment_line_rejected() {
        let catalogue = catalogue(vec![fixed("BASIC", "100")]);
        assert!(matches!(
            resolve_components(&catalogue, &assignment(vec![line("BASIC"), line("BASIC")]), 1),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_formula_results_rounded_to_paise() {
        let catalogue = catalogue(vec![fixed("BASIC", "100"), formula("THIRD", "BASIC / 3")]);
        let resolved = resolve_components(&catalogue, &assignment(vec![line("THIRD")]), 1).unwrap();
        assert_eq!(resolved.values["THIRD"], dec("33.33"));
    }

    #[test]
    fn test_resolve_salary_uses_effective_snapshot() {
        let catalogue = catalogue(vec![fixed("BASIC", "10000")]);
        let mut raised = line("BASIC");
        raised.value = Some(dec("60000"));
        let later = EmployeeSalaryAssignment {
            effective_from: date(2024, 10, 1),
            ..assignment(vec![raised])
        };
        let history = SalaryAssignmentHistory::from_assignments(
            "emp_001",
            vec![assignment(vec![line("BASIC")]), later],
        )
        .unwrap();

        let source = SalarySource::Assignments {
            history: history.clone(),
            as_of: date(2024, 6, 30),
        };
        let resolved = resolve_salary(&catalogue, &source, "emp_001", 1).unwrap();
        assert_eq!(resolved.values["BASIC"], dec("10000"));

        let source = SalarySource::Assignments {
            history,
            as_of: date(2024, 11, 30),
        };
        let resolved = resolve_salary(&catalogue, &source, "emp_001", 1).unwrap();
        assert_eq!(resolved.values["BASIC"], dec("60000"));
    }

    #[test]
    fn test_resolve_salary_before_first_assignment() {
        let catalogue = catalogue(vec![fixed("BASIC", "10000")]);
        let history =
            SalaryAssignmentHistory::from_assignments("emp_001", vec![assignment(vec![])]).unwrap();
        let source = SalarySource::Assignments {
            history,
            as_of: date(2024, 1, 1),
        };

        match resolve_salary(&catalogue, &source, "emp_001", 1) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "salary.as_of"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_salary_passes_through_resolved_values() {
        let catalogue = catalogue(vec![fixed("BASIC", "10000")]);
        let source = SalarySource::Resolved {
            values: BTreeMap::from([("BASIC".to_string(), dec("45000"))]),
        };
        let resolved = resolve_salary(&catalogue, &source, "emp_001", 1).unwrap();
        assert_eq!(resolved.values["BASIC"], dec("45000"));

        let source = SalarySource::Resolved {
            values: BTreeMap::from([("DA".to_string(), dec("1"))]),
        };
        assert!(matches!(
            resolve_salary(&catalogue, &source, "emp_001", 1),
            Err(EngineError::UnknownComponent { .. })
        ));
    }
}
