// ==========================================
// CycleDurationCalculator 集成测试
// ==========================================
// 测试目标: 周期数、总工时、交期、priority 导航与错误上下文
// ==========================================


use production_aps::engine::{CycleDurationCalculator, ErrorCategory, ProductionError};
use production_aps::{OperationOrder, ProdProcess, ProdProcessLine, WorkCenter};
use rust_decimal::Decimal;
use std::str::FromStr;
use test_helpers::{assembly_center, bracket_process, press_center, qty, welding_center};

#[test]
fn test_nb_cycles_without_capacity_equals_quantity() {
    let calculator = CycleDurationCalculator::new();
    let line = ProdProcessLine::new("Cutting", 10, Some(press_center()));

    for q in [0, 1, 7, 250] {
        assert_eq!(calculator.compute_nb_cycles(&line, qty(q)).unwrap(), qty(q));
    }
    let fractional = Decimal::from_str("2.5").unwrap();
    assert_eq!(calculator.compute_nb_cycles(&line, fractional).unwrap(), fractional);
}

#[test]
fn test_nb_cycles_with_capacity_rounds_up() {
    let calculator = CycleDurationCalculator::new();
    let line = ProdProcessLine::new("Cutting", 10, Some(press_center())).with_capacity(qty(3));

    assert_eq!(calculator.compute_nb_cycles(&line, qty(10)).unwrap(), qty(4));
    assert_eq!(calculator.compute_nb_cycles(&line, qty(9)).unwrap(), qty(3));
    assert_eq!(calculator.compute_nb_cycles(&line, qty(1)).unwrap(), qty(1));
}

#[test]
fn test_entire_duration_is_sum_of_lines() {
    let calculator = CycleDurationCalculator::new();
    let process = bracket_process();

    let per_line: i64 = process
        .lines
        .iter()
        .map(|line| calculator.compute_entire_cycle_duration(None, line, qty(2)).unwrap())
        .sum();

    let total = calculator.compute_entire_duration(&process, qty(2)).unwrap();
    assert_eq!(total, per_line);
    // (150 + 60 + 80 + 30) × 2
    assert_eq!(total, 640);
}

#[test]
fn test_lead_time_takes_max_per_priority() {
    let calculator = CycleDurationCalculator::new();
    let process = ProdProcess::new(
        "PP-LEAD",
        "Lead time",
        vec![
            ProdProcessLine::new("A", 1, Some(press_center())).with_cycle_durations(Some(100), None),
            ProdProcessLine::new("B", 1, Some(welding_center())).with_cycle_durations(Some(150), None),
            ProdProcessLine::new("C", 2, Some(assembly_center())).with_cycle_durations(None, Some(80)),
        ],
    );

    assert_eq!(calculator.compute_lead_time_duration(&process, qty(1)).unwrap(), 230);
    assert_eq!(calculator.compute_entire_duration(&process, qty(1)).unwrap(), 330);
}

#[test]
fn test_lead_time_of_sample_process() {
    let calculator = CycleDurationCalculator::new();
    // 150 + max(60, 80) + 30
    assert_eq!(
        calculator.compute_lead_time_duration(&bracket_process(), qty(1)).unwrap(),
        260
    );
}

#[test]
fn test_equal_per_cycle_durations_select_machine_branch() {
    let calculator = CycleDurationCalculator::new();
    let wc = WorkCenter::machine("WC-CELL", "Cell", production_aps::Machine::new("M09", "Cell 09"));
    let line = ProdProcessLine::new("Cell", 10, Some(wc))
        .with_cycle_durations(Some(40), Some(40))
        .with_fixed_durations(100, 20, 0);

    let mut op = OperationOrder::from_line("OP-CELL", line.clone());
    let planned = calculator
        .compute_entire_cycle_duration(Some(&mut op), &line, qty(3))
        .unwrap();

    // 机器: 100 + 20 + 3 × 40；人工: 3 × 40
    assert_eq!(planned, 240);
    assert_eq!(op.planned_machine_duration, 240);
    assert_eq!(op.planned_human_duration, 120);
}

#[test]
fn test_machine_center_without_machine_is_missing_field() {
    let calculator = CycleDurationCalculator::new();
    let mut wc = press_center();
    wc.machine = None;
    let process = ProdProcess::new(
        "PP-BROKEN",
        "Broken",
        vec![ProdProcessLine::new("Cutting", 10, Some(wc)).with_cycle_durations(Some(150), None)],
    );

    let err = calculator.compute_entire_duration(&process, qty(1)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::MissingField);
    match err {
        ProductionError::WorkCenterNoMachine { work_center } => assert_eq!(work_center, "Press"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_line_without_work_center_aborts_whole_process() {
    let calculator = CycleDurationCalculator::new();
    let mut process = bracket_process();
    process
        .lines
        .push(ProdProcessLine::new("Inspection", 40, None).with_cycle_durations(None, Some(10)));
    process.attach_lines();

    let err = calculator.compute_lead_time_duration(&process, qty(1)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Inconsistency);
    let message = err.to_string();
    assert!(message.contains("PP-BRACKET"));
    assert!(message.contains("Inspection"));

    assert!(calculator.compute_entire_duration(&process, qty(1)).is_err());
}

#[test]
fn test_get_next_priority() {
    let calculator = CycleDurationCalculator::new();
    let lines = [1, 1, 3, 5]
        .iter()
        .map(|p| ProdProcessLine::new(&format!("L{p}"), *p, Some(assembly_center())))
        .collect();
    let process = ProdProcess::new("PP-PRIO", "Priorities", lines);

    assert_eq!(calculator.get_next_priority(Some(&process), Some(1)), Some(3));
    assert_eq!(calculator.get_next_priority(Some(&process), Some(3)), Some(5));
    assert_eq!(calculator.get_next_priority(Some(&process), Some(5)), None);
    assert_eq!(calculator.get_next_priority(Some(&process), None), None);
    assert_eq!(calculator.get_next_priority(None, Some(1)), None);

    let empty = ProdProcess::new("PP-EMPTY", "Empty", Vec::new());
    assert_eq!(calculator.get_next_priority(Some(&empty), Some(1)), None);

    assert_eq!(calculator.get_previous_priority(Some(&process), Some(5)), Some(3));
    assert_eq!(calculator.get_previous_priority(Some(&process), Some(1)), None);
}

#[test]
fn test_process_loaded_from_json() {
    let raw = r#"{
        "code": "PP-JSON",
        "name": "From JSON",
        "lines": [
            {
                "name": "Stamping",
                "priority": 1,
                "work_center": {
                    "code": "WC-PRESS",
                    "name": "Press",
                    "work_center_type": "MACHINE",
                    "machine": { "code": "M01", "name": "Press 01" }
                },
                "max_capacity_per_cycle": "4",
                "duration_per_cycle": 30,
                "starting_duration": 60,
                "ending_duration": 30,
                "setup_duration": 10
            }
        ]
    }"#;
    let mut process: ProdProcess = serde_json::from_str(raw).unwrap();
    process.attach_lines();
    assert_eq!(process.lines[0].process_code.as_deref(), Some("PP-JSON"));

    let calculator = CycleDurationCalculator::new();
    // 10 件 / 每周期 4 件 → 3 周期；60 + 30 + 2 × 10 + 3 × 30
    assert_eq!(calculator.compute_entire_duration(&process, qty(10)).unwrap(), 200);
}

#[test]
fn test_json_process_without_attach_names_process_in_error() {
    let raw = r#"{"code":"PP-JSON","name":"From JSON","lines":[{"name":"Deburr","priority":1}]}"#;
    let process: ProdProcess = serde_json::from_str(raw).unwrap();
    assert!(process.lines[0].process_code.is_none());

    let calculator = CycleDurationCalculator::new();
    let err = calculator.compute_entire_duration(&process, qty(1)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Inconsistency);
    assert_eq!(err.to_string(), "工序行缺少工作中心: process=PP-JSON, line=Deburr");
}
