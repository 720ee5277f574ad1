use vonneumann::cpu::{GroupKind, ARITHMETIC, CONTROL};
use vonneumann::asm::parse_deck;
use vonneumann::{assemble, ConfigurationError, Machine, MachineState, RunOutcome};

fn run_source(source: &str, inputs: &[&str]) -> Machine {
    let deck = assemble(source).unwrap().to_deck(inputs.iter().copied());
    let mut machine = Machine::new();
    machine.load_deck(deck);
    machine
}

#[test]
fn hand_written_loader_deck() {
    // Loader prelude, three address/value pairs, the jump, one input card.
    let deck = parse_deck("002\n800\n010\n020\n011\n520\n012\n900\n810\n042\n").unwrap();
    let mut machine = Machine::new();
    machine.load_deck(deck);

    let report = machine.run().unwrap();
    assert_eq!(report.output, "042");
    assert_eq!(machine.state, MachineState::Halted);
    assert_eq!(machine.mem.read(20).unwrap(), 42);
}

#[test]
fn counting_loop() {
    let source = r#"
            ORG 20
    LOOP:   CLA N
            OUT N
            ADD ONE
            STO N
            SUB LIMIT
            TAC LOOP
            HRS
            ORG 30
    N:      DAT 1
    ONE:    DAT 1
    LIMIT:  DAT 4
    "#;
    let mut machine = run_source(source, &[]);

    let report = machine.run().unwrap();
    assert_eq!(report.output_lines(), vec!["001", "002", "003"]);
    assert_eq!(machine.mem.read(30).unwrap(), 4);
    assert_eq!(report.registers.pc, 0);
    assert_eq!(report.registers.acc, 0);
}

#[test]
fn loader_jump_leaves_return_address() {
    // The final loader card runs from cell 1, so the return cell holds 802.
    let mut machine = run_source("ORG 10\nOUT 99\nHRS", &[]);

    let report = machine.run().unwrap();
    assert_eq!(report.output, "802");
}

#[test]
fn echo_inputs_after_program() {
    let source = r#"
            ORG 10
            INP 40
            INP 41
            CLA 40
            ADD 41
            STO 42
            OUT 42
            HRS
    "#;
    let mut machine = run_source(source, &["123", "-23"]);

    let report = machine.run().unwrap();
    assert_eq!(report.output, "100");
}

#[test]
fn bounded_run_stops_infinite_loop() {
    let mut machine = run_source("ORG 10\nLOOP: JMP LOOP", &[]);

    let outcome = machine.run_limited(500).unwrap();
    assert_eq!(outcome, RunOutcome::CycleLimit { cycles: 500 });
    assert!(!machine.is_running());
    assert_ne!(machine.state, MachineState::Faulted);
}

#[test]
fn machine_without_io_group_is_rejected() {
    let err = Machine::with_groups(&[ARITHMETIC, CONTROL]).unwrap_err();
    assert_eq!(err, ConfigurationError::MissingGroup(GroupKind::Io));
}

#[test]
fn report_serializes_to_json() {
    let mut machine = run_source("ORG 10\nINP 20\nOUT 20\nHRS", &["7"]);
    let report = machine.run().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["output"], "007");
    assert_eq!(json["registers"]["pc"], 0);
    assert!(json["cycles"].as_u64().unwrap() > 0);
}
