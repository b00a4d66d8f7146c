#![cfg(not(target_os = "windows"))]

use pcb_test_utils::sandbox::Sandbox;

const MANIFEST: &str = r#"
projects = ["nixie_board", "power_supply", "microcontroller"]
sample = "master_bom.csv"
"#;

// KiCad export: Id;Designator;Footprint;Quantity;Designation;Supplier and ref;
const NIXIE_BOARD_CSV: &str = r#""Id";"Designator";"Footprint";"Quantity";"Designation";"Supplier and ref";
"1";"R1,R2,R3";"R_0603_1608Metric";3;"10k";;
"2";"C1";"C_0805_2012Metric";1;"10uF";;
"3";"N1,N2,N3,N4";"IN-14";4;"IN-14";;
"#;

const POWER_SUPPLY_CSV: &str = r#""Id";"Designator";"Footprint";"Quantity";"Designation";"Supplier and ref";
"1";"R4";"R_0603_1608Metric";1;"10k";;
"2";"C2,C3";"C_0805_2012Metric";2;"10uF";;
"3";"U1";"SOT-223-3_TabPin2";1;"AMS1117-3.3";;
"#;

const MICROCONTROLLER_CSV: &str = r#""Comment";"Designator";"Footprint";"JLCPCB Part #";"Mouser Part #";"Quantity"
"ESP32-C3";"U2";"QFN-32";"C2838500";"";"1"
"10k";"R9";"R_0603_1608Metric";"";"";"2"
"#;

const SAMPLE_CSV: &str = r#""Comment";"Designator";"Footprint";"JLCPCB Part #";"Mouser Part #";"Quantity"
"10k";"";"R_0603_1608Metric";"C25804";"603-RC0603FR-0710KL";"12"
"10uF";"";"C_0805_2012Metric";"C15850";"";"3"
"#;

const OUTPUT_HEADER: &str =
    r#""Comment";"Designator";"Footprint";"JLCPCB Part #";"Mouser Part #";"Quantity""#;

fn seeded() -> Sandbox {
    let mut sb = Sandbox::new();
    sb.write("pcb-bom.toml", MANIFEST)
        .write("nixie_board/manufacture/nixie_board.csv", NIXIE_BOARD_CSV)
        .write("power_supply/manufacture/power_supply.csv", POWER_SUPPLY_CSV)
        .write(
            "microcontroller/manufacture/microcontroller.csv",
            MICROCONTROLLER_CSV,
        )
        .write("master_bom.csv", SAMPLE_CSV);
    sb
}

#[test]
fn test_merge_writes_master_bom() {
    let sb = seeded();
    let output = sb.run("pcb-bom", ["merge"], None).unwrap();

    assert!(output.contains("nixie_board: 3 rows (default layout), 2 filled from sample"));
    assert!(output.contains("microcontroller: 2 rows (output layout), 1 filled from sample"));
    assert!(output.contains("5 parts, 15 total"));

    let expected = [
        OUTPUT_HEADER,
        r#""10k";"";"R_0603_1608Metric";"C25804";"603-RC0603FR-0710KL";"6""#,
        r#""10uF";"";"C_0805_2012Metric";"C15850";"";"3""#,
        r#""IN-14";"";"IN-14";"";"";"4""#,
        r#""AMS1117-3.3";"";"SOT-223-3_TabPin2";"";"";"1""#,
        r#""ESP32-C3";"";"QFN-32";"C2838500";"";"1""#,
    ]
    .join("\n")
        + "\n";
    assert_eq!(sb.read("master_bom.csv").unwrap(), expected);
}

#[test]
fn test_merge_rewrites_project_boms() {
    let sb = seeded();
    sb.run("pcb-bom", ["merge"], None).unwrap();

    let power = sb.read("power_supply/manufacture/power_supply.csv").unwrap();
    let expected = [
        OUTPUT_HEADER,
        r#""10k";"R4";"R_0603_1608Metric";"C25804";"603-RC0603FR-0710KL";"1""#,
        r#""10uF";"C2,C3";"C_0805_2012Metric";"C15850";"";"2""#,
        r#""AMS1117-3.3";"U1";"SOT-223-3_TabPin2";"";"";"1""#,
    ]
    .join("\n")
        + "\n";
    assert_eq!(power, expected);
}

#[test]
fn test_merge_is_repeatable() {
    // The master doubles as the sample, so a second run must reproduce it exactly
    let sb = seeded();
    sb.run("pcb-bom", ["merge"], None).unwrap();
    let first = sb.read("master_bom.csv").unwrap();

    sb.run("pcb-bom", ["merge"], None).unwrap();
    assert_eq!(sb.read("master_bom.csv").unwrap(), first);
}

#[test]
fn test_merge_dry_run() {
    let sb = seeded();
    let output = sb.run("pcb-bom", ["merge", "--dry-run"], None).unwrap();

    assert!(output.contains("Would write"));
    assert_eq!(sb.read("master_bom.csv").unwrap(), SAMPLE_CSV);
    assert_eq!(
        sb.read("nixie_board/manufacture/nixie_board.csv").unwrap(),
        NIXIE_BOARD_CSV
    );
}

#[test]
fn test_merge_json_summary() {
    let sb = seeded();
    let output = sb
        .run("pcb-bom", ["merge", "--dry-run", "-f", "json"], None)
        .unwrap();

    let summary: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(summary["sample_entries"], 2);
    assert_eq!(summary["projects"][0]["name"], "nixie_board");
    assert_eq!(summary["projects"][0]["layout"], "default");
    assert_eq!(summary["projects"][2]["layout"], "output");
}

#[test]
fn test_merge_unrecognized_header() {
    let mut sb = seeded();
    sb.write(
        "power_supply/manufacture/power_supply.csv",
        "\"Foo\";\"Bar\"\n\"1\";\"2\"\n",
    );

    let failure = sb.run_err("pcb-bom", ["merge"], None);
    assert_eq!(failure.code, Some(1));
    assert!(failure.stderr.contains("power_supply.csv"));
    assert!(failure.stderr.contains("Unrecognized BOM format"));
    // Nothing written, including the projects decoded before the failure
    assert_eq!(sb.read("master_bom.csv").unwrap(), SAMPLE_CSV);
    assert_eq!(
        sb.read("nixie_board/manufacture/nixie_board.csv").unwrap(),
        NIXIE_BOARD_CSV
    );
}

#[test]
fn test_merge_malformed_quantity_reports_line() {
    let mut sb = seeded();
    sb.write(
        "microcontroller/manufacture/microcontroller.csv",
        MICROCONTROLLER_CSV.replace(r#""2""#, r#""two""#),
    );

    let failure = sb.run_err("pcb-bom", ["merge"], None);
    assert!(failure.stderr.contains("microcontroller.csv: Line 3: invalid quantity 'two'"));
}

#[test]
fn test_merge_missing_manifest() {
    let sb = Sandbox::new();
    let failure = sb.run_err("pcb-bom", ["merge"], None);
    assert!(failure.stderr.contains("pcb-bom.toml"));
}
