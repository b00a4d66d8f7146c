#![cfg(not(target_os = "windows"))]

use pcb_test_utils::sandbox::Sandbox;

const BOARD_CSV: &str = r#""Id";"Designator";"Footprint";"Quantity";"Designation";"Supplier and ref";
"1";"R1";"R_0603_1608Metric";1;"10k";;
"2";"R2,R3";"R_0603_1608Metric";2;"10k";;
"3";"C1";"C_0402_1005Metric";1;"100nF";;
"#;

#[test]
fn test_show_csv_converts_layout() {
    let mut sb = Sandbox::new();
    sb.write("board.csv", BOARD_CSV);

    let output = sb
        .run("pcb-bom", ["show", "board.csv", "-f", "csv"], None)
        .unwrap();

    assert_eq!(
        output,
        [
            r#""Comment";"Designator";"Footprint";"JLCPCB Part #";"Mouser Part #";"Quantity""#,
            r#""10k";"R1";"R_0603_1608Metric";"";"";"1""#,
            r#""10k";"R2,R3";"R_0603_1608Metric";"";"";"2""#,
            r#""100nF";"C1";"C_0402_1005Metric";"";"";"1""#,
        ]
        .join("\n")
    );
}

#[test]
fn test_show_by_part_merges_designators() {
    let mut sb = Sandbox::new();
    sb.write("board.csv", BOARD_CSV);

    let output = sb
        .run("pcb-bom", ["show", "board.csv", "--by-part", "-f", "json"], None)
        .unwrap();

    let entries: serde_json::Value = serde_json::from_str(&output).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["fields"][0], "10k");
    assert_eq!(entries[0]["fields"][1], "");
    assert_eq!(entries[0]["quantity"], 3);
    assert_eq!(entries[1]["quantity"], 1);
}

#[test]
fn test_show_table() {
    let mut sb = Sandbox::new();
    sb.write("board.csv", BOARD_CSV);

    let output = sb.run("pcb-bom", ["show", "board.csv"], None).unwrap();
    assert!(output.contains("Mouser Part #"));
    assert!(output.contains("100nF"));
    assert!(output.ends_with("3 parts, 4 total"));
}

#[test]
fn test_check_reports_each_file() {
    let mut sb = Sandbox::new();
    sb.write("good.csv", BOARD_CSV)
        .write("short.csv", BOARD_CSV.replace(r#""3";"C1";"C_0402_1005Metric";1;"100nF";;"#, r#""3";"C1";"C_0402_1005Metric";1"#))
        .write("unknown.csv", "\"Foo\";\"Bar\"\n");

    let ok = sb.run("pcb-bom", ["check", "good.csv"], None).unwrap();
    assert!(ok.contains("good.csv: 3 rows (default layout)"));

    let failure = sb.run_err("pcb-bom", ["check", "good.csv", "short.csv", "unknown.csv"], None);
    assert!(failure.stdout.contains("short.csv: Line 4: expected at least 5 fields, found 4"));
    assert!(failure.stdout.contains("unknown.csv: Unrecognized BOM format"));
    assert!(failure.stderr.contains("2 of 3 BOM files failed validation"));
}
