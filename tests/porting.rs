//! End-to-end tests of the porting pipeline.

use pretty_assertions::assert_eq;
use qb64port::catalog::SIGILS;
use qb64port::prelude::*;
use qb64port::report::{assess, MEDIUM_WARNING_THRESHOLD};

fn port(source: &str) -> PortingResult {
    port_with(source, &PortingOptions::default())
}

fn port_with(source: &str, options: &PortingOptions) -> PortingResult {
    transform(source, options).expect("default options are valid")
}

const LEGACY_PROGRAM: &str = "\
DECLARE SUB DrawBox (x%, y%)
DEF FNSquare#(v#) = v# * v#
DIM scores%(10) AS INTEGER, backup%(10) AS INTEGER
SCREEN 13
PRINT \"Area: \"; FNSquare#(4) ' PRINT stays in comments
GOSUB Pause
backup() = scores()
IF FNSquare#(2) > 3 THEN PRINT \"big\": IF 1 THEN PRINT \"chained\"
END

Pause:
  SLEEP 1
RETURN
";

const MODERN_PROGRAM: &str = "\
Dim count As Integer
For i = 1 To 10
    Print \"Line\"; i
Next i
If count > 0 Then Print \"done\" Else Print \"empty\"
Do
    k$ = InKey$
    _Limit 30
Loop Until k$ <> \"\"
";

#[test]
fn test_determinism() {
    let options = PortingOptions {
        add_modern_features: true,
        optimize_performance: true,
        ..PortingOptions::default()
    };
    assert_eq!(port_with(LEGACY_PROGRAM, &options), port_with(LEGACY_PROGRAM, &options));
}

#[test]
fn test_modern_code_is_left_alone() {
    let result = port(MODERN_PROGRAM);
    assert_eq!(result.ported_code(), MODERN_PROGRAM);
    assert!(result.transformations().is_empty());
    assert!(result.warnings().is_empty());
    assert!(result.errors().is_empty());
    assert_eq!(result.compatibility(), Compatibility::High);
}

#[test]
fn test_reporting_ported_definitions_changes_nothing() {
    let first = port("DEF FNSquare(x#) = x# * x#\nPRINT FNSquare(3)\n");
    let second = port(first.ported_code());
    assert_eq!(second.ported_code(), first.ported_code());
    assert!(second.transformations().is_empty());
}

#[test]
fn test_no_silent_change() {
    let samples = [
        LEGACY_PROGRAM,
        MODERN_PROGRAM,
        "",
        "10 PRINT \"HI\"\n20 GOTO 10\n",
        "pi = 4 * ATN(1)\nEND\n",
        "TYPE P\n  x AS INTEGER\nEND TYPE\n",
        "ON k GOSUB One, Two\nOne:\nRETURN\nTwo:\nRETURN\n",
        "WAIT &H3DA, 8\r\nSLEEP 2\r\n",
    ];
    let options = [
        PortingOptions::default(),
        PortingOptions {
            add_modern_features: true,
            source_dialect: SourceDialect::GwBasic,
            ..PortingOptions::default()
        },
        PortingOptions {
            convert_graphics: false,
            source_dialect: SourceDialect::QuickBasic,
            ..PortingOptions::default()
        },
    ];
    for options in &options {
        for source in samples {
            let result = port_with(source, options);
            if result.ported_code() != source {
                assert!(
                    result.transformations().len() + result.warnings().len() > 0,
                    "silent change for {:?}",
                    source
                );
            }
        }
    }
}

#[test]
fn test_errors_dominate_assessment() {
    for warnings in 0..=MEDIUM_WARNING_THRESHOLD {
        assert_eq!(assess(warnings, 0), Compatibility::High);
        assert_eq!(assess(warnings, 1), Compatibility::Low);
    }

    let clean = port("CLS\nPRINT 1\n");
    assert_eq!(clean.compatibility(), Compatibility::High);
    let with_error = port("CLS\nPRINT 1\nPOKE 0, 1\n");
    assert_eq!(with_error.errors().len(), 1);
    assert_eq!(with_error.compatibility(), Compatibility::Low);
}

#[test]
fn test_every_sigil_maps_to_one_type() {
    for sigil in SIGILS {
        let s = sigil.as_char();
        let source = format!("DEF FNf{s}(a{s}) = a{s}\n");
        let result = port(&source);
        let ty = sigil.explicit_type();
        assert_eq!(
            result.ported_code(),
            format!("Function f (a As {ty}) As {ty}\n    f = a\nEnd Function\n"),
            "sigil {}",
            s
        );
    }
}

#[test]
fn test_scenario_a_single_line_def_fn() {
    let result = port("DEF FNSquare(x#) = x# * x#");
    assert!(result.ported_code().contains("Function Square (x As Double)"));
    assert!(result.ported_code().contains("Square = x * x"));
    assert!(result
        .transformations()
        .iter()
        .any(|t| t.description.contains("Converted 1 single-line DEF FN definition(s)")));
}

#[test]
fn test_scenario_b_chained_if_single_warning() {
    let source = "\
IF a THEN b = 1: IF c THEN d = 2
IF e THEN f = 1: IF g THEN h = 2
IF i THEN j = 1: IF k THEN l = 2
";
    let result = port(source);
    let chained: Vec<_> = result
        .warnings()
        .iter()
        .filter(|w| w.contains("chained IF...THEN"))
        .collect();
    assert_eq!(chained.len(), 1);
    assert!(chained[0].contains("Found 3 "));
}

#[test]
fn test_scenario_c_gosub_to_sub() {
    let source = "GOSUB Greet\nEND\nGreet:\nPRINT \"hi\"\nRETURN\n";
    let result = port(source);
    assert_eq!(
        result.ported_code(),
        "Greet\nEnd\nSub Greet\nPrint \"hi\"\nEnd Sub\n"
    );
    assert!(result
        .warnings()
        .iter()
        .any(|w| w.contains("requires manual verification")));
    assert_eq!(result.best_effort_transformations().count(), 1);
}

#[test]
fn test_scenario_d_empty_input() {
    let result = port("");
    assert_eq!(result.ported_code(), "");
    assert!(result.transformations().is_empty());
    assert_eq!(result.compatibility(), Compatibility::High);
}

#[test]
fn test_legacy_program_end_to_end() {
    let options = PortingOptions {
        add_modern_features: true,
        window_title: Some("Scores".to_string()),
        ..PortingOptions::default()
    };
    let result = port_with(LEGACY_PROGRAM, &options);
    let code = result.ported_code();

    assert!(code.starts_with("$Resize:Smooth\n_Title \"Scores\"\n"));
    assert!(!code.contains("Declare"));
    assert!(code.contains("Function Square (v As Double) As Double\n"));
    assert!(code.contains("Dim scores(10) As Integer, backup(10) As Integer"));
    assert!(code.contains("Screen _NewImage(320, 200, 13)"));
    assert!(code.contains("Print \"Area: \"; Square(4) ' PRINT stays in comments"));
    assert!(code.contains("\nPause\n"));
    assert!(code.contains("For arrayCopyIndex& = LBound(scores) To UBound(scores)"));
    assert!(code.contains("\nSystem 0\n"));
    assert!(code.contains("Sub Pause\n  _Delay 1\nEnd Sub\n"));

    // GOSUB, array copy, chained IF, two arrays in one DIM, explicit
    // FUNCTION return type.
    assert_eq!(result.warnings().len(), 5);
    assert!(result.errors().is_empty());
    assert_eq!(result.compatibility(), Compatibility::Medium);
    assert!(result.summary().contains("compatibility: medium"));
}

#[test]
fn test_analyze_matches_pipeline_diagnostics() {
    let source = "IF a THEN b = 1: IF c THEN d = 2\nDEF SEG = &HB800\n";
    let analysis = analyze(source, &PortingOptions::default());
    let result = port(source);
    assert_eq!(analysis.warnings, result.warnings());
    assert_eq!(analysis.errors, result.errors());
    assert_eq!(analysis.compatibility, result.compatibility());
}

#[test]
fn test_result_serializes_to_json() {
    let result = port("GOSUB 100\n");
    let json = serde_json::to_value(&result).expect("result serializes");
    assert_eq!(json["compatibility"], "low");
    assert_eq!(json["originalCode"], "GOSUB 100\n");
    assert!(json["errors"].as_array().is_some_and(|e| e.len() == 1));
}

#[test]
fn test_statement_rewrites_next_to_literals_and_unicode() {
    let options = PortingOptions {
        add_modern_features: true,
        optimize_performance: true,
        ..PortingOptions::default()
    };
    let cases = [
        ("IF done THEN END \"bye\"\n", "\"bye\""),
        ("END €€\n", "€€"),
        ("END ' fin\n", "System 0 ' fin"),
        ("DECLARE SUB A (): CLS ' clear\nPRINT \"ü\"\n", "Cls ' clear\nPrint \"ü\""),
        (
            "DEF FNA(X) = X * 2: PRINT \"setup: done\"\n",
            "End Function\nPrint \"setup: done\"",
        ),
        ("PRINT \"日本語\": SLEEP 0\n", "Print \"日本語\": Sleep 0"),
        (
            "x = 1 \u{E000}\u{E010}\u{E001}\nPRINT \"secret\"\n",
            "x = 1 \u{E000}\u{E010}\u{E001}\nPrint \"secret\"",
        ),
        (
            "GOSUB Check ' é\nEND\nCheck:\nIF x < 0 THEN RETURN\nPRINT \"→\"\nRETURN\n",
            "If x < 0 Then Exit Sub\nPrint \"→\"\nEnd Sub",
        ),
    ];
    for (source, expected) in cases {
        let result = port_with(source, &options);
        assert!(
            result.ported_code().contains(expected),
            "{:?} became {:?}",
            source,
            result.ported_code()
        );
        assert!(result.is_changed());
        assert!(
            result.transformations().len() + result.warnings().len() > 0,
            "silent change for {:?}",
            source
        );
    }
}
