// Parser robustness tests.
//
// Table-driven suites: each case is one input line that must either parse or
// fail, optionally with a given fragment in the error message. Panics are
// caught and counted separately so a crash never hides behind a failure.

use lrcalc::ast::{BinaryOp, Node, Operator};
use lrcalc::error::{CalcError, ErrorKind, Span};
use lrcalc::lexer::tokenize;
use lrcalc::parser::{parse, Parser};
use lrcalc::value::Value;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
    pub expected_kind: Option<ErrorKind>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    // Catch any panics to detect crashes
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    match result {
        Ok(parse_result) => match (parse_result, test.should_succeed) {
            (Ok(_), true) => TestResult::Pass,
            (Ok(tree), false) => TestResult::Fail(format!(
                "Expected parsing to fail, but it produced {}",
                tree
            )),
            (Err(error), false) => check_error(test, &error),
            (Err(error), true) => TestResult::Fail(format!(
                "Expected parsing to succeed, but got error: {}",
                error
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

fn check_error(test: &TestCase, error: &CalcError) -> TestResult {
    if let Some(kind) = test.expected_kind {
        if error.kind != kind {
            return TestResult::Fail(format!(
                "Expected {:?}, got {:?} ({})",
                kind, error.kind, error.message
            ));
        }
    }

    if let Some(expected) = &test.expected_error_contains {
        if !error.message.contains(expected) {
            return TestResult::Fail(format!(
                "Error message '{}' doesn't contain expected text '{}'",
                error.message, expected
            ));
        }
    }

    TestResult::Pass
}

/// Parse input and return result
fn parse_input(input: &str) -> Result<Node, CalcError> {
    parse(tokenize(input, false), false)
}

/// Test case builder for convenience
impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
            expected_kind: None,
        }
    }

    pub fn should_fail(name: &str, input: &str, kind: ErrorKind) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
            expected_kind: Some(kind),
        }
    }

    pub fn should_fail_with_message(
        name: &str,
        input: &str,
        kind: ErrorKind,
        expected_msg: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
            expected_kind: Some(kind),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_parentheses_tests() -> TestSuite {
    let mut suite = TestSuite::new("Parentheses");

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        ErrorKind::Structure,
        "Unclosed '('",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_nested",
        "((1 + 2)",
        ErrorKind::Structure,
        "Unclosed '('",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        ErrorKind::Structure,
        "Unmatched ')'",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren_multiple",
        "(1 + 2))",
        ErrorKind::Structure,
        "Unmatched ')'",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "()",
        ErrorKind::Structure,
        "Empty parentheses are not allowed",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses_in_expression",
        "1 + ()",
        ErrorKind::Structure,
        "Empty parentheses are not allowed",
    ));

    suite.add_test(TestCase::should_fail(
        "separator_inside_group_without_right_side",
        "(1;)",
        ErrorKind::Structure,
    ));

    suite.add_test(TestCase::should_succeed("redundant_parentheses", "((1))"));
    suite.add_test(TestCase::should_succeed("grouped_variable", "(x)"));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));
    suite.add_test(TestCase::should_succeed("only_separators", ";;;"));
    suite.add_test(TestCase::should_succeed("trailing_separator", "1 + 2;"));
    suite.add_test(TestCase::should_succeed("repeated_separators", "1;;; 2"));

    suite.add_test(TestCase::should_fail(
        "unexpected_eof_after_operator",
        "1 +",
        ErrorKind::Structure,
    ));
    suite.add_test(TestCase::should_fail("unexpected_eof_in_group", "1 + (", ErrorKind::Structure));

    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    suite.add_test(TestCase::should_succeed("deeply_nested_parens", &deep_parens));

    suite
}

fn create_operator_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operator Tests");

    suite.add_test(TestCase::should_fail_with_message(
        "missing_left_operand",
        "+ 1",
        ErrorKind::Structure,
        "has no operand to combine with",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_right_operand",
        "1 +",
        ErrorKind::Structure,
        "has no operand to combine with",
    ));
    suite.add_test(TestCase::should_fail("missing_both_operands", "+", ErrorKind::Structure));
    suite.add_test(TestCase::should_fail("double_plus", "1 ++ 2", ErrorKind::Structure));
    // No unary operators: a leading minus is a dangling operator.
    suite.add_test(TestCase::should_fail("unary_minus", "1 - -2", ErrorKind::Structure));

    suite.add_test(TestCase::should_succeed("all_operators", "1 + 2 - 3 * 4 / 5 % 6"));

    suite
}

fn create_adjacency_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operand Adjacency");

    suite.add_test(TestCase::should_fail_with_message(
        "two_numbers",
        "1 2",
        ErrorKind::Construction,
        "has no operator to bind to",
    ));
    suite.add_test(TestCase::should_fail(
        "multi_character_name",
        "ab = 1",
        ErrorKind::Construction,
    ));
    suite.add_test(TestCase::should_fail(
        "group_next_to_number",
        "(1 + 2) 3",
        ErrorKind::Construction,
    ));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignment Tests");

    suite.add_test(TestCase::should_succeed("simple_assignment", "x = 1"));
    suite.add_test(TestCase::should_succeed("assignment_with_expression", "x = 1 + 2"));
    suite.add_test(TestCase::should_succeed("chained_assignment", "x = y = 3"));
    // Rejected only when evaluated.
    suite.add_test(TestCase::should_succeed("number_target", "1 = x"));

    suite.add_test(TestCase::should_fail("missing_value", "x =", ErrorKind::Structure));
    suite.add_test(TestCase::should_fail("missing_target", "= 1", ErrorKind::Structure));

    suite
}

fn create_positive_tests() -> TestSuite {
    let mut suite = TestSuite::new("Positive Tests");

    suite.add_test(TestCase::should_succeed("simple_arithmetic", "1 + 2 * 3"));
    suite.add_test(TestCase::should_succeed("parentheses", "(1 + 2) * 3"));
    suite.add_test(TestCase::should_succeed("variable_assignment", "x = 42"));
    suite.add_test(TestCase::should_succeed("sequence", "x = 5; y = x * 2; x + y"));
    suite.add_test(TestCase::should_succeed("punctuation_names", "? = 1; ? + ?"));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    let mut all_passed = true;

    let suites = vec![
        create_parentheses_tests(),
        create_edge_case_tests(),
        create_operator_tests(),
        create_adjacency_tests(),
        create_assignment_tests(),
        create_positive_tests(),
    ];

    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            all_passed = false;
        }
    }

    assert!(all_passed, "Some parser tests failed. See output above for details.");
}

#[test]
fn tree_shapes_follow_binding_powers() {
    let shape = |input: &str| parse_input(input).map(|tree| tree.to_string());

    assert_eq!(shape("2 + 3 * 4").unwrap(), "(+ 2 (* 3 4))");
    assert_eq!(shape("2 * 3 + 4").unwrap(), "(+ (* 2 3) 4)");
    assert_eq!(shape("8 - 3 - 2").unwrap(), "(- (- 8 3) 2)");
    assert_eq!(shape("8 / 4 / 2").unwrap(), "(/ (/ 8 4) 2)");
    assert_eq!(shape("8 - (3 - 2)").unwrap(), "(- 8 (- 3 2))");
    // Modulo is the loosest arithmetic operator.
    assert_eq!(shape("1 + 5 % 3").unwrap(), "(% (+ 1 5) 3)");
    assert_eq!(shape("5 % 3 * 2").unwrap(), "(% 5 (* 3 2))");
    // Assignment groups to the right and sits below arithmetic.
    assert_eq!(shape("a = b = 1 + 2").unwrap(), "(= a (= b (+ 1 2)))");
    assert_eq!(shape("x = 5; x + 1").unwrap(), "(; (= x 5) (+ x 1))");
    // Forward offers 0 to its right and 0.1 to its left, so it nests right.
    assert_eq!(shape("a; b; c").unwrap(), "(; a (; b c))");
    assert_eq!(shape("x = 1;").unwrap(), "(; (= x 1) _)");
    assert_eq!(shape("").unwrap(), "_");
}

#[test]
fn error_spans_point_at_the_culprit() {
    let error = parse_input("1 + 2)").unwrap_err();
    assert_eq!((error.span.start, error.span.end), (5, 6));

    let error = parse_input("3 * (1 + 2").unwrap_err();
    assert_eq!((error.span.start, error.span.end), (4, 5));

    let error = parse_input("1 +").unwrap_err();
    assert_eq!((error.span.start, error.span.end), (2, 3));

    // The innermost group left open is the one reported.
    let error = parse_input("(1 + (2 * (3)").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Structure);
    assert_eq!((error.span.start, error.span.end), (5, 6));
}

#[test]
fn one_pass_reduces_every_ready_operator() {
    let mut parser = Parser::new(tokenize("1*2+3*4", false)).record_passes(true);
    let tree = parser.parse().unwrap();

    assert_eq!(tree.to_string(), "(+ (* 1 2) (* 3 4))");
    assert_eq!(
        parser.passes(),
        &["[(* 1 2), +, (* 3 4)]", "[(+ (* 1 2) (* 3 4))]"]
    );
}

#[test]
fn passes_are_only_recorded_on_request() {
    let mut parser = Parser::new(tokenize("1*2+3*4", false));
    parser.parse().unwrap();
    assert!(parser.passes().is_empty());
}

#[test]
fn built_nodes_cover_both_operands() {
    let one = Node::atom(Value::Int(1), Span::new(0, 1));
    let two = Node::atom(Value::Int(2), Span::new(4, 5));

    let node = Operator::Arithmetic(BinaryOp::Add).build(one, two, Span::new(2, 3));
    assert_eq!(*node.span(), Span::new(0, 5));
    assert_eq!(node.to_string(), "(+ 1 2)");

    let x = Node::Var {
        name: 'x',
        span: Span::new(0, 1),
    };
    let five = Node::atom(Value::Int(5), Span::new(2, 3));
    assert_eq!(Operator::Assign.build(x, five, Span::new(1, 2)).to_string(), "(= x 5)");
}

#[test]
fn verbose_parse_matches_quiet_parse() {
    let quiet = parse(tokenize("x = (1 + 2) * 3; x % 4", false), false).unwrap();
    let loud = parse(tokenize("x = (1 + 2) * 3; x % 4", true), true).unwrap();
    assert_eq!(quiet, loud);
}
