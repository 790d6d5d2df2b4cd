//! Built-in rule catalogs

use super::{Category, Condition, Measure, Predicate, Rule, RuleSet};
use crate::models::Severity;
use regex::Regex;
use std::sync::OnceLock;

const COMMAND_FUNCTIONS: &[&str] = &[
    "os.system",
    "os.popen",
    "os.popen2",
    "os.popen3",
    "os.popen4",
    "subprocess.call",
    "subprocess.run",
    "subprocess.Popen",
    "subprocess.check_call",
    "subprocess.check_output",
    "commands.getoutput",
    "commands.getstatusoutput",
];

const DESERIALIZE_FUNCTIONS: &[&str] = &[
    "pickle.load",
    "pickle.loads",
    "pickle.Unpickler",
    "cPickle.load",
    "cPickle.loads",
    "dill.load",
    "dill.loads",
    "marshal.load",
    "marshal.loads",
    "shelve.open",
];

const ALLOWED_NUMBERS: &[f64] = &[0.0, 1.0, 2.0, -1.0, 10.0, 100.0, 1000.0, 0.5];

fn rule(
    id: &str,
    issue_type: &str,
    category: Category,
    severity: Severity,
    predicate: Predicate,
    message: &str,
    suggestion: &str,
) -> Rule {
    Rule {
        id: id.to_string(),
        issue_type: issue_type.to_string(),
        category,
        severity,
        predicate,
        message: message.to_string(),
        suggestion: suggestion.to_string(),
    }
}

fn node(kinds: &'static [&'static str], condition: Condition) -> Predicate {
    Predicate::Node { kinds, condition }
}

/// Security rules
pub fn security() -> &'static RuleSet {
    static SET: OnceLock<RuleSet> = OnceLock::new();
    SET.get_or_init(|| {
        use Category::Security as C;
        RuleSet::new(
            "security",
            vec![
                rule(
                    "security/sql-injection",
                    "sql_injection",
                    C,
                    Severity::Critical,
                    node(&["string", "binary_operator", "call"], Condition::SqlString),
                    "Potential SQL injection: query built with {how}",
                    "Use parameterized queries: cursor.execute(\"SELECT * FROM users WHERE id = ?\", (user_id,))",
                ),
                rule(
                    "security/command-injection-shell",
                    "command_injection",
                    C,
                    Severity::Critical,
                    node(
                        &["call"],
                        Condition::CommandCall {
                            functions: COMMAND_FUNCTIONS,
                            shell: true,
                        },
                    ),
                    "Potential command injection in {function}() with shell=True",
                    "Avoid shell=True; pass the command as a list of arguments and validate all input",
                ),
                rule(
                    "security/command-injection",
                    "command_injection",
                    C,
                    Severity::High,
                    node(
                        &["call"],
                        Condition::CommandCall {
                            functions: COMMAND_FUNCTIONS,
                            shell: false,
                        },
                    ),
                    "Potential command injection in {function}() with a dynamic command",
                    "Pass the command as a list of arguments to subprocess.run() and validate all input",
                ),
                rule(
                    "security/eval-usage",
                    "eval_usage",
                    C,
                    Severity::High,
                    node(&["call"], Condition::BuiltinCall(&["eval", "exec", "compile"])),
                    "Use of {function}() can execute arbitrary code",
                    "Avoid {function}() on untrusted input; use ast.literal_eval() for literals",
                ),
                rule(
                    "security/pickle-usage",
                    "pickle_usage",
                    C,
                    Severity::High,
                    node(&["call"], Condition::CallTo(DESERIALIZE_FUNCTIONS)),
                    "Use of {function}() can execute arbitrary code during deserialization",
                    "Never deserialize untrusted data with {function}(); use JSON or another data-only format",
                ),
                rule(
                    "security/unsafe-yaml-load",
                    "yaml_load",
                    C,
                    Severity::High,
                    node(
                        &["call"],
                        Condition::CallWithoutSafeKeyword {
                            functions: &["yaml.load", "yaml.load_all"],
                            keyword: "Loader",
                            marker: "Safe",
                        },
                    ),
                    "{function}() without a safe Loader can construct arbitrary objects",
                    "Use yaml.safe_load() or pass Loader=yaml.SafeLoader",
                ),
                rule(
                    "security/insecure-hash",
                    "insecure_hash",
                    C,
                    Severity::Medium,
                    node(
                        &["call"],
                        Condition::WeakHash {
                            constructors: &["hashlib.md5", "hashlib.sha1", "hashlib.sha", "md5.new", "sha.new"],
                            factory: "hashlib.new",
                            algorithms: &["md5", "sha1", "sha"],
                        },
                    ),
                    "Use of weak hash algorithm: {algorithm}",
                    "Use SHA-256 or stronger: hashlib.sha256()",
                ),
                rule(
                    "security/hardcoded-secret",
                    "hardcoded_secret",
                    C,
                    Severity::High,
                    node(
                        &["assignment", "keyword_argument"],
                        Condition::SecretAssignment {
                            names: Regex::new(
                                r"(?i)(passw(or)?d|(^|_)pwd($|_)|secret|api_?key|(^|_)token($|_)|access_?key|private_?key)",
                            )
                            .expect("valid regex"),
                            min_len: 4,
                        },
                    ),
                    "Potential hardcoded {secret_type} in '{name}'",
                    "Load secrets from environment variables or a secrets manager",
                ),
                rule(
                    "security/path-traversal",
                    "path_traversal",
                    C,
                    Severity::Medium,
                    node(
                        &["call"],
                        Condition::PathFromExpression(&["open", "io.open", "codecs.open", "os.path.join"]),
                    ),
                    "Potential path traversal in {function}() with a dynamically built path",
                    "Resolve the path with os.path.realpath() and check it stays inside an allowed directory",
                ),
                rule(
                    "security/insecure-random",
                    "insecure_random",
                    C,
                    Severity::High,
                    node(
                        &["call"],
                        Condition::RandomInSensitiveContext {
                            module: "random",
                            context: Regex::new(
                                r"(?i)(passw|token|secret|key|auth|session|csrf|nonce|salt|otp)",
                            )
                            .expect("valid regex"),
                        },
                    ),
                    "Using {function}() for security-sensitive value '{context}'",
                    "Use the secrets module: secrets.token_hex(), secrets.token_urlsafe(), secrets.choice()",
                ),
            ],
        )
    })
}

/// Complexity rules
pub fn complexity() -> &'static RuleSet {
    static SET: OnceLock<RuleSet> = OnceLock::new();
    SET.get_or_init(|| {
        use Category::Complexity as C;
        RuleSet::new(
            "complexity",
            vec![
                rule(
                    "complexity/high-complexity",
                    "high_complexity",
                    C,
                    Severity::Medium,
                    Predicate::Threshold(Measure::Complexity),
                    "Function '{name}' has cyclomatic complexity {value} (max: {max})",
                    "Split '{name}' into smaller functions or simplify its branching",
                ),
                rule(
                    "complexity/very-high-complexity",
                    "high_complexity",
                    C,
                    Severity::High,
                    Predicate::Threshold(Measure::ComplexityEscalated),
                    "Function '{name}' has very high cyclomatic complexity {value} (max: {max})",
                    "Split '{name}' into smaller functions; consider a lookup table or polymorphism",
                ),
                rule(
                    "complexity/deep-nesting",
                    "deep_nesting",
                    C,
                    Severity::Medium,
                    Predicate::Threshold(Measure::NestingDepth),
                    "Function '{name}' nests {value} levels deep (max: {max})",
                    "Use early returns or extract the inner blocks into helpers",
                ),
                rule(
                    "complexity/long-function",
                    "long_function",
                    C,
                    Severity::Low,
                    Predicate::Threshold(Measure::FunctionLines),
                    "Function '{name}' is {value} lines long (max: {max})",
                    "Break '{name}' into smaller, focused functions",
                ),
                rule(
                    "complexity/too-many-params",
                    "too_many_params",
                    C,
                    Severity::Low,
                    Predicate::Threshold(Measure::Parameters),
                    "Function '{name}' has {value} parameters (max: {max})",
                    "Group related parameters into a dataclass or pass a config object",
                ),
                rule(
                    "complexity/god-class",
                    "god_class",
                    C,
                    Severity::Medium,
                    Predicate::Threshold(Measure::ClassMethods),
                    "Class '{name}' has {value} methods (max: {max})",
                    "Split '{name}' by responsibility",
                ),
                rule(
                    "complexity/long-line",
                    "long_line",
                    C,
                    Severity::Info,
                    Predicate::Threshold(Measure::LineLength),
                    "Line is {value} characters long (max: {max})",
                    "Break the line into multiple lines",
                ),
                rule(
                    "complexity/large-file",
                    "large_file",
                    C,
                    Severity::Low,
                    Predicate::Threshold(Measure::FileLines),
                    "File has {value} lines (max: {max})",
                    "Split the module into smaller modules",
                ),
            ],
        )
    })
}

/// Style rules, run by the `smells` analyzer
pub fn style() -> &'static RuleSet {
    static SET: OnceLock<RuleSet> = OnceLock::new();
    SET.get_or_init(|| {
        use Category::Style as C;
        RuleSet::new(
            "style",
            vec![
                rule(
                    "smells/missing-docstring",
                    "missing_docstring",
                    C,
                    Severity::Info,
                    node(&["function_definition", "class_definition"], Condition::MissingDocstring),
                    "Public {kind} '{name}' has no docstring",
                    "Add a docstring describing what '{name}' does",
                ),
                rule(
                    "smells/magic-number",
                    "magic_number",
                    C,
                    Severity::Low,
                    node(
                        &["integer", "float"],
                        Condition::MagicNumber {
                            allowed: ALLOWED_NUMBERS,
                        },
                    ),
                    "Magic number {value}",
                    "Bind {value} to a named constant",
                ),
                rule(
                    "smells/bare-except",
                    "bare_except",
                    C,
                    Severity::Medium,
                    node(&["except_clause"], Condition::BareExcept),
                    "Bare 'except:' catches every exception, including KeyboardInterrupt",
                    "Catch specific exceptions, or at least 'except Exception:'",
                ),
                rule(
                    "smells/broad-except",
                    "broad_except",
                    C,
                    Severity::Low,
                    node(&["except_clause"], Condition::CatchesClass(&["BaseException"])),
                    "Catching {class} also traps SystemExit and KeyboardInterrupt",
                    "Catch specific exceptions, or at least 'except Exception:'",
                ),
                rule(
                    "smells/empty-except",
                    "empty_except",
                    C,
                    Severity::Medium,
                    node(&["except_clause"], Condition::EmptyHandler),
                    "Exception handler silently ignores the error",
                    "Log the exception or handle it explicitly",
                ),
                rule(
                    "smells/star-import",
                    "star_import",
                    C,
                    Severity::Low,
                    node(&["import_from_statement"], Condition::StarImport),
                    "Wildcard import from '{module}'",
                    "Import the names you need explicitly",
                ),
                rule(
                    "smells/unused-import",
                    "unused_import",
                    C,
                    Severity::Low,
                    node(&["import_statement", "import_from_statement"], Condition::UnusedImport),
                    "'{name}' is imported but never used",
                    "Remove the unused import",
                ),
                rule(
                    "smells/unused-variable",
                    "unused_variable",
                    C,
                    Severity::Low,
                    node(&["assignment"], Condition::UnusedVariable),
                    "Local variable '{name}' is assigned but never used",
                    "Remove the assignment or name it '_'",
                ),
                rule(
                    "smells/mutable-default",
                    "mutable_default",
                    C,
                    Severity::Medium,
                    node(
                        &["default_parameter", "typed_default_parameter"],
                        Condition::MutableDefault {
                            factories: &["list", "dict", "set", "bytearray", "defaultdict", "collections.defaultdict", "OrderedDict", "collections.OrderedDict"],
                        },
                    ),
                    "Parameter '{param}' of '{function}' has a mutable default value",
                    "Use None as the default and create the container inside the function",
                ),
                rule(
                    "smells/commented-code",
                    "commented_code",
                    C,
                    Severity::Info,
                    node(&["comment"], Condition::CommentedCode),
                    "Commented-out code",
                    "Delete dead code; version control keeps the history",
                ),
                rule(
                    "smells/todo-comment",
                    "todo_comment",
                    C,
                    Severity::Info,
                    Predicate::Comment(
                        Regex::new(r"\b(TODO|FIXME|HACK|XXX|BUG)\b").expect("valid regex"),
                    ),
                    "{marker} comment: {text}",
                    "Resolve the {marker} or track it in the issue tracker",
                ),
                rule(
                    "smells/print-statement",
                    "print_statement",
                    C,
                    Severity::Info,
                    node(&["call"], Condition::ConsolePrint),
                    "print() call outside an entry point",
                    "Use the logging module instead of print()",
                ),
            ],
        )
    })
}

/// Every built-in rule set, in analyzer order.
pub fn builtin_sets() -> [&'static RuleSet; 3] {
    [complexity(), security(), style()]
}
