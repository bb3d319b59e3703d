// Every integration test module shares the macros below, so they must come
// before the module declarations.

macro_rules! regex_new {
    ($re:expr) => {{
        use rregex::Regex;
        Regex::new($re)
    }};
}

macro_rules! regex {
    ($re:expr) => {
        regex_new!($re).unwrap()
    };
}

macro_rules! regex_set_new {
    ($res:expr) => {{
        use rregex::RegexSet;
        RegexSet::new($res)
    }};
}

macro_rules! regex_set {
    ($res:expr) => {
        regex_set_new!($res).unwrap()
    };
}

include!("macros.rs");

mod api;
mod noparse;
mod regression;
mod set;
mod syntax;
mod word_boundary;

/// Turns on logging for a test. Repeated calls are harmless.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn disallow_non_utf8() {
    assert!(rregex::Regex::new(r"(?-u)\xFF").is_err());
    assert!(rregex::Regex::new(r"(?-u).").is_err());
    assert!(rregex::Regex::new(r"(?-u)[\xFF]").is_err());
}

#[test]
fn disallow_octal() {
    assert!(rregex::Regex::new(r"\0").is_err());
}

#[test]
fn compile_logs() {
    init_logging();
    let re = regex!(r"\w+");
    assert!(re.is_match("logged"));
}
