//! End-to-end pipeline tests: raw records in, text and JSON out.

use std::sync::Arc;

use remnant::{
    ArgumentFormat, ArgumentKey, ClassIdentifier, FunctionIdentifier, Host, PathResolver,
    RawError, RawFrame, Reflector, Rewind, Trace, Value, VendorFilter, ViewOptions,
};

struct AppPathResolver;

impl PathResolver for AppPathResolver {
    fn prettify(&self, path: &str) -> String {
        match path.strip_prefix("/srv/app/") {
            Some(rest) => format!("app://{}", rest),
            None => path.to_string(),
        }
    }
}

struct AppReflector;

impl Reflector for AppReflector {
    fn method_parameter_names(&self, class: &str, method: &str) -> Option<Vec<String>> {
        if class == "Auth\\Gate" && method == "login" {
            Some(vec!["user".to_string(), "password".to_string()])
        } else {
            None
        }
    }
}

fn app_host() -> Host {
    Host::new(Arc::new(AppPathResolver), Arc::new(AppReflector))
}

fn sample_backtrace() -> Vec<RawFrame> {
    vec![
        RawFrame::new()
            .with_function("login")
            .with_class("Auth\\Gate")
            .with_call_type("->")
            .with_location("/srv/app/src/Gate.php", 42)
            .with_args(vec![Value::string("bob"), Value::string("hunter2hunter2")]),
        RawFrame::new()
            .with_function("handle")
            .with_class("Http\\Kernel")
            .with_call_type("->")
            .with_location("/srv/app/vendor/framework/Kernel.php", 107),
        RawFrame::new()
            .with_function("main")
            .with_location("/srv/app/public/index.php", 9),
    ]
}

#[test]
fn test_full_text_rendering() {
    let host = app_host();
    let trace = Trace::from_backtrace(&sample_backtrace(), None, &host).unwrap();

    let options = ViewOptions::new()
        .with_argument_format(ArgumentFormat::Count)
        .with_root_path("/srv/app/");
    let rendered = trace.render(&options, &host);

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "3: ● Auth\\Gate->login(...2)");
    assert_eq!(lines[1], "   app://src/Gate.php:42");
    assert_eq!(lines[2], "");
    assert_eq!(lines[3], "2: ◒ Http\\Kernel->handle()");
    assert_eq!(lines[4], "   app://vendor/framework/Kernel.php:107");
    assert_eq!(lines[6], "1: ● main()");
    assert_eq!(lines[7], "   app://public/index.php:9");
}

#[test]
fn test_vendor_filter_collapses_hidden_run() {
    let host = app_host();
    let trace = Trace::from_backtrace(&sample_backtrace(), None, &host).unwrap();

    let options = ViewOptions::new().with_filter(Box::new(VendorFilter));
    let rendered = trace.render(&options, &host);

    assert!(rendered.contains("login"));
    assert!(rendered.contains("[1 hidden]"));
    assert!(!rendered.contains("handle"));
    assert!(rendered.contains("main"));
}

#[test]
fn test_redacted_named_arguments() {
    let host = app_host();
    let trace = Trace::from_backtrace(&sample_backtrace(), None, &host).unwrap();

    let options = ViewOptions::new()
        .with_argument_format(ArgumentFormat::NamedValues)
        .with_redact(Arc::new(|key, _value| {
            matches!(key, ArgumentKey::Name(name) if name == "password")
        }));
    let rendered = trace.render(&options, &host);

    assert!(rendered.contains("user: 'bob'"));
    assert!(rendered.contains("password: *sensitive*"));
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn test_json_document_round_trip() {
    let host = app_host();
    let trace = Trace::from_backtrace(&sample_backtrace(), None, &host).unwrap();

    let options = ViewOptions::default();
    let json = trace.to_json(&options, &host);

    assert_eq!(json["schema"], serde_json::json!("remnant.trace@1"));

    let document: remnant::TraceDocument = serde_json::from_value(json).unwrap();
    assert_eq!(document.frames.len(), 3);

    // The JSON function field reproduces the text renderer's function string
    for (frame, serialised) in trace.iter().zip(document.frames.iter()) {
        assert_eq!(
            remnant::serialize::function_display(serialised),
            frame.function.render(&options, &host)
        );
    }
}

#[test]
fn test_backtrace_from_json_capture() {
    let records: Vec<RawFrame> = serde_json::from_str(
        r#"[
            {"function": "render", "class": "View", "type": "->",
             "file": "/srv/app/src/View.php", "line": 14, "args": [{"title": "home"}]},
            {"function": "__call", "class": "Template", "type": "->",
             "file": "/srv/app/src/Template.php", "line": 30, "args": ["render", []]}
        ]"#,
    )
    .unwrap();

    let host = app_host();
    let trace = Trace::from_backtrace(&records, None, &host).unwrap();

    // The magic trampoline records the dispatched target
    assert_eq!(trace.frames()[1].function.name(), "render");
    assert_eq!(
        trace.frames()[0].arguments.iter().next().unwrap().1,
        Value::Array(vec![Value::string("home")])
    );
}

#[test]
fn test_error_trace_with_anchor() {
    let error = RawError::new("Db\\ConnectionError", "connection refused")
        .with_code(111)
        .with_location("/srv/app/src/Db.php", 88)
        .with_trace(sample_backtrace());

    let host = app_host();
    let anchor = Rewind::new(1);
    let trace = Trace::from_error(&error, Some(&anchor), &host).unwrap();

    // Synthetic construction frame, then the anchored tail of the backtrace
    assert_eq!(trace.len(), 3);
    assert!(trace[0].function.equals(&FunctionIdentifier::object_method(
        ClassIdentifier::native("Db\\ConnectionError"),
        "__construct"
    )));
    assert_eq!(trace[1].function.name(), "handle");

    let message = trace[0].arguments.iter().next().unwrap();
    assert_eq!(message.1, Value::string("connection refused"));
}

#[test]
fn test_eval_and_closure_frames_end_to_end() {
    let records = vec![
        RawFrame::new()
            .with_function("{closure:/srv/app/src/jobs.php:12}")
            .with_location("/srv/app/src/jobs.php(12) : eval()'d code", 3),
        RawFrame::new()
            .with_function("run")
            .with_class("class@anonymous/srv/app/src/worker.php:7$1f")
            .with_call_type("->")
            .with_location("/srv/app/src/worker.php", 19),
    ];

    let host = app_host();
    let trace = Trace::from_backtrace(&records, None, &host).unwrap();

    let closure = &trace[0];
    let FunctionIdentifier::AnonymousFunction { location } = &closure.function else {
        panic!("expected anonymous function");
    };
    assert_eq!(location.as_ref().unwrap().line, Some(12));

    let call_site = closure.call_site.as_ref().unwrap();
    assert_eq!(call_site.file, "/srv/app/src/jobs.php");
    assert_eq!(call_site.line, Some(12));
    assert_eq!(call_site.eval_line, Some(3));

    let anonymous = &trace[1];
    let class = anonymous.function.class().unwrap();
    assert!(class.equals(&ClassIdentifier::from_class_string(
        "class@anonymous/srv/app/src/worker.php:70xdead"
    )));
}
