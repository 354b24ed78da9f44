//! Loader integration tests
//!
//! Replays the order a page sees things in: inline `execute` statements
//! first, then the bundle's `define` statements when the async script lands.

use serde_json::{Value, json};
use spacey_bundle::Call;
use spacey_loader::{Loader, LoaderError};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn define_logging(loader: &Loader, name: &'static str, deps: &'static [&'static str], log: &Log) {
    let log = Rc::clone(log);
    loader
        .define(name, move |loader, module| {
            for dep in deps {
                loader.require(dep)?;
            }
            log.borrow_mut().push(format!("init {name}"));
            let log = Rc::clone(&log);
            module.exports().function("run", move |args| {
                log.borrow_mut().push(format!("run {name} {}", Value::Array(args.to_vec())));
                Ok(Value::Null)
            });
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_page_calls_wait_for_bundle() {
    let loader = Loader::new();
    let log: Log = Rc::default();

    // Inline script block
    loader.execute(Call::new("a/foo", "run", vec![json!(1)]));
    loader.execute(Call::new("b/baz", "run", vec![json!("x")]));
    loader.run_pending().unwrap();
    assert!(log.borrow().is_empty());

    // The bundle arrives: modules in name order
    define_logging(&loader, "a/foo", &["bar", "b/baz"], &log);
    define_logging(&loader, "b/baz", &["bar"], &log);
    define_logging(&loader, "bar", &[], &log);
    loader.run_pending().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "init bar",
            "init b/baz",
            "init a/foo",
            "run a/foo [1]",
            "run b/baz [\"x\"]",
        ]
    );
}

#[test]
fn test_partial_bundle_runs_what_it_can() {
    let loader = Loader::new();
    let log: Log = Rc::default();

    loader.execute(Call::new("first", "run", vec![]));
    loader.execute(Call::new("second", "run", vec![]));
    define_logging(&loader, "first", &[], &log);
    loader.run_pending().unwrap();

    assert_eq!(*log.borrow(), vec!["init first", "run first []"]);
    assert_eq!(loader.queued(), 1);

    define_logging(&loader, "second", &[], &log);
    loader.run_pending().unwrap();
    assert_eq!(log.borrow().last().map(String::as_str), Some("run second []"));
    assert_eq!(loader.queued(), 0);
}

#[test]
fn test_missing_dependency_surfaces_from_flush() {
    let loader = Loader::new();
    let log: Log = Rc::default();

    define_logging(&loader, "needs", &["absent"], &log);
    loader.execute(Call::new("needs", "run", vec![]));

    let err = loader.run_pending().unwrap_err();
    assert_eq!(err, LoaderError::NotFound("absent".into()));
}
