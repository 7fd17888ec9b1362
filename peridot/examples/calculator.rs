//! A small calculator described with Peridot.
//!
//! Run with `cargo run --example calculator -- --reporters` to list reporters, or pass
//! title fragments to select specs.

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use peridot::{ErrorRecord, EventName, Harness};

#[derive(Debug, Default)]
struct Calculator {
    memory: Vec<i64>,
}

impl Calculator {
    fn push(&mut self, value: i64) {
        self.memory.push(value);
    }

    fn sum(&self) -> i64 {
        self.memory.iter().sum()
    }

    fn divide(&self, divisor: i64) -> Result<i64, ErrorRecord> {
        if divisor == 0 {
            return Err(ErrorRecord::new("division by zero"));
        }
        Ok(self.sum() / divisor)
    }
}

fn main() -> ExitCode {
    let harness = Harness::new().register_reporter("basic", "a simple summary", |base| {
        let b = base.clone();
        base.event_bus().on(EventName::RunnerEnd, move |_| {
            let line = format!("{} passing, {} failing", b.passing(), b.failures().len());
            b.output().borrow_mut().writeln(&line)?;
            Ok(())
        });
        Ok(())
    });

    harness.run(|context| {
        context.describe("Calculator", |suite| {
            let calculator = Rc::new(RefCell::new(Calculator::default()));

            let c = calculator.clone();
            suite.before_each(move |_| {
                c.borrow_mut().push(4);
                c.borrow_mut().push(6);
                Ok(())
            });

            let c = calculator.clone();
            suite.after_each(move |_| {
                c.borrow_mut().memory.clear();
                Ok(())
            });

            let c = calculator.clone();
            suite.it("sums its memory", move |_| {
                assert_eq!(c.borrow().sum(), 10);
                Ok(())
            });

            suite.context("when dividing", |suite| {
                let c = calculator.clone();
                suite.it("divides the sum", move |scope| {
                    scope.set("quotient", c.borrow().divide(5)?);
                    assert_eq!(scope.get_cloned::<i64>("quotient"), Some(2));
                    Ok(())
                });

                let c = calculator.clone();
                suite.it("reports division by zero", move |_| {
                    let message = c.borrow().divide(0).err().map(|e| e.message().to_owned());
                    assert_eq!(message.as_deref(), Some("division by zero"));
                    Ok(())
                });

                suite.xit("rounds towards negative infinity", |_| Ok(()));
            });
        });
    })
}
