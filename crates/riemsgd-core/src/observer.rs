//! Console progress reporting for solvers.
//!
//! Solvers report progress through a [`SolverObserver`]. Which hooks fire
//! depends on the problem's verbosity: at 2 and above the header and one
//! line per iteration, at 1 and above the termination message. Observers
//! never influence control flow.

use crate::{stopping::Termination, types::Scalar};
use std::fmt::Debug;
use std::io::{self, Write};

/// Receives progress events from a running solver.
pub trait SolverObserver<T: Scalar>: Debug {
    /// Called once before the first iteration.
    fn on_start(&mut self) {}

    /// Called after the cost and gradient of an iteration are known.
    fn on_iteration(&mut self, iteration: usize, cost: T, gradient_norm: T) {
        let _ = (iteration, cost, gradient_norm);
    }

    /// Called once when the stopping criterion fires.
    fn on_termination(&mut self, termination: &Termination) {
        let _ = termination;
    }
}

/// An observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl<T: Scalar> SolverObserver<T> for NoOpObserver {}

/// Header line printed above the iteration table.
pub const ITERATION_HEADER: &str = " iter\t   cost val\t    grad. norm";

/// Writes the iteration table and the termination message to a writer.
///
/// Lines look like
///
/// ```text
///     3	+1.2500000000000000e-01	5.00000000e-01
/// ```
#[derive(Debug)]
pub struct ConsoleObserver<W: Write> {
    writer: W,
}

impl ConsoleObserver<io::Stdout> {
    /// Observer printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleObserver<W> {
    /// Observer printing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, line: &str) {
        if let Err(error) = writeln!(self.writer, "{line}") {
            tracing::warn!(%error, "failed to write solver progress");
        }
    }
}

impl<T: Scalar, W: Write + Debug> SolverObserver<T> for ConsoleObserver<W> {
    fn on_start(&mut self) {
        self.emit(ITERATION_HEADER);
    }

    fn on_iteration(&mut self, iteration: usize, cost: T, gradient_norm: T) {
        let line = format!(
            "{iteration:5}\t{}\t{}",
            format_scientific(<T as Scalar>::to_f64(cost), 16, true),
            format_scientific(<T as Scalar>::to_f64(gradient_norm), 8, false),
        );
        self.emit(&line);
    }

    fn on_termination(&mut self, termination: &Termination) {
        self.emit(&termination.to_string());
        self.emit("");
    }
}

/// Formats `value` in C-style scientific notation (`%.Ne`, or `%+.Ne` when
/// `signed`), with an explicitly signed exponent of at least two digits.
///
/// ```rust
/// use riemsgd_core::observer::format_scientific;
///
/// assert_eq!(format_scientific(0.125, 4, true), "+1.2500e-01");
/// assert_eq!(format_scientific(1234.5, 2, false), "1.23e+03");
/// ```
pub fn format_scientific(value: f64, precision: usize, signed: bool) -> String {
    let sign = if value.is_sign_negative() && !value.is_nan() {
        "-"
    } else if signed {
        "+"
    } else {
        ""
    };

    if value.is_nan() {
        return format!("{sign}nan");
    }
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let formatted = format!("{:.precision$e}", value.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let exponent_sign = if exponent < 0 { '-' } else { '+' };

    format!("{sign}{mantissa}e{exponent_sign}{:02}", exponent.abs())
}
