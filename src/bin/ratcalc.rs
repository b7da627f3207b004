//! Single-shot expression evaluator (spec §6's CLI/REPL surface, ambient
//! entry-point half only — no session, history, or keypad loop lives here;
//! those stay out of scope per spec §1).

use clap::Parser as ClapParser;

use ratcalc::parser::{Parser, ParserOptions};
use ratcalc::{base_system, Value};

/// Evaluate one exact-arithmetic expression and print its result.
#[derive(ClapParser, Debug)]
#[command(name = "ratcalc", about = "Exact rational/interval arithmetic evaluator")]
struct Args {
    /// The expression to evaluate, e.g. "1/3 + 1/6" or "0xff + 0b1".
    expression: Vec<String>,

    /// Disable the Integer -> Rational -> Interval promotion/demotion rules;
    /// every result stays at the highest category any operand reached.
    #[arg(long)]
    no_type_aware: bool,

    /// Input base for unprefixed literals, as a radix 2..=62 (default 10).
    #[arg(long, value_name = "RADIX")]
    base: Option<u32>,

    /// Default precision for transcendental-function calls that omit an
    /// explicit [k]; maps to epsilon = 10^-k (k<0) or 1/k (k>=0).
    #[arg(long)]
    precision: Option<i64>,

    /// Treat E/e as an ordinary identifier rather than the scientific-
    /// notation / infix power-of-ten marker.
    #[arg(long)]
    disable_e_notation: bool,

    /// Number of digits to show in the decimal expansion of a Rational
    /// result (the repeating part is marked with '#').
    #[arg(long, default_value_t = 30)]
    digits: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let expression = args.expression.join(" ");
    if expression.trim().is_empty() {
        eprintln!("usage: ratcalc [OPTIONS] <EXPRESSION>");
        std::process::exit(2);
    }

    let mut options = ParserOptions::default()
        .with_type_aware(!args.no_type_aware)
        .with_precision(args.precision)
        .with_disable_e_notation(args.disable_e_notation);
    if let Some(radix) = args.base {
        match base_system::BaseSystem::from_base(radix, format!("base{radix}")) {
            Ok(base) => options = options.with_input_base(base),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }

    let parser = Parser::new(options.clone());
    match parser.evaluate(&expression) {
        Ok(value) => print_value(&value, &options, args.digits),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_value(value: &Value, options: &ParserOptions, digits: usize) {
    match value {
        Value::Integer(i) => println!("{i}"),
        Value::Rational(r) => {
            println!("{}/{}", r.numer(), r.denom());
            println!("= {}", r.to_repeating_base(&options.input_base, digits));
        }
        Value::Interval(iv) => {
            println!(
                "[{}/{}, {}/{}]",
                iv.lo().numer(),
                iv.lo().denom(),
                iv.hi().numer(),
                iv.hi().denom()
            );
            if let Some(rel) = iv.relative_decimal(&options.input_base) {
                println!("= {rel}");
            }
        }
    }
}
