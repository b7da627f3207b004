//! The expression parser (spec §4.6, C8): grammar, numeric-literal
//! sub-parsers, and the configuration surface, wired together behind a
//! single [`Parser`] entry point (spec §6).

pub mod grammar;
pub mod literal;
pub mod options;

pub use options::ParserOptions;

use crate::base_system::BaseSystem;
use crate::error::Result;
use crate::value::Value;

/// The library's single parsing entry point (spec §6): an expression
/// string plus an options bag, evaluated in one pass with no intermediate
/// token stream retained.
#[derive(Clone, Debug)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Parser { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses and evaluates `input` under this parser's options.
    pub fn evaluate(&self, input: &str) -> Result<Value> {
        grammar::evaluate(input, &self.options)
    }

    /// Parses and evaluates `input` with a one-off `input_base` override,
    /// without disturbing the parser's own configured base.
    pub fn evaluate_in_base(&self, input: &str, base: &BaseSystem) -> Result<Value> {
        let options = self.options.clone().with_input_base(base.clone());
        grammar::evaluate(input, &options)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(ParserOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::Integer;

    #[test]
    fn default_parser_evaluates_simple_expression() {
        let p = Parser::default();
        assert_eq!(p.evaluate("2 + 2").unwrap(), Value::Integer(Integer::from_i64(4)));
    }

    #[test]
    fn evaluate_in_base_overrides_without_mutating_parser() {
        let p = Parser::new(ParserOptions::default().with_input_base(crate::base_system::hexadecimal()));
        let v = p.evaluate_in_base("10", &crate::base_system::decimal()).unwrap();
        assert_eq!(v, Value::Integer(Integer::from_i64(10)));
        // the parser's own (hex) base is untouched by the override
        assert_eq!(p.options().input_base.radix(), 16);
    }
}
