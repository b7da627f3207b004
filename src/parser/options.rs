//! The parser's configuration surface (spec §6): the only "configuration"
//! that exists at the core layer — no environment variables, no files.

use crate::base_system::{self, BaseSystem};

#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// Enables the promotion/demotion rules of spec §4.6. `false` disables
    /// all type narrowing: every result stays at the highest category any
    /// operand reached.
    pub type_aware: bool,
    /// Active `BaseSystem` for unprefixed numeric literals.
    pub input_base: BaseSystem,
    /// Default precision parameter fed to transcendental-function calls
    /// that omit an explicit `[k]`.
    pub precision: Option<i64>,
    /// Treats `E`/`e` as an ordinary identifier character rather than the
    /// scientific-notation / infix-multiply-by-power-of-ten marker.
    pub disable_e_notation: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            type_aware: true,
            input_base: base_system::decimal(),
            precision: None,
            disable_e_notation: false,
        }
    }
}

impl ParserOptions {
    pub fn with_input_base(mut self, base: BaseSystem) -> Self {
        self.input_base = base;
        self
    }

    pub fn with_type_aware(mut self, type_aware: bool) -> Self {
        self.type_aware = type_aware;
        self
    }

    pub fn with_precision(mut self, precision: Option<i64>) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_disable_e_notation(mut self, disable: bool) -> Self {
        self.disable_e_notation = disable;
        self
    }
}
