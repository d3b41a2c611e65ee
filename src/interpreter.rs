//! Tree-walking evaluator.
//!
//! `eval` dispatches on the node kind and returns an [`Outcome`]: either a
//! plain value or one of the control-flow signals `break`, `continue`,
//! `return`. Blocks stop at the first signal and hand it upward; loops absorb
//! `break`/`continue`, call frames absorb `return`, and a signal that reaches
//! the top level is a SyntaxError.
//!
//! Name resolution is dynamic: a function body looks names up through the
//! scope chain active at call time, not the chain where the function was
//! defined. That is the language's documented behavior, unusual as it is.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ast::{DefineKind, Expr, ExprKind, Program};
use crate::builtins::{self, Builtin, PrintSink};
use crate::error::{EvalError, EvalErrorKind};
use crate::intern::{Interner, Symbol};
use crate::suggest::find_similar;

/// Runtime values. Functions are references to their arena-allocated
/// definition nodes; the AST is immutable during evaluation, so any number
/// of bindings may alias one definition.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(String),
    Function(&'a Expr<'a>),
    /// Absence of a value: an uninitialized declaration, or a call that
    /// finished without `return`.
    Nothing,
}

impl<'a> Value<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::Nothing => "nothing",
        }
    }

    /// Nonzero numbers and non-empty strings are truthy; everything else is
    /// falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Function(_) => false,
            Value::Nothing => false,
        }
    }
}

/// Result of evaluating one node.
#[derive(Debug)]
pub enum Outcome<'a> {
    Value(Value<'a>),
    Break,
    Continue,
    Return(Value<'a>),
}

pub struct Interpreter<'a, S: PrintSink> {
    interner: &'a Interner,
    /// Scope stack; index 0 is the top-level scope, the last entry the
    /// current one. The stack is the scope chain: resolution walks it from
    /// the end.
    env: Vec<HashMap<Symbol, Value<'a>>>,
    builtins: HashMap<Symbol, Builtin>,
    pub out: S,
    /// Line of the deepest node currently being evaluated, for diagnostics.
    line: u32,
}

impl<'a, S: PrintSink> Interpreter<'a, S> {
    pub fn new(interner: &'a Interner, out: S) -> Self {
        Interpreter {
            interner,
            env: vec![HashMap::new()],
            builtins: builtins::registry(interner),
            out,
            line: 1,
        }
    }

    /// Evaluate the top-level sequence, discarding values. A control-flow
    /// signal surviving to this level is a SyntaxError.
    pub fn run(&mut self, program: &Program<'a>) -> Result<(), EvalError> {
        for &expr in program.iter() {
            self.line = expr.line;
            match self.eval(expr)? {
                Outcome::Value(_) => {}
                Outcome::Return(_) => return Err(self.err(EvalErrorKind::IllegalReturn)),
                Outcome::Break => return Err(self.err(EvalErrorKind::IllegalBreak)),
                Outcome::Continue => return Err(self.err(EvalErrorKind::IllegalContinue)),
            }
        }
        Ok(())
    }

    /// Number of live scopes; 1 means only the top-level scope.
    pub fn scope_depth(&self) -> usize {
        self.env.len()
    }

    pub fn eval(&mut self, expr: &'a Expr<'a>) -> Result<Outcome<'a>, EvalError> {
        self.line = expr.line;
        match &expr.kind {
            ExprKind::Integer(v) => Ok(Outcome::Value(Value::Int(*v))),
            ExprKind::Float(v) => Ok(Outcome::Value(Value::Float(*v))),
            ExprKind::Str(s) => Ok(Outcome::Value(Value::Str(
                self.interner.resolve(*s).to_string(),
            ))),
            ExprKind::Variable { define, name } => self.eval_variable(*define, *name),
            ExprKind::Unary { op, operand } => self.eval_unary(expr, *op, *operand),
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(expr, *op, *lhs, *rhs),
            ExprKind::Call { callee, args } => self.eval_call(expr, *callee, *args),
            ExprKind::Function { proto, .. } => self.eval_function_def(expr, *proto),
            ExprKind::Prototype { .. } => Ok(Outcome::Value(Value::Nothing)),
            ExprKind::Block { statements } => self.eval_block(*statements),
            ExprKind::Return { value } => self.eval_return(*value),
            ExprKind::Break => Ok(Outcome::Break),
            ExprKind::Continue => Ok(Outcome::Continue),
            ExprKind::If {
                cond,
                then_block,
                else_block,
                else_if,
            } => {
                self.push_scope();
                let outcome = self.run_if(*cond, *then_block, *else_block, *else_if);
                self.pop_scope();
                outcome
            }
            ExprKind::While { cond, body } => {
                self.push_scope();
                let outcome = self.run_while(*cond, *body);
                self.pop_scope();
                outcome
            }
            ExprKind::DoWhile { body, cond } => {
                self.push_scope();
                let outcome = self.run_do_while(*body, *cond);
                self.pop_scope();
                outcome
            }
            ExprKind::For {
                init,
                test,
                step,
                body,
            } => {
                self.push_scope();
                let outcome = self.run_for(*init, *test, *step, *body);
                self.pop_scope();
                outcome
            }
        }
    }

    /// Statements run in order; the first control-flow signal stops the
    /// block and propagates. Blocks do not open scopes themselves; the
    /// surrounding construct does.
    fn eval_block(&mut self, statements: &'a [&'a Expr<'a>]) -> Result<Outcome<'a>, EvalError> {
        let mut last = Value::Nothing;
        for &stmt in statements {
            self.line = stmt.line;
            match self.eval(stmt)? {
                Outcome::Value(v) => last = v,
                flow => return Ok(flow),
            }
        }
        Ok(Outcome::Value(last))
    }

    fn eval_variable(&mut self, define: DefineKind, name: Symbol) -> Result<Outcome<'a>, EvalError> {
        if let Some(v) = self.lookup(name) {
            return Ok(Outcome::Value(v.clone()));
        }
        if define == DefineKind::None {
            Err(self.reference_error(name))
        } else {
            // declaration without initializer: nothing is bound yet
            Ok(Outcome::Value(Value::Nothing))
        }
    }

    fn eval_return(&mut self, value: Option<&'a Expr<'a>>) -> Result<Outcome<'a>, EvalError> {
        match value {
            Some(e) => match self.eval(e)? {
                Outcome::Value(v) => Ok(Outcome::Return(v)),
                flow => Ok(flow),
            },
            None => Ok(Outcome::Return(Value::Nothing)),
        }
    }

    /// Evaluating a definition registers the function by name in the current
    /// scope and yields the function as a value, so anonymous functions can
    /// be bound with `=`.
    fn eval_function_def(
        &mut self,
        expr: &'a Expr<'a>,
        proto: &'a Expr<'a>,
    ) -> Result<Outcome<'a>, EvalError> {
        if let ExprKind::Prototype { name, .. } = &proto.kind {
            if *name != Symbol::EMPTY {
                self.define(*name, Value::Function(expr));
            }
        }
        Ok(Outcome::Value(Value::Function(expr)))
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    fn run_if(
        &mut self,
        cond: &'a Expr<'a>,
        then_block: Option<&'a Expr<'a>>,
        else_block: Option<&'a Expr<'a>>,
        else_if: Option<&'a Expr<'a>>,
    ) -> Result<Outcome<'a>, EvalError> {
        let cond_value = match self.eval(cond)? {
            Outcome::Value(v) => v,
            flow => return Ok(flow),
        };

        if cond_value.is_truthy() {
            match then_block {
                Some(b) => self.eval(b),
                None => Ok(Outcome::Value(Value::Nothing)),
            }
        } else if let Some(chain) = else_if {
            self.eval(chain)
        } else if let Some(b) = else_block {
            self.eval(b)
        } else {
            Ok(Outcome::Value(Value::Nothing))
        }
    }

    fn run_while(
        &mut self,
        cond: &'a Expr<'a>,
        body: Option<&'a Expr<'a>>,
    ) -> Result<Outcome<'a>, EvalError> {
        loop {
            let c = match self.eval(cond)? {
                Outcome::Value(v) => v,
                flow => return Ok(flow),
            };
            if !c.is_truthy() {
                return Ok(Outcome::Value(Value::Nothing));
            }

            if let Some(body) = body {
                match self.eval(body)? {
                    Outcome::Break => return Ok(Outcome::Value(Value::Nothing)),
                    Outcome::Return(v) => return Ok(Outcome::Return(v)),
                    Outcome::Continue | Outcome::Value(_) => {}
                }
            }
        }
    }

    fn run_do_while(
        &mut self,
        body: &'a Expr<'a>,
        cond: &'a Expr<'a>,
    ) -> Result<Outcome<'a>, EvalError> {
        loop {
            match self.eval(body)? {
                Outcome::Break => return Ok(Outcome::Value(Value::Nothing)),
                Outcome::Return(v) => return Ok(Outcome::Return(v)),
                Outcome::Continue | Outcome::Value(_) => {}
            }

            let c = match self.eval(cond)? {
                Outcome::Value(v) => v,
                flow => return Ok(flow),
            };
            if !c.is_truthy() {
                return Ok(Outcome::Value(Value::Nothing));
            }
        }
    }

    fn run_for(
        &mut self,
        init: &'a Expr<'a>,
        test: &'a Expr<'a>,
        step: &'a Expr<'a>,
        body: Option<&'a Expr<'a>>,
    ) -> Result<Outcome<'a>, EvalError> {
        match self.eval(init)? {
            Outcome::Value(_) => {}
            flow => return Ok(flow),
        }

        loop {
            let c = match self.eval(test)? {
                Outcome::Value(v) => v,
                flow => return Ok(flow),
            };
            if !c.is_truthy() {
                return Ok(Outcome::Value(Value::Nothing));
            }

            if let Some(body) = body {
                match self.eval(body)? {
                    Outcome::Break => return Ok(Outcome::Value(Value::Nothing)),
                    Outcome::Return(v) => return Ok(Outcome::Return(v)),
                    Outcome::Continue | Outcome::Value(_) => {}
                }
            }

            // the step runs after every pass, including ones a continue cut
            // short
            match self.eval(step)? {
                Outcome::Value(_) => {}
                flow => return Ok(flow),
            }
        }
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn eval_unary(
        &mut self,
        expr: &'a Expr<'a>,
        op: Symbol,
        operand: &'a Expr<'a>,
    ) -> Result<Outcome<'a>, EvalError> {
        let v = match self.eval(operand)? {
            Outcome::Value(v) => coerce_operand(v),
            flow => return Ok(flow),
        };
        self.line = expr.line;

        let op_str = self.interner.resolve(op);
        let result = match op_str {
            "-" => self.apply_neg(v)?,
            "+" => v,
            "!" => Value::Int(i64::from(!v.is_truthy())),
            "~" => Value::Int(!self.to_int(v, "~")?),
            _ => {
                return Err(self.err(EvalErrorKind::InvalidOperator {
                    op: op_str.to_string(),
                }))
            }
        };
        Ok(Outcome::Value(result))
    }

    fn eval_binary(
        &mut self,
        expr: &'a Expr<'a>,
        op: Symbol,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    ) -> Result<Outcome<'a>, EvalError> {
        let op_str = self.interner.resolve(op);
        match op_str {
            "=" => self.eval_assign(expr, lhs, rhs),
            "&&" => self.eval_and(lhs, rhs),
            "||" => self.eval_or(lhs, rhs),
            "," => {
                // sequencing: evaluate and discard the left operand
                match self.eval(lhs)? {
                    Outcome::Value(_) => {}
                    flow => return Ok(flow),
                }
                self.eval(rhs)
            }
            _ => {
                let lv = match self.eval(lhs)? {
                    Outcome::Value(v) => coerce_operand(v),
                    flow => return Ok(flow),
                };
                let rv = match self.eval(rhs)? {
                    Outcome::Value(v) => coerce_operand(v),
                    flow => return Ok(flow),
                };
                self.line = expr.line;
                Ok(Outcome::Value(self.apply_binary(op_str, lv, rv)?))
            }
        }
    }

    /// `var` binds in the top-level scope, `let` in the current one, and a
    /// bare name in the scope that already owns it, falling back to the
    /// current scope. This is the only place the three forms diverge.
    fn eval_assign(
        &mut self,
        expr: &'a Expr<'a>,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    ) -> Result<Outcome<'a>, EvalError> {
        let rv = match self.eval(rhs)? {
            Outcome::Value(v) => v,
            flow => return Ok(flow),
        };
        self.line = expr.line;

        match &lhs.kind {
            ExprKind::Variable { define, name } => {
                match define {
                    DefineKind::Var => self.define_top(*name, rv.clone()),
                    DefineKind::Let => self.define(*name, rv.clone()),
                    DefineKind::None => self.assign_auto(*name, rv.clone()),
                }
                Ok(Outcome::Value(rv))
            }
            _ => Err(self.err(EvalErrorKind::AssignTarget)),
        }
    }

    /// Short-circuit and: the right operand runs only when the left is
    /// truthy, and the result is whichever operand decided it.
    fn eval_and(&mut self, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>) -> Result<Outcome<'a>, EvalError> {
        let lv = match self.eval(lhs)? {
            Outcome::Value(v) => coerce_operand(v),
            flow => return Ok(flow),
        };
        if !lv.is_truthy() {
            return Ok(Outcome::Value(lv));
        }
        match self.eval(rhs)? {
            Outcome::Value(v) => Ok(Outcome::Value(coerce_operand(v))),
            flow => Ok(flow),
        }
    }

    fn eval_or(&mut self, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>) -> Result<Outcome<'a>, EvalError> {
        let lv = match self.eval(lhs)? {
            Outcome::Value(v) => coerce_operand(v),
            flow => return Ok(flow),
        };
        if lv.is_truthy() {
            return Ok(Outcome::Value(lv));
        }
        match self.eval(rhs)? {
            Outcome::Value(v) => Ok(Outcome::Value(coerce_operand(v))),
            flow => Ok(flow),
        }
    }

    fn apply_binary(
        &self,
        op: &str,
        lv: Value<'a>,
        rv: Value<'a>,
    ) -> Result<Value<'a>, EvalError> {
        match op {
            "+" => self.apply_add(lv, rv),
            "-" => self.apply_sub(lv, rv),
            "*" => self.apply_mul(lv, rv),
            "/" => self.apply_div(lv, rv),
            "%" => self.apply_mod(lv, rv),
            ">" | "<" | ">=" | "<=" => self.apply_compare(op, lv, rv),
            "==" => Ok(Value::Int(i64::from(self.values_equal(op, lv, rv)?))),
            "!=" => Ok(Value::Int(i64::from(!self.values_equal(op, lv, rv)?))),
            "&" | "|" | "^" | "<<" | ">>" => self.apply_bitwise(op, lv, rv),
            _ => Err(self.err(EvalErrorKind::InvalidOperator { op: op.to_string() })),
        }
    }

    fn apply_add(&self, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 + b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a + b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Int(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Str(a), Value::Int(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Float(a), Value::Str(b)) => Ok(Value::Str(format!("{:.6}{}", a, b))),
            (Value::Str(a), Value::Float(b)) => Ok(Value::Str(format!("{}{:.6}", a, b))),
            _ => Err(self.invalid("+")),
        }
    }

    fn apply_sub(&self, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(b))),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 - b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a - b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
            _ => Err(self.invalid("-")),
        }
    }

    fn apply_mul(&self, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(b))),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 * b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a * b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
            _ => Err(self.invalid("*")),
        }
    }

    fn apply_div(&self, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => {
                if b == 0 {
                    return Err(self.err(EvalErrorKind::DivisionByZero {
                        op: "/".to_string(),
                    }));
                }
                Ok(Value::Int(a.wrapping_div(b)))
            }
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 / b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a / b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
            _ => Err(self.invalid("/")),
        }
    }

    fn apply_mod(&self, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => {
                if b == 0 {
                    return Err(self.err(EvalErrorKind::DivisionByZero {
                        op: "%".to_string(),
                    }));
                }
                Ok(Value::Int(a.wrapping_rem(b)))
            }
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 % b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a % b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a % b)),
            _ => Err(self.invalid("%")),
        }
    }

    fn apply_neg(&self, v: Value<'a>) -> Result<Value<'a>, EvalError> {
        match v {
            Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(self.invalid("-")),
        }
    }

    /// `< > <= >=` mix int and float freely and yield integer 0/1.
    fn apply_compare(&self, op: &str, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        let ord = match (&lv, &rv) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => return Err(self.invalid(op)),
        };
        Ok(Value::Int(i64::from(ordering_matches(op, ord))))
    }

    /// `==` over numbers (mixed int/float) and strings; anything else has no
    /// equality rule. `!=` is the negation and shares the same domain.
    fn values_equal(&self, op: &str, lv: Value<'a>, rv: Value<'a>) -> Result<bool, EvalError> {
        match (&lv, &rv) {
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Int(a), Value::Float(b)) => Ok(*a as f64 == *b),
            (Value::Float(a), Value::Int(b)) => Ok(*a == *b as f64),
            (Value::Float(a), Value::Float(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            _ => Err(self.invalid(op)),
        }
    }

    /// Bitwise operators coerce both operands to i64, truncating floats
    /// toward zero. Shift counts are masked to the i64 width.
    fn apply_bitwise(&self, op: &str, lv: Value<'a>, rv: Value<'a>) -> Result<Value<'a>, EvalError> {
        let a = self.to_int(lv, op)?;
        let b = self.to_int(rv, op)?;
        let v = match op {
            "&" => a & b,
            "|" => a | b,
            "^" => a ^ b,
            "<<" => a.wrapping_shl(b as u32),
            ">>" => a.wrapping_shr(b as u32),
            _ => {
                return Err(self.err(EvalErrorKind::InvalidOperator { op: op.to_string() }));
            }
        };
        Ok(Value::Int(v))
    }

    fn to_int(&self, v: Value<'a>, op: &str) -> Result<i64, EvalError> {
        match v {
            Value::Int(n) => Ok(n),
            Value::Float(f) => Ok(f as i64),
            _ => Err(self.invalid(op)),
        }
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn eval_call(
        &mut self,
        expr: &'a Expr<'a>,
        callee: Symbol,
        args: &'a [&'a Expr<'a>],
    ) -> Result<Outcome<'a>, EvalError> {
        if let Some(&builtin) = self.builtins.get(&callee) {
            return self.exec_builtin(builtin, args);
        }

        let callee_value = match self.lookup(callee) {
            Some(v) => v.clone(),
            None => return Err(self.reference_error(callee)),
        };
        let func = match callee_value {
            Value::Function(f) => f,
            _ => {
                return Err(self.err(EvalErrorKind::NotAFunction {
                    name: self.interner.resolve(callee).to_string(),
                }))
            }
        };

        self.call_function(expr, callee, func, args)
    }

    fn call_function(
        &mut self,
        expr: &'a Expr<'a>,
        callee: Symbol,
        func: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> Result<Outcome<'a>, EvalError> {
        let (proto, body) = match &func.kind {
            ExprKind::Function { proto, body } => (*proto, *body),
            _ => {
                return Err(self.err(EvalErrorKind::NotAFunction {
                    name: self.interner.resolve(callee).to_string(),
                }))
            }
        };
        let body = match body {
            Some(b) => b,
            None => {
                return Err(self.err(EvalErrorKind::MissingFunctionBody {
                    name: self.interner.resolve(callee).to_string(),
                }))
            }
        };
        let params: &'a [&'a Expr<'a>] = match &proto.kind {
            ExprKind::Prototype { params, .. } => *params,
            _ => &[],
        };

        // All arguments are evaluated in the caller's frame, left to right;
        // extras beyond the parameter count run for their side effects only.
        let mut arg_values = Vec::with_capacity(args.len());
        for &arg in args {
            match self.eval(arg)? {
                Outcome::Value(v) => arg_values.push(v),
                flow => return Ok(flow),
            }
        }

        self.push_scope();
        if let Err(e) = self.bind_parameters(params, arg_values) {
            self.pop_scope();
            return Err(e);
        }

        let outcome = self.eval(body);
        self.pop_scope();
        self.line = expr.line;

        match outcome? {
            Outcome::Return(v) => Ok(Outcome::Value(v)),
            Outcome::Break => Err(self.err(EvalErrorKind::IllegalBreak)),
            Outcome::Continue => Err(self.err(EvalErrorKind::IllegalContinue)),
            Outcome::Value(_) => Ok(Outcome::Value(Value::Nothing)),
        }
    }

    fn bind_parameters(
        &mut self,
        params: &'a [&'a Expr<'a>],
        arg_values: Vec<Value<'a>>,
    ) -> Result<(), EvalError> {
        let supplied = arg_values.len();
        let mut arg_values = arg_values.into_iter();

        for (i, &param) in params.iter().enumerate() {
            if i < supplied {
                let value = arg_values.next().unwrap_or(Value::Nothing);
                let name = self.param_name(param)?;
                self.define(name, value);
            } else {
                // Defaults are expressions, typically `b = 10`, re-evaluated
                // in the callee scope on every call. A bare parameter with no
                // argument stays unbound.
                match &param.kind {
                    ExprKind::Variable { .. } => {}
                    _ => {
                        self.eval(param)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn param_name(&self, param: &'a Expr<'a>) -> Result<Symbol, EvalError> {
        // peel `name = default` down to the variable on its left
        let target = match &param.kind {
            ExprKind::Binary { op, lhs, .. } if self.interner.resolve(*op) == "=" => *lhs,
            _ => param,
        };
        target
            .variable_name()
            .ok_or_else(|| self.err(EvalErrorKind::InvalidParameter))
    }

    // ------------------------------------------------------------------
    // Built-ins
    // ------------------------------------------------------------------

    fn exec_builtin(
        &mut self,
        builtin: Builtin,
        args: &'a [&'a Expr<'a>],
    ) -> Result<Outcome<'a>, EvalError> {
        match builtin {
            Builtin::Print => self.builtin_print(args),
        }
    }

    /// One output line per argument. An argument that is an unresolved bare
    /// variable prints a warning naming it instead of raising; zero
    /// arguments print a single empty line.
    fn builtin_print(&mut self, args: &'a [&'a Expr<'a>]) -> Result<Outcome<'a>, EvalError> {
        if args.is_empty() {
            self.out.write_line("");
            return Ok(Outcome::Value(Value::Nothing));
        }

        for &arg in args {
            if let ExprKind::Variable {
                define: DefineKind::None,
                name,
            } = &arg.kind
            {
                if self.lookup(*name).is_none() {
                    let warning =
                        format!("Warning: '{}' is not defined.", self.interner.resolve(*name));
                    self.out.write_line(&warning);
                    continue;
                }
            }

            let v = match self.eval(arg)? {
                Outcome::Value(v) => v,
                flow => return Ok(flow),
            };
            let rendered = self.render(&v);
            self.out.write_line(&rendered);
        }
        Ok(Outcome::Value(Value::Nothing))
    }

    /// Rendering for `print`: decimal integers, shortest round-trip floats,
    /// raw string contents. A call that returned nothing displays as 0.
    fn render(&self, v: &Value<'a>) -> String {
        match v {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                let mut buf = ryu::Buffer::new();
                buf.format(*f).to_string()
            }
            Value::Str(s) => s.clone(),
            Value::Function(f) => {
                let name = function_name(f);
                let name = self.interner.resolve(name);
                if name.is_empty() {
                    "function".to_string()
                } else {
                    format!("function {}", name)
                }
            }
            Value::Nothing => "0".to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    fn push_scope(&mut self) {
        self.env.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        if self.env.len() > 1 {
            self.env.pop();
        }
    }

    /// Walk the chain from the current scope outward.
    fn lookup(&self, name: Symbol) -> Option<&Value<'a>> {
        for scope in self.env.iter().rev() {
            if let Some(v) = scope.get(&name) {
                return Some(v);
            }
        }
        None
    }

    /// Bind in the current scope (`let`, parameters, function definitions).
    fn define(&mut self, name: Symbol, value: Value<'a>) {
        if let Some(scope) = self.env.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Bind in the top-level scope (`var`).
    fn define_top(&mut self, name: Symbol, value: Value<'a>) {
        if let Some(scope) = self.env.first_mut() {
            scope.insert(name, value);
        }
    }

    /// Bare assignment: update the owning scope, or create the name in the
    /// current scope when no scope owns it.
    fn assign_auto(&mut self, name: Symbol, value: Value<'a>) {
        match self.env.iter().rposition(|s| s.contains_key(&name)) {
            Some(i) => {
                self.env[i].insert(name, value);
            }
            None => self.define(name, value),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn err(&self, kind: EvalErrorKind) -> EvalError {
        EvalError::new(kind, self.line)
    }

    fn invalid(&self, op: &str) -> EvalError {
        self.err(EvalErrorKind::InvalidOperand { op: op.to_string() })
    }

    fn reference_error(&self, name: Symbol) -> EvalError {
        let word = self.interner.resolve(name);
        let mut candidates: Vec<&str> = Vec::new();
        for scope in self.env.iter().rev() {
            for sym in scope.keys() {
                candidates.push(self.interner.resolve(*sym));
            }
        }
        let suggestion = find_similar(word, &candidates, 2).map(|s| s.to_string());
        EvalError::new(
            EvalErrorKind::Reference {
                name: word.to_string(),
                suggestion,
            },
            self.line,
        )
    }
}

/// A missing value participates in operators as integer 0.
fn coerce_operand(v: Value<'_>) -> Value<'_> {
    match v {
        Value::Nothing => Value::Int(0),
        v => v,
    }
}

fn ordering_matches(op: &str, ord: Option<Ordering>) -> bool {
    match ord {
        // NaN comparisons are all false
        None => false,
        Some(ord) => match op {
            ">" => ord == Ordering::Greater,
            "<" => ord == Ordering::Less,
            ">=" => ord != Ordering::Less,
            "<=" => ord != Ordering::Greater,
            _ => false,
        },
    }
}

fn function_name<'a>(func: &'a Expr<'a>) -> Symbol {
    if let ExprKind::Function { proto, .. } = &func.kind {
        if let ExprKind::Prototype { name, .. } = &proto.kind {
            return *name;
        }
    }
    Symbol::EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::AstArena;
    use crate::builtins::BufferSink;
    use crate::parser::Parser;

    fn run(source: &str) -> Vec<String> {
        let result = crate::run_source(source);
        assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
        result.lines
    }

    fn run_err(source: &str) -> String {
        let result = crate::run_source(source);
        result.error.expect("expected an error")
    }

    #[test]
    fn arithmetic_keeps_integers_integral() {
        assert_eq!(run("print(7 / 2); print(7 % 2);"), vec!["3", "1"]);
    }

    #[test]
    fn mixed_arithmetic_produces_floats() {
        assert_eq!(run("print(1 + 2.5); print(2.5 * 2); print(7.0 / 2);"), vec![
            "3.5", "5.0", "3.5",
        ]);
    }

    #[test]
    fn string_concatenation_coerces_numbers() {
        assert_eq!(
            run(r#"print("a" + 1); print(1 + "a"); print(1.5 + "x");"#),
            vec!["a1", "1a", "1.500000x"]
        );
    }

    #[test]
    fn string_subtraction_is_an_error() {
        let err = run_err(r#"print("a" - 1);"#);
        assert!(err.contains("Invalid '-' expression."), "got: {}", err);
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(
            run("print(1 < 2); print(2 < 1); print(2 <= 2); print(1.5 > 1); print(2 >= 3);"),
            vec!["1", "0", "1", "1", "0"]
        );
    }

    #[test]
    fn equality_on_strings_and_numbers() {
        assert_eq!(
            run(r#"print("ab" == "ab"); print("ab" == "ac"); print(1 == 1.0); print(1 != 2);"#),
            vec!["1", "0", "1", "1"]
        );
    }

    #[test]
    fn equality_between_string_and_number_is_an_error() {
        let err = run_err(r#"print("1" == 1);"#);
        assert!(err.contains("Invalid '==' expression."), "got: {}", err);
    }

    #[test]
    fn logical_operators_return_deciding_operand() {
        assert_eq!(
            run(r#"print(0 || "hello"); print("hello" && 42); print(0 && 9); print(3 || 9);"#),
            vec!["hello", "42", "0", "3"]
        );
    }

    #[test]
    fn short_circuit_skips_right_operand() {
        // the right operand would raise a ReferenceError if evaluated
        assert_eq!(run("print(0 && missing); print(1 || missing);"), vec!["0", "1"]);
    }

    #[test]
    fn bitwise_operators_truncate_floats() {
        assert_eq!(
            run("print(6 & 3); print(6 | 3); print(6 ^ 3); print(1 << 3); print(16 >> 2); print(2.9 & 3);"),
            vec!["2", "7", "5", "8", "4", "2"]
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            run("print(-3); print(- -3); print(!0); print(!5); print(~0); print(+7);"),
            vec!["-3", "3", "1", "0", "-1", "7"]
        );
    }

    #[test]
    fn unary_plus_is_identity_on_strings() {
        assert_eq!(run(r#"print(+"abc");"#), vec!["abc"]);
    }

    #[test]
    fn comma_operator_returns_right_operand() {
        assert_eq!(run("var x = (1, 2, 3); print(x);"), vec!["3"]);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = run_err("print(1 / 0);");
        assert!(err.contains("division by zero"), "got: {}", err);
        let err = run_err("print(1 % 0);");
        assert!(err.contains("division by zero"), "got: {}", err);
    }

    #[test]
    fn truthiness_of_strings() {
        assert_eq!(run(r#"print(!!"abc"); print(!!"");"#), vec!["1", "0"]);
    }

    #[test]
    fn var_binds_in_top_scope() {
        assert_eq!(
            run("function f() { var g = 99; } f(); print(g);"),
            vec!["99"]
        );
    }

    #[test]
    fn let_shadows_only_inside_its_block() {
        assert_eq!(
            run("var x = 1; if (1) { let x = 2; print(x); } print(x);"),
            vec!["2", "1"]
        );
    }

    #[test]
    fn bare_assignment_updates_owning_scope() {
        assert_eq!(
            run("var s = 0; if (1) { s = 5; } print(s);"),
            vec!["5"]
        );
    }

    #[test]
    fn unresolved_read_is_reference_error() {
        let err = run_err("print(1 + missing);");
        assert!(
            err.contains("ReferenceError: 'missing' is not defined."),
            "got: {}",
            err
        );
    }

    #[test]
    fn declaration_without_initializer_is_allowed() {
        assert_eq!(run("var x; let y; print(1);"), vec!["1"]);
    }

    #[test]
    fn functions_resolve_names_dynamically() {
        // g reads x through the scope chain active at call time
        assert_eq!(
            run("function g() { return x; } function h() { let x = 7; return g(); } print(h());"),
            vec!["7"]
        );
    }

    #[test]
    fn default_parameters_reevaluate_each_call() {
        assert_eq!(
            run("function f(a, b = a + 1) { return b; } print(f(1)); print(f(10));"),
            vec!["2", "11"]
        );
    }

    #[test]
    fn extra_arguments_are_evaluated_and_discarded() {
        assert_eq!(
            run("var n = 0; function f(a) { return a; } print(f(1, n = 9)); print(n);"),
            vec!["1", "9"]
        );
    }

    #[test]
    fn missing_return_yields_nothing() {
        assert_eq!(run("function f() { 1 + 1; } print(f());"), vec!["0"]);
    }

    #[test]
    fn anonymous_function_bound_by_assignment() {
        assert_eq!(
            run("var f = function (x) { return x * 2; }; print(f(21));"),
            vec!["42"]
        );
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        let err = run_err("var f = 3; f();");
        assert!(err.contains("'f' is not a function."), "got: {}", err);
    }

    #[test]
    fn break_outside_loop_is_illegal() {
        let err = run_err("function f() { break; } f();");
        assert!(
            err.contains("Uncaught SyntaxError: Illegal break statement"),
            "got: {}",
            err
        );
    }

    #[test]
    fn return_at_top_level_is_illegal() {
        let err = run_err("return 1;");
        assert!(
            err.contains("Uncaught SyntaxError: Illegal return statement"),
            "got: {}",
            err
        );
    }

    #[test]
    fn eval_error_carries_line_number() {
        let err = run_err("var a = 1;\nvar b = 2;\nprint(missing);\n");
        assert!(err.contains("in line: 3"), "got: {}", err);
    }

    #[test]
    fn reference_error_suggests_near_miss() {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let program = Parser::new("var total = 10; print(1 + totl);", &mut interner, &arena)
            .parse()
            .expect("parse failed");

        let mut interp = Interpreter::new(&interner, BufferSink::default());
        let err = interp.run(&program).unwrap_err();
        match err.kind {
            EvalErrorKind::Reference { name, suggestion } => {
                assert_eq!(name, "totl");
                assert_eq!(suggestion.as_deref(), Some("total"));
            }
            other => panic!("expected a ReferenceError, got {:?}", other),
        }
    }

    #[test]
    fn scope_stack_balanced_after_top_level_statements() {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let source = "var s = 0;\nfor (let i = 0; i < 3; i = i + 1) { if (i == 1) { s = s + i; } }\nfunction f(a) { while (a > 0) { a = a - 1; } return a; }\nf(3);\n";
        let program = Parser::new(source, &mut interner, &arena)
            .parse()
            .expect("parse failed");

        let mut interp = Interpreter::new(&interner, BufferSink::default());
        interp.run(&program).expect("run failed");
        assert_eq!(interp.scope_depth(), 1);
    }

    #[test]
    fn print_renders_floats_shortest() {
        assert_eq!(run("print(1.5); print(3.0); print(0.1 + 0.2);"), vec![
            "1.5",
            "3.0",
            "0.30000000000000004",
        ]);
    }

    #[test]
    fn print_without_arguments_emits_blank_line() {
        assert_eq!(run("print();"), vec![""]);
    }

    #[test]
    fn print_warns_on_undefined_bare_variable() {
        assert_eq!(
            run("print(ghost);"),
            vec!["Warning: 'ghost' is not defined."]
        );
    }

    #[test]
    fn print_renders_functions_by_name() {
        assert_eq!(
            run("function f() { return 1; } print(f);"),
            vec!["function f"]
        );
    }
}
