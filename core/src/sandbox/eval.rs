//! Tree-walking evaluation of sandbox statements.

use std::cmp::Ordering;
use std::rc::Rc;

use super::builtins::{Builtins, Raised};
use super::namespace::Namespace;
use super::syntax::{BinaryOp, BoolOp, Expr, Stmt, StmtKind, UnaryOp};
use super::value::{Class, Instance, Value};
use super::SandboxOptions;

/// Evaluation state for one run of code against a namespace pair.
pub struct Interpreter<'a> {
    builtins: &'a Builtins,
    globals: &'a mut Namespace,
    locals: &'a mut Namespace,
    options: SandboxOptions,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        builtins: &'a Builtins,
        globals: &'a mut Namespace,
        locals: &'a mut Namespace,
        options: SandboxOptions,
    ) -> Self {
        Interpreter {
            builtins,
            globals,
            locals,
            options,
            depth: 0,
        }
    }

    /// Run `stmts` in order. On error, also returns the line of the failing
    /// statement.
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<(), (usize, Raised)> {
        for stmt in stmts {
            self.exec(stmt).map_err(|raised| (stmt.line, raised))?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), Raised> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
            StmtKind::Assign { name, value } => {
                let value = self.eval(value)?;
                self.locals.set(name.as_str(), value);
            }
            StmtKind::Del(name) => {
                if self.locals.remove(name).is_none() {
                    return Err(self.name_error(name));
                }
            }
            StmtKind::Raise(None) => {
                return Err(self
                    .builtins
                    .raise("RuntimeError", "No active exception to reraise"));
            }
            StmtKind::Raise(Some(expr)) => {
                let value = self.eval(expr)?;
                return Err(self.to_exception(value));
            }
            StmtKind::Assert { test, msg } => {
                if !self.eval(test)?.is_truthy() {
                    let args = match msg {
                        Some(msg) => vec![self.eval(msg)?],
                        None => Vec::new(),
                    };
                    return Err(Raised(Rc::new(Instance {
                        class: self.exception_class("AssertionError"),
                        args,
                    })));
                }
            }
            StmtKind::Pass => {}
            StmtKind::Class { name, base } => {
                let base = match base {
                    Some(expr) => match self.eval(expr)? {
                        Value::Class(class) => class,
                        other => {
                            return Err(self.builtins.type_error(format!(
                                "bases must be types, not '{}'",
                                other.type_name()
                            )));
                        }
                    },
                    None => Rc::clone(self.builtins.object()),
                };
                let class = Class {
                    name: name.clone(),
                    base: Some(base),
                };
                self.locals.set(name.as_str(), Value::Class(Rc::new(class)));
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, Raised> {
        if self.depth >= self.options.max_depth {
            return Err(self
                .builtins
                .raise("RecursionError", "maximum recursion depth exceeded"));
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, Raised> {
        match expr {
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::str(s.as_str())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::None => Ok(Value::None),
            Expr::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }
            Expr::Name(name) => self.lookup(name),
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                self.unary(*op, value)
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                match (op, left.is_truthy()) {
                    (BoolOp::And, false) | (BoolOp::Or, true) => Ok(left),
                    _ => self.eval(right),
                }
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.binary(*op, &left, &right)
            }
            Expr::Call { callable, args } => {
                let callable = self.eval(callable)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callable, args)
            }
            Expr::Index { value, index } => {
                let value = self.eval(value)?;
                let index = self.eval(index)?;
                self.index(&value, &index)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, Raised> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .or_else(|| self.builtins.get(name))
            .cloned()
            .ok_or_else(|| self.name_error(name))
    }

    fn name_error(&self, name: &str) -> Raised {
        self.builtins
            .raise("NameError", format!("name '{name}' is not defined"))
    }

    fn exception_class(&self, name: &str) -> Rc<Class> {
        Rc::clone(&self.builtins.raise(name, "").0.class)
    }

    /// Turn a raised value into an exception: classes are instantiated
    /// without arguments.
    fn to_exception(&self, value: Value) -> Raised {
        let base = self.builtins.base_exception();
        match value {
            Value::Class(class) if class.is_subclass_of(base) => Raised(Rc::new(Instance {
                class,
                args: Vec::new(),
            })),
            Value::Instance(instance) if instance.class.is_subclass_of(base) => Raised(instance),
            _ => self
                .builtins
                .type_error("exceptions must derive from BaseException"),
        }
    }

    fn call(&self, callable: Value, args: Vec<Value>) -> Result<Value, Raised> {
        match callable {
            Value::Builtin(builtin) => self.builtins.call(builtin, args),
            Value::Class(class) => Ok(Value::Instance(Rc::new(Instance { class, args }))),
            other => Err(self.builtins.type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn index(&self, value: &Value, index: &Value) -> Result<Value, Raised> {
        let (len, kind) = match value {
            Value::List(items) => (items.len(), "list"),
            Value::Str(s) => (s.chars().count(), "string"),
            other => {
                return Err(self.builtins.type_error(format!(
                    "'{}' object is not subscriptable",
                    other.type_name()
                )));
            }
        };
        let Some(i) = index.as_int() else {
            return Err(self.builtins.type_error(format!(
                "{kind} indices must be integers, not {}",
                index.type_name()
            )));
        };
        let position = if i < 0 { i + len as i64 } else { i };
        let out_of_range = || {
            self.builtins
                .raise("IndexError", format!("{kind} index out of range"))
        };
        let position = usize::try_from(position)
            .ok()
            .filter(|&p| p < len)
            .ok_or_else(out_of_range)?;
        match value {
            Value::List(items) => items.get(position).cloned().ok_or_else(out_of_range),
            Value::Str(s) => s
                .chars()
                .nth(position)
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(out_of_range),
            _ => Err(out_of_range()),
        }
    }

    fn unary(&self, op: UnaryOp, value: Value) -> Result<Value, Raised> {
        match op {
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOp::Neg | UnaryOp::Pos => {
                let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
                if let Value::Float(f) = value {
                    return Ok(Value::Float(if op == UnaryOp::Neg { -f } else { f }));
                }
                let Some(i) = value.as_int() else {
                    return Err(self.builtins.type_error(format!(
                        "bad operand type for unary {symbol}: '{}'",
                        value.type_name()
                    )));
                };
                if op == UnaryOp::Pos {
                    return Ok(Value::Int(i));
                }
                i.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| self.overflow())
            }
        }
    }

    fn overflow(&self) -> Raised {
        self.builtins.raise("OverflowError", "integer overflow")
    }

    fn unsupported(&self, op: BinaryOp, left: &Value, right: &Value) -> Raised {
        self.builtins.type_error(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))
    }

    fn binary(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Raised> {
        match op {
            BinaryOp::Eq => return Ok(Value::Bool(left == right)),
            BinaryOp::Ne => return Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                return self.compare(op, left, right);
            }
            _ => {}
        }

        match (op, left, right) {
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
                return Ok(Value::str(format!("{a}{b}")));
            }
            (BinaryOp::Add, Value::List(a), Value::List(b)) => {
                return Ok(Value::list(a.iter().chain(b.iter()).cloned().collect()));
            }
            (BinaryOp::Mul, Value::Str(_) | Value::List(_), _)
            | (BinaryOp::Mul, _, Value::Str(_) | Value::List(_)) => {
                return self.repeat(op, left, right);
            }
            _ => {}
        }

        match (left.as_int(), right.as_int()) {
            (Some(a), Some(b)) => self.int_op(op, a, b),
            _ => match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => self.float_op(op, a, b),
                _ => Err(self.unsupported(op, left, right)),
            },
        }
    }

    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Raised> {
        let ordering = left.partial_cmp_values(right);
        let numeric = left.as_float().is_some() && right.as_float().is_some();
        let result = match ordering {
            Some(ordering) => match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            },
            // NaN compares false with everything.
            None if numeric => false,
            None => {
                return Err(self.builtins.type_error(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                )));
            }
        };
        Ok(Value::Bool(result))
    }

    fn repeat(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Raised> {
        let (sequence, count) = match (left.as_int(), right.as_int()) {
            (None, Some(count)) => (left, count),
            (Some(count), None) => (right, count),
            _ => return Err(self.unsupported(op, left, right)),
        };
        let count = usize::try_from(count).unwrap_or(0);
        let len = match sequence {
            Value::Str(s) => s.len(),
            Value::List(items) => items.len(),
            _ => return Err(self.unsupported(op, left, right)),
        };
        // Sizes are checked before anything is allocated.
        let limit = self.options.max_sequence_len;
        let total = len.checked_mul(count).ok_or_else(|| {
            self.builtins
                .raise("OverflowError", "cannot fit 'int' into an index-sized integer")
        })?;
        if total > limit {
            return Err(self.builtins.raise(
                "MemoryError",
                format!("repetition of length {total} exceeds the limit of {limit}"),
            ));
        }
        match sequence {
            Value::Str(s) => Ok(Value::str(s.repeat(count))),
            Value::List(items) => {
                let mut out = Vec::with_capacity(total);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::list(out))
            }
            _ => Err(self.unsupported(op, left, right)),
        }
    }

    fn int_op(&self, op: BinaryOp, a: i64, b: i64) -> Result<Value, Raised> {
        let checked = |result: Option<i64>| result.map(Value::Int).ok_or_else(|| self.overflow());
        match op {
            BinaryOp::Add => checked(a.checked_add(b)),
            BinaryOp::Sub => checked(a.checked_sub(b)),
            BinaryOp::Mul => checked(a.checked_mul(b)),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(self.builtins.raise("ZeroDivisionError", "division by zero"));
                }
                Ok(Value::Float(a as f64 / b as f64))
            }
            BinaryOp::FloorDiv => {
                if b == 0 {
                    return Err(self
                        .builtins
                        .raise("ZeroDivisionError", "integer division or modulo by zero"));
                }
                let q = a.checked_div(b).ok_or_else(|| self.overflow())?;
                let adjust = a % b != 0 && ((a < 0) != (b < 0));
                Ok(Value::Int(if adjust { q - 1 } else { q }))
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return Err(self
                        .builtins
                        .raise("ZeroDivisionError", "integer modulo by zero"));
                }
                let r = a.checked_rem(b).ok_or_else(|| self.overflow())?;
                Ok(Value::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }))
            }
            BinaryOp::Pow => {
                if b < 0 {
                    return self.float_op(op, a as f64, b as f64);
                }
                let exponent = u32::try_from(b).map_err(|_| self.overflow())?;
                checked(a.checked_pow(exponent))
            }
            _ => Err(self.unsupported(op, &Value::Int(a), &Value::Int(b))),
        }
    }

    fn float_op(&self, op: BinaryOp, a: f64, b: f64) -> Result<Value, Raised> {
        let zero = |message: &str| Err(self.builtins.raise("ZeroDivisionError", message));
        let value = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div if b == 0.0 => return zero("division by zero"),
            BinaryOp::Div => a / b,
            BinaryOp::FloorDiv if b == 0.0 => return zero("float floor division by zero"),
            BinaryOp::FloorDiv => (a / b).floor(),
            BinaryOp::Mod if b == 0.0 => return zero("float modulo by zero"),
            BinaryOp::Mod => {
                let r = a % b;
                if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }
            }
            BinaryOp::Pow if a == 0.0 && b < 0.0 => {
                return zero("0.0 cannot be raised to a negative power");
            }
            BinaryOp::Pow => a.powf(b),
            _ => return Err(self.unsupported(op, &Value::Float(a), &Value::Float(b))),
        };
        Ok(Value::Float(value))
    }
}

#[cfg(test)]
#[path = "eval_test.rs"]
mod eval_test;
