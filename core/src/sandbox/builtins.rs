//! The builtin namespace: functions, `object`, and the exception hierarchy.

use std::cmp::Ordering;
use std::rc::Rc;

use hashbrown::HashMap;

use super::value::{Builtin, Class, Instance, Value};

/// Builtin exception classes and their parents, parents first.
const EXCEPTIONS: [(&str, Option<&str>); 18] = [
    ("BaseException", None),
    ("Exception", Some("BaseException")),
    ("KeyboardInterrupt", Some("BaseException")),
    ("ArithmeticError", Some("Exception")),
    ("ZeroDivisionError", Some("ArithmeticError")),
    ("OverflowError", Some("ArithmeticError")),
    ("LookupError", Some("Exception")),
    ("IndexError", Some("LookupError")),
    ("KeyError", Some("LookupError")),
    ("ValueError", Some("Exception")),
    ("TypeError", Some("Exception")),
    ("NameError", Some("Exception")),
    ("AssertionError", Some("Exception")),
    ("MemoryError", Some("Exception")),
    ("RuntimeError", Some("Exception")),
    ("RecursionError", Some("RuntimeError")),
    ("NotImplementedError", Some("RuntimeError")),
    ("SyntaxError", Some("Exception")),
];

/// An exception on its way out of the evaluator.
#[derive(Debug, Clone)]
pub struct Raised(pub Rc<Instance>);

impl Raised {
    pub fn type_name(&self) -> &str {
        &self.0.class.name
    }

    pub fn message(&self) -> String {
        self.0.message()
    }
}

pub struct Builtins {
    names: HashMap<String, Value>,
    classes: HashMap<&'static str, Rc<Class>>,
    base_exception: Rc<Class>,
    object: Rc<Class>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let object = Rc::new(Class {
            name: "object".to_string(),
            base: None,
        });
        let mut classes: HashMap<&'static str, Rc<Class>> = HashMap::new();
        for (name, parent) in EXCEPTIONS {
            let base = parent.and_then(|parent| classes.get(parent).cloned());
            classes.insert(
                name,
                Rc::new(Class {
                    name: name.to_string(),
                    base,
                }),
            );
        }
        let base_exception = classes.get("BaseException").cloned().unwrap_or_else(|| {
            Rc::new(Class {
                name: "BaseException".to_string(),
                base: None,
            })
        });

        let mut names = HashMap::new();
        for builtin in Builtin::ALL {
            names.insert(builtin.name().to_string(), Value::Builtin(builtin));
        }
        for (name, class) in &classes {
            names.insert(name.to_string(), Value::Class(Rc::clone(class)));
        }
        names.insert("object".to_string(), Value::Class(Rc::clone(&object)));

        Builtins {
            names,
            classes,
            base_exception,
            object,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    pub fn base_exception(&self) -> &Rc<Class> {
        &self.base_exception
    }

    pub fn object(&self) -> &Rc<Class> {
        &self.object
    }

    /// Build an exception of the builtin class `class` carrying `message`.
    pub fn raise(&self, class: &str, message: impl Into<String>) -> Raised {
        let class = self.classes.get(class).cloned().unwrap_or_else(|| {
            Rc::new(Class {
                name: class.to_string(),
                base: Some(Rc::clone(&self.base_exception)),
            })
        });
        Raised(Rc::new(Instance {
            class,
            args: vec![Value::str(message.into())],
        }))
    }

    pub fn type_error(&self, message: impl Into<String>) -> Raised {
        self.raise("TypeError", message)
    }

    pub fn call(&self, builtin: Builtin, args: Vec<Value>) -> Result<Value, Raised> {
        let name = builtin.name();
        match builtin {
            Builtin::Abs => {
                let [x] = self.exactly::<1>(name, args)?;
                match x {
                    Value::Float(f) => Ok(Value::Float(f.abs())),
                    other => match other.as_int() {
                        Some(i) => i
                            .checked_abs()
                            .map(Value::Int)
                            .ok_or_else(|| self.raise("OverflowError", "integer overflow")),
                        None => Err(self.type_error(format!(
                            "bad operand type for abs(): '{}'",
                            other.type_name()
                        ))),
                    },
                }
            }
            Builtin::Bool => {
                let args = self.at_most(name, args, 1)?;
                Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
            }
            Builtin::Float => {
                let args = self.at_most(name, args, 1)?;
                match args.into_iter().next() {
                    None => Ok(Value::Float(0.0)),
                    Some(Value::Str(s)) => parse_float(s.trim()).map(Value::Float).ok_or_else(|| {
                        self.raise(
                            "ValueError",
                            format!("could not convert string to float: {}", Value::Str(s.clone())),
                        )
                    }),
                    Some(other) => other.as_float().map(Value::Float).ok_or_else(|| {
                        self.type_error(format!(
                            "float() argument must be a string or a real number, not '{}'",
                            other.type_name()
                        ))
                    }),
                }
            }
            Builtin::Int => {
                let args = self.at_most(name, args, 1)?;
                match args.into_iter().next() {
                    None => Ok(Value::Int(0)),
                    Some(Value::Float(f)) => self.float_to_int(f),
                    Some(Value::Str(s)) => s.trim().parse().map(Value::Int).map_err(|_| {
                        self.raise(
                            "ValueError",
                            format!(
                                "invalid literal for int() with base 10: {}",
                                Value::Str(s.clone())
                            ),
                        )
                    }),
                    Some(other) => other.as_int().map(Value::Int).ok_or_else(|| {
                        self.type_error(format!(
                            "int() argument must be a string or a real number, not '{}'",
                            other.type_name()
                        ))
                    }),
                }
            }
            Builtin::Len => {
                let [x] = self.exactly::<1>(name, args)?;
                match &x {
                    Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                    Value::List(items) => Ok(Value::Int(items.len() as i64)),
                    other => Err(self.type_error(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    ))),
                }
            }
            Builtin::Max => self.extremum(name, args, Ordering::Greater),
            Builtin::Min => self.extremum(name, args, Ordering::Less),
            Builtin::Repr => {
                let [x] = self.exactly::<1>(name, args)?;
                Ok(Value::str(x.to_string()))
            }
            Builtin::Str => {
                let args = self.at_most(name, args, 1)?;
                Ok(Value::str(
                    args.first().map(Value::to_str).unwrap_or_default(),
                ))
            }
            Builtin::Sum => {
                if args.is_empty() || args.len() > 2 {
                    return Err(self.type_error(format!(
                        "sum() takes at most 2 arguments ({} given)",
                        args.len()
                    )));
                }
                let mut args = args.into_iter();
                let items = self.iterable(args.next().unwrap_or(Value::None))?;
                let mut total = args.next().unwrap_or(Value::Int(0));
                for item in items.iter() {
                    total = self.add_numbers(&total, item)?;
                }
                Ok(total)
            }
        }
    }

    fn exactly<const N: usize>(&self, name: &str, args: Vec<Value>) -> Result<[Value; N], Raised> {
        let given = args.len();
        args.try_into().map_err(|_| {
            self.type_error(format!(
                "{name}() takes exactly {} argument{} ({given} given)",
                N,
                if N == 1 { "" } else { "s" }
            ))
        })
    }

    fn at_most(&self, name: &str, args: Vec<Value>, max: usize) -> Result<Vec<Value>, Raised> {
        if args.len() > max {
            return Err(self.type_error(format!(
                "{name}() takes at most {max} argument ({} given)",
                args.len()
            )));
        }
        Ok(args)
    }

    fn iterable(&self, value: Value) -> Result<Rc<Vec<Value>>, Raised> {
        match value {
            Value::List(items) => Ok(items),
            Value::Str(s) => Ok(Rc::new(s.chars().map(|c| Value::str(c.to_string())).collect())),
            other => Err(self.type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// `max` when `keep` is `Greater`, `min` when it is `Less`.
    fn extremum(&self, name: &str, args: Vec<Value>, keep: Ordering) -> Result<Value, Raised> {
        let items = match args.len() {
            0 => {
                return Err(self.type_error(format!(
                    "{name} expected at least 1 argument, got 0"
                )));
            }
            1 => self.iterable(args.into_iter().next().unwrap_or(Value::None))?,
            _ => Rc::new(args),
        };
        let mut iter = items.iter();
        let mut best = iter
            .next()
            .cloned()
            .ok_or_else(|| self.raise("ValueError", format!("{name}() arg is an empty sequence")))?;
        for item in iter {
            let ordering = item.partial_cmp_values(&best).ok_or_else(|| {
                self.type_error(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    if keep == Ordering::Greater { ">" } else { "<" },
                    item.type_name(),
                    best.type_name()
                ))
            })?;
            if ordering == keep {
                best = item.clone();
            }
        }
        Ok(best)
    }

    fn add_numbers(&self, a: &Value, b: &Value) -> Result<Value, Raised> {
        match (a.as_int(), b.as_int()) {
            (Some(x), Some(y)) => x
                .checked_add(y)
                .map(Value::Int)
                .ok_or_else(|| self.raise("OverflowError", "integer overflow")),
            _ => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => Ok(Value::Float(x + y)),
                _ => Err(self.type_error(format!(
                    "unsupported operand type(s) for +: '{}' and '{}'",
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }

    fn float_to_int(&self, f: f64) -> Result<Value, Raised> {
        if f.is_nan() {
            return Err(self.raise("ValueError", "cannot convert float NaN to integer"));
        }
        if f.is_infinite() {
            return Err(self.raise("OverflowError", "cannot convert float infinity to integer"));
        }
        let truncated = f.trunc();
        if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
            return Err(self.raise("OverflowError", "integer overflow"));
        }
        Ok(Value::Int(truncated as i64))
    }
}

fn parse_float(s: &str) -> Option<f64> {
    match s.to_ascii_lowercase().as_str() {
        "nan" | "+nan" | "-nan" => Some(f64::NAN),
        "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => s.parse().ok(),
    }
}
