use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A class: a builtin exception type, `object`, or one defined by a
/// `class` statement.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub base: Option<Rc<Class>>,
}

impl Class {
    /// The class and its ancestors, nearest first.
    pub fn mro(self: &Rc<Self>) -> impl Iterator<Item = Rc<Class>> {
        std::iter::successors(Some(Rc::clone(self)), |class| class.base.clone())
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<Class>) -> bool {
        self.mro().any(|class| Rc::ptr_eq(&class, other))
    }
}

/// An object created by calling a class.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub args: Vec<Value>,
}

impl Instance {
    /// What `str()` shows for an exception: its single argument, or the
    /// argument tuple.
    pub fn message(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [arg] => arg.to_str(),
            args => format!("({})", join_repr(args)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Bool,
    Float,
    Int,
    Len,
    Max,
    Min,
    Repr,
    Str,
    Sum,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Abs,
        Builtin::Bool,
        Builtin::Float,
        Builtin::Int,
        Builtin::Len,
        Builtin::Max,
        Builtin::Min,
        Builtin::Repr,
        Builtin::Str,
        Builtin::Sum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Bool => "bool",
            Builtin::Float => "float",
            Builtin::Int => "int",
            Builtin::Len => "len",
            Builtin::Max => "max",
            Builtin::Min => "min",
            Builtin::Repr => "repr",
            Builtin::Str => "str",
            Builtin::Sum => "sum",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Builtin(Builtin),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    /// Name of the value's type, as used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Class(_) => "type".to_string(),
            Value::Instance(instance) => instance.class.name.clone(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Builtin(_) | Value::Class(_) | Value::Instance(_) => true,
        }
    }

    /// The value as an integer, if it is a bool or an int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as a float, if it is numeric.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => self.as_int().map(|i| i as f64),
        }
    }

    /// What `str()` returns: strings unquoted, everything else as `repr`.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Instance(instance) if !instance.args.is_empty() || is_exception(instance) => {
                instance.message()
            }
            _ => self.to_string(),
        }
    }

    /// Ordering between numbers, strings, or lists. `None` when the values
    /// cannot be ordered.
    pub fn partial_cmp_values(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    if x != y {
                        return x.partial_cmp_values(y);
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => self.as_float()?.partial_cmp(&other.as_float()?),
            },
        }
    }
}

fn is_exception(instance: &Instance) -> bool {
    instance
        .class
        .mro()
        .any(|class| class.base.is_none() && class.name == "BaseException")
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => a == b,
                _ => match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
            },
        }
    }
}

impl fmt::Display for Value {
    /// The `repr` of the value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", float_repr(*x)),
            Value::Str(s) => write!(f, "{}", str_repr(s)),
            Value::List(items) => write!(f, "[{}]", join_repr(items)),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
            Value::Class(class) => write!(f, "<class '{}'>", class.name),
            Value::Instance(instance) if is_exception(instance) => {
                write!(f, "{}({})", instance.class.name, join_repr(&instance.args))
            }
            Value::Instance(instance) => write!(f, "<{} object>", instance.class.name),
        }
    }
}

fn join_repr(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // `1e20` is written `1e+20`, `1e-5` is written `1e-05`.
        let formatted = format!("{x:e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
