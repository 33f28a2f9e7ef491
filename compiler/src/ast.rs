/// Declared type metadata. Carried on variables, calls and prototypes but
/// never checked: every value is lowered as a double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    I32,
    U32,
    F32,
    UF32,
    Str,
    Char,
    UChar,
    None,
}

impl Type {
    pub fn keyword(&self) -> &'static str {
        match self {
            Type::I32 => "i32",
            Type::U32 => "u32",
            Type::F32 => "f32",
            Type::UF32 => "uf32",
            Type::Str => "str",
            Type::Char => "char",
            Type::UChar => "uchar",
            Type::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    StringLiteral(String),
    Variable {
        name: String,
        ty: Option<Type>,
    },
    Binary {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        arg_types: Vec<Type>,
        return_type: Type,
    },
}

impl Expr {
    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable {
            name: name.into(),
            ty: None,
        }
    }

    pub fn binary(op: char, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        let arg_types = vec![Type::None; args.len()];
        Expr::Call {
            callee: callee.into(),
            args,
            arg_types,
            return_type: Type::None,
        }
    }
}

/// A function signature: name, parameter names and their (unchecked) types.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub arg_types: Vec<Type>,
    pub return_type: Type,
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        let arg_types = vec![Type::None; params.len()];
        Self {
            name: name.into(),
            params,
            arg_types,
            return_type: Type::None,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

/// Anything the code generator can lower.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(Expr),
    Prototype(Prototype),
    Function(Function),
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::Expr(expr)
    }
}

impl From<Prototype> for Node {
    fn from(proto: Prototype) -> Self {
        Node::Prototype(proto)
    }
}

impl From<Function> for Node {
    fn from(function: Function) -> Self {
        Node::Function(function)
    }
}
