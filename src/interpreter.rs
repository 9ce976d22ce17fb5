use crate::ast::{Expr, ExprId, ExprKind, Literal, Stmt};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::{Callable, Instance, LoxClass, LoxFunction, NativeFunction, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Replaces the textbook's exception-based `Return`/`Break` with an
/// explicit non-error control-flow signal that `execute` propagates
/// through `?` alongside genuine runtime errors.
enum Flow {
    Error(RuntimeError),
    Return(Value),
    Break,
}

impl From<RuntimeError> for Flow {
    fn from(err: RuntimeError) -> Self {
        Flow::Error(err)
    }
}

type ExecResult<T = ()> = Result<T, Flow>;
type EvalResult = Result<Value, RuntimeError>;

pub struct Interpreter<'a> {
    globals: Rc<Environment>,
    environment: RefCell<Rc<Environment>>,
    locals: &'a HashMap<ExprId, usize>,
    diagnostics: &'a Diagnostics,
}

impl<'a> Interpreter<'a> {
    pub fn new(locals: &'a HashMap<ExprId, usize>, diagnostics: &'a Diagnostics) -> Self {
        let globals = Environment::new();
        globals.define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: Box::new(|_args| {
                    let secs = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs_f64())
                        .unwrap_or(0.0);
                    Ok(Value::Number(secs))
                }),
            }))),
        );
        Interpreter {
            environment: RefCell::new(globals.clone()),
            globals,
            locals,
            diagnostics,
        }
    }

    /// Executes a whole program (or a single REPL line). Stops at the
    /// first runtime error, terminating the current top-level statement;
    /// compile errors are expected to have already been checked by the
    /// caller before this is invoked.
    pub fn interpret(&self, statements: &[Stmt]) {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Flow::Error(err)) => {
                    self.diagnostics.runtime_error(&err);
                    return;
                }
                Err(Flow::Return(_)) | Err(Flow::Break) => {
                    unreachable!("resolver/parser reject return/break outside function/loop")
                }
            }
        }
    }

    fn execute(&self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{}", value.stringify());
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow().define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let new_env = Environment::with_parent(self.environment.borrow().clone());
                self.execute_block(statements, new_env)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::Break { .. } => Err(Flow::Break),
            Stmt::Function(decl) => {
                let function = LoxFunction::new(decl.clone(), self.environment.borrow().clone(), false);
                self.environment.borrow().define(
                    decl.name.lexeme.clone(),
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Flow::Return(value))
            }
            Stmt::Class { name, methods } => {
                self.environment.borrow().define(name.lexeme.clone(), Value::Nil);

                let mut method_table = HashMap::new();
                for method in methods {
                    let is_initializer = method.name.lexeme == "init";
                    let function =
                        LoxFunction::new(method.clone(), self.environment.borrow().clone(), is_initializer);
                    method_table.insert(method.name.lexeme.clone(), Rc::new(function));
                }

                let class = Rc::new(LoxClass {
                    name: name.lexeme.clone(),
                    methods: method_table,
                });
                self.environment
                    .borrow()
                    .assign(name, Value::Callable(Callable::Class(class)))
                    .expect("class name was just defined in this scope");
                Ok(())
            }
        }
    }

    /// Runs `statements` inside `env`, restoring the previous
    /// environment on every exit path: normal completion, a
    /// `return`/`break` signal, or a propagated runtime error.
    fn execute_block(&self, statements: &[Stmt], env: Rc<Environment>) -> ExecResult {
        let previous = self.environment.replace(env);
        let result = (|| {
            for stmt in statements {
                self.execute(stmt)?;
            }
            Ok(())
        })();
        self.environment.replace(previous);
        result
    }

    fn evaluate(&self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Nil => Value::Nil,
            }),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary { op, right } => {
                let right = self.evaluate(right)?;
                match op.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(
                            op.clone(),
                            format!("Operand must be a number, got {}.", right.type_name()),
                        )),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!("parser only emits Minus/Bang as unary operators"),
                }
            }
            ExprKind::Binary { left, op, right } => self.evaluate_binary(left, op, right),
            ExprKind::Logical { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let is_or = op.kind == TokenKind::Or;
                if is_or && left_val.is_truthy() {
                    return Ok(left_val);
                }
                if !is_or && !left_val.is_truthy() {
                    return Ok(left_val);
                }
                self.evaluate(right)
            }
            ExprKind::Variable { name } => self.look_up_variable(name, expr.id),
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(&expr.id) {
                    Some(&distance) => {
                        self.environment.borrow().assign_at(distance, name, value.clone());
                    }
                    None => {
                        self.globals.assign(name, value.clone())?;
                    }
                }
                Ok(value)
            }
            ExprKind::Call { callee, paren, args } => self.evaluate_call(callee, paren, args),
            ExprKind::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => instance.get(name),
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have properties.")),
                }
            }
            ExprKind::Set { object, name, value } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.set(name, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have fields.")),
                }
            }
            ExprKind::This { keyword } => self.look_up_variable(keyword, expr.id),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> EvalResult {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.get(name),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: &Token, right: &Expr) -> EvalResult {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match op.kind {
            EqualEqual => Ok(Value::Bool(left == right)),
            BangEqual => Ok(Value::Bool(left != right)),
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", left.stringify(), right.stringify())))
                }
                _ => Err(RuntimeError::new(
                    op.clone(),
                    "Operands must be two numbers or include a string.",
                )),
            },
            Minus | Star | Slash | Percent | Less | LessEqual | Greater | GreaterEqual => {
                let (a, b) = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => (*a, *b),
                    _ => {
                        return Err(RuntimeError::new(
                            op.clone(),
                            format!(
                                "Operands must be numbers, got {} and {}.",
                                left.type_name(),
                                right.type_name()
                            ),
                        ))
                    }
                };
                match op.kind {
                    Minus => Ok(Value::Number(a - b)),
                    Star => Ok(Value::Number(a * b)),
                    Slash => {
                        if b == 0.0 {
                            Err(RuntimeError::new(op.clone(), "Cannot divide by zero."))
                        } else {
                            Ok(Value::Number(a / b))
                        }
                    }
                    Percent => {
                        if b == 0.0 {
                            Err(RuntimeError::new(op.clone(), "Cannot divide by zero."))
                        } else {
                            Ok(Value::Number(a % b))
                        }
                    }
                    Less => Ok(Value::Bool(a < b)),
                    LessEqual => Ok(Value::Bool(a <= b)),
                    Greater => Ok(Value::Bool(a > b)),
                    GreaterEqual => Ok(Value::Bool(a >= b)),
                    _ => unreachable!(),
                }
            }
            _ => unreachable!("parser only emits arithmetic/comparison/equality tokens as binary operators"),
        }
    }

    fn evaluate_call(&self, callee: &Expr, paren: &Token, args: &[Expr]) -> EvalResult {
        let callee = self.evaluate(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg)?);
        }

        let callable = match callee {
            Value::Callable(c) => c,
            _ => {
                return Err(RuntimeError::new(
                    paren.clone(),
                    "Can only call functions and classes.",
                ))
            }
        };

        if arg_values.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren.clone(),
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arg_values.len()
                ),
            ));
        }

        match callable {
            Callable::Native(native) => (native.func)(&arg_values),
            Callable::Function(function) => self.call_function(&function, &arg_values),
            Callable::Class(class) => self.construct(&class, &arg_values),
        }
    }

    fn call_function(&self, function: &Rc<LoxFunction>, args: &[Value]) -> EvalResult {
        let env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.declaration.params.iter().zip(args) {
            env.define(param.lexeme.clone(), arg.clone());
        }

        match self.execute_block(&function.declaration.body, env) {
            Ok(()) => {
                if function.is_initializer {
                    function.closure.get_at(0, &this_token())
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(Flow::Return(value)) => {
                if function.is_initializer {
                    function.closure.get_at(0, &this_token())
                } else {
                    Ok(value)
                }
            }
            Err(Flow::Break) => unreachable!("parser rejects break outside of a loop"),
            Err(Flow::Error(err)) => Err(err),
        }
    }

    fn construct(&self, class: &Rc<LoxClass>, args: &[Value]) -> EvalResult {
        let instance = Rc::new(Instance::new(class.clone()));
        if let Some(initializer) = class.find_method("init") {
            let bound = Rc::new(initializer.bind(instance.clone()));
            self.call_function(&bound, args)?;
        }
        Ok(Value::Instance(instance))
    }
}

/// Synthetic token used only to read `this` back out of a bound
/// method's closure after its initializer body runs; `init` always
/// returns the instance regardless of what the body itself returns.
fn this_token() -> Token {
    Token::new(TokenKind::This, "this", crate::token::Literal::None, 0)
}
